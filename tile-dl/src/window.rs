//! Sliding window partition of a raster.

use crate::common::*;
use image::RgbImage;

/// A rectangular crop region in raster pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Window {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Window {
    /// The window rectangle, failing on zero extent.
    pub fn rect(&self) -> Result<TLBR<R64>> {
        let Self {
            x,
            y,
            width,
            height,
        } = *self;

        let t = r64(y as f64);
        let l = r64(x as f64);
        let b = r64((y + height) as f64);
        let r = r64((x + width) as f64);
        TLBR::try_from_tlbr([t, l, b, r])
            .ok()
            .filter(|rect| rect.is_proper())
            .ok_or_else(|| {
                Error::geometry(format!(
                    "window {:?} must have positive width and height",
                    self
                ))
            })
    }

    pub fn size(&self) -> HW<usize> {
        HW::from_hw([self.height, self.width])
    }

    /// Check if the window lies inside a raster of the given size.
    pub fn fits_in(&self, raster_size: &HW<usize>) -> bool {
        self.y + self.height <= raster_size.h() && self.x + self.width <= raster_size.w()
    }
}

/// The ordered window list computed once for a reference raster.
///
/// Samples address windows by their position in this list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowIndex {
    raster_size: HW<usize>,
    tile_size: usize,
    windows: Vec<Window>,
}

impl WindowIndex {
    pub fn compute(raster_size: HW<usize>, tile_size: usize, overlap: R64) -> Result<Self> {
        let windows = compute_windows(&raster_size, tile_size, overlap)?;
        debug!(
            "computed {} windows of size {} over a {}x{} raster",
            windows.len(),
            tile_size,
            raster_size.w(),
            raster_size.h()
        );

        Ok(Self {
            raster_size,
            tile_size,
            windows,
        })
    }

    pub fn get(&self, index: usize) -> Option<&Window> {
        self.windows.get(index)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    pub fn raster_size(&self) -> &HW<usize> {
        &self.raster_size
    }

    pub fn tile_size(&self) -> usize {
        self.tile_size
    }
}

/// Partition a raster into overlapping square windows.
///
/// Consecutive windows are `tile_size - floor(tile_size * overlap)` pixels apart.
/// Windows are listed row by row, top to bottom, and left to right within a row.
/// When the raster size is not a multiple of the step, the last window on each
/// axis is shifted inward to end exactly at the raster border.
pub fn compute_windows(
    raster_size: &HW<usize>,
    tile_size: usize,
    overlap: R64,
) -> Result<Vec<Window>> {
    if tile_size == 0 {
        return Err(Error::config("tile size must be positive"));
    }
    if !(0.0..1.0).contains(&overlap.raw()) {
        return Err(Error::config(format!(
            "window overlap must be in [0, 1), but get {}",
            overlap
        )));
    }
    if !raster_size.covers(&HW::from_hw([tile_size, tile_size])) {
        return Err(Error::config(format!(
            "raster of size {}x{} is smaller than the tile size {}",
            raster_size.w(),
            raster_size.h(),
            tile_size
        )));
    }

    let shared = (tile_size as f64 * overlap.raw()).floor() as usize;
    let step = tile_size - shared;

    let xs = sweep_offsets(raster_size.w(), tile_size, step);
    let ys = sweep_offsets(raster_size.h(), tile_size, step);

    let windows = ys
        .iter()
        .cartesian_product(xs.iter())
        .map(|(&y, &x)| Window {
            x,
            y,
            width: tile_size,
            height: tile_size,
        })
        .collect();

    Ok(windows)
}

/// [compute_windows] over the dimensions of a decoded raster.
pub fn compute_windows_for(raster: &RgbImage, tile_size: usize, overlap: R64) -> Result<Vec<Window>> {
    let (width, height) = raster.dimensions();
    compute_windows(
        &HW::from_hw([height as usize, width as usize]),
        tile_size,
        overlap,
    )
}

fn sweep_offsets(len: usize, tile_size: usize, step: usize) -> Vec<usize> {
    let last = len - tile_size;
    let mut offsets: Vec<_> = (0..=last).step_by(step).collect();
    if offsets.last() != Some(&last) {
        offsets.push(last);
    }
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(h: usize, w: usize) -> HW<usize> {
        HW::from_hw([h, w])
    }

    #[test]
    fn row_major_order() {
        let windows = compute_windows(&size(20, 30), 10, r64(0.0)).unwrap();
        let origins: Vec<_> = windows.iter().map(|win| (win.x, win.y)).collect();
        assert_eq!(
            origins,
            vec![(0, 0), (10, 0), (20, 0), (0, 10), (10, 10), (20, 10)]
        );
    }

    #[test]
    fn trailing_window_shifts_inward() {
        // step = 10 - floor(2.5) = 8
        let windows = compute_windows(&size(10, 25), 10, r64(0.25)).unwrap();
        let xs: Vec<_> = windows.iter().map(|win| win.x).collect();
        assert_eq!(xs, vec![0, 8, 15]);
        assert!(windows.iter().all(|win| win.y == 0));
    }

    #[test]
    fn deterministic() {
        let lhs = compute_windows(&size(1000, 1200), 250, r64(0.05)).unwrap();
        let rhs = compute_windows(&size(1000, 1200), 250, r64(0.05)).unwrap();
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn windows_cover_raster_within_bounds() {
        let raster = size(37, 53);
        let windows = compute_windows(&raster, 10, r64(0.3)).unwrap();
        assert!(windows.iter().all(|win| win.fits_in(&raster)));

        let mut covered = vec![false; raster.area()];
        for win in &windows {
            for row in win.y..(win.y + win.height) {
                for col in win.x..(win.x + win.width) {
                    covered[row * raster.w() + col] = true;
                }
            }
        }
        assert!(covered.into_iter().all(|flag| flag));
    }

    #[test]
    fn raster_equal_to_tile() {
        let windows = compute_windows(&size(10, 10), 10, r64(0.5)).unwrap();
        assert_eq!(
            windows,
            vec![Window {
                x: 0,
                y: 0,
                width: 10,
                height: 10
            }]
        );
    }

    #[test]
    fn reject_bad_parameters() {
        assert!(matches!(
            compute_windows(&size(9, 20), 10, r64(0.0)),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            compute_windows(&size(20, 20), 0, r64(0.0)),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            compute_windows(&size(20, 20), 10, r64(1.0)),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn windows_from_decoded_raster() {
        let raster = RgbImage::new(30, 20);
        let windows = compute_windows_for(&raster, 10, r64(0.0)).unwrap();
        assert_eq!(windows.len(), 6);
    }

    #[test]
    fn window_rect_edges() {
        let window = Window {
            x: 30,
            y: 10,
            width: 20,
            height: 5,
        };
        let rect = window.rect().unwrap();
        assert_eq!(rect.tlbr(), [10.0, 30.0, 15.0, 50.0]);
        assert!(rect.is_proper());
    }

    #[test]
    fn degenerate_window_rect() {
        let window = Window {
            x: 0,
            y: 0,
            width: 0,
            height: 10,
        };
        assert!(matches!(window.rect(), Err(Error::InvalidGeometry(_))));
    }
}
