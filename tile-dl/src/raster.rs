//! Raster decoding and crop extraction.

use crate::{common::*, window::Window};
use image::{Rgb, RgbImage};

/// Resolves image identities to decoded 3-channel rasters.
pub trait RasterDecoder {
    /// Decode the full raster.
    fn decode(&mut self, image: &str) -> Result<RgbImage>;

    /// Read the raster size without decoding pixels where possible.
    fn dimensions(&self, image: &str) -> Result<HW<usize>>;
}

/// Decodes raster files found under a base directory.
#[derive(Debug, Clone)]
pub struct FileDecoder {
    base_dir: PathBuf,
}

impl FileDecoder {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_owned(),
        }
    }

    pub fn path_of(&self, image: &str) -> PathBuf {
        self.base_dir.join(image)
    }
}

impl RasterDecoder for FileDecoder {
    fn decode(&mut self, image: &str) -> Result<RgbImage> {
        let path = self.path_of(image);
        let decoded = image::io::Reader::open(&path)
            .map_err(|err| Error::image_not_found(image, err))?
            .with_guessed_format()
            .map_err(|err| Error::image_not_found(image, err))?
            .decode()
            .map_err(|err| Error::image_not_found(image, err))?;
        Ok(decoded.into_rgb8())
    }

    fn dimensions(&self, image: &str) -> Result<HW<usize>> {
        let path = self.path_of(image);
        let imagesize::ImageSize { height, width } =
            imagesize::size(&path).map_err(|err| Error::image_not_found(image, format!("{:?}", err)))?;
        Ok(HW::from_hw([height, width]))
    }
}

/// The channel layout of produced crops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelOrder {
    Rgb,
    Bgr,
}

impl Default for ChannelOrder {
    fn default() -> Self {
        Self::Bgr
    }
}

impl ChannelOrder {
    /// The RGB channel stored at `channel` in this layout.
    fn source_channel(&self, channel: usize) -> usize {
        match self {
            Self::Rgb => channel,
            Self::Bgr => 2 - channel,
        }
    }
}

/// Copy the window region out of a raster into an `[h, w, 3]` array.
pub fn crop_window(raster: &RgbImage, window: &Window, order: ChannelOrder) -> Result<Array3<u8>> {
    let (raster_w, raster_h) = raster.dimensions();
    let raster_size = HW::from_hw([raster_h as usize, raster_w as usize]);
    if !window.fits_in(&raster_size) {
        return Err(Error::config(format!(
            "window {:?} exceeds the {}x{} raster",
            window, raster_w, raster_h
        )));
    }

    let Window {
        x,
        y,
        width,
        height,
    } = *window;

    let crop = Array3::from_shape_fn([height, width, 3], |(row, col, channel)| {
        let Rgb(pixel) = *raster.get_pixel((x + col) as u32, (y + row) as u32);
        pixel[order.source_channel(channel)]
    });
    Ok(crop)
}

/// Convert an `[h, w, 3]` crop back into an RGB image.
pub fn crop_to_image(crop: &Array3<u8>, order: ChannelOrder) -> Result<RgbImage> {
    let (height, width, channels) = crop.dim();
    if channels != 3 {
        return Err(Error::config(format!(
            "expect 3 channels, but get {}",
            channels
        )));
    }

    let image = RgbImage::from_fn(width as u32, height as u32, |col, row| {
        let (row, col) = (row as usize, col as usize);
        Rgb([0, 1, 2].map(|channel| crop[[row, col, order.source_channel(channel)]]))
    });
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 200]))
    }

    #[test]
    fn crop_in_rgb_and_bgr() {
        let raster = gradient(20, 10);
        let window = Window {
            x: 5,
            y: 2,
            width: 4,
            height: 3,
        };

        let rgb = crop_window(&raster, &window, ChannelOrder::Rgb).unwrap();
        assert_eq!(rgb.dim(), (3, 4, 3));
        assert_eq!(rgb[[0, 0, 0]], 5);
        assert_eq!(rgb[[2, 3, 1]], 4);
        assert_eq!(rgb[[1, 1, 2]], 200);

        let bgr = crop_window(&raster, &window, ChannelOrder::Bgr).unwrap();
        assert_eq!(bgr[[0, 0, 0]], 200);
        assert_eq!(bgr[[0, 0, 2]], 5);
    }

    #[test]
    fn crop_round_trips_to_image() {
        let raster = gradient(8, 8);
        let window = Window {
            x: 0,
            y: 0,
            width: 8,
            height: 8,
        };
        let bgr = crop_window(&raster, &window, ChannelOrder::Bgr).unwrap();
        assert_eq!(crop_to_image(&bgr, ChannelOrder::Bgr).unwrap(), raster);
    }

    #[test]
    fn reject_window_outside_raster() {
        let raster = gradient(10, 10);
        let window = Window {
            x: 5,
            y: 0,
            width: 10,
            height: 10,
        };
        assert!(matches!(
            crop_window(&raster, &window, ChannelOrder::Rgb),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn missing_file_is_image_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut decoder = FileDecoder::new(dir.path());
        assert!(matches!(
            decoder.decode("absent.png"),
            Err(Error::ImageNotFound { .. })
        ));
        assert!(matches!(
            decoder.dimensions("absent.png"),
            Err(Error::ImageNotFound { .. })
        ));
    }

    #[test]
    fn decode_png_file() {
        let dir = tempfile::tempdir().unwrap();
        gradient(12, 7).save(dir.path().join("tile.png")).unwrap();

        let mut decoder = FileDecoder::new(dir.path());
        assert_eq!(decoder.dimensions("tile.png").unwrap(), HW::from_hw([7, 12]));
        assert_eq!(decoder.decode("tile.png").unwrap(), gradient(12, 7));
    }
}
