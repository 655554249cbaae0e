//! Mapping global boxes into window-local boxes.

use crate::{annotation::AnnotationRecord, common::*, config::TilingConfig, window::Window};

/// A box in the pixel frame of a window, tagged with its class id.
pub type LocalBox = Label<TLBR<R64>, usize>;

/// The cheap pre-filter applied before the overlap test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoarseFilter {
    /// Drop boxes lying entirely outside the margin band around the window.
    Intersects,
    /// Keep only boxes whose four edges lie strictly inside the margin band.
    Contained,
}

impl Default for CoarseFilter {
    fn default() -> Self {
        Self::Intersects
    }
}

impl CoarseFilter {
    /// Check a box in window-local coordinates against the band
    /// `[-margin, w + margin] x [-margin, h + margin]`.
    pub fn admits(&self, local: &TLBR<R64>, extent: &HW<R64>, margin: R64) -> bool {
        let lower = -margin;
        let right = extent.w() + margin;
        let bottom = extent.h() + margin;

        match self {
            Self::Intersects => {
                !(local.r() < lower
                    || local.l() > right
                    || local.b() < lower
                    || local.t() > bottom)
            }
            Self::Contained => {
                local.l() > lower && local.t() > lower && local.r() < right && local.b() < bottom
            }
        }
    }
}

/// Selects the boxes that belong to a window and re-expresses them locally.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialJoiner {
    /// A box is kept when strictly more than this fraction of its area is in the window.
    pub overlap_threshold: R64,
    /// The coarse filter band around the window, in pixels.
    pub margin: R64,
    pub coarse_filter: CoarseFilter,
}

impl SpatialJoiner {
    pub fn new(overlap_threshold: R64, margin: R64) -> Self {
        Self {
            overlap_threshold,
            margin,
            coarse_filter: CoarseFilter::default(),
        }
    }

    pub fn from_config(config: &TilingConfig) -> Self {
        Self {
            overlap_threshold: config.overlap_threshold,
            margin: config.margin_pixels(),
            coarse_filter: config.coarse_filter,
        }
    }

    /// Join one window with the boxes of its source image.
    ///
    /// The overlap is the intersection area over the box's own area. Kept boxes
    /// are translated to the window origin and clipped to the window extent.
    /// Input order is preserved.
    pub fn join<'a, I>(&self, window: &Window, annotations: I) -> Result<Vec<LocalBox>>
    where
        I: IntoIterator<Item = &'a AnnotationRecord>,
    {
        let window_rect = window.rect()?;
        let extent = window_rect.size();
        let to_local = Transform::to_local_frame(window_rect.t(), window_rect.l());

        annotations
            .into_iter()
            .map(|record| -> Result<_> {
                let global = Label {
                    rect: record.rect()?,
                    class: record.class,
                };
                let local: LocalBox = &to_local * &global;

                if !self.coarse_filter.admits(&local.rect, &extent, self.margin) {
                    return Ok(None);
                }

                let overlap = window_rect.coverage_of(&global.rect);
                if overlap <= self.overlap_threshold {
                    return Ok(None);
                }

                Ok(Some(LocalBox {
                    rect: local.rect.clamp_within(&extent),
                    ..local
                }))
            })
            .filter_map(|result| result.transpose())
            .collect()
    }
}

/// [SpatialJoiner::join] with the default coarse filter.
pub fn join_window<'a, I>(
    window: &Window,
    annotations: I,
    overlap_threshold: R64,
    margin: R64,
) -> Result<Vec<LocalBox>>
where
    I: IntoIterator<Item = &'a AnnotationRecord>,
{
    SpatialJoiner::new(overlap_threshold, margin).join(window, annotations)
}

/// Pack boxes into an `[n, 5]` array of `xmin, ymin, xmax, ymax, class` rows.
pub fn local_boxes_to_array(boxes: &[LocalBox]) -> Array2<f64> {
    Array2::from_shape_fn((boxes.len(), 5), |(row, col)| {
        let local = &boxes[row];
        match col {
            0 => local.rect.l().raw(),
            1 => local.rect.t().raw(),
            2 => local.rect.r().raw(),
            3 => local.rect.b().raw(),
            _ => local.class as f64,
        }
    })
}
