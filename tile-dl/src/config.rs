//! Tiling program configuration format.

use crate::{common::*, join::CoarseFilter, raster::ChannelOrder};

pub use data::*;
pub use tiling::*;

/// The main configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    pub tiling: TilingConfig,
}

impl Config {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let text = fs::read_to_string(path)?;
        let config: Self = json5::from_str(&text)
            .map_err(|err| Error::config(format!("malformed config: {}", err)))?;
        config.tiling.validate()?;
        Ok(config)
    }
}

mod data {
    use super::*;

    /// Locations of rasters and tables.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct DataConfig {
        /// The directory where raster files referenced by annotations are found.
        pub base_dir: PathBuf,
        /// The CSV annotation table in global raster coordinates.
        pub annotations_file: PathBuf,
        /// The sample index to `(image, window)` mapping.
        pub sample_keys_file: PathBuf,
    }
}

mod tiling {
    use super::*;

    /// The fraction of the box area that must fall inside a window.
    pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 0.5;

    /// The default search margin in meters per tile pixel.
    const DEFAULT_MARGIN_METERS_PER_PATCH_PIXEL: f64 = 0.1;

    /// Sliding window and spatial join options.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct TilingConfig {
        /// The window side length in pixels.
        pub patch_size: NonZeroUsize,
        /// The fraction of the window size shared by neighbouring windows, in `[0, 1)`.
        pub patch_overlap: R64,
        /// Ground resolution in meters per pixel.
        pub rgb_res: R64,
        /// The band around a window searched for candidate boxes.
        ///
        /// Defaults to `0.1 * patch_size` meters.
        #[serde(default)]
        pub margin: Option<Margin>,
        #[serde(default = "default_overlap_threshold")]
        pub overlap_threshold: R64,
        #[serde(default)]
        pub coarse_filter: CoarseFilter,
        #[serde(default)]
        pub channel_order: ChannelOrder,
    }

    impl TilingConfig {
        pub fn new(patch_size: usize, patch_overlap: f64, rgb_res: f64) -> Result<Self> {
            let patch_size = NonZeroUsize::new(patch_size)
                .ok_or_else(|| Error::config("patch_size must be positive"))?;
            let patch_overlap = R64::try_new(patch_overlap)
                .ok_or_else(|| Error::config("patch_overlap must be finite"))?;
            let rgb_res =
                R64::try_new(rgb_res).ok_or_else(|| Error::config("rgb_res must be finite"))?;

            let config = Self {
                patch_size,
                patch_overlap,
                rgb_res,
                margin: None,
                overlap_threshold: default_overlap_threshold(),
                coarse_filter: CoarseFilter::default(),
                channel_order: ChannelOrder::default(),
            };
            config.validate()?;
            Ok(config)
        }

        pub fn validate(&self) -> Result<()> {
            let overlap = self.patch_overlap.raw();
            if !(0.0..1.0).contains(&overlap) {
                return Err(Error::config(format!(
                    "patch_overlap must be in [0, 1), but get {}",
                    overlap
                )));
            }
            if self.rgb_res <= 0.0 {
                return Err(Error::config(format!(
                    "rgb_res must be positive, but get {}",
                    self.rgb_res
                )));
            }
            if !(0.0..=1.0).contains(&self.overlap_threshold.raw()) {
                return Err(Error::config(format!(
                    "overlap_threshold must be in [0, 1], but get {}",
                    self.overlap_threshold
                )));
            }
            if let Some(margin) = &self.margin {
                if margin.value() < 0.0 {
                    return Err(Error::config("margin must be non-negative"));
                }
            }
            Ok(())
        }

        /// The search margin converted to pixels.
        pub fn margin_pixels(&self) -> R64 {
            let margin = self.margin.unwrap_or_else(|| {
                Margin::Meters(r64(
                    self.patch_size.get() as f64 * DEFAULT_MARGIN_METERS_PER_PATCH_PIXEL,
                ))
            });

            match margin {
                Margin::Pixels(pixels) => pixels,
                Margin::Meters(meters) => meters / self.rgb_res,
            }
        }
    }

    /// A length in either raster pixels or ground meters.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "type", content = "value")]
    pub enum Margin {
        Pixels(R64),
        Meters(R64),
    }

    impl Margin {
        pub fn value(&self) -> R64 {
            match *self {
                Self::Pixels(value) | Self::Meters(value) => value,
            }
        }
    }

    fn default_overlap_threshold() -> R64 {
        r64(DEFAULT_OVERLAP_THRESHOLD)
    }
}
