//! On-the-fly tiling of large rasters into detection training samples.
//!
//! The raster is partitioned once into overlapping fixed-size windows. Each
//! training sample names a source image and a window index; the crop and the
//! boxes falling inside the window are produced lazily and cached.

mod common;
pub mod annotation;
pub mod cache;
pub mod config;
pub mod error;
pub mod join;
pub mod provider;
pub mod raster;
pub mod sample;
pub mod window;

pub use annotation::*;
pub use cache::*;
pub use config::*;
pub use error::*;
pub use join::*;
pub use provider::*;
pub use raster::*;
pub use sample::*;
pub use window::*;
