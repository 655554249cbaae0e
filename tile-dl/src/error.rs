//! The error taxonomy.

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures raised while setting up tiling or serving a sample.
///
/// None of them are transient, so callers are not expected to retry.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad configuration, such as a tile larger than the raster.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A window or box with zero or inverted extent.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    /// The image identity cannot be resolved to a readable raster.
    #[error("cannot read raster '{image}': {reason}")]
    ImageNotFound { image: String, reason: String },
    #[error("unknown sample index {0}")]
    UnknownSample(usize),
    #[error("unknown class name '{0}'")]
    UnknownClassName(String),
    #[error("unknown class id {0}")]
    UnknownClassId(usize),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub(crate) fn geometry(msg: impl Into<String>) -> Self {
        Self::InvalidGeometry(msg.into())
    }

    pub(crate) fn image_not_found(image: &str, reason: impl ToString) -> Self {
        Self::ImageNotFound {
            image: image.to_owned(),
            reason: reason.to_string(),
        }
    }
}
