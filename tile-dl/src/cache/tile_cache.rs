//! The single-slot decoded raster cache.

use crate::{common::*, raster::RasterDecoder};
use image::RgbImage;

/// Keeps the most recently decoded raster in memory.
///
/// Consecutive samples usually come from the same raster, so one slot turns
/// a decode per sample into a decode per run of samples sharing a raster.
/// A request for another image evicts the resident raster. The slot is not
/// meant to be shared between threads; give each worker its own cache.
#[derive(Debug)]
pub struct TileCache<D> {
    decoder: D,
    slot: Option<Resident>,
    decode_count: usize,
}

#[derive(Debug)]
struct Resident {
    image: String,
    raster: RgbImage,
}

impl<D> TileCache<D>
where
    D: RasterDecoder,
{
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            slot: None,
            decode_count: 0,
        }
    }

    /// Get the decoded raster of `image`, decoding it on a miss.
    ///
    /// The resident raster is evicted before decoding, so at most one
    /// decoded buffer is alive. The slot is left empty if decoding fails.
    pub fn get(&mut self, image: &str) -> Result<&RgbImage> {
        let resident = match self.slot.take() {
            Some(resident) if resident.image == image => resident,
            evicted => {
                drop(evicted);
                info!("loading new tile '{}'", image);
                let raster = self.decoder.decode(image)?;
                self.decode_count += 1;

                Resident {
                    image: image.to_owned(),
                    raster,
                }
            }
        };

        Ok(&self.slot.insert(resident).raster)
    }

    /// The identity of the resident raster.
    pub fn resident(&self) -> Option<&str> {
        self.slot.as_ref().map(|resident| resident.image.as_str())
    }

    /// The number of decodes performed so far.
    pub fn decode_count(&self) -> usize {
        self.decode_count
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }
}
