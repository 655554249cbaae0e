//! Caches that avoid redundant decoding and joining across samples.

mod annotation_cache;
mod tile_cache;

pub use annotation_cache::*;
pub use tile_cache::*;
