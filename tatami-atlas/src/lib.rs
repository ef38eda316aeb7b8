//! Fixed-grid texture atlas cache for terminal renderers.
//!
//! This crate mediates between a glyph/image rasterizer and an opaque GPU
//! backend:
//! - Tiles are fixed-size cells of one backing texture, addressed by slot
//!   index and identified by strong content hash.
//! - An LRU policy bounds memory: at most one backend upload happens per
//!   distinct content hash alive in the cache; eviction recycles tile slots.
//! - A direct-mapped slot prefix is exempt from eviction, for content with
//!   stable identity such as ASCII glyphs.
//! - Slot coordinates derive from a 32-bit tile id without consulting the
//!   atlas dimensions at render time.
//!
//! The atlas is not internally synchronized; a renderer drives it from one
//! thread or provides its own mutual exclusion.

mod atlas;
mod backend;
mod cache;
mod hash;
mod slice;
mod types;

pub use atlas::{
    DirectMapping, DirectMappingAllocator, TileAtlas, TileAttributes, TileCreateData,
};
pub use backend::{normalize_color, normalize_rgba, AtlasBackend, ConfigureAtlas, RenderTile, UploadTile};
pub use hash::StrongHash;
pub use slice::{sliced, TileSliceIndex, TileSlices};
pub use types::{
    AtlasProperties, AtlasTileId, Format, ImageSize, NormalizedTileLocation, TileLocation,
};
