//! Geometry and identity types for the tile atlas.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Size in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn area(self) -> usize {
        (self.width as usize) * (self.height as usize)
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Texture pixel format. The discriminant is the per-pixel element count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    Red = 1,
    Rgb = 3,
    Rgba = 4,
}

impl Format {
    /// Number of color elements per pixel.
    pub const fn element_count(self) -> u32 {
        self as u32
    }
}

/// Pixel offset of a tile inside the atlas texture.
///
/// The tile size is fixed per atlas, so an offset fully identifies a tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileLocation {
    pub x: u16,
    pub y: u16,
}

impl TileLocation {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for TileLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tile {}x+{}y", self.x, self.y)
    }
}

/// Tile location in normalized texture coordinates, for shader consumption.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTileLocation {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Unique identifier of a tile in the fixed-size atlas grid.
///
/// The 32-bit value decomposes into two 16-bit tile-unit offsets: Y in the
/// most significant half, X in the least significant half. Converting a
/// tile id to pixel coordinates therefore needs only the tile size, not the
/// atlas dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AtlasTileId(pub u32);

impl AtlasTileId {
    /// Composes an id from X/Y offsets in tile units.
    pub const fn new(x: u16, y: u16) -> Self {
        Self(((y as u32) << 16) | x as u32)
    }

    /// Id of the slot at `index` in a grid `tiles_in_x` tiles wide.
    pub const fn from_slot(index: u32, tiles_in_x: u32) -> Self {
        Self::new((index % tiles_in_x) as u16, (index / tiles_in_x) as u16)
    }

    /// X offset in tile units.
    pub const fn x(self) -> u16 {
        (self.0 & 0xffff) as u16
    }

    /// Y offset in tile units.
    pub const fn y(self) -> u16 {
        (self.0 >> 16) as u16
    }

    /// Pixel offset of this tile given the atlas' fixed tile size.
    pub const fn pixel_location(self, tile_size: ImageSize) -> TileLocation {
        TileLocation {
            x: self.x() * (tile_size.width as u16),
            y: self.y() * (tile_size.height as u16),
        }
    }
}

/// Construction-time properties of a texture atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasProperties {
    /// Texture pixel format, such as monochrome, RGB, or RGBA.
    pub format: Format,

    /// Size in pixels of a tile.
    pub tile_size: ImageSize,

    /// Number of LRU-cached tiles the atlas must be able to store at least.
    pub tile_count: u32,

    /// Number of direct-mapped tile slots, exempt from LRU eviction.
    ///
    /// Useful for content with stable identity that is rendered all the
    /// time, e.g. ASCII glyphs.
    pub direct_mapping_count: u32,
}

/// Computes the texture size for the given properties: the smallest
/// power-of-two square of tiles that fits them, scaled to pixels and
/// rounded up to powers of two per axis.
pub(crate) fn compute_atlas_size(properties: &AtlasProperties) -> ImageSize {
    let total_tiles =
        (properties.tile_count + properties.direct_mapping_count).next_power_of_two();
    let edge_tiles = (total_tiles as f64).sqrt().ceil() as u32;
    ImageSize {
        width: (edge_tiles * properties.tile_size.width).next_power_of_two(),
        height: (edge_tiles * properties.tile_size.height).next_power_of_two(),
    }
}
