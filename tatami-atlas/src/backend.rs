//! The backend contract: the atlas owns cache policy and coordinate
//! assignment, the backend owns the GPU resources.

use crate::types::{AtlasProperties, Format, ImageSize, NormalizedTileLocation, TileLocation};

/// Command to (re-)create the backing texture atlas. Any prior atlas is
/// destroyed; there can be only one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigureAtlas {
    /// Texture atlas size in pixels.
    pub size: ImageSize,
    pub properties: AtlasProperties,
}

/// Command to upload a bitmap into one tile of the atlas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTile {
    pub location: TileLocation,
    /// Texture data to be uploaded, row-major, tightly packed.
    pub bitmap: Vec<u8>,
    pub bitmap_size: ImageSize,
    pub bitmap_format: Format,
}

/// Command to render one tile of the atlas to a target position.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderTile {
    /// Target X coordinate to start rendering to.
    pub x: i32,
    /// Target Y coordinate to start rendering to.
    pub y: i32,
    /// Bitmap size inside the tile; must not exceed the grid's tile size.
    pub bitmap_size: ImageSize,
    /// Color associated with this tile, RGBA in `0.0..=1.0`.
    pub color: [f32; 4],
    pub tile_location: TileLocation,
    pub normalized_location: NormalizedTileLocation,
    pub fragment_shader_selector: u32,
}

/// The capability set a renderer backend must provide. Commands are issued
/// synchronously and must be applied in issue order; actual GPU work may be
/// deferred.
pub trait AtlasBackend {
    /// Size in pixels of the currently configured atlas texture.
    fn atlas_size(&self) -> ImageSize;

    /// Creates a new texture atlas, destroying any prior one.
    fn configure_atlas(&mut self, command: ConfigureAtlas);

    /// Uploads a bitmap into a tile.
    fn upload_tile(&mut self, command: UploadTile);

    /// Renders a tile at the given target position.
    fn render_tile(&mut self, command: RenderTile);
}

/// Normalizes an 8-bit RGB color and an alpha value into render-command form.
pub fn normalize_color(rgb: [u8; 3], alpha: f32) -> [f32; 4] {
    [
        rgb[0] as f32 / 255.0,
        rgb[1] as f32 / 255.0,
        rgb[2] as f32 / 255.0,
        alpha,
    ]
}

/// Normalizes an 8-bit RGBA color into render-command form.
pub fn normalize_rgba(rgba: [u8; 4]) -> [f32; 4] {
    [
        rgba[0] as f32 / 255.0,
        rgba[1] as f32 / 255.0,
        rgba[2] as f32 / 255.0,
        rgba[3] as f32 / 255.0,
    ]
}
