//! Tile management for a single fixed-grid texture atlas.
//!
//! Tiles are LRU-cached by strong content hash; the metadata carried with a
//! tile is dropped at eviction time. A configurable prefix of the slot range
//! is direct-mapped: reserved for content with stable identity and exempt
//! from eviction.
//!
//! The total number of cachable tiles should be at least as large as the
//! screen's cell count per page; more tiles improve hit rates.

use std::fmt;

use crate::backend::{AtlasBackend, ConfigureAtlas, RenderTile, UploadTile};
use crate::cache::SlotLru;
use crate::hash::StrongHash;
use crate::types::{
    compute_atlas_size, AtlasProperties, AtlasTileId, Format, ImageSize, NormalizedTileLocation,
    TileLocation,
};

/// Location and metadata of one cached tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileAttributes<M> {
    pub location: TileLocation,
    /// Size of the bitmap inside the tile; at most the grid's tile size.
    pub bitmap_size: ImageSize,
    pub metadata: M,
}

/// What a tile factory produces on a cache miss.
#[derive(Debug, Clone)]
pub struct TileCreateData<M> {
    /// Texture data, row-major, tightly packed.
    pub bitmap: Vec<u8>,
    pub bitmap_format: Format,
    pub bitmap_size: ImageSize,
    pub metadata: M,
}

/// Manages the tiles of a single texture atlas.
///
/// The atlas owns the cache policy and the slot-to-coordinate assignment;
/// the backend owns the texture. Construction issues exactly one
/// [`AtlasBackend::configure_atlas`]; every successful tile insert issues
/// exactly one [`AtlasBackend::upload_tile`]; cache hits issue none.
#[derive(Debug)]
pub struct TileAtlas<B: AtlasBackend, M = ()> {
    backend: B,
    properties: AtlasProperties,
    atlas_size: ImageSize,
    tiles_in_x: u32,
    tiles_in_y: u32,
    // Precomputed pixel offset per slot index, direct slots first.
    tile_locations: Vec<TileLocation>,
    cache: SlotLru<TileAttributes<M>>,
    direct: Vec<Option<TileAttributes<M>>>,
}

impl<B: AtlasBackend, M> TileAtlas<B, M> {
    /// Creates the atlas and configures the backend for it.
    pub fn new(backend: B, properties: AtlasProperties) -> Self {
        let mut atlas = Self {
            backend,
            properties,
            atlas_size: ImageSize::default(),
            tiles_in_x: 0,
            tiles_in_y: 0,
            tile_locations: Vec::new(),
            cache: SlotLru::new(0),
            direct: Vec::new(),
        };
        atlas.rebuild_geometry();
        atlas
    }

    /// Clears the cache and applies new properties. The backend is
    /// reconfigured only when the new properties change the atlas geometry.
    pub fn reset(&mut self, properties: AtlasProperties) {
        let geometry_changed = properties.tile_size != self.properties.tile_size
            || properties.direct_mapping_count != self.properties.direct_mapping_count
            || compute_atlas_size(&properties) != self.atlas_size;
        self.properties = properties;
        if geometry_changed {
            self.rebuild_geometry();
        } else {
            self.cache.clear();
        }
    }

    fn rebuild_geometry(&mut self) {
        let tile_size = self.properties.tile_size;
        assert!(
            tile_size.width > 0 && tile_size.height > 0,
            "atlas tile size must be non-zero"
        );

        self.atlas_size = compute_atlas_size(&self.properties);
        self.tiles_in_x = self.atlas_size.width / tile_size.width;
        self.tiles_in_y = self.atlas_size.height / tile_size.height;

        let total_slots = (self.tiles_in_x * self.tiles_in_y) as usize;
        let reserved =
            (self.properties.tile_count + self.properties.direct_mapping_count) as usize;
        assert!(
            total_slots >= reserved,
            "atlas grid of {total_slots} slots cannot hold {reserved} requested tiles"
        );

        self.tile_locations = (0..total_slots as u32)
            .map(|index| {
                TileLocation::new(
                    ((index % self.tiles_in_x) * tile_size.width) as u16,
                    ((index / self.tiles_in_x) * tile_size.height) as u16,
                )
            })
            .collect();
        self.cache = SlotLru::new(total_slots - self.properties.direct_mapping_count as usize);
        self.direct = (0..self.properties.direct_mapping_count)
            .map(|_| None)
            .collect();

        log::debug!(
            "configuring atlas: {} texture, {}x{} tiles of {}, {} direct-mapped",
            self.atlas_size,
            self.tiles_in_x,
            self.tiles_in_y,
            self.properties.tile_size,
            self.properties.direct_mapping_count,
        );
        self.backend.configure_atlas(ConfigureAtlas {
            size: self.atlas_size,
            properties: self.properties,
        });
    }

    // --- lookup and insertion --------------------------------------------

    /// Tests whether the LRU cache holds a tile for the hash; direct-mapped
    /// slots are not keyed by hash. Does not promote.
    pub fn contains(&self, hash: &StrongHash) -> bool {
        self.cache.contains(hash)
    }

    /// Looks up a cached tile, promoting it to most-recently-used.
    pub fn try_get(&mut self, hash: &StrongHash) -> Option<&TileAttributes<M>> {
        self.cache.get(hash)
    }

    /// Returns the existing tile for `hash`, or creates one by invoking the
    /// factory with the tile location and LRU slot index it will occupy.
    /// Inserting into a full cache evicts the least-recently-used tile and
    /// reuses its slot.
    pub fn get_or_emplace<F>(&mut self, hash: StrongHash, create_tile_data: F) -> &TileAttributes<M>
    where
        F: FnOnce(TileLocation, u32) -> TileCreateData<M>,
    {
        if !self.cache.contains(&hash) {
            let slot = self
                .cache
                .peek_insert_slot()
                .expect("atlas has no LRU tile slots");
            let location = self.lru_tile_location(slot);
            let data = create_tile_data(location, slot as u32);
            self.store(hash, location, slot, data);
        }
        self.cache.get(&hash).expect("tile entry just inserted")
    }

    /// Like [`TileAtlas::get_or_emplace`], but the factory may decline by
    /// returning `None`: no upload happens and nothing is inserted or
    /// evicted.
    pub fn get_or_try_emplace<F>(
        &mut self,
        hash: StrongHash,
        create_tile_data: F,
    ) -> Option<&TileAttributes<M>>
    where
        F: FnOnce(TileLocation, u32) -> Option<TileCreateData<M>>,
    {
        if !self.cache.contains(&hash) {
            let slot = self.cache.peek_insert_slot()?;
            let location = self.lru_tile_location(slot);
            let data = create_tile_data(location, slot as u32)?;
            self.store(hash, location, slot, data);
        }
        self.cache.get(&hash)
    }

    /// Explicitly creates or overwrites the tile for `hash`. An overwrite
    /// keeps the entry's slot and uploads fresh content into it.
    pub fn emplace<F>(&mut self, hash: StrongHash, create_tile_data: F)
    where
        F: FnOnce(TileLocation) -> TileCreateData<M>,
    {
        let slot = match self.cache.slot_of(&hash) {
            Some(slot) => slot,
            None => self
                .cache
                .peek_insert_slot()
                .expect("atlas has no LRU tile slots"),
        };
        let location = self.lru_tile_location(slot);
        let data = create_tile_data(location);
        self.store(hash, location, slot, data);
    }

    /// Evicts the tile for `hash`, dropping its metadata and freeing its
    /// slot for reuse.
    pub fn remove(&mut self, hash: &StrongHash) {
        self.cache.remove(hash);
    }

    fn store(
        &mut self,
        hash: StrongHash,
        location: TileLocation,
        expected_slot: usize,
        data: TileCreateData<M>,
    ) {
        let TileCreateData {
            bitmap,
            bitmap_format,
            bitmap_size,
            metadata,
        } = data;
        self.backend.upload_tile(UploadTile {
            location,
            bitmap,
            bitmap_size,
            bitmap_format,
        });
        let slot = self.cache.insert(
            hash,
            TileAttributes {
                location,
                bitmap_size,
                metadata,
            },
        );
        debug_assert_eq!(slot, expected_slot, "LRU slot assignment diverged");
    }

    // --- direct mapping ---------------------------------------------------

    /// Uploads tile data into a direct-mapped slot, bypassing the LRU.
    /// Overwrites any previous content and metadata of that slot.
    ///
    /// Panics when `index` is not below the direct mapping count.
    pub fn set_direct_mapping(&mut self, index: u32, data: TileCreateData<M>) {
        assert!(
            (index as usize) < self.direct.len(),
            "direct-mapped tile index {index} out of range"
        );
        let location = self.tile_locations[index as usize];
        let TileCreateData {
            bitmap,
            bitmap_format,
            bitmap_size,
            metadata,
        } = data;
        self.backend.upload_tile(UploadTile {
            location,
            bitmap,
            bitmap_size,
            bitmap_format,
        });
        self.direct[index as usize] = Some(TileAttributes {
            location,
            bitmap_size,
            metadata,
        });
    }

    /// Attributes of a direct-mapped slot.
    ///
    /// Panics when `index` is out of range or the slot was never written
    /// with [`TileAtlas::set_direct_mapping`]; the caller is responsible for
    /// sequencing.
    pub fn direct_mapped(&self, index: u32) -> &TileAttributes<M> {
        self.direct
            .get(index as usize)
            .unwrap_or_else(|| panic!("direct-mapped tile index {index} out of range"))
            .as_ref()
            .unwrap_or_else(|| panic!("direct-mapped tile {index} read before set_direct_mapping"))
    }

    pub fn is_direct_mapping_enabled(&self) -> bool {
        !self.direct.is_empty()
    }

    // --- rendering --------------------------------------------------------

    /// Forwards a render command to the backend.
    pub fn render_tile(&mut self, command: RenderTile) {
        self.backend.render_tile(command);
    }

    /// Normalized texture coordinates for a tile's bitmap, as shaders
    /// consume them.
    pub fn normalized_location(
        &self,
        location: TileLocation,
        bitmap_size: ImageSize,
    ) -> NormalizedTileLocation {
        NormalizedTileLocation {
            x: location.x as f32 / self.atlas_size.width as f32,
            y: location.y as f32 / self.atlas_size.height as f32,
            width: bitmap_size.width as f32 / self.atlas_size.width as f32,
            height: bitmap_size.height as f32 / self.atlas_size.height as f32,
        }
    }

    // --- accessors --------------------------------------------------------

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn atlas_size(&self) -> ImageSize {
        self.atlas_size
    }

    pub fn tile_size(&self) -> ImageSize {
        self.properties.tile_size
    }

    pub fn tiles_in_x(&self) -> u32 {
        self.tiles_in_x
    }

    pub fn tiles_in_y(&self) -> u32 {
        self.tiles_in_y
    }

    /// Total number of tile slots, direct-mapped ones included.
    pub fn capacity(&self) -> usize {
        self.tile_locations.len()
    }

    /// Pixel offset of the slot at `index`, direct slots first.
    pub fn tile_location(&self, index: u32) -> TileLocation {
        self.tile_locations[index as usize]
    }

    /// Grid identifier of the slot at `index`.
    pub fn tile_id(&self, index: u32) -> AtlasTileId {
        AtlasTileId::from_slot(index, self.tiles_in_x)
    }

    fn lru_tile_location(&self, slot: usize) -> TileLocation {
        self.tile_locations[self.properties.direct_mapping_count as usize + slot]
    }

    /// Writes a human readable summary for debugging.
    pub fn inspect(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        writeln!(out, "TileAtlas")?;
        writeln!(out, "------------------------")?;
        writeln!(out, "atlas size     : {}", self.atlas_size)?;
        writeln!(out, "tile size      : {}", self.properties.tile_size)?;
        writeln!(out, "grid           : {}x{}", self.tiles_in_x, self.tiles_in_y)?;
        writeln!(
            out,
            "direct mapped  : {}",
            self.properties.direct_mapping_count
        )?;
        writeln!(
            out,
            "cached tiles   : {}/{}",
            self.cache.len(),
            self.cache.capacity()
        )?;
        for hash in self.cache.hashes() {
            writeln!(out, "  {}", hash)?;
        }
        Ok(())
    }
}

/// A sub-range of the direct-mapped slots handed to one renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectMapping {
    pub base_index: u32,
    pub count: u32,
}

impl DirectMapping {
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Translates a renderer-local direct mapping index to an atlas slot
    /// index. Panics when the index is outside this mapping.
    pub fn to_tile_index(&self, direct_mapping_index: u32) -> u32 {
        assert!(
            direct_mapping_index < self.count,
            "direct mapping index {direct_mapping_index} outside allocation of {}",
            self.count
        );
        self.base_index + direct_mapping_index
    }
}

/// Carves the atlas' direct-mapped slot range into per-renderer allocations.
#[derive(Debug)]
pub struct DirectMappingAllocator {
    currently_allocated: u32,
    pub enabled: bool,
}

impl Default for DirectMappingAllocator {
    fn default() -> Self {
        Self {
            currently_allocated: 0,
            enabled: true,
        }
    }
}

impl DirectMappingAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next `count` direct slots, or an empty mapping when
    /// direct mapping is disabled.
    pub fn allocate(&mut self, count: u32) -> DirectMapping {
        if !self.enabled {
            return DirectMapping::default();
        }
        let base_index = self.currently_allocated;
        self.currently_allocated += count;
        DirectMapping { base_index, count }
    }

    /// Total number of slots handed out so far; the atlas'
    /// `direct_mapping_count` must be at least this.
    pub fn allocated_count(&self) -> u32 {
        self.currently_allocated
    }
}
