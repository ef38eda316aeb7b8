//! Behavioral tests for the tile atlas, driven through a recording backend
//! that logs every command for later assertion.

use std::collections::HashSet;

use tatami_atlas::{
    AtlasBackend, AtlasProperties, ConfigureAtlas, Format, ImageSize, RenderTile, StrongHash,
    TileAtlas, TileCreateData, TileLocation, UploadTile,
};

#[derive(Debug, Default)]
struct RecordingBackend {
    size: ImageSize,
    configures: Vec<ConfigureAtlas>,
    uploads: Vec<UploadTile>,
    renders: Vec<RenderTile>,
}

impl AtlasBackend for RecordingBackend {
    fn atlas_size(&self) -> ImageSize {
        self.size
    }

    fn configure_atlas(&mut self, command: ConfigureAtlas) {
        self.size = command.size;
        self.configures.push(command);
    }

    fn upload_tile(&mut self, command: UploadTile) {
        self.uploads.push(command);
    }

    fn render_tile(&mut self, command: RenderTile) {
        self.renders.push(command);
    }
}

/// 16px tiles, four LRU slots, no direct mapping: a 32x32 texture.
fn four_slot_properties() -> AtlasProperties {
    AtlasProperties {
        format: Format::Red,
        tile_size: ImageSize::new(16, 16),
        tile_count: 4,
        direct_mapping_count: 0,
    }
}

fn hash(name: &str) -> StrongHash {
    StrongHash::compute(name.as_bytes())
}

fn tile_data(fill: u8, metadata: u32) -> TileCreateData<u32> {
    TileCreateData {
        bitmap: vec![fill; 16 * 16],
        bitmap_format: Format::Red,
        bitmap_size: ImageSize::new(16, 16),
        metadata,
    }
}

#[test]
fn construction_issues_one_configure() {
    let atlas: TileAtlas<_, u32> =
        TileAtlas::new(RecordingBackend::default(), four_slot_properties());
    let backend = atlas.backend();
    assert_eq!(backend.configures.len(), 1);
    assert_eq!(backend.configures[0].size, ImageSize::new(32, 32));
    assert!(backend.uploads.is_empty());
}

#[test]
fn one_upload_per_distinct_hash() {
    let mut atlas: TileAtlas<_, u32> =
        TileAtlas::new(RecordingBackend::default(), four_slot_properties());

    let mut factory_calls = 0;
    for _ in 0..3 {
        let entry = atlas.get_or_emplace(hash("glyph:a"), |_, _| {
            factory_calls += 1;
            tile_data(0xff, 7)
        });
        assert_eq!(entry.metadata, 7);
    }

    assert_eq!(factory_calls, 1);
    assert_eq!(atlas.backend().uploads.len(), 1);
}

#[test]
fn factory_receives_assigned_location_and_slot() {
    let mut atlas: TileAtlas<_, u32> =
        TileAtlas::new(RecordingBackend::default(), four_slot_properties());

    let entry = atlas.get_or_emplace(hash("first"), |location, slot| {
        assert_eq!(slot, 0);
        assert_eq!(location, TileLocation::new(0, 0));
        tile_data(1, 0)
    });
    assert_eq!(entry.location, TileLocation::new(0, 0));

    let entry = atlas.get_or_emplace(hash("second"), |location, slot| {
        assert_eq!(slot, 1);
        assert_eq!(location, TileLocation::new(16, 0));
        tile_data(2, 0)
    });
    assert_eq!(entry.location, TileLocation::new(16, 0));
}

#[test]
fn eviction_recycles_the_lru_slot() {
    let mut atlas: TileAtlas<_, u32> =
        TileAtlas::new(RecordingBackend::default(), four_slot_properties());

    for (i, name) in ["a", "b", "c", "d"].iter().enumerate() {
        atlas.get_or_emplace(hash(name), |_, _| tile_data(i as u8, i as u32));
    }
    let location_a = atlas.try_get(&hash("a")).unwrap().location;
    // Re-establish LRU order a,b,c,d after the probing lookup.
    for name in ["b", "c", "d"] {
        atlas.try_get(&hash(name)).unwrap();
    }

    // Fifth insert: "a" is the oldest and must give up its slot.
    let entry = atlas.get_or_emplace(hash("e"), |_, _| tile_data(9, 9));
    assert_eq!(entry.location, location_a);
    assert!(!atlas.contains(&hash("a")));
    for name in ["b", "c", "d", "e"] {
        assert!(atlas.contains(&hash(name)), "{name} should be retained");
    }
    assert_eq!(atlas.backend().uploads.len(), 5);

    // Sixth insert: "b" is now the oldest; its slot is the next reused.
    let location_b = atlas.try_get(&hash("b")).unwrap().location;
    for name in ["c", "d", "e"] {
        atlas.try_get(&hash(name)).unwrap();
    }
    let entry = atlas.get_or_emplace(hash("f"), |_, _| tile_data(10, 10));
    assert_eq!(entry.location, location_b);
    assert!(!atlas.contains(&hash("b")));
}

#[test]
fn retained_keys_are_the_most_recently_accessed() {
    let mut atlas: TileAtlas<_, u32> =
        TileAtlas::new(RecordingBackend::default(), four_slot_properties());

    for i in 0..4u32 {
        atlas.get_or_emplace(hash(&format!("k{i}")), |_, _| tile_data(i as u8, i));
    }
    // Touch k0 so that k1 becomes the eviction victim.
    assert!(atlas.try_get(&hash("k0")).is_some());
    atlas.get_or_emplace(hash("k4"), |_, _| tile_data(4, 4));

    assert!(atlas.contains(&hash("k0")));
    assert!(!atlas.contains(&hash("k1")));
    assert!(atlas.contains(&hash("k2")));
    assert!(atlas.contains(&hash("k3")));
    assert!(atlas.contains(&hash("k4")));
}

#[test]
fn live_tile_locations_are_unique() {
    let mut atlas: TileAtlas<_, u32> =
        TileAtlas::new(RecordingBackend::default(), four_slot_properties());

    for i in 0..12u32 {
        atlas.get_or_emplace(hash(&format!("t{i}")), |_, _| tile_data(i as u8, i));
    }

    let live: Vec<TileLocation> = (0..12u32)
        .filter_map(|i| atlas.try_get(&hash(&format!("t{i}"))).map(|e| e.location))
        .collect();
    assert_eq!(live.len(), 4, "only the last four inserts survive");
    let distinct: HashSet<_> = live.iter().copied().collect();
    assert_eq!(distinct.len(), live.len());
}

#[test]
fn try_emplace_decline_leaves_no_trace() {
    let mut atlas: TileAtlas<_, u32> =
        TileAtlas::new(RecordingBackend::default(), four_slot_properties());

    for i in 0..4u32 {
        atlas.get_or_emplace(hash(&format!("k{i}")), |_, _| tile_data(i as u8, i));
    }

    let declined = atlas.get_or_try_emplace(hash("reject"), |_, _| None);
    assert!(declined.is_none());
    assert!(!atlas.contains(&hash("reject")));
    // Nothing was evicted and nothing was uploaded.
    for i in 0..4u32 {
        assert!(atlas.contains(&hash(&format!("k{i}"))));
    }
    assert_eq!(atlas.backend().uploads.len(), 4);

    let accepted = atlas.get_or_try_emplace(hash("accept"), |_, _| Some(tile_data(5, 5)));
    assert_eq!(accepted.map(|e| e.metadata), Some(5));
    assert_eq!(atlas.backend().uploads.len(), 5);
}

#[test]
fn emplace_overwrites_in_place() {
    let mut atlas: TileAtlas<_, u32> =
        TileAtlas::new(RecordingBackend::default(), four_slot_properties());

    atlas.get_or_emplace(hash("x"), |_, _| tile_data(1, 1));
    let location = atlas.try_get(&hash("x")).unwrap().location;

    atlas.emplace(hash("x"), |loc| {
        assert_eq!(loc, location);
        tile_data(2, 2)
    });

    let entry = atlas.try_get(&hash("x")).unwrap();
    assert_eq!(entry.metadata, 2);
    assert_eq!(entry.location, location);
    assert_eq!(atlas.backend().uploads.len(), 2);
}

#[test]
fn remove_drops_entry_and_frees_slot() {
    let mut atlas: TileAtlas<_, u32> =
        TileAtlas::new(RecordingBackend::default(), four_slot_properties());

    atlas.get_or_emplace(hash("x"), |_, _| tile_data(1, 1));
    let location = atlas.try_get(&hash("x")).unwrap().location;
    atlas.remove(&hash("x"));
    assert!(!atlas.contains(&hash("x")));

    let entry = atlas.get_or_emplace(hash("y"), |_, _| tile_data(2, 2));
    assert_eq!(entry.location, location);
}

#[test]
fn direct_mapping_bypasses_the_lru() {
    let properties = AtlasProperties {
        format: Format::Red,
        tile_size: ImageSize::new(16, 16),
        tile_count: 2,
        direct_mapping_count: 2,
    };
    let mut atlas: TileAtlas<_, u32> = TileAtlas::new(RecordingBackend::default(), properties);

    atlas.set_direct_mapping(0, tile_data(1, 10));
    atlas.set_direct_mapping(1, tile_data(2, 20));
    assert!(atlas.is_direct_mapping_enabled());

    // Direct slots own the first tile coordinates.
    assert_eq!(atlas.direct_mapped(0).location, TileLocation::new(0, 0));
    assert_eq!(atlas.direct_mapped(1).location, TileLocation::new(16, 0));
    assert_eq!(atlas.direct_mapped(1).metadata, 20);

    // Churn the LRU well past capacity; direct slots stay untouched and
    // LRU entries never land on direct coordinates.
    for i in 0..8u32 {
        let entry = atlas.get_or_emplace(hash(&format!("c{i}")), |_, _| tile_data(3, i));
        assert!(entry.location.y >= 16, "LRU tile on a direct slot");
    }
    assert_eq!(atlas.direct_mapped(0).metadata, 10);

    // Overwriting a direct slot re-uploads and replaces metadata.
    let uploads_before = atlas.backend().uploads.len();
    atlas.set_direct_mapping(0, tile_data(9, 90));
    assert_eq!(atlas.backend().uploads.len(), uploads_before + 1);
    assert_eq!(atlas.direct_mapped(0).metadata, 90);
}

#[test]
fn reset_clears_without_reconfiguring_same_geometry() {
    let mut atlas: TileAtlas<_, u32> =
        TileAtlas::new(RecordingBackend::default(), four_slot_properties());

    atlas.get_or_emplace(hash("x"), |_, _| tile_data(1, 1));
    atlas.reset(four_slot_properties());

    assert!(!atlas.contains(&hash("x")));
    assert_eq!(atlas.backend().configures.len(), 1);
}

#[test]
fn reset_reconfigures_when_geometry_changes() {
    let mut atlas: TileAtlas<_, u32> =
        TileAtlas::new(RecordingBackend::default(), four_slot_properties());

    let mut bigger = four_slot_properties();
    bigger.tile_count = 64;
    atlas.reset(bigger);

    assert_eq!(atlas.backend().configures.len(), 2);
    assert!(atlas.tiles_in_x() * atlas.tiles_in_y() >= 64);
}

#[test]
fn render_commands_are_forwarded_in_order() {
    let mut atlas: TileAtlas<_, u32> =
        TileAtlas::new(RecordingBackend::default(), four_slot_properties());

    let entry = atlas.get_or_emplace(hash("g"), |_, _| tile_data(1, 1));
    let tile_location = entry.location;
    let bitmap_size = entry.bitmap_size;
    let normalized = atlas.normalized_location(tile_location, bitmap_size);

    atlas.render_tile(RenderTile {
        x: 10,
        y: 20,
        bitmap_size,
        color: [1.0, 1.0, 1.0, 1.0],
        tile_location,
        normalized_location: normalized,
        fragment_shader_selector: 0,
    });

    let backend = atlas.backend();
    assert_eq!(backend.renders.len(), 1);
    assert_eq!(backend.renders[0].tile_location, tile_location);
    assert_eq!(backend.uploads.len(), 1);
}
