//! Tile atlas benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tatami_atlas::{
    AtlasBackend, AtlasProperties, ConfigureAtlas, Format, ImageSize, RenderTile, StrongHash,
    TileAtlas, TileCreateData, UploadTile,
};

struct NullBackend {
    size: ImageSize,
}

impl AtlasBackend for NullBackend {
    fn atlas_size(&self) -> ImageSize {
        self.size
    }

    fn configure_atlas(&mut self, command: ConfigureAtlas) {
        self.size = command.size;
    }

    fn upload_tile(&mut self, command: UploadTile) {
        black_box(command.bitmap.len());
    }

    fn render_tile(&mut self, command: RenderTile) {
        black_box(command.tile_location);
    }
}

fn properties() -> AtlasProperties {
    AtlasProperties {
        format: Format::Red,
        tile_size: ImageSize::new(16, 16),
        tile_count: 256,
        direct_mapping_count: 0,
    }
}

fn tile_data(fill: u8) -> TileCreateData<()> {
    TileCreateData {
        bitmap: vec![fill; 16 * 16],
        bitmap_format: Format::Red,
        bitmap_size: ImageSize::new(16, 16),
        metadata: (),
    }
}

fn bench_cache_hits(c: &mut Criterion) {
    let mut group = c.benchmark_group("atlas");

    group.bench_function("get_or_emplace_hot", |b| {
        let backend = NullBackend {
            size: ImageSize::default(),
        };
        let mut atlas: TileAtlas<_, ()> = TileAtlas::new(backend, properties());
        let hashes: Vec<StrongHash> = (0..128u32)
            .map(|i| StrongHash::compute(&i.to_le_bytes()))
            .collect();
        for &hash in &hashes {
            atlas.get_or_emplace(hash, |_, _| tile_data(1));
        }

        b.iter(|| {
            for &hash in &hashes {
                let entry = atlas.get_or_emplace(black_box(hash), |_, _| tile_data(1));
                black_box(entry.location);
            }
        })
    });

    group.finish();
}

fn bench_cache_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("atlas");

    group.bench_function("get_or_emplace_evicting", |b| {
        let backend = NullBackend {
            size: ImageSize::default(),
        };
        let mut atlas: TileAtlas<_, ()> = TileAtlas::new(backend, properties());
        let mut next = 0u32;

        b.iter(|| {
            // A working set far larger than capacity keeps every lookup a miss.
            for _ in 0..32 {
                let hash = StrongHash::compute(&next.to_le_bytes());
                next = next.wrapping_add(1) % 2048;
                let entry = atlas.get_or_emplace(black_box(hash), |_, _| tile_data(2));
                black_box(entry.location);
            }
        })
    });

    group.finish();
}

criterion_group!(benches, bench_cache_hits, bench_cache_churn);
criterion_main!(benches);
