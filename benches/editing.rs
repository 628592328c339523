//! Benchmarks for fills and compositing.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use pxedit::fill::{self, FillMode, FillSource, HslJitter};
use pxedit::{Colour, Document, LayerId, PixelBuffer, Point, Swatch};

/// Checkerboard of 8x8 cells so contiguous fills have real edges to find.
fn checker(size: u32) -> PixelBuffer {
    let colours = (0..size * size)
        .map(|i| {
            let (x, y) = (i % size, i / size);
            if (x / 8 + y / 8) % 2 == 0 {
                Colour::BLUE
            } else {
                Colour::WHITE
            }
        })
        .collect();
    PixelBuffer::from_colours(size, size, colours).unwrap()
}

// -- Fill benchmarks --

fn bench_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill");

    let flat = PixelBuffer::filled(256, 256, Colour::BLUE).unwrap();
    let board = checker(256);
    let solid = FillSource::Colour(Colour::RED);
    let mut grass = Swatch::new("grass");
    grass.insert(Colour::GREEN, 3.0);
    grass.insert(Colour::rgb(0, 128, 0), 1.0);
    let textured = FillSource::Swatch {
        swatch: grass,
        jitter: HslJitter::default(),
    };

    group.bench_function("contiguous_256_flat", |b| {
        let mut rng = SmallRng::seed_from_u64(1);
        b.iter(|| {
            fill::plan(
                black_box(&flat),
                LayerId(0),
                Point::new(128, 128),
                FillMode::Contiguous,
                &solid,
                0,
                None,
                &mut rng,
            )
            .unwrap()
        })
    });

    group.bench_function("global_256_checker", |b| {
        let mut rng = SmallRng::seed_from_u64(1);
        b.iter(|| {
            fill::plan(
                black_box(&board),
                LayerId(0),
                Point::new(0, 0),
                FillMode::Global,
                &solid,
                0,
                None,
                &mut rng,
            )
            .unwrap()
        })
    });

    group.bench_function("textured_256_flat", |b| {
        let mut rng = SmallRng::seed_from_u64(1);
        b.iter(|| {
            fill::plan(
                black_box(&flat),
                LayerId(0),
                Point::new(0, 0),
                FillMode::Contiguous,
                &textured,
                0,
                None,
                &mut rng,
            )
            .unwrap()
        })
    });

    group.finish();
}

// -- Compositing benchmarks --

fn bench_flatten(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatten");

    let mut doc = Document::from_buffer(checker(256));
    for i in 0..4u32 {
        let id = doc.layers.next_id();
        let mut buffer = PixelBuffer::filled(256, 256, Colour::new(255, 0, 0, 64)).unwrap();
        buffer.set(i as i32, 0, Colour::BLACK).unwrap();
        let layer = pxedit::Layer::new(id, format!("overlay {}", i), buffer);
        doc.layers = pxedit::LayerStack::from_layers(
            doc.layers.iter().cloned().chain(std::iter::once(layer)).collect(),
        )
        .unwrap();
    }

    group.bench_function("flatten_5_layers_256", |b| {
        b.iter(|| black_box(&doc).flatten())
    });

    group.finish();
}

criterion_group!(benches, bench_fill, bench_flatten);
criterion_main!(benches);
