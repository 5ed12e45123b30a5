//! Benchmarks for the per-tick backdrop step.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec2;

use studiofx::config::{EffectMode, EffectSettings, FieldConfig, StudioConfig};
use studiofx::effects::nearest_neighbor;
use studiofx::input::PointerSample;
use studiofx::Backdrop;

fn config_with(count: usize) -> StudioConfig {
    StudioConfig {
        field: FieldConfig {
            particle_count: count,
            ..FieldConfig::default()
        },
        ..StudioConfig::default()
    }
}

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("backdrop_step");

    for count in [1_000usize, 3_000, 10_000] {
        for mode in [EffectMode::Paparazzi, EffectMode::Matrix] {
            let config = config_with(count);
            let settings = EffectSettings {
                mode,
                ..EffectSettings::default()
            };
            let mut backdrop = Backdrop::seeded(&config, 7);
            let sample = PointerSample::at(Vec2::new(0.25, -0.4));

            group.bench_with_input(
                BenchmarkId::new(mode.label(), count),
                &count,
                |b, _| b.iter(|| black_box(backdrop.step(&settings, &sample))),
            );
        }
    }

    group.finish();
}

fn bench_click_burst(c: &mut Criterion) {
    let config = config_with(3_000);
    let settings = EffectSettings::default();
    let mut backdrop = Backdrop::seeded(&config, 11);
    let sample = PointerSample {
        ndc: Vec2::ZERO,
        presses: vec![Vec2::ZERO, Vec2::new(0.5, 0.5), Vec2::new(-0.5, 0.2)],
    };

    c.bench_function("paparazzi_click_burst", |b| {
        b.iter(|| black_box(backdrop.step(&settings, &sample)))
    });
}

fn bench_neighbor_search(c: &mut Criterion) {
    let config = config_with(3_000);
    let backdrop = Backdrop::seeded(&config, 3);
    let candidates: Vec<usize> = (0..50).map(|i| (i * 61) % 3_000).collect();

    c.bench_function("nearest_neighbor_50", |b| {
        b.iter(|| {
            black_box(nearest_neighbor(
                backdrop.field(),
                black_box(17),
                candidates.iter().copied(),
                0.1,
                2.0,
            ))
        })
    });
}

criterion_group!(benches, bench_step, bench_click_burst, bench_neighbor_search);
criterion_main!(benches);
