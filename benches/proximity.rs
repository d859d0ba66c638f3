//! Proximity benchmarks: grid-bucketed pair search against the O(n²) scan,
//! plus a full engine tick of the skills section.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use morphe::prelude::*;
use morphe::spatial::{brute_force_pairs, SpatialGrid};

const RADIUS: f32 = 100.0;

/// Uniform positions over an 1280×720 canvas.
fn canvas_positions(count: usize) -> Vec<Vec3> {
    let mut rng = SmallRng::seed_from_u64(7);
    (0..count)
        .map(|_| Vec3::new(rng.gen_range(0.0..1280.0), rng.gen_range(0.0..720.0), 0.0))
        .collect()
}

fn bench_pairs(c: &mut Criterion) {
    let mut group = c.benchmark_group("proximity_pairs");

    for count in [30usize, 100, 500, 2000] {
        let positions = canvas_positions(count);

        group.bench_with_input(BenchmarkId::new("grid", count), &positions, |b, positions| {
            let mut grid = SpatialGrid::new(RADIUS);
            b.iter(|| {
                grid.rebuild(black_box(positions));
                grid.pairs_within(positions)
            });
        });

        group.bench_with_input(BenchmarkId::new("brute_force", count), &positions, |b, positions| {
            b.iter(|| brute_force_pairs(black_box(positions), RADIUS));
        });
    }

    group.finish();
}

fn bench_engine_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_tick");

    for (name, profile) in [("high", Profile::high()), ("very_low", Profile::very_low())] {
        let profile = Profile { min_frame_interval_ms: 0, connection_redraw_interval_ms: 0, ..profile };
        let mut engine = match Engine::new(EngineConfig::skills(&profile), RecordingBackend::new(1280, 720)) {
            Ok(engine) => engine,
            Err(err) => panic!("skills engine: {err}"),
        };
        engine.on_visibility(true);
        engine.on_pointer(PointerEvent::Move { position: Vec2::new(640.0, 360.0) });

        group.bench_function(name, |b| {
            b.iter(|| engine.tick(black_box(1.0 / 60.0)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pairs, bench_engine_tick);
criterion_main!(benches);
