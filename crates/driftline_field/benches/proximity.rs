//! Proximity graph and field step throughput
//!
//! Run with: `cargo bench -p driftline_field`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use driftline_field::{
    FieldConfig, FrameLoop, ProximityGraphBuilder, ProximityStrategy, VectorField,
};

fn positions(count: usize) -> Vec<driftline_core::Vec3> {
    let config = FieldConfig::network()
        .with_seed(42)
        .with_particle_count(count);
    VectorField::from_config(&config)
        .expect("valid config")
        .positions()
        .to_vec()
}

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("proximity_rebuild");
    for count in [80, 300, 1000] {
        let points = positions(count);
        for strategy in [ProximityStrategy::BruteForce, ProximityStrategy::Grid] {
            let mut builder = ProximityGraphBuilder::new(strategy);
            group.bench_with_input(
                BenchmarkId::new(format!("{strategy:?}"), count),
                &points,
                |b, points| b.iter(|| builder.rebuild(black_box(points), 2.5).len()),
            );
        }
    }
    group.finish();
}

fn bench_frame(c: &mut Criterion) {
    let config = FieldConfig::network().with_seed(42);
    let mut frame_loop = FrameLoop::from_config(&config).expect("valid config");
    c.bench_function("frame_loop_tick_80", |b| {
        b.iter(|| frame_loop.tick(black_box(1.0 / 60.0)).map(|f| f.edges.len()))
    });
}

criterion_group!(benches, bench_rebuild, bench_frame);
criterion_main!(benches);
