//! Benchmarks for per-vertex rendering and pipeline builds
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use vertex_pipeline::config::{RenderConfig, WorkerConfig};
use vertex_pipeline::mesher::BatchMesher;
use vertex_pipeline::model::Model;
use vertex_pipeline::pipeline::{
    ColourMultiplier, LightMatrixBrightness, OperationRef, OperationRegistry, PlanarLightModel,
    RenderState, SpriteRegion, SpriteUvTransform, VertexBuffer, VertexSource, VertexTransform,
};
use vertex_pipeline::types::{Side, Vector3, Vertex};

fn operations(registry: &OperationRegistry) -> Vec<OperationRef> {
    vec![
        Arc::new(VertexTransform::new(registry).translate(Vector3::new(16.0, 64.0, 16.0))),
        Arc::new(ColourMultiplier::new(registry, 0xE0E0_FFFF)),
        Arc::new(PlanarLightModel::standard(registry)),
        Arc::new(SpriteUvTransform::new(
            registry,
            SpriteRegion::new(0.0, 0.0, 0.0625, 0.0625),
        )),
        Arc::new(LightMatrixBrightness::new(registry)),
    ]
}

/// `count` vertices spread over the faces of a unit block
fn model(registry: &OperationRegistry, count: usize) -> Arc<dyn VertexSource> {
    let vertices = (0..count)
        .map(|i| {
            let f = (i % 17) as f64 / 16.0;
            Vertex::at(f, 1.0 - f, f * 0.5, f, 1.0 - f)
        })
        .collect();
    let sides = (0..count).map(Side::from_index).collect();
    Arc::new(
        Model::builder()
            .vertices(vertices)
            .sides(registry.standard().side.slot, sides)
            .build(),
    )
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let registry = OperationRegistry::shared();

    for size in [1_000, 10_000, 100_000].iter() {
        let source = model(&registry, *size);
        let mut state = RenderState::new(registry.clone());
        state.set_operations(operations(&registry));
        state.set_source_full(source).unwrap();
        let mut sink = VertexBuffer::with_capacity(*size);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                sink.clear();
                black_box(state.render(&mut sink).unwrap());
            });
        });
    }

    group.finish();
}

fn bench_rebuild(c: &mut Criterion) {
    let registry = OperationRegistry::shared();
    let mut state = RenderState::new(registry.clone());
    state.set_operations(operations(&registry));
    state.set_source_full(model(&registry, 4)).unwrap();

    c.bench_function("rebuild", |b| {
        b.iter(|| {
            state.rebuild().unwrap();
            black_box(state.pipeline().plan().len());
        });
    });
}

fn bench_mesher(c: &mut Criterion) {
    let mut group = c.benchmark_group("mesher");
    let registry = OperationRegistry::shared();
    let source = model(&registry, 100_000);

    for threads in [1, 2, 4].iter() {
        let config = RenderConfig {
            workers: WorkerConfig {
                threads: *threads,
                batch_size: 4096,
            },
            ..RenderConfig::default()
        };
        let mesher = BatchMesher::new(registry.clone(), config).with_operations(operations(&registry));

        group.throughput(Throughput::Elements(100_000));
        group.bench_with_input(BenchmarkId::from_parameter(threads), threads, |b, _| {
            b.iter(|| black_box(mesher.mesh(source.clone()).unwrap().vertices.len()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_render, bench_rebuild, bench_mesher);
criterion_main!(benches);
