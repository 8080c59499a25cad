//! Integration tests for the multi-threaded batch mesher

mod common;

use common::builders::ModelFixture;
use std::sync::Arc;
use vertex_pipeline::config::{RenderConfig, WorkerConfig};
use vertex_pipeline::mesher::BatchMesher;
use vertex_pipeline::model::Model;
use vertex_pipeline::pipeline::{
    ColourMultiplier, LightMatrixBrightness, OperationRef, OperationRegistry, PlanarLightModel,
    RenderState, VertexBuffer, VertexSource, VertexTransform,
};
use vertex_pipeline::types::{Side, Vector3};
use vertex_pipeline::Error;

fn config(threads: usize, batch_size: usize) -> RenderConfig {
    RenderConfig {
        workers: WorkerConfig {
            threads,
            batch_size,
        },
        ..RenderConfig::default()
    }
}

fn demo_operations(registry: &OperationRegistry) -> Vec<OperationRef> {
    vec![
        Arc::new(VertexTransform::new(registry).translate(Vector3::new(1.0, 2.0, 3.0))),
        Arc::new(ColourMultiplier::new(registry, 0xC0C0_FFFF)),
        Arc::new(PlanarLightModel::standard(registry)),
        Arc::new(LightMatrixBrightness::new(registry)),
    ]
}

#[test]
fn test_mesher_matches_direct_render() {
    let registry = OperationRegistry::shared();
    let std = *registry.standard();
    let model: Arc<dyn VertexSource> = ModelFixture::new(1000).sides(std.side.slot, Side::Up).build();

    let mut state = RenderState::new(registry.clone());
    state.set_operations(demo_operations(&registry));
    state.set_source_full(model.clone()).unwrap();
    let mut direct = VertexBuffer::new();
    state.render(&mut direct).unwrap();

    let output = BatchMesher::new(registry.clone(), config(4, 64))
        .with_operations(demo_operations(&registry))
        .mesh(model)
        .unwrap();

    assert_eq!(output.batches, 16);
    assert_eq!(output.workers, 4);
    assert_eq!(output.vertices, direct.into_vertices());
}

#[test]
fn test_mesher_subrange_keeps_source_order() {
    let registry = OperationRegistry::shared();
    let model: Arc<dyn VertexSource> = ModelFixture::new(100).build();

    let output = BatchMesher::new(registry, config(3, 7))
        .mesh_range(model, 10, 50)
        .unwrap();

    assert_eq!(output.vertices.len(), 40);
    for (i, v) in output.vertices.iter().enumerate() {
        common::assert_float_eq(v.position.x, (i + 10) as f64, 1e-12);
    }
}

#[test]
fn test_explain_lists_compiled_order() {
    let registry = OperationRegistry::shared();
    let model: Arc<dyn VertexSource> = Arc::new(Model::cuboid(
        &registry,
        Vector3::ZERO,
        Vector3::new(1.0, 1.0, 1.0),
    ));

    let plan = BatchMesher::new(registry.clone(), config(1, 16))
        .with_operations(demo_operations(&registry))
        .explain(model)
        .unwrap();

    assert_eq!(
        plan.order_names(),
        vec![
            "Colour",
            "Side",
            "VertexTransform",
            "LightCoord",
            "ColourMultiplier",
            "PlanarLightModel",
            "LightMatrixBrightness",
        ]
    );
}

#[test]
fn test_mesher_surfaces_build_errors() {
    let registry = OperationRegistry::shared();
    let mut config = config(2, 4);
    config.modes.use_normals = true;
    let model: Arc<dyn VertexSource> = ModelFixture::new(8).build();
    let colour = registry.attribute(registry.standard().colour.slot).unwrap();

    let err = BatchMesher::new(registry, config)
        .with_operations([colour])
        .mesh(model)
        .unwrap_err();
    assert!(matches!(err, Error::WithContext { .. }));
}
