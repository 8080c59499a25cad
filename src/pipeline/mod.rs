//! Per-vertex operation pipeline.
//!
//! Vertices flow from a [`VertexSource`] through a compiled, dependency-sorted
//! list of [`VertexOperation`]s into a [`VertexSink`]. Operations declare
//! their dependencies once per build, while loading; the per-vertex loop then
//! only runs the armed operations, in order.
//!
//! # Architecture
//!
//! ```text
//! [VertexSource] ──► begin_vertex ──► prepare_vertex ──► [compiled order] ──► [VertexSink]
//!                                                         Side
//!                                                         Normal
//!                                                         Colour
//!                                                         VertexTransform
//!                                                         ...
//! ```
//!
//! # Design
//!
//! - **Explicit registry**: [`OperationRegistry`] allocates operation type
//!   ids and attribute slots; shared by `Arc`, never global.
//! - **One state per worker**: [`RenderState`] bundles a [`RenderContext`]
//!   with its [`Pipeline`]; nothing on the hot path is shared mutably.
//! - **Lazy rebuild**: changing the operation set, the bound source, or the
//!   modes only marks the pipeline dirty; the next render recompiles.
//! - **Attributes load once**: an attribute slot joins a build at most once,
//!   however many operations depend on it.
//! - **Cycles are errors**: a dependency cycle aborts the build with
//!   [`PipelineError::CycleDetected`] naming the chain.

pub mod attributes;
pub mod compiled_plan;
pub mod compiler;
pub mod context;
pub mod error;
pub mod executor;
pub mod id;
pub mod nodes;
pub mod operation;
pub mod registry;
pub mod sink;
pub mod source;

pub use attributes::{
    ColourAttribute, LightCoordAttribute, LightingAttribute, NormalAttribute, SideAttribute,
};
pub use compiled_plan::{CompiledPlan, PlanStats};
pub use compiler::BuildState;
pub use context::{RenderContext, RenderModes};
pub use error::{PipelineError, PipelineResult};
pub use executor::{Pipeline, PipelineBuilder, RenderState};
pub use id::{AttributeKey, AttributeSlotId, OperationId};
pub use nodes::{
    ColourMultiplier, LightMatrixBrightness, PlanarLightModel, SpriteRegion, SpriteUvTransform,
    VertexTransform,
};
pub use operation::{LoadContext, OperationKind, OperationRef, VertexOperation};
pub use registry::{OperationRegistry, StandardOperations};
pub use sink::{OutputVertex, VertexBuffer, VertexSink};
pub use source::{AttributeArray, VertexSource};
