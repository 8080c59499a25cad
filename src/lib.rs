//! # vertex-pipeline: Per-Vertex Operation Pipeline
//!
//! A CPU-side mesh generation pipeline. Vertices are pulled from a
//! [`VertexSource`](pipeline::VertexSource), pushed through a
//! dependency-sorted list of operations that resolve normals, colours,
//! lighting and texture coordinates, and written to a
//! [`VertexSink`](pipeline::VertexSink).
//!
//! ## Architecture
//!
//! - **Registry**: [`OperationRegistry`](pipeline::OperationRegistry) hands out
//!   operation type ids and attribute slots, shared by `Arc`
//! - **Pipeline**: compiles an operation set once per build, then runs the
//!   compiled order for every vertex
//! - **Render state**: one [`RenderState`](pipeline::RenderState) per worker
//!   thread, never shared
//! - **Mesher**: [`BatchMesher`](mesher::BatchMesher) fans batches out to
//!   workers over crossbeam channels
//!
//! ## Configuration
//!
//! Render settings are read from `config.toml` in the platform config
//! directory under `vertex-pipeline` (see [`config`]).
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use vertex_pipeline::{
//!     model::Model,
//!     pipeline::{ColourMultiplier, OperationRegistry, RenderState, VertexBuffer},
//!     types::Vector3,
//! };
//!
//! let registry = OperationRegistry::shared();
//! let model = Arc::new(Model::cuboid(&registry, Vector3::ZERO, Vector3::new(1.0, 1.0, 1.0)));
//!
//! let mut state = RenderState::new(registry.clone());
//! state.set_operations([Arc::new(ColourMultiplier::new(&registry, 0xFF80_80FF)) as _]);
//! state.set_source_full(model)?;
//!
//! let mut buffer = VertexBuffer::new();
//! state.render(&mut buffer)?;
//! ```

pub mod config;
pub mod error;
pub mod mesher;
pub mod model;
pub mod pipeline;
pub mod types;

// Re-export commonly used types
pub use config::RenderConfig;
pub use error::{Error, Result, ResultExt};
pub use mesher::{BatchMesher, MeshOutput};
pub use model::{Model, ModelBuilder};
pub use pipeline::{OperationRegistry, PipelineError, RenderState};
