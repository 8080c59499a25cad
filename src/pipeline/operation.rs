//! Operation abstraction for the pipeline.
//!
//! Every pipeline participant implements [`VertexOperation`]: a build-time
//! `load` step that negotiates dependencies and decides whether the operation
//! is needed, and a per-vertex `operate` step. Attribute slots are operations
//! too; they report [`OperationKind::Attribute`] so the pipeline applies the
//! include-at-most-once rule to them.
//!
//! Operation instances are shared (`Arc`) across pipelines and threads, so
//! they take `&self` everywhere. Anything that varies per build belongs in the
//! [`RenderContext`], which is confined to one worker.

use crate::pipeline::compiler::BuildState;
use crate::pipeline::context::{RenderContext, RenderModes};
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::id::{AttributeSlotId, OperationId};
use crate::pipeline::registry::{OperationRegistry, StandardOperations};
use crate::pipeline::source::VertexSource;
use std::sync::Arc;

/// Whether an operation is a plain step or a shared attribute slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Plain,
    Attribute(AttributeSlotId),
}

/// A unit of per-vertex work with a stable type identifier.
pub trait VertexOperation: Send + Sync {
    /// Human-readable name, used in logs and cycle reports.
    fn name(&self) -> &str;

    /// Id of this operation's *type*, allocated once by the registry.
    fn operation_id(&self) -> OperationId;

    fn kind(&self) -> OperationKind {
        OperationKind::Plain
    }

    /// Prepare for a build against the bound source.
    ///
    /// Register dependencies through `load` and return `Ok(true)` to take part
    /// in the compiled order, `Ok(false)` if redundant for this build. Errors
    /// abort the build.
    fn load(&self, load: &mut LoadContext<'_>) -> PipelineResult<bool>;

    /// Apply the operation to the current vertex.
    fn operate(&self, ctx: &mut RenderContext);
}

/// Build-time view handed to [`VertexOperation::load`].
///
/// Exposes the render context, the bound source, and the dependency API.
/// The dependency API only exists here, so it cannot be called outside an
/// active build.
pub struct LoadContext<'a> {
    ctx: &'a mut RenderContext,
    source: &'a dyn VertexSource,
    registry: &'a OperationRegistry,
    build: &'a mut BuildState,
}

impl<'a> LoadContext<'a> {
    pub(crate) fn new(
        ctx: &'a mut RenderContext,
        source: &'a dyn VertexSource,
        registry: &'a OperationRegistry,
        build: &'a mut BuildState,
    ) -> Self {
        Self {
            ctx,
            source,
            registry,
            build,
        }
    }

    pub fn context(&self) -> &RenderContext {
        self.ctx
    }

    pub fn context_mut(&mut self) -> &mut RenderContext {
        self.ctx
    }

    pub fn source(&self) -> &dyn VertexSource {
        self.source
    }

    pub fn modes(&self) -> RenderModes {
        self.ctx.modes()
    }

    /// Ids of the built-in attributes and operation types.
    pub fn standard(&self) -> &StandardOperations {
        self.registry.standard()
    }

    /// Make the loading operation depend on attribute `slot`, enqueuing the
    /// slot into this build if it is not active yet.
    pub fn add_dependency(&mut self, slot: AttributeSlotId) -> PipelineResult<()> {
        let attribute = self
            .registry
            .attribute(slot)
            .ok_or(PipelineError::UnknownAttribute(slot))?;
        self.add_requirement(attribute.operation_id())?;
        self.build.activate(slot, attribute);
        Ok(())
    }

    /// Make the loading operation run after operation type `operation`, if
    /// that type is armed in this build. Does not enqueue anything.
    pub fn add_requirement(&mut self, operation: OperationId) -> PipelineResult<()> {
        self.build.add_edge(operation)
    }

    /// Record that this build reads attribute `slot` from the source's array.
    /// The attribute's `operate` then never takes its fallback path.
    pub fn mark_provided(&mut self, slot: AttributeSlotId) {
        self.ctx.mark_provided(slot);
    }

    /// Whether attribute `slot` is already part of this build.
    pub fn is_active(&self, slot: AttributeSlotId) -> bool {
        self.build.is_active(slot)
    }
}

/// Shared handle to an operation.
pub type OperationRef = Arc<dyn VertexOperation>;
