//! Pipeline executor: Build lifecycle and the per-vertex loop.
//!
//! A [`Pipeline`] owns the operation set, the node table and the compiled
//! order. A [`RenderState`] pairs one pipeline with the [`RenderContext`] it
//! runs against; each worker owns exactly one. Rendering a range:
//!
//! 1. Rebuild the compiled order if the operation set, source or modes changed.
//! 2. For each vertex: load the raw record and clear per-vertex flags.
//! 3. Let the source push precomputed values (`prepare_vertex`).
//! 4. Run the compiled order once.
//! 5. Hand the context to the sink.

use crate::pipeline::compiled_plan::CompiledPlan;
use crate::pipeline::compiler::{BuildState, PipelineCompiler};
use crate::pipeline::context::{RenderContext, RenderModes};
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::id::AttributeSlotId;
use crate::pipeline::operation::OperationRef;
use crate::pipeline::registry::OperationRegistry;
use crate::pipeline::sink::VertexSink;
use crate::pipeline::source::VertexSource;
use std::sync::Arc;

/// Dependency graph over an operation set, plus its compiled order.
pub struct Pipeline {
    registry: Arc<OperationRegistry>,
    operations: Vec<OperationRef>,
    build: BuildState,
    /// Cached compiled execution plan
    plan: CompiledPlan,
    /// Generation counter, bumped on every build attempt
    generation: u64,
    /// Whether the plan needs recompiling before the next render
    dirty: bool,
}

impl Pipeline {
    pub fn new(registry: Arc<OperationRegistry>) -> Self {
        Self {
            registry,
            operations: Vec::new(),
            build: BuildState::new(),
            plan: CompiledPlan::new(),
            generation: 0,
            dirty: false,
        }
    }

    pub fn registry(&self) -> &Arc<OperationRegistry> {
        &self.registry
    }

    /// Replace the operation set. The old order is dropped immediately and the
    /// new one is compiled on next use.
    pub fn set_operations<I>(&mut self, operations: I)
    where
        I: IntoIterator<Item = OperationRef>,
    {
        self.operations.clear();
        self.operations.extend(operations);
        self.unbuild();
        self.dirty = true;
    }

    /// Start collecting a new operation set.
    pub fn builder(&mut self) -> PipelineBuilder<'_> {
        PipelineBuilder {
            pipeline: self,
            operations: Vec::new(),
        }
    }

    pub fn operations(&self) -> &[OperationRef] {
        &self.operations
    }

    /// Drop the operation set and the compiled order.
    pub fn reset(&mut self) {
        self.operations.clear();
        self.unbuild();
        self.dirty = false;
    }

    /// Mark the compiled order stale without dropping it.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn unbuild(&mut self) {
        self.build.clear();
        self.plan.clear();
    }

    /// Compile the operation set against the source bound to `ctx`.
    ///
    /// Does nothing if there are no operations or no source is bound. On
    /// error the compiled order is left empty and the pipeline stays dirty.
    pub fn rebuild(&mut self, ctx: &mut RenderContext) -> PipelineResult<()> {
        if self.operations.is_empty() || ctx.source().is_none() {
            return Ok(());
        }

        self.generation += 1;
        match PipelineCompiler::compile(
            &mut self.build,
            &self.operations,
            ctx,
            &self.registry,
            self.generation,
        ) {
            Ok(plan) => {
                tracing::debug!(
                    "Pipeline rebuilt: {} armed / {} loaded, {} attributes (gen {}, {} us)",
                    plan.stats.armed,
                    plan.stats.loaded,
                    plan.stats.active_attributes,
                    plan.generation,
                    plan.stats.compile_time_us,
                );
                self.plan = plan;
                self.dirty = false;
                Ok(())
            }
            Err(e) => {
                self.unbuild();
                self.dirty = true;
                Err(e)
            }
        }
    }

    /// Recompile only if something changed since the last build.
    pub fn rebuild_if_needed(&mut self, ctx: &mut RenderContext) -> PipelineResult<()> {
        if self.dirty {
            self.rebuild(ctx)?;
        }
        Ok(())
    }

    /// Run the compiled order once against the current vertex.
    #[inline]
    pub fn operate(&self, ctx: &mut RenderContext) {
        for op in &self.plan.order {
            op.operate(ctx);
        }
    }

    pub fn plan(&self) -> &CompiledPlan {
        &self.plan
    }

    /// Whether attribute `slot` joined the last build.
    pub fn is_attribute_active(&self, slot: AttributeSlotId) -> bool {
        self.build.is_active(slot)
    }
}

/// Collects operations for [`Pipeline::set_operations`].
pub struct PipelineBuilder<'a> {
    pipeline: &'a mut Pipeline,
    operations: Vec<OperationRef>,
}

impl PipelineBuilder<'_> {
    pub fn add(mut self, operation: OperationRef) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn add_all<I>(mut self, operations: I) -> Self
    where
        I: IntoIterator<Item = OperationRef>,
    {
        self.operations.extend(operations);
        self
    }

    /// Install the collected operations on the pipeline.
    pub fn build(self) {
        self.pipeline.set_operations(self.operations);
    }
}

/// One worker's render context together with its pipeline.
///
/// Create one per worker thread and pass it explicitly; it is never shared.
pub struct RenderState {
    pub ctx: RenderContext,
    pipeline: Pipeline,
}

impl RenderState {
    pub fn new(registry: Arc<OperationRegistry>) -> Self {
        Self {
            ctx: RenderContext::new(),
            pipeline: Pipeline::new(registry),
        }
    }

    pub fn registry(&self) -> &Arc<OperationRegistry> {
        self.pipeline.registry()
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Unbind the source, drop the operations and restore default modes.
    pub fn reset(&mut self) {
        self.ctx.reset();
        self.pipeline.reset();
    }

    pub fn set_operations<I>(&mut self, operations: I)
    where
        I: IntoIterator<Item = OperationRef>,
    {
        self.pipeline.set_operations(operations);
    }

    pub fn builder(&mut self) -> PipelineBuilder<'_> {
        self.pipeline.builder()
    }

    /// Bind `source`, rebuilding immediately if it differs (by identity)
    /// from the bound one.
    pub fn bind_source(&mut self, source: Arc<dyn VertexSource>) -> PipelineResult<()> {
        if self.ctx.bind_source(source) {
            self.pipeline.invalidate();
            self.pipeline.rebuild(&mut self.ctx)?;
        }
        Ok(())
    }

    /// Set the half-open vertex range. Not validated until [`render`](Self::render).
    pub fn set_range(&mut self, first: usize, last: usize) {
        self.ctx.set_range(first, last);
    }

    /// Bind `source` and set the range in one step.
    pub fn set_source(
        &mut self,
        source: Arc<dyn VertexSource>,
        first: usize,
        last: usize,
    ) -> PipelineResult<()> {
        self.bind_source(source)?;
        self.set_range(first, last);
        Ok(())
    }

    /// Bind `source` and select all of its vertices.
    pub fn set_source_full(&mut self, source: Arc<dyn VertexSource>) -> PipelineResult<()> {
        let len = source.vertices().len();
        self.set_source(source, 0, len)
    }

    pub fn modes(&self) -> RenderModes {
        self.ctx.modes()
    }

    /// Replace the mode flags, invalidating the compiled order if they changed.
    pub fn set_modes(&mut self, modes: RenderModes) {
        if self.ctx.set_modes(modes) {
            self.pipeline.invalidate();
        }
    }

    /// Normals on, lighting off.
    pub fn set_dynamic(&mut self) {
        let modes = RenderModes {
            use_normals: true,
            compute_lighting: false,
            ..self.ctx.modes()
        };
        self.set_modes(modes);
    }

    pub fn rebuild(&mut self) -> PipelineResult<()> {
        self.pipeline.rebuild(&mut self.ctx)
    }

    pub fn rebuild_if_needed(&mut self) -> PipelineResult<()> {
        self.pipeline.rebuild_if_needed(&mut self.ctx)
    }

    /// Run the compiled order once for the current vertex.
    pub fn run_pipeline(&mut self) {
        self.pipeline.operate(&mut self.ctx);
    }

    /// Process every vertex of the active range into `sink`.
    ///
    /// Returns the number of vertices written.
    pub fn render<S>(&mut self, sink: &mut S) -> PipelineResult<usize>
    where
        S: VertexSink + ?Sized,
    {
        self.rebuild_if_needed()?;

        let source = self.ctx.source().cloned().ok_or(PipelineError::NoSource)?;
        let vertices = source.vertices();
        let (first, last) = (self.ctx.first_vertex, self.ctx.last_vertex);
        if first > last || last > vertices.len() {
            return Err(PipelineError::RangeOutOfBounds {
                first,
                last,
                len: vertices.len(),
            });
        }

        for (index, vertex) in vertices.iter().enumerate().take(last).skip(first) {
            self.ctx.begin_vertex(index, *vertex);
            source.prepare_vertex(&mut self.ctx);
            self.pipeline.operate(&mut self.ctx);
            sink.write_vertex(&self.ctx);
        }
        Ok(last - first)
    }

    /// Replace the operation set and render the active range.
    pub fn render_with<I, S>(&mut self, operations: I, sink: &mut S) -> PipelineResult<usize>
    where
        I: IntoIterator<Item = OperationRef>,
        S: VertexSink + ?Sized,
    {
        self.set_operations(operations);
        self.render(sink)
    }
}
