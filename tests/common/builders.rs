//! Test data builders for creating test models and operations

use super::OperateLog;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use vertex_pipeline::model::{Model, ModelBuilder};
use vertex_pipeline::pipeline::{
    AttributeKey, AttributeSlotId, LoadContext, OperationId, OperationKind, OperationRef,
    OperationRegistry, PipelineResult, RenderContext, VertexOperation, VertexSource,
};
use vertex_pipeline::types::{Side, Vertex};

/// Builder for flat test models: `count` vertices along the X axis
pub struct ModelFixture {
    count: usize,
    builder: ModelBuilder,
}

impl ModelFixture {
    pub fn new(count: usize) -> Self {
        let vertices = (0..count)
            .map(|i| Vertex::at(i as f64, 0.0, 0.0, 0.0, 0.0))
            .collect();
        Self {
            count,
            builder: Model::builder().vertices(vertices),
        }
    }

    /// Every vertex on `side`
    pub fn sides(mut self, slot: AttributeSlotId, side: Side) -> Self {
        self.builder = self.builder.sides(slot, vec![side; self.count]);
        self
    }

    pub fn colours(mut self, slot: AttributeSlotId, colours: Vec<u32>) -> Self {
        assert_eq!(colours.len(), self.count);
        self.builder = self.builder.colours(slot, colours);
        self
    }

    pub fn advertise(mut self, slot: AttributeSlotId) -> Self {
        self.builder = self.builder.advertise(slot);
        self
    }

    pub fn map(mut self, f: impl FnOnce(ModelBuilder) -> ModelBuilder) -> Self {
        self.builder = f(self.builder);
        self
    }

    pub fn build(self) -> Arc<Model> {
        Arc::new(self.builder.build())
    }
}

/// Plain operation with configurable dependencies that logs when it runs
pub struct RecordingOp {
    id: OperationId,
    name: String,
    attributes: Vec<AttributeSlotId>,
    requirements: Vec<OperationId>,
    loads: bool,
    log: Option<OperateLog>,
}

impl RecordingOp {
    pub fn new(id: OperationId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            attributes: Vec::new(),
            requirements: Vec::new(),
            loads: true,
            log: None,
        }
    }

    /// Register a fresh operation type and wrap it
    pub fn register(registry: &OperationRegistry, name: &str) -> Self {
        Self::new(registry.register_operation_type(), name)
    }

    pub fn id(&self) -> OperationId {
        self.id
    }

    pub fn depends_on(mut self, slot: AttributeSlotId) -> Self {
        self.attributes.push(slot);
        self
    }

    pub fn requires(mut self, operation: OperationId) -> Self {
        self.requirements.push(operation);
        self
    }

    pub fn rejects(mut self) -> Self {
        self.loads = false;
        self
    }

    pub fn logging(mut self, log: &OperateLog) -> Self {
        self.log = Some(log.clone());
        self
    }

    pub fn shared(self) -> OperationRef {
        Arc::new(self)
    }
}

impl VertexOperation for RecordingOp {
    fn name(&self) -> &str {
        &self.name
    }

    fn operation_id(&self) -> OperationId {
        self.id
    }

    fn load(&self, load: &mut LoadContext<'_>) -> PipelineResult<bool> {
        for slot in &self.attributes {
            load.add_dependency(*slot)?;
        }
        for operation in &self.requirements {
            load.add_requirement(*operation)?;
        }
        Ok(self.loads)
    }

    fn operate(&self, _ctx: &mut RenderContext) {
        if let Some(log) = &self.log {
            log.lock().unwrap().push(self.name.clone());
        }
    }
}

/// Attribute slot that counts which load path it took
pub struct CountingAttribute {
    key: AttributeKey,
    pub provided_loads: AtomicUsize,
    pub fallback_loads: AtomicUsize,
    pub fallback_operates: AtomicUsize,
}

impl CountingAttribute {
    pub fn register(registry: &OperationRegistry) -> Arc<CountingAttribute> {
        registry.register_attribute_slot(|key| CountingAttribute {
            key,
            provided_loads: AtomicUsize::new(0),
            fallback_loads: AtomicUsize::new(0),
            fallback_operates: AtomicUsize::new(0),
        })
    }

    pub fn key(&self) -> AttributeKey {
        self.key
    }

    pub fn counts(&self) -> (usize, usize) {
        (
            self.provided_loads.load(Ordering::SeqCst),
            self.fallback_loads.load(Ordering::SeqCst),
        )
    }
}

impl VertexOperation for CountingAttribute {
    fn name(&self) -> &str {
        "Counting"
    }

    fn operation_id(&self) -> OperationId {
        self.key.operation
    }

    fn kind(&self) -> OperationKind {
        OperationKind::Attribute(self.key.slot)
    }

    fn load(&self, load: &mut LoadContext<'_>) -> PipelineResult<bool> {
        if load.source().provides_attribute(self.key.slot) {
            self.provided_loads.fetch_add(1, Ordering::SeqCst);
            load.mark_provided(self.key.slot);
        } else {
            self.fallback_loads.fetch_add(1, Ordering::SeqCst);
        }
        Ok(true)
    }

    fn operate(&self, ctx: &mut RenderContext) {
        if !ctx.is_provided(self.key.slot) {
            self.fallback_operates.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_fixture() {
        let registry = OperationRegistry::new();
        let side = registry.standard().side.slot;
        let model = ModelFixture::new(3).sides(side, Side::North).build();
        assert_eq!(model.vertex_count(), 3);
        assert!(model.attribute(side).is_some());
    }
}
