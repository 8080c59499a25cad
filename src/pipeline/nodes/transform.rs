//! VertexTransform: Affine placement of model vertices.
//!
//! Applies a uniform scale, then a rotation about the Y axis in quarter
//! turns, then a translation. Normals are rotated but never scaled or moved.

use crate::pipeline::context::RenderContext;
use crate::pipeline::error::PipelineResult;
use crate::pipeline::id::OperationId;
use crate::pipeline::operation::{LoadContext, VertexOperation};
use crate::pipeline::registry::OperationRegistry;
use crate::types::Vector3;

pub struct VertexTransform {
    id: OperationId,
    translation: Vector3,
    scale: f64,
    /// Clockwise quarter turns about +Y, `0..4`
    quarter_turns: u8,
}

impl VertexTransform {
    pub fn new(registry: &OperationRegistry) -> Self {
        Self {
            id: registry.standard().transform,
            translation: Vector3::ZERO,
            scale: 1.0,
            quarter_turns: 0,
        }
    }

    pub fn translate(mut self, translation: Vector3) -> Self {
        self.translation = translation;
        self
    }

    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn rotate_y(mut self, quarter_turns: u8) -> Self {
        self.quarter_turns = quarter_turns % 4;
        self
    }

    pub fn is_identity(&self) -> bool {
        self.translation == Vector3::ZERO && self.scale == 1.0 && self.quarter_turns == 0
    }

    #[inline]
    fn rotate(&self, v: Vector3) -> Vector3 {
        match self.quarter_turns {
            1 => Vector3::new(-v.z, v.y, v.x),
            2 => Vector3::new(-v.x, v.y, -v.z),
            3 => Vector3::new(v.z, v.y, -v.x),
            _ => v,
        }
    }

    /// Transform a single position.
    pub fn apply(&self, position: Vector3) -> Vector3 {
        self.rotate(position * self.scale) + self.translation
    }
}

impl VertexOperation for VertexTransform {
    fn name(&self) -> &str {
        "VertexTransform"
    }

    fn operation_id(&self) -> OperationId {
        self.id
    }

    fn load(&self, load: &mut LoadContext<'_>) -> PipelineResult<bool> {
        if self.is_identity() {
            return Ok(false);
        }
        if load.modes().use_normals {
            let normal = load.standard().normal.slot;
            load.add_dependency(normal)?;
        }
        Ok(true)
    }

    fn operate(&self, ctx: &mut RenderContext) {
        ctx.vertex.position = self.apply(ctx.vertex.position);
        if ctx.has_normal {
            let normal = self.rotate(ctx.normal);
            ctx.set_normal(normal);
        }
    }
}
