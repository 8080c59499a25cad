//! ColourMultiplier: Tints the resolved vertex colour.

use crate::pipeline::context::RenderContext;
use crate::pipeline::error::PipelineResult;
use crate::pipeline::id::OperationId;
use crate::pipeline::operation::{LoadContext, VertexOperation};
use crate::pipeline::registry::OperationRegistry;
use crate::types::rgba;

pub struct ColourMultiplier {
    id: OperationId,
    colour: u32,
}

impl ColourMultiplier {
    pub fn new(registry: &OperationRegistry, colour: u32) -> Self {
        Self {
            id: registry.standard().colour_multiplier,
            colour,
        }
    }

    pub fn colour(&self) -> u32 {
        self.colour
    }
}

impl VertexOperation for ColourMultiplier {
    fn name(&self) -> &str {
        "ColourMultiplier"
    }

    fn operation_id(&self) -> OperationId {
        self.id
    }

    fn load(&self, load: &mut LoadContext<'_>) -> PipelineResult<bool> {
        if self.colour == rgba::WHITE {
            return Ok(false);
        }
        let colour = load.standard().colour.slot;
        load.add_dependency(colour)?;
        Ok(true)
    }

    fn operate(&self, ctx: &mut RenderContext) {
        let colour = rgba::multiply(ctx.colour, self.colour);
        ctx.set_colour(colour);
    }
}
