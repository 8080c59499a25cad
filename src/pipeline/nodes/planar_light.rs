//! PlanarLightModel: Fixed per-face shading.
//!
//! The classic directional look: every side has a constant shade that is
//! multiplied into the vertex colour.

use crate::pipeline::context::RenderContext;
use crate::pipeline::error::PipelineResult;
use crate::pipeline::id::OperationId;
use crate::pipeline::operation::{LoadContext, VertexOperation};
use crate::pipeline::registry::OperationRegistry;
use crate::types::{rgba, Side};

/// Default shades, in [`Side`] order: bottom 50%, top 100%, north/south 80%, west/east 60%.
pub const STANDARD_SHADES: [u32; 6] = [
    0x7F7F_7FFF,
    0xFFFF_FFFF,
    0xCCCC_CCFF,
    0xCCCC_CCFF,
    0x9999_99FF,
    0x9999_99FF,
];

pub struct PlanarLightModel {
    id: OperationId,
    shades: [u32; 6],
}

impl PlanarLightModel {
    pub fn new(registry: &OperationRegistry, shades: [u32; 6]) -> Self {
        Self {
            id: registry.standard().light_model,
            shades,
        }
    }

    pub fn standard(registry: &OperationRegistry) -> Self {
        Self::new(registry, STANDARD_SHADES)
    }

    pub fn shade(&self, side: Side) -> u32 {
        self.shades[side.index()]
    }
}

impl VertexOperation for PlanarLightModel {
    fn name(&self) -> &str {
        "PlanarLightModel"
    }

    fn operation_id(&self) -> OperationId {
        self.id
    }

    fn load(&self, load: &mut LoadContext<'_>) -> PipelineResult<bool> {
        if !load.modes().compute_lighting {
            return Ok(false);
        }
        let standard = *load.standard();
        load.add_dependency(standard.side.slot)?;
        load.add_dependency(standard.colour.slot)?;
        Ok(true)
    }

    fn operate(&self, ctx: &mut RenderContext) {
        let colour = rgba::multiply(ctx.colour, self.shade(ctx.side));
        ctx.set_colour(colour);
    }
}
