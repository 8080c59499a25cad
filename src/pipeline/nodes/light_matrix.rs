//! LightMatrixBrightness: Smooth lightmap values from the context light matrix.

use crate::pipeline::context::RenderContext;
use crate::pipeline::error::PipelineResult;
use crate::pipeline::id::OperationId;
use crate::pipeline::operation::{LoadContext, VertexOperation};
use crate::pipeline::registry::OperationRegistry;

pub struct LightMatrixBrightness {
    id: OperationId,
}

impl LightMatrixBrightness {
    pub fn new(registry: &OperationRegistry) -> Self {
        Self {
            id: registry.standard().light_matrix,
        }
    }
}

impl VertexOperation for LightMatrixBrightness {
    fn name(&self) -> &str {
        "LightMatrixBrightness"
    }

    fn operation_id(&self) -> OperationId {
        self.id
    }

    fn load(&self, load: &mut LoadContext<'_>) -> PipelineResult<bool> {
        let light_coord = load.standard().light_coord.slot;
        load.add_dependency(light_coord)?;
        Ok(true)
    }

    fn operate(&self, ctx: &mut RenderContext) {
        let brightness = ctx.light_matrix.brightness(&ctx.light_coord);
        ctx.set_brightness(brightness);
    }
}
