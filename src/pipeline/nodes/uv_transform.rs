//! SpriteUvTransform: Maps model UVs into a texture atlas region.

use crate::pipeline::context::RenderContext;
use crate::pipeline::error::PipelineResult;
use crate::pipeline::id::OperationId;
use crate::pipeline::operation::{LoadContext, VertexOperation};
use crate::pipeline::registry::OperationRegistry;
use crate::types::Uv;
use serde::{Deserialize, Serialize};

/// Sub-rectangle of an atlas, in normalized texture coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpriteRegion {
    pub min_u: f64,
    pub min_v: f64,
    pub max_u: f64,
    pub max_v: f64,
}

impl SpriteRegion {
    /// The whole texture.
    pub const FULL: SpriteRegion = SpriteRegion {
        min_u: 0.0,
        min_v: 0.0,
        max_u: 1.0,
        max_v: 1.0,
    };

    pub fn new(min_u: f64, min_v: f64, max_u: f64, max_v: f64) -> Self {
        Self {
            min_u,
            min_v,
            max_u,
            max_v,
        }
    }

    #[inline]
    pub fn interpolate(&self, uv: Uv) -> Uv {
        Uv::new(
            self.min_u + (self.max_u - self.min_u) * uv.u,
            self.min_v + (self.max_v - self.min_v) * uv.v,
        )
    }
}

pub struct SpriteUvTransform {
    id: OperationId,
    region: SpriteRegion,
}

impl SpriteUvTransform {
    pub fn new(registry: &OperationRegistry, region: SpriteRegion) -> Self {
        Self {
            id: registry.standard().uv_transform,
            region,
        }
    }
}

impl VertexOperation for SpriteUvTransform {
    fn name(&self) -> &str {
        "SpriteUvTransform"
    }

    fn operation_id(&self) -> OperationId {
        self.id
    }

    fn load(&self, _load: &mut LoadContext<'_>) -> PipelineResult<bool> {
        Ok(self.region != SpriteRegion::FULL)
    }

    fn operate(&self, ctx: &mut RenderContext) {
        ctx.vertex.uv = self.region.interpolate(ctx.vertex.uv);
    }
}
