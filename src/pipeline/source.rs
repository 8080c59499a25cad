//! Vertex source boundary.
//!
//! A [`VertexSource`] supplies the raw vertex records for a batch and,
//! optionally, precomputed per-vertex attribute arrays keyed by
//! [`AttributeSlotId`]. Sources are shared (`Arc`) between workers, so they
//! must be `Send + Sync` and are only ever read by the pipeline.

use crate::pipeline::context::RenderContext;
use crate::pipeline::id::AttributeSlotId;
use crate::types::{LightCoord, Side, Vector3, Vertex};

/// Borrowed view of a precomputed attribute array, aligned with vertex order.
#[derive(Debug, Clone, Copy)]
pub enum AttributeArray<'a> {
    Normals(&'a [Vector3]),
    Colours(&'a [u32]),
    Sides(&'a [Side]),
    LightCoords(&'a [LightCoord]),
}

impl<'a> AttributeArray<'a> {
    pub fn len(&self) -> usize {
        match self {
            AttributeArray::Normals(a) => a.len(),
            AttributeArray::Colours(a) => a.len(),
            AttributeArray::Sides(a) => a.len(),
            AttributeArray::LightCoords(a) => a.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn normal(&self, index: usize) -> Option<Vector3> {
        match self {
            AttributeArray::Normals(a) => a.get(index).copied(),
            _ => None,
        }
    }

    #[inline]
    pub fn colour(&self, index: usize) -> Option<u32> {
        match self {
            AttributeArray::Colours(a) => a.get(index).copied(),
            _ => None,
        }
    }

    #[inline]
    pub fn side(&self, index: usize) -> Option<Side> {
        match self {
            AttributeArray::Sides(a) => a.get(index).copied(),
            _ => None,
        }
    }

    #[inline]
    pub fn light_coord(&self, index: usize) -> Option<LightCoord> {
        match self {
            AttributeArray::LightCoords(a) => a.get(index).copied(),
            _ => None,
        }
    }
}

/// Supplies vertices and optional precomputed attributes to the pipeline.
pub trait VertexSource: Send + Sync {
    /// All vertex records in draw order.
    fn vertices(&self) -> &[Vertex];

    /// Precomputed array for `slot`, or `None` if not computed.
    fn attribute_array(&self, slot: AttributeSlotId) -> Option<AttributeArray<'_>>;

    /// Whether this source advertises `slot`. An advertised slot must be
    /// backed by an [`attribute_array`](Self::attribute_array) of the right
    /// kind covering every vertex, or the build fails.
    fn provides_attribute(&self, slot: AttributeSlotId) -> bool;

    /// Called once per vertex, before the pipeline runs. Lets the source push
    /// per-vertex context state such as the base colour or light matrix.
    fn prepare_vertex(&self, _ctx: &mut RenderContext) {}
}
