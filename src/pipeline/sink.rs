//! Vertex sink boundary and a collecting implementation.

use crate::pipeline::context::RenderContext;
use crate::types::{Uv, Vector3};
use serde::{Deserialize, Serialize};

/// Consumes the resolved output of one vertex.
///
/// Called once per vertex after the compiled pipeline ran. Implementations
/// should only read the outputs whose `has_*` flag is set.
#[cfg_attr(test, mockall::automock)]
pub trait VertexSink {
    fn write_vertex(&mut self, ctx: &RenderContext);
}

/// One fully resolved output vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputVertex {
    pub position: Vector3,
    pub uv: Uv,
    pub normal: Option<Vector3>,
    pub colour: Option<u32>,
    pub brightness: Option<u32>,
}

impl OutputVertex {
    pub fn from_context(ctx: &RenderContext) -> Self {
        Self {
            position: ctx.vertex.position,
            uv: ctx.vertex.uv,
            normal: ctx.has_normal.then_some(ctx.normal),
            colour: ctx.output_colour(),
            brightness: ctx.has_brightness.then_some(ctx.brightness),
        }
    }
}

/// Sink that collects every written vertex in order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VertexBuffer {
    vertices: Vec<OutputVertex>,
}

impl VertexBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(capacity),
        }
    }

    pub fn vertices(&self) -> &[OutputVertex] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    /// Append all vertices of `other`, preserving order.
    pub fn append(&mut self, other: &mut VertexBuffer) {
        self.vertices.append(&mut other.vertices);
    }

    pub fn into_vertices(self) -> Vec<OutputVertex> {
        self.vertices
    }
}

impl VertexSink for VertexBuffer {
    fn write_vertex(&mut self, ctx: &RenderContext) {
        self.vertices.push(OutputVertex::from_context(ctx));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vertex;

    #[test]
    fn test_output_only_reports_set_fields() {
        let mut ctx = RenderContext::new();
        ctx.begin_vertex(0, Vertex::at(1.0, 0.0, 0.0, 0.25, 0.75));
        ctx.set_colour(0x1122_33FF);

        let mut buffer = VertexBuffer::new();
        buffer.write_vertex(&ctx);

        let out = buffer.vertices()[0];
        assert_eq!(out.position, Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(out.uv, Uv::new(0.25, 0.75));
        assert_eq!(out.colour, Some(0x1122_33FF));
        assert_eq!(out.normal, None);
        assert_eq!(out.brightness, None);
    }

    #[test]
    fn test_append_preserves_order() {
        let mut ctx = RenderContext::new();
        let mut a = VertexBuffer::new();
        let mut b = VertexBuffer::new();
        ctx.begin_vertex(0, Vertex::at(0.0, 0.0, 0.0, 0.0, 0.0));
        a.write_vertex(&ctx);
        ctx.begin_vertex(1, Vertex::at(1.0, 0.0, 0.0, 0.0, 0.0));
        b.write_vertex(&ctx);

        a.append(&mut b);
        assert_eq!(a.len(), 2);
        assert!(b.is_empty());
        assert_eq!(a.vertices()[1].position.x, 1.0);
    }
}
