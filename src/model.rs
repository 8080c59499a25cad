//! In-memory vertex source.
//!
//! A [`Model`] owns its vertices and any precomputed attribute arrays, keyed
//! by attribute slot. Which attributes the model *advertises* is tracked
//! separately from which arrays it holds, so a model can advertise an
//! attribute it has no data for (the pipeline rejects that at build time).

use crate::pipeline::context::RenderContext;
use crate::pipeline::id::AttributeSlotId;
use crate::pipeline::registry::OperationRegistry;
use crate::pipeline::source::{AttributeArray, VertexSource};
use crate::types::{LightCoord, Side, Uv, Vector3, Vertex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Owned attribute array, aligned with the model's vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeData {
    Normals(Vec<Vector3>),
    Colours(Vec<u32>),
    Sides(Vec<Side>),
    LightCoords(Vec<LightCoord>),
}

impl AttributeData {
    pub fn as_array(&self) -> AttributeArray<'_> {
        match self {
            AttributeData::Normals(a) => AttributeArray::Normals(a),
            AttributeData::Colours(a) => AttributeArray::Colours(a),
            AttributeData::Sides(a) => AttributeArray::Sides(a),
            AttributeData::LightCoords(a) => AttributeArray::LightCoords(a),
        }
    }

    pub fn len(&self) -> usize {
        self.as_array().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-vertex hook run before the pipeline.
pub type PrepareHook = Arc<dyn Fn(&mut RenderContext) + Send + Sync>;

pub struct Model {
    vertices: Vec<Vertex>,
    attributes: Vec<Option<AttributeData>>,
    advertised: BTreeSet<AttributeSlotId>,
    prepare: Option<PrepareHook>,
}

impl Model {
    pub fn builder() -> ModelBuilder {
        ModelBuilder::default()
    }

    /// Axis-aligned box from `min` to `max`: 4 vertices per face, faces in
    /// [`Side`] order, with a side array under the registry's side slot.
    pub fn cuboid(registry: &OperationRegistry, min: Vector3, max: Vector3) -> Model {
        let (x0, y0, z0) = (min.x, min.y, min.z);
        let (x1, y1, z1) = (max.x, max.y, max.z);
        let faces: [[Vector3; 4]; 6] = [
            // down
            [
                Vector3::new(x0, y0, z0),
                Vector3::new(x1, y0, z0),
                Vector3::new(x1, y0, z1),
                Vector3::new(x0, y0, z1),
            ],
            // up
            [
                Vector3::new(x0, y1, z1),
                Vector3::new(x1, y1, z1),
                Vector3::new(x1, y1, z0),
                Vector3::new(x0, y1, z0),
            ],
            // north
            [
                Vector3::new(x1, y1, z0),
                Vector3::new(x1, y0, z0),
                Vector3::new(x0, y0, z0),
                Vector3::new(x0, y1, z0),
            ],
            // south
            [
                Vector3::new(x0, y1, z1),
                Vector3::new(x0, y0, z1),
                Vector3::new(x1, y0, z1),
                Vector3::new(x1, y1, z1),
            ],
            // west
            [
                Vector3::new(x0, y1, z0),
                Vector3::new(x0, y0, z0),
                Vector3::new(x0, y0, z1),
                Vector3::new(x0, y1, z1),
            ],
            // east
            [
                Vector3::new(x1, y1, z1),
                Vector3::new(x1, y0, z1),
                Vector3::new(x1, y0, z0),
                Vector3::new(x1, y1, z0),
            ],
        ];
        const UVS: [Uv; 4] = [
            Uv::new(0.0, 0.0),
            Uv::new(0.0, 1.0),
            Uv::new(1.0, 1.0),
            Uv::new(1.0, 0.0),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut sides = Vec::with_capacity(24);
        for (side, corners) in Side::ALL.into_iter().zip(faces) {
            for (position, uv) in corners.into_iter().zip(UVS) {
                vertices.push(Vertex::new(position, uv));
                sides.push(side);
            }
        }

        Model::builder()
            .vertices(vertices)
            .sides(registry.standard().side.slot, sides)
            .build()
    }

    /// Reopen the model for modification.
    pub fn into_builder(self) -> ModelBuilder {
        ModelBuilder {
            vertices: self.vertices,
            attributes: self.attributes,
            advertised: self.advertised,
            prepare: self.prepare,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Owned array for `slot`, if the model holds one.
    pub fn attribute(&self, slot: AttributeSlotId) -> Option<&AttributeData> {
        self.attributes.get(slot.index())?.as_ref()
    }

    pub fn advertised(&self) -> impl Iterator<Item = AttributeSlotId> + '_ {
        self.advertised.iter().copied()
    }
}

impl VertexSource for Model {
    fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    fn attribute_array(&self, slot: AttributeSlotId) -> Option<AttributeArray<'_>> {
        self.attribute(slot).map(AttributeData::as_array)
    }

    fn provides_attribute(&self, slot: AttributeSlotId) -> bool {
        self.advertised.contains(&slot)
    }

    fn prepare_vertex(&self, ctx: &mut RenderContext) {
        if let Some(prepare) = &self.prepare {
            prepare(ctx);
        }
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("vertices", &self.vertices.len())
            .field("advertised", &self.advertised)
            .field("prepare", &self.prepare.is_some())
            .finish()
    }
}

/// Builder for [`Model`]. Every attribute setter also advertises its slot.
#[derive(Default)]
pub struct ModelBuilder {
    vertices: Vec<Vertex>,
    attributes: Vec<Option<AttributeData>>,
    advertised: BTreeSet<AttributeSlotId>,
    prepare: Option<PrepareHook>,
}

impl ModelBuilder {
    pub fn vertices(mut self, vertices: Vec<Vertex>) -> Self {
        self.vertices = vertices;
        self
    }

    pub fn attribute(mut self, slot: AttributeSlotId, data: AttributeData) -> Self {
        let index = slot.index();
        if self.attributes.len() <= index {
            self.attributes.resize(index + 1, None);
        }
        self.attributes[index] = Some(data);
        self.advertised.insert(slot);
        self
    }

    pub fn normals(self, slot: AttributeSlotId, normals: Vec<Vector3>) -> Self {
        self.attribute(slot, AttributeData::Normals(normals))
    }

    pub fn colours(self, slot: AttributeSlotId, colours: Vec<u32>) -> Self {
        self.attribute(slot, AttributeData::Colours(colours))
    }

    pub fn sides(self, slot: AttributeSlotId, sides: Vec<Side>) -> Self {
        self.attribute(slot, AttributeData::Sides(sides))
    }

    pub fn light_coords(self, slot: AttributeSlotId, light_coords: Vec<LightCoord>) -> Self {
        self.attribute(slot, AttributeData::LightCoords(light_coords))
    }

    /// Advertise `slot` without supplying an array for it.
    pub fn advertise(mut self, slot: AttributeSlotId) -> Self {
        self.advertised.insert(slot);
        self
    }

    pub fn prepare<F>(mut self, prepare: F) -> Self
    where
        F: Fn(&mut RenderContext) + Send + Sync + 'static,
    {
        self.prepare = Some(Arc::new(prepare));
        self
    }

    pub fn build(self) -> Model {
        Model {
            vertices: self.vertices,
            attributes: self.attributes,
            advertised: self.advertised,
            prepare: self.prepare,
        }
    }
}
