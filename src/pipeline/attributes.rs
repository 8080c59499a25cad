//! Built-in attribute slots.
//!
//! Each attribute supplies one per-vertex quantity. If the bound source
//! advertises the attribute, the precomputed array is copied into the context
//! for every vertex. Otherwise the attribute falls back to computing the value
//! from other attributes, registering those as dependencies while it loads.
//! Which path an attribute takes is decided once per build and recorded in the
//! context, so `operate` never mixes the two:
//!
//! ```text
//! Normal     <- Side (axis vector of the side)
//! Side       <- Normal (nearest axis)
//! LightCoord <- Side + VertexTransform (position relative to the light matrix)
//! Lighting   <- Colour (tint multiplied into the resolved colour)
//! ```

use crate::pipeline::context::RenderContext;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::id::{AttributeKey, AttributeSlotId, OperationId};
use crate::pipeline::operation::{LoadContext, OperationKind, VertexOperation};
use crate::pipeline::source::AttributeArray;
use crate::types::{rgba, LightCoord, Side};

/// Check whether the source supplies `slot` as an array.
///
/// Returns `Ok(false)` if the source does not advertise it. An advertised
/// attribute without data, with data of the wrong kind, or with fewer entries
/// than the source has vertices violates the source contract and aborts the
/// build. On success the slot is marked provided for this build.
fn source_provides(
    load: &mut LoadContext<'_>,
    name: &str,
    slot: AttributeSlotId,
    is_kind: fn(&AttributeArray<'_>) -> bool,
) -> PipelineResult<bool> {
    let source = load.source();
    if !source.provides_attribute(slot) {
        return Ok(false);
    }

    let expected = source.vertices().len();
    let array = source
        .attribute_array(slot)
        .filter(|array| is_kind(array))
        .ok_or_else(|| PipelineError::MissingAttribute {
            attribute: name.to_string(),
            slot,
        })?;
    if array.len() < expected {
        return Err(PipelineError::AttributeLengthMismatch {
            attribute: name.to_string(),
            slot,
            expected,
            actual: array.len(),
        });
    }

    load.mark_provided(slot);
    Ok(true)
}

/// Read the current vertex's entry from `slot`'s array.
///
/// Only called for slots the build marked provided, whose arrays were checked
/// to cover every vertex.
#[inline]
fn provided<T>(
    ctx: &RenderContext,
    slot: AttributeSlotId,
    get: impl FnOnce(&AttributeArray<'_>, usize) -> Option<T>,
) -> Option<T> {
    let array = ctx.source()?.attribute_array(slot)?;
    get(&array, ctx.vertex_index)
}

fn is_colours(array: &AttributeArray<'_>) -> bool {
    matches!(array, AttributeArray::Colours(_))
}

/// Per-vertex normal.
pub struct NormalAttribute {
    key: AttributeKey,
}

impl NormalAttribute {
    pub fn new(key: AttributeKey) -> Self {
        Self { key }
    }

    pub fn key(&self) -> AttributeKey {
        self.key
    }
}

impl VertexOperation for NormalAttribute {
    fn name(&self) -> &str {
        "Normal"
    }

    fn operation_id(&self) -> OperationId {
        self.key.operation
    }

    fn kind(&self) -> OperationKind {
        OperationKind::Attribute(self.key.slot)
    }

    fn load(&self, load: &mut LoadContext<'_>) -> PipelineResult<bool> {
        if source_provides(load, self.name(), self.key.slot, |a| {
            matches!(a, AttributeArray::Normals(_))
        })? {
            return Ok(true);
        }

        let side = load.standard().side.slot;
        if load.source().provides_attribute(side) {
            load.add_dependency(side)?;
            return Ok(true);
        }

        Err(PipelineError::AttributeUnavailable {
            attribute: self.name().to_string(),
            reason: "source provides neither normals nor sides".to_string(),
        })
    }

    fn operate(&self, ctx: &mut RenderContext) {
        if !ctx.is_provided(self.key.slot) {
            ctx.set_normal(ctx.side.axis());
        } else if let Some(normal) = provided(ctx, self.key.slot, |a, i| a.normal(i)) {
            ctx.set_normal(normal);
        }
    }
}

/// Per-vertex colour, blended with the context base colour.
pub struct ColourAttribute {
    key: AttributeKey,
}

impl ColourAttribute {
    pub fn new(key: AttributeKey) -> Self {
        Self { key }
    }

    pub fn key(&self) -> AttributeKey {
        self.key
    }
}

impl VertexOperation for ColourAttribute {
    fn name(&self) -> &str {
        "Colour"
    }

    fn operation_id(&self) -> OperationId {
        self.key.operation
    }

    fn kind(&self) -> OperationKind {
        OperationKind::Attribute(self.key.slot)
    }

    fn load(&self, load: &mut LoadContext<'_>) -> PipelineResult<bool> {
        // Without an array every vertex takes the base colour.
        source_provides(load, self.name(), self.key.slot, is_colours)?;
        Ok(true)
    }

    fn operate(&self, ctx: &mut RenderContext) {
        if !ctx.is_provided(self.key.slot) {
            ctx.set_colour(ctx.base_colour);
        } else if let Some(colour) = provided(ctx, self.key.slot, |a, i| a.colour(i)) {
            ctx.set_colour(rgba::multiply(ctx.base_colour, colour));
        }
    }
}

/// Precomputed per-vertex lighting tint, multiplied into the resolved colour.
pub struct LightingAttribute {
    key: AttributeKey,
}

impl LightingAttribute {
    pub fn new(key: AttributeKey) -> Self {
        Self { key }
    }

    pub fn key(&self) -> AttributeKey {
        self.key
    }
}

impl VertexOperation for LightingAttribute {
    fn name(&self) -> &str {
        "Lighting"
    }

    fn operation_id(&self) -> OperationId {
        self.key.operation
    }

    fn kind(&self) -> OperationKind {
        OperationKind::Attribute(self.key.slot)
    }

    fn load(&self, load: &mut LoadContext<'_>) -> PipelineResult<bool> {
        let modes = load.modes();
        if !modes.compute_lighting || !modes.use_colour {
            return Ok(false);
        }
        if !source_provides(load, self.name(), self.key.slot, is_colours)? {
            return Ok(false);
        }

        let colour = load.standard().colour.slot;
        load.add_dependency(colour)?;
        Ok(true)
    }

    fn operate(&self, ctx: &mut RenderContext) {
        // Only armed when the source supplies the tint array
        if let Some(tint) = provided(ctx, self.key.slot, |a, i| a.colour(i)) {
            let colour = rgba::multiply(ctx.colour, tint);
            ctx.set_colour(colour);
        }
    }
}

/// Per-vertex block side.
pub struct SideAttribute {
    key: AttributeKey,
}

impl SideAttribute {
    pub fn new(key: AttributeKey) -> Self {
        Self { key }
    }

    pub fn key(&self) -> AttributeKey {
        self.key
    }
}

impl VertexOperation for SideAttribute {
    fn name(&self) -> &str {
        "Side"
    }

    fn operation_id(&self) -> OperationId {
        self.key.operation
    }

    fn kind(&self) -> OperationKind {
        OperationKind::Attribute(self.key.slot)
    }

    fn load(&self, load: &mut LoadContext<'_>) -> PipelineResult<bool> {
        if source_provides(load, self.name(), self.key.slot, |a| {
            matches!(a, AttributeArray::Sides(_))
        })? {
            return Ok(true);
        }

        let normal = load.standard().normal.slot;
        load.add_dependency(normal)?;
        Ok(true)
    }

    fn operate(&self, ctx: &mut RenderContext) {
        if !ctx.is_provided(self.key.slot) {
            ctx.side = Side::from_normal(ctx.normal);
        } else if let Some(side) = provided(ctx, self.key.slot, |a, i| a.side(i)) {
            ctx.side = side;
        }
    }
}

/// Per-vertex light matrix interpolation coordinate.
pub struct LightCoordAttribute {
    key: AttributeKey,
}

impl LightCoordAttribute {
    pub fn new(key: AttributeKey) -> Self {
        Self { key }
    }

    pub fn key(&self) -> AttributeKey {
        self.key
    }
}

impl VertexOperation for LightCoordAttribute {
    fn name(&self) -> &str {
        "LightCoord"
    }

    fn operation_id(&self) -> OperationId {
        self.key.operation
    }

    fn kind(&self) -> OperationKind {
        OperationKind::Attribute(self.key.slot)
    }

    fn load(&self, load: &mut LoadContext<'_>) -> PipelineResult<bool> {
        if source_provides(load, self.name(), self.key.slot, |a| {
            matches!(a, AttributeArray::LightCoords(_))
        })? {
            return Ok(true);
        }

        let standard = *load.standard();
        load.add_dependency(standard.side.slot)?;
        load.add_requirement(standard.transform)?;
        Ok(true)
    }

    fn operate(&self, ctx: &mut RenderContext) {
        if !ctx.is_provided(self.key.slot) {
            ctx.light_coord =
                LightCoord::compute(ctx.vertex.position - ctx.light_matrix.origin, ctx.side);
        } else if let Some(coord) = provided(ctx, self.key.slot, |a, i| a.light_coord(i)) {
            ctx.light_coord = coord;
        }
    }
}
