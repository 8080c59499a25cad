//! Per-worker mutable render state.
//!
//! A [`RenderContext`] is what every operation reads from and writes to while
//! one vertex is processed. It is owned by exactly one worker (through its
//! [`RenderState`](crate::pipeline::RenderState)) and is never shared, so no
//! part of it needs synchronisation.

use crate::pipeline::id::AttributeSlotId;
use crate::pipeline::source::VertexSource;
use crate::types::{rgba, LightCoord, LightMatrix, Side, Vector3, Vertex};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Mode flags that gate which default attributes join a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderModes {
    /// Resolve a normal for every vertex.
    pub use_normals: bool,
    /// Resolve a colour for every vertex.
    pub use_colour: bool,
    /// Apply lighting to the resolved colour.
    pub compute_lighting: bool,
}

impl RenderModes {
    /// Dynamic (entity-style) rendering: normals on, baked lighting off.
    pub fn dynamic() -> Self {
        Self {
            use_normals: true,
            compute_lighting: false,
            ..Self::default()
        }
    }
}

impl Default for RenderModes {
    fn default() -> Self {
        Self {
            use_normals: false,
            use_colour: true,
            compute_lighting: true,
        }
    }
}

/// The mutable state a compiled pipeline operates on.
pub struct RenderContext {
    source: Option<Arc<dyn VertexSource>>,

    /// First vertex of the active half-open range.
    pub first_vertex: usize,
    /// One past the last vertex of the active range.
    pub last_vertex: usize,
    /// Index of the vertex currently being processed.
    pub vertex_index: usize,

    // context
    pub base_colour: u32,
    pub alpha_override: Option<u8>,
    modes: RenderModes,
    pub light_matrix: LightMatrix,

    // vertex outputs
    pub vertex: Vertex,
    pub has_normal: bool,
    pub normal: Vector3,
    pub has_colour: bool,
    pub colour: u32,
    pub has_brightness: bool,
    pub brightness: u32,

    // attribute storage
    pub side: Side,
    pub light_coord: LightCoord,

    /// Attribute slots the last build took from the source, by slot index
    provided: Vec<bool>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self {
            source: None,
            first_vertex: 0,
            last_vertex: 0,
            vertex_index: 0,
            base_colour: rgba::WHITE,
            alpha_override: None,
            modes: RenderModes::default(),
            light_matrix: LightMatrix::default(),
            vertex: Vertex::default(),
            has_normal: false,
            normal: Vector3::ZERO,
            has_colour: false,
            colour: rgba::WHITE,
            has_brightness: false,
            brightness: 0,
            side: Side::Down,
            light_coord: LightCoord::default(),
            provided: Vec::new(),
        }
    }

    /// Unbind the source and restore default modes and colours.
    ///
    /// The owning pipeline is cleared separately by
    /// [`RenderState::reset`](crate::pipeline::RenderState::reset).
    pub fn reset(&mut self) {
        self.source = None;
        self.modes = RenderModes::default();
        self.has_normal = false;
        self.has_colour = false;
        self.has_brightness = false;
        self.base_colour = rgba::WHITE;
        self.alpha_override = None;
        self.provided.clear();
    }

    /// Currently bound source, if any.
    pub fn source(&self) -> Option<&Arc<dyn VertexSource>> {
        self.source.as_ref()
    }

    /// Bind `source`. Returns `true` if the binding changed (identity, not value).
    pub(crate) fn bind_source(&mut self, source: Arc<dyn VertexSource>) -> bool {
        if let Some(current) = &self.source {
            if Arc::ptr_eq(current, &source) {
                return false;
            }
        }
        self.source = Some(source);
        true
    }

    pub fn modes(&self) -> RenderModes {
        self.modes
    }

    /// Replace the modes. Returns `true` if they changed.
    ///
    /// Only reachable through [`RenderState`](crate::pipeline::RenderState),
    /// which invalidates the compiled order on change.
    pub(crate) fn set_modes(&mut self, modes: RenderModes) -> bool {
        if self.modes == modes {
            return false;
        }
        self.modes = modes;
        true
    }

    /// Whether the current build reads `slot` from the source's array.
    #[inline]
    pub fn is_provided(&self, slot: AttributeSlotId) -> bool {
        self.provided.get(slot.index()).copied().unwrap_or(false)
    }

    pub(crate) fn mark_provided(&mut self, slot: AttributeSlotId) {
        let index = slot.index();
        if index >= self.provided.len() {
            self.provided.resize(index + 1, false);
        }
        self.provided[index] = true;
    }

    pub(crate) fn clear_provided(&mut self) {
        self.provided.fill(false);
    }

    /// Store the active half-open range. No validation happens here.
    pub fn set_range(&mut self, first: usize, last: usize) {
        self.first_vertex = first;
        self.last_vertex = last;
    }

    /// Load vertex `index` as the current vertex and clear the per-vertex output flags.
    #[inline]
    pub fn begin_vertex(&mut self, index: usize, vertex: Vertex) {
        self.vertex_index = index;
        self.vertex = vertex;
        self.has_normal = false;
        self.has_colour = false;
        self.has_brightness = false;
    }

    #[inline]
    pub fn set_normal(&mut self, normal: Vector3) {
        self.has_normal = true;
        self.normal = normal;
    }

    #[inline]
    pub fn set_colour(&mut self, colour: u32) {
        self.has_colour = true;
        self.colour = colour;
    }

    #[inline]
    pub fn set_brightness(&mut self, brightness: u32) {
        self.has_brightness = true;
        self.brightness = brightness;
    }

    /// Output colour with the alpha override applied, if a colour was set.
    pub fn output_colour(&self) -> Option<u32> {
        if !self.has_colour {
            return None;
        }
        Some(match self.alpha_override {
            Some(alpha) => rgba::with_alpha(self.colour, alpha),
            None => self.colour,
        })
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("bound", &self.source.is_some())
            .field("range", &(self.first_vertex..self.last_vertex))
            .field("vertex_index", &self.vertex_index)
            .field("modes", &self.modes)
            .finish_non_exhaustive()
    }
}
