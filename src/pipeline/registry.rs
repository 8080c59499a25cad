//! Operation type and attribute slot registry.
//!
//! The registry is an explicit object, created once at startup and shared by
//! `Arc` with every [`RenderState`](crate::pipeline::RenderState). It hands
//! out strictly increasing [`OperationId`]s and [`AttributeSlotId`]s and keeps
//! the table of attribute slot instances so pipelines can enqueue a slot by
//! id alone.
//!
//! Construction registers the built-in attributes and operation types first,
//! in a fixed order, so their ids are stable across runs:
//!
//! | Operation | Kind |
//! |-----------|------|
//! | 0 | `Normal` attribute (slot 0) |
//! | 1 | `Colour` attribute (slot 1) |
//! | 2 | `Lighting` attribute (slot 2) |
//! | 3 | `Side` attribute (slot 3) |
//! | 4 | `LightCoord` attribute (slot 4) |
//! | 5 | `VertexTransform` |
//! | 6 | `ColourMultiplier` |
//! | 7 | `PlanarLightModel` |
//! | 8 | `SpriteUvTransform` |
//! | 9 | `LightMatrixBrightness` |

use crate::pipeline::attributes::{
    ColourAttribute, LightCoordAttribute, LightingAttribute, NormalAttribute, SideAttribute,
};
use crate::pipeline::id::{AttributeKey, AttributeSlotId, OperationId};
use crate::pipeline::operation::{OperationRef, VertexOperation};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Ids of the built-in attributes and operation types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardOperations {
    pub normal: AttributeKey,
    pub colour: AttributeKey,
    pub lighting: AttributeKey,
    pub side: AttributeKey,
    pub light_coord: AttributeKey,
    pub transform: OperationId,
    pub colour_multiplier: OperationId,
    pub light_model: OperationId,
    pub uv_transform: OperationId,
    pub light_matrix: OperationId,
}

impl StandardOperations {
    const UNASSIGNED: StandardOperations = StandardOperations {
        normal: AttributeKey::INVALID,
        colour: AttributeKey::INVALID,
        lighting: AttributeKey::INVALID,
        side: AttributeKey::INVALID,
        light_coord: AttributeKey::INVALID,
        transform: OperationId::INVALID,
        colour_multiplier: OperationId::INVALID,
        light_model: OperationId::INVALID,
        uv_transform: OperationId::INVALID,
        light_matrix: OperationId::INVALID,
    };
}

/// Allocator of operation and attribute slot ids.
///
/// Registration is serialized internally, but is meant to happen during
/// startup before workers begin building pipelines.
pub struct OperationRegistry {
    next_operation: AtomicU32,
    attributes: RwLock<Vec<OperationRef>>,
    standard: StandardOperations,
}

impl OperationRegistry {
    /// Create a registry with the built-in attributes and operation types registered.
    pub fn new() -> Self {
        let mut registry = Self {
            next_operation: AtomicU32::new(0),
            attributes: RwLock::new(Vec::new()),
            standard: StandardOperations::UNASSIGNED,
        };
        registry.standard = registry.register_standard();
        registry
    }

    /// Convenience for `Arc::new(OperationRegistry::new())`.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn register_standard(&self) -> StandardOperations {
        let normal = self.register_attribute_slot(NormalAttribute::new).key();
        let colour = self.register_attribute_slot(ColourAttribute::new).key();
        let lighting = self.register_attribute_slot(LightingAttribute::new).key();
        let side = self.register_attribute_slot(SideAttribute::new).key();
        let light_coord = self.register_attribute_slot(LightCoordAttribute::new).key();

        StandardOperations {
            normal,
            colour,
            lighting,
            side,
            light_coord,
            transform: self.register_operation_type(),
            colour_multiplier: self.register_operation_type(),
            light_model: self.register_operation_type(),
            uv_transform: self.register_operation_type(),
            light_matrix: self.register_operation_type(),
        }
    }

    /// Allocate a new operation type id.
    pub fn register_operation_type(&self) -> OperationId {
        OperationId(self.next_operation.fetch_add(1, Ordering::SeqCst))
    }

    /// Allocate an operation id and a slot id, construct the attribute with
    /// them, and record it in the attribute table.
    ///
    /// `make` must not call back into the registry.
    pub fn register_attribute_slot<A, F>(&self, make: F) -> Arc<A>
    where
        A: VertexOperation + 'static,
        F: FnOnce(AttributeKey) -> A,
    {
        let mut table = self.write_attributes();
        let key = AttributeKey {
            operation: self.register_operation_type(),
            slot: AttributeSlotId(table.len() as u32),
        };
        let attribute = Arc::new(make(key));
        table.push(attribute.clone());
        tracing::debug!(
            "Registered attribute '{}' as {:?} / {:?}",
            attribute.name(),
            key.slot,
            key.operation
        );
        attribute
    }

    /// Current high-water mark of operation ids.
    pub fn operation_count(&self) -> usize {
        self.next_operation.load(Ordering::SeqCst) as usize
    }

    /// Number of registered attribute slots.
    pub fn attribute_count(&self) -> usize {
        self.read_attributes().len()
    }

    /// Attribute instance registered under `slot`.
    pub fn attribute(&self, slot: AttributeSlotId) -> Option<OperationRef> {
        self.read_attributes().get(slot.index()).cloned()
    }

    pub fn standard(&self) -> &StandardOperations {
        &self.standard
    }

    // The table is append-only, so a poisoned lock still guards consistent data.
    fn read_attributes(&self) -> RwLockReadGuard<'_, Vec<OperationRef>> {
        self.attributes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_attributes(&self) -> RwLockWriteGuard<'_, Vec<OperationRef>> {
        self.attributes.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("operations", &self.operation_count())
            .field("attributes", &self.attribute_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::operation::OperationKind;

    #[test]
    fn test_standard_ids_are_stable() {
        let registry = OperationRegistry::new();
        let std = registry.standard();

        assert_eq!(std.normal.operation, OperationId(0));
        assert_eq!(std.normal.slot, AttributeSlotId(0));
        assert_eq!(std.colour.slot, AttributeSlotId(1));
        assert_eq!(std.lighting.slot, AttributeSlotId(2));
        assert_eq!(std.side.slot, AttributeSlotId(3));
        assert_eq!(std.light_coord.slot, AttributeSlotId(4));
        assert_eq!(std.transform, OperationId(5));
        assert_eq!(std.light_matrix, OperationId(9));
        assert_eq!(registry.operation_count(), 10);
        assert_eq!(registry.attribute_count(), 5);
    }

    #[test]
    fn test_ids_strictly_increase() {
        let registry = OperationRegistry::new();
        let a = registry.register_operation_type();
        let b = registry.register_operation_type();
        assert!(b > a);
        assert_eq!(registry.operation_count(), b.index() + 1);
    }

    #[test]
    fn test_attribute_lookup_matches_kind() {
        let registry = OperationRegistry::new();
        let side = registry.standard().side;
        let attribute = registry.attribute(side.slot).unwrap();

        assert_eq!(attribute.operation_id(), side.operation);
        assert_eq!(attribute.kind(), OperationKind::Attribute(side.slot));
        assert!(registry.attribute(AttributeSlotId(99)).is_none());
    }

    #[test]
    fn test_concurrent_registration_is_unique() {
        let registry = Arc::new(OperationRegistry::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    (0..100)
                        .map(|_| registry.register_operation_type())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<OperationId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 400);
        assert_eq!(registry.operation_count(), 410);
    }
}
