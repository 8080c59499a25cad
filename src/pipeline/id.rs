//! Identity types for the pipeline system.
//!
//! All IDs are newtypes over `u32` that serve as direct array indices
//! into their respective tables, providing O(1) lookup. IDs are handed out
//! by [`OperationRegistry`](crate::pipeline::OperationRegistry) and are never
//! reused.

use std::fmt;

/// Identifies an operation *type*. Index into `Pipeline`'s node table.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperationId(pub u32);

impl OperationId {
    pub const INVALID: OperationId = OperationId(u32::MAX);

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "OperationId(INVALID)")
        } else {
            write!(f, "OperationId({})", self.0)
        }
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Identifies an attribute slot. Index into the registry's attribute table
/// and into a pipeline's per-build active set.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttributeSlotId(pub u32);

impl AttributeSlotId {
    pub const INVALID: AttributeSlotId = AttributeSlotId(u32::MAX);

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for AttributeSlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "AttributeSlotId(INVALID)")
        } else {
            write!(f, "AttributeSlotId({})", self.0)
        }
    }
}

impl fmt::Display for AttributeSlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Both identities of an attribute slot: it is an operation type as well as a slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct AttributeKey {
    pub operation: OperationId,
    pub slot: AttributeSlotId,
}

impl AttributeKey {
    pub const INVALID: AttributeKey = AttributeKey {
        operation: OperationId::INVALID,
        slot: AttributeSlotId::INVALID,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_id() {
        let id = OperationId(42);
        assert!(id.is_valid());
        assert_eq!(id.index(), 42);
        assert!(!OperationId::INVALID.is_valid());
    }

    #[test]
    fn test_attribute_slot_id() {
        let id = AttributeSlotId(0);
        assert!(id.is_valid());
        assert_eq!(id.index(), 0);
        assert!(!AttributeSlotId::INVALID.is_valid());
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", OperationId(3)), "OperationId(3)");
        assert_eq!(format!("{}", OperationId::INVALID), "OperationId(INVALID)");
        assert_eq!(format!("{:?}", AttributeSlotId(7)), "AttributeSlotId(7)");
    }

    #[test]
    fn test_ordering_follows_registration() {
        assert!(OperationId(1) < OperationId(2));
        assert!(AttributeSlotId(0) < AttributeSlotId(5));
    }
}
