//! Pipeline-specific error types.

use crate::pipeline::id::{AttributeSlotId, OperationId};
use thiserror::Error;

/// Errors that abort a pipeline build or render.
///
/// An operation whose `load()` returns `Ok(false)` is not an error: it is
/// simply left out of the compiled order.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Source advertises attribute '{attribute}' ({slot:?}) but provides no data for it")]
    MissingAttribute {
        attribute: String,
        slot: AttributeSlotId,
    },

    #[error(
        "Source array for attribute '{attribute}' ({slot:?}) has {actual} entries but the source has {expected} vertices"
    )]
    AttributeLengthMismatch {
        attribute: String,
        slot: AttributeSlotId,
        expected: usize,
        actual: usize,
    },

    #[error("Attribute '{attribute}' is unavailable: {reason}")]
    AttributeUnavailable { attribute: String, reason: String },

    #[error("Cycle detected in operation dependencies: {}", chain.join(" -> "))]
    CycleDetected { chain: Vec<String> },

    #[error("Unknown operation {0:?} (not allocated by this registry)")]
    UnknownOperation(OperationId),

    #[error("Unknown attribute slot {0:?} (not allocated by this registry)")]
    UnknownAttribute(AttributeSlotId),

    #[error("Dependency registered outside of an active build")]
    NoActiveBuild,

    #[error("No vertex source bound")]
    NoSource,

    #[error("Vertex range [{first}, {last}) exceeds source length {len}")]
    RangeOutOfBounds {
        first: usize,
        last: usize,
        len: usize,
    },
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_display() {
        let err = PipelineError::CycleDetected {
            chain: vec!["Side".into(), "Normal".into(), "Side".into()],
        };
        assert_eq!(
            err.to_string(),
            "Cycle detected in operation dependencies: Side -> Normal -> Side"
        );
    }

    #[test]
    fn test_missing_attribute_display() {
        let err = PipelineError::MissingAttribute {
            attribute: "Colour".into(),
            slot: AttributeSlotId(1),
        };
        assert!(err.to_string().contains("'Colour'"));
        assert!(err.to_string().contains("AttributeSlotId(1)"));
    }

    #[test]
    fn test_length_mismatch_display() {
        let err = PipelineError::AttributeLengthMismatch {
            attribute: "Normal".into(),
            slot: AttributeSlotId(0),
            expected: 4,
            actual: 2,
        };
        assert!(err.to_string().contains("has 2 entries but the source has 4 vertices"));
    }
}
