//! Error types for tree engine operations.
//!
//! Every rejection is a distinct, named condition so callers can tell "bad
//! input" from "not found" from "would corrupt the tree" without parsing
//! messages. Route layers map on [`EngineError::kind`].

use thiserror::Error;

use kiban_schema::FieldError;
use kiban_types::{BlockId, BlockVariant};

/// Errors that can occur during tree engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Variant has no registered schema.
    #[error("unknown variant: {0}")]
    UnknownVariant(BlockVariant),

    /// Payload failed schema validation. Carries every field-level error.
    #[error("validation failed with {} field error(s)", .0.len())]
    ValidationFailed(Vec<FieldError>),

    /// The requested parent does not exist in the store.
    #[error("parent not found: {0:?}")]
    ParentNotFound(BlockId),

    /// The addressed block does not exist in the store.
    #[error("block not found: {0:?}")]
    NotFound(BlockId),

    /// Parent disallows the child variant, or the child disallows the parent.
    #[error("variant '{child}' cannot be a child of '{parent}'")]
    IncompatibleRelationship {
        parent: BlockVariant,
        child: BlockVariant,
    },

    /// The move destination lies inside the moving block's own subtree.
    #[error("moving {id:?} under {new_parent:?} would create a cycle")]
    CycleDetected {
        id: BlockId,
        new_parent: BlockId,
    },

    /// Delete without cascade on a block that still has children.
    #[error("block {0:?} has children; delete requires cascade")]
    HasChildren(BlockId),

    /// Snapshot failed integrity checks on import.
    #[error("corrupt tree snapshot: {0}")]
    CorruptSnapshot(String),

    /// Serialization error from the snapshot byte helpers.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl EngineError {
    /// Stable machine-readable condition name, for route-layer status mapping.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::UnknownVariant(_) => "unknown_variant",
            EngineError::ValidationFailed(_) => "validation_failed",
            EngineError::ParentNotFound(_) => "parent_not_found",
            EngineError::NotFound(_) => "not_found",
            EngineError::IncompatibleRelationship { .. } => "incompatible_relationship",
            EngineError::CycleDetected { .. } => "cycle_detected",
            EngineError::HasChildren(_) => "has_children",
            EngineError::CorruptSnapshot(_) => "corrupt_snapshot",
            EngineError::Serialization(_) => "serialization",
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_are_stable() {
        let id = BlockId::new();
        assert_eq!(EngineError::NotFound(id).kind(), "not_found");
        assert_eq!(EngineError::ParentNotFound(id).kind(), "parent_not_found");
        assert_eq!(EngineError::HasChildren(id).kind(), "has_children");
        assert_eq!(
            EngineError::UnknownVariant(BlockVariant::Text).kind(),
            "unknown_variant"
        );
        assert_eq!(
            EngineError::ValidationFailed(Vec::new()).kind(),
            "validation_failed"
        );
        assert_eq!(
            EngineError::IncompatibleRelationship {
                parent: BlockVariant::Page,
                child: BlockVariant::Column,
            }
            .kind(),
            "incompatible_relationship"
        );
        assert_eq!(
            EngineError::CycleDetected {
                id,
                new_parent: id,
            }
            .kind(),
            "cycle_detected"
        );
        assert_eq!(
            EngineError::CorruptSnapshot("bad".into()).kind(),
            "corrupt_snapshot"
        );
    }

    #[test]
    fn test_messages_name_the_condition() {
        let err = EngineError::IncompatibleRelationship {
            parent: BlockVariant::Page,
            child: BlockVariant::Column,
        };
        let msg = err.to_string();
        assert!(msg.contains("column"));
        assert!(msg.contains("page"));
    }
}
