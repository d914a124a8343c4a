//! The block entity — a single node in the content tree.
//!
//! A block's identity (`id`) and shape tag (`variant`) are fixed at creation.
//! Everything else is mutable through the tree engine only: `data` via update
//! merges, `parent_id`/`children` via structural operations, `metadata` via
//! side-channel merges. Blocks are plain data here — validation lives in the
//! schema registry, tree integrity in the engine.

use serde::{Deserialize, Serialize};

use crate::ids::BlockId;
use crate::variant::BlockVariant;

/// Free-form JSON object used for block payloads and metadata.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// Maximum expected tree depth. Traversal code uses this as a circuit breaker.
///
/// Real documents rarely nest past depth 20 (page -> row -> column -> list ->
/// items). Depth 512 is generous; exceeding it almost certainly means a cycle
/// or corruption, not a legitimate document.
pub const MAX_TREE_DEPTH: usize = 512;

/// A single node in the content tree.
///
/// ## Field groups
///
/// - **Identity**: `id`, `variant` — immutable after creation.
/// - **Payload**: `data` — variant-specific, the only field `update` may change.
/// - **Structure**: `parent_id`, `children` — kept consistent by the engine;
///   `children` order is meaningful (layout columns, card order).
/// - **Side channel**: `metadata` — merged on update, never replaced wholesale.
/// - **Bookkeeping**: `created_at`, `updated_at` (Unix millis), `version`
///   (informative monotonic counter, not a lock).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Process-unique identifier, assigned at creation.
    pub id: BlockId,
    /// Payload shape tag. Never changes.
    pub variant: BlockVariant,
    /// Variant-specific payload.
    #[serde(default, skip_serializing_if = "JsonMap::is_empty")]
    pub data: JsonMap,
    /// Owning parent, or None for a root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<BlockId>,
    /// Ordered child ids.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<BlockId>,
    /// Free-form side-channel data (permissions, AI provenance, …).
    #[serde(default, skip_serializing_if = "JsonMap::is_empty")]
    pub metadata: JsonMap,
    /// Creation timestamp (Unix millis).
    pub created_at: u64,
    /// Refreshed on every structural or data mutation, including when the
    /// block gains or loses a child.
    pub updated_at: u64,
    /// Bumped whenever `updated_at` refreshes. Informational only.
    pub version: u64,
}

impl Block {
    /// Construct a fresh node with stamped id/timestamps and no children.
    ///
    /// Callers outside the schema registry should not build blocks directly —
    /// `SchemaRegistry::create_block` merges defaults and is the only path the
    /// engine uses.
    pub fn new(
        id: BlockId,
        variant: BlockVariant,
        data: JsonMap,
        metadata: JsonMap,
        parent_id: Option<BlockId>,
    ) -> Self {
        let now = crate::now_millis();
        Self {
            id,
            variant,
            data,
            parent_id,
            children: Vec::new(),
            metadata,
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    /// Refresh `updated_at` and bump the version counter.
    pub fn touch(&mut self) {
        self.updated_at = crate::now_millis();
        self.version += 1;
    }

    /// Check if this is a root block (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Check if this block has any children.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Compare two blocks ignoring timestamps and version.
    ///
    /// Useful in tests where a duplicated or round-tripped block should be
    /// "the same" but carries fresh bookkeeping.
    pub fn content_eq(&self, other: &Self) -> bool {
        self.variant == other.variant
            && self.data == other.data
            && self.metadata == other.metadata
            && self.children.len() == other.children.len()
    }
}

// =========================================================================
// Tests
// =========================================================================
