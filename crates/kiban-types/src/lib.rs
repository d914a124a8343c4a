//! Shared identity and block types for Kiban.
//!
//! This crate is the relational foundation: typed IDs, block variants, and the
//! block entity itself. It has **no internal kiban dependencies** — a pure leaf
//! crate that the schema registry and the tree engine build on.
//!
//! # Entity-Relationship Overview
//!
//! ```text
//! Tree (TreeId) ← one independent content tree (a page, a board, a notebook)
//!     └── owns Block store (flat map + root set, held by the engine)
//!
//! Block (BlockId) ← a single node in the content tree
//!     └── variant fixes its payload shape (Text, KanbanCard, Table, …)
//!     └── parent_id / children form the forest
//!     └── data holds the variant-specific payload
//!     └── metadata is a free-form side channel (permissions, provenance)
//! ```
//!
//! # Key Types
//!
//! |------------------|-----------------------------------------------|
//! | Type             | Purpose                                       |
//! |------------------|-----------------------------------------------|
//! | [`TreeId`]       | Which tree instance                           |
//! | [`BlockId`]      | Unique node address within the process        |
//! | [`BlockVariant`] | What a block *is* (payload shape tag)         |
//! | [`Priority`]     | Shared todo/card priority scale               |
//! | [`Block`]        | The node entity the engine stores             |
//! |------------------|-----------------------------------------------|

pub mod block;
pub mod ids;
pub mod variant;

// Re-export primary types at crate root for convenience.
pub use block::{Block, JsonMap, MAX_TREE_DEPTH};
pub use ids::{BlockId, TreeId};
pub use variant::{BlockVariant, Priority, SchemaCategory};

/// Current time as Unix milliseconds. Used by constructors throughout.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
