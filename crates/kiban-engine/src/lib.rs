//! Block content tree engine for Kiban.
//!
//! Owns the live tree for one document: a flat store of blocks plus an
//! ordered root set. Consults the schema registry (`kiban-schema`) before
//! every mutation and keeps the forest invariants intact across create,
//! update, move, delete, and duplicate:
//!
//! - no cycles — no block is ever its own ancestor
//! - no dangling references — every `parent_id` resolves, and that parent's
//!   `children` lists the child exactly once
//! - roots are exactly the parentless blocks
//! - every parent/child pair is schema-compatible in both directions
//!
//! # Validate, then mutate
//!
//! Every mutating operation is two passes: a pure validation pass that can
//! only reject, then a single mutation pass applied only if validation
//! succeeded. A rejected call leaves the store byte-for-byte unchanged —
//! verified in tests by snapshot equality around failures.
//!
//! # Errors
//!
//! Rejections are distinct named conditions ([`EngineError`]), surfaced
//! synchronously, never retried internally. Lookups and traversals never
//! fail on missing ids; they omit them.

pub mod engine;
pub mod error;
pub mod shared;
pub mod snapshot;

pub use engine::{
    BlockEngine, CreateBlock, DeleteBlock, DuplicateBlock, MoveBlock, QueryOptions, SearchOptions,
    UpdateBlock,
};
pub use error::{EngineError, Result};
pub use shared::SharedEngine;
pub use snapshot::{SnapshotMeta, TreeSnapshot, SNAPSHOT_VERSION};
