//! Tree snapshots — the persisted representation of a whole tree.
//!
//! `{ roots, blocks, metadata }` is the handoff point to durable storage:
//! route layers persist `export_tree()` output and rehydrate via
//! `import_tree()`. Import is destructive (the current store is replaced) and
//! fails fast on malformed payloads — a snapshot either loads whole or not at
//! all.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use kiban_types::{now_millis, Block, BlockId};

use crate::engine::BlockEngine;
use crate::error::{EngineError, Result};

/// Snapshot format version. Bumped on incompatible envelope changes.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Envelope metadata carried alongside the node store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    /// Snapshot format version.
    pub version: u32,
    /// Tree creation time (Unix millis).
    pub created_at: u64,
    /// Last mutation time at export (Unix millis).
    pub updated_at: u64,
}

/// Serializable snapshot of a full tree: root order, node store, envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    /// Root ids in order.
    pub roots: Vec<BlockId>,
    /// Every block, keyed by id.
    pub blocks: BTreeMap<BlockId, Block>,
    /// Version/timestamp envelope.
    pub metadata: SnapshotMeta,
}

impl TreeSnapshot {
    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| EngineError::Serialization(e.to_string()))
    }

    /// Parse from a JSON string. Malformed payloads fail fast.
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| EngineError::CorruptSnapshot(e.to_string()))
    }

    /// Structural integrity check. Run by `import_tree` before anything is
    /// replaced, so a bad snapshot never partially loads.
    pub fn verify(&self) -> Result<()> {
        if self.metadata.version != SNAPSHOT_VERSION {
            return Err(EngineError::CorruptSnapshot(format!(
                "unsupported snapshot version {} (expected {})",
                self.metadata.version, SNAPSHOT_VERSION
            )));
        }

        for (id, block) in &self.blocks {
            if *id != block.id {
                return Err(EngineError::CorruptSnapshot(format!(
                    "key {id} does not match block id {}",
                    block.id
                )));
            }

            if let Some(pid) = block.parent_id {
                let parent = self.blocks.get(&pid).ok_or_else(|| {
                    EngineError::CorruptSnapshot(format!("block {id} references missing parent {pid}"))
                })?;
                let occurrences = parent.children.iter().filter(|c| *c == id).count();
                if occurrences != 1 {
                    return Err(EngineError::CorruptSnapshot(format!(
                        "parent {pid} lists child {id} {occurrences} times (expected 1)"
                    )));
                }
            }

            let mut seen = std::collections::BTreeSet::new();
            for child_id in &block.children {
                if !seen.insert(child_id) {
                    return Err(EngineError::CorruptSnapshot(format!(
                        "block {id} lists duplicate child {child_id}"
                    )));
                }
                let child = self.blocks.get(child_id).ok_or_else(|| {
                    EngineError::CorruptSnapshot(format!("block {id} references missing child {child_id}"))
                })?;
                if child.parent_id != Some(*id) {
                    return Err(EngineError::CorruptSnapshot(format!(
                        "child {child_id} does not point back to parent {id}"
                    )));
                }
            }
        }

        for root_id in &self.roots {
            let root = self.blocks.get(root_id).ok_or_else(|| {
                EngineError::CorruptSnapshot(format!("root list references missing block {root_id}"))
            })?;
            if root.parent_id.is_some() {
                return Err(EngineError::CorruptSnapshot(format!(
                    "root list contains non-root block {root_id}"
                )));
            }
        }

        // Cycle check: any parent chain longer than the store has blocks
        // must revisit a node.
        let limit = self.blocks.len();
        for id in self.blocks.keys() {
            let mut current = self.blocks.get(id).and_then(|b| b.parent_id);
            let mut steps = 0;
            while let Some(pid) = current {
                steps += 1;
                if steps > limit {
                    return Err(EngineError::CorruptSnapshot(format!(
                        "cycle detected in parent chain of {id}"
                    )));
                }
                current = self.blocks.get(&pid).and_then(|b| b.parent_id);
            }
        }

        Ok(())
    }
}

impl BlockEngine {
    /// Serialize the full store plus root set plus envelope.
    pub fn export_tree(&self) -> TreeSnapshot {
        TreeSnapshot {
            roots: self.roots.clone(),
            blocks: self.blocks.clone(),
            metadata: SnapshotMeta {
                version: SNAPSHOT_VERSION,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
        }
    }

    /// Replace the current store with a snapshot (destructive).
    ///
    /// The snapshot is verified first; a malformed payload leaves the engine
    /// untouched. The root set is recomputed from nodes lacking a parent,
    /// with the envelope's `roots` list providing the ordering.
    pub fn import_tree(&mut self, snapshot: TreeSnapshot) -> Result<()> {
        snapshot.verify()?;
        let TreeSnapshot {
            roots,
            blocks,
            metadata,
        } = snapshot;

        let mut new_roots: Vec<BlockId> = roots
            .into_iter()
            .filter(|id| blocks.get(id).map_or(false, |b| b.parent_id.is_none()))
            .collect();
        for (id, block) in &blocks {
            if block.parent_id.is_none() && !new_roots.contains(id) {
                new_roots.push(*id);
            }
        }

        self.blocks = blocks;
        self.roots = new_roots;
        self.created_at = metadata.created_at;
        self.updated_at = now_millis();
        Ok(())
    }
}

// =========================================================================
// Tests
// =========================================================================
