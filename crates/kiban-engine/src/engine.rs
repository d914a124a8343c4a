//! The block tree engine — flat node store + root set.
//!
//! Owns every block in one tree instance and enforces the forest invariants:
//! no cycles, no dangling parent/child references, schema-compatible pairings.
//! Every mutating operation runs validation and compatibility checks *before*
//! touching the store, so a rejected call leaves the tree byte-for-byte
//! unchanged — no rollback machinery needed.
//!
//! # Store shape
//!
//! Blocks live in a flat `BTreeMap<BlockId, Block>` with parent/children
//! fields holding ids, not ownership references. Roots are an ordered list,
//! like any other sibling sequence.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use kiban_schema::SchemaRegistry;
use kiban_types::{now_millis, Block, BlockId, BlockVariant, JsonMap, TreeId, MAX_TREE_DEPTH};

use crate::error::{EngineError, Result};

// =========================================================================
// Operation parameters
// =========================================================================

/// Parameters for [`BlockEngine::create`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateBlock {
    /// Variant of the new block.
    pub variant: BlockVariant,
    /// Caller payload, merged over the schema defaults.
    pub data: JsonMap,
    /// Parent to attach under; None creates a root.
    pub parent_id: Option<BlockId>,
    /// Initial metadata.
    pub metadata: JsonMap,
    /// Index in the parent's children (clamped; default: end).
    pub position: Option<usize>,
}

/// Parameters for [`BlockEngine::update`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpdateBlock {
    pub id: BlockId,
    /// Data patch, merged over the existing payload. The merged result is
    /// re-validated before anything is committed.
    #[serde(default)]
    pub data: Option<JsonMap>,
    /// Metadata patch, shallow-merged (deep for `permissions`).
    #[serde(default)]
    pub metadata: Option<JsonMap>,
}

/// Parameters for [`BlockEngine::move_block`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MoveBlock {
    pub id: BlockId,
    /// New parent; None moves the block to the root set.
    #[serde(default)]
    pub new_parent_id: Option<BlockId>,
    /// Index among the new siblings (clamped; default: end).
    #[serde(default)]
    pub position: Option<usize>,
}

/// Parameters for [`BlockEngine::delete`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeleteBlock {
    pub id: BlockId,
    /// Authorize recursive deletion of descendants.
    #[serde(default)]
    pub cascade: bool,
}

/// Parameters for [`BlockEngine::duplicate`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DuplicateBlock {
    pub id: BlockId,
    /// Copy the whole subtree instead of a childless copy.
    #[serde(default)]
    pub cascade: bool,
}

/// Filters for [`BlockEngine::query`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Only blocks of this variant.
    pub variant: Option<BlockVariant>,
    /// Only direct children of this parent.
    pub parent_id: Option<BlockId>,
}

/// Filters for [`BlockEngine::search`] — query filters plus text matching and
/// pagination.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub variant: Option<BlockVariant>,
    pub parent_id: Option<BlockId>,
    /// Case-insensitive match against the serialized payload.
    pub text: Option<String>,
    /// Skip this many hits after filtering.
    pub offset: Option<usize>,
    /// Cap the number of returned hits.
    pub limit: Option<usize>,
}

// =========================================================================
// Engine
// =========================================================================

/// Tree engine for one independent content tree.
///
/// All tree-shape invariants are enforced here; the schema registry answers
/// payload and compatibility questions but never sees the store.
pub struct BlockEngine {
    /// This tree instance's identity.
    pub(crate) tree_id: TreeId,
    /// Schema authority consulted before every mutation.
    pub(crate) registry: Arc<SchemaRegistry>,
    /// Flat node store.
    pub(crate) blocks: BTreeMap<BlockId, Block>,
    /// Ordered root ids (blocks with no parent).
    pub(crate) roots: Vec<BlockId>,
    /// Engine creation time (Unix millis) — carried into snapshots.
    pub(crate) created_at: u64,
    /// Last mutation time (Unix millis).
    pub(crate) updated_at: u64,
}

impl BlockEngine {
    /// Create an empty engine backed by the given registry.
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        let now = now_millis();
        Self {
            tree_id: TreeId::new(),
            registry,
            blocks: BTreeMap::new(),
            roots: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create an empty engine with the built-in schema set.
    pub fn with_builtin_schemas() -> Self {
        Self::new(Arc::new(SchemaRegistry::builtin()))
    }

    // =====================================================================
    // Accessors
    // =====================================================================

    /// This tree instance's id.
    pub fn tree_id(&self) -> TreeId {
        self.tree_id
    }

    /// The schema registry this engine consults.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Number of blocks in the store.
    pub fn count(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Check if a block exists.
    pub fn contains(&self, id: &BlockId) -> bool {
        self.blocks.contains_key(id)
    }

    /// Remove every block and root. Bulk reset for tests and re-imports.
    pub fn clear(&mut self) {
        self.blocks.clear();
        self.roots.clear();
        self.updated_at = now_millis();
    }

    // =====================================================================
    // Lookups & traversal (pure, never fail)
    // =====================================================================

    /// Get a block by id.
    pub fn get(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.get(id)
    }

    /// Get several blocks; absent ids are simply omitted.
    pub fn get_many(&self, ids: &[BlockId]) -> Vec<&Block> {
        ids.iter().filter_map(|id| self.blocks.get(id)).collect()
    }

    /// Direct children in order, or the whole subtree depth-first when
    /// `recursive` is set. Unknown ids yield an empty list.
    pub fn get_children(&self, id: &BlockId, recursive: bool) -> Vec<&Block> {
        let mut out = Vec::new();
        if let Some(block) = self.blocks.get(id) {
            for child_id in &block.children {
                if let Some(child) = self.blocks.get(child_id) {
                    out.push(child);
                    if recursive {
                        out.extend(self.get_children(child_id, true));
                    }
                }
            }
        }
        out
    }

    /// The block's parent, if any.
    pub fn get_parent(&self, id: &BlockId) -> Option<&Block> {
        self.blocks
            .get(id)
            .and_then(|b| b.parent_id)
            .and_then(|pid| self.blocks.get(&pid))
    }

    /// Ancestors from the immediate parent up to the root.
    pub fn get_ancestors(&self, id: &BlockId) -> Vec<&Block> {
        let mut ancestors = Vec::new();
        let mut current = self.blocks.get(id).and_then(|b| b.parent_id);
        while let Some(pid) = current {
            if ancestors.len() >= MAX_TREE_DEPTH {
                tracing::warn!("get_ancestors() hit MAX_TREE_DEPTH ({MAX_TREE_DEPTH}), truncating");
                break;
            }
            match self.blocks.get(&pid) {
                Some(parent) => {
                    ancestors.push(parent);
                    current = parent.parent_id;
                }
                None => break,
            }
        }
        ancestors
    }

    /// Root blocks in order.
    pub fn get_roots(&self) -> Vec<&Block> {
        self.roots
            .iter()
            .filter_map(|id| self.blocks.get(id))
            .collect()
    }

    /// Depth of a block (0 for roots).
    pub fn get_depth(&self, id: &BlockId) -> usize {
        self.get_ancestors(id).len()
    }

    /// Linear scan with predicate filters.
    pub fn query(&self, options: &QueryOptions) -> Vec<&Block> {
        self.blocks
            .values()
            .filter(|b| options.variant.map_or(true, |v| b.variant == v))
            .filter(|b| options.parent_id.map_or(true, |p| b.parent_id == Some(p)))
            .collect()
    }

    /// Query filters plus case-insensitive text match against the serialized
    /// payload, with offset/limit applied after filtering.
    pub fn search(&self, options: &SearchOptions) -> Vec<&Block> {
        let needle = options.text.as_ref().map(|t| t.to_lowercase());
        let hits = self
            .blocks
            .values()
            .filter(|b| options.variant.map_or(true, |v| b.variant == v))
            .filter(|b| options.parent_id.map_or(true, |p| b.parent_id == Some(p)))
            .filter(|b| match &needle {
                Some(n) => serde_json::to_string(&b.data)
                    .map(|s| s.to_lowercase().contains(n.as_str()))
                    .unwrap_or(false),
                None => true,
            })
            .skip(options.offset.unwrap_or(0));
        match options.limit {
            Some(limit) => hits.take(limit).collect(),
            None => hits.collect(),
        }
    }

    // =====================================================================
    // Mutations
    // =====================================================================

    /// Create a block and attach it to the tree.
    ///
    /// Checks run strictly before any store write, in this order: schema
    /// registered, merged payload valid, parent present, pairing compatible.
    pub fn create(&mut self, params: CreateBlock) -> Result<Block> {
        let schema = self
            .registry
            .get(params.variant)
            .ok_or(EngineError::UnknownVariant(params.variant))?;

        let mut merged = schema.default_data();
        for (key, value) in params.data {
            merged.insert(key, value);
        }
        let report = self.registry.validate(params.variant, &merged);
        if !report.valid {
            return Err(EngineError::ValidationFailed(report.errors));
        }

        if let Some(pid) = params.parent_id {
            let parent = self
                .blocks
                .get(&pid)
                .ok_or(EngineError::ParentNotFound(pid))?;
            self.check_compatible(parent.variant, params.variant)?;
        }

        let block = self
            .registry
            .create_block(params.variant, merged, params.metadata, params.parent_id)
            .ok_or(EngineError::UnknownVariant(params.variant))?;
        let id = block.id;
        self.blocks.insert(id, block);
        self.attach(id, params.parent_id, params.position);
        self.updated_at = now_millis();

        self.blocks
            .get(&id)
            .cloned()
            .ok_or(EngineError::NotFound(id))
    }

    /// Merge a data and/or metadata patch into a block.
    ///
    /// The data patch is validated as the *merged* result — a patch that
    /// would leave the payload invalid is rejected and nothing changes.
    pub fn update(&mut self, params: UpdateBlock) -> Result<Block> {
        let block = self
            .blocks
            .get(&params.id)
            .ok_or(EngineError::NotFound(params.id))?;

        let merged_data = match &params.data {
            Some(patch) => {
                let mut merged = block.data.clone();
                for (key, value) in patch {
                    merged.insert(key.clone(), value.clone());
                }
                let report = self.registry.validate(block.variant, &merged);
                if !report.valid {
                    return Err(EngineError::ValidationFailed(report.errors));
                }
                Some(merged)
            }
            None => None,
        };

        let block = self
            .blocks
            .get_mut(&params.id)
            .ok_or(EngineError::NotFound(params.id))?;
        if let Some(merged) = merged_data {
            block.data = merged;
        }
        if let Some(patch) = params.metadata {
            merge_metadata(&mut block.metadata, patch);
        }
        block.touch();
        self.updated_at = now_millis();
        Ok(block.clone())
    }

    /// Re-parent a block (or demote it to a root).
    ///
    /// The cycle check walks the destination's ancestor chain looking for the
    /// moving block — this is what rejects moving a block into its own
    /// subtree. It deliberately does not re-validate the moved subtree's
    /// interior pairings; only the new parent/child pair is checked.
    pub fn move_block(&mut self, params: MoveBlock) -> Result<Block> {
        let moving_variant = self
            .blocks
            .get(&params.id)
            .ok_or(EngineError::NotFound(params.id))?
            .variant;

        if let Some(new_parent) = params.new_parent_id {
            let parent = self
                .blocks
                .get(&new_parent)
                .ok_or(EngineError::ParentNotFound(new_parent))?;
            if new_parent == params.id || self.ancestor_chain_contains(&new_parent, &params.id) {
                return Err(EngineError::CycleDetected {
                    id: params.id,
                    new_parent,
                });
            }
            self.check_compatible(parent.variant, moving_variant)?;
        }

        self.detach(&params.id);
        self.attach(params.id, params.new_parent_id, params.position);
        if let Some(block) = self.blocks.get_mut(&params.id) {
            block.touch();
        }
        self.updated_at = now_millis();

        self.blocks
            .get(&params.id)
            .cloned()
            .ok_or(EngineError::NotFound(params.id))
    }

    /// Delete a block, and with `cascade` its whole subtree.
    ///
    /// Returns the number of blocks removed. Without `cascade`, a block that
    /// still has children is refused and nothing changes.
    pub fn delete(&mut self, params: DeleteBlock) -> Result<usize> {
        let block = self
            .blocks
            .get(&params.id)
            .ok_or(EngineError::NotFound(params.id))?;
        if block.has_children() && !params.cascade {
            return Err(EngineError::HasChildren(params.id));
        }

        self.detach(&params.id);
        let removed = self.remove_subtree(&params.id);
        self.updated_at = now_millis();
        Ok(removed)
    }

    /// Copy a block — childless by default, the whole subtree with `cascade`.
    ///
    /// The cascade copy is built fully detached (children duplicated and
    /// relinked under the new ids first) and only then attached after the
    /// original among its siblings, so no half-built subtree is ever
    /// reachable from the tree.
    pub fn duplicate(&mut self, params: DuplicateBlock) -> Result<Block> {
        let original = self
            .blocks
            .get(&params.id)
            .ok_or(EngineError::NotFound(params.id))?
            .clone();

        let copy_id = if params.cascade {
            self.copy_subtree(&params.id, original.parent_id)
                .ok_or(EngineError::NotFound(params.id))?
        } else {
            let copy = Block::new(
                BlockId::new(),
                original.variant,
                original.data.clone(),
                original.metadata.clone(),
                original.parent_id,
            );
            let id = copy.id;
            self.blocks.insert(id, copy);
            id
        };

        let position = self.sibling_position(&params.id).map(|i| i + 1);
        self.attach(copy_id, original.parent_id, position);
        self.updated_at = now_millis();

        self.blocks
            .get(&copy_id)
            .cloned()
            .ok_or(EngineError::NotFound(copy_id))
    }

    // =====================================================================
    // Internal helpers
    // =====================================================================

    /// Both directions of the structural constraint, or the named rejection.
    fn check_compatible(&self, parent: BlockVariant, child: BlockVariant) -> Result<()> {
        if self.registry.can_have_child(parent, child)
            && self.registry.can_have_parent(child, parent)
        {
            Ok(())
        } else {
            Err(EngineError::IncompatibleRelationship { parent, child })
        }
    }

    /// Walk `start`'s ancestor chain looking for `needle`.
    ///
    /// A chain deeper than MAX_TREE_DEPTH is treated as a cycle — that depth
    /// is unreachable for legitimate documents.
    fn ancestor_chain_contains(&self, start: &BlockId, needle: &BlockId) -> bool {
        let mut current = self.blocks.get(start).and_then(|b| b.parent_id);
        let mut depth = 0;
        while let Some(pid) = current {
            if pid == *needle {
                return true;
            }
            depth += 1;
            if depth >= MAX_TREE_DEPTH {
                tracing::warn!(
                    "ancestor walk from {start} exceeded MAX_TREE_DEPTH ({MAX_TREE_DEPTH}), treating as cycle"
                );
                return true;
            }
            current = self.blocks.get(&pid).and_then(|b| b.parent_id);
        }
        false
    }

    /// Remove a block from its parent's children (or the root set), bumping
    /// the parent. Leaves `parent_id` untouched — attach overwrites it.
    fn detach(&mut self, id: &BlockId) {
        let parent_id = self.blocks.get(id).and_then(|b| b.parent_id);
        match parent_id {
            Some(pid) => {
                if let Some(parent) = self.blocks.get_mut(&pid) {
                    parent.children.retain(|c| c != id);
                    parent.touch();
                }
            }
            None => self.roots.retain(|r| r != id),
        }
    }

    /// Set a block's parent and splice it into the sibling order at
    /// `position` (clamped; default end), bumping the new parent.
    fn attach(&mut self, id: BlockId, parent_id: Option<BlockId>, position: Option<usize>) {
        if let Some(block) = self.blocks.get_mut(&id) {
            block.parent_id = parent_id;
        }
        match parent_id {
            Some(pid) => {
                if let Some(parent) = self.blocks.get_mut(&pid) {
                    let idx = position.unwrap_or(parent.children.len()).min(parent.children.len());
                    parent.children.insert(idx, id);
                    parent.touch();
                }
            }
            None => {
                let idx = position.unwrap_or(self.roots.len()).min(self.roots.len());
                self.roots.insert(idx, id);
            }
        }
    }

    /// This block's index among its siblings (children list or root set).
    fn sibling_position(&self, id: &BlockId) -> Option<usize> {
        match self.blocks.get(id).and_then(|b| b.parent_id) {
            Some(pid) => self
                .blocks
                .get(&pid)
                .and_then(|p| p.children.iter().position(|c| c == id)),
            None => self.roots.iter().position(|r| r == id),
        }
    }

    /// Depth-first removal: descendants first, then the block itself.
    fn remove_subtree(&mut self, id: &BlockId) -> usize {
        let children = self
            .blocks
            .get(id)
            .map(|b| b.children.clone())
            .unwrap_or_default();
        let mut removed = 0;
        for child in children {
            removed += self.remove_subtree(&child);
        }
        if self.blocks.remove(id).is_some() {
            removed += 1;
        }
        removed
    }

    /// Recursively copy a subtree under fresh ids, fully detached from the
    /// live tree. The copy's children are relinked as they are built.
    fn copy_subtree(&mut self, source: &BlockId, parent: Option<BlockId>) -> Option<BlockId> {
        let src = self.blocks.get(source)?.clone();
        let copy = Block::new(BlockId::new(), src.variant, src.data, src.metadata, parent);
        let copy_id = copy.id;
        self.blocks.insert(copy_id, copy);
        for child_id in &src.children {
            if let Some(new_child) = self.copy_subtree(child_id, Some(copy_id)) {
                if let Some(copy_block) = self.blocks.get_mut(&copy_id) {
                    copy_block.children.push(new_child);
                }
            }
        }
        Some(copy_id)
    }
}

/// Shallow top-level metadata merge, with a recursive deep-merge for the
/// `permissions` sub-object specifically.
fn merge_metadata(target: &mut JsonMap, patch: JsonMap) {
    for (key, value) in patch {
        let deep = key == "permissions"
            && matches!(target.get(&key), Some(serde_json::Value::Object(_)))
            && value.is_object();
        if deep {
            if let (Some(serde_json::Value::Object(existing)), serde_json::Value::Object(incoming)) =
                (target.get_mut(&key), &value)
            {
                deep_merge(existing, incoming);
            }
        } else {
            target.insert(key, value);
        }
    }
}

/// Recursive object merge — nested objects merge, everything else replaces.
fn deep_merge(target: &mut JsonMap, patch: &JsonMap) {
    for (key, value) in patch {
        let nested = matches!(target.get(key), Some(serde_json::Value::Object(_)))
            && value.is_object();
        if nested {
            if let (Some(serde_json::Value::Object(t)), serde_json::Value::Object(p)) =
                (target.get_mut(key), value)
            {
                deep_merge(t, p);
            }
        } else {
            target.insert(key.clone(), value.clone());
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
