//! The schema registry — a pure, stateless lookup table.
//!
//! Maps each [`BlockVariant`] to its [`BlockSchema`]. The registry validates
//! payloads, answers structural-compatibility questions, and constructs fresh
//! blocks (defaults merged, ids and timestamps stamped). It never holds node
//! references and never touches the tree — that's the engine's job.

use std::collections::BTreeMap;

use kiban_types::{Block, BlockId, BlockVariant, JsonMap};

use crate::builtin;
use crate::schema::BlockSchema;
use crate::validate::{codes, FieldError, ValidationReport};

/// Registry of block schemas, keyed by variant.
///
/// `builtin()` gives the full productivity-backend set; `register()` stays
/// public so deployments add variants without engine changes.
#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    schemas: BTreeMap<BlockVariant, BlockSchema>,
}

impl SchemaRegistry {
    /// An empty registry. Mostly useful in tests; production code wants
    /// [`SchemaRegistry::builtin`].
    pub fn new() -> Self {
        Self {
            schemas: BTreeMap::new(),
        }
    }

    /// Registry pre-populated with every built-in variant.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for schema in builtin::schemas() {
            registry.register(schema);
        }
        registry
    }

    /// Register (or replace) a schema.
    pub fn register(&mut self, schema: BlockSchema) {
        self.schemas.insert(schema.variant, schema);
    }

    /// Check if a variant has a registered schema.
    pub fn is_registered(&self, variant: BlockVariant) -> bool {
        self.schemas.contains_key(&variant)
    }

    /// Look up a variant's schema.
    pub fn get(&self, variant: BlockVariant) -> Option<&BlockSchema> {
        self.schemas.get(&variant)
    }

    /// Registered variants, in stable (enum) order.
    pub fn variants(&self) -> Vec<BlockVariant> {
        self.schemas.keys().copied().collect()
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Check if no schemas are registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Validate a payload against a variant's schema.
    ///
    /// Never panics. An unregistered variant yields a failing report with a
    /// single `unknown_variant` error rather than an error type — validation
    /// always produces a structured result.
    pub fn validate(&self, variant: BlockVariant, data: &JsonMap) -> ValidationReport {
        match self.schemas.get(&variant) {
            Some(schema) => ValidationReport::from_errors(schema.validate(data)),
            None => ValidationReport::from_errors(vec![FieldError::new(
                "variant",
                format!("no schema registered for variant '{variant}'"),
                codes::UNKNOWN_VARIANT,
            )]),
        }
    }

    /// Check the parent side of the structural constraint: the parent variant
    /// can hold children and its whitelist (if any) admits the child.
    pub fn can_have_child(&self, parent: BlockVariant, child: BlockVariant) -> bool {
        self.schemas
            .get(&parent)
            .map_or(false, |schema| schema.admits_child(child))
    }

    /// Check the child side of the structural constraint: the child variant's
    /// parent whitelist (if any) admits the parent.
    pub fn can_have_parent(&self, child: BlockVariant, parent: BlockVariant) -> bool {
        self.schemas
            .get(&child)
            .map_or(false, |schema| schema.admits_parent(parent))
    }

    /// Build a fresh node: caller data merged over schema defaults, id and
    /// timestamps stamped, children empty. Does not touch any tree.
    ///
    /// Returns `None` for an unregistered variant — the engine maps that to
    /// its own error before calling.
    pub fn create_block(
        &self,
        variant: BlockVariant,
        data: JsonMap,
        metadata: JsonMap,
        parent_id: Option<BlockId>,
    ) -> Option<Block> {
        let schema = self.schemas.get(&variant)?;
        Some(Block::new(
            BlockId::new(),
            variant,
            merge_over_defaults(schema.default_data(), data),
            metadata,
            parent_id,
        ))
    }
}

/// Merge caller data over defaults — caller keys win, untouched defaults stay.
pub(crate) fn merge_over_defaults(mut defaults: JsonMap, data: JsonMap) -> JsonMap {
    for (key, value) in data {
        defaults.insert(key, value);
    }
    defaults
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data_with(key: &str, value: serde_json::Value) -> JsonMap {
        let mut map = JsonMap::new();
        map.insert(key.to_string(), value);
        map
    }

    #[test]
    fn test_builtin_registers_all_variants() {
        let registry = SchemaRegistry::builtin();
        assert_eq!(registry.len(), 24);
        assert!(registry.is_registered(BlockVariant::Text));
        assert!(registry.is_registered(BlockVariant::KanbanSwimlane));
        assert!(registry.is_registered(BlockVariant::DatabaseRow));
    }

    #[test]
    fn test_empty_registry_knows_nothing() {
        let registry = SchemaRegistry::new();
        assert!(registry.is_empty());
        assert!(!registry.is_registered(BlockVariant::Text));
        assert!(registry.get(BlockVariant::Text).is_none());
        assert!(!registry.can_have_child(BlockVariant::Page, BlockVariant::Text));
    }

    #[test]
    fn test_validate_unknown_variant_is_structured() {
        let registry = SchemaRegistry::new();
        let report = registry.validate(BlockVariant::Text, &JsonMap::new());
        assert!(!report.valid);
        assert_eq!(report.errors[0].code, codes::UNKNOWN_VARIANT);
    }

    #[test]
    fn test_bidirectional_compatibility() {
        let registry = SchemaRegistry::builtin();
        // Row admits Column; Column admits Row as parent.
        assert!(registry.can_have_child(BlockVariant::Row, BlockVariant::Column));
        assert!(registry.can_have_parent(BlockVariant::Column, BlockVariant::Row));
        // Page is open to children, but Column refuses Page as a parent —
        // the child side of the check is what rejects the pair.
        assert!(registry.can_have_child(BlockVariant::Page, BlockVariant::Column));
        assert!(!registry.can_have_parent(BlockVariant::Column, BlockVariant::Page));
    }

    #[test]
    fn test_leaf_variants_refuse_children() {
        let registry = SchemaRegistry::builtin();
        assert!(!registry.can_have_child(BlockVariant::Divider, BlockVariant::Text));
        assert!(!registry.can_have_child(BlockVariant::Image, BlockVariant::Text));
        assert!(!registry.can_have_child(BlockVariant::Heading, BlockVariant::Text));
    }

    #[test]
    fn test_create_block_merges_defaults() {
        let registry = SchemaRegistry::builtin();
        let block = registry
            .create_block(
                BlockVariant::Todo,
                data_with("content", json!("buy milk")),
                JsonMap::new(),
                None,
            )
            .unwrap();
        assert_eq!(block.variant, BlockVariant::Todo);
        assert_eq!(block.data.get("content"), Some(&json!("buy milk")));
        // Schema default fills in.
        assert_eq!(block.data.get("completed"), Some(&json!(false)));
        assert!(block.children.is_empty());
    }

    #[test]
    fn test_create_block_caller_data_wins() {
        let registry = SchemaRegistry::builtin();
        let mut data = data_with("content", json!("done already"));
        data.insert("completed".to_string(), json!(true));
        let block = registry
            .create_block(BlockVariant::Todo, data, JsonMap::new(), None)
            .unwrap();
        assert_eq!(block.data.get("completed"), Some(&json!(true)));
    }

    #[test]
    fn test_create_block_unknown_variant() {
        let registry = SchemaRegistry::new();
        assert!(registry
            .create_block(BlockVariant::Text, JsonMap::new(), JsonMap::new(), None)
            .is_none());
    }

    #[test]
    fn test_register_custom_schema_overrides() {
        use crate::schema::BlockSchema;
        use kiban_types::SchemaCategory;

        let mut registry = SchemaRegistry::builtin();
        // Tighten Page to only hold headings — no engine changes required.
        registry.register(
            BlockSchema::new(
                BlockVariant::Page,
                "Page",
                "Restricted page",
                SchemaCategory::Layout,
            )
            .children(&[BlockVariant::Heading]),
        );
        assert!(registry.can_have_child(BlockVariant::Page, BlockVariant::Heading));
        assert!(!registry.can_have_child(BlockVariant::Page, BlockVariant::Text));
    }
}
