//! Per-variant schema records.
//!
//! A [`BlockSchema`] is everything the registry knows about one variant:
//! display info, structural constraints, default payload, and the validator.
//! Schemas are plain data plus a function pointer — no tree awareness, no
//! node references.

use kiban_types::{BlockVariant, JsonMap, SchemaCategory};

use crate::validate::FieldError;

/// Validation function for a variant's payload.
///
/// Receives the *merged* data (caller data over defaults) and returns every
/// field-level problem it finds. An empty list means valid.
pub type ValidateFn = fn(&JsonMap) -> Vec<FieldError>;

/// The registry's record of one block variant.
///
/// Structural constraints are bidirectional: a parent admits a child only if
/// the parent's `allowed_children` permits it *and* the child's
/// `allowed_parents` permits the parent. `None` means open on that side.
#[derive(Clone, Debug)]
pub struct BlockSchema {
    /// Variant this schema describes.
    pub variant: BlockVariant,
    /// Human-facing name ("Kanban Card").
    pub name: &'static str,
    /// One-line description for palettes and docs.
    pub description: &'static str,
    /// Coarse grouping for UI palettes.
    pub category: SchemaCategory,
    /// Whether this variant may hold children at all.
    pub can_have_children: bool,
    /// Explicit child whitelist; `None` = any child variant.
    pub allowed_children: Option<Vec<BlockVariant>>,
    /// Explicit parent whitelist; `None` = any parent variant.
    pub allowed_parents: Option<Vec<BlockVariant>>,
    /// Default payload merged under caller data at creation.
    default_data: JsonMap,
    /// Payload validator.
    validate: ValidateFn,
}

/// No-op validator for variants with no payload rules of their own.
fn accept_any(_data: &JsonMap) -> Vec<FieldError> {
    Vec::new()
}

impl BlockSchema {
    /// Start a schema: container by default, open on both sides, empty
    /// defaults, accept-anything validator. Narrow it with the builder
    /// methods below.
    pub fn new(
        variant: BlockVariant,
        name: &'static str,
        description: &'static str,
        category: SchemaCategory,
    ) -> Self {
        Self {
            variant,
            name,
            description,
            category,
            can_have_children: true,
            allowed_children: None,
            allowed_parents: None,
            default_data: JsonMap::new(),
            validate: accept_any,
        }
    }

    /// Mark this variant childless (dividers, images, code blocks).
    pub fn leaf(mut self) -> Self {
        self.can_have_children = false;
        self.allowed_children = None;
        self
    }

    /// Restrict which variants may appear as children.
    pub fn children(mut self, allowed: &[BlockVariant]) -> Self {
        self.allowed_children = Some(allowed.to_vec());
        self
    }

    /// Restrict which variants may appear as the parent.
    pub fn parents(mut self, allowed: &[BlockVariant]) -> Self {
        self.allowed_parents = Some(allowed.to_vec());
        self
    }

    /// Set the default payload. Accepts a JSON value for `json!` ergonomics;
    /// non-object values are ignored (defaults are always an object).
    pub fn defaults(mut self, value: serde_json::Value) -> Self {
        if let serde_json::Value::Object(map) = value {
            self.default_data = map;
        }
        self
    }

    /// Set the payload validator.
    pub fn validator(mut self, f: ValidateFn) -> Self {
        self.validate = f;
        self
    }

    /// Clone of the default payload.
    pub fn default_data(&self) -> JsonMap {
        self.default_data.clone()
    }

    /// Run the validator against a payload.
    pub fn validate(&self, data: &JsonMap) -> Vec<FieldError> {
        (self.validate)(data)
    }

    /// Check this schema's side of the parent→child constraint.
    pub fn admits_child(&self, child: BlockVariant) -> bool {
        self.can_have_children
            && self
                .allowed_children
                .as_ref()
                .map_or(true, |allowed| allowed.contains(&child))
    }

    /// Check this schema's side of the child→parent constraint.
    pub fn admits_parent(&self, parent: BlockVariant) -> bool {
        self.allowed_parents
            .as_ref()
            .map_or(true, |allowed| allowed.contains(&parent))
    }
}

// =========================================================================
// Tests
// =========================================================================
