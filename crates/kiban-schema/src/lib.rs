//! Schema registry for Kiban blocks.
//!
//! Every block variant has a schema: default payload, structural constraints
//! (which variants it may parent or be parented by), and a validator producing
//! field-level errors. The registry is a pure, stateless lookup table — it
//! never holds node references and has no tree awareness. The tree engine
//! consults it before every mutation.
//!
//! # Design
//!
//! - **Tagged records, not trait objects**: one [`BlockSchema`] per
//!   [`kiban_types::BlockVariant`], holding a plain `fn` validator. Blocks
//!   stay plain data; polymorphism lives entirely in this table.
//! - **Bidirectional constraints**: a parent/child pair is legal only if the
//!   parent's schema admits the child *and* the child's schema admits the
//!   parent. Either side can veto.
//! - **Structured validation**: [`SchemaRegistry::validate`] never panics and
//!   always returns a [`ValidationReport`] with machine-readable codes.

pub mod registry;
pub mod schema;
pub mod validate;

mod builtin;

pub use registry::SchemaRegistry;
pub use schema::{BlockSchema, ValidateFn};
pub use validate::{codes, FieldError, ValidationReport};
