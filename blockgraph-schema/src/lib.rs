//! Block type registry for blockgraph.
//!
//! Defines what kinds of content nodes exist and how they fit together:
//! - [`BlockDeclaration`] / [`SlotDeclaration`]: plain, serde-friendly input
//! - [`SchemaBuilder`]: accumulates declarations (and [`SchemaPlugin`]s) and
//!   produces one immutable [`Schema`]
//! - [`BlockTypeDefinition`] / [`SlotDefinition`]: the compiled, read-only
//!   view every other crate consumes
//! - [`validate_config`]: checks a block's config object against the JSON
//!   Schema declared for that block type
//!
//! A [`Schema`] is built once and never mutated afterwards, so it can be
//! shared freely between threads.

mod definition;
mod registry;
mod validate;

pub use definition::{
    BlockDeclaration, SchemaDefinition, SchemaOptions, SlotDeclaration, SlotLayoutHint,
    SlotReferenceMode,
};
pub use registry::{
    BlockTypeDefinition, PluginContext, Schema, SchemaBuilder, SchemaPlugin, SlotDefinition,
    SlotMembership, create_schema,
};
pub use validate::{
    ConfigIssue, ConfigIssueKind, ConfigValidation, validate_config,
    validate_config_against_definition,
};

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while loading a schema definition.
///
/// Building a schema from declarations never fails; malformed config schemas
/// only surface when a config is validated.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The definition file is not valid JSON or has the wrong shape.
    #[error("invalid schema definition: {0}")]
    InvalidDefinition(#[from] serde_json::Error),
}
