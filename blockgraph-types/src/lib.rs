//! Core type definitions for blockgraph.
//!
//! This crate defines the canonical, schema-agnostic content model used by
//! every other blockgraph crate:
//! - [`Document`]: one entry id plus a flat map of nodes keyed by id
//! - [`ContentNode`]: block name, config object and slot references
//! - [`SlotValue`]: a single child id or an ordered list of child ids
//! - Node id generation ([`IdGenerator`], [`RandomIds`], [`SequentialIds`])
//!
//! Nothing here knows about block types. Schema-driven rules (which slots a
//! block declares, what its config must look like) live in
//! `blockgraph-schema` and are enforced by `blockgraph-content`.

mod document;
mod ids;

pub use document::{Config, ContentNode, Document, SlotValue, RESERVED_NODE_KEYS};
pub use ids::{IdGenerator, RandomIds, SequentialIds, generate_node_id};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when converting documents to and from JSON.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid document: {0}")]
    InvalidDocument(String),
}
