//! Error types for document ingestion.

use thiserror::Error;

/// Result type for ingestion.
pub type ParseResult<T> = Result<T, ParseError>;

/// Why raw input could not be turned into a document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The text is not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The top-level value is not an object.
    #[error("Content must be an object")]
    NotAnObject,

    /// `entryId` is absent or not a string.
    #[error("Content must have entryId (string)")]
    MissingEntryId,

    /// `nodes` is absent or not an object.
    #[error("Content must have nodes (object)")]
    MissingNodes,

    /// The envelope is fine but a node cannot be represented.
    #[error("invalid node: {0}")]
    InvalidNode(String),
}
