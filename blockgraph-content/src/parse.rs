//! Minimal ingestion of untrusted document text.

use crate::error::{ParseError, ParseResult};
use blockgraph_types::Document;
use serde_json::Value;

/// Parses raw text and checks the envelope: an object with a string
/// `entryId` and an object `nodes`. Nothing deeper is checked, so the value
/// can be handed to [`crate::validate_content`] for a full report.
pub fn parse_content_value(raw: &str) -> ParseResult<Value> {
    let parsed: Value = serde_json::from_str(raw)?;
    let Some(object) = parsed.as_object() else {
        return Err(ParseError::NotAnObject);
    };
    if !object.get("entryId").is_some_and(Value::is_string) {
        return Err(ParseError::MissingEntryId);
    }
    if !object.get("nodes").is_some_and(Value::is_object) {
        return Err(ParseError::MissingNodes);
    }
    Ok(parsed)
}

/// Parses raw text into a typed [`Document`].
///
/// Nodes must be representable (string `id`/`block`, object `config`, slot
/// values that are ids or id lists); schema rules are not checked.
pub fn parse_content_json(raw: &str) -> ParseResult<Document> {
    let value = parse_content_value(raw)?;
    serde_json::from_value(value).map_err(|e| ParseError::InvalidNode(e.to_string()))
}
