//! Document ingestion, validation and normalization.
//!
//! - [`parse_content_json`] / [`parse_content_value`]: turn untrusted text
//!   into a document, checking only the top-level shape
//! - [`validate_content`]: decides whether a document is safe to resolve,
//!   down to config schemas and referential integrity
//! - [`normalize_content`]: flattens inline child nodes into canonical,
//!   id-referencing form

mod error;
mod input;
mod normalize;
mod parse;
mod validate;

pub use error::{ParseError, ParseResult};
pub use input::{DocumentInput, NodeInput, SlotInput, SlotItem};
pub use normalize::{normalize_content, normalize_content_with};
pub use parse::{parse_content_json, parse_content_value};
pub use validate::{ContentIssue, ContentValidation, validate_content, validate_document};
