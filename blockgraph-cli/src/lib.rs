//! File-level operations behind the `blockgraph` binary.
//!
//! Every function reads its inputs from disk and returns a value ready to be
//! printed as JSON; the binary only parses arguments and writes output.

use anyhow::{Context, Result};
use blockgraph_content::{
    ContentIssue, ContentValidation, DocumentInput, normalize_content, parse_content_json,
    validate_content,
};
use blockgraph_patches::{Patch, apply_patch, apply_patch_strict};
use blockgraph_resolver::{PageContext, ResolvedNode, resolve, resolve_with_context};
use blockgraph_schema::Schema;
use blockgraph_types::Document;
use serde::Serialize;
use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Loads a schema definition file.
pub fn load_schema(path: &Path) -> Result<Schema> {
    let raw = read(path, "schema")?;
    let schema = Schema::from_json(&raw)
        .with_context(|| format!("Failed to parse schema file {}", path.display()))?;
    debug!("Loaded schema with {} block type(s) from {:?}", schema.len(), path);
    Ok(schema)
}

/// Validates a document file. Text that is not JSON is reported as a single
/// root-level issue rather than failing.
pub fn validate_file(schema: &Schema, path: &Path) -> Result<ContentValidation> {
    let raw = read(path, "content")?;
    let report = match serde_json::from_str::<Value>(&raw) {
        Ok(content) => validate_content(schema, &content),
        Err(e) => ContentValidation {
            valid: false,
            errors: vec![ContentIssue {
                path: String::new(),
                message: format!("Invalid JSON: {e}"),
            }],
        },
    };
    Ok(report)
}

/// Normalizes a document file that may contain inline nodes.
pub fn normalize_file(schema: &Schema, path: &Path) -> Result<Document> {
    let raw = read(path, "content")?;
    let input = DocumentInput::from_json(&raw)
        .with_context(|| format!("Failed to parse content file {}", path.display()))?;
    Ok(normalize_content(schema, &input))
}

/// Resolves a document file, optionally under a page context file.
pub fn resolve_file(
    schema: &Schema,
    path: &Path,
    context: Option<&Path>,
) -> Result<Option<ResolvedNode>> {
    let document = load_document(path)?;
    let Some(context_path) = context else {
        return Ok(resolve(schema, &document));
    };
    let raw = read(context_path, "context")?;
    let context: PageContext = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse context file {}", context_path.display()))?;
    Ok(resolve_with_context(schema, &document, &context))
}

/// Applies a patch file to a document file.
pub fn patch_file(content: &Path, patch: &Path, strict: bool) -> Result<Document> {
    let document = load_document(content)?;
    let raw = read(patch, "patch")?;
    let patch: Patch = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse patch file {}", patch.display()))?;
    if strict {
        Ok(apply_patch_strict(&document, &patch)?)
    } else {
        Ok(apply_patch(&document, &patch))
    }
}

/// Summary of a schema: version, block names, addable names and the JSON
/// Schema of the document envelope.
pub fn describe(schema: &Schema) -> Value {
    json!({
        "version": schema.version(),
        "blocks": schema.block_names(),
        "addable": schema.addable_block_types(),
        "contentSchema": schema.content_schema(),
    })
}

/// Serializes a command result for stdout.
pub fn render<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}

fn load_document(path: &Path) -> Result<Document> {
    let raw = read(path, "content")?;
    parse_content_json(&raw).with_context(|| format!("Invalid content file {}", path.display()))
}

fn read(path: &Path, what: &str) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {} file {}", what, path.display()))
}
