//! Whole-document validation against a schema.
//!
//! Works on raw JSON so that anything a user pastes can be reported on, not
//! only documents that already deserialize. Findings accumulate across the
//! whole document; within a single node the first problem is reported.

use blockgraph_schema::{Schema, validate_config_against_definition};
use blockgraph_types::{Document, RESERVED_NODE_KEYS};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentIssue {
    /// Dotted path to the problem, e.g. `nodes.a.config` (empty for the root).
    pub path: String,
    pub message: String,
}

impl ContentIssue {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Outcome of validating a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContentValidation {
    pub valid: bool,
    pub errors: Vec<ContentIssue>,
}

impl ContentValidation {
    fn from_errors(errors: Vec<ContentIssue>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Returns true if no issues were found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Validates a raw document against `schema`.
///
/// Checks, in order: the document is an object; `entryId` is a non-empty
/// string; `nodes` is an object; every node (shape, id/key agreement, block
/// type, config, declared slots and their cardinality); `entryId` names a
/// node; and finally that every slot reference points at an existing node.
pub fn validate_content(schema: &Schema, content: &Value) -> ContentValidation {
    let Some(document) = content.as_object() else {
        return ContentValidation::from_errors(vec![ContentIssue::new(
            "",
            "Content must be an object",
        )]);
    };

    let mut errors = Vec::new();

    let entry_id = document
        .get("entryId")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty());
    if entry_id.is_none() {
        errors.push(ContentIssue::new("entryId", "entryId must be a non-empty string"));
    }

    let nodes = document.get("nodes").and_then(Value::as_object);
    let Some(nodes) = nodes else {
        errors.push(ContentIssue::new("nodes", "nodes must be an object (map of id to node)"));
        return ContentValidation::from_errors(errors);
    };

    for (key, node) in nodes {
        if let Err(issue) = check_node(schema, key, node) {
            errors.push(issue);
        }
    }

    if let Some(entry_id) = entry_id {
        if !nodes.contains_key(entry_id) {
            errors.push(ContentIssue::new(
                "entryId",
                format!("entryId \"{entry_id}\" is not in nodes"),
            ));
        }
    }

    for (key, node) in nodes {
        collect_dangling_references(nodes, key, node, &mut errors);
    }

    debug!(nodes = nodes.len(), issues = errors.len(), "Validated content");
    ContentValidation::from_errors(errors)
}

/// Validates a typed document. Equivalent to validating its JSON form.
pub fn validate_document(schema: &Schema, document: &Document) -> ContentValidation {
    match document.to_value() {
        Ok(value) => validate_content(schema, &value),
        Err(e) => ContentValidation::from_errors(vec![ContentIssue::new("", e.to_string())]),
    }
}

fn check_node(schema: &Schema, key: &str, value: &Value) -> Result<(), ContentIssue> {
    let path = format!("nodes.{key}");
    let Some(node) = value.as_object() else {
        return Err(ContentIssue::new(path, "Node must be an object"));
    };

    let id = node.get("id").and_then(Value::as_str).unwrap_or_default();
    if id.is_empty() {
        return Err(ContentIssue::new(
            format!("{path}.id"),
            "Node id must be a non-empty string",
        ));
    }
    if id != key {
        return Err(ContentIssue::new(
            format!("{path}.id"),
            format!("Node id \"{id}\" must match map key \"{key}\""),
        ));
    }

    let block = node.get("block").and_then(Value::as_str).unwrap_or_default();
    if block.is_empty() {
        return Err(ContentIssue::new(
            format!("{path}.block"),
            "Node block must be a non-empty string",
        ));
    }
    let Some(block_type) = schema.get(block) else {
        return Err(ContentIssue::new(
            format!("{path}.block"),
            format!("Unknown block type: {block}"),
        ));
    };

    let empty = Value::Object(Map::new());
    let config = match node.get("config") {
        None => &empty,
        Some(config) if config.is_object() => config,
        Some(_) => {
            return Err(ContentIssue::new(
                format!("{path}.config"),
                "Node config must be an object",
            ));
        }
    };
    let config_result = validate_config_against_definition(block_type, config);
    if let Some(first) = config_result.first() {
        let message = if first.path.is_empty() {
            first.message.clone()
        } else {
            format!("{}: {}", first.path, first.message)
        };
        return Err(ContentIssue::new(format!("{path}.config"), message));
    }

    for (slot_name, slot_value) in node {
        if RESERVED_NODE_KEYS.contains(&slot_name.as_str()) {
            continue;
        }
        let Some(slot) = block_type.slot(slot_name) else {
            return Err(ContentIssue::new(
                path.clone(),
                format!("Unknown slot \"{slot_name}\" for block type \"{block}\""),
            ));
        };
        if slot_value.is_null() {
            continue;
        }
        let slot_path = format!("{path}.{slot_name}");
        if slot.multiple {
            let Some(items) = slot_value.as_array() else {
                return Err(ContentIssue::new(
                    slot_path,
                    format!("Slot \"{slot_name}\" must be an array of ids (multiple: true)"),
                ));
            };
            if !items.iter().all(Value::is_string) {
                return Err(ContentIssue::new(
                    slot_path,
                    format!("Slot \"{slot_name}\" must contain only string ids"),
                ));
            }
        } else if !slot_value.is_string() {
            return Err(ContentIssue::new(
                slot_path,
                format!("Slot \"{slot_name}\" must be a single id string (multiple: false)"),
            ));
        }
    }

    Ok(())
}

fn collect_dangling_references(
    nodes: &Map<String, Value>,
    key: &str,
    value: &Value,
    errors: &mut Vec<ContentIssue>,
) {
    let Some(node) = value.as_object() else {
        return;
    };
    for (slot_name, slot_value) in node {
        if RESERVED_NODE_KEYS.contains(&slot_name.as_str()) {
            continue;
        }
        let referenced: Vec<&str> = match slot_value {
            Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
            Value::String(id) => vec![id.as_str()],
            _ => Vec::new(),
        };
        for id in referenced {
            if !nodes.contains_key(id) {
                errors.push(ContentIssue::new(
                    format!("nodes.{key}.{slot_name}"),
                    format!("Referenced id \"{id}\" is not in nodes (dangling reference)"),
                ));
            }
        }
    }
}
