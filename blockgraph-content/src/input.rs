//! Loosely-shaped documents accepted by the normalizer.
//!
//! Slot values may be ids, id lists, inline nodes, or lists mixing the two.
//! Anything else deserializes into an `Other` variant so that the normalizer
//! can drop it instead of failing the whole document.

use blockgraph_types::{Config, Document, SlotValue};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A document whose slots may embed child nodes inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInput {
    pub entry_id: String,
    #[serde(deserialize_with = "lenient_nodes")]
    pub nodes: BTreeMap<String, NodeInput>,
}

impl DocumentInput {
    /// Deserializes an input document from JSON text.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// Deserializes an input document from a JSON value.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }
}

/// A node as written by an author. Inline nodes usually omit `id`.
///
/// An object is only taken as an inline node when it has a `block` key.
/// Field values of the wrong type are read as empty rather than rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInput {
    #[serde(
        default,
        deserialize_with = "lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient_block")]
    pub block: String,
    #[serde(default, deserialize_with = "lenient_config")]
    pub config: Config,
    #[serde(flatten)]
    pub slots: BTreeMap<String, SlotInput>,
}

impl NodeInput {
    /// Creates an inline node with no id, empty config and no slots.
    pub fn new(block: impl Into<String>) -> Self {
        Self {
            id: None,
            block: block.into(),
            config: Config::new(),
            slots: BTreeMap::new(),
        }
    }

    /// Replaces the config. Non-object values yield an empty config.
    #[must_use]
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = match config {
            Value::Object(map) => map,
            _ => Config::new(),
        };
        self
    }

    /// Sets a slot value.
    #[must_use]
    pub fn with_slot(mut self, name: impl Into<String>, value: SlotInput) -> Self {
        self.slots.insert(name.into(), value);
        self
    }
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(id) => Some(id),
        _ => None,
    })
}

fn lenient_block<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(block) => block,
        _ => String::new(),
    })
}

fn lenient_config<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Config, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(config) => config,
        _ => Config::new(),
    })
}

/// Top-level nodes are keyed by id, so a missing `block` or a non-object
/// node still yields an (unknown-block) entry.
fn lenient_nodes<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, NodeInput>, D::Error> {
    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
    let nodes = raw
        .into_iter()
        .map(|(key, value)| {
            let node = match value {
                Value::Object(mut fields) => {
                    fields.entry("block").or_insert(Value::Null);
                    serde_json::from_value(Value::Object(fields))
                        .unwrap_or_else(|_| NodeInput::new(""))
                }
                _ => NodeInput::new(""),
            };
            (key, node)
        })
        .collect();
    Ok(nodes)
}

/// A slot value before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotInput {
    Id(String),
    List(Vec<SlotItem>),
    Inline(Box<NodeInput>),
    Other(Value),
}

impl SlotInput {
    /// Wraps an inline node.
    pub fn inline(node: NodeInput) -> Self {
        SlotInput::Inline(Box::new(node))
    }
}

/// One element of a list-valued slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotItem {
    Id(String),
    Inline(NodeInput),
    Other(Value),
}

impl From<&str> for SlotInput {
    fn from(id: &str) -> Self {
        SlotInput::Id(id.to_string())
    }
}

impl From<&SlotValue> for SlotInput {
    fn from(value: &SlotValue) -> Self {
        match value {
            SlotValue::Id(id) => SlotInput::Id(id.clone()),
            SlotValue::Ids(ids) => SlotInput::List(ids.iter().cloned().map(SlotItem::Id).collect()),
        }
    }
}

impl From<&Document> for DocumentInput {
    fn from(document: &Document) -> Self {
        let nodes = document
            .nodes
            .iter()
            .map(|(key, node)| {
                let input = NodeInput {
                    id: Some(node.id.clone()),
                    block: node.block.clone(),
                    config: node.config.clone(),
                    slots: node
                        .slots
                        .iter()
                        .map(|(name, value)| (name.clone(), SlotInput::from(value)))
                        .collect(),
                };
                (key.clone(), input)
            })
            .collect();
        Self {
            entry_id: document.entry_id.clone(),
            nodes,
        }
    }
}
