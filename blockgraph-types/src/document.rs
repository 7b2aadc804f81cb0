//! Canonical (flat, id-referencing) documents.
//!
//! A [`Document`] is one designated entry id plus every node keyed by its own
//! id. Slots never embed children; they hold ids. Nodes are stored behind
//! [`Arc`] so that pure transformations (patching, normalization) can share
//! untouched nodes between the old and the new document, and callers can use
//! [`Arc::ptr_eq`] for cheap change detection.

use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Block configuration object.
pub type Config = Map<String, Value>;

/// Node keys that are never slot names.
pub const RESERVED_NODE_KEYS: [&str; 3] = ["id", "block", "config"];

/// A slot's value in canonical form.
///
/// Serialized untagged: `"child"` or `["a", "b"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotValue {
    /// At most one child (`multiple: false` slots).
    Id(String),
    /// Ordered children (`multiple: true` slots).
    Ids(Vec<String>),
}

impl SlotValue {
    /// Iterates the referenced ids in slot order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            SlotValue::Id(id) => std::slice::from_ref(id),
            SlotValue::Ids(ids) => ids,
        };
        slice.iter().map(String::as_str)
    }

    /// Returns the referenced ids as an owned, ordered list.
    #[must_use]
    pub fn to_ids(&self) -> Vec<String> {
        self.ids().map(str::to_string).collect()
    }

    /// Returns true if the slot references `id`.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids().any(|candidate| candidate == id)
    }

    /// Number of referenced ids.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            SlotValue::Id(_) => 1,
            SlotValue::Ids(ids) => ids.len(),
        }
    }

    /// Returns true for an empty id list.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for SlotValue {
    fn from(id: &str) -> Self {
        SlotValue::Id(id.to_string())
    }
}

impl From<String> for SlotValue {
    fn from(id: String) -> Self {
        SlotValue::Id(id)
    }
}

impl From<Vec<String>> for SlotValue {
    fn from(ids: Vec<String>) -> Self {
        SlotValue::Ids(ids)
    }
}

impl From<&[&str]> for SlotValue {
    fn from(ids: &[&str]) -> Self {
        SlotValue::Ids(ids.iter().map(|id| id.to_string()).collect())
    }
}

/// A single node of a canonical document.
///
/// On the wire the slot values sit next to `id`, `block` and `config`:
/// `{"id": "root", "block": "card", "config": {}, "children": ["a"]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentNode {
    /// Must equal the node's key in [`Document::nodes`].
    pub id: String,
    /// Name of the block type this node instantiates.
    pub block: String,
    /// Block-specific configuration.
    #[serde(default)]
    pub config: Config,
    /// Slot name to child reference(s). `null` slot values are dropped on input.
    #[serde(flatten, deserialize_with = "non_null_slots")]
    pub slots: BTreeMap<String, SlotValue>,
}

fn non_null_slots<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, SlotValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Option<SlotValue>>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(name, value)| value.map(|value| (name, value)))
        .collect())
}

impl ContentNode {
    /// Creates a node with an empty config and no slots.
    pub fn new(id: impl Into<String>, block: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            block: block.into(),
            config: Config::new(),
            slots: BTreeMap::new(),
        }
    }

    /// Replaces the config. A non-object value is treated as an empty config.
    #[must_use]
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = match config {
            Value::Object(map) => map,
            _ => Config::new(),
        };
        self
    }

    /// Sets a single-id slot.
    #[must_use]
    pub fn with_child(mut self, slot: impl Into<String>, id: impl Into<String>) -> Self {
        self.slots.insert(slot.into(), SlotValue::Id(id.into()));
        self
    }

    /// Sets an id-list slot.
    #[must_use]
    pub fn with_children(mut self, slot: impl Into<String>, ids: &[&str]) -> Self {
        self.slots.insert(slot.into(), SlotValue::from(ids));
        self
    }

    /// Returns the raw value of a slot, if present.
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<&SlotValue> {
        self.slots.get(name)
    }

    /// Returns the ids referenced by a slot; empty when the slot is absent.
    #[must_use]
    pub fn slot_ids(&self, name: &str) -> Vec<String> {
        self.slots.get(name).map(SlotValue::to_ids).unwrap_or_default()
    }

    /// Returns true if any slot references `id`.
    #[must_use]
    pub fn references(&self, id: &str) -> bool {
        self.slots.values().any(|value| value.contains(id))
    }
}

/// A document in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Id of the root node.
    pub entry_id: String,
    /// Every node, keyed by its own id.
    pub nodes: BTreeMap<String, Arc<ContentNode>>,
}

impl Document {
    /// Creates an empty document pointing at `entry_id`.
    pub fn new(entry_id: impl Into<String>) -> Self {
        Self {
            entry_id: entry_id.into(),
            nodes: BTreeMap::new(),
        }
    }

    /// Adds a node keyed by its own id.
    #[must_use]
    pub fn with_node(mut self, node: ContentNode) -> Self {
        self.insert(node);
        self
    }

    /// Inserts or replaces a node keyed by its own id.
    pub fn insert(&mut self, node: ContentNode) {
        self.nodes.insert(node.id.clone(), Arc::new(node));
    }

    /// Looks up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&ContentNode> {
        self.nodes.get(id).map(Arc::as_ref)
    }

    /// Returns true if a node with `id` exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// The entry node, if it exists.
    #[must_use]
    pub fn entry(&self) -> Option<&ContentNode> {
        self.node(&self.entry_id)
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the document holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Converts a JSON value into a typed document.
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::InvalidDocument("document must be an object".into()));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Converts the document into its JSON representation.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}
