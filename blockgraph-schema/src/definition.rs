//! Declarations: the raw, user-authored description of block types.
//!
//! These are what a schema file contains. [`crate::SchemaBuilder`] turns them
//! into [`crate::BlockTypeDefinition`]s.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// How a slot may reference its children in input documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotReferenceMode {
    /// Only ids (canonical form).
    #[default]
    Id,
    /// Inline child nodes, flattened by normalization.
    Inline,
    /// Either ids or inline nodes.
    Both,
}

impl SlotReferenceMode {
    /// Returns true if inline nodes are flattened for this mode.
    #[must_use]
    pub const fn accepts_inline(self) -> bool {
        matches!(self, SlotReferenceMode::Inline | SlotReferenceMode::Both)
    }
}

/// Layout hint for editing surfaces. Ignored by validation and resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotLayoutHint {
    Row,
    Column,
}

/// A slot as declared on a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotDeclaration {
    pub name: String,
    #[serde(default)]
    pub multiple: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<SlotLayoutHint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_block_names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_block_names: Option<Vec<String>>,
}

impl SlotDeclaration {
    fn new(name: impl Into<String>, multiple: bool) -> Self {
        Self {
            name: name.into(),
            multiple,
            layout: None,
            include_block_names: None,
            exclude_block_names: None,
        }
    }

    /// A slot holding at most one child.
    pub fn single(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }

    /// A slot holding an ordered list of children.
    pub fn multiple(name: impl Into<String>) -> Self {
        Self::new(name, true)
    }

    /// Sets the layout hint.
    #[must_use]
    pub fn layout(mut self, layout: SlotLayoutHint) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Restricts the slot to the given block names.
    #[must_use]
    pub fn include(mut self, names: &[&str]) -> Self {
        self.include_block_names = Some(names.iter().map(|n| n.to_string()).collect());
        self
    }

    /// Forbids the given block names in the slot.
    #[must_use]
    pub fn exclude(mut self, names: &[&str]) -> Self {
        self.exclude_block_names = Some(names.iter().map(|n| n.to_string()).collect());
        self
    }
}

fn empty_object_schema() -> Value {
    json!({ "type": "object" })
}

fn default_addable() -> bool {
    true
}

/// A block type as declared by the schema author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDeclaration {
    pub name: String,
    /// JSON Schema for the block's config object.
    #[serde(default = "empty_object_schema")]
    pub config_schema: Value,
    #[serde(default)]
    pub slots: Vec<SlotDeclaration>,
    /// Whether editing tools may offer this block for insertion.
    #[serde(default = "default_addable")]
    pub addable: bool,
}

impl BlockDeclaration {
    /// Declares a block with an unconstrained object config and no slots.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config_schema: empty_object_schema(),
            slots: Vec::new(),
            addable: true,
        }
    }

    /// Sets the config JSON Schema.
    #[must_use]
    pub fn config_schema(mut self, schema: Value) -> Self {
        self.config_schema = schema;
        self
    }

    /// Appends a slot.
    #[must_use]
    pub fn slot(mut self, slot: SlotDeclaration) -> Self {
        self.slots.push(slot);
        self
    }

    /// Sets whether the block may be offered for insertion.
    #[must_use]
    pub fn addable(mut self, addable: bool) -> Self {
        self.addable = addable;
        self
    }
}

/// Schema-wide options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaOptions {
    /// Reference mode injected into every slot.
    #[serde(default)]
    pub slot_reference_mode: SlotReferenceMode,
}

impl SchemaOptions {
    /// Options with the given slot reference mode.
    #[must_use]
    pub fn with_reference_mode(mode: SlotReferenceMode) -> Self {
        Self {
            slot_reference_mode: mode,
        }
    }
}

/// Everything needed to build a schema; the on-disk schema file format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub options: SchemaOptions,
    #[serde(default)]
    pub blocks: Vec<BlockDeclaration>,
}
