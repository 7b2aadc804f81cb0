use crate::definition::{
    BlockDeclaration, SchemaDefinition, SchemaOptions, SlotDeclaration, SlotLayoutHint,
    SlotReferenceMode,
};
use crate::SchemaResult;
use blockgraph_types::Config;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Which block types may occupy a slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SlotMembership {
    /// Any registered block type.
    #[default]
    Any,
    /// Only the listed block types.
    Include(Vec<String>),
    /// Every block type except the listed ones.
    Exclude(Vec<String>),
}

impl SlotMembership {
    /// Returns true if `block` may occupy the slot.
    #[must_use]
    pub fn permits(&self, block: &str) -> bool {
        match self {
            SlotMembership::Any => true,
            SlotMembership::Include(names) => names.iter().any(|n| n == block),
            SlotMembership::Exclude(names) => !names.iter().any(|n| n == block),
        }
    }
}

/// A slot as seen by the engine: declaration plus the schema's reference mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotDefinition {
    pub name: String,
    pub multiple: bool,
    pub reference_mode: SlotReferenceMode,
    pub layout: Option<SlotLayoutHint>,
    pub membership: SlotMembership,
}

impl SlotDefinition {
    fn from_declaration(slot: SlotDeclaration, reference_mode: SlotReferenceMode) -> Self {
        // Include wins when both lists are given.
        let membership = match (slot.include_block_names, slot.exclude_block_names) {
            (Some(include), _) => SlotMembership::Include(include),
            (None, Some(exclude)) => SlotMembership::Exclude(exclude),
            (None, None) => SlotMembership::Any,
        };
        Self {
            name: slot.name,
            multiple: slot.multiple,
            reference_mode,
            layout: slot.layout,
            membership,
        }
    }

    /// The include list, if the slot has one.
    #[must_use]
    pub fn include_block_names(&self) -> Option<&[String]> {
        match &self.membership {
            SlotMembership::Include(names) => Some(names),
            _ => None,
        }
    }

    /// The exclude list, if the slot has one.
    #[must_use]
    pub fn exclude_block_names(&self) -> Option<&[String]> {
        match &self.membership {
            SlotMembership::Exclude(names) => Some(names),
            _ => None,
        }
    }
}

pub(crate) type CompiledConfig = Result<jsonschema::Validator, String>;

/// A registered block type. Immutable once the schema is built.
pub struct BlockTypeDefinition {
    pub name: String,
    pub config_schema: Value,
    pub slots: Vec<SlotDefinition>,
    pub addable: bool,
    compiled: OnceLock<CompiledConfig>,
}

impl BlockTypeDefinition {
    fn from_declaration(block: BlockDeclaration, reference_mode: SlotReferenceMode) -> Self {
        Self {
            name: block.name,
            config_schema: block.config_schema,
            slots: block
                .slots
                .into_iter()
                .map(|slot| SlotDefinition::from_declaration(slot, reference_mode))
                .collect(),
            addable: block.addable,
            compiled: OnceLock::new(),
        }
    }

    /// Looks up a slot by name.
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<&SlotDefinition> {
        self.slots.iter().find(|slot| slot.name == name)
    }

    /// Returns true if the block declares a slot called `name`.
    #[must_use]
    pub fn has_slot(&self, name: &str) -> bool {
        self.slot(name).is_some()
    }

    /// Default config for a new node of this type.
    ///
    /// Reads `default` (falling back to `defaultValue`) from every entry of
    /// `configSchema.properties`; properties without either are omitted.
    #[must_use]
    pub fn default_config(&self) -> Config {
        let mut config = Config::new();
        let Some(properties) = self
            .config_schema
            .get("properties")
            .and_then(Value::as_object)
        else {
            return config;
        };
        for (key, property) in properties {
            let value = property
                .get("default")
                .or_else(|| property.get("defaultValue"));
            if let Some(value) = value {
                config.insert(key.clone(), value.clone());
            }
        }
        config
    }

    /// The compiled config validator, compiled on first use. `format`
    /// keywords are asserted, not just annotated.
    pub(crate) fn compiled_config(&self) -> &CompiledConfig {
        self.compiled.get_or_init(|| {
            debug!(block = %self.name, "Compiling config schema");
            jsonschema::options()
                .should_validate_formats(true)
                .build(&self.config_schema)
                .map_err(|e| e.to_string())
        })
    }
}

impl Clone for BlockTypeDefinition {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            config_schema: self.config_schema.clone(),
            slots: self.slots.clone(),
            addable: self.addable,
            compiled: OnceLock::new(),
        }
    }
}

impl fmt::Debug for BlockTypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockTypeDefinition")
            .field("name", &self.name)
            .field("config_schema", &self.config_schema)
            .field("slots", &self.slots)
            .field("addable", &self.addable)
            .finish()
    }
}

/// Handed to [`SchemaPlugin::register`] while a schema is being built.
pub struct PluginContext<'a> {
    options: &'a SchemaOptions,
    version: Option<&'a str>,
    registered: Vec<BlockDeclaration>,
}

impl PluginContext<'_> {
    /// Registers an additional block type.
    pub fn register_block(&mut self, block: BlockDeclaration) {
        self.registered.push(block);
    }

    /// The options the schema is being built with.
    #[must_use]
    pub fn options(&self) -> &SchemaOptions {
        self.options
    }

    /// The schema version, if one was set.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version
    }
}

/// Extends a schema while it is built, typically by registering blocks.
pub trait SchemaPlugin {
    /// Called once per build, after the explicitly declared blocks are collected.
    fn register(&self, context: &mut PluginContext<'_>);
}

impl<F> SchemaPlugin for F
where
    F: Fn(&mut PluginContext<'_>),
{
    fn register(&self, context: &mut PluginContext<'_>) {
        self(context)
    }
}

/// Accumulates declarations and builds an immutable [`Schema`].
#[derive(Default)]
pub struct SchemaBuilder {
    blocks: Vec<BlockDeclaration>,
    options: SchemaOptions,
    version: Option<String>,
    plugins: Vec<Box<dyn SchemaPlugin>>,
}

impl SchemaBuilder {
    /// Creates an empty builder with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a block declaration. A later declaration with the same name wins.
    #[must_use]
    pub fn block(mut self, block: BlockDeclaration) -> Self {
        self.blocks.push(block);
        self
    }

    /// Adds several block declarations.
    #[must_use]
    pub fn blocks(mut self, blocks: impl IntoIterator<Item = BlockDeclaration>) -> Self {
        self.blocks.extend(blocks);
        self
    }

    /// Replaces the schema options.
    #[must_use]
    pub fn options(mut self, options: SchemaOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the reference mode applied to every slot.
    #[must_use]
    pub fn reference_mode(mut self, mode: SlotReferenceMode) -> Self {
        self.options.slot_reference_mode = mode;
        self
    }

    /// Sets the schema version.
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Adds a plugin, run at build time in insertion order.
    #[must_use]
    pub fn plugin(mut self, plugin: impl SchemaPlugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Builds the schema.
    #[must_use]
    pub fn build(self) -> Schema {
        let mut declarations = self.blocks;
        let mut context = PluginContext {
            options: &self.options,
            version: self.version.as_deref(),
            registered: Vec::new(),
        };
        for plugin in &self.plugins {
            plugin.register(&mut context);
        }
        declarations.extend(context.registered);

        let mode = self.options.slot_reference_mode;
        let mut blocks: Vec<Arc<BlockTypeDefinition>> = Vec::with_capacity(declarations.len());
        let mut index: HashMap<String, usize> = HashMap::with_capacity(declarations.len());
        for declaration in declarations {
            let definition = Arc::new(BlockTypeDefinition::from_declaration(declaration, mode));
            let existing = index.get(&definition.name).copied();
            match existing {
                Some(position) => {
                    debug!(block = %definition.name, "Block type re-registered, last declaration wins");
                    blocks[position] = definition;
                }
                None => {
                    index.insert(definition.name.clone(), blocks.len());
                    blocks.push(definition);
                }
            }
        }

        let names: Vec<&str> = blocks.iter().map(|b| b.name.as_str()).collect();
        let content_schema = build_content_schema(&names);

        Schema {
            blocks,
            index,
            options: self.options,
            version: self.version,
            content_schema,
        }
    }
}

/// JSON Schema describing the document envelope for the given block names.
fn build_content_schema(block_names: &[&str]) -> Value {
    let block = if block_names.is_empty() {
        json!({ "type": "string" })
    } else {
        json!({ "type": "string", "enum": block_names })
    };
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "type": "object",
        "required": ["entryId", "nodes"],
        "properties": {
            "entryId": { "type": "string" },
            "nodes": {
                "type": "object",
                "additionalProperties": { "$ref": "#/definitions/ContentNode" }
            }
        },
        "definitions": {
            "ContentNode": {
                "type": "object",
                "required": ["id", "block", "config"],
                "properties": {
                    "id": { "type": "string" },
                    "block": block,
                    "config": { "type": "object" }
                },
                "additionalProperties": true
            }
        }
    })
}

/// An immutable registry of block types.
#[derive(Debug, Clone)]
pub struct Schema {
    blocks: Vec<Arc<BlockTypeDefinition>>,
    index: HashMap<String, usize>,
    options: SchemaOptions,
    version: Option<String>,
    content_schema: Value,
}

/// Builds a schema from declarations and options.
#[must_use]
pub fn create_schema(blocks: Vec<BlockDeclaration>, options: SchemaOptions) -> Schema {
    SchemaBuilder::new().blocks(blocks).options(options).build()
}

impl Schema {
    /// Starts a new [`SchemaBuilder`].
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Builds a schema from a parsed definition.
    #[must_use]
    pub fn from_definition(definition: SchemaDefinition) -> Self {
        let mut builder = SchemaBuilder::new()
            .blocks(definition.blocks)
            .options(definition.options);
        if let Some(version) = definition.version {
            builder = builder.version(version);
        }
        builder.build()
    }

    /// Parses a JSON schema definition and builds the schema.
    pub fn from_json(raw: &str) -> SchemaResult<Self> {
        let definition: SchemaDefinition = serde_json::from_str(raw)?;
        Ok(Self::from_definition(definition))
    }

    /// Looks up a block type by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BlockTypeDefinition> {
        self.index.get(name).map(|&i| self.blocks[i].as_ref())
    }

    /// Returns true if a block type called `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All registered block names, in registration order.
    #[must_use]
    pub fn block_names(&self) -> Vec<&str> {
        self.blocks.iter().map(|b| b.name.as_str()).collect()
    }

    /// Iterates every block type in registration order.
    pub fn block_types(&self) -> impl Iterator<Item = &BlockTypeDefinition> {
        self.blocks.iter().map(Arc::as_ref)
    }

    /// Number of registered block types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true if no block types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The options the schema was built with.
    #[must_use]
    pub fn options(&self) -> &SchemaOptions {
        &self.options
    }

    /// The reference mode shared by every slot.
    #[must_use]
    pub fn reference_mode(&self) -> SlotReferenceMode {
        self.options.slot_reference_mode
    }

    /// Schema version metadata.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// JSON Schema for the document envelope (`entryId` + `nodes`).
    #[must_use]
    pub fn content_schema(&self) -> &Value {
        &self.content_schema
    }

    /// Default config for a new block of type `name`; empty for unknown types.
    #[must_use]
    pub fn default_config(&self, name: &str) -> Config {
        self.get(name)
            .map(BlockTypeDefinition::default_config)
            .unwrap_or_default()
    }

    /// Block names that editing tools may offer for insertion.
    #[must_use]
    pub fn addable_block_types(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter(|b| b.addable)
            .map(|b| b.name.as_str())
            .collect()
    }

    /// Registered block names permitted in `slot`, in registration order.
    #[must_use]
    pub fn slot_allowed_block_types(&self, slot: &SlotDefinition) -> Vec<&str> {
        self.blocks
            .iter()
            .map(|b| b.name.as_str())
            .filter(|name| slot.membership.permits(name))
            .collect()
    }
}
