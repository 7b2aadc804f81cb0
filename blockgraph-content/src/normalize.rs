//! Flattening of inline child nodes into canonical form.

use crate::input::{DocumentInput, NodeInput, SlotInput, SlotItem};
use blockgraph_schema::{Schema, SlotDefinition, SlotReferenceMode};
use blockgraph_types::{ContentNode, Document, IdGenerator, RandomIds, SlotValue};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Normalizes `input` using random ids for lifted inline nodes.
pub fn normalize_content(schema: &Schema, input: &DocumentInput) -> Document {
    normalize_content_with(schema, input, &mut RandomIds)
}

/// Normalizes `input`, drawing one id from `ids` per lifted inline node.
///
/// Each node keeps its map key as its id. Slots of registered blocks are
/// rewritten: id-mode slots pass through, other slots have inline nodes
/// lifted into the node map and replaced by their new id, and multiple slots
/// always come out as lists. Undeclared slots are dropped. Nodes of unknown
/// block types keep only their id and id-list slots. Never fails; anything
/// malformed is left for [`crate::validate_content`] to report.
pub fn normalize_content_with(
    schema: &Schema,
    input: &DocumentInput,
    ids: &mut impl IdGenerator,
) -> Document {
    let mut nodes: BTreeMap<String, Arc<ContentNode>> = BTreeMap::new();
    for (key, node) in &input.nodes {
        let mut normalizer = Normalizer {
            schema,
            ids: &mut *ids,
            lifted: Vec::new(),
        };
        let normalized = normalizer.node(key, node);
        nodes.insert(key.clone(), Arc::new(normalized));
        for lifted in normalizer.lifted {
            nodes.insert(lifted.id.clone(), Arc::new(lifted));
        }
    }

    debug!(
        input_nodes = input.nodes.len(),
        output_nodes = nodes.len(),
        "Normalized content"
    );
    Document {
        entry_id: input.entry_id.clone(),
        nodes,
    }
}

struct Normalizer<'a, G: IdGenerator> {
    schema: &'a Schema,
    ids: &'a mut G,
    lifted: Vec<ContentNode>,
}

impl<G: IdGenerator> Normalizer<'_, G> {
    fn node(&mut self, id: &str, input: &NodeInput) -> ContentNode {
        let mut node = ContentNode::new(id, input.block.clone());
        node.config = input.config.clone();

        let schema = self.schema;
        let Some(block_type) = schema.get(&input.block) else {
            debug!(node = id, block = %input.block, "Passing through node of unknown block type");
            node.slots = input
                .slots
                .iter()
                .filter_map(|(name, value)| Some((name.clone(), references_only(value)?)))
                .collect();
            return node;
        };

        for slot in &block_type.slots {
            let Some(value) = input.slots.get(&slot.name) else {
                continue;
            };
            if let Some(normalized) = self.slot(id, slot, value) {
                node.slots.insert(slot.name.clone(), normalized);
            }
        }
        node
    }

    fn slot(&mut self, node: &str, slot: &SlotDefinition, value: &SlotInput) -> Option<SlotValue> {
        if matches!(value, SlotInput::Other(other) if other.is_null()) {
            return None;
        }

        if slot.reference_mode == SlotReferenceMode::Id {
            let passed = references_only(value);
            if passed.is_none() {
                warn!(node, slot = %slot.name, "Dropping non-id value from id-only slot");
            }
            return passed;
        }

        if slot.multiple {
            let ids = match value {
                SlotInput::List(items) => items
                    .iter()
                    .filter_map(|item| self.item(node, slot, item))
                    .collect(),
                single => self.single(node, slot, single).into_iter().collect(),
            };
            return Some(SlotValue::Ids(ids));
        }

        self.single(node, slot, value).map(SlotValue::Id)
    }

    fn single(&mut self, node: &str, slot: &SlotDefinition, value: &SlotInput) -> Option<String> {
        match value {
            SlotInput::Id(id) => Some(id.clone()),
            SlotInput::Inline(inline) => Some(self.lift(inline)),
            SlotInput::List(_) | SlotInput::Other(_) => {
                warn!(node, slot = %slot.name, "Dropping unrecognized slot value");
                None
            }
        }
    }

    fn item(&mut self, node: &str, slot: &SlotDefinition, item: &SlotItem) -> Option<String> {
        match item {
            SlotItem::Id(id) => Some(id.clone()),
            SlotItem::Inline(inline) => Some(self.lift(inline)),
            SlotItem::Other(_) => {
                warn!(node, slot = %slot.name, "Dropping unrecognized slot item");
                None
            }
        }
    }

    /// Normalizes an inline node under a fresh id and queues it for the node map.
    fn lift(&mut self, inline: &NodeInput) -> String {
        let id = self.ids.next_id();
        let node = self.node(&id, inline);
        self.lifted.push(node);
        id
    }
}

/// Keeps a slot value only if it is already an id or a list of ids.
fn references_only(value: &SlotInput) -> Option<SlotValue> {
    match value {
        SlotInput::Id(id) => Some(SlotValue::Id(id.clone())),
        SlotInput::List(items) => items
            .iter()
            .map(|item| match item {
                SlotItem::Id(id) => Some(id.clone()),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(SlotValue::Ids),
        SlotInput::Inline(_) | SlotInput::Other(_) => None,
    }
}
