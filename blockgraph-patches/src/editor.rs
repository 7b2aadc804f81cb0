//! Editor actions composed from the four primitives.
//!
//! Each helper reads the current document, checks its preconditions, and
//! returns a patch; nothing is applied. Multiple slots are written with
//! `reorderSlot`. A single-valued slot is written by re-adding its parent
//! with the slot set or cleared, so its value never becomes a list.

use crate::apply::apply_op;
use crate::error::{PatchError, PatchResult};
use crate::op::{Patch, PatchOp};
use blockgraph_schema::{Schema, SlotDefinition};
use blockgraph_types::{Config, ContentNode, Document, IdGenerator, RandomIds, SlotValue};
use tracing::debug;

/// A patch that creates a node, plus the id it was given.
#[derive(Debug, Clone, PartialEq)]
pub struct AddedNode {
    pub id: String,
    pub patch: Patch,
}

/// Creates a `block_type` node with its default config and inserts it into
/// `parent_id.slot_name` at `position` (appended when `None`, clamped to the
/// slot length).
pub fn create_add_to_slot_patch(
    document: &Document,
    schema: &Schema,
    parent_id: &str,
    slot_name: &str,
    block_type: &str,
    position: Option<usize>,
) -> PatchResult<AddedNode> {
    create_add_to_slot_patch_with(
        document,
        schema,
        parent_id,
        slot_name,
        block_type,
        position,
        &mut RandomIds,
    )
}

/// [`create_add_to_slot_patch`] with an explicit id generator.
pub fn create_add_to_slot_patch_with(
    document: &Document,
    schema: &Schema,
    parent_id: &str,
    slot_name: &str,
    block_type: &str,
    position: Option<usize>,
    ids: &mut impl IdGenerator,
) -> PatchResult<AddedNode> {
    let parent = document
        .node(parent_id)
        .ok_or_else(|| PatchError::ParentNotFound(parent_id.to_string()))?;
    if !schema.contains(block_type) {
        return Err(PatchError::UnknownBlockType(block_type.to_string()));
    }
    let slot = declared_slot(schema, parent, slot_name)?;
    ensure_permitted(slot, block_type)?;

    let id = ids.next_id();
    let node = ContentNode {
        id: id.clone(),
        block: block_type.to_string(),
        config: schema.default_config(block_type),
        slots: Default::default(),
    };

    let mut order = parent.slot_ids(slot_name);
    let index = position.unwrap_or(order.len()).min(order.len());
    order.insert(index, id.clone());
    let placement = write_slot(document, parent_id, slot, order)?;

    debug!(parent = parent_id, slot = slot_name, block = block_type, id = %id, "Built add-to-slot patch");
    Ok(AddedNode {
        id: id.clone(),
        patch: Patch::Batch(vec![PatchOp::AddNode { id, node }, placement]),
    })
}

/// Removes a node and every reference to it.
pub fn create_remove_patch(document: &Document, node_id: &str) -> PatchResult<Patch> {
    if !document.contains(node_id) {
        return Err(PatchError::NodeNotFound(node_id.to_string()));
    }
    Ok(PatchOp::RemoveNode {
        id: node_id.to_string(),
    }
    .into())
}

/// Sets `parent_id.slot_name` to `order`, verbatim.
pub fn create_reorder_patch(
    document: &Document,
    parent_id: &str,
    slot_name: &str,
    order: &[String],
) -> PatchResult<Patch> {
    if !document.contains(parent_id) {
        return Err(PatchError::ParentNotFound(parent_id.to_string()));
    }
    Ok(PatchOp::ReorderSlot {
        id: parent_id.to_string(),
        slot_name: slot_name.to_string(),
        order: order.to_vec(),
    }
    .into())
}

/// Moves `node_id` from one slot to `to_index` of another (or the same) slot.
///
/// Within one slot the node is taken out and reinserted at `to_index`,
/// giving a single op. Across slots the source is written first, then the
/// destination. Indexes are clamped.
#[allow(clippy::too_many_arguments)]
pub fn create_move_to_slot_patch(
    document: &Document,
    schema: &Schema,
    node_id: &str,
    from_parent_id: &str,
    from_slot_name: &str,
    to_parent_id: &str,
    to_slot_name: &str,
    to_index: usize,
) -> PatchResult<Patch> {
    let node = document
        .node(node_id)
        .ok_or_else(|| PatchError::NodeNotFound(node_id.to_string()))?;
    let from_parent = document
        .node(from_parent_id)
        .ok_or_else(|| PatchError::ParentNotFound(from_parent_id.to_string()))?;
    let to_parent = document
        .node(to_parent_id)
        .ok_or_else(|| PatchError::ParentNotFound(to_parent_id.to_string()))?;
    let from_slot = declared_slot(schema, from_parent, from_slot_name)?;
    let to_slot = declared_slot(schema, to_parent, to_slot_name)?;
    ensure_permitted(to_slot, &node.block)?;

    let mut source = from_parent.slot_ids(from_slot_name);
    source.retain(|id| id != node_id);

    if from_parent_id == to_parent_id && from_slot_name == to_slot_name {
        let index = to_index.min(source.len());
        source.insert(index, node_id.to_string());
        return Ok(write_slot(document, to_parent_id, to_slot, source)?.into());
    }

    let detach = write_slot(document, from_parent_id, from_slot, source)?;
    // Source and destination may share a parent.
    let mut staged = document.clone();
    apply_op(&mut staged, &detach)?;
    let mut destination = staged
        .node(to_parent_id)
        .map(|parent| parent.slot_ids(to_slot_name))
        .unwrap_or_default();
    let index = to_index.min(destination.len());
    destination.insert(index, node_id.to_string());
    let attach = write_slot(&staged, to_parent_id, to_slot, destination)?;

    Ok(Patch::Batch(vec![detach, attach]))
}

/// Replaces a node's config.
pub fn create_update_config_patch(
    document: &Document,
    node_id: &str,
    config: Config,
) -> PatchResult<Patch> {
    if !document.contains(node_id) {
        return Err(PatchError::NodeNotFound(node_id.to_string()));
    }
    Ok(PatchOp::UpdateConfig {
        id: node_id.to_string(),
        config,
    }
    .into())
}

fn declared_slot<'s>(
    schema: &'s Schema,
    parent: &ContentNode,
    slot_name: &str,
) -> PatchResult<&'s SlotDefinition> {
    let block = schema
        .get(&parent.block)
        .ok_or_else(|| PatchError::UnknownBlockType(parent.block.clone()))?;
    block.slot(slot_name).ok_or_else(|| PatchError::UnknownSlot {
        block: parent.block.clone(),
        slot: slot_name.to_string(),
    })
}

fn ensure_permitted(slot: &SlotDefinition, block_type: &str) -> PatchResult<()> {
    if slot.membership.permits(block_type) {
        Ok(())
    } else {
        Err(PatchError::BlockNotAllowed {
            block: block_type.to_string(),
            slot: slot.name.clone(),
        })
    }
}

/// The op that sets `parent_id.slot` to `order`.
fn write_slot(
    document: &Document,
    parent_id: &str,
    slot: &SlotDefinition,
    order: Vec<String>,
) -> PatchResult<PatchOp> {
    if slot.multiple {
        return Ok(PatchOp::ReorderSlot {
            id: parent_id.to_string(),
            slot_name: slot.name.clone(),
            order,
        });
    }

    let mut parent = document
        .node(parent_id)
        .ok_or_else(|| PatchError::ParentNotFound(parent_id.to_string()))?
        .clone();
    match order.as_slice() {
        [] => {
            parent.slots.remove(&slot.name);
        }
        [child] => {
            parent
                .slots
                .insert(slot.name.clone(), SlotValue::Id(child.clone()));
        }
        _ => {
            return Err(PatchError::SlotOccupied {
                node: parent_id.to_string(),
                slot: slot.name.clone(),
            });
        }
    }
    Ok(PatchOp::AddNode {
        id: parent_id.to_string(),
        node: parent,
    })
}
