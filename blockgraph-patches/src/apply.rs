//! Patch application.

use crate::error::{PatchError, PatchResult};
use crate::op::{Patch, PatchOp};
use blockgraph_types::{ContentNode, Document, SlotValue};
use std::sync::Arc;
use tracing::debug;

/// Applies `patch` to `document` and returns the new document.
///
/// Ops run in order, each on the result of the previous one. `updateConfig`
/// and `reorderSlot` on a missing node are skipped. No schema or referential
/// checks are made.
pub fn apply_patch(document: &Document, patch: &Patch) -> Document {
    let mut result = document.clone();
    for op in patch.ops() {
        if let Err(e) = apply_op(&mut result, op) {
            debug!("Skipping {} op on {}: {}", op.kind(), op.target(), e);
        }
    }
    debug!("Applied patch of {} op(s)", patch.len());
    result
}

/// Like [`apply_patch`], but fails on the first op that targets a missing node.
pub fn apply_patch_strict(document: &Document, patch: &Patch) -> PatchResult<Document> {
    let mut result = document.clone();
    for op in patch.ops() {
        apply_op(&mut result, op)?;
    }
    debug!("Applied patch of {} op(s) (strict)", patch.len());
    Ok(result)
}

/// Applies a single op in place on a working copy.
///
/// Replaced nodes get a fresh `Arc`; untouched nodes keep theirs.
pub(crate) fn apply_op(document: &mut Document, op: &PatchOp) -> PatchResult<()> {
    match op {
        PatchOp::AddNode { id, node } => {
            document.nodes.insert(id.clone(), Arc::new(node.clone()));
        }
        PatchOp::RemoveNode { id } => remove_node(document, id),
        PatchOp::UpdateConfig { id, config } => {
            let node = existing(document, id)?;
            let updated = ContentNode {
                config: config.clone(),
                ..node.clone()
            };
            document.nodes.insert(id.clone(), Arc::new(updated));
        }
        PatchOp::ReorderSlot {
            id,
            slot_name,
            order,
        } => {
            let mut updated = existing(document, id)?.clone();
            updated
                .slots
                .insert(slot_name.clone(), SlotValue::Ids(order.clone()));
            document.nodes.insert(id.clone(), Arc::new(updated));
        }
    }
    Ok(())
}

fn existing<'d>(document: &'d Document, id: &str) -> PatchResult<&'d ContentNode> {
    document
        .node(id)
        .ok_or_else(|| PatchError::NodeNotFound(id.to_string()))
}

fn remove_node(document: &mut Document, id: &str) {
    document.nodes.remove(id);
    for node in document.nodes.values_mut() {
        if let Some(scrubbed) = scrub_references(node, id) {
            *node = Arc::new(scrubbed);
        }
    }
}

/// Returns a copy of `node` without any reference to `id`, or `None` when the
/// node does not reference it. Single-valued slots holding `id` are dropped.
fn scrub_references(node: &ContentNode, id: &str) -> Option<ContentNode> {
    if !node.references(id) {
        return None;
    }
    let mut scrubbed = node.clone();
    scrubbed.slots.retain(|_, value| match value {
        SlotValue::Id(child) => child != id,
        SlotValue::Ids(_) => true,
    });
    for value in scrubbed.slots.values_mut() {
        if let SlotValue::Ids(children) = value {
            children.retain(|child| child != id);
        }
    }
    Some(scrubbed)
}
