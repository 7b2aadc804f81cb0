use crate::context::{PageContext, apply_context_overrides};
use blockgraph_content::parse_content_json;
use blockgraph_schema::Schema;
use blockgraph_types::{Config, ContentNode, Document};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

/// A node of the resolved tree.
///
/// Resolution, [`ResolvedNode::size`] and dropping are iterative.
/// Serialization and comparison still recurse once per level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedNode {
    pub id: String,
    pub block: String,
    pub config: Config,
    /// Children per declared slot. Every declared slot is present, even
    /// when empty.
    pub slots: BTreeMap<String, Vec<ResolvedNode>>,
}

impl ResolvedNode {
    /// Children of a slot; empty when the slot is not declared.
    #[must_use]
    pub fn children(&self, slot: &str) -> &[ResolvedNode] {
        self.slots.get(slot).map(Vec::as_slice).unwrap_or_default()
    }

    /// Total number of nodes in this subtree.
    #[must_use]
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.slots.values().flatten());
        }
        count
    }
}

// Tears deep trees down iteratively instead of through nested drops.
impl Drop for ResolvedNode {
    fn drop(&mut self) {
        let mut pending: Vec<ResolvedNode> = Vec::new();
        for children in self.slots.values_mut() {
            pending.append(children);
        }
        while let Some(mut node) = pending.pop() {
            for children in node.slots.values_mut() {
                pending.append(children);
            }
        }
    }
}

/// Resolves `document` starting at its entry node.
///
/// Returns `None` when the entry node is missing. Only slots declared by a
/// node's block type are followed; a node of an unknown block type resolves
/// with no slots. Dangling ids and ids already on the current path are
/// skipped.
pub fn resolve(schema: &Schema, document: &Document) -> Option<ResolvedNode> {
    Resolver {
        schema,
        document,
        context: None,
    }
    .entry()
}

/// Parses `raw` and resolves it. `None` if the text is not a document.
pub fn resolve_json(schema: &Schema, raw: &str) -> Option<ResolvedNode> {
    match parse_content_json(raw) {
        Ok(document) => resolve(schema, &document),
        Err(e) => {
            debug!("Cannot resolve unparsable content: {}", e);
            None
        }
    }
}

/// Resolves `document` with context overrides applied.
///
/// Each node's config is replaced by its effective config, and nodes whose
/// overrides make them invisible are left out together with their subtree.
/// Returns `None` if the entry node itself is hidden.
pub fn resolve_with_context(
    schema: &Schema,
    document: &Document,
    context: &PageContext,
) -> Option<ResolvedNode> {
    Resolver {
        schema,
        document,
        context: Some(context),
    }
    .entry()
}

struct Resolver<'a> {
    schema: &'a Schema,
    document: &'a Document,
    context: Option<&'a PageContext>,
}

/// A node whose children are still being resolved.
struct Frame<'a> {
    node: &'a ContentNode,
    /// Slot of the parent frame this node is attached to.
    parent_slot: Option<&'a str>,
    config: Config,
    slots: BTreeMap<String, Vec<ResolvedNode>>,
    pending: std::vec::IntoIter<(&'a str, &'a str)>,
}

impl Frame<'_> {
    fn finish(&mut self) -> ResolvedNode {
        ResolvedNode {
            id: self.node.id.clone(),
            block: self.node.block.clone(),
            config: std::mem::take(&mut self.config),
            slots: std::mem::take(&mut self.slots),
        }
    }
}

impl<'a> Resolver<'a> {
    /// Depth-first walk over an explicit stack of frames, so document depth
    /// is bounded by memory rather than the thread stack.
    fn entry(&self) -> Option<ResolvedNode> {
        let document = self.document;
        let Some(root) = document.entry() else {
            debug!("Entry node {} not found", document.entry_id);
            return None;
        };

        let mut stack = vec![self.enter(root, None)?];
        let mut on_path: HashSet<&str> = HashSet::from([root.id.as_str()]);
        loop {
            let next = stack.last_mut()?.pending.next();
            match next {
                Some((slot, id)) => {
                    if on_path.contains(id) {
                        let parent = stack.last().map_or("", |frame| frame.node.id.as_str());
                        warn!("Skipping cyclic reference to {} in {}.{}", id, parent, slot);
                        continue;
                    }
                    let Some(child) = document.node(id) else {
                        continue;
                    };
                    if let Some(frame) = self.enter(child, Some(slot)) {
                        on_path.insert(&child.id);
                        stack.push(frame);
                    }
                }
                None => {
                    let mut frame = stack.pop()?;
                    on_path.remove(frame.node.id.as_str());
                    let resolved = frame.finish();
                    let (Some(parent), Some(slot)) = (stack.last_mut(), frame.parent_slot) else {
                        return Some(resolved);
                    };
                    if let Some(children) = parent.slots.get_mut(slot) {
                        children.push(resolved);
                    }
                }
            }
        }
    }

    /// Starts a frame for `node`, or `None` when the context hides it.
    fn enter(&self, node: &'a ContentNode, parent_slot: Option<&'a str>) -> Option<Frame<'a>> {
        let config = match self.context {
            Some(context) => {
                let effective = apply_context_overrides(&node.config, context);
                if !effective.visible {
                    debug!("Node {} hidden by context", node.id);
                    return None;
                }
                effective.config
            }
            None => node.config.clone(),
        };

        let mut slots = BTreeMap::new();
        let mut pending = Vec::new();
        if let Some(block_type) = self.schema.get(&node.block) {
            for slot in &block_type.slots {
                slots.insert(slot.name.clone(), Vec::new());
                if let Some(value) = node.slot(&slot.name) {
                    pending.extend(value.ids().map(|id| (slot.name.as_str(), id)));
                }
            }
        }

        Some(Frame {
            node,
            parent_slot,
            config,
            slots,
            pending: pending.into_iter(),
        })
    }
}
