use blockgraph_types::{Config, ContentNode};
use serde::{Deserialize, Serialize};

/// A single edit.
///
/// Serialized with a `type` discriminator:
/// `{"type": "reorderSlot", "id": "root", "slotName": "children", "order": ["b", "a"]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PatchOp {
    /// Inserts or overwrites `nodes[id]`. Does not attach it to any slot.
    AddNode { id: String, node: ContentNode },
    /// Deletes `nodes[id]` and removes the id from every slot.
    RemoveNode { id: String },
    /// Replaces (not merges) a node's config.
    UpdateConfig { id: String, config: Config },
    /// Sets a slot to the given ids, verbatim.
    ReorderSlot {
        id: String,
        slot_name: String,
        order: Vec<String>,
    },
}

impl PatchOp {
    /// Wire name of the op, e.g. `"addNode"`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            PatchOp::AddNode { .. } => "addNode",
            PatchOp::RemoveNode { .. } => "removeNode",
            PatchOp::UpdateConfig { .. } => "updateConfig",
            PatchOp::ReorderSlot { .. } => "reorderSlot",
        }
    }

    /// The node the op targets.
    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            PatchOp::AddNode { id, .. }
            | PatchOp::RemoveNode { id }
            | PatchOp::UpdateConfig { id, .. }
            | PatchOp::ReorderSlot { id, .. } => id,
        }
    }
}

/// One op or an ordered batch. On the wire, an object or an array of objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Patch {
    Single(PatchOp),
    Batch(Vec<PatchOp>),
}

impl Patch {
    /// The ops in application order.
    #[must_use]
    pub fn ops(&self) -> &[PatchOp] {
        match self {
            Patch::Single(op) => std::slice::from_ref(op),
            Patch::Batch(ops) => ops,
        }
    }

    /// Number of ops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops().len()
    }

    /// Returns true for an empty batch.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops().is_empty()
    }
}

impl From<PatchOp> for Patch {
    fn from(op: PatchOp) -> Self {
        Patch::Single(op)
    }
}

impl From<Vec<PatchOp>> for Patch {
    fn from(ops: Vec<PatchOp>) -> Self {
        Patch::Batch(ops)
    }
}
