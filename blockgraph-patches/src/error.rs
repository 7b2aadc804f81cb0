use thiserror::Error;

/// Result type for patch operations.
pub type PatchResult<T> = Result<T, PatchError>;

/// Errors from strict application and editor helpers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Parent node not found: {0}")]
    ParentNotFound(String),

    #[error("Unknown block type: {0}")]
    UnknownBlockType(String),

    #[error("Unknown slot \"{slot}\" for block type \"{block}\"")]
    UnknownSlot { block: String, slot: String },

    #[error("Block type \"{block}\" is not allowed in slot \"{slot}\"")]
    BlockNotAllowed { block: String, slot: String },

    /// A single-valued slot would end up holding more than one id.
    #[error("Slot \"{slot}\" of node \"{node}\" already holds a child")]
    SlotOccupied { node: String, slot: String },
}
