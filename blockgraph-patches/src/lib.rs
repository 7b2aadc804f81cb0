//! Patch engine for canonical documents.
//!
//! Four primitives ([`PatchOp`]) cover every edit: add a node, remove a node
//! (scrubbing references to it), replace a node's config, and set a slot's
//! order. [`apply_patch`] is pure: the input document is never touched and
//! nodes an op leaves alone are shared with the result.
//!
//! The `create_*` helpers compose primitives into editor actions. Unlike the
//! primitives they consult the schema and fail on missing nodes.

mod apply;
mod editor;
mod error;
mod op;

pub use apply::{apply_patch, apply_patch_strict};
pub use editor::{
    AddedNode, create_add_to_slot_patch, create_add_to_slot_patch_with, create_move_to_slot_patch,
    create_remove_patch, create_reorder_patch, create_update_config_patch,
};
pub use error::{PatchError, PatchResult};
pub use op::{Patch, PatchOp};
