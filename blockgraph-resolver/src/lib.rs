//! Materializes a canonical document into a nested tree for rendering.
//!
//! Resolution assumes the document was validated; instead of failing it
//! skips references it cannot follow. Page context can adjust configs and
//! hide nodes through overrides stored in `config.contextOverrides`.

mod context;
mod resolve;

pub use context::{
    CONTEXT_OVERRIDES_KEY, ContextCondition, ContextEffect, ContextOverride, EffectiveConfig,
    PageContext, apply_context_overrides, get_context_value, has_context_value,
    set_context_value,
};
pub use resolve::{ResolvedNode, resolve, resolve_json, resolve_with_context};
