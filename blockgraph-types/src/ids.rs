//! Node id generation.
//!
//! Node ids are plain strings chosen by whoever authors a document
//! (`"root"`, `"hero-1"`). Only nodes created by the engine itself (inline
//! nodes lifted by normalization, blocks added through editor helpers) get a
//! generated id, and those use UUID v7 so they sort by creation time.

use uuid::Uuid;

/// Generates a fresh node id: a UUID v7 in its 32-character simple form.
#[must_use]
pub fn generate_node_id() -> String {
    Uuid::now_v7().simple().to_string()
}

/// Source of fresh node ids.
///
/// Implemented for any `FnMut() -> String`, so tests can pass a closure.
pub trait IdGenerator {
    /// Returns an id that the caller will use for a newly created node.
    fn next_id(&mut self) -> String;
}

impl<F> IdGenerator for F
where
    F: FnMut() -> String,
{
    fn next_id(&mut self) -> String {
        (*self)()
    }
}

/// Default generator backed by [`generate_node_id`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> String {
        generate_node_id()
    }
}

/// Deterministic generator producing `<prefix>1`, `<prefix>2`, ...
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    /// Creates a generator whose first id is `<prefix>1`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}
