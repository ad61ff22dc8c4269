use std::fmt;

use serde::{Deserialize, Serialize};

/// Reference to a node in one generation of a type graph.
///
/// A `TypeRef` is only meaningful together with the graph that issued it.
/// Rewriting a graph produces a new generation with its own numbering; the
/// old refs stay valid against the old graph value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeRef(u32);

impl TypeRef {
    /// Create a reference from a raw arena index.
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// The arena index as a `usize`.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The raw `u32` value.
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({})", self.0)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for TypeRef {
    fn from(index: u32) -> Self {
        Self(index)
    }
}
