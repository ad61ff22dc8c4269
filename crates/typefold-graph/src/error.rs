//! Error types for the type graph.

use typefold_types::TypeRef;

/// Errors that can occur while building, querying or rewriting a graph.
///
/// All of these indicate a broken invariant in the caller or in the graph
/// itself; none are expected during normal operation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GraphError {
    /// A referenced node does not exist in this generation.
    #[error("node not found: {0}")]
    NodeNotFound(TypeRef),

    /// A node refers to a child outside the arena.
    #[error("dangling reference: node {node} references missing node {target}")]
    DanglingReference {
        /// The node holding the bad reference.
        node: TypeRef,
        /// The missing child.
        target: TypeRef,
    },

    /// A union holds two members of the same kind.
    #[error("union {union} has more than one member of kind {kind}")]
    DuplicateUnionKind {
        /// The offending union (or the slot it was about to occupy).
        union: TypeRef,
        /// The repeated kind.
        kind: String,
    },

    /// A reserved slot was never filled.
    #[error("slot {0} was reserved but never filled")]
    UnfilledSlot(TypeRef),

    /// A slot was filled twice.
    #[error("slot {0} is already filled")]
    SlotAlreadyFilled(TypeRef),

    /// A node appears in more than one rewrite group.
    #[error("node {0} appears in more than one rewrite group")]
    DuplicateGroupMember(TypeRef),

    /// A rewrite group has no members.
    #[error("rewrite group {0} is empty")]
    EmptyGroup(usize),

    /// A rewrite constructor returned something other than its forwarding slot.
    #[error("constructor for slot {expected} returned {actual}")]
    ForwardingMismatch {
        /// The slot reserved for the group.
        expected: TypeRef,
        /// What the constructor returned.
        actual: TypeRef,
    },

    /// A top-level name was registered twice.
    #[error("duplicate root name: {0}")]
    DuplicateRoot(String),
}

/// Convenience alias for graph results.
pub type GraphResult<T> = Result<T, GraphError>;
