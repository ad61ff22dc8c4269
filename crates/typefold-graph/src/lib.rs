//! Type graph for typefold.
//!
//! A [`TypeGraph`] is an immutable arena of type nodes addressed by
//! [`TypeRef`](typefold_types::TypeRef). Graphs are built with a
//! [`TypeBuilder`] and transformed with [`TypeGraph::rewrite`], which
//! replaces groups of nodes by one new node each and returns a new graph
//! generation. The input graph is never modified.
//!
//! # Key Types
//!
//! - [`TypeGraph`] / [`TypeNode`] -- The arena and its nodes
//! - [`TypeBuilder`] -- Node construction, including forwarding slots for recursive types
//! - [`Rewriter`] -- Handle passed to rewrite constructors

pub mod builder;
pub mod error;
pub mod graph;
pub mod rewrite;

pub use builder::TypeBuilder;
pub use error::{GraphError, GraphResult};
pub use graph::{TypeGraph, TypeNode};
pub use rewrite::Rewriter;
