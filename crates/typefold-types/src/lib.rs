//! Foundation types for typefold.
//!
//! This crate provides the value types shared by the type graph and the
//! record-combining engine. Every other typefold crate depends on
//! `typefold-types`.
//!
//! # Key Types
//!
//! - [`TypeRef`] — Index of a node inside a type graph generation
//! - [`TypeKind`] — Hashable discriminator used for by-category comparisons
//! - [`Type`] — Closed sum type over every inferred type shape
//! - [`RecordType`] — The mergeable unit: a field map plus a pinned flag
//! - [`StringHistogram`] — Observed literal values of an enumerated string
//! - [`NameHints`] — Combinable bundle of naming suggestions
//! - [`StringTypeMapping`] — How transformed string formats are reconstituted

pub mod kind;
pub mod mapping;
pub mod names;
pub mod ty;
pub mod type_ref;

pub use kind::{PrimitiveKind, StringFormat, TypeKind};
pub use mapping::{FormatMapping, StringTypeMapping};
pub use names::NameHints;
pub use ty::{RecordType, StringHistogram, StringType, Type};
pub use type_ref::TypeRef;
