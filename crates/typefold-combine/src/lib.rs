//! Record combining for typefold.
//!
//! Finds groups of record types in a [`TypeGraph`](typefold_graph::TypeGraph)
//! that are close enough in shape to be one type, and replaces each group
//! with a single merged record. All references to group members are
//! redirected to the merged record in the returned graph; the input graph is
//! left untouched.
//!
//! # Quick Start
//!
//! ```rust
//! use std::collections::BTreeMap;
//!
//! use typefold_combine::{combine, CombineConfig};
//! use typefold_graph::TypeBuilder;
//! use typefold_types::{NameHints, PrimitiveKind};
//!
//! let mut b = TypeBuilder::new();
//! let mut fields = BTreeMap::new();
//! for name in ["id", "name", "email", "age"] {
//!     fields.insert(name.to_string(), b.new_primitive(PrimitiveKind::Integer));
//! }
//! let mut fewer = fields.clone();
//! fewer.remove("age");
//! b.new_record_type(NameHints::inferred("author"), fields, false, None).unwrap();
//! b.new_record_type(NameHints::inferred("owner"), fewer, false, None).unwrap();
//! let graph = b.finish().unwrap();
//!
//! let combined = combine(&graph, &CombineConfig::default()).unwrap();
//! assert_eq!(combined.records().len(), 1);
//! ```

pub mod clique;
pub mod combine;
pub mod config;
pub mod error;
pub mod merge;
pub mod predicate;
pub mod report;

#[cfg(test)]
mod testing;

pub use clique::build_cliques;
pub use combine::{combine, combine_with_report};
pub use config::{CombineConfig, REQUIRED_OVERLAP};
pub use error::{CombineError, CombineResult};
pub use merge::{build_merged_record, collect_field_types, merge_field, FieldTypes};
pub use predicate::Combinability;
pub use report::CombineReport;
