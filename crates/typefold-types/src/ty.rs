//! The closed sum type over every inferred type shape.
//!
//! Child types are held as [`TypeRef`]s into the owning graph, so a [`Type`]
//! on its own is a single node, not a tree.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::kind::{PrimitiveKind, StringFormat, TypeKind};
use crate::type_ref::TypeRef;

/// One node of a type graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    Primitive(PrimitiveKind),
    /// Plain string, or an enumerated one when a histogram is present.
    String(StringType),
    /// String whose samples all matched a format.
    Formatted(StringFormat),
    /// Homogeneous array of the item type.
    Array(TypeRef),
    /// String-keyed map of the value type.
    Map(TypeRef),
    Record(RecordType),
    /// Alternatives, at most one per kind. A union containing the `null`
    /// primitive is how nullability is expressed.
    Union(Vec<TypeRef>),
}

impl Type {
    /// Shorthand for the `null` primitive.
    pub const fn null() -> Self {
        Self::Primitive(PrimitiveKind::Null)
    }

    /// Shorthand for an unconstrained string.
    pub fn plain_string() -> Self {
        Self::String(StringType::plain())
    }

    /// The kind discriminator of this node.
    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Primitive(p) => TypeKind::Primitive(*p),
            Self::String(_) => TypeKind::String,
            Self::Formatted(format) => TypeKind::Formatted(*format),
            Self::Array(_) => TypeKind::Array,
            Self::Map(_) => TypeKind::Map,
            Self::Record(_) => TypeKind::Record,
            Self::Union(_) => TypeKind::Union,
        }
    }

    /// The record payload, if this is a record.
    pub fn as_record(&self) -> Option<&RecordType> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// The string payload, if this is a plain or enumerated string.
    pub fn as_string(&self) -> Option<&StringType> {
        match self {
            Self::String(string) => Some(string),
            _ => None,
        }
    }

    /// All child references, in a stable order.
    pub fn children(&self) -> Vec<TypeRef> {
        match self {
            Self::Primitive(_) | Self::String(_) | Self::Formatted(_) => Vec::new(),
            Self::Array(item) | Self::Map(item) => vec![*item],
            Self::Record(record) => record.fields.values().copied().collect(),
            Self::Union(members) => members.clone(),
        }
    }

    /// A copy of this node with every child reference passed through `f`.
    pub fn map_refs(&self, mut f: impl FnMut(TypeRef) -> TypeRef) -> Type {
        match self {
            Self::Primitive(_) | Self::String(_) | Self::Formatted(_) => self.clone(),
            Self::Array(item) => Self::Array(f(*item)),
            Self::Map(value) => Self::Map(f(*value)),
            Self::Record(record) => Self::Record(RecordType {
                fields: record
                    .fields
                    .iter()
                    .map(|(name, ty)| (name.clone(), f(*ty)))
                    .collect(),
                pinned: record.pinned,
            }),
            Self::Union(members) => Self::Union(members.iter().map(|m| f(*m)).collect()),
        }
    }
}

/// A record-shaped type: the unit the combining engine merges.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordType {
    /// Field name to field type. Names are unique by construction.
    pub fields: BTreeMap<String, TypeRef>,
    /// Pinned records are never merged with anything.
    pub pinned: bool,
}

impl RecordType {
    /// An unpinned record with the given fields.
    pub fn new(fields: BTreeMap<String, TypeRef>) -> Self {
        Self {
            fields,
            pinned: false,
        }
    }

    /// A pinned record with the given fields.
    pub fn pinned(fields: BTreeMap<String, TypeRef>) -> Self {
        Self {
            fields,
            pinned: true,
        }
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The type of a field, if present.
    pub fn field(&self, name: &str) -> Option<TypeRef> {
        self.fields.get(name).copied()
    }

    /// Returns `true` if the field is present.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Field names in iteration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// A plain string, optionally constrained to observed literal values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringType {
    /// `None` means unconstrained.
    pub histogram: Option<StringHistogram>,
}

impl StringType {
    /// An unconstrained string.
    pub fn plain() -> Self {
        Self { histogram: None }
    }

    /// An enumerated string with the given histogram.
    pub fn enumerated(histogram: StringHistogram) -> Self {
        Self {
            histogram: Some(histogram),
        }
    }

    /// Returns `true` if the string carries a histogram.
    pub fn is_enumerated(&self) -> bool {
        self.histogram.is_some()
    }
}

/// Literal value to observed occurrence count.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringHistogram(BTreeMap<String, u64>);

impl StringHistogram {
    /// An empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `count` more occurrences of `value`.
    pub fn add(&mut self, value: impl Into<String>, count: u64) {
        *self.0.entry(value.into()).or_insert(0) += count;
    }

    /// Occurrences of `value` (zero if never seen).
    pub fn count(&self, value: &str) -> u64 {
        self.0.get(value).copied().unwrap_or(0)
    }

    /// Number of distinct values.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no values were observed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    /// Distinct values with their counts, in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(v, c)| (v.as_str(), *c))
    }

    /// Additively merge `other` into this histogram.
    pub fn merge(&mut self, other: &StringHistogram) {
        for (value, count) in other.iter() {
            self.add(value, count);
        }
    }

    /// Additive merge of any number of histograms.
    pub fn merge_all<'a>(histograms: impl IntoIterator<Item = &'a StringHistogram>) -> Self {
        let mut merged = Self::new();
        for h in histograms {
            merged.merge(h);
        }
        merged
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for StringHistogram {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut histogram = Self::new();
        for (value, count) in iter {
            histogram.add(value, count);
        }
        histogram
    }
}
