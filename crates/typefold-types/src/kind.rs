//! Type kinds: the discriminators used for by-category comparisons.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Primitive leaf kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrimitiveKind {
    /// Unconstrained value.
    Any,
    /// The `null` value.
    Null,
    /// Boolean.
    Bool,
    /// Whole number.
    Integer,
    /// Floating point number.
    Double,
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::Null => write!(f, "null"),
            Self::Bool => write!(f, "bool"),
            Self::Integer => write!(f, "integer"),
            Self::Double => write!(f, "double"),
        }
    }
}

/// Transformed string kinds: strings whose every sample matched a format.
///
/// These are distinct kinds from plain strings. Two fields only combine when
/// their formats are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StringFormat {
    /// Calendar date, `2024-01-31`.
    Date,
    /// Time of day, `13:45:00`.
    Time,
    /// Date and time, `2024-01-31T13:45:00Z`.
    DateTime,
    /// UUID in canonical hyphenated form.
    Uuid,
    /// Absolute URI.
    Uri,
    /// Decimal integer written as a string.
    IntegerString,
    /// `"true"` or `"false"` written as a string.
    BoolString,
}

impl StringFormat {
    /// Every format, in declaration order.
    pub const ALL: [StringFormat; 7] = [
        Self::Date,
        Self::Time,
        Self::DateTime,
        Self::Uuid,
        Self::Uri,
        Self::IntegerString,
        Self::BoolString,
    ];
}

impl fmt::Display for StringFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date => write!(f, "date"),
            Self::Time => write!(f, "time"),
            Self::DateTime => write!(f, "date-time"),
            Self::Uuid => write!(f, "uuid"),
            Self::Uri => write!(f, "uri"),
            Self::IntegerString => write!(f, "integer-string"),
            Self::BoolString => write!(f, "bool-string"),
        }
    }
}

/// Discriminator of a [`Type`](crate::Type).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TypeKind {
    Primitive(PrimitiveKind),
    /// Plain or enumerated string.
    String,
    Formatted(StringFormat),
    Array,
    Map,
    Record,
    Union,
}

impl TypeKind {
    /// Returns `true` for the plain/enumerated string kind.
    pub fn is_string(self) -> bool {
        matches!(self, Self::String)
    }

    /// Returns `true` for the `null` primitive.
    pub fn is_null(self) -> bool {
        matches!(self, Self::Primitive(PrimitiveKind::Null))
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => write!(f, "{p}"),
            Self::String => write!(f, "string"),
            Self::Formatted(format) => write!(f, "{format}"),
            Self::Array => write!(f, "array"),
            Self::Map => write!(f, "map"),
            Self::Record => write!(f, "record"),
            Self::Union => write!(f, "union"),
        }
    }
}
