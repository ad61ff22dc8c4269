//! Policy for reconstituting transformed string formats.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::kind::StringFormat;

/// What happens to one string format when a node is copied into a new
/// graph generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormatMapping {
    /// The format survives.
    Keep,
    /// The format is lowered to a plain string.
    AsString,
}

/// Per-format reconstitution policy.
///
/// Formats missing from the map are kept.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringTypeMapping {
    overrides: BTreeMap<StringFormat, FormatMapping>,
}

impl StringTypeMapping {
    /// Keep every format.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lower every format to a plain string.
    pub fn all_plain() -> Self {
        let overrides = StringFormat::ALL
            .iter()
            .map(|f| (*f, FormatMapping::AsString))
            .collect();
        Self { overrides }
    }

    /// Override the mapping for a single format.
    pub fn with(mut self, format: StringFormat, mapping: FormatMapping) -> Self {
        self.overrides.insert(format, mapping);
        self
    }

    /// The mapping that applies to `format`.
    pub fn mapping_for(&self, format: StringFormat) -> FormatMapping {
        self.overrides
            .get(&format)
            .copied()
            .unwrap_or(FormatMapping::Keep)
    }

    /// Returns `true` if `format` is lowered to a plain string.
    pub fn lowers(&self, format: StringFormat) -> bool {
        self.mapping_for(format) == FormatMapping::AsString
    }
}
