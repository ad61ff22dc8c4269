use serde::{Deserialize, Serialize};

use typefold_types::StringTypeMapping;

use crate::error::{CombineError, CombineResult};

/// Default share of the larger record's fields the smaller one must carry.
pub const REQUIRED_OVERLAP: f64 = 0.75;

/// Configuration for a combine pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombineConfig {
    /// Minimum field overlap, relative to the larger record, in `(0, 1]`.
    pub required_overlap: f64,
    /// How transformed string formats are reconstituted in the output graph.
    pub string_mapping: StringTypeMapping,
}

impl Default for CombineConfig {
    fn default() -> Self {
        Self {
            required_overlap: REQUIRED_OVERLAP,
            string_mapping: StringTypeMapping::default(),
        }
    }
}

impl CombineConfig {
    /// Only records with identical field-name sets are combined.
    pub fn exact() -> Self {
        Self {
            required_overlap: 1.0,
            ..Default::default()
        }
    }

    /// Use `mapping` for string formats.
    pub fn with_string_mapping(mut self, mapping: StringTypeMapping) -> Self {
        self.string_mapping = mapping;
        self
    }

    /// Reject overlaps outside `(0, 1]`.
    pub fn validate(&self) -> CombineResult<()> {
        let overlap = self.required_overlap;
        if !(overlap > 0.0 && overlap <= 1.0) {
            return Err(CombineError::InvalidConfig(format!(
                "required_overlap must be in (0, 1], got {overlap}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_three_quarters() {
        let config = CombineConfig::default();
        assert_eq!(config.required_overlap, 0.75);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn exact_requires_full_overlap() {
        assert_eq!(CombineConfig::exact().required_overlap, 1.0);
    }

    #[test]
    fn out_of_range_overlap_is_rejected() {
        for overlap in [0.0, -0.5, 1.5, f64::NAN] {
            let config = CombineConfig {
                required_overlap: overlap,
                ..Default::default()
            };
            let err = config.validate().unwrap_err();
            assert!(!err.is_internal());
        }
    }

    #[test]
    fn serde_roundtrip() {
        let config = CombineConfig::exact().with_string_mapping(StringTypeMapping::all_plain());
        let json = serde_json::to_string(&config).unwrap();
        let back: CombineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
