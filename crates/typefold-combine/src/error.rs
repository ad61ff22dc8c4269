//! Error types for the combining engine.

use typefold_graph::GraphError;
use typefold_types::TypeRef;

/// Errors that can occur while combining record types.
///
/// Apart from [`CombineError::InvalidConfig`], every variant is an internal
/// invariant violation: the input graph or an earlier pass broke a guarantee
/// this engine relies on. Any of them aborts the whole combine and no graph
/// is produced.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CombineError {
    /// The size-ratio gate passed but the fault budget came out negative.
    #[error(
        "negative fault budget: {smaller} fields vs {larger} fields needs overlap {min_overlap}"
    )]
    NegativeFaultBudget {
        /// Field count of the larger record.
        larger: usize,
        /// Field count of the smaller record.
        smaller: usize,
        /// Required number of shared fields.
        min_overlap: usize,
    },

    /// A field recorded as common to both records is missing on one side.
    #[error("common field {0:?} is missing on lookup")]
    MissingCommonField(String),

    /// A merged field mixes string and non-string kinds.
    #[error("field {field:?} mixes string and {other} types")]
    MixedStringKinds {
        /// The field being merged.
        field: String,
        /// Kind of the first non-string member.
        other: String,
    },

    /// A node expected to be a record is not one.
    #[error("node {0} is not a record")]
    NotARecord(TypeRef),

    /// The configuration is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The underlying graph rejected an operation.
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
}

impl CombineError {
    /// Returns `true` for invariant violations, as opposed to caller mistakes.
    pub fn is_internal(&self) -> bool {
        !matches!(self, Self::InvalidConfig(_))
    }
}

/// Convenience alias for combine results.
pub type CombineResult<T> = Result<T, CombineError>;
