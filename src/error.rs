//! Error types for tsp-anytime.

use thiserror::Error;

/// Errors raised while building a cost matrix or a solve configuration.
///
/// Searches themselves never fail: running out of time without a feasible
/// tour is reported through the sentinel record, not through this type.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TspError {
    /// A row of the cost matrix has the wrong number of columns.
    #[error("cost matrix is not square: row {row} has {len} entries, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },

    /// A finite edge cost is negative.
    #[error("negative edge cost {value} at ({row}, {col})")]
    NegativeCost { row: usize, col: usize, value: f64 },

    /// An edge cost is NaN.
    #[error("NaN edge cost at ({row}, {col})")]
    NanCost { row: usize, col: usize },

    /// Error in solve configuration
    #[error("Configuration error: {0}")]
    InvalidConfig(String),
}

/// Result type alias for tsp-anytime operations
pub type Result<T> = std::result::Result<T, TspError>;
