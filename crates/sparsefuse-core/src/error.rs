//! Error types for sparsefuse

use thiserror::Error;

/// Result type alias using sparsefuse's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by sparse storage constructors and the fused kernels
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Operand shapes differ (map) or cannot be broadcast together
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Shape required by the operation (rows, cols)
        expected: (usize, usize),
        /// Offending operand or destination shape (rows, cols)
        got: (usize, usize),
    },

    /// A row position or column pointer does not fit the result index type
    #[error("Index overflow: {value} does not fit index type {index_type}")]
    IndexOverflow {
        /// The value that could not be represented
        value: usize,
        /// Name of the index type
        index_type: &'static str,
    },

    /// Compressed storage arrays are inconsistent
    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    /// An operation was invoked with an empty operand list
    #[error("Operation requires at least one operand")]
    NoOperands,
}

impl Error {
    /// Shape mismatch between two `(rows, cols)` pairs.
    #[inline]
    #[must_use]
    pub const fn shape_mismatch(expected: (usize, usize), got: (usize, usize)) -> Self {
        Self::ShapeMismatch { expected, got }
    }
}
