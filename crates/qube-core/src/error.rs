//! Error types for qube-core
//!
//! Provides error handling for:
//! - Rank and axis validation
//! - Qube (rectangular) geometry checks
//! - Broadcast prefix validation
//! - Cursor lifecycle errors
//!
//! Fill values are deliberately *not* part of this taxonomy: a fill is an
//! in-band sentinel that propagates through every operation, while the
//! errors below are immediate and fatal to the single call that raised
//! them.

use thiserror::Error;

/// Main error type for qube operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QubeError {
    /// Operand rank exceeds what the operation supports
    #[error("rank {rank} exceeds the supported limit of {max}")]
    UnsupportedRank { rank: usize, max: usize },

    /// Axis index out of range for the dataset's rank
    #[error("axis {axis} out of range for rank {rank}")]
    InvalidAxis { axis: usize, rank: usize },

    /// Index out of range along an axis
    #[error("index {index} out of range for axis {axis} of length {len}")]
    IndexOutOfBounds {
        index: usize,
        axis: usize,
        len: usize,
    },

    /// Dataset is jagged where a rectangular qube is required
    #[error("dataset is not a qube: length varies along axis {axis}")]
    NonQube { axis: usize },

    /// Broadcast prefix assumption violated, or operand shapes disagree
    #[error("geometry mismatch: shape {low:?} does not align with shape {high:?}")]
    GeometryMismatch { low: Vec<usize>, high: Vec<usize> },

    /// Reference axis is not strictly monotonic increasing
    #[error("reference axis is not strictly increasing at index {index}")]
    NonMonotonic { index: usize },

    /// Cursor advanced past the end of its index space
    #[error("cursor advanced past the end of its index space")]
    CursorExhausted,

    /// Axis tag dataset is not marked with a cartesian coordinate frame
    #[error("axis {axis} is not tagged with a cartesian coordinate frame")]
    NotCartesian { axis: usize },

    /// Dataset has too few elements for the operation
    #[error("operation needs at least {needed} elements, got {got}")]
    TooShort { needed: usize, got: usize },

    /// Smoothing window width is not a positive odd number
    #[error("smoothing window width must be odd, got {width}")]
    InvalidWindow { width: usize },

    /// Element buffer does not match the declared shape
    #[error("element count {got} does not match shape product {expected}")]
    LengthMismatch { expected: usize, got: usize },
}

/// Result type alias for qube operations
pub type QubeResult<T> = Result<T, QubeError>;

/// Validation utilities
pub mod validation {
    use super::*;

    /// Validate that an axis index is within a dataset's rank
    pub fn validate_axis(axis: usize, rank: usize) -> QubeResult<()> {
        if axis >= rank {
            return Err(QubeError::InvalidAxis { axis, rank });
        }
        Ok(())
    }

    /// Validate that a rank is within the engine's supported limit
    pub fn validate_rank(rank: usize, max: usize) -> QubeResult<()> {
        if rank > max {
            return Err(QubeError::UnsupportedRank { rank, max });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QubeError::UnsupportedRank { rank: 4, max: 3 };
        assert!(err.to_string().contains('4'));

        let err = QubeError::GeometryMismatch {
            low: vec![2],
            high: vec![3, 2],
        };
        assert!(err.to_string().contains("[2]"));
    }

    #[test]
    fn test_validate_axis() {
        assert!(validation::validate_axis(1, 2).is_ok());
        assert!(validation::validate_axis(2, 2).is_err());
    }

    #[test]
    fn test_validate_rank() {
        assert!(validation::validate_rank(3, 3).is_ok());
        assert!(validation::validate_rank(4, 3).is_err());
    }
}
