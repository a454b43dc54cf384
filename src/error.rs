//! Error handling for the seqmap library
//!
//! A single crate-wide error type covering lookup failures, structural
//! mismatches, and allocation failures propagated from the underlying
//! storage.

use std::collections::TryReserveError;
use thiserror::Error;

/// Main error type for the seqmap library
#[derive(Error, Debug)]
pub enum SeqMapError {
    /// Required-presence lookup failed (`at`-style access)
    #[error("Key not found")]
    KeyNotFound,

    /// Index out of bounds access
    #[error("Out of bounds: index {index}, size {size}")]
    OutOfBounds {
        /// The invalid index
        index: usize,
        /// The valid size/length
        size: usize,
    },

    /// Column lengths differ on a structural replace
    #[error("Length mismatch: key column {left}, value column {right}")]
    LengthMismatch {
        /// Length of the key column
        left: usize,
        /// Length of the value column
        right: usize,
    },

    /// Memory allocation failure in the underlying storage
    #[error("Allocation failed: requested {additional} additional elements")]
    AllocationFailed {
        /// Number of additional elements requested
        additional: usize,
    },

    /// Invalid data passed to a checked constructor
    #[error("Invalid data: {message}")]
    InvalidData {
        /// Error message describing the issue
        message: String,
    },
}

impl SeqMapError {
    /// Create a key-not-found error
    pub fn key_not_found() -> Self {
        Self::KeyNotFound
    }

    /// Create an out of bounds error
    pub fn out_of_bounds(index: usize, size: usize) -> Self {
        Self::OutOfBounds { index, size }
    }

    /// Create a length mismatch error
    pub fn length_mismatch(left: usize, right: usize) -> Self {
        Self::LengthMismatch { left, right }
    }

    /// Create an allocation failure error
    pub fn allocation_failed(additional: usize) -> Self {
        Self::AllocationFailed { additional }
    }

    /// Create an invalid data error
    pub fn invalid_data<S: Into<String>>(message: S) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::KeyNotFound => true,
            Self::AllocationFailed { .. } => true,
            Self::OutOfBounds { .. } => false,
            Self::LengthMismatch { .. } => false,
            Self::InvalidData { .. } => false,
        }
    }

    /// Get the error category for logging/metrics
    pub fn category(&self) -> &'static str {
        match self {
            Self::KeyNotFound => "lookup",
            Self::OutOfBounds { .. } => "bounds",
            Self::LengthMismatch { .. } => "structure",
            Self::AllocationFailed { .. } => "memory",
            Self::InvalidData { .. } => "data",
        }
    }
}

impl From<TryReserveError> for SeqMapError {
    fn from(_: TryReserveError) -> Self {
        Self::AllocationFailed { additional: 0 }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, SeqMapError>;

/// Assert that an index is within bounds
#[inline]
pub fn check_bounds(index: usize, size: usize) -> Result<()> {
    if index >= size {
        Err(SeqMapError::out_of_bounds(index, size))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = SeqMapError::key_not_found();
        assert_eq!(err.category(), "lookup");
        assert!(err.is_recoverable());

        let err = SeqMapError::length_mismatch(3, 4);
        assert_eq!(err.category(), "structure");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_bounds_checking() {
        assert!(check_bounds(5, 10).is_ok());
        assert!(check_bounds(10, 10).is_err());
        assert!(check_bounds(15, 10).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = SeqMapError::out_of_bounds(10, 5);
        let display = format!("{}", err);
        assert!(display.contains("10"));
        assert!(display.contains("5"));

        let err = SeqMapError::length_mismatch(2, 7);
        let display = format!("{}", err);
        assert!(display.contains("2"));
        assert!(display.contains("7"));
    }
}
