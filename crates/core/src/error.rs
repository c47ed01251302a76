//! Record construction errors
//!
//! Constructors validate only what they need to read the header safely.
//! Field values themselves are trusted as-is.

use thiserror::Error;

/// Result type alias for record construction
pub type RecordResult<T> = std::result::Result<T, RecordError>;

/// Errors from building or indexing a buffer-backed record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Buffer holds fewer bytes than the record needs
    #[error("Buffer too short: need {required} bytes, got {actual}")]
    BufferTooShort {
        /// Bytes the record needs
        required: usize,
        /// Bytes the buffer holds
        actual: usize,
    },

    /// Declared total size is smaller than the fixed header
    #[error("Invalid record size: declared {declared}, minimum {minimum}")]
    InvalidSize {
        /// Size declared by the header or the caller
        declared: u64,
        /// Fixed header size
        minimum: usize,
    },

    /// Declared size does not fit in memory on this platform
    #[error("Record size overflows usize")]
    SizeOverflow,

    /// Backing storage could not be allocated
    #[error("Failed to allocate {requested} bytes of record storage")]
    Allocation {
        /// Bytes requested
        requested: usize,
    },

    /// Component index past the end of the component list
    #[error("Component index {index} out of range (count {count})")]
    ComponentOutOfRange {
        /// Requested index
        index: usize,
        /// Number of components in the record
        count: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_too_short() {
        let err = RecordError::BufferTooShort {
            required: 72,
            actual: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("72"));
        assert!(msg.contains("3"));
    }

    #[test]
    fn test_error_display_out_of_range() {
        let err = RecordError::ComponentOutOfRange { index: 5, count: 2 };
        assert_eq!(err.to_string(), "Component index 5 out of range (count 2)");
    }
}
