//! Error types for the book store.

use thiserror::Error;

/// Result type alias for book operations
pub type Result<T> = std::result::Result<T, BookError>;

/// Errors that can occur while operating on the book
#[derive(Error, Debug)]
pub enum BookError {
    /// Insert position outside `[0, len]`
    #[error("page {position} is out of range")]
    OutOfRange { position: i64, len: usize },

    /// Update/delete index outside `[0, len)`
    #[error("page {index} not found")]
    NotFound { index: usize, len: usize },

    /// Request body could not be decoded into a page document
    #[error("invalid page document: {0}")]
    MalformedInput(String),

    /// Lock could not be acquired within the configured timeout
    #[error("book is busy, try again later")]
    Busy,

    /// I/O error from the underlying file system
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored book could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored book failed its integrity check
    #[error("Corruption detected: {0}")]
    Corruption(String),
}

impl BookError {
    /// Create a malformed input error with a message
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }

    /// Create a corruption error with a message
    pub fn corruption(msg: impl Into<String>) -> Self {
        Self::Corruption(msg.into())
    }

    /// Whether the error was caused by the caller rather than the system
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::OutOfRange { .. } | Self::NotFound { .. } | Self::MalformedInput(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = BookError::OutOfRange { position: 7, len: 3 };
        assert_eq!(err.to_string(), "page 7 is out of range");

        let err = BookError::NotFound { index: 5, len: 3 };
        assert_eq!(err.to_string(), "page 5 not found");
    }

    #[test]
    fn test_client_errors() {
        assert!(BookError::malformed("missing text").is_client_error());
        assert!(BookError::NotFound { index: 0, len: 0 }.is_client_error());
        assert!(!BookError::Busy.is_client_error());
        assert!(!BookError::corruption("bad checksum").is_client_error());
    }
}
