//! Error types for opscout operations.
//!
//! A single `Error` enum and `Result<T>` alias are shared by every opscout
//! crate. Retrieval strategies return these as typed failures; the dispatcher
//! inspects them to decide whether a fallback is allowed.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur in opscout operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error with the path that caused it.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Item not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid data or format.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Caller passed an argument outside the contract (e.g. unknown mode).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Regex pattern exceeds the configured maximum length.
    #[error("Pattern too long: {length} characters (maximum {max})")]
    PatternTooLong {
        /// Length of the rejected pattern, in characters.
        length: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Embedding provider failure.
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Language model completion failure.
    #[error("Completion error: {0}")]
    Completion(String),

    /// Generic operation failure.
    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    /// Create an I/O error tagged with a path.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an invalid data error.
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create an embedding error.
    pub fn embedding(msg: impl Into<String>) -> Self {
        Self::Embedding(msg.into())
    }

    /// Create a completion error.
    pub fn completion(msg: impl Into<String>) -> Self {
        Self::Completion(msg.into())
    }

    /// Create a generic operation error.
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }

    /// Whether this error is caused by the caller rather than the environment.
    ///
    /// These must always reach the caller; no strategy fallback applies.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidArgument(_) | Self::PatternTooLong { .. })
    }

    /// Whether the dispatcher may recover from this error by switching strategy.
    pub fn is_fallback_eligible(&self) -> bool {
        !self.is_user_error()
    }
}

/// Result type alias using opscout's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_io_with_path_display() {
        let err = Error::io_with_path(
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            "/tmp/cache/metadata.json",
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/cache/metadata.json"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn test_pattern_too_long_display() {
        let err = Error::PatternTooLong {
            length: 300,
            max: 256,
        };
        assert_eq!(
            err.to_string(),
            "Pattern too long: 300 characters (maximum 256)"
        );
    }

    #[test]
    fn test_user_errors_are_not_fallback_eligible() {
        assert!(Error::invalid_argument("mode").is_user_error());
        assert!(!Error::invalid_argument("mode").is_fallback_eligible());
        assert!(Error::PatternTooLong { length: 2, max: 1 }.is_user_error());
    }

    #[test]
    fn test_environment_errors_are_fallback_eligible() {
        assert!(Error::embedding("unreachable").is_fallback_eligible());
        assert!(Error::operation("disk").is_fallback_eligible());
        let io = Error::io_with_path(
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            "/cache",
        );
        assert!(io.is_fallback_eligible());
    }

    #[test]
    fn test_json_error_conversion() {
        let parsed: std::result::Result<serde_json::Value, _> = serde_json::from_str("{bad");
        let err: Error = parsed.unwrap_err().into();
        assert!(matches!(err, Error::Json(_)));
    }
}
