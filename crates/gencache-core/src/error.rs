//! Error types for gencache

use crate::types::Category;

/// Result type alias using gencache's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for gencache operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Neither the adaptive path nor the external generator produced an output
    #[error("generation failed for {category}: {message}")]
    GenerationFailure {
        /// Category the request was made for
        category: Category,
        /// Message of the underlying cause
        message: String,
    },

    /// Operator or caller misconfiguration
    #[error("configuration error: {0}")]
    Config(String),

    /// An output of one category was offered to another category's model
    #[error("category mismatch: expected {expected} output, got {actual}")]
    CategoryMismatch {
        /// Category the caller named
        expected: Category,
        /// Category of the output itself
        actual: Category,
    },

    /// Unknown category name
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    /// Snapshot decoding or migration errors
    #[error("snapshot error: {0}")]
    Snapshot(String),

    /// Snapshot file IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new generation failure
    pub fn generation(category: Category, msg: impl Into<String>) -> Self {
        Self::GenerationFailure {
            category,
            message: msg.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new snapshot error
    pub fn snapshot(msg: impl Into<String>) -> Self {
        Self::Snapshot(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
