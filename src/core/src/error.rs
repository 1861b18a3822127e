//! Error types for the storage layer
//!
//! Every store implementation reports failures through [`CoreError`], which the
//! authorization crate wraps in its own error type.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for records and storage
#[derive(Debug, Error)]
pub enum CoreError {
    /// Record (or row) does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A unique column group already holds this value
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Serialization/Deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Storage backend failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid input/state
    #[error("Invalid: {0}")]
    Invalid(String),
}

impl CoreError {
    /// Create a not found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        CoreError::NotFound(msg.into())
    }

    /// Create a conflict error
    pub fn conflict<S: Into<String>>(msg: S) -> Self {
        CoreError::Conflict(msg.into())
    }

    /// Create a serialization error
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        CoreError::Serialization(msg.into())
    }

    /// Create a storage error
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        CoreError::Storage(msg.into())
    }

    /// Create an invalid error
    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        CoreError::Invalid(msg.into())
    }

    /// Whether this error is a unique-constraint collision
    pub fn is_conflict(&self) -> bool {
        matches!(self, CoreError::Conflict(_))
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}
