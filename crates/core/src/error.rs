//! Drain error types
//!
//! Errors that can occur when building an engine or moving its state
//! in and out of a snapshot. Processing a line never fails.

use thiserror::Error;

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

/// Result type for engine operations
pub type DrainResult<T> = Result<T, DrainError>;

/// Errors that can occur while constructing or restoring an engine
#[derive(Debug, Error)]
pub enum DrainError {
    /// Invalid engine configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Snapshot could not be decoded or is inconsistent
    #[error("invalid snapshot: {0}")]
    Snapshot(String),

    /// I/O error (e.g., reading or writing a snapshot file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DrainError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a snapshot error
    pub fn snapshot(msg: impl Into<String>) -> Self {
        Self::Snapshot(msg.into())
    }
}
