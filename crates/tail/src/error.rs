//! Tailing error types

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

/// Result type for tailing operations
pub type TailResult<T> = Result<T, TailError>;

/// Errors that can occur while tailing a file
#[derive(Debug, Error)]
pub enum TailError {
    /// Failed to open, inspect or read the file
    #[error("failed to read '{}': {source}", .path.display())]
    Io {
        /// Path to the file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Path exists but is not a regular file
    #[error("'{}' is not a file", .0.display())]
    NotAFile(PathBuf),

    /// Malformed line selector
    #[error("invalid number of lines '{0}': must be 0 or a positive number, optionally prefixed with '+'")]
    InvalidFromLine(String),
}

impl TailError {
    /// Create an IO error for `path`
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
