//! Error types for lease lock operations.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during lock operations.
///
/// Failing to obtain a lock because someone else holds a live lease is not an
/// error; `try_acquire` reports that as `Ok(None)`.
#[derive(Error, Debug)]
pub enum LockError {
    /// Lock acquisition did not succeed before the caller's deadline.
    #[error("lock acquisition timed out after {0:?}")]
    Timeout(Duration),

    /// Lock acquisition was cancelled while waiting.
    #[error("lock operation was cancelled")]
    Cancelled,

    /// The store could not be reached.
    #[error("connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The store rejected or failed a command.
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The value stored under a lock key is not a lease timestamp.
    #[error("corrupt lease record under key '{key}': {value:?}")]
    CorruptLease { key: String, value: String },

    /// Coordinator options or environment configuration are invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl LockError {
    /// Wraps a store command failure.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(Box::new(std::io::Error::other(message.into())))
    }

    /// Wraps a store connectivity failure.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(Box::new(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            message.into(),
        )))
    }
}

/// Result type for lock operations.
pub type LockResult<T> = Result<T, LockError>;
