//! Error types for watched transactions
//!
//! Errors are tagged by how the executor must react to them:
//!
//! | Variant | Retried | Meaning |
//! |---------|---------|---------|
//! | `Conflict` | yes | Watched key changed between watch and commit |
//! | `Backend` | no | Transport, protocol or backend-side rejection |
//! | `Cancelled` | no | Caller abort or deadline |
//! | `InvalidKey` | no | Key failed validation |
//! | `InvalidArgument` | no | Bad configuration or input |

use thiserror::Error;

/// Result type for store and transaction operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by store adapters and the transaction executor
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// Watched key was modified concurrently; the batch was discarded
    #[error("conflict: watched key '{key}' was modified")]
    Conflict {
        /// The key whose watch fired
        key: String,
    },

    /// Backend failure unrelated to the watch
    #[error("backend error: {0}")]
    Backend(String),

    /// Caller-initiated abort or expired deadline
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// Invalid key
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Invalid argument or configuration
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Create a conflict error for `key`
    pub fn conflict(key: impl Into<String>) -> Self {
        Error::Conflict { key: key.into() }
    }

    /// Check if this is a watch conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict { .. })
    }

    /// Check if this error may succeed on retry with fresh data.
    ///
    /// Only conflicts are retryable.
    pub fn is_retryable(&self) -> bool {
        self.is_conflict()
    }

    /// Check if this is a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled(_))
    }

    /// Stable name of the variant, used in logs and CLI output
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Conflict { .. } => "Conflict",
            Error::Backend(_) => "Backend",
            Error::Cancelled(_) => "Cancelled",
            Error::InvalidKey(_) => "InvalidKey",
            Error::InvalidArgument(_) => "InvalidArgument",
        }
    }
}
