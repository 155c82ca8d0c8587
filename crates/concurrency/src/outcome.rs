//! Terminal result of a transaction run
//!
//! `Committed` and `ConflictExhausted` both come back without an error, but
//! they mean opposite things. Branch on the variant, or use
//! [`Outcome::into_result`] which maps exhaustion to a conflict error.

use std::fmt;
use watchtx_core::{Error, Result, Ttl, Value, WatchedKey};

/// Details of a successful commit
#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    /// 1-based number of the attempt that committed
    pub attempts: usize,
    /// TTL observed at the start of the committing attempt and written back
    pub ttl: Ttl,
    /// Value written by the committing attempt
    pub value: Value,
}

/// Result of [`TransactionExecutor::run`](crate::TransactionExecutor::run)
#[derive(Debug, Clone, PartialEq)]
#[must_use = "a run can end in exhaustion or failure; inspect the outcome"]
pub enum Outcome {
    /// The batch committed
    Committed(CommitInfo),
    /// Every allotted attempt lost to a concurrent writer
    ConflictExhausted {
        /// The contended key
        key: WatchedKey,
        /// Number of attempts made (equals the policy's maximum)
        attempts: usize,
    },
    /// A non-retryable error ended the run
    Fatal(Error),
}

impl Outcome {
    /// Check if the run committed
    pub fn is_committed(&self) -> bool {
        matches!(self, Outcome::Committed(_))
    }

    /// Check if the run gave up after repeated conflicts
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Outcome::ConflictExhausted { .. })
    }

    /// Check if the run failed with a non-retryable error
    pub fn is_fatal(&self) -> bool {
        matches!(self, Outcome::Fatal(_))
    }

    /// Commit details, if committed
    pub fn commit_info(&self) -> Option<&CommitInfo> {
        match self {
            Outcome::Committed(info) => Some(info),
            _ => None,
        }
    }

    /// The fatal error, if any
    pub fn error(&self) -> Option<&Error> {
        match self {
            Outcome::Fatal(e) => Some(e),
            _ => None,
        }
    }

    /// Stable name of the variant
    pub fn name(&self) -> &'static str {
        match self {
            Outcome::Committed(_) => "Committed",
            Outcome::ConflictExhausted { .. } => "ConflictExhausted",
            Outcome::Fatal(_) => "Fatal",
        }
    }

    /// Convert into a `Result`, mapping exhaustion to [`Error::Conflict`]
    pub fn into_result(self) -> Result<CommitInfo> {
        match self {
            Outcome::Committed(info) => Ok(info),
            Outcome::ConflictExhausted { key, .. } => Err(Error::conflict(key.into_string())),
            Outcome::Fatal(e) => Err(e),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Committed(info) => {
                write!(f, "committed on attempt {} (ttl {})", info.attempts, info.ttl)
            }
            Outcome::ConflictExhausted { key, attempts } => {
                write!(f, "gave up on '{}' after {} conflicted attempts", key, attempts)
            }
            Outcome::Fatal(e) => write!(f, "failed: {}", e),
        }
    }
}
