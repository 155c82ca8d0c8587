//! Executor counters
//!
//! Counters are updated with relaxed atomics; a snapshot is consistent per
//! field, not across fields.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub(crate) struct ExecutorCounters {
    committed: AtomicU64,
    exhausted: AtomicU64,
    failed: AtomicU64,
    conflicts: AtomicU64,
    attempts: AtomicU64,
}

impl ExecutorCounters {
    pub(crate) fn record_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_conflict(&self) {
        self.conflicts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_commit(&self) {
        self.committed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_exhausted(&self) {
        self.exhausted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> ExecutorMetrics {
        let runs_committed = self.committed.load(Ordering::Relaxed);
        let runs_exhausted = self.exhausted.load(Ordering::Relaxed);
        let runs_failed = self.failed.load(Ordering::Relaxed);
        let finished = runs_committed + runs_exhausted + runs_failed;
        ExecutorMetrics {
            runs_committed,
            runs_exhausted,
            runs_failed,
            conflicts: self.conflicts.load(Ordering::Relaxed),
            attempts: self.attempts.load(Ordering::Relaxed),
            commit_rate: if finished == 0 {
                0.0
            } else {
                runs_committed as f64 / finished as f64
            },
        }
    }
}

/// Executor metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutorMetrics {
    /// Runs that committed
    pub runs_committed: u64,
    /// Runs that ran out of attempts to conflicts
    pub runs_exhausted: u64,
    /// Runs that ended with a non-retryable error
    pub runs_failed: u64,
    /// Attempts lost to concurrent writers
    pub conflicts: u64,
    /// Attempts started
    pub attempts: u64,
    /// Committed runs over finished runs (0.0 - 1.0)
    pub commit_rate: f64,
}
