//! Caller-side cancellation for transaction runs
//!
//! A [`CancelSignal`] combines an explicit cancel flag, shared by every
//! clone, with an optional deadline. The executor checks it between steps,
//! and hands it to [`StoreAdapter::run_watched`] so the adapter can bound
//! its own blocking calls: a network adapter derives socket timeouts from
//! [`CancelSignal::remaining`], and waits with [`CancelSignal::sleep`] or
//! polls [`CancelSignal::check`].
//!
//! [`StoreAdapter::run_watched`]: crate::traits::StoreAdapter::run_watched

use crate::error::{Error, Result};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct CancelState {
    cancelled: Mutex<bool>,
    wakeup: Condvar,
}

/// Cancellation flag plus optional deadline
///
/// Clones share the flag, so a signal handed to a worker can be cancelled
/// from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    state: Arc<CancelState>,
    deadline: Option<Instant>,
}

impl CancelSignal {
    /// A signal that never trips unless cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// A signal that trips at `deadline`
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            state: Arc::default(),
            deadline: Some(deadline),
        }
    }

    /// A signal that trips after `timeout` from now
    ///
    /// A timeout past the clock's range means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => Self::with_deadline(deadline),
            None => Self::new(),
        }
    }

    /// Trip the signal for every clone
    pub fn cancel(&self) {
        *self.state.cancelled.lock() = true;
        self.state.wakeup.notify_all();
    }

    /// The deadline, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline, `None` without one
    ///
    /// Zero once the deadline has passed. Adapters use this to bound
    /// backend I/O.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Check if the signal has tripped
    pub fn is_cancelled(&self) -> bool {
        self.check().is_err()
    }

    /// `Err(Error::Cancelled)` once the signal has tripped
    pub fn check(&self) -> Result<()> {
        if *self.state.cancelled.lock() {
            return Err(Error::Cancelled("cancelled by caller".to_string()));
        }
        if matches!(self.deadline, Some(d) if Instant::now() >= d) {
            return Err(Error::Cancelled("deadline exceeded".to_string()));
        }
        Ok(())
    }

    /// Sleep for `duration`, returning early with `Error::Cancelled` if the
    /// signal trips first
    pub fn sleep(&self, duration: Duration) -> Result<()> {
        // None: the duration overflows the clock, sleep until cancelled
        let wake_at = Instant::now().checked_add(duration);
        let mut cancelled = self.state.cancelled.lock();
        loop {
            if *cancelled {
                return Err(Error::Cancelled("cancelled by caller".to_string()));
            }
            let now = Instant::now();
            if matches!(self.deadline, Some(d) if now >= d) {
                return Err(Error::Cancelled("deadline exceeded".to_string()));
            }
            if matches!(wake_at, Some(w) if now >= w) {
                return Ok(());
            }
            let until = match (self.deadline, wake_at) {
                (Some(d), Some(w)) => Some(d.min(w)),
                (d, w) => d.or(w),
            };
            match until {
                Some(until) => {
                    self.state.wakeup.wait_until(&mut cancelled, until);
                }
                None => self.state.wakeup.wait(&mut cancelled),
            }
        }
    }
}
