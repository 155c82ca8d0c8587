//! Retry policy for watched transactions
//!
//! A policy bounds the number of attempts and decides how long to wait
//! after a conflicted attempt before starting the next one. The default
//! policy makes 5 attempts with no delay between them.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use watchtx_core::{Error, Result};

/// Default maximum number of attempts
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Delay strategy between conflicted attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backoff {
    /// Retry immediately
    #[default]
    None,
    /// Wait the same delay before every retry
    Fixed {
        /// Delay in milliseconds
        delay_ms: u64,
    },
    /// Double the delay after every conflict, capped at `max_delay_ms`
    Exponential {
        /// Delay before the first retry, in milliseconds
        base_delay_ms: u64,
        /// Upper bound on any single delay, in milliseconds
        max_delay_ms: u64,
    },
}

impl Backoff {
    /// Delay in milliseconds after the conflicted attempt at index `retry`
    /// (0 = first conflict)
    fn delay_ms(&self, retry: usize) -> u64 {
        match *self {
            Backoff::None => 0,
            Backoff::Fixed { delay_ms } => delay_ms,
            Backoff::Exponential {
                base_delay_ms,
                max_delay_ms,
            } => {
                // Cap the shift to prevent overflow (1 << 63 is the max for u64)
                let shift = retry.min(63);
                let multiplier = 1u64 << shift;
                base_delay_ms.saturating_mul(multiplier).min(max_delay_ms)
            }
        }
    }
}

/// Bounded retry configuration
///
/// # Example
///
/// ```
/// use watchtx_concurrency::{Backoff, RetryPolicy};
///
/// let policy = RetryPolicy::new()
///     .with_max_attempts(8)
///     .with_backoff(Backoff::Exponential { base_delay_ms: 5, max_delay_ms: 100 })
///     .with_jitter(true);
/// assert_eq!(policy.max_attempts, 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first (must be >= 1)
    pub max_attempts: usize,
    /// Delay strategy between conflicted attempts
    pub backoff: Backoff,
    /// Randomize each delay uniformly in `[0, delay]`
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Backoff::None,
            jitter: false,
        }
    }
}

impl RetryPolicy {
    /// Create a RetryPolicy with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a policy that makes a single attempt
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    /// Set maximum number of attempts
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the backoff strategy
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Enable or disable jitter
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Reject policies that could never attempt a transaction
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::InvalidArgument(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if let Backoff::Exponential {
            base_delay_ms,
            max_delay_ms,
        } = self.backoff
        {
            if base_delay_ms > max_delay_ms {
                return Err(Error::InvalidArgument(format!(
                    "base_delay_ms ({}) exceeds max_delay_ms ({})",
                    base_delay_ms, max_delay_ms
                )));
            }
        }
        Ok(())
    }

    /// Delay to wait after the conflicted attempt at index `retry`
    /// (0 = first conflict)
    pub fn delay_for(&self, retry: usize) -> Duration {
        let ms = self.backoff.delay_ms(retry);
        if self.jitter && ms > 0 {
            Duration::from_millis(rand::thread_rng().gen_range(0..=ms))
        } else {
            Duration::from_millis(ms)
        }
    }
}
