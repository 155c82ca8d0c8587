//! Transaction executor for watched read-modify-write
//!
//! Runs the optimistic cycle against a [`StoreAdapter`]:
//!
//! ```text
//! for attempt in 1..=max_attempts:
//!   1. check cancellation
//!   2. run_watched(key, cancel, body) where body:
//!        a. ttl   = get_ttl()          (observed once per attempt)
//!        b. value = transform(get())
//!        c. check cancellation
//!        d. atomic_batch(key, value, ttl)
//!   3. Ok        -> Committed
//!      Conflict  -> back off, next attempt
//!      other     -> Fatal (never retried)
//! all attempts conflicted -> ConflictExhausted
//! ```
//!
//! The TTL written by an attempt is always the TTL read by that same
//! attempt; nothing observed in one attempt is carried into the next.

use crate::metrics::{ExecutorCounters, ExecutorMetrics};
use crate::outcome::{CommitInfo, Outcome};
use crate::retry::RetryPolicy;
use crate::transform::Transform;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use watchtx_core::{
    AtomicBatch, CancelSignal, Error, Result, StoreAdapter, Ttl, Value, WatchedKey,
};

/// Executes TTL-preserving optimistic transactions
///
/// The executor owns an explicit handle to its store; there is no global
/// client. It is `Send + Sync` and can be shared across threads via `Arc`.
///
/// # Example
///
/// ```ignore
/// let executor = TransactionExecutor::new(Arc::new(store), RetryPolicy::default())?;
/// match executor.run(&key, &replace_with("new value")) {
///     Outcome::Committed(info) => println!("kept ttl {}", info.ttl),
///     Outcome::ConflictExhausted { attempts, .. } => println!("too hot after {}", attempts),
///     Outcome::Fatal(e) => return Err(e),
/// }
/// ```
pub struct TransactionExecutor<S: StoreAdapter> {
    store: Arc<S>,
    policy: RetryPolicy,
    counters: ExecutorCounters,
}

impl<S: StoreAdapter> TransactionExecutor<S> {
    /// Create an executor over `store`
    ///
    /// Fails with `Error::InvalidArgument` if the policy is invalid.
    pub fn new(store: Arc<S>, policy: RetryPolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self {
            store,
            policy,
            counters: ExecutorCounters::default(),
        })
    }

    /// Create an executor with the default policy (5 attempts, no delay)
    pub fn with_default_policy(store: Arc<S>) -> Self {
        Self {
            store,
            policy: RetryPolicy::default(),
            counters: ExecutorCounters::default(),
        }
    }

    /// The store this executor writes to
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The policy used by [`run`](Self::run)
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Snapshot of the executor's counters
    pub fn metrics(&self) -> ExecutorMetrics {
        self.counters.snapshot()
    }

    /// Transform `key`'s value, preserving its TTL, with the executor's policy
    pub fn run<T>(&self, key: &WatchedKey, transform: &T) -> Outcome
    where
        T: Transform + ?Sized,
    {
        self.run_with_policy(key, transform, &self.policy, &CancelSignal::new())
    }

    /// Like [`run`](Self::run), aborting with `Fatal(Cancelled)` when
    /// `cancel` trips
    pub fn run_with_cancel<T>(&self, key: &WatchedKey, transform: &T, cancel: &CancelSignal) -> Outcome
    where
        T: Transform + ?Sized,
    {
        self.run_with_policy(key, transform, &self.policy, cancel)
    }

    /// Run with an explicit policy for this call
    pub fn run_with_policy<T>(
        &self,
        key: &WatchedKey,
        transform: &T,
        policy: &RetryPolicy,
        cancel: &CancelSignal,
    ) -> Outcome
    where
        T: Transform + ?Sized,
    {
        let span = tracing::info_span!("watch_txn", key = %key, run_id = %Uuid::new_v4());
        let _enter = span.enter();

        if let Err(e) = policy.validate() {
            return self.fail(e, 0);
        }

        for attempt in 1..=policy.max_attempts {
            if let Err(e) = cancel.check() {
                return self.fail(e, attempt - 1);
            }

            self.counters.record_attempt();
            match self.attempt(key, transform, cancel, attempt) {
                Ok((ttl, value)) => {
                    self.counters.record_commit();
                    info!(attempt, ttl = %ttl, "transaction committed");
                    return Outcome::Committed(CommitInfo {
                        attempts: attempt,
                        ttl,
                        value,
                    });
                }
                Err(e) if e.is_conflict() => {
                    self.counters.record_conflict();
                    if attempt == policy.max_attempts {
                        warn!(attempt, "optimistic lock lost on final attempt");
                        break;
                    }
                    warn!(attempt, max_attempts = policy.max_attempts, "optimistic lock lost, retrying");

                    let delay = policy.delay_for(attempt - 1);
                    if !delay.is_zero() {
                        debug!(delay_ms = delay.as_millis() as u64, "backing off");
                        if let Err(e) = cancel.sleep(delay) {
                            return self.fail(e, attempt);
                        }
                    }
                }
                Err(e) => return self.fail(e, attempt),
            }
        }

        self.counters.record_exhausted();
        warn!(attempts = policy.max_attempts, "retries exhausted");
        Outcome::ConflictExhausted {
            key: key.clone(),
            attempts: policy.max_attempts,
        }
    }

    /// One watch/read/transform/write cycle
    fn attempt<T>(
        &self,
        key: &WatchedKey,
        transform: &T,
        cancel: &CancelSignal,
        attempt: usize,
    ) -> Result<(Ttl, Value)>
    where
        T: Transform + ?Sized,
    {
        let mut written: Option<(Ttl, Value)> = None;

        self.store.run_watched(key, cancel, &mut |scope| {
            let ttl = scope.get_ttl()?;
            debug!(attempt, ttl = %ttl, "TTL before write");

            let current = scope.get()?;
            let value = transform.apply(current.as_ref());

            cancel.check()?;
            scope.atomic_batch(AtomicBatch::new(key.clone(), value.clone(), ttl))?;
            written = Some((ttl, value));
            Ok(())
        })?;

        written.ok_or_else(|| {
            Error::Backend("store reported a commit without running the transaction body".to_string())
        })
    }

    fn fail(&self, e: Error, attempts: usize) -> Outcome {
        self.counters.record_failure();
        if e.is_cancelled() {
            warn!(attempts, error = %e, "transaction cancelled");
        } else {
            error!(attempts, kind = e.kind(), error = %e, "transaction failed");
        }
        Outcome::Fatal(e)
    }
}

impl<S: StoreAdapter> std::fmt::Debug for TransactionExecutor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionExecutor")
            .field("policy", &self.policy)
            .field("metrics", &self.metrics())
            .finish()
    }
}
