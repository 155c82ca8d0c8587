//! WatchTx client: the main entry point.

use crate::config::Config;
use crate::error::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use watchtx_concurrency::{
    replace_with, CancelSignal, ExecutorMetrics, Outcome, RetryPolicy, TransactionExecutor,
    Transform,
};
use watchtx_core::{StoreAdapter, Value, WatchedKey};
use watchtx_storage::{ShardedStore, TtlCleaner};

/// TTL-preserving optimistic transactions over a store.
///
/// # Example
///
/// ```ignore
/// use watchtx::prelude::*;
///
/// let tx = WatchTx::in_memory();
/// tx.store().set_with_ttl(&WatchedKey::new("key")?, "old value", Duration::from_secs(60));
///
/// let outcome = tx.replace_keep_ttl("key", "new value");
/// assert!(outcome.is_committed());
/// ```
pub struct WatchTx<S: StoreAdapter = ShardedStore> {
    executor: TransactionExecutor<S>,
    cleaner: Option<TtlCleaner>,
}

impl<S: StoreAdapter> WatchTx<S> {
    /// Create a builder for a client over a custom store.
    pub fn builder() -> WatchTxBuilder<S> {
        WatchTxBuilder::new()
    }

    /// Create a client from a loaded configuration.
    pub fn from_config(config: &Config, store: Arc<S>) -> Result<Self> {
        config.validate()?;
        Self::builder().store(store).config(config).build()
    }

    /// Transform the value at `key`, keeping its remaining TTL.
    ///
    /// An empty key yields `Outcome::Fatal(Error::InvalidKey)` without
    /// contacting the store.
    pub fn rewrite_keep_ttl<T>(&self, key: &str, transform: &T) -> Outcome
    where
        T: Transform + ?Sized,
    {
        self.rewrite_keep_ttl_with_cancel(key, transform, &CancelSignal::new())
    }

    /// Like [`rewrite_keep_ttl`](Self::rewrite_keep_ttl), aborting when
    /// `cancel` trips.
    pub fn rewrite_keep_ttl_with_cancel<T>(
        &self,
        key: &str,
        transform: &T,
        cancel: &CancelSignal,
    ) -> Outcome
    where
        T: Transform + ?Sized,
    {
        match WatchedKey::new(key) {
            Ok(key) => self.executor.run_with_cancel(&key, transform, cancel),
            Err(e) => Outcome::Fatal(e),
        }
    }

    /// Overwrite the value at `key` with `value`, keeping its remaining TTL.
    pub fn replace_keep_ttl(&self, key: &str, value: impl Into<Value>) -> Outcome {
        self.rewrite_keep_ttl(key, &replace_with(value))
    }

    /// Like [`replace_keep_ttl`](Self::replace_keep_ttl), aborting when
    /// `cancel` trips.
    pub fn replace_keep_ttl_with_cancel(
        &self,
        key: &str,
        value: impl Into<Value>,
        cancel: &CancelSignal,
    ) -> Outcome {
        self.rewrite_keep_ttl_with_cancel(key, &replace_with(value), cancel)
    }

    /// The underlying executor, for per-call policies.
    pub fn executor(&self) -> &TransactionExecutor<S> {
        &self.executor
    }

    /// The store transactions run against.
    pub fn store(&self) -> &Arc<S> {
        self.executor.store()
    }

    /// The default retry policy.
    pub fn retry_policy(&self) -> &RetryPolicy {
        self.executor.policy()
    }

    /// Counters accumulated since the client was built.
    pub fn metrics(&self) -> ExecutorMetrics {
        self.executor.metrics()
    }
}

impl WatchTx<ShardedStore> {
    /// A client over a fresh in-memory store with the default policy.
    pub fn in_memory() -> Self {
        Self {
            executor: TransactionExecutor::with_default_policy(Arc::new(ShardedStore::new())),
            cleaner: None,
        }
    }

    /// A client over a fresh in-memory store configured by `config`.
    ///
    /// Starts a background TTL cleaner when `store.cleanup_interval_ms` is set.
    pub fn from_config_in_memory(config: &Config) -> Result<Self> {
        let tx = Self::from_config(config, Arc::new(ShardedStore::new()))?;
        Ok(match config.store.cleanup_interval() {
            Some(interval) => tx.with_cleaner(interval),
            None => tx,
        })
    }

    /// Sweep expired entries from the store every `interval`.
    ///
    /// Replaces any cleaner already running.
    pub fn with_cleaner(mut self, interval: Duration) -> Self {
        let cleaner = TtlCleaner::start(Arc::clone(self.executor.store()), interval);
        self.cleaner = Some(cleaner);
        self
    }

    /// Check if a background TTL cleaner is running.
    pub fn has_cleaner(&self) -> bool {
        self.cleaner.as_ref().is_some_and(TtlCleaner::is_running)
    }
}

impl<S: StoreAdapter> std::fmt::Debug for WatchTx<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchTx")
            .field("executor", &self.executor)
            .field("cleaner", &self.cleaner.is_some())
            .finish()
    }
}

/// Builder for [`WatchTx`].
pub struct WatchTxBuilder<S: StoreAdapter> {
    store: Option<Arc<S>>,
    policy: RetryPolicy,
}

impl<S: StoreAdapter> WatchTxBuilder<S> {
    /// Create a new builder with the default retry policy.
    pub fn new() -> Self {
        Self {
            store: None,
            policy: RetryPolicy::default(),
        }
    }

    /// Set the store transactions run against.
    pub fn store(mut self, store: Arc<S>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the default retry policy.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the maximum number of attempts, keeping the rest of the policy.
    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.policy.max_attempts = max_attempts;
        self
    }

    /// Take the retry policy from `config`.
    pub fn config(mut self, config: &Config) -> Self {
        self.policy = config.retry.clone();
        self
    }

    /// Build the client.
    ///
    /// Fails with `Error::InvalidArgument` when no store was given or the
    /// retry policy is invalid.
    pub fn build(self) -> Result<WatchTx<S>> {
        let store = self
            .store
            .ok_or_else(|| Error::InvalidArgument("a store is required".to_string()))?;
        Ok(WatchTx {
            executor: TransactionExecutor::new(store, self.policy)?,
            cleaner: None,
        })
    }
}

impl<S: StoreAdapter> Default for WatchTxBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}
