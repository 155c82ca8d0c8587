//! Store adapter traits
//!
//! These traits are the backend boundary. Any key-value store that can
//! report a key's remaining TTL, watch a key, and commit a set+expire batch
//! that aborts when the watched key changes can back a transaction executor.
//!
//! ## Contract
//!
//! - [`StoreAdapter::run_watched`] invokes `body` exactly once and never
//!   retries internally.
//! - A batch queued through [`WatchScope::atomic_batch`] commits only if the
//!   watched key is unchanged since the watch was established; otherwise the
//!   whole batch is discarded and `run_watched` returns [`Error::Conflict`].
//! - The set and the expire of a batch are applied together or not at all.
//! - Once the [`CancelSignal`] passed to `run_watched` trips, the adapter
//!   returns [`Error::Cancelled`] from its next step and commits nothing.
//!   Blocking backend calls are bounded by [`CancelSignal::remaining`].
//!
//! [`Error::Conflict`]: crate::error::Error::Conflict
//! [`Error::Cancelled`]: crate::error::Error::Cancelled

use crate::cancel::CancelSignal;
use crate::error::Result;
use crate::types::{Ttl, WatchedKey};
use crate::value::Value;

/// Set `key` to `value`, then set its expiration to `ttl`, as one unit
#[derive(Debug, Clone, PartialEq)]
pub struct AtomicBatch {
    /// Target key; must be the watched key
    pub key: WatchedKey,
    /// Replacement value
    pub value: Value,
    /// Expiration applied after the set
    pub ttl: Ttl,
}

impl AtomicBatch {
    /// Create a new batch
    pub fn new(key: WatchedKey, value: Value, ttl: Ttl) -> Self {
        Self { key, value, ttl }
    }
}

/// Handle passed to the body of a watched transaction
///
/// Reads go through the watch so the adapter can observe them; the single
/// write is queued with [`atomic_batch`](WatchScope::atomic_batch) and
/// committed by the adapter once the body returns `Ok`.
pub trait WatchScope {
    /// The key this scope is watching
    fn key(&self) -> &WatchedKey;

    /// The cancellation signal of the run this scope belongs to
    fn cancel(&self) -> &CancelSignal;

    /// Read the watched key's remaining lifetime
    fn get_ttl(&mut self) -> Result<Ttl>;

    /// Read the watched key's current value (`None` if absent)
    fn get(&mut self) -> Result<Option<Value>>;

    /// Queue the set+expire batch conditioned on the watch
    ///
    /// At most one batch per scope.
    fn atomic_batch(&mut self, batch: AtomicBatch) -> Result<()>;
}

/// Backend operations required by the transaction executor
pub trait StoreAdapter: Send + Sync {
    /// Remaining lifetime of `key`
    ///
    /// Returns [`Ttl::Persistent`] or [`Ttl::Missing`] rather than an error
    /// for unbounded and absent keys.
    fn get_ttl(&self, key: &WatchedKey) -> Result<Ttl>;

    /// Current value of `key`
    fn get(&self, key: &WatchedKey) -> Result<Option<Value>>;

    /// Watch `key`, run `body` once, and commit its batch if the watch held
    ///
    /// `cancel` is exposed to `body` through [`WatchScope::cancel`] and
    /// must abort the watch, and any backend call in flight, once it trips.
    fn run_watched(
        &self,
        key: &WatchedKey,
        cancel: &CancelSignal,
        body: &mut dyn FnMut(&mut dyn WatchScope) -> Result<()>,
    ) -> Result<()>;
}
