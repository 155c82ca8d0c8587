//! Sharded in-memory key-value store with per-key expiration
//!
//! DashMap + FxHash keyed by the raw key string.
//! Lock-free reads, sharded writes, O(1) lookups.
//!
//! # Design
//!
//! - DashMap: 16-way sharded by default, lock-free reads
//! - FxHash: fast non-crypto hash for string keys
//! - Versions: every mutation stamps the entry with a fresh global version,
//!   which is what a watch compares at commit time
//! - Expiration: lazy. Expired entries are invisible to readers and are
//!   physically removed by [`ShardedStore::purge_expired`]
//!
//! # Watch semantics
//!
//! A watch captures the key's *live* version (`None` when absent or
//! expired). Commit re-reads the live version while holding the key's shard
//! lock and rejects the batch if it differs. Deleting, overwriting,
//! re-expiring or letting the key expire all change the live version.

use crate::watch::ShardedWatchScope;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use watchtx_core::{
    AtomicBatch, CancelSignal, Error, Result, StoreAdapter, Ttl, Value, WatchScope, WatchedKey,
};

type FxBuildHasher = BuildHasherDefault<FxHasher>;

/// Expiry instant `ttl` after `now`; a TTL past the clock's range never expires
#[inline]
fn expiry_after(now: Instant, ttl: Duration) -> Option<Instant> {
    now.checked_add(ttl)
}

/// A stored entry
#[derive(Debug, Clone)]
pub(crate) struct StoredEntry {
    value: Value,
    version: u64,
    /// Unix timestamp (seconds) of the last write
    timestamp: i64,
    expires_at: Option<Instant>,
}

impl StoredEntry {
    fn new(value: Value, version: u64, expires_at: Option<Instant>) -> Self {
        Self {
            value,
            version,
            timestamp: Utc::now().timestamp(),
            expires_at,
        }
    }

    #[inline]
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(at) if at <= now)
    }

    fn ttl(&self, now: Instant) -> Ttl {
        match self.expires_at {
            None => Ttl::Persistent,
            Some(at) if at <= now => Ttl::Missing,
            Some(at) => Ttl::Remaining(at - now),
        }
    }
}

/// Snapshot of a live entry returned by [`ShardedStore::get_versioned`]
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedEntry {
    /// Current value
    pub value: Value,
    /// Store version of the last mutation
    pub version: u64,
    /// Unix timestamp (seconds) of the last write
    pub timestamp: i64,
    /// Remaining lifetime at read time
    pub ttl: Ttl,
}

impl VersionedEntry {
    /// Wall-clock time of the last write
    pub fn written_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

/// Sharded in-memory store implementing [`StoreAdapter`]
///
/// # Thread Safety
///
/// All operations are thread-safe:
/// - get()/ttl(): Lock-free read via DashMap
/// - set()/expire(): Only locks the target key's shard
/// - Watched commits validate and apply under the same shard lock
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use watchtx_core::{Ttl, WatchedKey};
/// use watchtx_storage::ShardedStore;
///
/// let store = ShardedStore::new();
/// let key = WatchedKey::new("key").unwrap();
/// store.set_with_ttl(&key, "old value", Duration::from_secs(60));
/// assert!(matches!(store.ttl(&key), Ttl::Remaining(_)));
/// ```
pub struct ShardedStore {
    entries: DashMap<String, StoredEntry, FxBuildHasher>,
    /// Global version, bumped once per mutation
    version: AtomicU64,
}

impl ShardedStore {
    /// Create new sharded store
    pub fn new() -> Self {
        Self {
            entries: DashMap::with_hasher(FxBuildHasher::default()),
            version: AtomicU64::new(0),
        }
    }

    /// Create with expected number of keys
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: DashMap::with_capacity_and_hasher(capacity, FxBuildHasher::default()),
            version: AtomicU64::new(0),
        }
    }

    /// Get current version
    #[inline]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Increment version and return new value
    #[inline]
    fn next_version(&self) -> u64 {
        self.version.fetch_add(1, Ordering::AcqRel) + 1
    }

    // ========================================================================
    // Plain commands
    // ========================================================================

    /// Set a value with no expiration
    ///
    /// Clears any TTL the key had. Returns the new version.
    pub fn set(&self, key: &WatchedKey, value: impl Into<Value>) -> u64 {
        self.write(key, value.into(), None)
    }

    /// Set a value that expires after `ttl`
    ///
    /// A `ttl` too large to represent leaves the key without expiration.
    pub fn set_with_ttl(&self, key: &WatchedKey, value: impl Into<Value>, ttl: Duration) -> u64 {
        self.write(key, value.into(), expiry_after(Instant::now(), ttl))
    }

    fn write(&self, key: &WatchedKey, value: Value, expires_at: Option<Instant>) -> u64 {
        let version = self.next_version();
        self.entries.insert(
            key.as_str().to_string(),
            StoredEntry::new(value, version, expires_at),
        );
        version
    }

    /// Get the live value for a key
    #[inline]
    pub fn get(&self, key: &WatchedKey) -> Option<Value> {
        let now = Instant::now();
        self.entries
            .get(key.as_str())
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone())
    }

    /// Get the live value together with its version, timestamp and TTL
    pub fn get_versioned(&self, key: &WatchedKey) -> Option<VersionedEntry> {
        let now = Instant::now();
        self.entries
            .get(key.as_str())
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| VersionedEntry {
                value: entry.value.clone(),
                version: entry.version,
                timestamp: entry.timestamp,
                ttl: entry.ttl(now),
            })
    }

    /// Remaining lifetime of a key
    pub fn ttl(&self, key: &WatchedKey) -> Ttl {
        let now = Instant::now();
        self.entries
            .get(key.as_str())
            .map(|entry| entry.ttl(now))
            .unwrap_or(Ttl::Missing)
    }

    /// Remaining lifetime as a `PTTL` integer reply
    pub fn pttl(&self, key: &WatchedKey) -> i64 {
        self.ttl(key).as_millis_reply()
    }

    /// Set a key's expiration
    ///
    /// Returns false if the key does not exist.
    pub fn expire(&self, key: &WatchedKey, ttl: Duration) -> bool {
        self.update_expiry(key, expiry_after(Instant::now(), ttl))
    }

    /// Remove a key's expiration
    ///
    /// Returns false if the key does not exist or already had no expiration.
    pub fn persist(&self, key: &WatchedKey) -> bool {
        let now = Instant::now();
        match self.entries.get_mut(key.as_str()) {
            Some(mut entry) if !entry.is_expired(now) && entry.expires_at.is_some() => {
                entry.expires_at = None;
                entry.version = self.next_version();
                true
            }
            _ => false,
        }
    }

    fn update_expiry(&self, key: &WatchedKey, expires_at: Option<Instant>) -> bool {
        let now = Instant::now();
        match self.entries.get_mut(key.as_str()) {
            Some(mut entry) if !entry.is_expired(now) => {
                entry.expires_at = expires_at;
                entry.version = self.next_version();
                true
            }
            _ => false,
        }
    }

    /// Delete a key
    ///
    /// Returns true if a live entry was removed.
    pub fn delete(&self, key: &WatchedKey) -> bool {
        let now = Instant::now();
        self.entries
            .remove(key.as_str())
            .map(|(_, entry)| !entry.is_expired(now))
            .unwrap_or(false)
    }

    /// Check if a live entry exists
    #[inline]
    pub fn exists(&self, key: &WatchedKey) -> bool {
        let now = Instant::now();
        self.entries
            .get(key.as_str())
            .map(|entry| !entry.is_expired(now))
            .unwrap_or(false)
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .iter()
            .filter(|entry| !entry.value().is_expired(now))
            .count()
    }

    /// Check if the store holds no live entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Physically remove expired entries
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    // ========================================================================
    // Watch support
    // ========================================================================

    /// Live version of a key, `None` if absent or expired
    pub(crate) fn live_version(&self, key: &WatchedKey) -> Option<u64> {
        let now = Instant::now();
        self.entries
            .get(key.as_str())
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.version)
    }

    /// Apply a batch if the key's live version still equals `watched`
    ///
    /// Validation and both writes (value, then expiration) happen under the
    /// key's shard lock, so no reader observes one without the other.
    pub(crate) fn commit_watched(&self, watched: Option<u64>, batch: AtomicBatch) -> Result<u64> {
        let now = Instant::now();
        let expires_at = match batch.ttl {
            Ttl::Remaining(d) => expiry_after(now, d),
            Ttl::Persistent | Ttl::Missing => None,
        };

        match self.entries.entry(batch.key.as_str().to_string()) {
            Entry::Occupied(mut occupied) => {
                let current = (!occupied.get().is_expired(now)).then(|| occupied.get().version);
                if current != watched {
                    return Err(Error::conflict(batch.key.into_string()));
                }
                let version = self.next_version();
                let entry = occupied.get_mut();
                entry.value = batch.value;
                entry.version = version;
                entry.timestamp = Utc::now().timestamp();
                entry.expires_at = expires_at;
                Ok(version)
            }
            Entry::Vacant(vacant) => {
                if watched.is_some() {
                    return Err(Error::conflict(batch.key.into_string()));
                }
                let version = self.next_version();
                vacant.insert(StoredEntry::new(batch.value, version, expires_at));
                Ok(version)
            }
        }
    }
}

impl Default for ShardedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ShardedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardedStore")
            .field("version", &self.version())
            .field("total_entries", &self.entries.len())
            .finish()
    }
}

impl StoreAdapter for ShardedStore {
    fn get_ttl(&self, key: &WatchedKey) -> Result<Ttl> {
        Ok(self.ttl(key))
    }

    fn get(&self, key: &WatchedKey) -> Result<Option<Value>> {
        Ok(ShardedStore::get(self, key))
    }

    fn run_watched(
        &self,
        key: &WatchedKey,
        cancel: &CancelSignal,
        body: &mut dyn FnMut(&mut dyn WatchScope) -> Result<()>,
    ) -> Result<()> {
        cancel.check()?;
        let watched = self.live_version(key);
        tracing::trace!(key = %key, watched_version = ?watched, "watch established");

        let mut scope = ShardedWatchScope::new(self, key, cancel);
        body(&mut scope)?;

        match scope.into_batch() {
            Some(batch) => {
                // Last point at which a tripped signal can still stop the write
                cancel.check()?;
                let version = self.commit_watched(watched, batch)?;
                tracing::trace!(key = %key, version, "watched batch committed");
                Ok(())
            }
            // Nothing queued: the watch is simply released
            None => Ok(()),
        }
    }
}
