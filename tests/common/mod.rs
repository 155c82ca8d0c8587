//! Shared test utilities for integration tests.
//!
//! [`InterferingStore`] wraps a real [`ShardedStore`] and lets a test play
//! the "other client": it can write the watched key inside an attempt's
//! watch window, fail an attempt's TTL read with a backend error, or make
//! every TTL read wait on a slow reply.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use watchtx::{
    AtomicBatch, CancelSignal, Error, Result, ShardedStore, StoreAdapter, Ttl, Value, WatchScope,
    WatchedKey,
};

/// Build a key, panicking on invalid input.
pub fn key(name: &str) -> WatchedKey {
    WatchedKey::new(name).unwrap()
}

/// A fresh store holding `name = value` with the given TTL.
pub fn seeded_store(name: &str, value: impl Into<Value>, ttl: Duration) -> Arc<ShardedStore> {
    let store = Arc::new(ShardedStore::new());
    store.set_with_ttl(&key(name), value, ttl);
    store
}

/// Assert that `actual` is within one second below `expected`.
pub fn assert_ttl_close(actual: Ttl, expected: Ttl) {
    match (actual.remaining(), expected.remaining()) {
        (Some(a), Some(e)) => {
            assert!(a <= e, "ttl grew: {:?} > {:?}", a, e);
            assert!(
                e - a < Duration::from_secs(1),
                "ttl shrank too much: {:?} vs {:?}",
                a,
                e
            );
        }
        _ => assert_eq!(actual, expected),
    }
}

/// When the intruder writes
#[derive(Debug, Clone)]
pub enum Interference {
    /// Never
    None,
    /// Inside the watch window of the listed attempts (1-based)
    OnAttempts(BTreeSet<usize>),
    /// Inside every attempt's watch window
    Always,
}

impl Interference {
    fn hits(&self, attempt: usize) -> bool {
        match self {
            Interference::None => false,
            Interference::OnAttempts(attempts) => attempts.contains(&attempt),
            Interference::Always => true,
        }
    }
}

/// Store adapter that injects concurrent writes and backend faults
pub struct InterferingStore {
    inner: Arc<ShardedStore>,
    interference: Interference,
    intruder_ttl: Option<Duration>,
    fail_ttl_on: Option<usize>,
    ttl_latency: Option<Duration>,
    attempts: AtomicUsize,
    intrusions: AtomicUsize,
    ttl_reads: Mutex<Vec<Ttl>>,
}

impl InterferingStore {
    pub fn new(inner: Arc<ShardedStore>) -> Self {
        Self {
            inner,
            interference: Interference::None,
            intruder_ttl: None,
            fail_ttl_on: None,
            ttl_latency: None,
            attempts: AtomicUsize::new(0),
            intrusions: AtomicUsize::new(0),
            ttl_reads: Mutex::new(Vec::new()),
        }
    }

    /// Write the key inside the watch window of each listed attempt
    pub fn interfere_on(mut self, attempts: impl IntoIterator<Item = usize>) -> Self {
        self.interference = Interference::OnAttempts(attempts.into_iter().collect());
        self
    }

    /// Write the key inside every attempt's watch window
    pub fn interfere_always(mut self) -> Self {
        self.interference = Interference::Always;
        self
    }

    /// TTL the intruder gives the key (no expiration if unset)
    pub fn intruder_ttl(mut self, ttl: Duration) -> Self {
        self.intruder_ttl = Some(ttl);
        self
    }

    /// Fail the TTL read of the given attempt with a backend error
    pub fn fail_ttl_on(mut self, attempt: usize) -> Self {
        self.fail_ttl_on = Some(attempt);
        self
    }

    /// Delay every TTL reply by `latency`, waking early when the run is cancelled
    pub fn slow_ttl(mut self, latency: Duration) -> Self {
        self.ttl_latency = Some(latency);
        self
    }

    pub fn inner(&self) -> &Arc<ShardedStore> {
        &self.inner
    }

    /// Number of watched attempts started
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Number of intruding writes performed
    pub fn intrusions(&self) -> usize {
        self.intrusions.load(Ordering::SeqCst)
    }

    /// TTLs observed by each attempt, in order
    pub fn ttl_reads(&self) -> Vec<Ttl> {
        self.ttl_reads.lock().clone()
    }

    fn intrude(&self, key: &WatchedKey) {
        let n = self.intrusions.fetch_add(1, Ordering::SeqCst) + 1;
        let value = format!("intruder {}", n);
        match self.intruder_ttl {
            Some(ttl) => {
                self.inner.set_with_ttl(key, value, ttl);
            }
            None => {
                self.inner.set(key, value);
            }
        }
    }
}

impl StoreAdapter for InterferingStore {
    fn get_ttl(&self, key: &WatchedKey) -> Result<Ttl> {
        StoreAdapter::get_ttl(self.inner.as_ref(), key)
    }

    fn get(&self, key: &WatchedKey) -> Result<Option<Value>> {
        StoreAdapter::get(self.inner.as_ref(), key)
    }

    fn run_watched(
        &self,
        key: &WatchedKey,
        cancel: &CancelSignal,
        body: &mut dyn FnMut(&mut dyn WatchScope) -> Result<()>,
    ) -> Result<()> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.run_watched(key, cancel, &mut |scope| {
            // The watch is already established, so this write invalidates it
            if self.interference.hits(attempt) {
                self.intrude(key);
            }
            let mut faulty = FaultyScope {
                inner: scope,
                fail_ttl: self.fail_ttl_on == Some(attempt),
                ttl_latency: self.ttl_latency,
                ttl_reads: &self.ttl_reads,
            };
            body(&mut faulty)
        })
    }
}

struct FaultyScope<'a> {
    inner: &'a mut dyn WatchScope,
    fail_ttl: bool,
    ttl_latency: Option<Duration>,
    ttl_reads: &'a Mutex<Vec<Ttl>>,
}

impl WatchScope for FaultyScope<'_> {
    fn key(&self) -> &WatchedKey {
        self.inner.key()
    }

    fn cancel(&self) -> &CancelSignal {
        self.inner.cancel()
    }

    fn get_ttl(&mut self) -> Result<Ttl> {
        if self.fail_ttl {
            return Err(Error::Backend("connection reset by peer".to_string()));
        }
        if let Some(latency) = self.ttl_latency {
            self.inner.cancel().sleep(latency)?;
        }
        let ttl = self.inner.get_ttl()?;
        self.ttl_reads.lock().push(ttl);
        Ok(ttl)
    }

    fn get(&mut self) -> Result<Option<Value>> {
        self.inner.get()
    }

    fn atomic_batch(&mut self, batch: AtomicBatch) -> Result<()> {
        self.inner.atomic_batch(batch)
    }
}
