//! Background expiry sweeper
//!
//! Reads already hide expired entries; the cleaner only reclaims their
//! memory. It runs on a dedicated thread and stops when dropped.

use crate::sharded::ShardedStore;
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

struct Shutdown {
    stopped: Mutex<bool>,
    signal: Condvar,
}

/// Periodically calls [`ShardedStore::purge_expired`]
pub struct TtlCleaner {
    shutdown: Arc<Shutdown>,
    handle: Option<JoinHandle<()>>,
}

impl TtlCleaner {
    /// Spawn a cleaner that sweeps `store` every `interval`
    pub fn start(store: Arc<ShardedStore>, interval: Duration) -> Self {
        let shutdown = Arc::new(Shutdown {
            stopped: Mutex::new(false),
            signal: Condvar::new(),
        });

        let worker = Arc::clone(&shutdown);
        let handle = std::thread::Builder::new()
            .name("watchtx-ttl-cleaner".to_string())
            .spawn(move || {
                let mut stopped = worker.stopped.lock();
                while !*stopped {
                    worker.signal.wait_for(&mut stopped, interval);
                    if *stopped {
                        break;
                    }
                    let purged = MutexGuard::unlocked(&mut stopped, || store.purge_expired());
                    if purged > 0 {
                        tracing::debug!(purged, "expired entries purged");
                    }
                }
            })
            .ok();

        if handle.is_none() {
            tracing::warn!("failed to spawn TTL cleaner thread; expired entries stay until purged");
        }

        Self { shutdown, handle }
    }

    /// Check if the sweeper thread is running
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Stop the sweeper and wait for it to exit
    pub fn stop(mut self) {
        self.shutdown_and_join();
    }

    fn shutdown_and_join(&mut self) {
        *self.shutdown.stopped.lock() = true;
        self.shutdown.signal.notify_all();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TtlCleaner {
    fn drop(&mut self) {
        self.shutdown_and_join();
    }
}
