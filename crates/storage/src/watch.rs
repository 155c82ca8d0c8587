//! Watch scope handed to the body of a watched transaction
//!
//! Reads go straight to the store; the single batch is held here until the
//! body returns and [`ShardedStore`](crate::ShardedStore) validates and
//! applies it.

use crate::sharded::ShardedStore;
use watchtx_core::{AtomicBatch, CancelSignal, Error, Result, Ttl, Value, WatchScope, WatchedKey};

/// [`WatchScope`] implementation for [`ShardedStore`]
pub struct ShardedWatchScope<'a> {
    store: &'a ShardedStore,
    key: &'a WatchedKey,
    cancel: &'a CancelSignal,
    batch: Option<AtomicBatch>,
}

impl<'a> ShardedWatchScope<'a> {
    pub(crate) fn new(
        store: &'a ShardedStore,
        key: &'a WatchedKey,
        cancel: &'a CancelSignal,
    ) -> Self {
        Self {
            store,
            key,
            cancel,
            batch: None,
        }
    }

    /// The queued batch, if the body issued one
    pub(crate) fn into_batch(self) -> Option<AtomicBatch> {
        self.batch
    }
}

impl WatchScope for ShardedWatchScope<'_> {
    fn key(&self) -> &WatchedKey {
        self.key
    }

    fn cancel(&self) -> &CancelSignal {
        self.cancel
    }

    fn get_ttl(&mut self) -> Result<Ttl> {
        self.cancel.check()?;
        Ok(self.store.ttl(self.key))
    }

    fn get(&mut self) -> Result<Option<Value>> {
        self.cancel.check()?;
        Ok(self.store.get(self.key))
    }

    fn atomic_batch(&mut self, batch: AtomicBatch) -> Result<()> {
        self.cancel.check()?;
        if &batch.key != self.key {
            return Err(Error::InvalidArgument(format!(
                "batch targets '{}' but the watch is on '{}'",
                batch.key, self.key
            )));
        }
        if self.batch.is_some() {
            return Err(Error::InvalidArgument(
                "a watched transaction accepts a single batch".to_string(),
            ));
        }
        self.batch = Some(batch);
        Ok(())
    }
}
