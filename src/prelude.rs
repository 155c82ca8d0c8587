//! Convenient imports for WatchTx.
//!
//! ```ignore
//! use watchtx::prelude::*;
//!
//! let tx = WatchTx::in_memory();
//! tx.replace_keep_ttl("key", "value");
//! ```

// Main entry point
pub use crate::client::{WatchTx, WatchTxBuilder};
pub use crate::config::Config;

// Error handling
pub use crate::error::{Error, Result};

// Transactions
pub use watchtx_concurrency::{
    from_fn, replace_with, Backoff, CancelSignal, CommitInfo, Outcome, RetryPolicy, Transform,
};

// Core types
pub use watchtx_core::{StoreAdapter, Ttl, Value, WatchedKey};
pub use watchtx_storage::ShardedStore;

pub use std::time::Duration;
