//! # WatchTx
//!
//! TTL-preserving optimistic transactions over a key-value store.
//!
//! A watched transaction reads a key's remaining lifetime and value, computes
//! a new value, and writes value and lifetime back in one atomic batch. If
//! anything touched the key in between, the batch is discarded and the whole
//! cycle repeats, up to a bounded number of attempts.
//!
//! ## Quick Start
//!
//! ```ignore
//! use watchtx::prelude::*;
//!
//! let tx = WatchTx::in_memory();
//! let key = WatchedKey::new("session:42")?;
//! tx.store().set_with_ttl(&key, "old value", Duration::from_secs(60));
//!
//! match tx.replace_keep_ttl("session:42", "new value") {
//!     Outcome::Committed(info) => println!("committed on attempt {}", info.attempts),
//!     Outcome::ConflictExhausted { attempts, .. } => println!("gave up after {}", attempts),
//!     Outcome::Fatal(e) => return Err(e),
//! }
//! // The key still expires about 60 seconds after it was first set.
//! ```
//!
//! ## Layers
//!
//! - `watchtx-core` - keys, TTLs, values, errors and the [`StoreAdapter`] boundary
//! - `watchtx-storage` - the in-memory [`ShardedStore`] backend
//! - `watchtx-concurrency` - the [`TransactionExecutor`] retry loop
//! - this crate - the [`WatchTx`] client and TOML [`Config`]

#![warn(missing_docs)]

mod client;
mod config;
mod error;

pub mod prelude;

pub use client::{WatchTx, WatchTxBuilder};
pub use config::{Config, LoggingConfig, StoreConfig};
pub use error::{ConfigError, Error, Result};

pub use watchtx_concurrency::{
    from_fn, replace_with, Backoff, CancelSignal, CommitInfo, ExecutorMetrics, Outcome, Replace,
    RetryPolicy, TransactionExecutor, Transform, DEFAULT_MAX_ATTEMPTS,
};
pub use watchtx_core::{AtomicBatch, StoreAdapter, Ttl, Value, WatchScope, WatchedKey};
pub use watchtx_storage::{ShardedStore, TtlCleaner, VersionedEntry};
