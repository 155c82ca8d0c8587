//! Storage layer for watchtx
//!
//! This crate implements the in-memory backend with:
//! - ShardedStore: DashMap-based storage with per-key versions and expiry
//! - ShardedWatchScope: watch handle validating batches at commit
//! - TtlCleaner: background sweeper for expired entries

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cleaner;
pub mod sharded;
pub mod watch;

pub use cleaner::TtlCleaner;
pub use sharded::{ShardedStore, VersionedEntry};
pub use watch::ShardedWatchScope;
