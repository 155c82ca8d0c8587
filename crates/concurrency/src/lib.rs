//! Concurrency layer for watchtx
//!
//! This crate implements optimistic read-modify-write with:
//! - TransactionExecutor: watch/read/transform/write loop with bounded retry
//! - RetryPolicy: attempt bound plus pluggable backoff and jitter
//! - CancelSignal (re-exported from watchtx-core): caller cancellation and deadlines
//! - Outcome: Committed, ConflictExhausted or Fatal
//! - Transform: the value function applied inside the watch

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod executor;
pub mod metrics;
pub mod outcome;
pub mod retry;
pub mod transform;

pub use executor::TransactionExecutor;
pub use metrics::ExecutorMetrics;
pub use outcome::{CommitInfo, Outcome};
pub use retry::{Backoff, RetryPolicy, DEFAULT_MAX_ATTEMPTS};
pub use transform::{from_fn, replace_with, Replace, Transform};
pub use watchtx_core::CancelSignal;
