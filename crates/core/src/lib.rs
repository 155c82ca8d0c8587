//! Core types and traits for watchtx
//!
//! This crate defines the foundational types shared by every layer:
//! - WatchedKey: Identifier of the value under optimistic control
//! - Ttl: Remaining lifetime with "persistent" and "missing" sentinels
//! - Value: Value stored under a key
//! - Error: Tagged error taxonomy (conflict vs. fatal)
//! - Traits: Store adapter boundary (StoreAdapter, WatchScope)
//! - CancelSignal: Cancellation and deadlines shared with adapters

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cancel;
pub mod error;
pub mod traits;
pub mod types;
pub mod value;

pub use cancel::CancelSignal;
pub use error::{Error, Result};
pub use traits::{AtomicBatch, StoreAdapter, WatchScope};
pub use types::{Ttl, WatchedKey};
pub use value::Value;
