//! Watched transaction integration tests
//!
//! End-to-end runs of the executor against the in-memory store, with
//! injected interference and faults.

#[path = "../common/mod.rs"]
mod common;

mod atomicity;
mod cancellation;
mod config;
mod properties;
