//! Core types for optimistic read-modify-write
//!
//! This module defines the fundamental types used throughout the system:
//! - [`WatchedKey`]: Identifier of the value under optimistic control
//! - [`Ttl`]: Remaining lifetime of a key, including the "no expiration" and
//!   "absent" sentinels

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Identifier of a key under optimistic control
///
/// A WatchedKey is always non-empty. It is passed by reference into every
/// adapter call and never mutated for the duration of a transaction.
///
/// # Examples
///
/// ```
/// use watchtx_core::types::WatchedKey;
///
/// let key = WatchedKey::new("session:42").unwrap();
/// assert_eq!(key.as_str(), "session:42");
/// assert!(WatchedKey::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct WatchedKey(String);

impl WatchedKey {
    /// Create a key, rejecting the empty string
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(Error::InvalidKey("key must not be empty".to_string()));
        }
        Ok(WatchedKey(key))
    }

    /// Borrow the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the key, returning the owned string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for WatchedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for WatchedKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for WatchedKey {
    type Error = Error;

    fn try_from(key: &str) -> Result<Self> {
        WatchedKey::new(key)
    }
}

impl TryFrom<String> for WatchedKey {
    type Error = Error;

    fn try_from(key: String) -> Result<Self> {
        WatchedKey::new(key)
    }
}

/// Remaining lifetime of a key
///
/// Both sentinels are valid TTLs that a transaction carries forward into its
/// write; neither is an error.
///
/// ## Integer reply convention
///
/// | Reply | Meaning |
/// |-------|---------|
/// | `n >= 0` | `n` seconds (or milliseconds for `PTTL`) remaining |
/// | `-1` | Key exists with no expiration |
/// | `-2` | Key does not exist |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ttl {
    /// Key expires after this duration
    Remaining(Duration),
    /// Key exists and never expires
    Persistent,
    /// Key does not exist
    Missing,
}

impl Ttl {
    /// Integer reply for a key without expiration
    pub const PERSISTENT_REPLY: i64 = -1;

    /// Integer reply for an absent key
    pub const MISSING_REPLY: i64 = -2;

    /// Largest whole-second TTL whose `PTTL` reply fits an `i64`
    pub const MAX_SECS: u64 = i64::MAX as u64 / 1000;

    /// Shorthand for `Ttl::Remaining(Duration::from_secs(secs))`
    pub fn from_secs(secs: u64) -> Self {
        Ttl::Remaining(Duration::from_secs(secs))
    }

    /// Decode a `TTL` integer reply (seconds)
    pub fn from_secs_reply(reply: i64) -> Result<Self> {
        Self::from_reply(reply, |n| Duration::from_secs(n as u64))
    }

    /// Decode a `PTTL` integer reply (milliseconds)
    pub fn from_millis_reply(reply: i64) -> Result<Self> {
        Self::from_reply(reply, |n| Duration::from_millis(n as u64))
    }

    fn from_reply(reply: i64, unit: impl Fn(i64) -> Duration) -> Result<Self> {
        match reply {
            Self::PERSISTENT_REPLY => Ok(Ttl::Persistent),
            Self::MISSING_REPLY => Ok(Ttl::Missing),
            n if n >= 0 => Ok(Ttl::Remaining(unit(n))),
            n => Err(Error::Backend(format!("invalid TTL reply: {}", n))),
        }
    }

    /// Encode as a `TTL` integer reply, rounding to the nearest second
    ///
    /// Saturates at `i64::MAX`.
    pub fn as_secs_reply(&self) -> i64 {
        match self {
            Ttl::Remaining(d) => i64::try_from((d.as_millis() + 500) / 1000).unwrap_or(i64::MAX),
            Ttl::Persistent => Self::PERSISTENT_REPLY,
            Ttl::Missing => Self::MISSING_REPLY,
        }
    }

    /// Encode as a `PTTL` integer reply
    ///
    /// Saturates at `i64::MAX`.
    pub fn as_millis_reply(&self) -> i64 {
        match self {
            Ttl::Remaining(d) => i64::try_from(d.as_millis()).unwrap_or(i64::MAX),
            Ttl::Persistent => Self::PERSISTENT_REPLY,
            Ttl::Missing => Self::MISSING_REPLY,
        }
    }

    /// The remaining duration, if the key expires
    pub fn remaining(&self) -> Option<Duration> {
        match self {
            Ttl::Remaining(d) => Some(*d),
            _ => None,
        }
    }

    /// Check if the key exists without expiration
    pub fn is_persistent(&self) -> bool {
        matches!(self, Ttl::Persistent)
    }

    /// Check if the key was absent
    pub fn is_missing(&self) -> bool {
        matches!(self, Ttl::Missing)
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ttl::Remaining(d) => write!(f, "{:?}", d),
            Ttl::Persistent => write!(f, "persistent"),
            Ttl::Missing => write!(f, "missing"),
        }
    }
}
