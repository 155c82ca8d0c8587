//! TOML configuration.
//!
//! Every field has a default, so an empty file is a valid configuration.
//!
//! ```toml
//! [retry]
//! max_attempts = 5
//! jitter = false
//!
//! [retry.backoff]
//! kind = "exponential"
//! base_delay_ms = 5
//! max_delay_ms = 100
//!
//! [logging]
//! level = "info"
//!
//! [store]
//! cleanup_interval_ms = 1000
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use watchtx_concurrency::RetryPolicy;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Retry policy for the transaction executor
    pub retry: RetryPolicy,
    /// Log filter settings
    pub logging: LoggingConfig,
    /// In-memory store settings
    pub store: StoreConfig,
}

/// Log filter settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset (e.g. `info`,
    /// `watchtx_concurrency=debug`)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// In-memory store settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Sweep interval for the background TTL cleaner; no cleaner when unset
    pub cleanup_interval_ms: Option<u64>,
}

impl StoreConfig {
    /// The cleaner interval, if configured
    pub fn cleanup_interval(&self) -> Option<Duration> {
        self.cleanup_interval_ms.map(Duration::from_millis)
    }
}

impl Config {
    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.retry
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("retry: {}", e)))?;
        if self.store.cleanup_interval_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "store.cleanup_interval_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
