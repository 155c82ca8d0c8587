//! Error types for watchtx.
//!
//! Transaction and store failures use the tagged [`Error`] from
//! `watchtx-core`. Loading configuration has its own [`ConfigError`].

use std::path::PathBuf;
use thiserror::Error;

pub use watchtx_core::{Error, Result};

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML or has unknown fields
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration parsed but describes an unusable setup
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::InvalidArgument(e.to_string())
    }
}
