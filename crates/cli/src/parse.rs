//! ArgMatches → DemoArgs conversion, and config overrides.

use anyhow::Context;
use clap::ArgMatches;
use watchtx::{Backoff, Config};

/// Parsed arguments of one demo run.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoArgs {
    pub key: String,
    pub initial: String,
    pub value: String,
    pub ttl_secs: u64,
    pub json: bool,
}

/// Convert clap ArgMatches into DemoArgs.
pub fn matches_to_args(matches: &ArgMatches) -> DemoArgs {
    let string = |id: &str| matches.get_one::<String>(id).cloned().unwrap_or_default();
    DemoArgs {
        key: string("key"),
        initial: string("initial"),
        value: string("value"),
        ttl_secs: matches.get_one::<u64>("ttl-secs").copied().unwrap_or(0),
        json: matches.get_flag("json"),
    }
}

/// Load the config file, if any, and apply command-line overrides.
pub fn load_config(matches: &ArgMatches) -> anyhow::Result<Config> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::load(path).with_context(|| format!("loading {}", path))?,
        None => Config::default(),
    };

    if let Some(&max_attempts) = matches.get_one::<usize>("max-attempts") {
        config.retry.max_attempts = max_attempts;
    }
    if let Some(&delay_ms) = matches.get_one::<u64>("backoff-ms") {
        config.retry.backoff = Backoff::Fixed { delay_ms };
    }
    if let Some(level) = matches.get_one::<String>("log-level") {
        config.logging.level = level.clone();
    }

    config.validate().context("invalid settings")?;
    Ok(config)
}
