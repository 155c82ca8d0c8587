//! watchtx CLI: seeds a key with a TTL, rewrites it inside a watched
//! transaction and reports the TTL on both sides of the write.
//!
//! Exit status is 0 when the transaction committed, 2 when every attempt
//! conflicted and 1 on any other failure.

mod commands;
mod format;
mod parse;

use std::process;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use watchtx::{Config, WatchTx, WatchedKey};

use commands::build_cli;
use format::{format_report, OutputMode, Report};
use parse::{load_config, matches_to_args, DemoArgs};

fn main() {
    let matches = build_cli().get_matches();

    let config = match load_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:#}", e);
            process::exit(1);
        }
    };
    init_logging(&config);

    let args = matches_to_args(&matches);
    let mode = if args.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    match run_demo(&config, &args) {
        Ok(report) => {
            println!("{}", format_report(&report, mode));
            process::exit(report.exit_code());
        }
        Err(e) => {
            eprintln!("{:#}", e);
            process::exit(1);
        }
    }
}

/// Log to stderr. `RUST_LOG` wins over the configured level.
fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run_demo(config: &Config, args: &DemoArgs) -> anyhow::Result<Report> {
    let tx = WatchTx::from_config_in_memory(config).context("building client")?;
    let key = WatchedKey::new(args.key.as_str()).context("invalid --key")?;

    if args.ttl_secs == 0 {
        tx.store().set(&key, args.initial.as_str());
    } else {
        tx.store().set_with_ttl(
            &key,
            args.initial.as_str(),
            Duration::from_secs(args.ttl_secs),
        );
    }
    let ttl_before = tx.store().ttl(&key);
    tracing::info!(key = %key, ttl = %ttl_before, "seeded key");

    let outcome = tx.replace_keep_ttl(key.as_str(), args.value.as_str());
    let entry = tx.store().get_versioned(&key);

    Ok(Report {
        key: args.key.clone(),
        ttl_before,
        ttl_after: tx.store().ttl(&key),
        version_after: entry.as_ref().map(|e| e.version),
        written_at: entry.as_ref().and_then(|e| e.written_at()),
        value_after: entry.map(|e| e.value),
        outcome,
    })
}
