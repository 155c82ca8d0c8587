//! clap command definition for `watchtx`.

use clap::{Arg, ArgAction, Command};
use watchtx::Ttl;

/// Build the top-level command.
pub fn build_cli() -> Command {
    Command::new("watchtx")
        .about("Replace a key's value without losing its TTL")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("key")
                .long("key")
                .default_value("key")
                .help("Key to seed and rewrite"),
        )
        .arg(
            Arg::new("initial")
                .long("initial")
                .default_value("old value")
                .help("Value seeded before the transaction"),
        )
        .arg(
            Arg::new("value")
                .long("value")
                .default_value("new value")
                .help("Value written by the transaction"),
        )
        .arg(
            Arg::new("ttl-secs")
                .long("ttl-secs")
                .value_parser(clap::value_parser!(u64).range(0..=Ttl::MAX_SECS))
                .default_value("60")
                .help("TTL of the seeded key in seconds (0 = no expiration)"),
        )
        .arg(
            Arg::new("max-attempts")
                .long("max-attempts")
                .value_parser(clap::value_parser!(usize))
                .help("Maximum attempts, overriding the config file"),
        )
        .arg(
            Arg::new("backoff-ms")
                .long("backoff-ms")
                .value_parser(clap::value_parser!(u64))
                .help("Fixed delay between conflicted attempts, overriding the config file"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Path to a TOML config file"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .help("Log filter used when RUST_LOG is unset (default: from config)"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print the report as JSON"),
        )
}
