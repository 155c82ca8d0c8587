//! Building clients from TOML configuration files.

use std::io::Write;
use watchtx::{Backoff, Config, ConfigError, WatchTx};

#[test]
fn client_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
        [retry]
        max_attempts = 7

        [retry.backoff]
        kind = "exponential"
        base_delay_ms = 2
        max_delay_ms = 50

        [logging]
        level = "warn"
        "#
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    let tx = WatchTx::from_config_in_memory(&config).unwrap();

    assert_eq!(tx.retry_policy().max_attempts, 7);
    assert_eq!(
        tx.retry_policy().backoff,
        Backoff::Exponential {
            base_delay_ms: 2,
            max_delay_ms: 50
        }
    );
    assert!(!tx.has_cleaner());
    assert!(tx.replace_keep_ttl("key", "value").is_committed());
}

#[test]
fn invalid_config_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("watchtx.toml");
    std::fs::write(&path, "[retry]\nmax_attempts = 0\n").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn malformed_config_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("watchtx.toml");
    std::fs::write(&path, "[retry\nmax_attempts = ").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}
