//! Configuration loading, environment overrides and validation.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use vinyl_tracker::collector::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT};
use vinyl_tracker::config::{Config, DEFAULT_BIND, DEFAULT_INPUT_FILE};

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn empty_document_uses_defaults() {
    let config = Config::from_toml_str("").unwrap();
    assert_eq!(config.scrape.input, PathBuf::from(DEFAULT_INPUT_FILE));
    assert_eq!(config.scrape.concurrency, 10);
    assert_eq!(config.scrape.timeout(), Duration::from_secs(30));
    assert_eq!(config.server.bind, DEFAULT_BIND);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, "pretty");
    assert_eq!(config.archive.current, PathBuf::from("records.json"));
    assert_eq!(config.archive.history, PathBuf::from("history.json"));
    config.validate().unwrap();
}

#[test]
fn scrape_defaults_match_collector_defaults() {
    let config = Config::default();
    assert_eq!(config.scrape.concurrency, DEFAULT_CONCURRENCY);
    assert_eq!(config.scrape.timeout(), DEFAULT_TIMEOUT);

    let built = vinyl_tracker::VinylTracker::builder().in_memory().build().unwrap();
    let from_config = vinyl_tracker::VinylTrackerBuilder::from_config(&Config {
        database: vinyl_tracker::config::DatabaseConfig {
            path: ":memory:".into(),
        },
        ..Config::default()
    })
    .build()
    .unwrap();
    assert_eq!(built.to_string(), from_config.to_string());
}

#[test]
fn partial_sections_keep_other_defaults() {
    let config = Config::from_toml_str(
        r#"
        [database]
        path = "/var/lib/vinyl/records.duckdb"

        [scrape]
        concurrency = 4
        "#,
    )
    .unwrap();

    assert_eq!(config.database.path, PathBuf::from("/var/lib/vinyl/records.duckdb"));
    assert_eq!(config.scrape.concurrency, 4);
    assert_eq!(config.scrape.timeout_secs, 30);
    assert_eq!(config.server.bind, DEFAULT_BIND);
}

#[test]
fn full_document_parses() {
    let config = Config::from_toml_str(
        r#"
        [database]
        path = ":memory:"

        [scrape]
        input = "urls.txt"
        concurrency = 2
        timeout_secs = 5
        user_agent = "test-agent"

        [server]
        bind = "127.0.0.1:9000"

        [logging]
        level = "debug"
        format = "json"

        [archive]
        current = "out/current.json"
        history = "out/history.json"
        "#,
    )
    .unwrap();

    assert_eq!(config.scrape.user_agent, "test-agent");
    assert_eq!(config.scrape.timeout(), Duration::from_secs(5));
    assert_eq!(config.server.bind, "127.0.0.1:9000");
    assert_eq!(config.logging.format, "json");
    assert_eq!(config.archive.history, PathBuf::from("out/history.json"));
}

#[test]
fn malformed_document_is_config_error() {
    let err = Config::from_toml_str("[scrape\nconcurrency = ").unwrap_err();
    assert!(matches!(err, vinyl_tracker::TrackerError::Config(_)));
}

#[test]
fn wrong_type_is_config_error() {
    assert!(Config::from_toml_str("[scrape]\nconcurrency = \"many\"").is_err());
}

#[test]
fn env_overrides_file_values() {
    let mut config = Config::from_toml_str("[scrape]\nconcurrency = 4").unwrap();
    config
        .apply_env(env(&[
            ("VINYL_DB_PATH", "/tmp/x.duckdb"),
            ("VINYL_INPUT", "other.txt"),
            ("VINYL_CONCURRENCY", "16"),
            ("VINYL_TIMEOUT_SECS", "12"),
            ("VINYL_BIND", "127.0.0.1:1234"),
            ("VINYL_LOG_LEVEL", "warn"),
        ]))
        .unwrap();

    assert_eq!(config.database.path, PathBuf::from("/tmp/x.duckdb"));
    assert_eq!(config.scrape.input, PathBuf::from("other.txt"));
    assert_eq!(config.scrape.concurrency, 16);
    assert_eq!(config.scrape.timeout_secs, 12);
    assert_eq!(config.server.bind, "127.0.0.1:1234");
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn absent_env_leaves_values_alone() {
    let mut config = Config::from_toml_str("[scrape]\nconcurrency = 4").unwrap();
    config.apply_env(env(&[])).unwrap();
    assert_eq!(config.scrape.concurrency, 4);
}

#[test]
fn non_numeric_env_value_is_rejected() {
    let mut config = Config::default();
    let err = config
        .apply_env(env(&[("VINYL_CONCURRENCY", "lots")]))
        .unwrap_err();
    assert!(err.to_string().contains("VINYL_CONCURRENCY"));
}

#[test]
fn validate_rejects_zero_concurrency_and_timeout() {
    let mut config = Config::default();
    config.scrape.concurrency = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.scrape.timeout_secs = 0;
    assert!(config.validate().is_err());
}

#[test]
fn validate_rejects_empty_paths_and_bind() {
    let mut config = Config::default();
    config.database.path = PathBuf::new();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.server.bind = String::new();
    assert!(config.validate().is_err());
}

#[test]
fn load_reads_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vinyl.toml");
    std::fs::write(&path, "[server]\nbind = \"127.0.0.1:8123\"\n").unwrap();

    let config = Config::load(&path).unwrap();
    if std::env::var("VINYL_BIND").is_err() {
        assert_eq!(config.server.bind, "127.0.0.1:8123");
    }
}

#[test]
fn load_without_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(dir.path().join("absent.toml")).unwrap();
    assert!(config.scrape.concurrency >= 1);
}

#[test]
fn logging_init_is_repeatable() {
    let logging = vinyl_tracker::logging::LoggingConfig::default();
    logging.init();
    logging.init();
}
