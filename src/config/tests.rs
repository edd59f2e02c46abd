//! Configuration tests
//!
//! Guard the file format (everything `to_toml` writes must parse back) and
//! the env > file > default precedence.

use super::logging::LogRotation;
use super::*;
use crate::controller::WritePolicy;
use crate::notify::DismissPolicy;
use std::collections::HashMap;
use std::time::Duration;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

fn no_env() -> impl Fn(&str) -> Option<String> {
    env_from(&[])
}

// ─────────────────────────────────────────────────────────────────────────────
// Round-trip tests
// ─────────────────────────────────────────────────────────────────────────────

/// Verify that the default template parses and yields the defaults again
#[test]
fn test_config_roundtrip_default() {
    let toml_str = Config::default().to_toml();

    let parsed: FileConfig = toml::from_str(&toml_str)
        .unwrap_or_else(|e| panic!("Default config should parse.\nTOML:\n{}\nError: {}", toml_str, e));
    let config = Config::from_sources(parsed, no_env());

    assert_eq!(config.api_url, DEFAULT_API_URL);
    assert_eq!(config.request_timeout_secs, 30);
    assert_eq!(config.write_policy, WritePolicy::LastResponseWins);
    assert_eq!(config.notifications, NotificationsConfig::default());
    assert_eq!(config.notifications.dismiss_policy, DismissPolicy::Current);
    assert_eq!(config.logging.file_rotation, LogRotation::Daily);
}

/// Non-default values survive serialization
#[test]
fn test_config_roundtrip_custom_values() {
    let mut config = Config::default();
    config.api_url = "https://access.internal:8443".to_string();
    config.request_timeout_secs = 0;
    config.write_policy = WritePolicy::CancelInFlight;
    config.notifications.dismiss_after_ms = 2500;
    config.notifications.dismiss_policy = DismissPolicy::Keyed;
    config.logging.file_enabled = true;
    config.logging.file_rotation = LogRotation::Hourly;

    let parsed: FileConfig = toml::from_str(&config.to_toml()).unwrap();
    let reloaded = Config::from_sources(parsed, no_env());

    assert_eq!(reloaded.api_url, "https://access.internal:8443");
    assert_eq!(reloaded.request_timeout(), None);
    assert_eq!(reloaded.write_policy, WritePolicy::CancelInFlight);
    assert_eq!(reloaded.notifications.dismiss_after_ms, 2500);
    assert_eq!(reloaded.notifications.dismiss_policy, DismissPolicy::Keyed);
    assert!(reloaded.logging.file_enabled);
    assert_eq!(reloaded.logging.file_rotation, LogRotation::Hourly);
}

// ─────────────────────────────────────────────────────────────────────────────
// Precedence
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_env_overrides_file() {
    let file: FileConfig = toml::from_str(
        r#"
api_url = "http://from-file:5000"
request_timeout_secs = 10
write_policy = "cancel-in-flight"
"#,
    )
    .unwrap();

    let config = Config::from_sources(
        file,
        env_from(&[
            ("ACCESS_CONSOLE_API_URL", "http://from-env:5000"),
            ("ACCESS_CONSOLE_TIMEOUT", "5"),
        ]),
    );

    assert_eq!(config.api_url, "http://from-env:5000");
    assert_eq!(config.request_timeout(), Some(Duration::from_secs(5)));
    // Not overridden by env
    assert_eq!(config.write_policy, WritePolicy::CancelInFlight);
}

#[test]
fn test_unparsable_timeout_env_falls_back_to_file() {
    let file: FileConfig = toml::from_str("request_timeout_secs = 12").unwrap();
    let config = Config::from_sources(file, env_from(&[("ACCESS_CONSOLE_TIMEOUT", "soon")]));
    assert_eq!(config.request_timeout_secs, 12);
}

#[test]
fn test_runtime_flags_are_env_only() {
    let config = Config::from_sources(FileConfig::default(), no_env());
    assert!(config.enable_tui);
    assert!(!config.demo_mode);

    let config = Config::from_sources(
        FileConfig::default(),
        env_from(&[("ACCESS_CONSOLE_NO_TUI", "true"), ("ACCESS_CONSOLE_DEMO", "1")]),
    );
    assert!(!config.enable_tui);
    assert!(config.demo_mode);
}

#[test]
fn test_partial_sections_keep_defaults() {
    let file: FileConfig = toml::from_str(
        r#"
[notifications]
dismiss_policy = "keyed"

[logging]
level = "debug"
"#,
    )
    .unwrap();
    let config = Config::from_sources(file, no_env());

    assert_eq!(config.notifications.dismiss_after_ms, 4000);
    assert_eq!(config.notifications.dismiss_policy, DismissPolicy::Keyed);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.file_prefix, "access-console");
}

#[test]
fn test_log_rotation_parsing() {
    assert_eq!(LogRotation::from_str("HOURLY"), LogRotation::Hourly);
    assert_eq!(LogRotation::from_str("never"), LogRotation::Never);
    assert_eq!(LogRotation::from_str("weekly"), LogRotation::Daily);
}

#[test]
fn test_log_level_feeds_filter_directive() {
    let file: FileConfig = toml::from_str("[logging]\nlevel = \"DEBUG\"").unwrap();
    let config = Config::from_sources(file, no_env());
    assert_eq!(config.logging.filter_directive(), "access_console=debug");
}

#[test]
fn test_read_file_config_missing_and_invalid() {
    let dir = std::env::temp_dir().join(format!("access-console-cfg-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let missing = Config::read_file_config(&dir.join("absent.toml")).unwrap();
    assert!(missing.api_url.is_none());

    let broken = dir.join("broken.toml");
    std::fs::write(&broken, "api_url = http://unquoted").unwrap();
    let err = Config::read_file_config(&broken).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));

    let _ = std::fs::remove_dir_all(&dir);
}
