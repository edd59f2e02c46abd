//! Configuration for the access console
//!
//! Every setting resolves as: environment variable, then
//! `~/.config/access-console/config.toml`, then the built-in default.

use crate::controller::WritePolicy;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod logging;
mod notifications;
mod serialization;

#[cfg(test)]
mod tests;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports
// ─────────────────────────────────────────────────────────────────────────────

pub use logging::{FileLogging, LoggingConfig};
pub use notifications::{FileNotifications, NotificationsConfig};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Shown by `--version` and in the config template
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Backend the console talks to when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// Why the config file could not be used
#[derive(Debug)]
pub enum ConfigError {
    Read(std::io::Error),
    Parse(toml::de::Error),
}

impl ConfigError {
    fn headline(&self) -> &'static str {
        match self {
            ConfigError::Read(_) => "cannot read the configuration file",
            ConfigError::Parse(_) => "the configuration file is not valid TOML",
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read(e) => write!(f, "{}", e),
            ConfigError::Parse(e) => write!(f, "{}", e.to_string().trim_end()),
        }
    }
}

impl std::error::Error for ConfigError {}

// ─────────────────────────────────────────────────────────────────────────────
// Effective configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Effective settings after env, file and defaults are merged
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the access-management backend
    pub api_url: String,

    /// Per-request timeout in seconds (0 = wait indefinitely)
    pub request_timeout_secs: u64,

    /// Behaviour when the same request is re-issued while one is in flight
    pub write_policy: WritePolicy,

    /// Whether to enable the TUI (disabled for headless mode)
    pub enable_tui: bool,

    /// Demo mode: answer every request from an in-memory server
    pub demo_mode: bool,

    /// Notification banner settings
    pub notifications: NotificationsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: 30,
            write_policy: WritePolicy::default(),
            enable_tui: true,
            demo_mode: false,
            notifications: NotificationsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Request timeout as a duration; `None` when disabled
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// What the config file may set; runtime flags are env-only
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub api_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub write_policy: Option<String>,

    /// Optional [notifications] section
    pub notifications: Option<FileNotifications>,

    pub logging: Option<FileLogging>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

/// Truthy values accepted by boolean env flags
fn is_truthy(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

impl Config {
    /// `~/.config/access-console/config.toml`, on every platform
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| {
            p.join(".config")
                .join("access-console")
                .join("config.toml")
        })
    }

    /// Write the commented default template on first run
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        if path.exists() {
            return;
        }

        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // Config is optional
            }
        }

        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Read and parse the config file; a missing file is not an error
    pub(crate) fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).map_err(ConfigError::Parse),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
            Err(e) => Err(ConfigError::Read(e)),
        }
    }

    /// A config file that exists but cannot be used ends the process
    fn load_file_config() -> FileConfig {
        let Some(path) = Self::config_path() else {
            return FileConfig::default();
        };

        Self::read_file_config(&path).unwrap_or_else(|e| {
            let rule = "─".repeat(62);
            eprintln!("\n{rule}");
            eprintln!("  access-console: {}", e.headline());
            eprintln!("{rule}\n");
            eprintln!("  {}\n  {}\n", path.display(), e);
            if matches!(e, ConfigError::Parse(_)) {
                eprintln!("  Fix the file, or start over with: access-console config --reset\n");
            }
            std::process::exit(1);
        })
    }

    /// Load configuration: env vars -> file -> defaults
    pub fn from_env() -> Self {
        Self::from_sources(Self::load_file_config(), |key| std::env::var(key).ok())
    }

    /// Merge a parsed config file with an environment lookup
    pub(crate) fn from_sources(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let api_url = env("ACCESS_CONSOLE_API_URL")
            .or(file.api_url)
            .unwrap_or(defaults.api_url);

        // Timeout: env > file > default; unparsable env values are ignored
        let request_timeout_secs = env("ACCESS_CONSOLE_TIMEOUT")
            .and_then(|v| v.parse().ok())
            .or(file.request_timeout_secs)
            .unwrap_or(defaults.request_timeout_secs);

        let write_policy = env("ACCESS_CONSOLE_WRITE_POLICY")
            .or(file.write_policy)
            .map(|s| WritePolicy::from_str(&s))
            .unwrap_or(defaults.write_policy);

        // Runtime flags
        let enable_tui = !env("ACCESS_CONSOLE_NO_TUI")
            .map(|v| is_truthy(&v))
            .unwrap_or(false);

        let demo_mode = env("ACCESS_CONSOLE_DEMO")
            .map(|v| is_truthy(&v))
            .unwrap_or(false);

        Self {
            api_url,
            request_timeout_secs,
            write_policy,
            enable_tui,
            demo_mode,
            notifications: NotificationsConfig::from_file(file.notifications),
            logging: LoggingConfig::from_file(file.logging),
        }
    }
}
