//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

impl Config {
    /// Render the config as a commented TOML file
    pub fn to_toml(&self) -> String {
        format!(
            r#"# access-console configuration

# Base URL of the access-management backend
api_url = "{api_url}"

# Per-request timeout in seconds (0 = no timeout)
request_timeout_secs = {timeout}

# Re-issuing a request while the previous one is still running:
#   last-response-wins  both run, whichever answers last is shown
#   cancel-in-flight    the older request is aborted
write_policy = "{write_policy}"

# Notification banner
[notifications]
dismiss_after_ms = {dismiss_after}
# current: a timer dismisses whatever is showing when it fires
# keyed:   a timer only dismisses the notification that started it
dismiss_policy = "{dismiss_policy}"

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = "{log_level}"
# JSON file logging (in addition to TUI buffer or stderr)
file_enabled = {log_file_enabled}
file_dir = "{log_file_dir}"
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = "{log_file_prefix}"
"#,
            api_url = self.api_url,
            timeout = self.request_timeout_secs,
            write_policy = self.write_policy.as_str(),
            dismiss_after = self.notifications.dismiss_after_ms,
            dismiss_policy = self.notifications.dismiss_policy.as_str(),
            log_level = self.logging.level,
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = self.logging.file_dir.display().to_string().replace('\\', "/"),
            log_file_rotation = self.logging.file_rotation.as_str(),
            log_file_prefix = self.logging.file_prefix,
        )
    }
}
