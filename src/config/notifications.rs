//! Notification banner configuration

use crate::notify::{DismissPolicy, Notifier, DEFAULT_DISMISS_AFTER};
use serde::Deserialize;
use std::time::Duration;

/// Banner timing and dismiss behaviour
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationsConfig {
    /// How long a notification stays visible
    pub dismiss_after_ms: u64,
    pub dismiss_policy: DismissPolicy,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            dismiss_after_ms: DEFAULT_DISMISS_AFTER.as_millis() as u64,
            dismiss_policy: DismissPolicy::default(),
        }
    }
}

/// Notification settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileNotifications {
    pub dismiss_after_ms: Option<u64>,
    pub dismiss_policy: Option<String>,
}

impl NotificationsConfig {
    /// Create from file config with defaults
    pub fn from_file(file: Option<FileNotifications>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            dismiss_after_ms: file.dismiss_after_ms.unwrap_or(defaults.dismiss_after_ms),
            dismiss_policy: file
                .dismiss_policy
                .map(|s| DismissPolicy::from_str(&s))
                .unwrap_or(defaults.dismiss_policy),
        }
    }

    /// Build the shared notifier these settings describe
    pub fn notifier(&self) -> Notifier {
        Notifier::new(
            Duration::from_millis(self.dismiss_after_ms),
            self.dismiss_policy,
        )
    }
}
