//! Notification banner service
//!
//! A single-slot banner: a new notification overwrites whatever is shown,
//! there is no queue and no history. Each notification starts a dismiss
//! timer when it is shown. What the timer dismisses depends on the
//! [`DismissPolicy`]:
//!
//! - `Current` (default): whatever is displayed when the timer fires, so a
//!   message replaced shortly before an older deadline disappears early.
//! - `Keyed`: only the notification that started the timer. A newer
//!   notification keeps its own full display time.
//!
//! The notifier is cheap to clone; clones share the same slot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Default time a notification stays visible
pub const DEFAULT_DISMISS_AFTER: Duration = Duration::from_millis(4000);

/// Banner styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Danger,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Danger => "danger",
        }
    }

    /// Whether a headless run should report failure for this severity
    pub fn is_problem(&self) -> bool {
        matches!(self, Severity::Warning | Severity::Danger)
    }
}

/// Which notification a firing dismiss timer affects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DismissPolicy {
    /// A timer only dismisses the message it was started for
    Keyed,
    /// Any timer dismisses whatever is showing when it fires
    #[default]
    Current,
}

impl DismissPolicy {
    /// Parse policy string from config
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "keyed" => Self::Keyed,
            _ => Self::Current,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keyed => "keyed",
            Self::Current => "current",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationId(pub u64);

/// The banner's content
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
    /// Faded out by a timer or by the user; still occupies the slot
    pub dismissed: bool,
}

impl Notification {
    pub fn is_visible(&self) -> bool {
        !self.dismissed
    }
}

struct Slot {
    current: Mutex<Option<Notification>>,
    next_id: AtomicU64,
    dismiss_after: Duration,
    policy: DismissPolicy,
}

impl Slot {
    fn expire(&self, id: NotificationId) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(shown) = current.as_mut() else {
            return;
        };
        match self.policy {
            DismissPolicy::Keyed if shown.id != id => {}
            _ => {
                if !shown.dismissed {
                    tracing::trace!("Dismissing notification {:?}", shown.id);
                }
                shown.dismissed = true;
            }
        }
    }
}

/// Shared handle to the banner
#[derive(Clone)]
pub struct Notifier {
    slot: Arc<Slot>,
}

impl Notifier {
    pub fn new(dismiss_after: Duration, policy: DismissPolicy) -> Self {
        Self {
            slot: Arc::new(Slot {
                current: Mutex::new(None),
                next_id: AtomicU64::new(1),
                dismiss_after,
                policy,
            }),
        }
    }

    /// Show a message, replacing the current one, and arm its dismiss timer
    ///
    /// Must be called from within a tokio runtime.
    pub fn notify(&self, message: impl Into<String>, severity: Severity) -> NotificationId {
        let id = NotificationId(self.slot.next_id.fetch_add(1, Ordering::Relaxed));
        let message = message.into();
        tracing::debug!("[{}] {}", severity.as_str(), message);

        *self
            .slot
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Notification {
            id,
            message,
            severity,
            dismissed: false,
        });

        let slot = Arc::clone(&self.slot);
        tokio::spawn(async move {
            tokio::time::sleep(slot.dismiss_after).await;
            slot.expire(id);
        });

        id
    }

    /// Snapshot of the banner content
    pub fn current(&self) -> Option<Notification> {
        self.slot
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The banner content if it has not been dismissed yet
    pub fn visible(&self) -> Option<Notification> {
        self.current().filter(Notification::is_visible)
    }

    /// User-initiated close of the current message
    pub fn dismiss(&self) {
        if let Some(shown) = self
            .slot
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_mut()
        {
            shown.dismissed = true;
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_DISMISS_AFTER, DismissPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test(start_paused = true)]
    async fn test_notification_dismisses_after_delay() {
        let notifier = Notifier::default();
        let id = notifier.notify("Search completed", Severity::Info);

        sleep(ms(3999)).await;
        let shown = notifier.visible().expect("still visible before deadline");
        assert_eq!(shown.id, id);

        sleep(ms(2)).await;
        assert!(notifier.visible().is_none());
        assert!(notifier.current().unwrap().dismissed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_timer_dismisses_replacement_early() {
        let notifier = Notifier::default();
        notifier.notify("first", Severity::Success);

        sleep(ms(1000)).await;
        let second = notifier.notify("second", Severity::Danger);

        // T+4001: the first timer fired and took the second message with it
        sleep(ms(3001)).await;
        let shown = notifier.current().unwrap();
        assert_eq!(shown.id, second);
        assert_eq!(shown.message, "second");
        assert!(shown.dismissed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keyed_policy_keeps_replacement_until_its_deadline() {
        let notifier = Notifier::new(DEFAULT_DISMISS_AFTER, DismissPolicy::Keyed);
        notifier.notify("first", Severity::Success);

        sleep(ms(1000)).await;
        let second = notifier.notify("second", Severity::Danger);

        sleep(ms(3001)).await;
        let shown = notifier.visible().expect("replacement survives first timer");
        assert_eq!(shown.id, second);

        sleep(ms(1000)).await;
        assert!(notifier.visible().is_none());
    }

    #[tokio::test]
    async fn test_new_message_overwrites_without_queue() {
        let notifier = Notifier::default();
        notifier.notify("one", Severity::Info);
        notifier.notify("two", Severity::Warning);

        let shown = notifier.visible().unwrap();
        assert_eq!(shown.message, "two");
        assert_eq!(shown.severity, Severity::Warning);

        notifier.dismiss();
        assert!(notifier.visible().is_none());
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(DismissPolicy::from_str("legacy"), DismissPolicy::Current);
        assert_eq!(DismissPolicy::from_str("Current"), DismissPolicy::Current);
        assert_eq!(DismissPolicy::from_str("Keyed"), DismissPolicy::Keyed);
        assert_eq!(DismissPolicy::from_str("anything"), DismissPolicy::Current);
        assert_eq!(DismissPolicy::default(), DismissPolicy::Current);
    }
}
