// Logging module - in-memory capture of tracing events
//
// While the TUI owns the terminal nothing may be printed, so a tracing layer
// collects events into a bounded buffer instead. The status bar shows the
// most recent warning from it; that is where the detail behind a "Failed
// to ..." banner ends up.

use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

/// Entries kept before the oldest are dropped
const CAPACITY: usize = 500;

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    /// The event message followed by its other fields as `key=value`
    pub message: String,
}

/// Severity, most severe first so that `<=` means "at least as severe"
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<&Level> for LogLevel {
    fn from(level: &Level) -> Self {
        match *level {
            Level::ERROR => LogLevel::Error,
            Level::WARN => LogLevel::Warn,
            Level::INFO => LogLevel::Info,
            Level::DEBUG => LogLevel::Debug,
            Level::TRACE => LogLevel::Trace,
        }
    }
}

/// Shared ring of recent entries; clones see the same buffer
#[derive(Clone, Default)]
pub struct LogBuffer {
    entries: Arc<Mutex<VecDeque<LogEntry>>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, entry: LogEntry) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        while entries.len() >= CAPACITY {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Newest entry whose level is `min` or more severe
    pub fn latest(&self, min: LogLevel) -> Option<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .rev()
            .find(|entry| entry.level <= min)
            .cloned()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Tracing layer feeding a [`LogBuffer`]; filtering is left to the
/// subscriber's `EnvFilter`
pub struct TuiLogLayer {
    buffer: LogBuffer,
}

impl TuiLogLayer {
    pub fn new(buffer: LogBuffer) -> Self {
        Self { buffer }
    }
}

impl<S: Subscriber> Layer<S> for TuiLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = FieldCollector::default();
        event.record(&mut fields);

        self.buffer.add(LogEntry {
            timestamp: Local::now(),
            level: LogLevel::from(event.metadata().level()),
            message: fields.finish(),
        });
    }
}

#[derive(Default)]
struct FieldCollector {
    message: String,
    extra: String,
}

impl FieldCollector {
    fn finish(self) -> String {
        match (self.message.is_empty(), self.extra.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.extra,
            (false, false) => format!("{} {}", self.message, self.extra),
        }
    }

    fn push(&mut self, field: &Field, value: std::fmt::Arguments<'_>) {
        if field.name() == "message" {
            let _ = self.message.write_fmt(value);
        } else {
            if !self.extra.is_empty() {
                self.extra.push(' ');
            }
            let _ = write!(self.extra, "{}={}", field.name(), value);
        }
    }
}

impl Visit for FieldCollector {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, format_args!("{}", value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.push(field, format_args!("{:?}", value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::prelude::*;

    fn capture(f: impl FnOnce()) -> LogBuffer {
        let buffer = LogBuffer::new();
        let subscriber = tracing_subscriber::registry().with(TuiLogLayer::new(buffer.clone()));
        tracing::subscriber::with_default(subscriber, f);
        buffer
    }

    #[test]
    fn test_layer_captures_messages() {
        let buffer = capture(|| {
            tracing::info!("Loaded {} mappings", 3);
            tracing::warn!("GET /get_logs failed");
            tracing::debug!("noise");
        });

        assert_eq!(buffer.len(), 3);
        let warn = buffer.latest(LogLevel::Warn).unwrap();
        assert_eq!(warn.message, "GET /get_logs failed");
        assert_eq!(buffer.latest(LogLevel::Trace).unwrap().message, "noise");
        assert_eq!(
            buffer.latest(LogLevel::Info).unwrap().message,
            "GET /get_logs failed"
        );
        assert!(buffer.latest(LogLevel::Error).is_none());
    }

    #[test]
    fn test_structured_fields_follow_message() {
        let buffer = capture(|| {
            tracing::warn!(status = 502, path = "/collaborators", "request failed");
        });
        assert_eq!(
            buffer.latest(LogLevel::Warn).unwrap().message,
            "request failed status=502 path=/collaborators"
        );
    }

    #[test]
    fn test_buffer_is_bounded() {
        let buffer = LogBuffer::new();
        for i in 0..(CAPACITY + 10) {
            buffer.add(LogEntry {
                timestamp: Local::now(),
                level: LogLevel::Info,
                message: i.to_string(),
            });
        }
        assert_eq!(buffer.len(), CAPACITY);
        assert_eq!(
            buffer.latest(LogLevel::Info).unwrap().message,
            (CAPACITY + 9).to_string()
        );
    }
}
