//! Resource table controller
//!
//! The one structurally repeated pattern of the console: issue a request,
//! render the payload into a region on success, raise a notification on
//! failure, and refresh dependent views after a successful mutation.
//!
//! # Architecture
//!
//! ```text
//!   Console method ──► Controller ──► Backend::send
//!                          │
//!             ┌────────────┼─────────────┐
//!             ▼            ▼             ▼
//!        render::render  Notifier    refresh fetches
//!             │
//!             ▼
//!      Surface::write(region, view)
//! ```
//!
//! Rendering is pure; the only screen side effect is `Surface::write`, which
//! replaces a whole region at once. A failed request never writes, so the
//! region keeps whatever it showed before.
//!
//! Every call spawns a tokio task and returns its handle. The handle
//! completes after the request, the render or notification, and any
//! refreshes the call triggered. Callers that fire and forget simply drop it.

use crate::api::{ApiRequest, Backend};
use crate::model::server_message;
use crate::notify::{Notifier, Severity};
use crate::render::{self, RenderKind, View};
use futures::future::join_all;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::{AbortHandle, JoinHandle};

/// Screen regions a controller can write into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Mappings,
    EmailResult,
    Repositories,
    CurrentUser,
    Collaborators,
    BulkResult,
    ReportResult,
    AuditLog,
}

impl Region {
    pub fn title(&self) -> &'static str {
        match self {
            Region::Mappings => "Email Mappings",
            Region::EmailResult => "Search Result",
            Region::Repositories => "Repositories",
            Region::CurrentUser => "Authenticated User",
            Region::Collaborators => "Collaborators",
            Region::BulkResult => "Bulk Result",
            Region::ReportResult => "Report",
            Region::AuditLog => "Audit Log",
        }
    }

    /// Key used to detect duplicate in-flight reads of the same region
    fn key(&self) -> String {
        format!("region:{:?}", self)
    }
}

/// Adapter that puts views on screen
///
/// Implementations must replace the region's content in one step.
pub trait Surface: Send + Sync {
    fn write(&self, region: Region, view: View);
}

/// Surface that keeps the latest view per region in memory
///
/// Backs the TUI (read every frame) and headless runs (read once at the end).
#[derive(Clone, Default)]
pub struct MemorySurface {
    regions: Arc<Mutex<HashMap<Region, View>>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, region: Region) -> Option<View> {
        self.regions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&region)
            .cloned()
    }
}

impl Surface for MemorySurface {
    fn write(&self, region: Region, view: View) {
        self.regions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(region, view);
    }
}

/// What happens when the same request is issued while a previous one is
/// still in flight
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WritePolicy {
    /// No dedup, no cancellation: whichever response arrives last renders last
    #[default]
    LastResponseWins,
    /// Abort the older request; only the newest one may render or notify
    CancelInFlight,
}

impl WritePolicy {
    /// Parse policy string from config
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "cancel-in-flight" | "cancel" => Self::CancelInFlight,
            _ => Self::LastResponseWins,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LastResponseWins => "last-response-wins",
            Self::CancelInFlight => "cancel-in-flight",
        }
    }
}

/// A notification shown after a successful call
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
}

impl Notice {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }
}

/// Read request rendered into a region
#[derive(Debug, Clone)]
pub struct Fetch {
    pub region: Region,
    pub request: ApiRequest,
    pub render: RenderKind,
    pub on_success: Option<Notice>,
    /// Danger notification text when the request fails
    pub failure: String,
}

impl Fetch {
    pub fn new(region: Region, request: ApiRequest, render: RenderKind) -> Self {
        Self {
            region,
            request,
            render,
            on_success: None,
            failure: format!("Failed to load {}.", region.title().to_lowercase()),
        }
    }

    pub fn notify_success(mut self, message: impl Into<String>, severity: Severity) -> Self {
        self.on_success = Some(Notice::new(message, severity));
        self
    }

    pub fn on_failure(mut self, message: impl Into<String>) -> Self {
        self.failure = message.into();
        self
    }
}

/// Success message of a mutation
#[derive(Debug, Clone, PartialEq)]
pub enum SuccessMessage {
    /// Always this text
    Fixed(String),
    /// The response's `message` field, or this text when absent
    ServerOr(String),
}

impl SuccessMessage {
    fn resolve(&self, payload: &serde_json::Value) -> String {
        match self {
            SuccessMessage::Fixed(text) => text.clone(),
            SuccessMessage::ServerOr(default) => server_message(payload)
                .map(str::to_string)
                .unwrap_or_else(|| default.clone()),
        }
    }
}

/// Write request with its success/failure messages and dependent refreshes
#[derive(Debug, Clone)]
pub struct Action {
    /// Identifies duplicate submissions under `CancelInFlight`
    pub key: String,
    pub request: ApiRequest,
    pub success: SuccessMessage,
    pub severity: Severity,
    pub failure: String,
    /// Show the raw response in this region (uploads are diagnostic)
    pub render_into: Option<Region>,
    /// Views re-fetched after success, never after failure
    pub refresh: Vec<Fetch>,
}

impl Action {
    pub fn new(key: impl Into<String>, request: ApiRequest, success: SuccessMessage) -> Self {
        Self {
            key: key.into(),
            request,
            success,
            severity: Severity::Success,
            failure: "Request failed.".to_string(),
            render_into: None,
            refresh: Vec::new(),
        }
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn on_failure(mut self, message: impl Into<String>) -> Self {
        self.failure = message.into();
        self
    }

    pub fn render_into(mut self, region: Region) -> Self {
        self.render_into = Some(region);
        self
    }

    pub fn then_refresh(mut self, fetch: Fetch) -> Self {
        self.refresh.push(fetch);
        self
    }
}

struct Inner {
    backend: Arc<dyn Backend>,
    surface: Arc<dyn Surface>,
    notifier: Notifier,
    policy: WritePolicy,
    /// key -> (generation, abort handle) of the newest in-flight task
    in_flight: Mutex<HashMap<String, (u64, AbortHandle)>>,
    generation: AtomicU64,
}

impl Inner {
    fn finish(&self, key: &str, generation: u64) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(in_flight.get(key), Some((g, _)) if *g == generation) {
            in_flight.remove(key);
        }
    }
}

/// Drives requests, renders results and raises notifications
#[derive(Clone)]
pub struct Controller {
    inner: Arc<Inner>,
}

impl Controller {
    pub fn new(
        backend: Arc<dyn Backend>,
        surface: Arc<dyn Surface>,
        notifier: Notifier,
        policy: WritePolicy,
    ) -> Self {
        tracing::debug!(
            "Controller ready (backend: {}, write policy: {})",
            backend.name(),
            policy.as_str()
        );
        Self {
            inner: Arc::new(Inner {
                backend,
                surface,
                notifier,
                policy,
                in_flight: Mutex::new(HashMap::new()),
                generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    /// Issue a read and render the payload into `fetch.region`
    pub fn fetch_and_render(&self, fetch: Fetch) -> JoinHandle<()> {
        let key = fetch.region.key();
        let inner = Arc::clone(&self.inner);
        self.spawn_keyed(key, run_fetch(inner, fetch))
    }

    /// Issue a write; on success notify and refresh every dependent view
    ///
    /// Writes are keyed by action and full request line, so only a repeat of
    /// the same write supersedes an earlier one.
    pub fn perform_action(&self, action: Action) -> JoinHandle<()> {
        let key = format!("action:{}:{}", action.key, action.request);
        let controller = self.clone();
        self.spawn_keyed(key, async move { controller.run_action(action).await })
    }

    fn spawn_keyed<F>(&self, key: String, work: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.inner.policy == WritePolicy::LastResponseWins {
            return tokio::spawn(work);
        }

        let generation = self.inner.generation.fetch_add(1, Ordering::Relaxed);
        let inner = Arc::clone(&self.inner);
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            work.await;
            inner.finish(&task_key, generation);
        });

        let previous = self
            .inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), (generation, handle.abort_handle()));
        if let Some((_, stale)) = previous {
            if !stale.is_finished() {
                tracing::debug!("Cancelling superseded request: {}", key);
            }
            stale.abort();
        }

        handle
    }

    async fn run_action(&self, action: Action) {
        let described = action.request.to_string();
        tracing::debug!("Action {}: {}", action.key, described);

        match self.inner.backend.send(action.request).await {
            Ok(payload) => {
                if let Some(region) = action.render_into {
                    self.inner.surface.write(region, render::render_text(&payload));
                }
                let message = action.success.resolve(&payload);
                self.inner.notifier.notify(message, action.severity);

                let refreshes: Vec<_> = action
                    .refresh
                    .into_iter()
                    .map(|fetch| self.fetch_and_render(fetch))
                    .collect();
                for result in join_all(refreshes).await {
                    // Superseded refreshes report as cancelled
                    if let Err(e) = result {
                        if !e.is_cancelled() {
                            tracing::warn!("Refresh after {} did not finish: {}", described, e);
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!("{} failed: {}", described, e);
                self.inner.notifier.notify(action.failure, Severity::Danger);
            }
        }
    }
}

async fn run_fetch(inner: Arc<Inner>, fetch: Fetch) {
    let described = fetch.request.to_string();
    tracing::debug!("Fetching {} into {:?}", described, fetch.region);

    match inner.backend.send(fetch.request).await {
        Ok(payload) => {
            let view = render::render(fetch.render, &payload);
            tracing::trace!("{:?} now shows {} row(s)", fetch.region, view.row_count());
            inner.surface.write(fetch.region, view);
            if let Some(notice) = fetch.on_success {
                inner.notifier.notify(notice.message, notice.severity);
            }
        }
        Err(e) => {
            tracing::warn!("{} failed: {}", described, e);
            inner.notifier.notify(fetch.failure, Severity::Danger);
        }
    }
}
