// TUI application state
//
// One tab per console feature. A tab has a form and the regions it shows.
// Submitting a form calls the matching console operation; the controller
// writes results into the shared MemorySurface, which the draw code reads
// every frame. Nothing here waits on the network.

use super::form::{Field, Form};
use super::input::InputHandler;
use super::theme::Theme;
use crate::console::{Console, RepoTarget};
use crate::controller::{MemorySurface, Region};
use crate::logging::LogBuffer;
use crate::model::ReportKind;
use crate::notify::Notifier;
use crossterm::event::KeyCode;
use std::collections::HashMap;
use std::time::Instant;

/// Console tabs, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Mappings,
    Search,
    Repos,
    Collaborators,
    Bulk,
    Reports,
    AuditLog,
}

impl Tab {
    pub const ALL: [Tab; 7] = [
        Tab::Mappings,
        Tab::Search,
        Tab::Repos,
        Tab::Collaborators,
        Tab::Bulk,
        Tab::Reports,
        Tab::AuditLog,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Tab::Mappings => "Mappings",
            Tab::Search => "Search",
            Tab::Repos => "Repos",
            Tab::Collaborators => "Collaborators",
            Tab::Bulk => "Bulk",
            Tab::Reports => "Reports",
            Tab::AuditLog => "Audit log",
        }
    }

    fn index(&self) -> usize {
        Tab::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }

    /// Regions shown below the form
    pub fn regions(&self) -> &'static [Region] {
        match self {
            Tab::Mappings => &[Region::Mappings],
            Tab::Search => &[Region::EmailResult],
            Tab::Repos => &[Region::Repositories, Region::CurrentUser],
            Tab::Collaborators => &[Region::Collaborators],
            Tab::Bulk => &[Region::BulkResult],
            Tab::Reports => &[Region::ReportResult],
            Tab::AuditLog => &[Region::AuditLog],
        }
    }

    /// Key hints for the tab's actions
    pub fn actions(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Tab::Mappings => &[("Enter", "add mapping"), ("F5", "reload")],
            Tab::Search => &[("Enter", "search")],
            Tab::Repos => &[("Enter", "list repos"), ("F2", "who am I")],
            Tab::Collaborators => &[
                ("Enter", "load"),
                ("F2", "add"),
                ("F3", "remove"),
                ("F4", "set permission"),
            ],
            Tab::Bulk => &[("Enter", "preview"), ("F2", "apply")],
            Tab::Reports => &[("Enter", "Excel report"), ("F2", "PDF report")],
            Tab::AuditLog => &[("Enter", "reload")],
        }
    }

    fn form(&self) -> Form {
        let fields = match self {
            Tab::Mappings => vec![
                Field::new("Email", "user@example.com"),
                Field::new("Username", "github-login"),
            ],
            Tab::Search => vec![Field::new("Email", "user@example.com")],
            Tab::Repos => vec![Field::new("Username", "github-login")],
            Tab::Collaborators => vec![
                Field::new("Owner", "org or user"),
                Field::new("Repo", "repository"),
                Field::new("Username", "github-login"),
                Field::new("Permission", "pull, triage, push, maintain, admin")
                    .with_value("push"),
            ],
            Tab::Bulk => vec![
                Field::new("Owner", "org or user"),
                Field::new("Repo", "repository"),
                Field::new("CSV file", "path/to/changes.csv"),
            ],
            Tab::Reports => vec![
                Field::new("Owner", "org or user"),
                Field::new("Repo", "repository"),
            ],
            Tab::AuditLog => Vec::new(),
        };
        Form::new(fields)
    }
}

/// Which of a tab's actions was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Primary,
    Secondary(u8),
    Reload,
}

/// Main application state for the TUI
pub struct App {
    pub tab: Tab,
    pub forms: HashMap<Tab, Form>,
    /// Scroll offset of each region
    pub scroll: HashMap<Region, u16>,

    pub console: Console,
    pub surface: MemorySurface,
    pub log_buffer: LogBuffer,
    pub theme: Theme,
    pub backend_label: String,

    pub input: InputHandler,
    pub should_quit: bool,
    started_at: Instant,
}

impl App {
    pub fn new(
        console: Console,
        surface: MemorySurface,
        log_buffer: LogBuffer,
        backend_label: impl Into<String>,
    ) -> Self {
        Self {
            tab: Tab::default(),
            forms: Tab::ALL.iter().map(|t| (*t, t.form())).collect(),
            scroll: HashMap::new(),
            console,
            surface,
            log_buffer,
            theme: Theme::default(),
            backend_label: backend_label.into(),
            input: InputHandler::for_console(),
            should_quit: false,
            started_at: Instant::now(),
        }
    }

    pub fn notifier(&self) -> &Notifier {
        self.console.notifier()
    }

    pub fn form(&self) -> &Form {
        // Every tab gets a form in `new`; the fallback is never hit
        static EMPTY: Form = Form {
            fields: Vec::new(),
            focused: 0,
        };
        self.forms.get(&self.tab).unwrap_or(&EMPTY)
    }

    pub fn form_mut(&mut self) -> Option<&mut Form> {
        self.forms.get_mut(&self.tab)
    }

    pub fn handle_key_press(&mut self, key: KeyCode) -> bool {
        self.input.press(key)
    }

    pub fn handle_key_release(&mut self, key: KeyCode) {
        self.input.release(key);
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn uptime(&self) -> String {
        let secs = self.started_at.elapsed().as_secs();
        format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
    }

    /// Scroll the tab's first region
    pub fn scroll_by(&mut self, delta: i32) {
        let Some(region) = self.tab.regions().first() else {
            return;
        };
        let offset = self.scroll.entry(*region).or_insert(0);
        *offset = (*offset as i32 + delta).clamp(0, u16::MAX as i32) as u16;
    }

    pub fn scroll_offset(&self, region: Region) -> u16 {
        self.scroll.get(&region).copied().unwrap_or(0)
    }

    fn target(&self) -> RepoTarget {
        let form = self.form();
        RepoTarget::new(form.value(0), form.value(1))
    }

    /// Run the current tab's action for `trigger`
    ///
    /// Console calls return immediately; their tasks finish in the
    /// background and show up on the next frame.
    pub fn trigger(&mut self, trigger: Trigger) {
        let form = self.form().clone();
        let console = self.console.clone();

        // Results of a new request start at the top
        if let Some(region) = self.tab.regions().first() {
            self.scroll.remove(region);
        }

        match (self.tab, trigger) {
            (Tab::Mappings, Trigger::Primary) => {
                console.add_mapping(form.value(0), form.value(1));
            }
            (Tab::Mappings, Trigger::Reload) => {
                console.load_mappings();
            }
            (Tab::Search, Trigger::Primary) => {
                console.search_email(form.value(0));
            }
            (Tab::Repos, Trigger::Primary) => {
                console.list_repos(form.value(0));
            }
            (Tab::Repos, Trigger::Secondary(2)) => {
                console.whoami();
            }
            (Tab::Collaborators, Trigger::Primary | Trigger::Reload) => {
                console.load_collaborators(&self.target());
            }
            (Tab::Collaborators, Trigger::Secondary(2)) => {
                console.add_collaborator(&self.target(), form.value(2), form.value(3));
            }
            (Tab::Collaborators, Trigger::Secondary(3)) => {
                console.remove_collaborator(&self.target(), form.value(2));
            }
            (Tab::Collaborators, Trigger::Secondary(4)) => {
                console.modify_permission(&self.target(), form.value(2), form.value(3));
            }
            (Tab::Bulk, Trigger::Primary) => {
                let path = form.value(2).to_string();
                tokio::spawn(async move {
                    if let Some(file) = console.read_bulk_file(&path).await {
                        console.preview_bulk(file);
                    }
                });
            }
            (Tab::Bulk, Trigger::Secondary(2)) => {
                let target = self.target();
                let path = form.value(2).to_string();
                tokio::spawn(async move {
                    if let Some(file) = console.read_bulk_file(&path).await {
                        console.apply_bulk(&target, file);
                    }
                });
            }
            (Tab::Reports, Trigger::Primary) => {
                console.generate_report(ReportKind::Excel, &self.target());
            }
            (Tab::Reports, Trigger::Secondary(2)) => {
                console.generate_report(ReportKind::Pdf, &self.target());
            }
            (Tab::AuditLog, Trigger::Primary | Trigger::Reload) => {
                console.load_logs();
            }
            (tab, trigger) => {
                tracing::trace!("No action bound to {:?} on {:?}", trigger, tab);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockBackend;
    use crate::controller::{Controller, WritePolicy};
    use crate::notify::Severity;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn app() -> (Arc<MockBackend>, App) {
        let backend = Arc::new(MockBackend::new());
        let surface = MemorySurface::new();
        let controller = Controller::new(
            backend.clone(),
            Arc::new(surface.clone()),
            Notifier::default(),
            WritePolicy::default(),
        );
        let app = App::new(Console::new(controller), surface, LogBuffer::new(), "mock");
        (backend, app)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.form_mut().unwrap().push_char(c);
        }
    }

    #[test]
    fn test_tab_cycle_wraps() {
        assert_eq!(Tab::AuditLog.next(), Tab::Mappings);
        assert_eq!(Tab::Mappings.prev(), Tab::AuditLog);
        assert_eq!(Tab::Bulk.next(), Tab::Reports);
    }

    #[test]
    fn test_every_tab_documents_a_primary_action() {
        for tab in Tab::ALL {
            assert_eq!(tab.actions()[0].0, "Enter", "{:?}", tab);
            assert!(!tab.regions().is_empty());
        }
    }

    #[tokio::test]
    async fn test_add_collaborator_without_owner_only_warns() {
        let (backend, mut app) = app();
        app.set_tab(Tab::Collaborators);
        app.form_mut().unwrap().focused = 1;
        type_text(&mut app, "widgets");
        app.form_mut().unwrap().focused = 2;
        type_text(&mut app, "bob");

        app.trigger(Trigger::Secondary(2));

        let shown = app.notifier().visible().unwrap();
        assert_eq!(shown.severity, Severity::Warning);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_load_collaborators_uses_form_values() {
        let (backend, mut app) = app();
        backend.get_json("/collaborators", json!([]));
        app.set_tab(Tab::Collaborators);
        type_text(&mut app, "acme");
        app.form_mut().unwrap().focus_next();
        type_text(&mut app, "widgets");

        app.trigger(Trigger::Primary);
        for _ in 0..50 {
            if app.surface.get(Region::Collaborators).is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let call = &backend.calls()[0];
        assert_eq!(call.query_value("owner"), Some("acme"));
        assert_eq!(call.query_value("repo"), Some("widgets"));
        assert_eq!(call.query_value("permission"), None);
        assert!(app.surface.get(Region::Collaborators).is_some());
    }

    #[test]
    fn test_scroll_never_goes_negative() {
        let (_backend, mut app) = app();
        app.scroll_by(-3);
        assert_eq!(app.scroll_offset(Region::Mappings), 0);
        app.scroll_by(5);
        app.scroll_by(-2);
        assert_eq!(app.scroll_offset(Region::Mappings), 3);
    }
}
