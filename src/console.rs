//! Console operations
//!
//! One method per user action of the admin console. Each method builds the
//! request, picks the region and messages, and hands off to the
//! [`Controller`]. Required inputs are checked here, before anything is
//! sent: a missing owner or repo shows a warning and issues no request.
//! Everything else is forwarded as typed, empty strings included.

use crate::api::endpoints;
use crate::controller::{Action, Controller, Fetch, Region, SuccessMessage};
use crate::model::{BulkFile, ReportKind};
use crate::notify::{Notifier, Severity};
use crate::render::{RenderKind, TableKind};
use std::path::Path;
use tokio::task::JoinHandle;

/// Owner/repo pair every collaborator operation targets
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoTarget {
    pub owner: String,
    pub repo: String,
}

impl RepoTarget {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    fn is_complete(&self) -> bool {
        !self.owner.trim().is_empty() && !self.repo.trim().is_empty()
    }
}

#[derive(Clone)]
pub struct Console {
    controller: Controller,
}

impl Console {
    pub fn new(controller: Controller) -> Self {
        Self { controller }
    }

    pub fn notifier(&self) -> &Notifier {
        self.controller.notifier()
    }

    /// Initial page load: mappings and the audit log
    pub fn start(&self) -> Vec<JoinHandle<()>> {
        vec![self.load_mappings(), self.load_logs()]
    }

    // ─────────────────────────────────────────────────────────────────────
    // Email mappings
    // ─────────────────────────────────────────────────────────────────────

    pub fn load_mappings(&self) -> JoinHandle<()> {
        self.controller.fetch_and_render(mappings_fetch())
    }

    pub fn add_mapping(&self, email: &str, username: &str) -> JoinHandle<()> {
        let action = Action::new(
            "add_mapping",
            endpoints::add_mapping(email, username),
            SuccessMessage::Fixed("Mapping added successfully!".to_string()),
        )
        .on_failure("Failed to add mapping.")
        .then_refresh(mappings_fetch());
        self.controller.perform_action(action)
    }

    pub fn search_email(&self, email: &str) -> JoinHandle<()> {
        let fetch = Fetch::new(
            Region::EmailResult,
            endpoints::search_email(email),
            RenderKind::Text,
        )
        .notify_success("Search completed", Severity::Info)
        .on_failure("Failed to search email.");
        self.controller.fetch_and_render(fetch)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Repositories
    // ─────────────────────────────────────────────────────────────────────

    pub fn list_repos(&self, username: &str) -> JoinHandle<()> {
        let fetch = Fetch::new(
            Region::Repositories,
            endpoints::repos(username),
            RenderKind::Table(TableKind::Repositories),
        )
        .notify_success("Repositories loaded", Severity::Success)
        .on_failure("Failed to load repositories.");
        self.controller.fetch_and_render(fetch)
    }

    /// Who the backend is acting as on the hosting platform
    pub fn whoami(&self) -> JoinHandle<()> {
        let fetch = Fetch::new(
            Region::CurrentUser,
            endpoints::current_user(),
            RenderKind::Text,
        )
        .on_failure("Failed to load authenticated user.");
        self.controller.fetch_and_render(fetch)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Collaborators
    // ─────────────────────────────────────────────────────────────────────

    pub fn load_collaborators(&self, target: &RepoTarget) -> Option<JoinHandle<()>> {
        self.require_target(target)?;
        Some(self.controller.fetch_and_render(collaborators_fetch(target)))
    }

    pub fn add_collaborator(
        &self,
        target: &RepoTarget,
        username: &str,
        permission: &str,
    ) -> Option<JoinHandle<()>> {
        self.require_target(target)?;
        let action = Action::new(
            "add_collaborator",
            endpoints::add_collaborator(&target.owner, &target.repo, username, permission),
            SuccessMessage::ServerOr("Collaborator added".to_string()),
        )
        .on_failure("Failed to add collaborator.");
        Some(self.mutate_collaborators(action, target))
    }

    pub fn remove_collaborator(&self, target: &RepoTarget, username: &str) -> Option<JoinHandle<()>> {
        self.require_target(target)?;
        let action = Action::new(
            "remove_collaborator",
            endpoints::remove_collaborator(&target.owner, &target.repo, username),
            SuccessMessage::ServerOr("Collaborator removed".to_string()),
        )
        .severity(Severity::Warning)
        .on_failure("Failed to remove collaborator.");
        Some(self.mutate_collaborators(action, target))
    }

    pub fn modify_permission(
        &self,
        target: &RepoTarget,
        username: &str,
        permission: &str,
    ) -> Option<JoinHandle<()>> {
        self.require_target(target)?;
        let action = Action::new(
            "modify_permission",
            endpoints::modify_permission(&target.owner, &target.repo, username, permission),
            SuccessMessage::ServerOr("Permission updated".to_string()),
        )
        .on_failure("Failed to update permission.");
        Some(self.mutate_collaborators(action, target))
    }

    /// Collaborator mutations refresh both the collaborator table and the audit log
    fn mutate_collaborators(&self, action: Action, target: &RepoTarget) -> JoinHandle<()> {
        let action = action
            .then_refresh(collaborators_fetch(target))
            .then_refresh(logs_fetch());
        self.controller.perform_action(action)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Bulk changes
    // ─────────────────────────────────────────────────────────────────────

    /// Load a change set from disk, warning (and returning `None`) when the
    /// path is empty or unreadable
    pub async fn read_bulk_file(&self, path: &str) -> Option<BulkFile> {
        let path = path.trim();
        if path.is_empty() {
            self.warn("Choose a CSV file first.");
            return None;
        }
        match BulkFile::read(Path::new(path)).await {
            Ok(file) => Some(file),
            Err(e) => {
                tracing::warn!("Could not read bulk file {}: {}", path, e);
                self.warn(format!("Could not read {}.", path));
                None
            }
        }
    }

    pub fn preview_bulk(&self, file: BulkFile) -> JoinHandle<()> {
        let action = Action::new(
            "bulk_preview",
            endpoints::bulk_preview(file),
            SuccessMessage::Fixed("Bulk preview ready".to_string()),
        )
        .severity(Severity::Info)
        .on_failure("Bulk preview failed.")
        .render_into(Region::BulkResult);
        self.controller.perform_action(action)
    }

    pub fn apply_bulk(&self, target: &RepoTarget, file: BulkFile) -> Option<JoinHandle<()>> {
        self.require_target(target)?;
        let action = Action::new(
            "bulk_apply",
            endpoints::bulk_apply(&target.owner, &target.repo, file),
            SuccessMessage::Fixed("Bulk changes applied".to_string()),
        )
        .on_failure("Bulk apply failed.")
        .render_into(Region::BulkResult)
        .then_refresh(logs_fetch());
        Some(self.controller.perform_action(action))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Reports and audit log
    // ─────────────────────────────────────────────────────────────────────

    pub fn generate_report(&self, kind: ReportKind, target: &RepoTarget) -> JoinHandle<()> {
        let fetch = Fetch::new(
            Region::ReportResult,
            endpoints::report(kind, &target.owner, &target.repo),
            RenderKind::Text,
        )
        .notify_success(format!("{} report generated", kind.label()), Severity::Success)
        .on_failure("Report generation failed.");
        self.controller.fetch_and_render(fetch)
    }

    pub fn load_logs(&self) -> JoinHandle<()> {
        self.controller.fetch_and_render(logs_fetch())
    }

    fn require_target(&self, target: &RepoTarget) -> Option<()> {
        if target.is_complete() {
            Some(())
        } else {
            self.warn("Enter owner and repo first.");
            None
        }
    }

    fn warn(&self, message: impl Into<String>) {
        self.controller.notifier().notify(message, Severity::Warning);
    }
}

fn mappings_fetch() -> Fetch {
    Fetch::new(
        Region::Mappings,
        endpoints::get_mappings(),
        RenderKind::Table(TableKind::Mappings),
    )
    .on_failure("Failed to load mappings.")
}

fn collaborators_fetch(target: &RepoTarget) -> Fetch {
    Fetch::new(
        Region::Collaborators,
        endpoints::collaborators(&target.owner, &target.repo),
        RenderKind::Table(TableKind::Collaborators),
    )
    .on_failure("Failed to fetch collaborators.")
}

fn logs_fetch() -> Fetch {
    Fetch::new(
        Region::AuditLog,
        endpoints::get_logs(),
        RenderKind::Table(TableKind::AuditLog),
    )
    .on_failure("Failed to load logs.")
}
