//! Headless mode: run one console action and print the result
//!
//! Views are written to a [`MemorySurface`]; once the action (and every
//! refresh it triggered) has finished, the affected regions are printed to
//! stdout as plain text or HTML. The notification goes to stderr, and a
//! warning or danger notification makes the process exit non-zero.

use crate::cli::Commands;
use crate::console::{Console, RepoTarget};
use crate::controller::{MemorySurface, Region};
use crate::notify::Notification;
use crate::render::{html, text};
use tokio::task::JoinHandle;

/// How regions are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Html,
}

/// What a headless run produced
#[derive(Debug, Default)]
pub struct Outcome {
    /// Regions the command affects, in display order, with their rendering
    pub sections: Vec<(Region, String)>,
    pub notification: Option<Notification>,
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match &self.notification {
            Some(n) if n.severity.is_problem() => 1,
            _ => 0,
        }
    }
}

fn target(args: &crate::cli::TargetArgs) -> RepoTarget {
    RepoTarget::new(args.owner.clone(), args.repo.clone())
}

/// Start the console action for `command`
///
/// Returns the regions worth printing and the task to wait for (none when
/// validation stopped the action before any request).
async fn dispatch(console: &Console, command: &Commands) -> (Vec<Region>, Option<JoinHandle<()>>) {
    match command {
        Commands::Config { .. } => (Vec::new(), None),
        Commands::Mappings => (vec![Region::Mappings], Some(console.load_mappings())),
        Commands::AddMapping { email, username } => (
            vec![Region::Mappings],
            Some(console.add_mapping(email, username)),
        ),
        Commands::SearchEmail { email } => {
            (vec![Region::EmailResult], Some(console.search_email(email)))
        }
        Commands::Repos { username } => {
            (vec![Region::Repositories], Some(console.list_repos(username)))
        }
        Commands::Whoami => (vec![Region::CurrentUser], Some(console.whoami())),
        Commands::Collaborators { target: t } => (
            vec![Region::Collaborators],
            console.load_collaborators(&target(t)),
        ),
        Commands::AddCollaborator {
            target: t,
            username,
            permission,
        } => (
            vec![Region::Collaborators, Region::AuditLog],
            console.add_collaborator(&target(t), username, permission),
        ),
        Commands::RemoveCollaborator { target: t, username } => (
            vec![Region::Collaborators, Region::AuditLog],
            console.remove_collaborator(&target(t), username),
        ),
        Commands::ModifyPermission {
            target: t,
            username,
            permission,
        } => (
            vec![Region::Collaborators, Region::AuditLog],
            console.modify_permission(&target(t), username, permission),
        ),
        Commands::BulkPreview { file } => {
            let handle = console
                .read_bulk_file(&file.to_string_lossy())
                .await
                .map(|upload| console.preview_bulk(upload));
            (vec![Region::BulkResult], handle)
        }
        Commands::BulkApply { target: t, file } => {
            let repo = target(t);
            let handle = console
                .read_bulk_file(&file.to_string_lossy())
                .await
                .and_then(|upload| console.apply_bulk(&repo, upload));
            (vec![Region::BulkResult, Region::AuditLog], handle)
        }
        Commands::Report { format, target: t } => (
            vec![Region::ReportResult],
            Some(console.generate_report((*format).into(), &target(t))),
        ),
        Commands::Logs => (vec![Region::AuditLog], Some(console.load_logs())),
    }
}

/// Run `command` to completion and collect what it rendered
pub async fn execute(
    console: &Console,
    surface: &MemorySurface,
    command: &Commands,
    format: OutputFormat,
) -> Outcome {
    let (regions, handle) = dispatch(console, command).await;
    collect(console, surface, regions, handle.into_iter().collect(), format).await
}

/// The initial page load without a terminal UI: mappings and audit log
pub async fn startup(console: &Console, surface: &MemorySurface, format: OutputFormat) -> Outcome {
    let handles = console.start();
    collect(
        console,
        surface,
        vec![Region::Mappings, Region::AuditLog],
        handles,
        format,
    )
    .await
}

async fn collect(
    console: &Console,
    surface: &MemorySurface,
    regions: Vec<Region>,
    handles: Vec<JoinHandle<()>>,
    format: OutputFormat,
) -> Outcome {
    for handle in handles {
        if let Err(e) = handle.await {
            tracing::error!("Console task failed: {}", e);
        }
    }

    let sections = regions
        .into_iter()
        .filter_map(|region| {
            surface.get(region).map(|view| {
                let rendered = match format {
                    OutputFormat::Text => text::to_text(&view),
                    OutputFormat::Html => html::to_html(&view),
                };
                (region, rendered)
            })
        })
        .collect();

    Outcome {
        sections,
        notification: console.notifier().current(),
    }
}

/// Print an outcome and return the process exit code
pub fn print(outcome: &Outcome, format: OutputFormat) -> i32 {
    let titled = outcome.sections.len() > 1;
    for (region, rendered) in &outcome.sections {
        if titled && format == OutputFormat::Text {
            println!("== {} ==", region.title());
        }
        println!("{}", rendered);
        if titled {
            println!();
        }
    }

    if let Some(notification) = &outcome.notification {
        if format == OutputFormat::Html {
            println!("{}", html::banner_html(notification));
        }
        eprintln!(
            "[{}] {}",
            notification.severity.as_str(),
            notification.message
        );
    }

    outcome.exit_code()
}
