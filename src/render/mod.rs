//! Pure rendering: server payload in, render instruction out
//!
//! Nothing in this module touches a screen. A [`View`] describes what a
//! region should show; the adapters ([`html`], [`text`], and the TUI's
//! region panel) turn it into markup or widgets.
//!
//! Rules shared by every table view:
//! - a non-empty array renders one body row per element, in server order,
//!   with no filtering or reordering;
//! - an empty array (or any non-array payload) renders the view's
//!   "no records" placeholder, never an empty table shell.

pub mod html;
pub mod text;

use crate::model::{scalar_text, AuditEntry, Collaborator, Mapping, Repository};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// One table cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    /// Avatar or similar image reference
    Image { src: String, alt: String },
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    /// Plain-text form (images degrade to their URL)
    pub fn as_text(&self) -> &str {
        match self {
            Cell::Text(s) => s,
            Cell::Image { src, .. } => src,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// What a region displays
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Table(Table),
    /// "No ... found." message shown instead of an empty table
    Placeholder(String),
    /// Diagnostic output (pretty JSON or raw text)
    Text(String),
}

impl View {
    pub fn is_table(&self) -> bool {
        matches!(self, View::Table(_))
    }

    /// Number of body rows (0 for non-table views)
    pub fn row_count(&self) -> usize {
        match self {
            View::Table(table) => table.rows.len(),
            _ => 0,
        }
    }
}

/// The tabular views of the console and their column mappings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Mappings,
    Repositories,
    Collaborators,
    AuditLog,
}

impl TableKind {
    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            TableKind::Mappings => &["Email", "Username"],
            TableKind::Repositories => &["Name", "Full name", "Visibility", "URL"],
            TableKind::Collaborators => &["Avatar", "Username", "Role", "Permissions"],
            TableKind::AuditLog => &[
                "ID",
                "Action",
                "Repo",
                "User",
                "Permission",
                "Status",
                "Timestamp",
            ],
        }
    }

    pub fn empty_message(&self) -> &'static str {
        match self {
            TableKind::Mappings => "No mappings found.",
            TableKind::Repositories => "No repositories found.",
            TableKind::Collaborators => "No collaborators found.",
            TableKind::AuditLog => "No logs found.",
        }
    }

    /// Map one payload element to its row
    pub fn row(&self, item: &Value) -> Vec<Cell> {
        match self {
            TableKind::Mappings => {
                let m: Mapping = lenient(item);
                vec![Cell::Text(m.email), Cell::Text(m.username)]
            }
            TableKind::Repositories => {
                let r: Repository = lenient(item);
                let visibility = r.visibility().to_string();
                vec![
                    Cell::Text(r.name),
                    Cell::Text(r.full_name),
                    Cell::Text(visibility),
                    Cell::Text(r.html_url),
                ]
            }
            TableKind::Collaborators => {
                let c: Collaborator = lenient(item);
                let perms = c.permissions();
                vec![
                    Cell::Image {
                        src: c.avatar_url.clone(),
                        alt: c.login.clone(),
                    },
                    Cell::text(c.login.as_str()),
                    Cell::text(c.role_label()),
                    Cell::Text(format!(
                        "Admin: {} | Push: {} | Pull: {}",
                        flag(perms.admin),
                        flag(perms.push),
                        flag(perms.pull)
                    )),
                ]
            }
            TableKind::AuditLog => {
                let e: AuditEntry = lenient(item);
                vec![
                    Cell::Text(e.id),
                    Cell::Text(e.action),
                    Cell::Text(e.repo),
                    Cell::Text(e.username),
                    Cell::Text(e.permission),
                    Cell::Text(e.status),
                    Cell::Text(e.timestamp),
                ]
            }
        }
    }
}

/// How a region turns a payload into a view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderKind {
    Table(TableKind),
    Text,
}

pub fn render(kind: RenderKind, payload: &Value) -> View {
    match kind {
        RenderKind::Table(table) => render_table(table, payload),
        RenderKind::Text => render_text(payload),
    }
}

pub fn render_table(kind: TableKind, payload: &Value) -> View {
    match payload.as_array() {
        Some(items) if !items.is_empty() => View::Table(Table {
            headers: kind.headers().iter().map(|h| h.to_string()).collect(),
            rows: items.iter().map(|item| kind.row(item)).collect(),
        }),
        _ => View::Placeholder(kind.empty_message().to_string()),
    }
}

/// Pretty JSON, or the raw body when the server did not send JSON
pub fn render_text(payload: &Value) -> View {
    let text = match payload {
        Value::String(raw) => raw.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| scalar_text(other)),
    };
    View::Text(text)
}

fn flag(granted: bool) -> &'static str {
    if granted {
        "✅"
    } else {
        "❌"
    }
}

/// Elements that are not objects (or have wrong field types) render as blank rows
fn lenient<T: DeserializeOwned + Default>(item: &Value) -> T {
    serde_json::from_value(item.clone()).unwrap_or_default()
}
