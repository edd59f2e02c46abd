//! View models for backend payloads
//!
//! Every type here is an ephemeral projection of what the server returned.
//! Nothing is cached between requests; list views are re-fetched on each
//! relevant action. Deserialization is lenient: the backend occasionally
//! omits fields or sends numbers where strings are expected, and a missing
//! field must render as an empty cell rather than fail the whole table.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::Path;

/// Email to platform-username association
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mapping {
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub username: String,
}

/// Permission flags granted to a collaborator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Permissions {
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub push: bool,
    #[serde(default)]
    pub pull: bool,
}

/// A user granted some permission level on a repository
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Collaborator {
    #[serde(default, deserialize_with = "lenient_string")]
    pub login: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub avatar_url: String,
    #[serde(default)]
    pub role_name: Option<String>,
    #[serde(default)]
    pub permissions: Option<Permissions>,
}

impl Collaborator {
    /// Role label; a missing or empty role shows as `N/A`
    pub fn role_label(&self) -> &str {
        match self.role_name.as_deref() {
            Some(role) if !role.is_empty() => role,
            _ => "N/A",
        }
    }

    /// Permissions, treating an absent object as nothing granted
    pub fn permissions(&self) -> Permissions {
        self.permissions.unwrap_or_default()
    }
}

/// One row of the server-side audit trail
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AuditEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub action: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub owner: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub repo: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub username: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub permission: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: String,
}

/// Repository summary as listed for a user
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Repository {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub full_name: String,
    #[serde(default)]
    pub private: Option<bool>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub html_url: String,
}

impl Repository {
    pub fn visibility(&self) -> &'static str {
        match self.private {
            Some(true) => "private",
            Some(false) => "public",
            None => "",
        }
    }
}

/// Report formats the backend can generate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Excel,
    Pdf,
}

impl ReportKind {
    pub fn path(&self) -> &'static str {
        match self {
            ReportKind::Excel => "/report_excel",
            ReportKind::Pdf => "/report_pdf",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportKind::Excel => "EXCEL",
            ReportKind::Pdf => "PDF",
        }
    }
}

/// A bulk change set held only long enough to upload it
#[derive(Debug, Clone, PartialEq)]
pub struct BulkFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl BulkFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a CSV from disk, keeping only its base name for the upload
    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "bulk.csv".to_string());
        Ok(Self { file_name, bytes })
    }
}

/// Display text for a JSON scalar; null and containers fall back to
/// empty and compact JSON respectively
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Server-supplied `message` field of a mutation response, if any
pub fn server_message(payload: &Value) -> Option<&str> {
    payload
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(scalar_text).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_audit_entry_accepts_numeric_id_and_missing_fields() {
        let entry: AuditEntry =
            serde_json::from_value(json!({"id": 7, "action": "add", "status": null})).unwrap();
        assert_eq!(entry.id, "7");
        assert_eq!(entry.action, "add");
        assert_eq!(entry.status, "");
        assert_eq!(entry.repo, "");
    }

    #[test]
    fn test_collaborator_role_defaults_to_na() {
        let collab: Collaborator =
            serde_json::from_value(json!({"login": "octo", "role_name": ""})).unwrap();
        assert_eq!(collab.role_label(), "N/A");
        assert_eq!(collab.permissions(), Permissions::default());

        let collab: Collaborator = serde_json::from_value(json!({
            "login": "octo",
            "role_name": "write",
            "permissions": {"admin": false, "push": true, "pull": true}
        }))
        .unwrap();
        assert_eq!(collab.role_label(), "write");
        assert!(collab.permissions().push);
    }

    #[test]
    fn test_server_message_ignores_empty() {
        assert_eq!(server_message(&json!({"message": "added"})), Some("added"));
        assert_eq!(server_message(&json!({"message": ""})), None);
        assert_eq!(server_message(&json!({"error": "nope"})), None);
        assert_eq!(server_message(&json!([1, 2])), None);
    }

    #[test]
    fn test_report_kind_routes() {
        assert_eq!(ReportKind::Excel.path(), "/report_excel");
        assert_eq!(ReportKind::Pdf.path(), "/report_pdf");
        assert_eq!(ReportKind::Pdf.label(), "PDF");
    }
}
