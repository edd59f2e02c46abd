// Demo mode: an in-memory access-management server to showcase the console
//
// Answers every endpoint the console uses with realistic data and keeps
// state between calls, so adding a collaborator really shows up in the
// collaborator table and the audit log. Responses arrive after a short
// delay so loading and notification timing look like the real thing.
//
// Run with: ACCESS_CONSOLE_DEMO=1 access-console

use crate::api::{ApiError, ApiRequest, Backend, Method, Payload};
use async_trait::async_trait;
use chrono::Local;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Account the demo server pretends to be authenticated as
const DEMO_LOGIN: &str = "octo-admin";

#[derive(Debug, Clone)]
struct DemoCollaborator {
    login: String,
    permission: String,
}

impl DemoCollaborator {
    fn to_json(&self) -> Value {
        let (admin, push) = match self.permission.as_str() {
            "admin" => (true, true),
            "push" | "maintain" => (false, true),
            _ => (false, false),
        };
        json!({
            "login": self.login,
            "avatar_url": format!("https://avatars.example.com/{}.png", self.login),
            "role_name": self.permission,
            "permissions": {"admin": admin, "push": push, "pull": true},
        })
    }
}

#[derive(Default)]
struct DemoState {
    /// email -> username
    mappings: BTreeMap<String, String>,
    /// "owner/repo" -> collaborators
    collaborators: BTreeMap<String, Vec<DemoCollaborator>>,
    /// newest first
    logs: Vec<Value>,
    next_log_id: u64,
}

impl DemoState {
    fn seeded() -> Self {
        let mut state = Self::default();
        for (email, username) in [
            ("ada@example.com", "ada-l"),
            ("grace@example.com", "ghopper"),
            ("linus@example.com", "torvalds"),
        ] {
            state.mappings.insert(email.to_string(), username.to_string());
        }
        state.collaborators.insert(
            "acme/widgets".to_string(),
            vec![
                DemoCollaborator {
                    login: DEMO_LOGIN.to_string(),
                    permission: "admin".to_string(),
                },
                DemoCollaborator {
                    login: "ghopper".to_string(),
                    permission: "push".to_string(),
                },
            ],
        );
        state.log("add", "acme", "widgets", "ghopper", "push", "success");
        state
    }

    fn log(&mut self, action: &str, owner: &str, repo: &str, username: &str, permission: &str, status: &str) {
        self.next_log_id += 1;
        self.logs.insert(
            0,
            json!({
                "id": self.next_log_id,
                "timestamp": Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
                "action": action,
                "owner": owner,
                "repo": repo,
                "username": username,
                "permission": permission,
                "status": status,
            }),
        );
    }

    fn upsert_collaborator(&mut self, owner: &str, repo: &str, username: &str, permission: &str) {
        let list = self
            .collaborators
            .entry(format!("{}/{}", owner, repo))
            .or_default();
        match list.iter_mut().find(|c| c.login == username) {
            Some(existing) => existing.permission = permission.to_string(),
            None => list.push(DemoCollaborator {
                login: username.to_string(),
                permission: permission.to_string(),
            }),
        }
    }

    fn remove_collaborator(&mut self, owner: &str, repo: &str, username: &str) -> bool {
        let Some(list) = self.collaborators.get_mut(&format!("{}/{}", owner, repo)) else {
            return false;
        };
        let before = list.len();
        list.retain(|c| c.login != username);
        list.len() != before
    }
}

/// Stateful stand-in for the access-management server
pub struct DemoBackend {
    state: Mutex<DemoState>,
    latency: Duration,
}

impl DemoBackend {
    pub fn new() -> Self {
        Self::with_latency(Duration::from_millis(250))
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            state: Mutex::new(DemoState::seeded()),
            latency,
        }
    }

    fn handle(&self, request: &ApiRequest) -> Result<Value, ApiError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let q = |key: &str| request.query_value(key).unwrap_or("").to_string();

        let body = match (request.method, request.path.as_str()) {
            (Method::Post, "/add_mapping") => {
                let Payload::Json(body) = &request.payload else {
                    return Err(ApiError::Status {
                        status: 415,
                        body: "expected JSON".to_string(),
                    });
                };
                let email = body.get("email").and_then(Value::as_str).unwrap_or("");
                let username = body.get("username").and_then(Value::as_str).unwrap_or("");
                if email.is_empty() || username.is_empty() {
                    json!({"error": "Email and Username are required."})
                } else {
                    state.mappings.insert(email.to_string(), username.to_string());
                    json!({"message": format!("Mapping added: {} → {}", email, username)})
                }
            }
            (Method::Get, "/get_mappings") => Value::Array(
                state
                    .mappings
                    .iter()
                    .map(|(email, username)| json!({"email": email, "username": username}))
                    .collect(),
            ),
            (Method::Get, "/search_email") => {
                let email = q("email");
                if email.is_empty() {
                    json!({"error": "Please provide an email."})
                } else {
                    match state.mappings.get(&email) {
                        Some(username) => json!({
                            "email": email,
                            "username": username,
                            "status": "Found in internal mapping",
                        }),
                        None => json!({
                            "email": email,
                            "username": null,
                            "status": "Not found in internal mapping. Add it manually.",
                        }),
                    }
                }
            }
            (Method::Get, "/repos") => {
                let username = q("username");
                if username.is_empty() {
                    json!({"error": "Please provide a username."})
                } else {
                    json!([
                        {
                            "name": "widgets",
                            "full_name": format!("{}/widgets", username),
                            "private": false,
                            "html_url": format!("https://github.com/{}/widgets", username),
                        },
                        {
                            "name": "infra",
                            "full_name": format!("{}/infra", username),
                            "private": true,
                            "html_url": format!("https://github.com/{}/infra", username),
                        },
                    ])
                }
            }
            (Method::Get, "/user") => json!({
                "login": DEMO_LOGIN,
                "name": "Demo Administrator",
                "html_url": format!("https://github.com/{}", DEMO_LOGIN),
            }),
            (Method::Get, "/collaborators") => {
                let key = format!("{}/{}", q("owner"), q("repo"));
                Value::Array(
                    state
                        .collaborators
                        .get(&key)
                        .map(|list| list.iter().map(DemoCollaborator::to_json).collect())
                        .unwrap_or_default(),
                )
            }
            (Method::Get, "/add_collaborator") | (Method::Get, "/modify_permission") => {
                let (owner, repo, username) = (q("owner"), q("repo"), q("username"));
                let mut permission = q("permission");
                if permission.is_empty() {
                    permission = "push".to_string();
                }
                let action = if request.path == "/add_collaborator" {
                    "add"
                } else {
                    "modify"
                };
                if username.is_empty() {
                    json!({"error": "Please provide owner, repo, and username."})
                } else {
                    state.upsert_collaborator(&owner, &repo, &username, &permission);
                    state.log(action, &owner, &repo, &username, &permission, "success");
                    json!({"message": format!(
                        "{} added successfully with '{}' permission.",
                        username, permission
                    )})
                }
            }
            (Method::Get, "/remove_collaborator") => {
                let (owner, repo, username) = (q("owner"), q("repo"), q("username"));
                if state.remove_collaborator(&owner, &repo, &username) {
                    state.log("remove", &owner, &repo, &username, "", "success");
                    json!({"message": format!("{} removed successfully.", username)})
                } else {
                    state.log("remove", &owner, &repo, &username, "", "failed");
                    json!({"error": 404, "message": "Not Found"})
                }
            }
            (Method::Post, "/bulk_preview") => {
                let rows = uploaded_rows(request)?;
                json!({"preview": rows})
            }
            (Method::Post, "/bulk_apply") => {
                let (owner, repo) = (q("owner"), q("repo"));
                let mut results = Vec::new();
                for row in uploaded_rows(request)? {
                    let username = row["username"].as_str().unwrap_or_default().to_string();
                    let action = row["action"].as_str().unwrap_or_default().to_string();
                    let permission = match row["permission"].as_str() {
                        Some(p) if !p.is_empty() => p.to_string(),
                        _ => "push".to_string(),
                    };
                    let result = match action.as_str() {
                        "add" | "modify" => {
                            state.upsert_collaborator(&owner, &repo, &username, &permission);
                            json!({"message": format!("{} added successfully.", username)})
                        }
                        "remove" => {
                            state.remove_collaborator(&owner, &repo, &username);
                            json!({"message": format!("{} removed successfully.", username)})
                        }
                        other => json!({
                            "error": "Invalid action",
                            "message": format!("Action '{}' is not supported.", other),
                        }),
                    };
                    let status = if result.get("error").is_some() {
                        "failed"
                    } else {
                        "success"
                    };
                    state.log(&action, &owner, &repo, &username, &permission, status);
                    results.push(json!({"username": username, "result": result}));
                }
                json!({"results": results})
            }
            (Method::Get, "/report_excel") | (Method::Get, "/report_pdf") => {
                let extension = if request.path == "/report_pdf" {
                    ("PDF", "pdf")
                } else {
                    ("Excel", "xlsx")
                };
                json!({"message": format!(
                    "{} report generated: {}_access_report.{}",
                    extension.0,
                    q("repo"),
                    extension.1
                )})
            }
            (Method::Get, "/get_logs") => Value::Array(state.logs.clone()),
            _ => {
                return Err(ApiError::Status {
                    status: 404,
                    body: format!("demo server has no route {}", request.route()),
                })
            }
        };
        Ok(body)
    }
}

impl Default for DemoBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// One line of a bulk upload; `permission` may be absent or blank
#[derive(Debug, Deserialize)]
struct BulkRow {
    username: String,
    action: String,
    #[serde(default)]
    permission: String,
}

/// Parse the uploaded CSV into `{username, action, permission}` rows
fn uploaded_rows(request: &ApiRequest) -> Result<Vec<Value>, ApiError> {
    let Payload::Upload(file) = &request.payload else {
        return Ok(Vec::new());
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(&file.bytes[..]);

    let headers = reader.headers().map_err(|e| ApiError::Status {
        status: 400,
        body: format!("Failed to read CSV headers: {}", e),
    })?;
    let has = |name: &str| headers.iter().any(|h| h == name);
    if !has("username") || !has("action") {
        return Err(ApiError::Status {
            status: 500,
            body: "CSV needs username and action columns".to_string(),
        });
    }

    reader
        .deserialize::<BulkRow>()
        .map(|row| -> Result<Value, ApiError> {
            let row = row.map_err(|e| ApiError::Status {
                status: 400,
                body: format!("Failed to read CSV record: {}", e),
            })?;
            Ok(json!({
                "username": row.username,
                "action": row.action,
                "permission": row.permission,
            }))
        })
        .collect()
}

#[async_trait]
impl Backend for DemoBackend {
    fn name(&self) -> &'static str {
        "demo"
    }

    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let result = self.handle(&request);
        tracing::trace!("demo {} -> {}", request, if result.is_ok() { "ok" } else { "error" });
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::endpoints;
    use crate::model::BulkFile;

    fn backend() -> DemoBackend {
        DemoBackend::with_latency(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_add_then_remove_collaborator_updates_state_and_logs() {
        let demo = backend();
        let added = demo
            .send(endpoints::add_collaborator("acme", "widgets", "ada-l", "admin"))
            .await
            .unwrap();
        assert!(added["message"].as_str().unwrap().contains("ada-l"));

        let list = demo
            .send(endpoints::collaborators("acme", "widgets"))
            .await
            .unwrap();
        assert_eq!(list.as_array().unwrap().len(), 3);

        demo.send(endpoints::remove_collaborator("acme", "widgets", "ada-l"))
            .await
            .unwrap();
        let logs = demo.send(endpoints::get_logs()).await.unwrap();
        assert_eq!(logs[0]["action"], "remove");
        assert_eq!(logs[1]["action"], "add");
    }

    #[tokio::test]
    async fn test_search_reports_missing_email() {
        let demo = backend();
        let found = demo.send(endpoints::search_email("ada@example.com")).await.unwrap();
        assert_eq!(found["username"], "ada-l");

        let empty = demo.send(endpoints::search_email("")).await.unwrap();
        assert_eq!(empty["error"], "Please provide an email.");
    }

    #[tokio::test]
    async fn test_bulk_preview_parses_csv() {
        let demo = backend();
        let file = BulkFile::new(
            "changes.csv",
            "username,action,permission\nbob,add,push\ncarol,remove,\n",
        );
        let preview = demo.send(endpoints::bulk_preview(file)).await.unwrap();
        let rows = preview["preview"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["action"], "remove");
        assert_eq!(rows[1]["permission"], "");
    }

    #[tokio::test]
    async fn test_bulk_preview_handles_quoted_fields() {
        let demo = backend();
        let file = BulkFile::new(
            "changes.csv",
            "\"username\",\"action\",\"permission\"\n\"smith, j\",add,push\n",
        );
        let preview = demo.send(endpoints::bulk_preview(file)).await.unwrap();
        let rows = preview["preview"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["username"], "smith, j");
        assert_eq!(rows[0]["action"], "add");
        assert_eq!(rows[0]["permission"], "push");
    }

    #[tokio::test]
    async fn test_bulk_preview_requires_columns() {
        let demo = backend();
        let file = BulkFile::new("changes.csv", "user,permission\nbob,push\n");
        let err = demo.send(endpoints::bulk_preview(file)).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_repos_and_current_user() {
        let demo = backend();
        let repos = demo.send(endpoints::repos("octo")).await.unwrap();
        assert_eq!(repos[0]["full_name"], "octo/widgets");

        let missing = demo.send(endpoints::repos("")).await.unwrap();
        assert_eq!(missing["error"], "Please provide a username.");

        let user = demo.send(endpoints::current_user()).await.unwrap();
        assert_eq!(user["login"], DEMO_LOGIN);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let demo = backend();
        let err = demo.send(ApiRequest::get("/nope")).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 404, .. }));
    }
}
