//! Request builders for the access-management backend
//!
//! One function per endpoint, matching the paths and parameter names the
//! server expects. Values are forwarded verbatim.

use super::ApiRequest;
use crate::model::{BulkFile, ReportKind};
use serde_json::json;

pub fn add_mapping(email: &str, username: &str) -> ApiRequest {
    ApiRequest::post("/add_mapping").json(json!({
        "email": email,
        "username": username,
    }))
}

pub fn get_mappings() -> ApiRequest {
    ApiRequest::get("/get_mappings")
}

pub fn search_email(email: &str) -> ApiRequest {
    ApiRequest::get("/search_email").query("email", email)
}

pub fn repos(username: &str) -> ApiRequest {
    ApiRequest::get("/repos").query("username", username)
}

pub fn collaborators(owner: &str, repo: &str) -> ApiRequest {
    ApiRequest::get("/collaborators")
        .query("owner", owner)
        .query("repo", repo)
}

/// The backend exposes mutations as GET endpoints
pub fn add_collaborator(owner: &str, repo: &str, username: &str, permission: &str) -> ApiRequest {
    ApiRequest::get("/add_collaborator")
        .query("owner", owner)
        .query("repo", repo)
        .query("username", username)
        .query("permission", permission)
}

pub fn remove_collaborator(owner: &str, repo: &str, username: &str) -> ApiRequest {
    ApiRequest::get("/remove_collaborator")
        .query("owner", owner)
        .query("repo", repo)
        .query("username", username)
}

pub fn modify_permission(owner: &str, repo: &str, username: &str, permission: &str) -> ApiRequest {
    ApiRequest::get("/modify_permission")
        .query("owner", owner)
        .query("repo", repo)
        .query("username", username)
        .query("permission", permission)
}

pub fn bulk_preview(file: BulkFile) -> ApiRequest {
    ApiRequest::post("/bulk_preview").upload(file)
}

pub fn bulk_apply(owner: &str, repo: &str, file: BulkFile) -> ApiRequest {
    ApiRequest::post("/bulk_apply")
        .query("owner", owner)
        .query("repo", repo)
        .upload(file)
}

pub fn report(kind: ReportKind, owner: &str, repo: &str) -> ApiRequest {
    ApiRequest::get(kind.path())
        .query("owner", owner)
        .query("repo", repo)
}

pub fn get_logs() -> ApiRequest {
    ApiRequest::get("/get_logs")
}

pub fn current_user() -> ApiRequest {
    ApiRequest::get("/user")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Method, Payload};

    #[test]
    fn test_add_mapping_posts_json_body() {
        let req = add_mapping("a@x.com", "alice");
        assert_eq!(req.method, Method::Post);
        assert_eq!(
            req.payload,
            Payload::Json(json!({"email": "a@x.com", "username": "alice"}))
        );
    }

    #[test]
    fn test_bulk_apply_carries_target_and_file() {
        let file = BulkFile::new("changes.csv", "username,action\nbob,add\n");
        let req = bulk_apply("acme", "widgets", file.clone());
        assert_eq!(req.to_string(), "POST /bulk_apply?owner=acme&repo=widgets");
        assert_eq!(req.payload, Payload::Upload(file));
    }

    #[test]
    fn test_report_path_follows_kind() {
        assert_eq!(
            report(ReportKind::Excel, "acme", "widgets").to_string(),
            "GET /report_excel?owner=acme&repo=widgets"
        );
        assert_eq!(report(ReportKind::Pdf, "acme", "w").path, "/report_pdf");
    }
}
