//! Backend client abstraction
//!
//! The console never talks to the network directly. Every call goes through
//! the [`Backend`] trait so that the controller can be driven by a real HTTP
//! client in production and by a scripted in-memory backend in tests and
//! demo mode.
//!
//! # Architecture
//!
//! ```text
//! Backend trait
//! ├── HttpBackend  (reqwest, talks to the access-management server)
//! └── MockBackend  (scripted replies, records every request)
//! ```

pub mod endpoints;
pub mod http;
#[cfg(test)]
pub mod mock;

pub use http::HttpBackend;
#[cfg(test)]
pub use mock::MockBackend;

use crate::model::BulkFile;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

/// HTTP method used by the backend endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Empty,
    Json(Value),
    /// Multipart upload with the file under the `file` part
    Upload(BulkFile),
}

/// A single backend call: method, path, query pairs and body
///
/// Query values are passed through untouched; empty strings are sent as-is
/// and validation is left to the server.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub payload: Payload,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            payload: Payload::Empty,
        }
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            ..Self::get(path)
        }
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.payload = Payload::Json(body);
        self
    }

    pub fn upload(mut self, file: BulkFile) -> Self {
        self.payload = Payload::Upload(file);
        self
    }

    /// Value of a query parameter (first occurrence)
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Routing key used by the mock backend and in logs: `"GET /path"`
    pub fn route(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)?;
        for (i, (key, value)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, key, value)?;
        }
        Ok(())
    }
}

/// Errors that can occur while talking to the backend
///
/// All variants are surfaced to the user the same way (a per-action failure
/// notification); the detail only reaches the logs.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Connection refused, DNS failure, broken body, etc.
    Transport(String),
    /// Server answered with a non-success status
    Status { status: u16, body: String },
    /// Request exceeded the configured timeout
    Timeout,
    /// Request could not be built (bad base URL, invalid upload)
    InvalidRequest(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(msg) => write!(f, "Transport error: {}", msg),
            ApiError::Status { status, body } if body.is_empty() => {
                write!(f, "Server returned HTTP {}", status)
            }
            ApiError::Status { status, body } => {
                write!(f, "Server returned HTTP {}: {}", status, body)
            }
            ApiError::Timeout => write!(f, "Request timed out"),
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// Anything that can answer console requests
///
/// A successful call yields the decoded JSON body. Bodies that are not JSON
/// come back as `Value::String` so diagnostic views can still show them.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Perform one request
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_display_keeps_empty_values() {
        let req = ApiRequest::get("/collaborators")
            .query("owner", "acme")
            .query("repo", "");
        assert_eq!(req.to_string(), "GET /collaborators?owner=acme&repo=");
        assert_eq!(req.query_value("repo"), Some(""));
        assert_eq!(req.route(), "GET /collaborators");
    }

    #[test]
    fn test_status_error_display() {
        let err = ApiError::Status {
            status: 502,
            body: String::new(),
        };
        assert_eq!(err.to_string(), "Server returned HTTP 502");
    }
}
