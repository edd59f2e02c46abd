//! reqwest-backed [`Backend`] talking to the access-management server

use super::{ApiError, ApiRequest, Backend, Method, Payload};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::time::Duration;

/// HTTP client bound to one backend base URL
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a client for `base_url`
    ///
    /// # Arguments
    /// * `base_url` - Server root, e.g. `http://127.0.0.1:5000`
    /// * `timeout` - Per-request timeout; `None` waits indefinitely
    ///
    /// # Errors
    /// Returns an error if the URL has no scheme or client creation fails
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::InvalidRequest(format!(
                "Backend URL must start with http:// or https://: {}",
                base_url
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            ApiError::InvalidRequest(format!("Failed to create HTTP client: {}", e))
        })?;

        tracing::info!(
            "Initialized HTTP backend: {} (timeout: {:?})",
            base_url,
            timeout
        );

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn build(&self, request: ApiRequest) -> Result<reqwest::RequestBuilder, ApiError> {
        let url = self.url(&request.path);
        let mut req = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };

        if !request.query.is_empty() {
            req = req.query(&request.query);
        }

        req = match request.payload {
            Payload::Empty => req,
            Payload::Json(body) => req.json(&body),
            Payload::Upload(file) => {
                let part = Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str("text/csv")
                    .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
                req.multipart(Form::new().part("file", part))
            }
        };

        Ok(req)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let response = self.build(request)?.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let text = response.text().await.map_err(map_reqwest_error)?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(decode_body(text))
    }
}

fn map_reqwest_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Transport(e.to_string())
    }
}

/// JSON when the body parses, raw text otherwise, null when empty
fn decode_body(text: String) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}
