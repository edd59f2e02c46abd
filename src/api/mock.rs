//! Scripted in-memory [`Backend`]
//!
//! Replies are registered per route (`"GET /path"`). One-shot replies are
//! consumed first, in order; after that the route's sticky reply answers
//! every call. Unknown routes fail with HTTP 404. Every request is recorded
//! so callers can assert on what was (or was not) sent.

use super::{ApiError, ApiRequest, Backend, Method};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// A canned answer, optionally delivered after a delay
#[derive(Debug, Clone)]
pub struct MockReply {
    result: Result<Value, ApiError>,
    delay: Duration,
}

impl MockReply {
    pub fn ok(body: Value) -> Self {
        Self {
            result: Ok(body),
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            result: Err(ApiError::Status {
                status,
                body: String::new(),
            }),
            delay: Duration::ZERO,
        }
    }

    pub fn error(error: ApiError) -> Self {
        Self {
            result: Err(error),
            delay: Duration::ZERO,
        }
    }

    /// Deliver this reply only after `delay` (tokio time, so paused clocks apply)
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Default)]
struct Route {
    queued: VecDeque<MockReply>,
    sticky: Option<MockReply>,
}

/// Backend that answers from a script instead of the network
#[derive(Default)]
pub struct MockBackend {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(method: Method, path: &str) -> String {
        format!("{} {}", method, path)
    }

    /// Answer every call to the route with `reply`
    pub fn on(&self, method: Method, path: &str, reply: MockReply) -> &Self {
        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        routes.entry(Self::key(method, path)).or_default().sticky = Some(reply);
        self
    }

    /// Answer the next call to the route with `reply`
    pub fn once(&self, method: Method, path: &str, reply: MockReply) -> &Self {
        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        routes
            .entry(Self::key(method, path))
            .or_default()
            .queued
            .push_back(reply);
        self
    }

    /// Sticky JSON reply for a GET route
    pub fn get_json(&self, path: &str, body: Value) -> &Self {
        self.on(Method::Get, path, MockReply::ok(body))
    }

    /// All requests received so far, in arrival order
    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests received for a path (any method)
    pub fn call_count(&self, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|r| r.path == path)
            .count()
    }

    fn next_reply(&self, route: &str) -> Option<MockReply> {
        let mut routes = self.routes.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = routes.get_mut(route)?;
        entry.queued.pop_front().or_else(|| entry.sticky.clone())
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let route = request.route();
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        let Some(reply) = self.next_reply(&route) else {
            return Err(ApiError::Status {
                status: 404,
                body: format!("no mock for {}", route),
            });
        };

        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        reply.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_once_replies_take_precedence_over_sticky() {
        let backend = MockBackend::new();
        backend.get_json("/get_logs", json!([]));
        backend.once(Method::Get, "/get_logs", MockReply::status(500));

        let first = backend.send(ApiRequest::get("/get_logs")).await;
        let second = backend.send(ApiRequest::get("/get_logs")).await;

        assert!(matches!(first, Err(ApiError::Status { status: 500, .. })));
        assert_eq!(second.unwrap(), json!([]));
        assert_eq!(backend.call_count("/get_logs"), 2);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let backend = MockBackend::new();
        let result = backend.send(ApiRequest::post("/nowhere")).await;
        assert!(matches!(result, Err(ApiError::Status { status: 404, .. })));
        assert_eq!(backend.calls().len(), 1);
    }
}
