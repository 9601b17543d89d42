//! Shared helpers for the integration tests
//!
//! They play the part of the host application: a session store that loads
//! and commits sessions between requests, and a request type that carries
//! headers plus a raw body.

use http::{HeaderMap, HeaderValue, Method, header};
use request_guard::{CorsError, MemorySession, OriginPredicate, RequestBody, async_trait};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Host-side session persistence keyed by session id
#[derive(Default)]
pub struct SessionStore {
    sessions: HashMap<String, MemorySession>,
}

impl SessionStore {
    /// Load a session for the request; unknown ids start empty
    pub fn load(&self, session_id: &str) -> MemorySession {
        self.sessions.get(session_id).cloned().unwrap_or_default()
    }

    /// Commit the session at the end of the request
    pub fn commit(&mut self, session_id: &str, session: MemorySession) {
        self.sessions.insert(session_id.to_string(), session);
    }

    /// Drop the session, as a logout would
    pub fn reset(&mut self, session_id: &str) {
        self.sessions.remove(session_id);
    }
}

/// Minimal inbound request as seen by the host
pub struct TestRequest {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestRequest {
    pub fn get() -> Self {
        Self {
            method: Method::GET,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn post_form(body: &str) -> Self {
        Self::post("application/x-www-form-urlencoded", body)
    }

    pub fn post_json(body: serde_json::Value) -> Self {
        Self::post("application/json", &body.to_string())
    }

    pub fn post(content_type: &'static str, body: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        Self {
            method: Method::POST,
            headers,
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn with_origin(mut self, origin: &str) -> Self {
        let value = HeaderValue::from_str(origin).expect("test origin must be a valid header");
        self.headers.insert(header::ORIGIN, value);
        self
    }

    pub async fn submitted_fields(&self) -> RequestBody {
        let content_type = self
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());
        RequestBody::parse(content_type, &self.body).await
    }
}

/// Async allow-list lookup that counts its calls
pub struct AllowListPredicate {
    allowed: HashSet<String>,
    pub calls: Arc<AtomicUsize>,
    fail: bool,
}

impl AllowListPredicate {
    pub fn new(origins: &[&str]) -> Self {
        Self {
            allowed: origins.iter().map(|o| o.to_string()).collect(),
            calls: Arc::new(AtomicUsize::new(0)),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(&[])
        }
    }

    pub fn call_count(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl OriginPredicate for AllowListPredicate {
    async fn is_allowed(&self, origin: &str) -> Result<bool, CorsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Simulate suspending on I/O
        tokio::task::yield_now().await;
        if self.fail {
            return Err(CorsError::Predicate("allow-list backend unavailable".to_string()));
        }
        Ok(self.allowed.contains(origin))
    }
}
