use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Per-request key/value session owned by the host.
///
/// The host loads it before the request is handled and commits it
/// (for example by emitting a `Set-Cookie` header) afterwards.
pub trait Session {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

/// Read access to the fields submitted in a request body.
pub trait SubmittedFields {
    fn field(&self, name: &str) -> Option<&str>;
}

impl SubmittedFields for HashMap<String, String> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

/// HashMap-backed [`Session`] that serializes as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemorySession {
    entries: HashMap<String, String>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Session for MemorySession {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }
}

/// Opaque CSRF token as stored in the session and embedded in forms.
///
/// This provides compile-time safety to prevent mixing up tokens with other string types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthenticityToken(String);

impl AuthenticityToken {
    pub fn new(token: String) -> Self {
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for AuthenticityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AuthenticityToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
