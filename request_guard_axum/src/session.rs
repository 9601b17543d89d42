use axum::extract::FromRequestParts;
use http::{StatusCode, request::Parts};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

use request_guard::{
    AuthenticityToken, CsrfError, MemorySession, RG_CSRF_SESSION_KEY, create_authenticity_token,
};

/// Session shared between the host's session layer, the CSRF middleware and
/// handlers for the duration of one request.
///
/// The host loads the session, inserts a `GuardSession` into the request
/// extensions, and commits [`GuardSession::snapshot`] once the response is
/// produced.
///
/// # Example
///
/// ```no_run
/// use request_guard_axum::GuardSession;
///
/// async fn form(session: GuardSession) -> String {
///     match session.authenticity_token().await {
///         Ok(token) => token.to_string(),
///         Err(e) => e.to_string(),
///     }
/// }
/// ```
#[derive(Clone, Debug, Default)]
pub struct GuardSession(Arc<Mutex<MemorySession>>);

impl GuardSession {
    pub fn new(session: MemorySession) -> Self {
        Self(Arc::new(Mutex::new(session)))
    }

    pub async fn lock(&self) -> MutexGuard<'_, MemorySession> {
        self.0.lock().await
    }

    /// Copy of the current session contents, for the host to persist
    pub async fn snapshot(&self) -> MemorySession {
        self.0.lock().await.clone()
    }

    /// Issues a new token under the configured key (`RG_CSRF_SESSION_KEY`)
    pub async fn authenticity_token(&self) -> Result<AuthenticityToken, CsrfError> {
        self.authenticity_token_for(RG_CSRF_SESSION_KEY.as_str())
            .await
    }

    pub async fn authenticity_token_for(&self, key: &str) -> Result<AuthenticityToken, CsrfError> {
        let mut session = self.0.lock().await;
        create_authenticity_token(&mut *session, key)
    }
}

impl<S> FromRequestParts<S> for GuardSession
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<GuardSession>().cloned().ok_or_else(|| {
            tracing::error!("GuardSession missing from request extensions");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Session not available".to_string(),
            )
        })
    }
}
