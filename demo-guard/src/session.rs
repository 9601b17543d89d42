use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{TypedHeader, headers};
use http::{HeaderValue, StatusCode, header::SET_COOKIE};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use request_guard_axum::{GuardSession, MemorySession, gen_random_string};

pub(crate) const SESSION_COOKIE_NAME: &str = "rg_session";

/// In-memory session persistence keyed by the session cookie
#[derive(Clone, Default)]
pub(crate) struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, MemorySession>>>,
}

impl SessionStore {
    async fn load(&self, session_id: &str) -> Option<MemorySession> {
        self.sessions.lock().await.get(session_id).cloned()
    }

    async fn commit(&self, session_id: String, session: MemorySession) {
        self.sessions.lock().await.insert(session_id, session);
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

/// Loads the session named by the cookie (or starts one), exposes it to the
/// rest of the stack as a `GuardSession`, and commits it after the handler.
///
/// A new session is only stored, and its cookie only set, once a handler
/// has written something into it.
pub(crate) async fn session_layer(
    State(store): State<SessionStore>,
    cookies: Option<TypedHeader<headers::Cookie>>,
    mut req: Request,
    next: Next,
) -> Response {
    let cookie_id = cookies
        .as_ref()
        .and_then(|cookies| cookies.get(SESSION_COOKIE_NAME))
        .map(str::to_owned);

    let existing = match cookie_id {
        Some(id) => store.load(&id).await.map(|session| (id, session)),
        None => None,
    };

    let (session_id, session, is_new) = match existing {
        Some((id, session)) => (id, session, false),
        None => match gen_random_string(32) {
            Ok(id) => {
                tracing::debug!("Starting new session");
                (id, MemorySession::new(), true)
            }
            Err(e) => {
                tracing::error!("Failed to create session id: {}", e);
                return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
            }
        },
    };

    let guard = GuardSession::new(session);
    req.extensions_mut().insert(guard.clone());

    let mut response = next.run(req).await;
    let snapshot = guard.snapshot().await;
    if is_new && snapshot.is_empty() {
        return response;
    }
    store.commit(session_id.clone(), snapshot).await;

    if is_new {
        let cookie = format!("{SESSION_COOKIE_NAME}={session_id}; Path=/; HttpOnly; SameSite=Lax");
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Failed to build session cookie: {}", e),
        }
    }
    response
}
