use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::{
    HeaderValue, StatusCode,
    header::{CONTENT_LENGTH, CONTENT_TYPE, ORIGIN},
};
use std::sync::Arc;

use request_guard::{
    CorsConfig, CsrfError, RG_CSRF_SESSION_KEY, RequestBody, evaluate_origin, is_preflight,
    verify_authenticity_token, write_cors_headers,
};

use super::config::RG_CORS_HANDLE_PREFLIGHT;
use super::error::{CsrfRejection, IntoResponseError};
use super::session::GuardSession;

/// State for [`cors_middleware`].
///
/// ```no_run
/// use axum::{Router, middleware::from_fn_with_state, routing::get};
/// use request_guard_axum::{CorsConfig, CorsGuard, cors_middleware};
///
/// let guard = CorsGuard::new(CorsConfig::default());
/// let app: Router = Router::new()
///     .route("/api", get(|| async { "ok" }))
///     .layer(from_fn_with_state(guard, cors_middleware));
/// ```
#[derive(Clone, Debug)]
pub struct CorsGuard {
    config: Arc<CorsConfig>,
    handle_preflight: bool,
}

impl CorsGuard {
    /// Preflight handling follows `RG_CORS_HANDLE_PREFLIGHT`
    pub fn new(config: CorsConfig) -> Self {
        Self {
            config: Arc::new(config),
            handle_preflight: *RG_CORS_HANDLE_PREFLIGHT,
        }
    }

    pub fn handle_preflight(mut self, enabled: bool) -> Self {
        self.handle_preflight = enabled;
        self
    }

    pub fn config(&self) -> &CorsConfig {
        &self.config
    }
}

/// Evaluates the request origin and writes CORS headers onto the response.
///
/// Preflight requests are answered with `204 No Content` without calling the
/// inner handler, unless preflight handling is disabled. A failing origin
/// predicate yields `500` and the handler is not called.
pub async fn cors_middleware(State(guard): State<CorsGuard>, req: Request, next: Next) -> Response {
    let origin = req
        .headers()
        .get(ORIGIN)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let decision = match evaluate_origin(
        origin.as_deref(),
        guard.config.origin(),
        guard.config.credentials(),
    )
    .await
    .into_response_error()
    {
        Ok(decision) => decision,
        Err(err) => return err.into_response(),
    };

    if guard.handle_preflight && is_preflight(req.method(), req.headers()) {
        tracing::debug!(
            "Answering CORS preflight for {} (allowed: {})",
            req.uri().path(),
            decision.allow
        );
        let mut response = StatusCode::NO_CONTENT.into_response();
        write_cors_headers(response.headers_mut(), &decision, &guard.config);
        response
            .headers_mut()
            .insert(CONTENT_LENGTH, HeaderValue::from_static("0"));
        return response;
    }

    let mut response = next.run(req).await;
    write_cors_headers(response.headers_mut(), &decision, &guard.config);
    response
}

/// State for [`csrf_middleware`]: the session key and body field name.
#[derive(Clone, Debug)]
pub struct CsrfGuard {
    key: String,
}

impl Default for CsrfGuard {
    fn default() -> Self {
        Self {
            key: RG_CSRF_SESSION_KEY.clone(),
        }
    }
}

impl CsrfGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Verifies the authenticity token of state-changing requests.
///
/// Safe methods pass through untouched. Other requests have their body
/// buffered and checked against the [`GuardSession`] found in the request
/// extensions; on success the buffered body is handed on to the handler,
/// on failure a [`CsrfRejection`] (422) is returned.
pub async fn csrf_middleware(State(guard): State<CsrfGuard>, req: Request, next: Next) -> Response {
    if req.method().is_safe() {
        return next.run(req).await;
    }

    let Some(session) = req.extensions().get::<GuardSession>().cloned() else {
        tracing::error!("csrf_middleware needs a GuardSession in the request extensions");
        return CsrfRejection(CsrfError::MissingSessionToken).into_response();
    };

    let (parts, body) = req.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("Failed to read request body for CSRF check: {}", e);
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    let submitted = RequestBody::parse(content_type, &bytes).await;

    let verified = {
        let session = session.lock().await;
        verify_authenticity_token(&submitted, &*session, &guard.key)
    };
    if let Err(e) = verified {
        return CsrfRejection(e).into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
