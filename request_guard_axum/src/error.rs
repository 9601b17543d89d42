use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::{Result as HttpResponse, StatusCode};
use request_guard::{CorsError, CsrfError};

/// Rejection returned when a request fails CSRF verification.
///
/// Renders as `422 Unprocessable Entity` with a `{"message": ...}` JSON body.
/// Token generation failures render as `500` with the same body shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfRejection(pub CsrfError);

impl From<CsrfError> for CsrfRejection {
    fn from(err: CsrfError) -> Self {
        Self(err)
    }
}

impl IntoResponse for CsrfRejection {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let body = serde_json::json!({ "message": self.0.message() });
        (status, Json(body)).into_response()
    }
}

/// Helper trait for converting errors to a standard response error format
pub trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)>;
}

impl<T> IntoResponseError<T> for Result<T, CsrfError> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| (e.status_code(), e.message()))
    }
}

/// Both CORS errors are server-side faults: a bad config or a failed predicate
impl<T> IntoResponseError<T> for Result<T, CorsError> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
    }
}

/// Implementation for http::Error (used by Response::builder())
impl<T> IntoResponseError<T> for HttpResponse<T> {
    fn into_response_error(self) -> Result<T, (StatusCode, String)> {
        self.map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
    }
}
