use askama::Template;
use axum::{
    Form, Json,
    response::Html,
};
use http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

use request_guard_axum::{GuardSession, IntoResponseError, RG_CSRF_SESSION_KEY};

#[derive(Template)]
#[template(path = "form.html.j2")]
struct FormTemplate<'a> {
    field: &'a str,
    token: &'a str,
}

#[derive(Template)]
#[template(path = "comment.html.j2")]
struct CommentTemplate<'a> {
    comment: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct CommentForm {
    comment: String,
}

/// Issues a token and renders the comment form carrying it
pub(crate) async fn form_page(session: GuardSession) -> Result<Html<String>, (StatusCode, String)> {
    let token = session.authenticity_token().await.into_response_error()?;

    FormTemplate {
        field: RG_CSRF_SESSION_KEY.as_str(),
        token: token.as_str(),
    }
    .render()
    .map(Html)
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

/// Only reached once the CSRF middleware has verified the token
pub(crate) async fn submit_comment(
    Form(form): Form<CommentForm>,
) -> Result<Html<String>, (StatusCode, String)> {
    tracing::info!("Accepted comment ({} bytes)", form.comment.len());

    CommentTemplate {
        comment: &form.comment,
    }
    .render()
    .map(Html)
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

/// Drops the session's token; later posts fail until the form is reloaded
pub(crate) async fn reset_token(session: GuardSession) -> StatusCode {
    session.lock().await.remove(RG_CSRF_SESSION_KEY.as_str());
    StatusCode::NO_CONTENT
}

pub(crate) async fn api_status() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Token bootstrap for script clients that post JSON
pub(crate) async fn api_token(session: GuardSession) -> Result<Json<Value>, (StatusCode, String)> {
    let token = session.authenticity_token().await.into_response_error()?;
    Ok(Json(json!({
        "field": RG_CSRF_SESSION_KEY.as_str(),
        "token": token,
    })))
}

pub(crate) async fn api_comment(Json(body): Json<Value>) -> Json<Value> {
    let comment = body
        .get("comment")
        .and_then(Value::as_str)
        .unwrap_or_default();
    Json(json!({ "received": comment }))
}
