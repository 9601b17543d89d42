use request_guard::{
    CsrfError, Session, authenticity_token_input, create_authenticity_token,
    verify_authenticity_token,
};

use crate::common::{SessionStore, TestRequest};

const SESSION_ID: &str = "session-1";

/// Read path: issue a token into the session and render the form field
fn render_form(store: &mut SessionStore, key: &str) -> String {
    let mut session = store.load(SESSION_ID);
    let token = create_authenticity_token(&mut session, key).unwrap();
    store.commit(SESSION_ID, session);
    authenticity_token_input(&token, key).unwrap()
}

/// Pull the token back out of the rendered hidden input, as a browser would submit it
fn token_from_form(html: &str) -> String {
    let start = html.find("value=\"").unwrap() + "value=\"".len();
    let end = html[start..].find('"').unwrap() + start;
    html[start..end].to_string()
}

/// Write path: verify the submitted body against the stored session
async fn handle_post(
    store: &SessionStore,
    request: &TestRequest,
    key: &str,
) -> Result<(), CsrfError> {
    let session = store.load(SESSION_ID);
    let submitted = request.submitted_fields().await;
    verify_authenticity_token(&submitted, &session, key)
}

#[tokio::test]
async fn test_form_round_trip_across_requests() {
    let mut store = SessionStore::default();

    let html = render_form(&mut store, "csrf");
    let token = token_from_form(&html);

    let request = TestRequest::post_form(&format!("comment=hi&csrf={token}"));
    assert_eq!(handle_post(&store, &request, "csrf").await, Ok(()));
}

#[tokio::test]
async fn test_json_round_trip_across_requests() {
    let mut store = SessionStore::default();
    let token = token_from_form(&render_form(&mut store, "csrf"));

    let request = TestRequest::post_json(serde_json::json!({ "csrf": token, "title": "x" }));
    assert_eq!(handle_post(&store, &request, "csrf").await, Ok(()));
}

#[tokio::test]
async fn test_token_is_reusable_until_reissued() {
    let mut store = SessionStore::default();
    let first = token_from_form(&render_form(&mut store, "csrf"));
    let request = TestRequest::post_form(&format!("csrf={first}"));

    // Double-submit: the same token keeps working
    assert_eq!(handle_post(&store, &request, "csrf").await, Ok(()));
    assert_eq!(handle_post(&store, &request, "csrf").await, Ok(()));

    // Rendering the form again issues a new token
    let second = token_from_form(&render_form(&mut store, "csrf"));
    assert_eq!(
        handle_post(&store, &request, "csrf").await,
        Err(CsrfError::TokenMismatch)
    );

    let request = TestRequest::post_form(&format!("csrf={second}"));
    assert_eq!(handle_post(&store, &request, "csrf").await, Ok(()));
}

#[tokio::test]
async fn test_reset_session_rejects_old_token() {
    let mut store = SessionStore::default();
    let token = token_from_form(&render_form(&mut store, "csrf"));

    store.reset(SESSION_ID);

    let request = TestRequest::post_form(&format!("csrf={token}"));
    assert_eq!(
        handle_post(&store, &request, "csrf").await,
        Err(CsrfError::MissingSessionToken)
    );
}

#[tokio::test]
async fn test_forged_requests_are_rejected() {
    let mut store = SessionStore::default();
    let token = token_from_form(&render_form(&mut store, "csrf"));

    let cases = [
        (TestRequest::post_form("comment=hi"), CsrfError::MissingBodyToken),
        (TestRequest::post_form("csrf="), CsrfError::MissingBodyToken),
        (
            TestRequest::post("text/plain", &format!("csrf={token}")),
            CsrfError::MissingBodyToken,
        ),
        (
            TestRequest::post_json(serde_json::json!({ "csrf": 42 })),
            CsrfError::MissingBodyToken,
        ),
        (
            TestRequest::post_form(&format!("csrf={token}x")),
            CsrfError::TokenMismatch,
        ),
        (
            TestRequest::post_form("csrf=guessed-token"),
            CsrfError::TokenMismatch,
        ),
    ];

    for (request, expected) in cases {
        let result = handle_post(&store, &request, "csrf").await;
        assert_eq!(result, Err(expected.clone()));
        assert_eq!(
            result.unwrap_err().status_code(),
            http::StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}

#[tokio::test]
async fn test_verification_leaves_session_untouched() {
    let mut store = SessionStore::default();
    let token = token_from_form(&render_form(&mut store, "csrf"));
    let before = store.load(SESSION_ID);

    let request = TestRequest::post_form("csrf=wrong");
    let _ = handle_post(&store, &request, "csrf").await;

    let after = store.load(SESSION_ID);
    assert_eq!(before, after);
    assert_eq!(after.get("csrf").as_deref(), Some(token.as_str()));
}
