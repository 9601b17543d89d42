use http::HeaderMap;
use http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, VARY,
};
use request_guard::{
    CorsConfig, CorsDecision, CorsError, OriginMatcher, OriginPolicy, apply_cors, evaluate_origin,
    write_cors_headers,
};
use std::sync::atomic::Ordering;

use crate::common::{AllowListPredicate, TestRequest};

fn list_config(credentials: bool) -> CorsConfig {
    CorsConfig::builder()
        .origin(OriginPolicy::list(vec![
            OriginMatcher::exact("https://a.com").unwrap(),
            OriginMatcher::pattern(r"^https://b\.com$").unwrap(),
        ]))
        .credentials(credentials)
        .max_age(86400)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_allow_all_wildcard_for_any_origin() {
    let config = CorsConfig::default();

    for origin in ["https://a.com", "http://localhost:3000", "null"] {
        let request = TestRequest::get().with_origin(origin);
        let mut response = HeaderMap::new();

        apply_cors(&request.headers, &mut response, &config)
            .await
            .unwrap();

        assert_eq!(response[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}

#[tokio::test]
async fn test_allow_all_with_credentials_never_emits_wildcard() {
    let config = CorsConfig::builder().credentials(true).build().unwrap();
    let request = TestRequest::get().with_origin("https://a.com");
    let mut response = HeaderMap::new();

    apply_cors(&request.headers, &mut response, &config)
        .await
        .unwrap();

    assert_eq!(response[ACCESS_CONTROL_ALLOW_ORIGIN], "https://a.com");
    assert_eq!(response[ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    assert_eq!(response[VARY], "Origin");
}

#[tokio::test]
async fn test_list_policy_over_requests() {
    let config = list_config(false);

    for (origin, allowed) in [
        ("https://a.com", true),
        ("https://b.com", true),
        ("https://b.com.evil.com", false),
        ("https://evil.com/https://a.com", false),
    ] {
        let request = TestRequest::get().with_origin(origin);
        let mut response = HeaderMap::new();

        apply_cors(&request.headers, &mut response, &config)
            .await
            .unwrap();

        if allowed {
            assert_eq!(response[ACCESS_CONTROL_ALLOW_ORIGIN], origin);
            assert_eq!(response[ACCESS_CONTROL_MAX_AGE], "86400");
        } else {
            assert!(response.is_empty(), "{origin} must not receive CORS headers");
        }
    }
}

#[tokio::test]
async fn test_missing_origin_is_not_wildcard() {
    let config = CorsConfig::default();
    let request = TestRequest::get();
    let mut response = HeaderMap::new();

    apply_cors(&request.headers, &mut response, &config)
        .await
        .unwrap();

    assert!(response.is_empty());
}

#[tokio::test]
async fn test_async_predicate_policy() {
    let predicate = AllowListPredicate::new(&["https://partner.example"]);
    let calls = predicate.call_count();
    let config = CorsConfig::builder()
        .origin(OriginPolicy::predicate(predicate))
        .build()
        .unwrap();

    let allowed = TestRequest::get().with_origin("https://partner.example");
    let mut response = HeaderMap::new();
    apply_cors(&allowed.headers, &mut response, &config)
        .await
        .unwrap();
    assert_eq!(
        response[ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://partner.example"
    );

    let denied = TestRequest::get().with_origin("https://stranger.example");
    let mut response = HeaderMap::new();
    apply_cors(&denied.headers, &mut response, &config)
        .await
        .unwrap();
    assert!(response.is_empty());

    let no_origin = TestRequest::get();
    let mut response = HeaderMap::new();
    apply_cors(&no_origin.headers, &mut response, &config)
        .await
        .unwrap();
    assert!(response.is_empty());

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_predicate_failure_reaches_caller() {
    let config = CorsConfig::builder()
        .origin(OriginPolicy::predicate(AllowListPredicate::failing()))
        .build()
        .unwrap();
    let request = TestRequest::get().with_origin("https://a.com");
    let mut response = HeaderMap::new();

    let result = apply_cors(&request.headers, &mut response, &config).await;

    assert!(matches!(result, Err(CorsError::Predicate(_))));
    assert!(response.is_empty());
}

#[tokio::test]
async fn test_decision_then_write_twice_is_stable() {
    let config = list_config(true);
    let decision = evaluate_origin(Some("https://a.com"), config.origin(), config.credentials())
        .await
        .unwrap();
    assert_eq!(decision, CorsDecision::allow("https://a.com"));

    let mut response = HeaderMap::new();
    write_cors_headers(&mut response, &decision, &config);
    let snapshot = response.clone();
    write_cors_headers(&mut response, &decision, &config);

    assert_eq!(response, snapshot);
    assert_eq!(response.get_all(VARY).iter().count(), 1);
}
