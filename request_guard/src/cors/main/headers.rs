use http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE,
    ACCESS_CONTROL_REQUEST_METHOD, ORIGIN, VARY,
};
use http::{HeaderMap, HeaderValue, Method};

use super::evaluator::evaluate_origin;
use crate::cors::config::CorsConfig;
use crate::cors::errors::CorsError;
use crate::cors::types::CorsDecision;

/// Writes the CORS headers for `decision` onto `headers` and returns them.
///
/// Nothing is written for a rejected decision. Every header is set with
/// overwrite semantics, so repeated calls leave a single value per header.
/// `Access-Control-Allow-Credentials` is never written next to a `*` origin.
pub fn write_cors_headers<'a>(
    headers: &'a mut HeaderMap,
    decision: &CorsDecision,
    config: &CorsConfig,
) -> &'a mut HeaderMap {
    if !decision.allow {
        return headers;
    }
    let Some(origin_value) = decision
        .header_value
        .as_deref()
        .and_then(|value| HeaderValue::from_str(value).ok())
    else {
        tracing::warn!("Allowed CORS decision carried no usable origin value");
        return headers;
    };

    let is_wildcard = origin_value == "*";
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin_value);
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, config.methods_value.clone());

    if let Some(value) = &config.allowed_headers_value {
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, value.clone());
    }
    if let Some(value) = &config.exposed_headers_value {
        headers.insert(ACCESS_CONTROL_EXPOSE_HEADERS, value.clone());
    }
    if config.credentials() && is_wildcard {
        tracing::warn!("Dropping Access-Control-Allow-Credentials next to a wildcard origin");
        headers.remove(ACCESS_CONTROL_ALLOW_CREDENTIALS);
    } else if config.credentials() {
        headers.insert(
            ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
    }
    if let Some(value) = &config.max_age_value {
        headers.insert(ACCESS_CONTROL_MAX_AGE, value.clone());
    }
    if !is_wildcard && !varies_on_origin(headers) {
        headers.append(VARY, HeaderValue::from_static("Origin"));
    }

    headers
}

/// Evaluates the request's `Origin` and writes the resulting headers onto
/// the response headers.
pub async fn apply_cors<'a>(
    request_headers: &HeaderMap,
    response_headers: &'a mut HeaderMap,
    config: &CorsConfig,
) -> Result<&'a mut HeaderMap, CorsError> {
    let origin = request_headers
        .get(ORIGIN)
        .and_then(|value| value.to_str().ok());
    let decision = evaluate_origin(origin, config.origin(), config.credentials()).await?;
    Ok(write_cors_headers(response_headers, &decision, config))
}

/// Whether the request is a CORS preflight.
pub fn is_preflight(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS && headers.contains_key(ACCESS_CONTROL_REQUEST_METHOD)
}

fn varies_on_origin(headers: &HeaderMap) -> bool {
    headers
        .get_all(VARY)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .any(|entry| entry == "*" || entry.eq_ignore_ascii_case("origin"))
}
