use crate::cors::errors::CorsError;
use crate::cors::types::{CorsDecision, OriginPolicy};

/// Decides whether `origin` may receive CORS headers under `policy`.
///
/// A missing or empty origin is never allowed, whatever the policy, and a
/// predicate is not consulted for it. When `credentials` is set, allow-all
/// echoes the request origin instead of `*`. A `"*"` entry in a list behaves
/// like allow-all.
///
/// # Errors
/// * `CorsError::Predicate` - a predicate policy failed to decide
pub async fn evaluate_origin(
    origin: Option<&str>,
    policy: &OriginPolicy,
    credentials: bool,
) -> Result<CorsDecision, CorsError> {
    let Some(origin) = origin.filter(|o| !o.is_empty()) else {
        tracing::debug!("No Origin header, skipping CORS");
        return Ok(CorsDecision::reject());
    };

    let decision = match policy {
        OriginPolicy::Deny => CorsDecision::reject(),
        OriginPolicy::AllowAll => allow_any(origin, credentials),
        OriginPolicy::Exact(expected) if expected == "*" => allow_any(origin, credentials),
        OriginPolicy::Exact(expected) => allow_if(expected == origin, origin),
        OriginPolicy::Pattern(pattern) => allow_if(pattern.is_match(origin), origin),
        OriginPolicy::List(matchers) => match matchers.iter().find(|m| m.matches(origin)) {
            Some(matcher) if matcher.is_wildcard() => allow_any(origin, credentials),
            Some(_) => CorsDecision::allow(origin),
            None => CorsDecision::reject(),
        },
        OriginPolicy::Predicate(predicate) => {
            let allowed = predicate.is_allowed(origin).await.inspect_err(|e| {
                tracing::error!("Origin predicate failed for {}: {}", origin, e);
            })?;
            allow_if(allowed, origin)
        }
    };

    if decision.allow {
        tracing::debug!("Origin {} allowed", origin);
    } else {
        tracing::debug!("Origin {} rejected", origin);
    }
    Ok(decision)
}

fn allow_any(origin: &str, credentials: bool) -> CorsDecision {
    if credentials {
        CorsDecision::allow(origin)
    } else {
        CorsDecision::allow("*")
    }
}

fn allow_if(matched: bool, origin: &str) -> CorsDecision {
    if matched {
        CorsDecision::allow(origin)
    } else {
        CorsDecision::reject()
    }
}
