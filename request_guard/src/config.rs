//! Central configuration for the request_guard crate

use std::sync::LazyLock;

/// Session key under which the authenticity token is stored.
///
/// The same name is used for the submitted form field / JSON property.
/// Default: "csrf"
pub static RG_CSRF_SESSION_KEY: LazyLock<String> = LazyLock::new(|| {
    std::env::var("RG_CSRF_SESSION_KEY")
        .ok()
        .filter(|key| !key.is_empty())
        .unwrap_or_else(|| "csrf".to_string())
});
