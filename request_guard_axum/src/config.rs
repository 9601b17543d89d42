//! Central configuration for the request_guard_axum crate

use std::sync::LazyLock;

/// Whether [`crate::cors_middleware`] answers preflight requests itself.
/// Any value other than "false" (case-insensitive) enables it.
/// Default: true
pub static RG_CORS_HANDLE_PREFLIGHT: LazyLock<bool> = LazyLock::new(|| {
    std::env::var("RG_CORS_HANDLE_PREFLIGHT")
        .map(|val| val.to_lowercase() != "false")
        .unwrap_or(true)
});
