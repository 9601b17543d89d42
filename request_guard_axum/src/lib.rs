//! request_guard_axum - axum middleware for the request_guard trust checks
//!
//! * [`cors_middleware`] answers preflights and writes CORS headers
//! * [`csrf_middleware`] verifies the authenticity token on unsafe methods
//! * [`GuardSession`] is the per-request session the host puts into request
//!   extensions and handlers extract to issue tokens

mod config;
mod error;
mod middleware;
mod session;

pub use config::RG_CORS_HANDLE_PREFLIGHT;
pub use error::{CsrfRejection, IntoResponseError};
pub use middleware::{CorsGuard, CsrfGuard, cors_middleware, csrf_middleware};
pub use session::GuardSession;

// Re-export the core types so hosts only depend on this crate
pub use request_guard::{
    AuthenticityToken, CorsConfig, CorsConfigBuilder, CorsError, CsrfError, MemorySession,
    OriginMatcher, OriginPolicy, OriginPredicate, RG_CSRF_SESSION_KEY, Session, async_trait,
    authenticity_token_input, gen_random_string,
};
