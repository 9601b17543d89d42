//! request_guard - HTTP boundary trust checks for web applications
//!
//! This crate provides the two request-level trust checks a browser-facing
//! application needs: an origin policy evaluator that decides which CORS
//! headers a response carries, and a CSRF authenticity-token lifecycle
//! (issue into the session, embed in forms, verify on submission).
//!
//! Both are framework agnostic. Requests and responses are seen through
//! `http::HeaderMap`, the session through the [`Session`] trait and the
//! submitted body through [`SubmittedFields`].

mod config;
mod cors;
mod csrf;
mod utils;

pub use config::RG_CSRF_SESSION_KEY;

// Implementors of `OriginPredicate` need the same attribute macro
pub use async_trait::async_trait;

pub use cors::{
    CorsConfig, CorsConfigBuilder, CorsDecision, CorsError, OriginMatcher, OriginPattern,
    OriginPolicy, OriginPredicate, PredicateFn, apply_cors, evaluate_origin, is_preflight,
    write_cors_headers,
};

pub use csrf::{
    AuthenticityToken, CsrfError, MemorySession, RequestBody, Session, SubmittedFields,
    authenticity_token_input, create_authenticity_token, create_authenticity_token_default,
    verify_authenticity_token, verify_authenticity_token_default,
};

pub use utils::{UtilError, gen_random_string};
