mod config;
mod errors;
mod main;
mod types;

pub use config::{CorsConfig, CorsConfigBuilder};
pub use errors::CorsError;
pub use main::{apply_cors, evaluate_origin, is_preflight, write_cors_headers};
pub use types::{
    CorsDecision, OriginMatcher, OriginPattern, OriginPolicy, OriginPredicate, PredicateFn,
};
