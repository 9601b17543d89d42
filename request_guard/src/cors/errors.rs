use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CorsError {
    /// The policy could not be built; reported before any request is served
    #[error("CORS configuration error: {0}")]
    Configuration(String),

    /// An origin predicate failed while deciding
    #[error("Origin predicate error: {0}")]
    Predicate(String),
}
