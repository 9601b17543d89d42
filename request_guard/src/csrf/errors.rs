use http::StatusCode;
use thiserror::Error;

use crate::utils::UtilError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CsrfError {
    #[error("Can't find CSRF token in session.")]
    MissingSessionToken,

    #[error("Can't find CSRF token in body.")]
    MissingBodyToken,

    #[error("Can't verify CSRF token authenticity.")]
    TokenMismatch,

    /// The random source failed while issuing a token
    #[error("Token generation error: {0}")]
    TokenGeneration(#[from] UtilError),

    /// The hidden input failed to render
    #[error("Template error: {0}")]
    Template(String),
}

impl CsrfError {
    /// True for the verification failures that reject a request.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::MissingSessionToken | Self::MissingBodyToken | Self::TokenMismatch
        )
    }

    /// Verification failures are all Unprocessable Entity.
    pub fn status_code(&self) -> StatusCode {
        if self.is_rejection() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}
