use subtle::ConstantTimeEq;

use crate::config::RG_CSRF_SESSION_KEY;
use crate::csrf::errors::CsrfError;
use crate::csrf::types::{Session, SubmittedFields};

/// Checks the token submitted under `key` against the one stored in `session`.
///
/// The stored token is left in place on success, so it stays valid for the
/// rest of the session or until a new token is issued.
///
/// # Errors
/// * `CsrfError::MissingSessionToken` - nothing (or an empty value) stored under `key`
/// * `CsrfError::MissingBodyToken` - the body has no non-empty `key` field
/// * `CsrfError::TokenMismatch` - the two tokens differ in any byte
pub fn verify_authenticity_token<F, S>(
    submitted: &F,
    session: &S,
    key: &str,
) -> Result<(), CsrfError>
where
    F: SubmittedFields + ?Sized,
    S: Session + ?Sized,
{
    let Some(stored) = session.get(key).filter(|token| !token.is_empty()) else {
        tracing::warn!("CSRF rejected: no token in session under '{}'", key);
        return Err(CsrfError::MissingSessionToken);
    };

    let Some(submitted) = submitted.field(key).filter(|token| !token.is_empty()) else {
        tracing::warn!("CSRF rejected: no '{}' field in request body", key);
        return Err(CsrfError::MissingBodyToken);
    };

    if !bool::from(submitted.as_bytes().ct_eq(stored.as_bytes())) {
        tracing::warn!("CSRF rejected: token mismatch for '{}'", key);
        return Err(CsrfError::TokenMismatch);
    }

    tracing::trace!("CSRF token verified for '{}'", key);
    Ok(())
}

/// [`verify_authenticity_token`] using the configured session key
/// (`RG_CSRF_SESSION_KEY`, default `"csrf"`).
pub fn verify_authenticity_token_default<F, S>(submitted: &F, session: &S) -> Result<(), CsrfError>
where
    F: SubmittedFields + ?Sized,
    S: Session + ?Sized,
{
    verify_authenticity_token(submitted, session, RG_CSRF_SESSION_KEY.as_str())
}
