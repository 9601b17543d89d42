use crate::config::RG_CSRF_SESSION_KEY;
use crate::csrf::errors::CsrfError;
use crate::csrf::types::{AuthenticityToken, Session};
use crate::utils::gen_random_string;

/// Random bytes per token (256 bits)
const TOKEN_BYTES: usize = 32;

/// Issues a fresh authenticity token and stores it in `session` under `key`.
///
/// Any token previously stored under the same key is overwritten and can no
/// longer be verified.
///
/// # Errors
/// * `CsrfError::TokenGeneration` - the system random source failed
pub fn create_authenticity_token<S>(
    session: &mut S,
    key: &str,
) -> Result<AuthenticityToken, CsrfError>
where
    S: Session + ?Sized,
{
    let token = gen_random_string(TOKEN_BYTES).inspect_err(|e| {
        tracing::error!("Failed to generate CSRF token: {}", e);
    })?;

    if session.get(key).is_some() {
        tracing::debug!("Replacing CSRF token stored under '{}'", key);
    }
    session.set(key, token.clone());
    tracing::debug!("Issued CSRF token under session key '{}'", key);

    Ok(AuthenticityToken::new(token))
}

/// [`create_authenticity_token`] using the configured session key
/// (`RG_CSRF_SESSION_KEY`, default `"csrf"`).
pub fn create_authenticity_token_default<S>(session: &mut S) -> Result<AuthenticityToken, CsrfError>
where
    S: Session + ?Sized,
{
    create_authenticity_token(session, RG_CSRF_SESSION_KEY.as_str())
}
