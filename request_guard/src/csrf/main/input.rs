use askama::Template;

use crate::csrf::errors::CsrfError;
use crate::csrf::types::AuthenticityToken;

#[derive(Template)]
#[template(
    source = r#"<input type="hidden" name="{{ name }}" value="{{ value }}">"#,
    ext = "html"
)]
struct HiddenInputTemplate<'a> {
    name: &'a str,
    value: &'a str,
}

/// Renders the hidden form field carrying `token` under `field_name`.
///
/// Both attribute values are HTML-escaped by the template engine; the output
/// is safe to insert into a page without further escaping.
///
/// # Errors
/// * `CsrfError::Template` - the template failed to render
pub fn authenticity_token_input(
    token: &AuthenticityToken,
    field_name: &str,
) -> Result<String, CsrfError> {
    HiddenInputTemplate {
        name: field_name,
        value: token.as_str(),
    }
    .render()
    .map_err(|e| {
        tracing::error!("Failed to render authenticity token input: {}", e);
        CsrfError::Template(e.to_string())
    })
}
