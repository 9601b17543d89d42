mod errors;
mod main;
mod types;

pub use errors::CsrfError;
pub use main::{
    RequestBody, authenticity_token_input, create_authenticity_token,
    create_authenticity_token_default, verify_authenticity_token,
    verify_authenticity_token_default,
};
pub use types::{AuthenticityToken, MemorySession, Session, SubmittedFields};
