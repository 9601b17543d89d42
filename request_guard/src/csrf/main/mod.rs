mod body;
mod input;
mod token;
mod verify;

pub use body::RequestBody;
pub use input::authenticity_token_input;
pub use token::{create_authenticity_token, create_authenticity_token_default};
pub use verify::{verify_authenticity_token, verify_authenticity_token_default};
