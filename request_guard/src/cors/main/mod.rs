mod evaluator;
mod headers;

pub use evaluator::evaluate_origin;
pub use headers::{apply_cors, is_preflight, write_cors_headers};
