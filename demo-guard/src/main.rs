use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use dotenvy::dotenv;

use request_guard_axum::{CorsConfig, CorsGuard, CsrfGuard, cors_middleware, csrf_middleware};

mod handlers;
mod server;
mod session;

use handlers::{api_comment, api_status, api_token, form_page, reset_token, submit_comment};
use server::{init_tracing, serve};
use session::{SessionStore, session_layer};

fn app(cors: CorsGuard, csrf: CsrfGuard, store: SessionStore) -> Router {
    let api = Router::new()
        .route("/status", get(api_status))
        .route("/token", get(api_token))
        .route("/comments", post(api_comment))
        .layer(from_fn_with_state(csrf.clone(), csrf_middleware))
        .layer(from_fn_with_state(cors, cors_middleware));

    Router::new()
        .route("/", get(form_page))
        .route("/comment", post(submit_comment))
        .route("/reset", post(reset_token))
        .layer(from_fn_with_state(csrf, csrf_middleware))
        .nest("/api", api)
        .layer(from_fn_with_state(store, session_layer))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_tracing("demo_guard");

    let cors = CorsGuard::new(CorsConfig::from_env()?);
    tracing::info!("CORS origin policy: {:?}", cors.config().origin());

    let addr = std::env::var("RG_DEMO_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".to_string());
    serve(&addr, app(cors, CsrfGuard::new(), SessionStore::default())).await?;
    Ok(())
}
