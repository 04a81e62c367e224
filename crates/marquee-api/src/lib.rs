//! marquee-api — the HTTP transport boundary, JSON over axum.

pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

pub use handlers::ApiState;

/// Build the `/api` router. Exposed separately from [`serve`] so tests
/// can bind an ephemeral port.
pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route(
            "/scores",
            get(handlers::handle_list_scores).post(handlers::handle_submit_score),
        )
        .route("/session/start", post(handlers::handle_session_start))
        .route("/session/interact", post(handlers::handle_interact))
        .route("/status", get(handlers::handle_status))
        .with_state(state);

    Router::new().nest("/api", api_routes).layer(cors)
}

pub async fn serve(state: ApiState, port: u16) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!(port, "API listening on 127.0.0.1");
    axum::serve(listener, app).await?;
    Ok(())
}
