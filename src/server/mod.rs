mod docs;
mod responses;
mod routes;
mod state;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{delete, get},
    Router,
};
use log::info;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use state::AppState;

/// Builds the HTTP router for the dashboard API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/repo",
            get(routes::list_repositories).post(routes::add_repository),
        )
        .route("/repo/metrics", get(routes::repository_metrics))
        .route("/repo/workflow-runs", get(routes::workflow_runs))
        .route("/repo/{owner}/{name}", delete(routes::remove_repository))
        .route(
            "/workflow/{owner}/{name}/exists",
            get(routes::workflow_exists),
        )
        .route("/docs", get(docs::docs))
        .route("/openapi", get(docs::openapi))
        .with_state(state)
}

fn cors_layer(origin: &str) -> Result<CorsLayer> {
    let origin = origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid allowed origin: {origin}"))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([CONTENT_TYPE]))
}

/// Serves the API on `bind` until Ctrl-C.
pub async fn serve(bind: SocketAddr, state: AppState, allowed_origin: Option<&str>) -> Result<()> {
    let mut app = router(state);
    if let Some(origin) = allowed_origin {
        app = app.layer(cors_layer(origin)?);
        info!("CORS enabled for {origin}");
    }

    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {e}");
    }
}
