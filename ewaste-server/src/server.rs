//! Axum server setup and router configuration.

use crate::api;
use crate::config::ServerConfig;
use crate::shutdown::shutdown_signal;
use crate::state::AppState;
use crate::uploads::UPLOADS_ROUTE;
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Build the main application router.
pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    let uploads = ServeDir::new(state.uploads.dir());

    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .merge(api::router())
        .nest_service(UPLOADS_ROUTE, uploads)
        .with_state(state)
        .layer(DefaultBodyLimit::max(server.max_upload_bytes))
        .layer(cors_layer(&server.allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// CORS for the browser frontend. An empty origin list allows any origin.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins = if allowed_origins.is_empty() {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::CONTENT_TYPE])
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Simple health check - returns OK if the server is running.
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Run the server with graceful shutdown support.
pub async fn run_server(router: Router, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}
