//! HTTP server assembly

pub mod response;

use crate::config::Config;
use crate::db;
use crate::features;
use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use sqlx::PgPool;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;

/// Uploaded CSV exports run to hundreds of megabytes.
const MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

pub async fn serve(config: Config) -> anyhow::Result<()> {
    let db = db::create_pool(&config.database).await?;

    let app = create_router(db);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

pub fn create_router(db: PgPool) -> Router {
    let api_v1 = features::router(db);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/v1", api_v1)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Citybike Server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install shutdown signal handler: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
