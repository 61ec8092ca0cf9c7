//! Feature modules implementing the citybike API
//!
//! Each feature is a vertical slice with its own queries (or commands),
//! validation, and route definitions:
//!
//! - **journeys**: filtered, sorted, paginated journey listing
//! - **stations**: station list and per-station statistics report
//! - **uploads**: multipart CSV upload feeding the ingestion pipeline
//!
//! Route handlers stay thin; the request/response types, validation, and
//! the actual `handle` functions live in the feature's `queries` or
//! `commands` modules and are unit-testable without HTTP.

pub mod journeys;
pub mod shared;
pub mod stations;
pub mod uploads;

use axum::Router;
use sqlx::PgPool;

/// Creates the main API router with all feature routes mounted
pub fn router(db: PgPool) -> Router {
    Router::new()
        .nest("/journeys", journeys::routes::journeys_routes())
        .nest("/stations", stations::routes::stations_routes())
        .nest("/uploads", uploads::routes::uploads_routes())
        .with_state(db)
}
