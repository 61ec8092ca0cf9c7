//! Journey API routes
//!
//! - `GET /api/v1/journeys` - List journeys with filters, ordering, and
//!   peek-ahead pagination

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sqlx::PgPool;

use crate::api::response::{ApiResponse, AppError};

use super::queries::{ListJourneysError, ListJourneysQuery};

/// Creates the journeys router
pub fn journeys_routes() -> Router<PgPool> {
    Router::new().route("/", get(list_journeys))
}

impl From<ListJourneysError> for AppError {
    fn from(err: ListJourneysError) -> Self {
        match err {
            ListJourneysError::Database(e) => AppError::Database(e),
        }
    }
}

/// List journeys
///
/// # Endpoint
///
/// `GET /api/v1/journeys?page=0&departure=...&return=...&mindistance=...`
///
/// All parameters are optional; omitted filters never restrict the result
/// set. Unknown `order` or `direction` values fall back to the defaults.
#[tracing::instrument(skip(pool))]
async fn list_journeys(
    State(pool): State<PgPool>,
    Query(query): Query<ListJourneysQuery>,
) -> Result<Response, AppError> {
    let response = super::queries::list::handle(pool, query).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}
