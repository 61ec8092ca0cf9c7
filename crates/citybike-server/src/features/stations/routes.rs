//! Station API routes
//!
//! - `GET /api/v1/stations` - List all stations
//! - `GET /api/v1/stations/:id` - Single-station statistics report

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use sqlx::PgPool;

use crate::api::response::{ApiResponse, AppError};

use super::queries::{GetStationError, GetStationQuery, ListStationsError};

/// Creates the stations router
pub fn stations_routes() -> Router<PgPool> {
    Router::new()
        .route("/", get(list_stations))
        .route("/:id", get(get_station))
}

impl From<ListStationsError> for AppError {
    fn from(err: ListStationsError) -> Self {
        match err {
            ListStationsError::Database(e) => AppError::Database(e),
        }
    }
}

impl From<GetStationError> for AppError {
    fn from(err: GetStationError) -> Self {
        match err {
            GetStationError::NotFound(id) => {
                AppError::NotFound(format!("No station found with id {}", id))
            },
            GetStationError::Database(e) => AppError::Database(e),
        }
    }
}

/// List all stations
///
/// # Endpoint
///
/// `GET /api/v1/stations`
#[tracing::instrument(skip(pool))]
async fn list_stations(State(pool): State<PgPool>) -> Result<Response, AppError> {
    let response = super::queries::list::handle(pool).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

/// Month filters accepted by the station report.
#[derive(Debug, Default, Deserialize)]
struct StationReportParams {
    departure: Option<String>,
    #[serde(rename = "return")]
    arrival: Option<String>,
}

/// Single-station statistics report
///
/// # Endpoint
///
/// `GET /api/v1/stations/:id?departure=5-2021&return=5-2021`
///
/// Month parameters use the "M-YYYY" form; anything else means "any
/// month".
#[tracing::instrument(skip(pool), fields(station_id = %id))]
async fn get_station(
    State(pool): State<PgPool>,
    Path(id): Path<String>,
    Query(params): Query<StationReportParams>,
) -> Result<Response, AppError> {
    let query = GetStationQuery {
        id,
        departure: params.departure,
        arrival: params.arrival,
    };

    let response = super::queries::get::handle(pool, query).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}
