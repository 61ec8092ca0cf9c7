//! Upload API routes
//!
//! - `POST /api/v1/uploads` - Multipart CSV upload of journey and station
//!   datasets

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use sqlx::PgPool;

use crate::api::response::{ApiResponse, AppError};

use super::commands::{DatasetUpload, UploadDatasetsCommand, UploadDatasetsError};

/// Creates the uploads router
pub fn uploads_routes() -> Router<PgPool> {
    Router::new().route("/", post(upload_datasets))
}

impl From<UploadDatasetsError> for AppError {
    fn from(err: UploadDatasetsError) -> Self {
        match err {
            UploadDatasetsError::Database(e) => AppError::Database(e),
        }
    }
}

/// Upload journey and station datasets
///
/// # Endpoint
///
/// `POST /api/v1/uploads`
///
/// Multipart form with optional `journeys` and `stations` file parts. At
/// least one must be present. Dataset-level problems (bad filename, header
/// mismatch) are reported in the response body as warnings, not as HTTP
/// failures; only storage errors fail the request.
#[tracing::instrument(skip_all)]
async fn upload_datasets(
    State(pool): State<PgPool>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut command = UploadDatasetsCommand::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let part = field.name().unwrap_or_default().to_string();
        if part != "journeys" && part != "stations" {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;

        let upload = DatasetUpload {
            filename,
            content: String::from_utf8_lossy(&bytes).into_owned(),
        };

        match part.as_str() {
            "journeys" => command.journeys = Some(upload),
            _ => command.stations = Some(upload),
        }
    }

    if command.is_empty() {
        return Err(AppError::BadRequest(
            "Provide at least one of the 'journeys' and 'stations' file parts".to_string(),
        ));
    }

    let report = super::commands::upload::handle(pool, command).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(report))).into_response())
}
