//! Upload datasets command
//!
//! Accepts up to two CSV datasets from one request and feeds them through
//! the ingestion pipeline. A dataset with an unacceptable filename is
//! reported inaccurate without being opened; the other dataset of the same
//! request is still ingested.

use sqlx::PgPool;

use crate::ingest::pipeline::{self, JOURNEY_DATASET_ERROR, STATION_DATASET_ERROR};
use crate::ingest::IngestReport;

/// File extensions accepted for uploads.
const ALLOWED_EXTENSIONS: &[&str] = &["csv"];

/// One uploaded dataset file.
#[derive(Debug, Clone)]
pub struct DatasetUpload {
    pub filename: String,
    pub content: String,
}

/// Command carrying the datasets of one upload request.
#[derive(Debug, Clone, Default)]
pub struct UploadDatasetsCommand {
    pub journeys: Option<DatasetUpload>,
    pub stations: Option<DatasetUpload>,
}

impl UploadDatasetsCommand {
    pub fn is_empty(&self) -> bool {
        self.journeys.is_none() && self.stations.is_none()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadDatasetsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Validate an uploaded filename: non-empty, with an allowed extension.
fn allowed_filename(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, extension)) => {
            ALLOWED_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str())
        },
        None => false,
    }
}

#[tracing::instrument(skip_all, fields(
    has_journeys = command.journeys.is_some(),
    has_stations = command.stations.is_some(),
))]
pub async fn handle(
    pool: PgPool,
    command: UploadDatasetsCommand,
) -> Result<IngestReport, UploadDatasetsError> {
    let mut journey_filename_error = None;
    let mut station_filename_error = None;

    let journeys = match command.journeys {
        Some(upload) if allowed_filename(&upload.filename) => Some(upload.content),
        Some(upload) => {
            tracing::warn!(filename = %upload.filename, "Journey upload has an unacceptable filename");
            journey_filename_error = Some(JOURNEY_DATASET_ERROR.to_string());
            None
        },
        None => None,
    };

    let stations = match command.stations {
        Some(upload) if allowed_filename(&upload.filename) => Some(upload.content),
        Some(upload) => {
            tracing::warn!(filename = %upload.filename, "Station upload has an unacceptable filename");
            station_filename_error = Some(STATION_DATASET_ERROR.to_string());
            None
        },
        None => None,
    };

    let mut report = if journeys.is_some() || stations.is_some() {
        pipeline::ingest(&pool, journeys.as_deref(), stations.as_deref()).await?
    } else {
        IngestReport::default()
    };

    if journey_filename_error.is_some() {
        report.journey_error = journey_filename_error;
    }
    if station_filename_error.is_some() {
        report.station_error = station_filename_error;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_validation() {
        assert!(allowed_filename("journeys.csv"));
        assert!(allowed_filename("2021-05.CSV"));
        assert!(allowed_filename(".csv"));
        assert!(!allowed_filename(""));
        assert!(!allowed_filename("journeys"));
        assert!(!allowed_filename("journeys.txt"));
        assert!(!allowed_filename("journeys.csv.exe"));
    }
}
