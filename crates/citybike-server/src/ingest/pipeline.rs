//! Upload ingestion pipeline
//!
//! Drives the journey and station datasets of one upload request through a
//! single transaction and aggregates the per-dataset verdicts.

use serde::Serialize;
use sqlx::PgPool;

use super::codec::{JourneyCodec, StationCodec};
use super::loader::{self, LoadError, LoadSummary};
use super::storage::IngestSession;

/// Dataset-level error marker shown to the uploader.
pub const JOURNEY_DATASET_ERROR: &str = "The journey file is inaccurate";

/// Dataset-level error marker shown to the uploader.
pub const STATION_DATASET_ERROR: &str = "The station file is inaccurate";

/// Per-dataset row counters, reported back to the uploader.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct DatasetCounters {
    pub accepted: u64,
    pub rejected: u64,
}

impl From<LoadSummary> for DatasetCounters {
    fn from(summary: LoadSummary) -> Self {
        Self {
            accepted: summary.accepted,
            rejected: summary.rejected,
        }
    }
}

/// Result of one upload request.
///
/// Dataset errors are non-fatal warnings: a header mismatch on one dataset
/// does not undo batches already flushed for the other dataset in the same
/// request, nor does it fail the request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journey_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journeys: Option<DatasetCounters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stations: Option<DatasetCounters>,
}

impl IngestReport {
    /// Dataset error markers, one per failed dataset.
    pub fn errors(&self) -> Vec<&str> {
        self.journey_error
            .iter()
            .chain(self.station_error.iter())
            .map(String::as_str)
            .collect()
    }
}

/// Ingest up to two datasets inside one transaction.
///
/// Call only with at least one dataset present. The transaction commits
/// once at the end regardless of the individual header verdicts; only a
/// storage error aborts the request, rolling the transaction back.
#[tracing::instrument(skip_all, fields(
    has_journeys = journeys.is_some(),
    has_stations = stations.is_some(),
))]
pub async fn ingest(
    pool: &PgPool,
    journeys: Option<&str>,
    stations: Option<&str>,
) -> Result<IngestReport, sqlx::Error> {
    let mut session = IngestSession::begin(pool).await?;
    let mut report = IngestReport::default();

    if let Some(content) = journeys {
        match loader::load(content.lines(), &JourneyCodec, &mut session).await {
            Ok(summary) => {
                tracing::info!(
                    accepted = summary.accepted,
                    rejected = summary.rejected,
                    batches = summary.batches,
                    "Journey dataset ingested"
                );
                report.journeys = Some(summary.into());
            },
            Err(LoadError::HeaderMismatch) => {
                tracing::warn!("Journey dataset rejected: header mismatch");
                report.journey_error = Some(JOURNEY_DATASET_ERROR.to_string());
            },
            Err(LoadError::Storage(e)) => return Err(e),
        }
    }

    if let Some(content) = stations {
        match loader::load(content.lines(), &StationCodec, &mut session).await {
            Ok(summary) => {
                tracing::info!(
                    accepted = summary.accepted,
                    rejected = summary.rejected,
                    batches = summary.batches,
                    "Station dataset ingested"
                );
                report.stations = Some(summary.into());
            },
            Err(LoadError::HeaderMismatch) => {
                tracing::warn!("Station dataset rejected: header mismatch");
                report.station_error = Some(STATION_DATASET_ERROR.to_string());
            },
            Err(LoadError::Storage(e)) => return Err(e),
        }
    }

    session.commit().await?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_lists_one_error_per_failed_dataset() {
        let mut report = IngestReport::default();
        assert!(report.errors().is_empty());

        report.journey_error = Some(JOURNEY_DATASET_ERROR.to_string());
        assert_eq!(report.errors(), vec![JOURNEY_DATASET_ERROR]);

        report.station_error = Some(STATION_DATASET_ERROR.to_string());
        assert_eq!(
            report.errors(),
            vec![JOURNEY_DATASET_ERROR, STATION_DATASET_ERROR]
        );
    }
}
