//! Ingestion record types and dataset constants

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ============================================================================
// Dataset Constants
// ============================================================================

/// Exact header line expected on a journey CSV upload.
pub const JOURNEY_HEADER: &str = "Departure,Return,Departure station id,Departure station name,Return station id,Return station name,Covered distance (m),Duration (sec.)";

/// Exact header line expected on a station CSV upload.
pub const STATION_HEADER: &str =
    "FID,ID,Nimi,Namn,Name,Osoite,Adress,Kaupunki,Stad,Operaattor,Kapasiet,x,y";

/// Records accumulated before a batch is written as one INSERT statement.
pub const MAX_BATCH_ROWS: usize = 1000;

/// Journeys shorter than this many meters are dropped as implausible.
pub const MIN_JOURNEY_DISTANCE_M: f64 = 10.0;

/// Journeys shorter than this many seconds are dropped as implausible.
pub const MIN_JOURNEY_DURATION_S: f64 = 10.0;

// ============================================================================
// Records
// ============================================================================

/// One validated journey row, ready for insertion.
///
/// Station fields are opaque identifier strings referencing `stations.id`.
/// Referential integrity is not checked at write time; a journey naming an
/// unknown station simply never surfaces in the joined listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JourneyRecord {
    pub departure_time: NaiveDateTime,
    pub return_time: NaiveDateTime,
    pub departure_station: String,
    pub return_station: String,
    /// Covered distance in meters.
    pub distance: f64,
    /// Duration in seconds.
    pub duration: f64,
}

/// One validated station row, ready for insertion.
///
/// The id comes from the external authority; it is never generated here.
/// Inserting an id that already exists is a silent no-op (first write wins).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    pub id: String,
    pub nimi: String,
    pub namn: String,
    pub name: String,
    pub address: String,
    pub adress: String,
    pub city: String,
    pub stad: String,
    pub operator: String,
    pub capacity: i32,
    pub lat: f64,
    pub lon: f64,
}
