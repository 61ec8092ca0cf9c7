//! Ingestion tests driving the codec and loader through an in-memory sink.

use async_trait::async_trait;

use citybike_server::ingest::codec::{JourneyCodec, StationCodec};
use citybike_server::ingest::loader::{load, LoadError, RecordSink};
use citybike_server::ingest::models::{JOURNEY_HEADER, STATION_HEADER};

/// Collects submitted batches instead of writing them anywhere.
struct MemorySink<R> {
    batches: Vec<Vec<R>>,
}

impl<R> MemorySink<R> {
    fn new() -> Self {
        Self {
            batches: Vec::new(),
        }
    }

    fn batch_sizes(&self) -> Vec<usize> {
        self.batches.iter().map(Vec::len).collect()
    }

    fn total_rows(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }
}

#[async_trait]
impl<R: Clone + Send + Sync> RecordSink<R> for MemorySink<R> {
    async fn submit(&mut self, batch: &[R]) -> Result<(), sqlx::Error> {
        self.batches.push(batch.to_vec());
        Ok(())
    }
}

const VALID_JOURNEY_ROW: &str =
    "2021-05-31T23:57:25,2021-06-01T00:05:46,094,Laajalahden aukio,100,Teljäntie,2043,500";

fn journey_csv(rows: &[&str]) -> String {
    let mut csv = String::from(JOURNEY_HEADER);
    for row in rows {
        csv.push('\n');
        csv.push_str(row);
    }
    csv
}

#[tokio::test]
async fn batch_flushing_is_exact() {
    let rows = vec![VALID_JOURNEY_ROW; 2500];
    let csv = journey_csv(&rows);
    let mut sink = MemorySink::new();

    let summary = load(csv.lines(), &JourneyCodec, &mut sink)
        .await
        .expect("header matches");

    assert_eq!(summary.accepted, 2500);
    assert_eq!(summary.rejected, 0);
    assert_eq!(summary.batches, 3);
    assert_eq!(sink.batch_sizes(), vec![1000, 1000, 500]);
}

#[tokio::test]
async fn exact_batch_boundary_leaves_no_trailing_submission() {
    let rows = vec![VALID_JOURNEY_ROW; 1000];
    let csv = journey_csv(&rows);
    let mut sink = MemorySink::new();

    let summary = load(csv.lines(), &JourneyCodec, &mut sink)
        .await
        .expect("header matches");

    assert_eq!(summary.batches, 1);
    assert_eq!(sink.batch_sizes(), vec![1000]);
}

#[tokio::test]
async fn partial_batch_of_one_is_submitted() {
    let csv = journey_csv(&[VALID_JOURNEY_ROW]);
    let mut sink = MemorySink::new();

    let summary = load(csv.lines(), &JourneyCodec, &mut sink)
        .await
        .expect("header matches");

    assert_eq!(summary.accepted, 1);
    assert_eq!(sink.batch_sizes(), vec![1]);
}

#[tokio::test]
async fn header_mismatch_submits_nothing() {
    let csv = format!("Departure,Return\n{}", VALID_JOURNEY_ROW);
    let mut sink = MemorySink::new();

    let result = load(csv.lines(), &JourneyCodec, &mut sink).await;

    assert!(matches!(result, Err(LoadError::HeaderMismatch)));
    assert!(sink.batches.is_empty());
}

#[tokio::test]
async fn empty_upload_is_a_header_mismatch() {
    let mut sink: MemorySink<citybike_server::ingest::models::JourneyRecord> = MemorySink::new();

    let result = load("".lines(), &JourneyCodec, &mut sink).await;

    assert!(matches!(result, Err(LoadError::HeaderMismatch)));
    assert!(sink.batches.is_empty());
}

#[tokio::test]
async fn header_tolerates_bom_and_crlf() {
    let csv = format!("\u{feff}{}\r\n{}\r", JOURNEY_HEADER, VALID_JOURNEY_ROW);
    let mut sink = MemorySink::new();

    let summary = load(csv.lines(), &JourneyCodec, &mut sink)
        .await
        .expect("BOM and CR are transport artifacts, not header differences");

    assert_eq!(summary.accepted, 1);
}

#[tokio::test]
async fn bad_rows_are_skipped_and_tallied() {
    let csv = journey_csv(&[
        VALID_JOURNEY_ROW,
        // Wrong field count.
        "2021-05-31T23:57:25,2021-06-01T00:05:46,094,100,2043,500",
        // Unparseable timestamp.
        "soon,2021-06-01T00:05:46,094,A,100,B,2043,500",
        // Micro-trip: distance below 10 meters.
        "2021-05-31T23:57:25,2021-06-01T00:05:46,094,A,100,B,9,500",
        // Micro-trip: duration below 10 seconds.
        "2021-05-31T23:57:25,2021-06-01T00:05:46,094,A,100,B,2043,9.5",
        VALID_JOURNEY_ROW,
    ]);
    let mut sink = MemorySink::new();

    let summary = load(csv.lines(), &JourneyCodec, &mut sink)
        .await
        .expect("header matches");

    assert_eq!(summary.accepted, 2);
    assert_eq!(summary.rejected, 4);
    assert_eq!(sink.total_rows(), 2);
}

#[tokio::test]
async fn blank_line_terminates_the_dataset() {
    let csv = format!(
        "{}\n{}\n\n{}",
        JOURNEY_HEADER, VALID_JOURNEY_ROW, VALID_JOURNEY_ROW
    );
    let mut sink = MemorySink::new();

    let summary = load(csv.lines(), &JourneyCodec, &mut sink)
        .await
        .expect("header matches");

    assert_eq!(summary.accepted, 1);
    assert_eq!(summary.rejected, 0);
}

#[tokio::test]
async fn station_rows_load_with_swapped_coordinates() {
    let csv = format!(
        "{}\n{}\n{}",
        STATION_HEADER,
        "1,501,Hanasaari,Hanaholmen,Hanasaari,Hanasaarenranta 1,Hanaholmsstranden 1,Espoo,Esbo,CityBike Finland,10,24.840319,60.16582",
        "2,503,Keilalahti,Kägelviken,Keilalahti,Keilalahdentie 2,Kägelviksvägen 2,Espoo,Esbo,CityBike Finland,28,24.827467,60.171524",
    );
    let mut sink = MemorySink::new();

    let summary = load(csv.lines(), &StationCodec, &mut sink)
        .await
        .expect("header matches");

    assert_eq!(summary.accepted, 2);
    assert_eq!(sink.batch_sizes(), vec![2]);

    let first = &sink.batches[0][0];
    assert_eq!(first.id, "501");
    assert_eq!(first.capacity, 10);
    // Stored lat comes from the source y column, lon from x.
    assert_eq!(first.lat, 60.16582);
    assert_eq!(first.lon, 24.840319);
}

#[tokio::test]
async fn journey_header_rejects_station_dataset_and_vice_versa() {
    let journey_csv = journey_csv(&[VALID_JOURNEY_ROW]);
    let mut station_sink: MemorySink<citybike_server::ingest::models::StationRecord> =
        MemorySink::new();
    assert!(matches!(
        load(journey_csv.lines(), &StationCodec, &mut station_sink).await,
        Err(LoadError::HeaderMismatch)
    ));

    let station_csv = format!("{}\n", STATION_HEADER);
    let mut journey_sink: MemorySink<citybike_server::ingest::models::JourneyRecord> =
        MemorySink::new();
    assert!(matches!(
        load(station_csv.lines(), &JourneyCodec, &mut journey_sink).await,
        Err(LoadError::HeaderMismatch)
    ));
}
