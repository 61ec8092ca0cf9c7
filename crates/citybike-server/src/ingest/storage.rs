//! Transactional ingest session
//!
//! One [`IngestSession`] spans one upload request. Batch submission is a
//! method on the session value, so every INSERT of the request runs inside
//! the same transaction and commits exactly once at the end.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use super::loader::RecordSink;
use super::models::{JourneyRecord, StationRecord};

/// Storage session owning the upload transaction.
pub struct IngestSession {
    tx: Transaction<'static, Postgres>,
}

impl IngestSession {
    /// Open a transaction for one upload request.
    pub async fn begin(pool: &PgPool) -> Result<Self, sqlx::Error> {
        Ok(Self {
            tx: pool.begin().await?,
        })
    }

    /// Commit everything flushed during this session.
    ///
    /// Called once per upload, after both dataset loads returned —
    /// including when one of them failed its header check. Batches flushed
    /// before such a failure stay committed; partial ingestion up to the
    /// point of failure is accepted behavior.
    pub async fn commit(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }
}

#[async_trait]
impl RecordSink<JourneyRecord> for IngestSession {
    async fn submit(&mut self, batch: &[JourneyRecord]) -> Result<(), sqlx::Error> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO journeys (departure_time, return_time, departure_station, \
             return_station, distance, duration) ",
        );

        query_builder.push_values(batch, |mut b, journey| {
            b.push_bind(journey.departure_time)
                .push_bind(journey.return_time)
                .push_bind(&journey.departure_station)
                .push_bind(&journey.return_station)
                .push_bind(journey.distance)
                .push_bind(journey.duration);
        });

        query_builder.build().execute(&mut *self.tx).await?;

        tracing::debug!(rows = batch.len(), "Journey batch written");
        Ok(())
    }
}

#[async_trait]
impl RecordSink<StationRecord> for IngestSession {
    async fn submit(&mut self, batch: &[StationRecord]) -> Result<(), sqlx::Error> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO stations (id, nimi, namn, name, address, adress, city, stad, \
             operator, capacity, lat, lon) ",
        );

        query_builder.push_values(batch, |mut b, station| {
            b.push_bind(&station.id)
                .push_bind(&station.nimi)
                .push_bind(&station.namn)
                .push_bind(&station.name)
                .push_bind(&station.address)
                .push_bind(&station.adress)
                .push_bind(&station.city)
                .push_bind(&station.stad)
                .push_bind(&station.operator)
                .push_bind(station.capacity)
                .push_bind(station.lat)
                .push_bind(station.lon);
        });

        // Station ids come from an external authority; a collision means
        // the station is already known and the first write wins.
        query_builder.push(" ON CONFLICT DO NOTHING");

        query_builder.build().execute(&mut *self.tx).await?;

        tracing::debug!(rows = batch.len(), "Station batch written");
        Ok(())
    }
}
