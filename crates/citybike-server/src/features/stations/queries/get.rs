//! Single-station statistics query
//!
//! Aggregates journey traffic for one station: counts and average
//! distances for journeys starting here and ending here, the most popular
//! counterpart stations in both directions, and the month-year sets the
//! caller can filter on. Both aggregate filters use a month sentinel of 0
//! meaning "all journeys".

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::OnceLock;

use crate::features::shared::{round_to, DECIMAL_ROUND};

const METERS_IN_KILOMETER: f64 = 1000.0;

/// Number of popular counterpart stations reported per direction.
const POPULAR_LIMIT: i64 = 5;

/// Form of the month filter parameters: "M-YYYY" or "MM-YYYY".
const MONTH_PARAM: &str = r"^\d\d?-\d{4}$";

/// Query for one station's statistics report.
#[derive(Debug, Clone, Deserialize)]
pub struct GetStationQuery {
    pub id: String,
    /// Restrict aggregates to journeys departing in this "M-YYYY" month.
    pub departure: Option<String>,
    /// Restrict aggregates to journeys returning in this "M-YYYY" month.
    #[serde(rename = "return")]
    pub arrival: Option<String>,
}

/// Month restriction for the aggregate queries. `0-0` means unrestricted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct MonthFilter {
    month: i32,
    year: i32,
}

/// The month parameter pattern, compiled once per process.
fn month_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(MONTH_PARAM).expect("MONTH_PARAM is a valid pattern"))
}

/// Parse an "M-YYYY" parameter. Anything not matching the expected form
/// means "any month", mirroring how an absent parameter behaves.
fn parse_month_filter(value: Option<&str>) -> MonthFilter {
    let unrestricted = MonthFilter::default();

    let Some(value) = value else {
        return unrestricted;
    };
    if !month_pattern().is_match(value) {
        return unrestricted;
    }
    let Some((month, year)) = value.split_once('-') else {
        return unrestricted;
    };

    MonthFilter {
        month: month.parse().unwrap_or(0),
        year: year.parse().unwrap_or(0),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GetStationResponse {
    pub id: String,
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lon: f64,
    /// Journeys departing from this station under the active filters.
    pub journeys_starting: i64,
    /// Journeys ending at this station under the active filters.
    pub journeys_ending: i64,
    /// Average departing journey distance in kilometers; absent when no
    /// journeys match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_starting_distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_ending_distance: Option<f64>,
    /// Most popular return stations for journeys starting here.
    pub popular_returns: Vec<String>,
    /// Most popular departure stations for journeys ending here.
    pub popular_departures: Vec<String>,
    /// "M-YYYY" months in which journeys departed from this station.
    pub departure_months: Vec<String>,
    /// "M-YYYY" months in which journeys returned to this station.
    pub return_months: Vec<String>,
    /// Echo of the active departure month filter, or "anytime".
    pub departure_filter: String,
    /// Echo of the active return month filter, or "anytime".
    pub return_filter: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GetStationError {
    #[error("No station found with id {0}")]
    NotFound(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, sqlx::FromRow)]
struct StationHead {
    name: String,
    address: String,
    lat: f64,
    lon: f64,
}

#[derive(Debug, sqlx::FromRow)]
struct TrafficTotals {
    starting: i64,
    ending: i64,
    starting_distance: Option<f64>,
    ending_distance: Option<f64>,
}

#[tracing::instrument(skip(pool), fields(station_id = %query.id))]
pub async fn handle(
    pool: PgPool,
    query: GetStationQuery,
) -> Result<GetStationResponse, GetStationError> {
    let departure_filter = parse_month_filter(query.departure.as_deref());
    let return_filter = parse_month_filter(query.arrival.as_deref());

    let head: StationHead =
        sqlx::query_as("SELECT name, address, lat, lon FROM stations WHERE id = $1")
            .bind(&query.id)
            .fetch_optional(&pool)
            .await?
            .ok_or_else(|| GetStationError::NotFound(query.id.clone()))?;

    let totals: TrafficTotals = sqlx::query_as(
        "SELECT COUNT(CASE WHEN journeys.departure_station = $1 THEN 1 END) AS starting, \
                COUNT(CASE WHEN journeys.return_station = $1 THEN 1 END) AS ending, \
                AVG(CASE WHEN journeys.departure_station = $1 THEN journeys.distance END) \
                    AS starting_distance, \
                AVG(CASE WHEN journeys.return_station = $1 THEN journeys.distance END) \
                    AS ending_distance \
         FROM journeys \
         WHERE (0 = $2 OR (EXTRACT(MONTH FROM journeys.departure_time)::int = $2 \
                           AND EXTRACT(YEAR FROM journeys.departure_time)::int = $3)) \
           AND (0 = $4 OR (EXTRACT(MONTH FROM journeys.return_time)::int = $4 \
                           AND EXTRACT(YEAR FROM journeys.return_time)::int = $5))",
    )
    .bind(&query.id)
    .bind(departure_filter.month)
    .bind(departure_filter.year)
    .bind(return_filter.month)
    .bind(return_filter.year)
    .fetch_one(&pool)
    .await?;

    let popular_returns: Vec<String> = sqlx::query_scalar(
        "SELECT stations.name \
         FROM journeys \
         JOIN stations ON stations.id = journeys.return_station \
         WHERE departure_station = $1 \
           AND (0 = $2 OR (EXTRACT(MONTH FROM departure_time)::int = $2 \
                           AND EXTRACT(YEAR FROM departure_time)::int = $3)) \
           AND (0 = $4 OR (EXTRACT(MONTH FROM return_time)::int = $4 \
                           AND EXTRACT(YEAR FROM return_time)::int = $5)) \
         GROUP BY stations.id, stations.name \
         ORDER BY COUNT(*) DESC \
         LIMIT $6",
    )
    .bind(&query.id)
    .bind(departure_filter.month)
    .bind(departure_filter.year)
    .bind(return_filter.month)
    .bind(return_filter.year)
    .bind(POPULAR_LIMIT)
    .fetch_all(&pool)
    .await?;

    let popular_departures: Vec<String> = sqlx::query_scalar(
        "SELECT stations.name \
         FROM journeys \
         JOIN stations ON stations.id = journeys.departure_station \
         WHERE return_station = $1 \
           AND (0 = $2 OR (EXTRACT(MONTH FROM departure_time)::int = $2 \
                           AND EXTRACT(YEAR FROM departure_time)::int = $3)) \
           AND (0 = $4 OR (EXTRACT(MONTH FROM return_time)::int = $4 \
                           AND EXTRACT(YEAR FROM return_time)::int = $5)) \
         GROUP BY stations.id, stations.name \
         ORDER BY COUNT(*) DESC \
         LIMIT $6",
    )
    .bind(&query.id)
    .bind(departure_filter.month)
    .bind(departure_filter.year)
    .bind(return_filter.month)
    .bind(return_filter.year)
    .bind(POPULAR_LIMIT)
    .fetch_all(&pool)
    .await?;

    let departure_months: Vec<(i32, i32)> = sqlx::query_as(
        "SELECT EXTRACT(MONTH FROM departure_time)::int AS month, \
                EXTRACT(YEAR FROM departure_time)::int AS year \
         FROM journeys \
         WHERE departure_station = $1 \
         GROUP BY year, month \
         ORDER BY year, month",
    )
    .bind(&query.id)
    .fetch_all(&pool)
    .await?;

    let return_months: Vec<(i32, i32)> = sqlx::query_as(
        "SELECT EXTRACT(MONTH FROM return_time)::int AS month, \
                EXTRACT(YEAR FROM return_time)::int AS year \
         FROM journeys \
         WHERE return_station = $1 \
         GROUP BY year, month \
         ORDER BY year, month",
    )
    .bind(&query.id)
    .fetch_all(&pool)
    .await?;

    let format_month = |(month, year): (i32, i32)| format!("{}-{}", month, year);

    Ok(GetStationResponse {
        id: query.id,
        name: head.name,
        address: head.address,
        lat: round_to(head.lat, DECIMAL_ROUND),
        lon: round_to(head.lon, DECIMAL_ROUND),
        journeys_starting: totals.starting,
        journeys_ending: totals.ending,
        avg_starting_distance: totals
            .starting_distance
            .map(|d| round_to(d / METERS_IN_KILOMETER, DECIMAL_ROUND)),
        avg_ending_distance: totals
            .ending_distance
            .map(|d| round_to(d / METERS_IN_KILOMETER, DECIMAL_ROUND)),
        popular_returns,
        popular_departures,
        departure_months: departure_months.into_iter().map(format_month).collect(),
        return_months: return_months.into_iter().map(format_month).collect(),
        departure_filter: query.departure.unwrap_or_else(|| "anytime".to_string()),
        return_filter: query.arrival.unwrap_or_else(|| "anytime".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_filter_accepts_both_digit_widths() {
        assert_eq!(
            parse_month_filter(Some("5-2021")),
            MonthFilter {
                month: 5,
                year: 2021
            }
        );
        assert_eq!(
            parse_month_filter(Some("11-2021")),
            MonthFilter {
                month: 11,
                year: 2021
            }
        );
    }

    #[test]
    fn month_pattern_is_compiled_once() {
        assert!(std::ptr::eq(month_pattern(), month_pattern()));
    }

    #[test]
    fn month_filter_falls_back_to_unrestricted() {
        assert_eq!(parse_month_filter(None), MonthFilter::default());
        assert_eq!(parse_month_filter(Some("")), MonthFilter::default());
        assert_eq!(parse_month_filter(Some("2021-05")), MonthFilter::default());
        assert_eq!(parse_month_filter(Some("123-2021")), MonthFilter::default());
        assert_eq!(parse_month_filter(Some("may-2021")), MonthFilter::default());
    }
}
