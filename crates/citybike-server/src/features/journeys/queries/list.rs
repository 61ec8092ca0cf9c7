//! List journeys query
//!
//! Filtered, sorted, paginated view over the ingested journeys. The only
//! dynamically assembled query text is the ORDER BY clause, and its inputs
//! are drawn from closed enumerations ([`OrderKey`], [`Direction`]) mapped
//! to fixed column expressions; external text is never interpolated.
//! Filter values always travel as bound parameters using the OR-sentinel
//! convention, so one statement shape serves restricted and unrestricted
//! filters alike.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::shared::{round_to, DECIMAL_ROUND};

/// Journeys shown per page.
pub const PAGE_SIZE: i64 = 1000;

const METERS_IN_KILOMETER: f64 = 1000.0;
const SECONDS_IN_MINUTE: f64 = 60.0;

/// Sentinel meaning "no bound requested"; never a legitimate distance or
/// duration.
const UNBOUNDED: f64 = -1.0;

// ============================================================================
// Ordering Whitelist
// ============================================================================

/// Sort keys the caller may promote to primary.
///
/// SQL cannot parameterize column identifiers, so the ordering clause is
/// built from this closed set only. Anything else requested from outside
/// falls back to the default order before any string assembly happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderKey {
    DepartureName,
    ReturnName,
    Distance,
    Duration,
}

impl OrderKey {
    /// Default ordering; also the fixed tie-breaker sequence. Keeping all
    /// four keys in every query yields a total order, which pagination
    /// depends on: without it page boundaries could duplicate or skip rows.
    pub const DEFAULT_SEQUENCE: [OrderKey; 4] = [
        OrderKey::DepartureName,
        OrderKey::ReturnName,
        OrderKey::Distance,
        OrderKey::Duration,
    ];

    /// Fixed column expression this key maps to.
    pub fn column(self) -> &'static str {
        match self {
            OrderKey::DepartureName => "departures.name",
            OrderKey::ReturnName => "returns.name",
            OrderKey::Distance => "distance",
            OrderKey::Duration => "duration",
        }
    }

    /// Parse an external `order` parameter. Unknown values mean "no
    /// promotion requested".
    pub fn parse(value: &str) -> Option<OrderKey> {
        match value {
            "departures.name" => Some(OrderKey::DepartureName),
            "returns.name" => Some(OrderKey::ReturnName),
            "distance" => Some(OrderKey::Distance),
            "duration" => Some(OrderKey::Duration),
            _ => None,
        }
    }

    /// The four-key ordering sequence with `primary` promoted to position
    /// 1; the remaining keys keep their relative order as tie-breakers.
    pub fn sequence(primary: Option<OrderKey>) -> [OrderKey; 4] {
        let mut sequence = Self::DEFAULT_SEQUENCE;
        if let Some(key) = primary {
            if let Some(position) = sequence.iter().position(|k| *k == key) {
                sequence[..=position].rotate_right(1);
            }
        }
        sequence
    }
}

/// Sort direction for the primary key, from a closed set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    /// Storage default order (ascending, without an explicit keyword).
    #[default]
    Unspecified,
    Asc,
    Desc,
}

impl Direction {
    /// Parse an external `direction` parameter. Unknown values fall back
    /// to the unspecified default rather than ever reaching the query
    /// text.
    pub fn parse(value: &str) -> Direction {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Direction::Asc,
            "desc" => Direction::Desc,
            _ => Direction::Unspecified,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Direction::Unspecified => "",
            Direction::Asc => " ASC",
            Direction::Desc => " DESC",
        }
    }
}

// ============================================================================
// Query Types
// ============================================================================

/// Raw listing parameters as they arrive on the URL. All optional;
/// omitted filters never restrict the result set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListJourneysQuery {
    /// Zero-based page index.
    pub page: Option<i64>,
    /// Exact-match departure station name.
    pub departure: Option<String>,
    /// Exact-match return station name.
    #[serde(rename = "return")]
    pub arrival: Option<String>,
    /// Minimum covered distance in kilometers.
    pub mindistance: Option<f64>,
    /// Maximum covered distance in kilometers.
    pub maxdistance: Option<f64>,
    /// Minimum duration in minutes.
    pub minduration: Option<f64>,
    /// Maximum duration in minutes.
    pub maxduration: Option<f64>,
    /// Primary sort key; one of the whitelisted column expressions.
    pub order: Option<String>,
    /// "asc", "desc", or empty.
    pub direction: Option<String>,
}

/// Resolved filter specification with sentinels and storage units applied.
#[derive(Debug, Clone, PartialEq)]
struct JourneyFilter {
    departure: String,
    arrival: String,
    min_distance: f64,
    max_distance: f64,
    min_duration: f64,
    max_duration: f64,
    order: [OrderKey; 4],
    direction: Direction,
    page: i64,
}

impl JourneyFilter {
    fn from_params(query: &ListJourneysQuery) -> Self {
        Self {
            departure: query.departure.clone().unwrap_or_default(),
            arrival: query.arrival.clone().unwrap_or_default(),
            min_distance: to_sentinel(query.mindistance, METERS_IN_KILOMETER),
            max_distance: to_sentinel(query.maxdistance, METERS_IN_KILOMETER),
            min_duration: to_sentinel(query.minduration, SECONDS_IN_MINUTE),
            max_duration: to_sentinel(query.maxduration, SECONDS_IN_MINUTE),
            order: OrderKey::sequence(query.order.as_deref().and_then(OrderKey::parse)),
            direction: query
                .direction
                .as_deref()
                .map(Direction::parse)
                .unwrap_or_default(),
            page: query.page.unwrap_or(0).max(0),
        }
    }
}

/// Convert a user-facing bound (km or minutes) to storage units, or to the
/// disabling sentinel when absent.
fn to_sentinel(bound: Option<f64>, factor: f64) -> f64 {
    match bound {
        Some(value) => value * factor,
        None => UNBOUNDED,
    }
}

/// One journey on a listing page, in presentation units.
#[derive(Debug, Clone, Serialize)]
pub struct JourneyListItem {
    pub departure_station: String,
    pub return_station: String,
    /// Covered distance in kilometers, rounded to 5 decimals.
    pub distance: f64,
    /// Duration in minutes, rounded to 5 decimals.
    pub duration: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListJourneysResponse {
    pub items: Vec<JourneyListItem>,
    /// Zero-based page index that was served.
    pub page: i64,
    /// Whether a further page exists.
    pub has_more: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ListJourneysError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, sqlx::FromRow)]
struct JourneyRow {
    departure_name: String,
    return_name: String,
    distance: f64,
    duration: f64,
}

// ============================================================================
// Query Construction
// ============================================================================

/// Build the listing statement for the given ordering.
///
/// Every filter predicate is `(column op $n OR $n = sentinel)`: binding the
/// sentinel disables the condition without changing the SQL text. Only the
/// ORDER BY clause varies, and only over whitelisted expressions.
fn build_sql(order: &[OrderKey; 4], direction: Direction) -> String {
    let mut order_clause = String::new();
    order_clause.push_str(order[0].column());
    order_clause.push_str(direction.keyword());
    for key in &order[1..] {
        order_clause.push_str(", ");
        order_clause.push_str(key.column());
    }

    format!(
        "SELECT departures.name AS departure_name, returns.name AS return_name, \
                distance, duration \
         FROM journeys \
         JOIN stations departures ON journeys.departure_station = departures.id \
         JOIN stations returns ON journeys.return_station = returns.id \
         WHERE (departures.name = $1 OR $1 = '') \
           AND (returns.name = $2 OR $2 = '') \
           AND ($3 <= distance OR $3 = -1) \
           AND (distance <= $4 OR $4 = -1) \
           AND ($5 <= duration OR $5 = -1) \
           AND (duration <= $6 OR $6 = -1) \
         ORDER BY {order_clause} \
         LIMIT $7 OFFSET $8"
    )
}

/// Peek-ahead pagination: `rows` was fetched with `LIMIT page_size + 1`.
/// Receiving the full overfetch means a further page exists and the extra
/// row is trimmed; anything less is the last page.
fn trim_page<T>(mut rows: Vec<T>, page_size: usize) -> (Vec<T>, bool) {
    if rows.len() > page_size {
        rows.truncate(page_size);
        (rows, true)
    } else {
        (rows, false)
    }
}

/// Row offset for a zero-based page index. Saturates instead of
/// overflowing, so an absurd page index yields an empty page rather than
/// a storage error.
fn page_offset(page: i64) -> i64 {
    PAGE_SIZE.saturating_mul(page)
}

// ============================================================================
// Handler
// ============================================================================

#[tracing::instrument(skip(pool))]
pub async fn handle(
    pool: PgPool,
    query: ListJourneysQuery,
) -> Result<ListJourneysResponse, ListJourneysError> {
    let filter = JourneyFilter::from_params(&query);
    let sql = build_sql(&filter.order, filter.direction);

    let rows: Vec<JourneyRow> = sqlx::query_as(&sql)
        .bind(&filter.departure)
        .bind(&filter.arrival)
        .bind(filter.min_distance)
        .bind(filter.max_distance)
        .bind(filter.min_duration)
        .bind(filter.max_duration)
        .bind(PAGE_SIZE + 1)
        .bind(page_offset(filter.page))
        .fetch_all(&pool)
        .await?;

    let (rows, has_more) = trim_page(rows, PAGE_SIZE as usize);

    let items = rows
        .into_iter()
        .map(|row| JourneyListItem {
            departure_station: row.departure_name,
            return_station: row.return_name,
            distance: round_to(row.distance / METERS_IN_KILOMETER, DECIMAL_ROUND),
            duration: round_to(row.duration / SECONDS_IN_MINUTE, DECIMAL_ROUND),
        })
        .collect();

    Ok(ListJourneysResponse {
        items,
        page: filter.page,
        has_more,
    })
}
