//! List stations query

use serde::Serialize;
use sqlx::PgPool;

use crate::features::shared::{round_to, DECIMAL_ROUND};

/// One station in the listing, in presentation units.
#[derive(Debug, Clone, Serialize)]
pub struct StationListItem {
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
    /// Latitude rounded to 5 decimals.
    pub lat: f64,
    /// Longitude rounded to 5 decimals.
    pub lon: f64,
}

#[derive(Debug, sqlx::FromRow)]
struct StationRow {
    id: String,
    nimi: String,
    namn: String,
    name: String,
    address: String,
    adress: String,
    city: String,
    stad: String,
    operator: String,
    capacity: i32,
    lat: f64,
    lon: f64,
}

impl From<StationRow> for StationListItem {
    fn from(row: StationRow) -> Self {
        Self {
            id: row.id,
            nimi: row.nimi,
            namn: row.namn,
            name: row.name,
            address: row.address,
            adress: row.adress,
            city: row.city,
            stad: row.stad,
            operator: row.operator,
            capacity: row.capacity,
            lat: round_to(row.lat, DECIMAL_ROUND),
            lon: round_to(row.lon, DECIMAL_ROUND),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListStationsResponse {
    pub items: Vec<StationListItem>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListStationsError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool) -> Result<ListStationsResponse, ListStationsError> {
    let rows: Vec<StationRow> = sqlx::query_as(
        "SELECT id, nimi, namn, name, address, adress, city, stad, operator, \
                capacity, lat, lon \
         FROM stations \
         ORDER BY id",
    )
    .fetch_all(&pool)
    .await?;

    Ok(ListStationsResponse {
        items: rows.into_iter().map(StationListItem::from).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_rounds_coordinates() {
        let row = StationRow {
            id: "501".to_string(),
            nimi: "Hanasaari".to_string(),
            namn: "Hanaholmen".to_string(),
            name: "Hanasaari".to_string(),
            address: "Hanasaarenranta 1".to_string(),
            adress: "Hanaholmsstranden 1".to_string(),
            city: "Espoo".to_string(),
            stad: "Esbo".to_string(),
            operator: "CityBike Finland".to_string(),
            capacity: 10,
            lat: 60.168265666,
            lon: 24.840319274,
        };

        let item = StationListItem::from(row);
        assert_eq!(item.lat, 60.16827);
        assert_eq!(item.lon, 24.84032);
        assert_eq!(item.capacity, 10);
    }
}
