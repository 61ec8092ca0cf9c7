//! Row decoding
//!
//! A [`RowCodec`] turns one already-split CSV line into a typed record, or
//! rejects it. Decoding is a pure function of the input fields; all side
//! effects (batching, storage) live upstream in the loader.

use chrono::{NaiveDate, NaiveDateTime};

use super::models::{
    JourneyRecord, StationRecord, JOURNEY_HEADER, MIN_JOURNEY_DISTANCE_M, MIN_JOURNEY_DURATION_S,
    STATION_HEADER,
};

/// Outcome of decoding one row.
///
/// Rejections carry a reason for logging, but are never surfaced
/// individually to the uploader: a rejected row is skipped and tallied,
/// nothing more.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    Accepted(T),
    Rejected(&'static str),
}

/// Decodes rows of one dataset kind.
///
/// The input slice always has exactly `field_count()` entries; the loader
/// filters out lines with a deviating field count before decoding.
pub trait RowCodec {
    type Record;

    /// Exact header line expected as the first line of the dataset.
    fn header(&self) -> &'static str;

    /// Number of fields per row, implied by the header.
    fn field_count(&self) -> usize {
        self.header().split(',').count()
    }

    /// Decode one row into a record.
    fn decode(&self, fields: &[&str]) -> Decoded<Self::Record>;
}

/// Timestamp formats accepted on journey rows, tried in order.
///
/// Upstream exports are inconsistent about the date/time separator and
/// about carrying seconds, so parsing is deliberately lenient.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

/// Parse a timestamp in any of the accepted formats.
///
/// A bare date is accepted as midnight.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    for format in TIMESTAMP_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Codec for journey rows.
///
/// Column layout: departure time, return time, departure station id,
/// departure station name, return station id, return station name,
/// covered distance (m), duration (sec.). The two name columns are
/// ignored; names are resolved through the stations table at query time.
pub struct JourneyCodec;

impl RowCodec for JourneyCodec {
    type Record = JourneyRecord;

    fn header(&self) -> &'static str {
        JOURNEY_HEADER
    }

    fn decode(&self, fields: &[&str]) -> Decoded<JourneyRecord> {
        let Some(departure_time) = parse_timestamp(fields[0]) else {
            return Decoded::Rejected("unparseable departure time");
        };
        let Some(return_time) = parse_timestamp(fields[1]) else {
            return Decoded::Rejected("unparseable return time");
        };
        let Ok(distance) = fields[6].trim().parse::<f64>() else {
            return Decoded::Rejected("unparseable distance");
        };
        let Ok(duration) = fields[7].trim().parse::<f64>() else {
            return Decoded::Rejected("unparseable duration");
        };

        // Micro-trip filter: sub-10m / sub-10s rows are dock jitter, not
        // journeys.
        if distance < MIN_JOURNEY_DISTANCE_M || duration < MIN_JOURNEY_DURATION_S {
            return Decoded::Rejected("implausible micro-trip");
        }

        Decoded::Accepted(JourneyRecord {
            departure_time,
            return_time,
            departure_station: fields[2].to_string(),
            return_station: fields[4].to_string(),
            distance,
            duration,
        })
    }
}

/// Codec for station rows.
///
/// Column layout: FID, ID, Nimi, Namn, Name, Osoite, Adress, Kaupunki,
/// Stad, Operaattor, Kapasiet, x, y. FID is a per-export running number
/// and is dropped.
///
/// The source columns are x (longitude) then y (latitude), while the
/// stored schema is lat then lon. The swap below is intentional and must
/// stay: `lat` reads column y, `lon` reads column x.
pub struct StationCodec;

impl RowCodec for StationCodec {
    type Record = StationRecord;

    fn header(&self) -> &'static str {
        STATION_HEADER
    }

    fn decode(&self, fields: &[&str]) -> Decoded<StationRecord> {
        let Ok(capacity) = fields[10].trim().parse::<i32>() else {
            return Decoded::Rejected("unparseable capacity");
        };
        let Ok(lon) = fields[11].trim().parse::<f64>() else {
            return Decoded::Rejected("unparseable x coordinate");
        };
        let Ok(lat) = fields[12].trim().parse::<f64>() else {
            return Decoded::Rejected("unparseable y coordinate");
        };

        Decoded::Accepted(StationRecord {
            id: fields[1].to_string(),
            nimi: fields[2].to_string(),
            namn: fields[3].to_string(),
            name: fields[4].to_string(),
            address: fields[5].to_string(),
            adress: fields[6].to_string(),
            city: fields[7].to_string(),
            stad: fields[8].to_string(),
            operator: fields[9].to_string(),
            capacity,
            lat,
            lon,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn journey_fields<'a>() -> Vec<&'a str> {
        vec![
            "2021-05-31T23:57:25",
            "2021-06-01T00:05:46",
            "094",
            "Laajalahden aukio",
            "100",
            "Teljäntie",
            "2043",
            "500",
        ]
    }

    #[test]
    fn journey_row_decodes_exactly() {
        let decoded = JourneyCodec.decode(&journey_fields());

        let Decoded::Accepted(record) = decoded else {
            panic!("valid journey row was rejected");
        };
        assert_eq!(record.departure_station, "094");
        assert_eq!(record.return_station, "100");
        assert_eq!(record.distance, 2043.0);
        assert_eq!(record.duration, 500.0);
        assert_eq!(
            record.departure_time,
            NaiveDate::from_ymd_opt(2021, 5, 31)
                .unwrap()
                .and_hms_opt(23, 57, 25)
                .unwrap()
        );
    }

    #[test]
    fn journey_accepts_alternate_timestamp_formats() {
        let mut fields = journey_fields();
        fields[0] = "2021-05-31 23:57";
        fields[1] = "31.05.2021 23:59:59";
        assert!(matches!(
            JourneyCodec.decode(&fields),
            Decoded::Accepted(_)
        ));

        fields[0] = "2021-05-31";
        let Decoded::Accepted(record) = JourneyCodec.decode(&fields) else {
            panic!("bare date should be accepted as midnight");
        };
        assert_eq!(
            record.departure_time,
            NaiveDate::from_ymd_opt(2021, 5, 31)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn journey_rejects_unparseable_fields() {
        for (index, garbage) in [(0, "not a date"), (1, "31/31/31"), (6, "far"), (7, "long")] {
            let mut fields = journey_fields();
            fields[index] = garbage;
            assert!(
                matches!(JourneyCodec.decode(&fields), Decoded::Rejected(_)),
                "field {} = {:?} should reject the row",
                index,
                garbage
            );
        }
    }

    #[test]
    fn journey_rejects_micro_trips() {
        let mut fields = journey_fields();
        fields[6] = "9.99";
        assert_eq!(
            JourneyCodec.decode(&fields),
            Decoded::Rejected("implausible micro-trip")
        );

        let mut fields = journey_fields();
        fields[7] = "9";
        assert_eq!(
            JourneyCodec.decode(&fields),
            Decoded::Rejected("implausible micro-trip")
        );

        // Exactly at the thresholds is accepted.
        let mut fields = journey_fields();
        fields[6] = "10";
        fields[7] = "10";
        assert!(matches!(
            JourneyCodec.decode(&fields),
            Decoded::Accepted(_)
        ));
    }

    fn station_fields<'a>() -> Vec<&'a str> {
        vec![
            "1",
            "501",
            "Hanasaari",
            "Hanaholmen",
            "Hanasaari",
            "Hanasaarenranta 1",
            "Hanaholmsstranden 1",
            "Espoo",
            "Esbo",
            "CityBike Finland",
            "10",
            "24.840319",
            "60.16582",
        ]
    }

    #[test]
    fn station_row_swaps_coordinates() {
        let Decoded::Accepted(record) = StationCodec.decode(&station_fields()) else {
            panic!("valid station row was rejected");
        };
        assert_eq!(record.id, "501");
        assert_eq!(record.name, "Hanasaari");
        assert_eq!(record.operator, "CityBike Finland");
        assert_eq!(record.capacity, 10);
        // lat is sourced from the y column, lon from the x column.
        assert_eq!(record.lat, 60.16582);
        assert_eq!(record.lon, 24.840319);
    }

    #[test]
    fn station_rejects_unparseable_numbers() {
        for index in [10, 11, 12] {
            let mut fields = station_fields();
            fields[index] = "many";
            assert!(matches!(
                StationCodec.decode(&fields),
                Decoded::Rejected(_)
            ));
        }
    }

    #[test]
    fn header_field_counts() {
        assert_eq!(JourneyCodec.field_count(), 8);
        assert_eq!(StationCodec.field_count(), 13);
    }
}
