//! Typed table rows and their mapping to domain values.
//!
//! Every read goes through a `*Row` struct that mirrors the table columns
//! one-to-one, then through a `TryFrom` into the domain type. A row that cannot
//! be mapped (bad timestamp, unknown status, malformed id) surfaces as
//! [`Error::CorruptRow`] instead of being silently defaulted.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::Row;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::model::{Availability, Flight, Reservation};

/// Column list shared by every reservation query.
pub(super) const RESERVATION_COLUMNS: &str = "id, user_id, pilot_id, instructor_id, aircraft_id, \
     flight_type_id, start_time, end_time, status, comments, created_at, updated_at";

/// Column list shared by every availability query.
pub(super) const AVAILABILITY_COLUMNS: &str = "id, aircraft_id, user_id, start_time, end_time, \
     slot_type, is_recurring, recurrence_pattern, recurrence_end_date, reason, created_at";

/// Column list shared by every flight query.
pub(super) const FLIGHT_COLUMNS: &str =
    "id, reservation_id, pilot_id, aircraft_id, departure_time, duration_minutes, created_at";

/// Encode an instant as a fixed-width RFC 3339 UTC string.
pub(super) fn encode_time(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_time(table: &'static str, column: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::corrupt_row(table, format!("{column} {value:?}: {e}")))
}

fn decode_id(table: &'static str, column: &str, value: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| Error::corrupt_row(table, format!("{column} {value:?}: {e}")))
}

/// A row of the `reservations` table.
#[derive(Debug, Clone)]
pub(super) struct ReservationRow {
    id: String,
    user_id: String,
    pilot_id: String,
    instructor_id: Option<String>,
    aircraft_id: String,
    flight_type_id: Option<String>,
    start_time: String,
    end_time: String,
    status: String,
    comments: Option<String>,
    created_at: String,
    updated_at: String,
}

impl ReservationRow {
    pub(super) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            pilot_id: row.get("pilot_id")?,
            instructor_id: row.get("instructor_id")?,
            aircraft_id: row.get("aircraft_id")?,
            flight_type_id: row.get("flight_type_id")?,
            start_time: row.get("start_time")?,
            end_time: row.get("end_time")?,
            status: row.get("status")?,
            comments: row.get("comments")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = Error;

    fn try_from(row: ReservationRow) -> Result<Self> {
        const TABLE: &str = "reservations";
        Ok(Self {
            id: decode_id(TABLE, "id", &row.id)?,
            user_id: row.user_id,
            pilot_id: row.pilot_id,
            instructor_id: row.instructor_id,
            aircraft_id: row.aircraft_id,
            flight_type_id: row.flight_type_id,
            start_time: decode_time(TABLE, "start_time", &row.start_time)?,
            end_time: decode_time(TABLE, "end_time", &row.end_time)?,
            status: row
                .status
                .parse()
                .map_err(|e: String| Error::corrupt_row(TABLE, e))?,
            comments: row.comments,
            created_at: decode_time(TABLE, "created_at", &row.created_at)?,
            updated_at: decode_time(TABLE, "updated_at", &row.updated_at)?,
        })
    }
}

/// A row of the `availabilities` table.
#[derive(Debug, Clone)]
pub(super) struct AvailabilityRow {
    id: String,
    aircraft_id: Option<String>,
    user_id: Option<String>,
    start_time: String,
    end_time: String,
    slot_type: String,
    is_recurring: bool,
    recurrence_pattern: Option<String>,
    recurrence_end_date: Option<String>,
    reason: Option<String>,
    created_at: String,
}

impl AvailabilityRow {
    pub(super) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            aircraft_id: row.get("aircraft_id")?,
            user_id: row.get("user_id")?,
            start_time: row.get("start_time")?,
            end_time: row.get("end_time")?,
            slot_type: row.get("slot_type")?,
            is_recurring: row.get("is_recurring")?,
            recurrence_pattern: row.get("recurrence_pattern")?,
            recurrence_end_date: row.get("recurrence_end_date")?,
            reason: row.get("reason")?,
            created_at: row.get("created_at")?,
        })
    }
}

impl TryFrom<AvailabilityRow> for Availability {
    type Error = Error;

    fn try_from(row: AvailabilityRow) -> Result<Self> {
        const TABLE: &str = "availabilities";
        let recurrence_end_date = row
            .recurrence_end_date
            .map(|value| {
                value.parse::<NaiveDate>().map_err(|e| {
                    Error::corrupt_row(TABLE, format!("recurrence_end_date {value:?}: {e}"))
                })
            })
            .transpose()?;

        Ok(Self {
            id: decode_id(TABLE, "id", &row.id)?,
            aircraft_id: row.aircraft_id,
            user_id: row.user_id,
            start_time: decode_time(TABLE, "start_time", &row.start_time)?,
            end_time: decode_time(TABLE, "end_time", &row.end_time)?,
            slot_type: row
                .slot_type
                .parse()
                .map_err(|e: String| Error::corrupt_row(TABLE, e))?,
            is_recurring: row.is_recurring,
            recurrence_pattern: row.recurrence_pattern,
            recurrence_end_date,
            reason: row.reason,
            created_at: decode_time(TABLE, "created_at", &row.created_at)?,
        })
    }
}

/// A row of the `flights` table.
#[derive(Debug, Clone)]
pub(super) struct FlightRow {
    id: String,
    reservation_id: Option<String>,
    pilot_id: String,
    aircraft_id: String,
    departure_time: String,
    duration_minutes: i64,
    created_at: String,
}

impl FlightRow {
    pub(super) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            reservation_id: row.get("reservation_id")?,
            pilot_id: row.get("pilot_id")?,
            aircraft_id: row.get("aircraft_id")?,
            departure_time: row.get("departure_time")?,
            duration_minutes: row.get("duration_minutes")?,
            created_at: row.get("created_at")?,
        })
    }
}

impl TryFrom<FlightRow> for Flight {
    type Error = Error;

    fn try_from(row: FlightRow) -> Result<Self> {
        const TABLE: &str = "flights";
        let duration_minutes = u32::try_from(row.duration_minutes).map_err(|_| {
            Error::corrupt_row(
                TABLE,
                format!("duration_minutes out of range: {}", row.duration_minutes),
            )
        })?;

        Ok(Self {
            id: decode_id(TABLE, "id", &row.id)?,
            reservation_id: row
                .reservation_id
                .as_deref()
                .map(|value| decode_id(TABLE, "reservation_id", value))
                .transpose()?,
            pilot_id: row.pilot_id,
            aircraft_id: row.aircraft_id,
            departure_time: decode_time(TABLE, "departure_time", &row.departure_time)?,
            duration_minutes,
            created_at: decode_time(TABLE, "created_at", &row.created_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_encoded_times_sort_chronologically() {
        let earlier = Utc.with_ymd_and_hms(2030, 6, 3, 9, 59, 59).unwrap();
        let later = earlier + chrono::Duration::milliseconds(500);
        let latest = Utc.with_ymd_and_hms(2030, 6, 3, 10, 0, 0).unwrap();

        assert!(encode_time(earlier) < encode_time(later));
        assert!(encode_time(later) < encode_time(latest));
        assert_eq!(encode_time(latest).len(), encode_time(later).len());
    }

    #[test]
    fn test_encoded_time_round_trips() {
        let instant = Utc.with_ymd_and_hms(2030, 6, 3, 8, 15, 0).unwrap();
        let encoded = encode_time(instant);
        assert_eq!(encoded, "2030-06-03T08:15:00.000000Z");
        assert_eq!(decode_time("reservations", "start_time", &encoded).unwrap(), instant);
    }

    #[test]
    fn test_bad_time_is_corrupt_row() {
        let err = decode_time("reservations", "start_time", "yesterday").unwrap_err();
        assert!(matches!(err, Error::CorruptRow { table: "reservations", .. }));
        assert!(err.to_string().contains("start_time"));
    }

    #[test]
    fn test_bad_id_is_corrupt_row() {
        let err = decode_id("flights", "id", "42").unwrap_err();
        assert!(matches!(err, Error::CorruptRow { table: "flights", .. }));
    }

    #[test]
    fn test_unknown_status_is_corrupt_row() {
        let row = ReservationRow {
            id: Uuid::new_v4().to_string(),
            user_id: "alice".to_string(),
            pilot_id: "alice".to_string(),
            instructor_id: None,
            aircraft_id: "F-GABC".to_string(),
            flight_type_id: None,
            start_time: "2030-06-03T08:00:00.000000Z".to_string(),
            end_time: "2030-06-03T10:00:00.000000Z".to_string(),
            status: "PENDING".to_string(),
            comments: None,
            created_at: "2030-06-01T00:00:00.000000Z".to_string(),
            updated_at: "2030-06-01T00:00:00.000000Z".to_string(),
        };
        let err = Reservation::try_from(row).unwrap_err();
        assert!(err.to_string().contains("PENDING"));
    }

    #[test]
    fn test_negative_duration_is_corrupt_row() {
        let row = FlightRow {
            id: Uuid::new_v4().to_string(),
            reservation_id: None,
            pilot_id: "alice".to_string(),
            aircraft_id: "F-GABC".to_string(),
            departure_time: "2030-06-03T08:00:00.000000Z".to_string(),
            duration_minutes: -5,
            created_at: "2030-06-03T10:00:00.000000Z".to_string(),
        };
        let err = Flight::try_from(row).unwrap_err();
        assert!(err.to_string().contains("duration_minutes"));
    }
}
