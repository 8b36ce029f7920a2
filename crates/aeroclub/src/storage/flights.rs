//! Flight log queries.

use rusqlite::params;
use tracing::info;
use uuid::Uuid;

use super::rows::{encode_time, FlightRow, FLIGHT_COLUMNS};
use super::Storage;
use crate::error::Result;
use crate::model::Flight;

impl Storage {
    /// Insert a flight.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails, including when the
    /// referenced reservation does not exist.
    pub fn insert_flight(&self, flight: &Flight) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO flights (
                id, reservation_id, pilot_id, aircraft_id, departure_time,
                duration_minutes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
            params![
                flight.id.to_string(),
                flight.reservation_id.map(|id| id.to_string()),
                flight.pilot_id,
                flight.aircraft_id,
                encode_time(flight.departure_time),
                flight.duration_minutes,
                encode_time(flight.created_at),
            ],
        )?;

        info!(
            "Logged {} min flight on {} for {}",
            flight.duration_minutes, flight.aircraft_id, flight.pilot_id
        );
        Ok(())
    }

    /// Flights flown under a reservation, by departure time.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails or a row is corrupt.
    pub fn flights_for_reservation(&self, reservation_id: Uuid) -> Result<Vec<Flight>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {FLIGHT_COLUMNS} FROM flights \
             WHERE reservation_id = ?1 ORDER BY departure_time ASC"
        ))?;

        let rows = stmt
            .query_map([reservation_id.to_string()], FlightRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(Flight::try_from).collect()
    }

    /// Count logged flights.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count_flights(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM flights", [], |row| row.get(0))?;
        Ok(count)
    }
}
