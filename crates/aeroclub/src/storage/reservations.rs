//! Reservation queries.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};
use tracing::{debug, info};
use uuid::Uuid;

use super::rows::{encode_time, ReservationRow, RESERVATION_COLUMNS};
use super::Storage;
use crate::error::Result;
use crate::model::{Reservation, TimeRange};

/// Criteria for [`Storage::list_reservations`]. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationFilter {
    /// Only reservations of this aircraft.
    pub aircraft_id: Option<String>,
    /// Only reservations flown by this pilot.
    pub pilot_id: Option<String>,
    /// Only reservations ending after this instant.
    pub after: Option<DateTime<Utc>>,
    /// Only reservations starting before this instant.
    pub before: Option<DateTime<Utc>>,
    /// Include cancelled reservations.
    pub include_cancelled: bool,
    /// Maximum number of rows returned.
    pub limit: Option<usize>,
}

impl ReservationFilter {
    /// Restrict to one aircraft.
    #[must_use]
    pub fn aircraft(mut self, aircraft_id: impl Into<String>) -> Self {
        self.aircraft_id = Some(aircraft_id.into());
        self
    }

    /// Restrict to one pilot.
    #[must_use]
    pub fn pilot(mut self, pilot_id: impl Into<String>) -> Self {
        self.pilot_id = Some(pilot_id.into());
        self
    }

    /// Restrict to reservations intersecting `window`.
    #[must_use]
    pub fn within(mut self, window: TimeRange) -> Self {
        self.after = Some(window.start);
        self.before = Some(window.end);
        self
    }
}

impl Storage {
    /// Insert a reservation.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails, including when the
    /// row violates a table constraint.
    pub fn insert_reservation(&self, reservation: &Reservation) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO reservations (
                id, user_id, pilot_id, instructor_id, aircraft_id, flight_type_id,
                start_time, end_time, status, comments, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ",
            params![
                reservation.id.to_string(),
                reservation.user_id,
                reservation.pilot_id,
                reservation.instructor_id,
                reservation.aircraft_id,
                reservation.flight_type_id,
                encode_time(reservation.start_time),
                encode_time(reservation.end_time),
                reservation.status.to_string(),
                reservation.comments,
                encode_time(reservation.created_at),
                encode_time(reservation.updated_at),
            ],
        )?;

        info!(
            "Stored reservation {} for {} on {}",
            reservation.id,
            reservation.range(),
            reservation.aircraft_id
        );
        Ok(())
    }

    /// Get a reservation by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails or the row is corrupt.
    pub fn get_reservation(&self, id: Uuid) -> Result<Option<Reservation>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = ?1"),
                [id.to_string()],
                ReservationRow::from_row,
            )
            .optional()?;
        row.map(Reservation::try_from).transpose()
    }

    /// Overwrite a stored reservation.
    ///
    /// Returns `true` if a reservation was updated, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn update_reservation(&self, reservation: &Reservation) -> Result<bool> {
        let affected = self.conn.execute(
            r"
            UPDATE reservations SET
                user_id = ?2, pilot_id = ?3, instructor_id = ?4, aircraft_id = ?5,
                flight_type_id = ?6, start_time = ?7, end_time = ?8, status = ?9,
                comments = ?10, updated_at = ?11
            WHERE id = ?1
            ",
            params![
                reservation.id.to_string(),
                reservation.user_id,
                reservation.pilot_id,
                reservation.instructor_id,
                reservation.aircraft_id,
                reservation.flight_type_id,
                encode_time(reservation.start_time),
                encode_time(reservation.end_time),
                reservation.status.to_string(),
                reservation.comments,
                encode_time(reservation.updated_at),
            ],
        )?;

        if affected > 0 {
            info!("Updated reservation {}", reservation.id);
        }
        Ok(affected > 0)
    }

    /// Delete a reservation and, through the foreign key, its flights.
    ///
    /// Returns `true` if a reservation was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_reservation(&self, id: Uuid) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM reservations WHERE id = ?1", [id.to_string()])?;

        if affected > 0 {
            info!("Deleted reservation {}", id);
        }
        Ok(affected > 0)
    }

    /// List reservations matching `filter`, earliest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails or a row is corrupt.
    pub fn list_reservations(&self, filter: &ReservationFilter) -> Result<Vec<Reservation>> {
        let mut stmt = self.conn.prepare(&format!(
            r"
            SELECT {RESERVATION_COLUMNS} FROM reservations
            WHERE (?1 IS NULL OR aircraft_id = ?1)
              AND (?2 IS NULL OR pilot_id = ?2)
              AND (?3 IS NULL OR start_time < ?3)
              AND (?4 IS NULL OR end_time > ?4)
              AND (?5 OR status = 'ACTIVE')
            ORDER BY start_time ASC LIMIT ?6
            "
        ))?;

        let before = filter.before.map(encode_time);
        let after = filter.after.map(encode_time);
        // SQLite treats a negative LIMIT as unbounded
        let limit = filter
            .limit
            .map_or(-1, |limit| i64::try_from(limit).unwrap_or(i64::MAX));

        let rows = stmt
            .query_map(
                params![
                    filter.aircraft_id,
                    filter.pilot_id,
                    before,
                    after,
                    filter.include_cancelled,
                    limit,
                ],
                ReservationRow::from_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(Reservation::try_from).collect()
    }

    /// Active reservations intersecting `window`, across all aircraft.
    ///
    /// This is the snapshot the overlap validators run against.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails or a row is corrupt.
    pub fn reservations_in_window(&self, window: &TimeRange) -> Result<Vec<Reservation>> {
        let mut stmt = self.conn.prepare(&format!(
            r"
            SELECT {RESERVATION_COLUMNS} FROM reservations
            WHERE status = 'ACTIVE' AND start_time < ?1 AND end_time > ?2
            ORDER BY start_time ASC
            "
        ))?;

        let rows = stmt
            .query_map(
                params![encode_time(window.end), encode_time(window.start)],
                ReservationRow::from_row,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!("{} active reservation(s) intersect {}", rows.len(), window);
        rows.into_iter().map(Reservation::try_from).collect()
    }

    /// Count stored reservations, optionally only active ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count_reservations(&self, active_only: bool) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM reservations WHERE (?1 = 0 OR status = 'ACTIVE')",
            [active_only],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
