//! Availability and blackout queries.

use rusqlite::{params, OptionalExtension};
use tracing::info;
use uuid::Uuid;

use super::rows::{encode_time, AvailabilityRow, AVAILABILITY_COLUMNS};
use super::Storage;
use crate::error::Result;
use crate::model::Availability;

impl Storage {
    /// Insert an availability record.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails, including when the
    /// record has both or neither of an aircraft and a member.
    pub fn insert_availability(&self, record: &Availability) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO availabilities (
                id, aircraft_id, user_id, start_time, end_time, slot_type,
                is_recurring, recurrence_pattern, recurrence_end_date, reason, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ",
            params![
                record.id.to_string(),
                record.aircraft_id,
                record.user_id,
                encode_time(record.start_time),
                encode_time(record.end_time),
                record.slot_type.to_string(),
                record.is_recurring,
                record.recurrence_pattern,
                record.recurrence_end_date.map(|date| date.to_string()),
                record.reason,
                encode_time(record.created_at),
            ],
        )?;

        info!(
            "Stored {} {} for {}",
            if record.is_recurring { "recurring" } else { "one-off" },
            record.slot_type,
            record
                .aircraft_id
                .as_deref()
                .or(record.user_id.as_deref())
                .unwrap_or("?")
        );
        Ok(())
    }

    /// Get an availability record by its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails or the row is corrupt.
    pub fn get_availability(&self, id: Uuid) -> Result<Option<Availability>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {AVAILABILITY_COLUMNS} FROM availabilities WHERE id = ?1"),
                [id.to_string()],
                AvailabilityRow::from_row,
            )
            .optional()?;
        row.map(Availability::try_from).transpose()
    }

    /// Delete an availability record.
    ///
    /// Returns `true` if a record was deleted, `false` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_availability(&self, id: Uuid) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM availabilities WHERE id = ?1", [id.to_string()])?;

        if affected > 0 {
            info!("Deleted availability {}", id);
        }
        Ok(affected > 0)
    }

    /// All records attached to an aircraft, by anchor start.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails or a row is corrupt.
    pub fn availabilities_for_aircraft(&self, aircraft_id: &str) -> Result<Vec<Availability>> {
        self.select_availabilities("aircraft_id", aircraft_id)
    }

    /// All records attached to a member, by anchor start.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails or a row is corrupt.
    pub fn availabilities_for_user(&self, user_id: &str) -> Result<Vec<Availability>> {
        self.select_availabilities("user_id", user_id)
    }

    /// Count stored availability records.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count_availabilities(&self) -> Result<i64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM availabilities", [], |row| row.get(0))?;
        Ok(count)
    }

    fn select_availabilities(&self, owner_column: &str, owner: &str) -> Result<Vec<Availability>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {AVAILABILITY_COLUMNS} FROM availabilities \
             WHERE {owner_column} = ?1 ORDER BY start_time ASC"
        ))?;

        let rows = stmt
            .query_map([owner], AvailabilityRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(Availability::try_from).collect()
    }
}
