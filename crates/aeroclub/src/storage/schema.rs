//! `SQLite` schema definitions for aeroclub.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings
//! (`2030-06-03T08:00:00.000000Z`) so that text comparison orders them
//! chronologically.

/// SQL statement to create the reservations table.
pub const CREATE_RESERVATIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS reservations (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    pilot_id TEXT NOT NULL,
    instructor_id TEXT,
    aircraft_id TEXT NOT NULL,
    flight_type_id TEXT,
    start_time TEXT NOT NULL,
    end_time TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'ACTIVE',
    comments TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    CHECK (start_time < end_time)
)
";

/// Index for aircraft schedule lookups.
pub const CREATE_RESERVATION_AIRCRAFT_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_reservations_aircraft ON reservations(aircraft_id, start_time)
";

/// Index for window scans.
pub const CREATE_RESERVATION_WINDOW_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_reservations_window ON reservations(start_time, end_time)
";

/// Index for pilot schedule lookups.
pub const CREATE_RESERVATION_PILOT_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_reservations_pilot ON reservations(pilot_id)
";

/// SQL statement to create the availabilities table.
///
/// A record belongs to exactly one of an aircraft or a member.
pub const CREATE_AVAILABILITIES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS availabilities (
    id TEXT PRIMARY KEY,
    aircraft_id TEXT,
    user_id TEXT,
    start_time TEXT NOT NULL,
    end_time TEXT NOT NULL,
    slot_type TEXT NOT NULL DEFAULT 'unavailability',
    is_recurring INTEGER NOT NULL DEFAULT 0,
    recurrence_pattern TEXT,
    recurrence_end_date TEXT,
    reason TEXT,
    created_at TEXT NOT NULL,
    CHECK ((aircraft_id IS NULL) <> (user_id IS NULL)),
    CHECK (start_time < end_time)
)
";

/// Index for aircraft blackout lookups.
pub const CREATE_AVAILABILITY_AIRCRAFT_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_availabilities_aircraft ON availabilities(aircraft_id)
";

/// Index for member availability lookups.
pub const CREATE_AVAILABILITY_USER_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_availabilities_user ON availabilities(user_id)
";

/// SQL statement to create the flights table.
///
/// Flights disappear with the reservation they were flown under.
pub const CREATE_FLIGHTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS flights (
    id TEXT PRIMARY KEY,
    reservation_id TEXT REFERENCES reservations(id) ON DELETE CASCADE,
    pilot_id TEXT NOT NULL,
    aircraft_id TEXT NOT NULL,
    departure_time TEXT NOT NULL,
    duration_minutes INTEGER NOT NULL CHECK (duration_minutes >= 0),
    created_at TEXT NOT NULL
)
";

/// Index for reservation to flight lookups.
pub const CREATE_FLIGHT_RESERVATION_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_flights_reservation ON flights(reservation_id)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_RESERVATIONS_TABLE,
    CREATE_RESERVATION_AIRCRAFT_INDEX,
    CREATE_RESERVATION_WINDOW_INDEX,
    CREATE_RESERVATION_PILOT_INDEX,
    CREATE_AVAILABILITIES_TABLE,
    CREATE_AVAILABILITY_AIRCRAFT_INDEX,
    CREATE_AVAILABILITY_USER_INDEX,
    CREATE_FLIGHTS_TABLE,
    CREATE_FLIGHT_RESERVATION_INDEX,
    CREATE_METADATA_TABLE,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.trim().is_empty());
        }
    }

    #[test]
    fn test_reservations_table_guards_time_order() {
        assert!(CREATE_RESERVATIONS_TABLE.contains("CHECK (start_time < end_time)"));
        assert!(CREATE_RESERVATIONS_TABLE.contains("instructor_id TEXT,"));
    }

    #[test]
    fn test_availability_owner_is_exclusive() {
        assert!(CREATE_AVAILABILITIES_TABLE.contains("(aircraft_id IS NULL) <> (user_id IS NULL)"));
    }

    #[test]
    fn test_flights_cascade_from_reservations() {
        assert!(CREATE_FLIGHTS_TABLE.contains("ON DELETE CASCADE"));
    }
}
