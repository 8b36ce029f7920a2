//! Schema versioning.
//!
//! The version lives under `schema_version` in the `metadata` table. A fresh
//! database receives the full schema and is stamped with [`CURRENT_VERSION`];
//! an older one replays the steps of [`MIGRATIONS`] above its version, each in
//! its own transaction.

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::schema::{CREATE_FLIGHTS_TABLE, CREATE_FLIGHT_RESERVATION_INDEX, SCHEMA_STATEMENTS};

/// One forward step of the schema.
#[derive(Debug)]
pub struct Migration {
    /// Version the database is at after this step.
    pub version: i32,
    /// Short label for logs.
    pub description: &'static str,
    /// Statements applied in order.
    pub statements: &'static [&'static str],
}

/// Every schema step, oldest first.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "reservations and availability windows",
        statements: &[],
    },
    Migration {
        version: 2,
        description: "flight log",
        statements: &[CREATE_FLIGHTS_TABLE, CREATE_FLIGHT_RESERVATION_INDEX],
    },
];

/// Schema version written by this build.
pub const CURRENT_VERSION: i32 = 2;

const VERSION_KEY: &str = "schema_version";

/// Bring the schema of `conn` up to [`CURRENT_VERSION`].
///
/// # Errors
///
/// Returns an error if a statement fails, the stored version is unreadable,
/// or the database was written by a newer build.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }

    let stored = schema_version(conn)?;
    match stored {
        v if v > CURRENT_VERSION => Err(Error::DatabaseMigration {
            message: format!(
                "database schema version {v} is newer than supported version {CURRENT_VERSION}"
            ),
        }),
        v if v == CURRENT_VERSION => {
            debug!("Schema is current (version {})", v);
            Ok(())
        }
        v => migrate_from(conn, v),
    }
}

fn schema_version(conn: &Connection) -> Result<i32> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = ?1",
            [VERSION_KEY],
            |row| row.get(0),
        )
        .optional()?;

    raw.map_or(Ok(0), |value| {
        value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        })
    })
}

fn stamp_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT INTO metadata (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}

fn migrate_from(conn: &Connection, stored: i32) -> Result<()> {
    for step in MIGRATIONS.iter().filter(|m| m.version > stored) {
        let tx = conn.unchecked_transaction()?;
        for statement in step.statements {
            tx.execute(statement, [])?;
        }
        stamp_version(&tx, step.version)?;
        tx.commit()?;
        info!(
            "Applied schema migration {} ({})",
            step.version, step.description
        );
    }

    let reached = schema_version(conn)?;
    if reached == CURRENT_VERSION {
        Ok(())
    } else {
        Err(Error::DatabaseMigration {
            message: format!("migrations stopped at version {reached}, expected {CURRENT_VERSION}"),
        })
    }
}
