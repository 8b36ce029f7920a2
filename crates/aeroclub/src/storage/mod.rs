//! Storage layer for aeroclub.
//!
//! This module provides `SQLite`-based persistent storage for reservations,
//! availability windows and logged flights. Reads are mapped through the typed
//! rows in `rows`; writes that must not race (validate, then insert) run inside
//! [`Storage::immediate`].

mod availabilities;
mod flights;
pub mod migrations;
mod reservations;
mod rows;
pub mod schema;

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{Connection, Transaction, TransactionBehavior};
use tracing::{debug, info};

use crate::error::{Error, Result};

pub use reservations::ReservationFilter;

/// Pseudo-path reported for in-memory databases.
const MEMORY_PATH: &str = ":memory:";

/// How long a writer waits on another process's lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// The club database: reservations, availability windows and the flight log.
///
/// All queries go through one connection. Booking writes that depend on a
/// prior check are wrapped in [`Storage::immediate`].
#[derive(Debug)]
pub struct Storage {
    path: PathBuf,
    conn: Connection,
}

impl Storage {
    /// Open the database at `path`, creating it and missing parent
    /// directories, and migrate it to the current schema.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be created, the file cannot be
    /// opened as `SQLite`, or migration fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
                debug!("Creating data directory {}", parent.display());
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            _ => {}
        }

        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;
        // WAL lets `list` and `check` read while a booking holds the write lock
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        let storage = Self::prepare(path, conn)?;
        info!("Opened club database {}", storage.path.display());
        Ok(storage)
    }

    /// A private, empty database that vanishes on drop.
    ///
    /// # Errors
    ///
    /// Returns an error if `SQLite` cannot allocate the database.
    pub fn open_in_memory() -> Result<Self> {
        let path = PathBuf::from(MEMORY_PATH);
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;
        Self::prepare(path, conn)
    }

    fn prepare(path: PathBuf, conn: Connection) -> Result<Self> {
        // Cascade from reservations to flights depends on this
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        migrations::initialize_schema(&conn)?;
        Ok(Self { path, conn })
    }

    /// Where the database lives, or `:memory:`.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_in_memory(&self) -> bool {
        self.path.as_os_str() == MEMORY_PATH
    }

    /// Run `body` inside an `IMMEDIATE` transaction.
    ///
    /// The write lock is taken before `body` reads anything, so a check made
    /// inside `body` still holds when its write commits. An error or a panic
    /// in `body` rolls the transaction back.
    ///
    /// # Errors
    ///
    /// Returns the error from `body`, or a database error if the transaction
    /// cannot be started or committed.
    pub fn immediate<T>(&mut self, body: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        match body(&*self) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                debug!("Rolling back transaction: {}", err);
                Err(err)
            }
        }
    }

    /// Row counts per table and the size of the database file.
    ///
    /// # Errors
    ///
    /// Returns an error if a count query fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let db_size_bytes = if self.is_in_memory() {
            0
        } else {
            std::fs::metadata(&self.path).map_or(0, |meta| meta.len())
        };

        Ok(StorageStats {
            total_reservations: self.count_reservations(false)?,
            active_reservations: self.count_reservations(true)?,
            availabilities: self.count_availabilities()?,
            flights: self.count_flights()?,
            db_size_bytes,
        })
    }
}

/// Snapshot reported by `aeroclub status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageStats {
    /// Reservations stored, any status.
    pub total_reservations: i64,
    /// Reservations still holding their slot.
    pub active_reservations: i64,
    /// Availability and blackout records.
    pub availabilities: i64,
    /// Logged flights.
    pub flights: i64,
    /// Main database file size; WAL and shared-memory files are not counted.
    pub db_size_bytes: u64,
}
