//! Error types for aeroclub.
//!
//! Operational failures (database, configuration, input parsing) are reported
//! through [`Error`]. Business-rule rejections produced by the validation
//! pipeline are a separate, closed type ([`ValidationError`]) that only enters
//! this enum when a write is refused.

use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationError;

/// The main error type for aeroclub operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A stored row could not be mapped back to a domain value.
    #[error("corrupt row in {table}: {message}")]
    CorruptRow {
        /// Table the row was read from.
        table: &'static str,
        /// Description of the offending column.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Booking Errors ===
    /// The reservation was refused by the validation pipeline.
    #[error("reservation rejected: {0}")]
    Rejected(#[from] ValidationError),

    /// A referenced record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind of record (reservation, availability).
        kind: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// Caller supplied input that cannot be turned into a record.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    // === I/O Errors ===
    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for aeroclub operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a new invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a not-found error for the given record kind.
    #[must_use]
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Create a corrupt row error.
    #[must_use]
    pub fn corrupt_row(table: &'static str, message: impl Into<String>) -> Self {
        Self::CorruptRow {
            table,
            message: message.into(),
        }
    }

    /// The validation rejection carried by this error, if any.
    #[must_use]
    pub fn rejection(&self) -> Option<&ValidationError> {
        match self {
            Self::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }

    /// Check if this error is a not-found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationCode;

    #[test]
    fn test_error_display() {
        let err = Error::internal("test error");
        assert_eq!(err.to_string(), "internal error: test error");

        let err = Error::invalid_input("bad time");
        assert_eq!(err.to_string(), "invalid input: bad time");
    }

    #[test]
    fn test_not_found_display() {
        let err = Error::not_found("reservation", "abc");
        assert_eq!(err.to_string(), "reservation not found: abc");
        assert!(err.is_not_found());
        assert!(!Error::internal("x").is_not_found());
    }

    #[test]
    fn test_rejected_carries_validation_error() {
        let err: Error = ValidationError::new(ValidationCode::PilotOverlap).into();
        let rejection = err.rejection().expect("rejection");
        assert_eq!(rejection.code, ValidationCode::PilotOverlap);
        assert!(err.to_string().starts_with("reservation rejected:"));
    }

    #[test]
    fn test_rejection_absent_for_other_errors() {
        assert!(Error::internal("x").rejection().is_none());
    }

    #[test]
    fn test_corrupt_row_display() {
        let err = Error::corrupt_row("reservations", "bad start_time");
        let msg = err.to_string();
        assert!(msg.contains("reservations"));
        assert!(msg.contains("bad start_time"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_database_migration_error_display() {
        let err = Error::DatabaseMigration {
            message: "version mismatch".to_string(),
        };
        assert!(err.to_string().contains("version mismatch"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "bad timezone".to_string(),
        };
        assert!(err.to_string().contains("bad timezone"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
