//! Error types for fleetcare.
//!
//! This module defines all error types used throughout the fleetcare crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for fleetcare operations.
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

    // === Domain Errors ===
    /// A priority label outside high/medium/low.
    #[error("invalid priority '{0}': expected high, medium or low")]
    InvalidPriority(String),

    /// A date that is not a `YYYY-MM-DD` calendar date.
    #[error("invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate {
        /// The rejected input.
        value: String,
    },

    /// A record failed boundary validation.
    #[error("invalid {field}: {message}")]
    Validation {
        /// The offending field.
        field: &'static str,
        /// Description of the problem.
        message: String,
    },

    /// The referenced vehicle does not exist.
    #[error("vehicle {0} not found")]
    VehicleNotFound(i64),

    /// An odometer reading lower than the one already recorded.
    #[error(
        "odometer reading {reading} km is below the recorded {recorded} km for vehicle {vehicle_id}"
    )]
    OdometerRollback {
        /// The vehicle being updated.
        vehicle_id: i64,
        /// The currently stored reading.
        recorded: u32,
        /// The rejected reading.
        reading: u32,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for fleetcare operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new validation error.
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Create a new invalid date error.
    #[must_use]
    pub fn invalid_date(value: impl Into<String>) -> Self {
        Self::InvalidDate {
            value: value.into(),
        }
    }

    /// Check if this error reports a missing record.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::VehicleNotFound(_))
    }

    /// Check if this error was caused by rejected user input.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidPriority(_)
                | Self::InvalidDate { .. }
                | Self::Validation { .. }
                | Self::OdometerRollback { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::VehicleNotFound(7);
        assert_eq!(err.to_string(), "vehicle 7 not found");

        let err = Error::validation("rego", "must not be empty");
        assert_eq!(err.to_string(), "invalid rego: must not be empty");
    }

    #[test]
    fn test_invalid_priority_display() {
        let err = Error::InvalidPriority("urgent".to_string());
        let msg = err.to_string();
        assert!(msg.contains("urgent"));
        assert!(msg.contains("high, medium or low"));
    }

    #[test]
    fn test_invalid_date_display() {
        let err = Error::invalid_date("31/02/2024");
        assert!(err.to_string().contains("31/02/2024"));
    }

    #[test]
    fn test_odometer_rollback_display() {
        let err = Error::OdometerRollback {
            vehicle_id: 3,
            recorded: 62_500,
            reading: 61_000,
        };
        let msg = err.to_string();
        assert!(msg.contains("61000"));
        assert!(msg.contains("62500"));
        assert!(msg.contains("vehicle 3"));
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::VehicleNotFound(1).is_not_found());
        assert!(!Error::validation("make", "empty").is_not_found());
    }

    #[test]
    fn test_is_validation_error() {
        assert!(Error::InvalidPriority("x".to_string()).is_validation_error());
        assert!(Error::invalid_date("x").is_validation_error());
        assert!(Error::validation("vin", "bad").is_validation_error());
        assert!(!Error::VehicleNotFound(1).is_validation_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/fleet.db",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
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
            message: "service_interval_km must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("service_interval_km"));
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
