//! Error types for securecheck.
//!
//! This module defines all error types used throughout the securecheck crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for securecheck operations.
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

    // === Data Errors ===
    /// A dataset row could not be decoded into a stop record.
    #[error("cannot decode column '{column}' in row {row}: {message}")]
    RecordDecode {
        /// Zero-based row index in the result set.
        row: usize,
        /// Column that failed to decode.
        column: String,
        /// Description of what went wrong.
        message: String,
    },

    /// Failed to read or parse a CSV import file.
    #[error("CSV import failed: {0}")]
    Csv(#[from] csv::Error),

    /// A catalog query name was not found.
    #[error("unknown query: {name}")]
    UnknownQuery {
        /// The name that was looked up.
        name: String,
    },

    /// A form field held a value that cannot be interpreted.
    #[error("invalid value for {field}: '{value}' ({expected})")]
    InvalidField {
        /// Name of the form field.
        field: &'static str,
        /// The raw value that was rejected.
        value: String,
        /// What the field accepts.
        expected: &'static str,
    },

    // === Session Errors ===
    /// The interactive line editor failed.
    #[error("line editor error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

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

/// A specialized Result type for securecheck operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a record decode error.
    #[must_use]
    pub fn record_decode(
        row: usize,
        column: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::RecordDecode {
            row,
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create an invalid form field error.
    #[must_use]
    pub fn invalid_field(
        field: &'static str,
        value: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        Self::InvalidField {
            field,
            value: value.into(),
            expected,
        }
    }

    /// Check if this error came from reading the stored data.
    #[must_use]
    pub fn is_data_access(&self) -> bool {
        matches!(
            self,
            Self::DatabaseOpen { .. }
                | Self::DatabaseQuery(_)
                | Self::DatabaseMigration { .. }
                | Self::RecordDecode { .. }
        )
    }

    /// Check if this error is caused by user input rather than the system.
    #[must_use]
    pub fn is_user_input(&self) -> bool {
        matches!(self, Self::InvalidField { .. } | Self::UnknownQuery { .. })
    }
}
