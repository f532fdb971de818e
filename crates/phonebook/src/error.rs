//! Error types for phonebook.
//!
//! This module defines all error types used throughout the phonebook crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for phonebook operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Record Errors ===
    /// A required contact field was empty.
    #[error("{field} is required")]
    MissingField {
        /// Name of the field that was left empty.
        field: &'static str,
    },

    /// A phone number did not match `(###) ###-####`.
    #[error("invalid phone number '{0}': expected (###) ###-####")]
    InvalidPhone(String),

    /// An email address did not match the accepted pattern.
    #[error("invalid email address '{0}'")]
    InvalidEmail(String),

    /// A date bound could not be parsed.
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    // === Audit Log Errors ===
    /// The audit log could not be written or read.
    #[error("audit log unavailable at {path}: {source}")]
    AuditLog {
        /// Path to the audit log file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Import Errors ===
    /// The import source could not be parsed as CSV.
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The import source lacks a required column.
    #[error("CSV is missing required column '{0}'")]
    MissingColumn(&'static str),

    /// A row of the import source failed validation.
    #[error("row {row}: {source}")]
    InvalidRow {
        /// One-based data row number (the header is not counted).
        row: usize,
        /// Why the row was rejected.
        #[source]
        source: Box<Error>,
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

    // === I/O Errors ===
    /// File system or terminal operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for phonebook operations.
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

    /// Wrap an I/O failure on the audit log file.
    #[must_use]
    pub fn audit_log(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::AuditLog {
            path: path.into(),
            source,
        }
    }

    /// Attach a row number to an import validation failure.
    #[must_use]
    pub fn invalid_row(row: usize, source: Error) -> Self {
        Self::InvalidRow {
            row,
            source: Box::new(source),
        }
    }

    /// Check if this error is a user input validation failure.
    ///
    /// The shell re-prompts on these and reports anything else.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. }
                | Self::InvalidPhone(_)
                | Self::InvalidEmail(_)
                | Self::InvalidDate(_)
        )
    }

    /// Check if this error came from the audit log sink.
    #[must_use]
    pub fn is_audit_error(&self) -> bool {
        matches!(self, Self::AuditLog { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MissingField {
            field: "first_name",
        };
        assert_eq!(err.to_string(), "first_name is required");

        let err = Error::internal("test error");
        assert_eq!(err.to_string(), "internal error: test error");
    }

    #[test]
    fn test_invalid_phone_display() {
        let err = Error::InvalidPhone("555-1234".to_string());
        let msg = err.to_string();
        assert!(msg.contains("555-1234"));
        assert!(msg.contains("(###) ###-####"));
    }

    #[test]
    fn test_is_validation_error() {
        assert!(Error::InvalidEmail("nope".to_string()).is_validation_error());
        assert!(Error::InvalidDate("2020-13-01".to_string()).is_validation_error());
        assert!(!Error::internal("bug").is_validation_error());
    }

    #[test]
    fn test_audit_log_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::audit_log("/root/forbidden/phonebook.log", io_err);
        assert!(err.is_audit_error());
        assert!(!err.is_validation_error());
        let msg = err.to_string();
        assert!(msg.contains("/root/forbidden/phonebook.log"));
        assert!(msg.contains("access denied"));
    }

    #[test]
    fn test_invalid_row_display() {
        let err = Error::invalid_row(3, Error::InvalidPhone("12".to_string()));
        let msg = err.to_string();
        assert!(msg.starts_with("row 3:"));
        assert!(msg.contains("12"));
    }

    #[test]
    fn test_missing_column_display() {
        let err = Error::MissingColumn("Phone");
        assert_eq!(err.to_string(), "CSV is missing required column 'Phone'");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "empty log path".to_string(),
        };
        assert!(err.to_string().contains("empty log path"));
    }
}
