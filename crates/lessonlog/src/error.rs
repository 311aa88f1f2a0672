//! Error types for lessonlog.
//!
//! This module defines the error types used throughout the lessonlog crate.
//! Nothing here is fatal to the application: every error means "the
//! operation did not complete and the record is unchanged".

use std::path::PathBuf;
use thiserror::Error;

use crate::generation::GenerationError;

/// The main error type for lessonlog operations.
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

    // === Record Errors ===
    /// No strategy row carries the given id.
    #[error("no strategy with id {id}")]
    StrategyNotFound {
        /// The id that was looked up.
        id: u32,
    },

    /// The highest strategy id leaves no room for another row.
    #[error("no strategy id left after {max}")]
    StrategyIdExhausted {
        /// The current highest id.
        max: u32,
    },

    /// Two strategy rows share an id.
    #[error("strategy id {id} is used more than once")]
    DuplicateStrategyId {
        /// The repeated id.
        id: u32,
    },

    /// A description was requested for a strategy without a name.
    #[error("strategy {id} has no name")]
    BlankStrategyName {
        /// The id of the unnamed strategy.
        id: u32,
    },

    /// A field path did not name an editable field.
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// A value is not one of the fixed choices for its field.
    #[error("'{value}' is not a valid {field}")]
    InvalidChoice {
        /// The field being edited.
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A subject name was empty after trimming.
    #[error("subject name is empty")]
    EmptySubject,

    /// The subject is already in the list.
    #[error("subject '{0}' already exists")]
    DuplicateSubject(String),

    /// The subject is not in the list.
    #[error("subject '{0}' not found")]
    SubjectNotFound(String),

    /// The logo file does not look like an image.
    #[error("unsupported image file: {path}")]
    UnsupportedImage {
        /// The rejected file.
        path: PathBuf,
    },

    /// A destructive action was not confirmed.
    #[error("cancelled")]
    Cancelled,

    // === Generation Errors ===
    /// The text-generation service failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Every suggested strategy name duplicated an existing one.
    #[error("suggested strategy name '{0}' already exists")]
    DuplicateSuggestion(String),

    /// A newer request for the same target superseded this one.
    #[error("a newer request for {target} superseded this one")]
    Superseded {
        /// Human-readable request target.
        target: String,
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

/// A specialized Result type for lessonlog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an invalid choice error.
    #[must_use]
    pub fn invalid_choice(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidChoice {
            field,
            value: value.into(),
        }
    }

    /// Check if this error means the user declined a confirmation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::StrategyNotFound { id: 7 };
        assert_eq!(err.to_string(), "no strategy with id 7");

        let err = Error::invalid_choice("grade", "الصف 13");
        assert_eq!(err.to_string(), "'الصف 13' is not a valid grade");
    }

    #[test]
    fn test_is_cancelled() {
        assert!(Error::Cancelled.is_cancelled());
        assert!(!Error::EmptySubject.is_cancelled());
    }

    #[test]
    fn test_generation_error_is_transparent() {
        let err: Error = GenerationError::MissingCredential.into();
        assert!(matches!(err, Error::Generation(GenerationError::MissingCredential)));
        assert_eq!(
            err.to_string(),
            GenerationError::MissingCredential.to_string()
        );
    }

    #[test]
    fn test_duplicate_suggestion_display() {
        let err = Error::DuplicateSuggestion("القصة".to_string());
        assert!(err.to_string().contains("القصة"));
    }

    #[test]
    fn test_strategy_id_errors_display() {
        let err = Error::StrategyIdExhausted { max: u32::MAX };
        assert_eq!(err.to_string(), format!("no strategy id left after {}", u32::MAX));

        let err = Error::DuplicateStrategyId { id: 1 };
        assert_eq!(err.to_string(), "strategy id 1 is used more than once");
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
            "/nonexistent/path/db.sqlite",
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
    fn test_unsupported_image_display() {
        let err = Error::UnsupportedImage {
            path: PathBuf::from("/tmp/notes.txt"),
        };
        assert!(err.to_string().contains("/tmp/notes.txt"));
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
