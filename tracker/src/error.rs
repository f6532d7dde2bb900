//! Error handling for the Coffee Roast Tracker
//!
//! Every failure is terminal for the action that caused it. Nothing is
//! retried; the user re-runs the command once the cause is fixed.

use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("{0} not found")]
    NotFound(String),

    // Import errors
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Malformed import file: {0}")]
    MalformedImport(String),

    // Persistence errors
    #[error("Storage is full. Export your data and clear some history.")]
    StorageFull,

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Validation failure on a named field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Stable code for scripts consuming `--json` output
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } | AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::DuplicateEntry(_) => "DUPLICATE_ENTRY",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::MissingColumns(_) => "MISSING_COLUMNS",
            AppError::MalformedImport(_) => "MALFORMED_IMPORT",
            AppError::StorageFull => "STORAGE_FULL",
            AppError::StorageError(_) | AppError::DatabaseError(_) => "STORAGE_ERROR",
            AppError::Io(_) => "FILE_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Process exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Validation { .. }
            | AppError::ValidationError(_)
            | AppError::DuplicateEntry(_)
            | AppError::MissingColumns(_)
            | AppError::MalformedImport(_) => 2,
            AppError::NotFound(_) => 3,
            AppError::StorageFull | AppError::StorageError(_) | AppError::DatabaseError(_) => 4,
            AppError::Io(_) => 5,
            AppError::Configuration(_) => 6,
            AppError::Internal(_) => 1,
        }
    }

    /// Whether the user can fix this by changing their input
    pub fn is_user_error(&self) -> bool {
        self.exit_code() == 2 || self.exit_code() == 3
    }
}

// SQLITE_FULL, "database or disk is full"
const SQLITE_FULL: &str = "13";

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(SQLITE_FULL) {
                tracing::error!("Storage quota exhausted: {}", db_err);
                return AppError::StorageFull;
            }
        }
        tracing::error!("Database error: {:?}", err);
        AppError::DatabaseError(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::StorageError(format!("JSON error: {}", err))
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(io) => AppError::Io(io),
            _ => AppError::MalformedImport(message),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields: Vec<_> = field_errors.iter().collect();
        fields.sort_by_key(|(field, _)| **field);

        match fields.first() {
            Some((field, errs)) => {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                AppError::validation(field.to_string(), message)
            }
            None => AppError::ValidationError(errors.to_string()),
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// Result type alias for services and commands
pub type AppResult<T> = Result<T, AppError>;
