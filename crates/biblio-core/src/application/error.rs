//! Application layer errors.
//!
//! These errors represent failures in orchestration, not lending rules.
//! Rule violations are `DomainError` from `crate::domain`.

use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// A record looked up by id does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Store access failed (lock poisoned).
    #[error("Library store is unavailable")]
    StoreLockError,

    /// The persistent snapshot could not be read or written.
    #[error("Storage error: {reason}")]
    Storage { reason: String },

    /// Delimited text could not be decoded, parsed or written.
    #[error("CSV error: {reason}")]
    Codec { reason: String },

    /// An import batch failed as a whole.
    #[error("Import failed: {reason}")]
    ImportFailed { reason: String },

    /// An export selection matched nothing.
    #[error("No {kind} records to export")]
    NothingToExport { kind: String },

    /// A requested export column does not exist.
    #[error("Unknown field '{field}' for {kind}")]
    UnknownField { kind: String, field: String },

    /// A report selection matched nothing.
    #[error("No loans match the selected criteria")]
    EmptyReport,

    /// Validation failed (application-level, not domain).
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

impl ApplicationError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::NotFound { entity, .. } => vec![
                format!("Check the {} id and try again", entity.to_lowercase()),
                "List records with the matching `list` subcommand".into(),
            ],
            Self::StoreLockError => vec![
                "The library store is locked".into(),
                "Try again in a moment".into(),
            ],
            Self::Storage { .. } => vec![
                "Check that the data file is readable and writable".into(),
                "The data file location is set by storage.data_file".into(),
            ],
            Self::Codec { .. } => vec![
                "Check the delimiter and header options".into(),
                "Preview the file first: biblio import preview <FILE>".into(),
            ],
            Self::UnknownField { kind, .. } => vec![format!(
                "List the available fields: biblio export {} --list-fields",
                kind
            )],
            Self::NothingToExport { .. } | Self::EmptyReport => vec![
                "Widen the date range or remove filters".into(),
            ],
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } | Self::NothingToExport { .. } | Self::EmptyReport => {
                ErrorCategory::NotFound
            }
            Self::StoreLockError | Self::Storage { .. } => ErrorCategory::Internal,
            Self::Codec { .. }
            | Self::ImportFailed { .. }
            | Self::UnknownField { .. }
            | Self::ValidationFailed(_) => ErrorCategory::Validation,
        }
    }
}
