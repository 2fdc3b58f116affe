//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use study_core::model::{BankError, Field, FieldErrors};
use study_core::quiz::{QuizError, QuizSettingsError};

/// Generic message shown for persistence failures.
pub const SYSTEM_ERROR_MESSAGE: &str = "something went wrong, please try again";

/// Errors returned by bank and question actions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ActionError {
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("{SYSTEM_ERROR_MESSAGE}")]
    System,
}

impl ActionError {
    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    pub(crate) fn invalid(field: Field, message: impl Into<String>) -> Self {
        Self::Validation(FieldErrors::single(field, message))
    }

    /// Translate a storage failure, logging internal detail that callers never see.
    pub(crate) fn from_storage(entity: &'static str, err: StorageError) -> Self {
        match err {
            StorageError::NotFound => {
                tracing::warn!(entity, "record not found");
                Self::NotFound(entity)
            }
            StorageError::Conflict => {
                tracing::warn!(entity, "conflicting write");
                Self::Conflict(format!("{entity} was modified concurrently"))
            }
            other => {
                tracing::error!(entity, error = %other, "storage failure");
                Self::System
            }
        }
    }
}

impl From<FieldErrors> for ActionError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<BankError> for ActionError {
    fn from(err: BankError) -> Self {
        Self::Validation(err.field_errors())
    }
}

/// Errors emitted when a quiz cannot be started.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizStartError {
    #[error("bank not found")]
    BankNotFound,

    #[error("this bank has no questions yet")]
    EmptyBank,

    #[error(transparent)]
    Quiz(#[from] QuizError),

    #[error(transparent)]
    Action(#[from] ActionError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),

    #[error(transparent)]
    Settings(#[from] QuizSettingsError),
}
