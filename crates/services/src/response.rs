use serde::Serialize;

use study_core::model::FieldErrors;

use crate::error::ActionError;

/// Wire shape for action results: `{ success: true, data }` or
/// `{ success: false, error, details? }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<FieldErrors>,
}

impl<T> ActionResponse<T> {
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            details: None,
        }
    }

    #[must_use]
    pub fn failure(err: &ActionError) -> Self {
        let error = match err {
            ActionError::Validation(_) => "validation failed".to_owned(),
            other => other.to_string(),
        };
        Self {
            success: false,
            data: None,
            error: Some(error),
            details: err.field_errors().cloned(),
        }
    }
}

impl<T> From<Result<T, ActionError>> for ActionResponse<T> {
    fn from(result: Result<T, ActionError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::failure(&err),
        }
    }
}
