use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::database::manager::DatabaseError;

/// Message returned for failures that carry no usable description.
pub const GENERIC_FAILURE: &str = "Something went wrong, please try again later.";

/// Why an action failed. Never escapes an action; it is folded into
/// [`ActionResult`] before returning to the caller.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{}", flatten_validation(.0))]
    Validation(ValidationErrors),

    #[error("{0}")]
    Known(String),

    #[error("{}", GENERIC_FAILURE)]
    Unknown,
}

impl ActionError {
    pub fn known(message: impl Into<String>) -> Self {
        ActionError::Known(message.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ActionError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ActionError::Known(_) => StatusCode::BAD_REQUEST,
            ActionError::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for ActionError {
    fn from(errors: ValidationErrors) -> Self {
        ActionError::Validation(errors)
    }
}

impl From<DatabaseError> for ActionError {
    fn from(err: DatabaseError) -> Self {
        ActionError::Known(err.to_string())
    }
}

impl From<anyhow::Error> for ActionError {
    fn from(err: anyhow::Error) -> Self {
        let err = match err.downcast::<ValidationErrors>() {
            Ok(errors) => return ActionError::Validation(errors),
            Err(err) => err,
        };
        match err.downcast::<ActionError>() {
            Ok(action_error) => action_error,
            Err(err) => {
                let message = err.to_string();
                if message.trim().is_empty() {
                    ActionError::Unknown
                } else {
                    ActionError::Known(message)
                }
            }
        }
    }
}

/// One line per validation issue, ordered by field name.
pub fn flatten_validation(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| field.to_string());

    fields
        .into_iter()
        .flat_map(|(field, issues)| {
            let field = field.to_string();
            issues.iter().map(move |issue| match &issue.message {
                Some(message) => message.to_string(),
                None => format!("{} is invalid ({})", field, issue.code),
            })
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `{ data, error }` envelope returned by every action.
///
/// Callers tell success from failure solely by `error` being `null`.
#[derive(Debug, Serialize)]
pub struct ActionResult<T: Serialize> {
    pub data: Option<T>,
    pub error: Option<String>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ActionResult<T> {
    pub fn success(data: Option<T>) -> Self {
        Self {
            data,
            error: None,
            status: StatusCode::OK,
        }
    }

    pub fn failure(error: &ActionError) -> Self {
        Self {
            data: None,
            error: Some(error.to_string()),
            status: error.status_code(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

impl<T: Serialize> From<Result<Option<T>, ActionError>> for ActionResult<T> {
    fn from(result: Result<Option<T>, ActionError>) -> Self {
        match result {
            Ok(data) => ActionResult::success(data),
            Err(err) => ActionResult::failure(&err),
        }
    }
}

impl<T: Serialize> IntoResponse for ActionResult<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}
