//! Server-side mutations over resource tables.
//!
//! Every action validates its input, performs storage side effects,
//! invalidates the affected cache tag and folds any failure into an
//! [`ActionResult`]. Actions never return `Err` and never propagate a panic.

pub mod delete;
pub mod mutate;
pub mod result;

pub use delete::{delete_multiple, delete_single, PreDeleteHook};
pub use mutate::{create_single, update_single};
pub use result::{ActionError, ActionResult, GENERIC_FAILURE};

use serde::Serialize;
use std::any::Any;
use std::borrow::Cow;
use validator::{ValidationError, ValidationErrors};

use crate::types::Operation;

pub(crate) fn require_non_empty(field: &'static str, value: &str) -> Result<(), ActionError> {
    if !value.trim().is_empty() {
        return Ok(());
    }
    let mut error = ValidationError::new("required");
    error.message = Some(Cow::Owned(format!("{} must not be empty", field)));

    let mut errors = ValidationErrors::new();
    errors.add(field, error);
    Err(ActionError::Validation(errors))
}

/// Turn the outcome of an unwind-guarded action into its envelope, logging
/// failures once.
pub(crate) fn settle<T: Serialize>(
    operation: Operation,
    resource: &'static str,
    outcome: Result<Result<Option<T>, ActionError>, Box<dyn Any + Send>>,
) -> ActionResult<T> {
    let result = match outcome {
        Ok(result) => result,
        Err(panic) => {
            let detail = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_default();
            tracing::error!(
                operation = operation.as_str(),
                resource,
                panic = %detail,
                "Action panicked"
            );
            Err(ActionError::Unknown)
        }
    };

    match &result {
        Ok(_) => tracing::debug!(operation = operation.as_str(), resource, "Action succeeded"),
        Err(ActionError::Validation(_)) => {
            tracing::debug!(operation = operation.as_str(), resource, "Action rejected input")
        }
        Err(err) => tracing::warn!(
            operation = operation.as_str(),
            resource,
            error = %err,
            "Action failed"
        ),
    }

    ActionResult::from(result)
}
