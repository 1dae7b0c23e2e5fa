//! HTTP handlers for the `/api/v1` surface.
//!
//! Read endpoints return a `ViewEnvelope` so the console can tell fresh data
//! from a stale buffer kept after a failed refresh. Write endpoints require a
//! `CurrentUser` and answer 400 with field messages when the payload does not
//! validate.

pub mod dashboard;
pub mod permits;
pub mod progress;
pub mod verification;
pub mod vessels;

use axum::{http::StatusCode, Json};
use validator::{Validate, ValidationErrors};

use crate::ApiResponse;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Flattens validator output into `field: message` strings.
pub(crate) fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("invalid value ({})", error.code));
                format!("{}: {}", field, message)
            })
        })
        .collect();
    messages.sort();
    messages
}

/// Runs `validate()` on a request body, producing the 400 response on failure.
pub(crate) fn validate_request<T, R>(
    request: &T,
) -> Result<(), (StatusCode, Json<ApiResponse<R>>)>
where
    T: Validate,
{
    request.validate().map_err(|errors| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::validation_errors(validation_messages(&errors))),
        )
    })
}
