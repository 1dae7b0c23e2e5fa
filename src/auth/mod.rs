//! Caller identity.
//!
//! Authentication happens upstream; the gateway forwards the resolved user
//! in `x-user-id` and (optionally) `x-user-email`. Write endpoints require
//! it so every progress report, verification and permit upload is
//! attributed.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::debug;

use crate::errors::ServiceError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";

const MAX_IDENTITY_LEN: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub email: Option<String>,
}

impl CurrentUser {
    /// Name written to audit columns (`reported_by`, `verified_by`, ...)
    pub fn audit_name(&self) -> String {
        self.email.clone().unwrap_or_else(|| self.id.clone())
    }
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty() && value.len() <= MAX_IDENTITY_LEN)
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(id) = header_value(parts, USER_ID_HEADER) else {
            debug!(path = %parts.uri.path(), "request without caller identity");
            return Err(ServiceError::Unauthorized(
                "missing caller identity".to_string(),
            ));
        };

        Ok(CurrentUser {
            id: id.to_string(),
            email: header_value(parts, USER_EMAIL_HEADER).map(str::to_string),
        })
    }
}
