//! Admin module types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::ErrorResponse;
use crate::db::Event;
use crate::permissions::AccessError;
use crate::store::StoreError;

/// Admin API error type.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Access(#[from] AccessError),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Validation error.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let (status, code) = match self {
            Self::Access(e) => return e.into_response(),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
        };

        let body = Json(ErrorResponse {
            error: code.to_string(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

/// Result type for admin operations.
pub type AdminResult<T> = Result<T, AdminError>;

// Request types

/// Role change. The value is parsed strictly; unknown roles are rejected.
#[derive(Debug, Deserialize)]
pub struct SetRoleRequest {
    pub role: String,
}

/// Tier change. Parsed strictly like [`SetRoleRequest`].
#[derive(Debug, Deserialize)]
pub struct SetTierRequest {
    pub tier: String,
}

// Response types

/// Pending event with its submitter's display name.
#[derive(Debug, Serialize)]
pub struct PendingEvent {
    #[serde(flatten)]
    pub event: Event,
    pub creator_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AdminStatusResponse {
    pub is_admin: bool,
}
