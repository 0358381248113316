//! Venue request types and errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use thiserror::Error;
use validator::Validate;

use crate::auth::ErrorResponse;
use crate::db::VenueDraft;
use crate::permissions::AccessError;
use crate::store::StoreError;

/// Create or edit request body.
#[derive(Debug, Deserialize, Validate)]
pub struct VenueRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(url)]
    pub image_url: Option<String>,
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f64>,
    #[validate(range(min = 0))]
    pub capacity: Option<i32>,
    #[serde(default = "default_open")]
    pub is_open: bool,
}

const fn default_open() -> bool {
    true
}

impl VenueRequest {
    /// Validate and normalize into store fields.
    ///
    /// Blank `description` and `image_url` are dropped before validation.
    pub fn into_draft(mut self) -> Result<VenueDraft, VenueError> {
        self.description = non_blank(self.description);
        self.image_url = non_blank(self.image_url);
        self.validate()
            .map_err(|e| VenueError::Validation(e.to_string()))?;

        let name = required("name", &self.name)?;
        let category = required("category", &self.category)?;
        let location = required("location", &self.location)?;

        Ok(VenueDraft {
            name,
            category,
            location,
            description: self.description,
            image_url: self.image_url,
            rating: self.rating,
            capacity: self.capacity,
            is_open: self.is_open,
        })
    }
}

fn required(field: &str, value: &str) -> Result<String, VenueError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(VenueError::Validation(format!("{field}: must not be blank")));
    }
    Ok(trimmed.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Venue API errors.
#[derive(Debug, Error)]
pub enum VenueError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("Venue not found")]
    NotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for VenueError {
    fn into_response(self) -> Response {
        let (status, code) = match self {
            Self::Access(e) => return e.into_response(),
            Self::NotFound => (StatusCode::NOT_FOUND, "VENUE_NOT_FOUND"),
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

pub type VenueResult<T> = Result<T, VenueError>;
