//! Event request/response types and errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use parti_common::SubscriptionTier;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::auth::ErrorResponse;
use crate::db::EventDraft;
use crate::permissions::AccessError;
use crate::store::StoreError;

/// Create or edit request body.
#[derive(Debug, Deserialize, Validate)]
pub struct EventRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub date_time: DateTime<Utc>,
    #[validate(length(min = 1, max = 200))]
    pub location_name: String,
    #[validate(url)]
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub min_tier_required: SubscriptionTier,
}

impl EventRequest {
    /// Validate and normalize into store fields.
    ///
    /// Blank optional text becomes `None` before validation, so an empty
    /// `image_url` means no image. Title and location must not be blank.
    pub fn into_draft(mut self) -> Result<EventDraft, EventError> {
        self.description = non_blank(self.description);
        self.image_url = non_blank(self.image_url);
        self.validate()
            .map_err(|e| EventError::Validation(e.to_string()))?;

        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(EventError::Validation("title: must not be blank".into()));
        }
        let location_name = self.location_name.trim().to_string();
        if location_name.is_empty() {
            return Err(EventError::Validation(
                "location_name: must not be blank".into(),
            ));
        }

        Ok(EventDraft {
            title,
            description: self.description,
            date_time: self.date_time,
            location_name,
            image_url: self.image_url,
            category_id: self.category_id,
            min_tier_required: self.min_tier_required,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `GET /api/events/calendar` query.
#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub year: i32,
    pub month: u32,
}

/// `GET /api/events/range` query.
#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Comma-separated category ids.
    pub category: Option<String>,
}

impl RangeQuery {
    /// Parse the category list. Empty means all categories.
    pub fn category_ids(&self) -> Result<Vec<Uuid>, EventError> {
        let Some(raw) = self.category.as_deref() else {
            return Ok(Vec::new());
        };
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse()
                    .map_err(|_| EventError::Validation(format!("category: invalid id {s:?}")))
            })
            .collect()
    }
}

/// Event API errors.
#[derive(Debug, Error)]
pub enum EventError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("Event not found")]
    NotFound,

    /// The event is not in a state that allows the transition.
    #[error("{0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for EventError {
    fn into_response(self) -> Response {
        let (status, code) = match self {
            Self::Access(e) => return e.into_response(),
            Self::NotFound => (StatusCode::NOT_FOUND, "EVENT_NOT_FOUND"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "INVALID_STATUS"),
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

/// Result type for event operations.
pub type EventResult<T> = Result<T, EventError>;
