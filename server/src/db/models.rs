//! Database Models

use chrono::{DateTime, Utc};
use parti_common::{EventStatus, ProfileSummary, Role, SubscriptionTier};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Sign-in account. Its profile shares the same id.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Profile model. Exactly one per account.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub role: Role,
    pub subscription_tier: SubscriptionTier,
    pub full_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Profile> for ProfileSummary {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id,
            role: profile.role,
            subscription_tier: profile.subscription_tier,
            full_name: profile.full_name,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}

/// Session model for refresh token tracking.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    /// Session ID (the refresh token's `jti`).
    pub id: Uuid,
    /// Account this session belongs to.
    pub account_id: Uuid,
    /// SHA256 hash of the refresh token.
    pub token_hash: String,
    /// When the session/token expires.
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Event model.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub date_time: DateTime<Utc>,
    pub location_name: String,
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
    /// Owning profile. Never changes after insert.
    pub created_by: Uuid,
    pub status: EventStatus,
    pub min_tier_required: SubscriptionTier,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Venue model.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Venue {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub location: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub rating: Option<f64>,
    pub capacity: Option<i32>,
    pub is_open: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Event category.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub icon_name: Option<String>,
}

// ============================================================================
// Write models
// ============================================================================

/// Editable event fields, shared by create and edit.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub description: Option<String>,
    pub date_time: DateTime<Utc>,
    pub location_name: String,
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
    pub min_tier_required: SubscriptionTier,
}

/// Event insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub draft: EventDraft,
    pub created_by: Uuid,
    pub status: EventStatus,
}

/// Event edit. `status` is `Some` only when the edit forces re-moderation.
#[derive(Debug, Clone, PartialEq)]
pub struct EventPatch {
    pub draft: EventDraft,
    pub status: Option<EventStatus>,
}

/// Event query filter. `None` fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub status: Option<EventStatus>,
    pub created_by: Option<Uuid>,
    /// Inclusive lower bound on `date_time`.
    pub starts_at_or_after: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `date_time`.
    pub starts_before: Option<DateTime<Utc>>,
    /// Match any of these categories. Empty means all.
    pub category_ids: Vec<Uuid>,
}

impl EventFilter {
    /// Whether an event satisfies this filter.
    pub fn matches(&self, event: &Event) -> bool {
        self.status.is_none_or(|s| event.status == s)
            && self.created_by.is_none_or(|id| event.created_by == id)
            && self
                .starts_at_or_after
                .is_none_or(|from| event.date_time >= from)
            && self.starts_before.is_none_or(|to| event.date_time < to)
            && (self.category_ids.is_empty()
                || event
                    .category_id
                    .is_some_and(|c| self.category_ids.contains(&c)))
    }
}

/// Event result ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EventOrder {
    #[default]
    DateTimeAsc,
    CreatedAtAsc,
    CreatedAtDesc,
}

impl EventOrder {
    pub(crate) const fn sql(self) -> &'static str {
        match self {
            Self::DateTimeAsc => "date_time ASC, id ASC",
            Self::CreatedAtAsc => "created_at ASC, id ASC",
            Self::CreatedAtDesc => "created_at DESC, id DESC",
        }
    }
}

/// Venue fields, shared by create and edit.
#[derive(Debug, Clone, PartialEq)]
pub struct VenueDraft {
    pub name: String,
    pub category: String,
    pub location: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub rating: Option<f64>,
    pub capacity: Option<i32>,
    pub is_open: bool,
}
