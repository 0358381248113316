//! Persistent record store.
//!
//! The application logic reaches persistent state only through [`Store`].
//! [`PgStore`] is the production backend; [`MemoryStore`] backs tests and
//! local experiments. Neither enforces authorization: callers must go
//! through `permissions::AccessControl` first.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parti_common::{EventStatus, Role, SubscriptionTier};
use thiserror::Error;
use uuid::Uuid;

use crate::db::{
    Account, Category, Event, EventFilter, EventOrder, EventPatch, NewEvent, Profile, Session,
    Venue, VenueDraft,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// A store call failed. The message is the backend's own error text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("{0}")]
    Conflict(String),

    /// Any other backend failure (connection, timeout, constraint).
    #[error("{0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Conflict(db.message().to_string())
            }
            _ => Self::Backend(err.to_string()),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Typed record operations over accounts, profiles, events, venues and
/// categories.
///
/// Every call reads or writes current state; implementations must not cache
/// profiles, since roles and tiers are re-read for each decision.
#[async_trait]
pub trait Store: Send + Sync {
    // Accounts & sessions

    /// Find an account by email, ignoring case.
    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>>;

    /// Create an account and its profile (basic tier) together.
    ///
    /// Fails with [`StoreError::Conflict`] when the email is taken.
    async fn create_account(
        &self,
        email: &str,
        password_hash: &str,
        full_name: Option<&str>,
        role: Role,
    ) -> StoreResult<Profile>;

    async fn insert_session(
        &self,
        id: Uuid,
        account_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    /// Find an unexpired session by refresh-token hash.
    async fn find_session_by_token_hash(&self, token_hash: &str) -> StoreResult<Option<Session>>;

    async fn delete_session_by_token_hash(&self, token_hash: &str) -> StoreResult<bool>;

    // Profiles

    async fn get_profile(&self, id: Uuid) -> StoreResult<Option<Profile>>;

    /// Bulk profile lookup. Unknown ids are skipped.
    async fn get_profiles(&self, ids: &[Uuid]) -> StoreResult<Vec<Profile>>;

    /// All profiles, newest first.
    async fn list_profiles(&self) -> StoreResult<Vec<Profile>>;

    async fn update_profile_role(&self, id: Uuid, role: Role) -> StoreResult<Option<Profile>>;

    async fn update_profile_tier(
        &self,
        id: Uuid,
        tier: SubscriptionTier,
    ) -> StoreResult<Option<Profile>>;

    // Events

    async fn get_event(&self, id: Uuid) -> StoreResult<Option<Event>>;

    async fn find_events(&self, filter: &EventFilter, order: EventOrder) -> StoreResult<Vec<Event>>;

    async fn insert_event(&self, new: NewEvent) -> StoreResult<Event>;

    /// Replace editable fields; `None` when the event is gone.
    async fn update_event(&self, id: Uuid, patch: EventPatch) -> StoreResult<Option<Event>>;

    /// Compare-and-swap on `status`; `None` when the event is gone or no
    /// longer in `from`.
    async fn transition_event_status(
        &self,
        id: Uuid,
        from: EventStatus,
        to: EventStatus,
    ) -> StoreResult<Option<Event>>;

    async fn delete_event(&self, id: Uuid) -> StoreResult<bool>;

    // Venues & categories

    /// All venues by name.
    async fn list_venues(&self) -> StoreResult<Vec<Venue>>;

    async fn get_venue(&self, id: Uuid) -> StoreResult<Option<Venue>>;

    async fn insert_venue(&self, draft: VenueDraft) -> StoreResult<Venue>;

    async fn update_venue(&self, id: Uuid, draft: VenueDraft) -> StoreResult<Option<Venue>>;

    async fn delete_venue(&self, id: Uuid) -> StoreResult<bool>;

    /// All categories by name.
    async fn list_categories(&self) -> StoreResult<Vec<Category>>;
}
