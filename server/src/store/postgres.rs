//! `PostgreSQL` store backed by the `db` query functions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parti_common::{EventStatus, Role, SubscriptionTier};
use sqlx::PgPool;
use uuid::Uuid;

use super::{Store, StoreResult};
use crate::db::{
    self, Account, Category, Event, EventFilter, EventOrder, EventPatch, NewEvent, Profile,
    Session, Venue, VenueDraft,
};

/// Production store over a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool, for migrations and operator tooling.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        Ok(db::find_account_by_email(&self.pool, email).await?)
    }

    async fn create_account(
        &self,
        email: &str,
        password_hash: &str,
        full_name: Option<&str>,
        role: Role,
    ) -> StoreResult<Profile> {
        let (_, profile) =
            db::create_account(&self.pool, email, password_hash, full_name, role).await?;
        Ok(profile)
    }

    async fn insert_session(
        &self,
        id: Uuid,
        account_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        db::create_session(&self.pool, id, account_id, token_hash, expires_at).await?;
        Ok(())
    }

    async fn find_session_by_token_hash(&self, token_hash: &str) -> StoreResult<Option<Session>> {
        Ok(db::find_session_by_token_hash(&self.pool, token_hash).await?)
    }

    async fn delete_session_by_token_hash(&self, token_hash: &str) -> StoreResult<bool> {
        Ok(db::delete_session_by_token_hash(&self.pool, token_hash).await?)
    }

    async fn get_profile(&self, id: Uuid) -> StoreResult<Option<Profile>> {
        Ok(db::find_profile_by_id(&self.pool, id).await?)
    }

    async fn get_profiles(&self, ids: &[Uuid]) -> StoreResult<Vec<Profile>> {
        Ok(db::find_profiles_by_ids(&self.pool, ids).await?)
    }

    async fn list_profiles(&self) -> StoreResult<Vec<Profile>> {
        Ok(db::list_profiles(&self.pool).await?)
    }

    async fn update_profile_role(&self, id: Uuid, role: Role) -> StoreResult<Option<Profile>> {
        Ok(db::update_profile_role(&self.pool, id, role).await?)
    }

    async fn update_profile_tier(
        &self,
        id: Uuid,
        tier: SubscriptionTier,
    ) -> StoreResult<Option<Profile>> {
        Ok(db::update_profile_tier(&self.pool, id, tier).await?)
    }

    async fn get_event(&self, id: Uuid) -> StoreResult<Option<Event>> {
        Ok(db::find_event_by_id(&self.pool, id).await?)
    }

    async fn find_events(&self, filter: &EventFilter, order: EventOrder) -> StoreResult<Vec<Event>> {
        Ok(db::find_events(&self.pool, filter, order).await?)
    }

    async fn insert_event(&self, new: NewEvent) -> StoreResult<Event> {
        Ok(db::insert_event(&self.pool, &new).await?)
    }

    async fn update_event(&self, id: Uuid, patch: EventPatch) -> StoreResult<Option<Event>> {
        Ok(db::update_event(&self.pool, id, &patch).await?)
    }

    async fn transition_event_status(
        &self,
        id: Uuid,
        from: EventStatus,
        to: EventStatus,
    ) -> StoreResult<Option<Event>> {
        Ok(db::transition_event_status(&self.pool, id, from, to).await?)
    }

    async fn delete_event(&self, id: Uuid) -> StoreResult<bool> {
        Ok(db::delete_event(&self.pool, id).await?)
    }

    async fn list_venues(&self) -> StoreResult<Vec<Venue>> {
        Ok(db::list_venues(&self.pool).await?)
    }

    async fn get_venue(&self, id: Uuid) -> StoreResult<Option<Venue>> {
        Ok(db::find_venue_by_id(&self.pool, id).await?)
    }

    async fn insert_venue(&self, draft: VenueDraft) -> StoreResult<Venue> {
        Ok(db::insert_venue(&self.pool, &draft).await?)
    }

    async fn update_venue(&self, id: Uuid, draft: VenueDraft) -> StoreResult<Option<Venue>> {
        Ok(db::update_venue(&self.pool, id, &draft).await?)
    }

    async fn delete_venue(&self, id: Uuid) -> StoreResult<bool> {
        Ok(db::delete_venue(&self.pool, id).await?)
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(db::list_categories(&self.pool).await?)
    }
}
