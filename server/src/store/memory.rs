//! In-memory store.
//!
//! Same semantics as the `PostgreSQL` store (case-insensitive unique emails,
//! compare-and-swap status transitions, stable orderings) without a database.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parti_common::{EventStatus, Role, SubscriptionTier};
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::db::{
    Account, Category, Event, EventFilter, EventOrder, EventPatch, NewEvent, Profile, Session,
    Venue, VenueDraft,
};

/// Store held entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: DashMap<Uuid, Account>,
    /// Lowercased email -> account id.
    emails: DashMap<String, Uuid>,
    profiles: DashMap<Uuid, Profile>,
    /// Token hash -> session.
    sessions: DashMap<String, Session>,
    events: DashMap<Uuid, Event>,
    venues: DashMap<Uuid, Venue>,
    categories: DashMap<Uuid, Category>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with a backend error (or recover).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Seed a category.
    pub fn insert_category(&self, name: &str, icon_name: Option<&str>) -> Category {
        let category = Category {
            id: Uuid::now_v7(),
            name: name.to_string(),
            icon_name: icon_name.map(str::to_string),
        };
        self.categories.insert(category.id, category.clone());
        category
    }

    fn check(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(
                "connection refused: store unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        self.check()?;
        let id = match self.emails.get(&email.to_lowercase()) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(self.accounts.get(&id).map(|a| a.clone()))
    }

    async fn create_account(
        &self,
        email: &str,
        password_hash: &str,
        full_name: Option<&str>,
        role: Role,
    ) -> StoreResult<Profile> {
        self.check()?;
        let now = Utc::now();
        let id = Uuid::now_v7();

        match self.emails.entry(email.to_lowercase()) {
            Entry::Occupied(_) => {
                return Err(StoreError::Conflict(
                    "duplicate key value violates unique constraint \"idx_accounts_email_lower\""
                        .to_string(),
                ));
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        self.accounts.insert(
            id,
            Account {
                id,
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                created_at: now,
            },
        );

        let profile = Profile {
            id,
            role,
            subscription_tier: SubscriptionTier::Basic,
            full_name: full_name.map(str::to_string),
            created_at: now,
            updated_at: now,
        };
        self.profiles.insert(id, profile.clone());

        Ok(profile)
    }

    async fn insert_session(
        &self,
        id: Uuid,
        account_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        self.check()?;
        self.sessions.insert(
            token_hash.to_string(),
            Session {
                id,
                account_id,
                token_hash: token_hash.to_string(),
                expires_at,
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn find_session_by_token_hash(&self, token_hash: &str) -> StoreResult<Option<Session>> {
        self.check()?;
        let now = Utc::now();
        Ok(self
            .sessions
            .get(token_hash)
            .filter(|s| s.expires_at > now)
            .map(|s| s.clone()))
    }

    async fn delete_session_by_token_hash(&self, token_hash: &str) -> StoreResult<bool> {
        self.check()?;
        Ok(self.sessions.remove(token_hash).is_some())
    }

    async fn get_profile(&self, id: Uuid) -> StoreResult<Option<Profile>> {
        self.check()?;
        Ok(self.profiles.get(&id).map(|p| p.clone()))
    }

    async fn get_profiles(&self, ids: &[Uuid]) -> StoreResult<Vec<Profile>> {
        self.check()?;
        Ok(ids
            .iter()
            .filter_map(|id| self.profiles.get(id).map(|p| p.clone()))
            .collect())
    }

    async fn list_profiles(&self) -> StoreResult<Vec<Profile>> {
        self.check()?;
        let mut profiles: Vec<Profile> = self.profiles.iter().map(|p| p.clone()).collect();
        profiles.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(profiles)
    }

    async fn update_profile_role(&self, id: Uuid, role: Role) -> StoreResult<Option<Profile>> {
        self.check()?;
        Ok(self.profiles.get_mut(&id).map(|mut p| {
            p.role = role;
            p.updated_at = Utc::now();
            p.clone()
        }))
    }

    async fn update_profile_tier(
        &self,
        id: Uuid,
        tier: SubscriptionTier,
    ) -> StoreResult<Option<Profile>> {
        self.check()?;
        Ok(self.profiles.get_mut(&id).map(|mut p| {
            p.subscription_tier = tier;
            p.updated_at = Utc::now();
            p.clone()
        }))
    }

    async fn get_event(&self, id: Uuid) -> StoreResult<Option<Event>> {
        self.check()?;
        Ok(self.events.get(&id).map(|e| e.clone()))
    }

    async fn find_events(&self, filter: &EventFilter, order: EventOrder) -> StoreResult<Vec<Event>> {
        self.check()?;
        let mut events: Vec<Event> = self
            .events
            .iter()
            .filter(|e| filter.matches(e))
            .map(|e| e.clone())
            .collect();

        match order {
            EventOrder::DateTimeAsc => events.sort_by_key(|e| (e.date_time, e.id)),
            EventOrder::CreatedAtAsc => events.sort_by_key(|e| (e.created_at, e.id)),
            EventOrder::CreatedAtDesc => {
                events.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
            }
        }

        Ok(events)
    }

    async fn insert_event(&self, new: NewEvent) -> StoreResult<Event> {
        self.check()?;
        if !self.profiles.contains_key(&new.created_by) {
            return Err(StoreError::Backend(
                "insert or update on table \"events\" violates foreign key constraint".to_string(),
            ));
        }

        let now = Utc::now();
        let NewEvent {
            draft,
            created_by,
            status,
        } = new;
        let event = Event {
            id: Uuid::now_v7(),
            title: draft.title,
            description: draft.description,
            date_time: draft.date_time,
            location_name: draft.location_name,
            image_url: draft.image_url,
            category_id: draft.category_id,
            created_by,
            status,
            min_tier_required: draft.min_tier_required,
            created_at: now,
            updated_at: now,
        };
        self.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn update_event(&self, id: Uuid, patch: EventPatch) -> StoreResult<Option<Event>> {
        self.check()?;
        Ok(self.events.get_mut(&id).map(|mut e| {
            let EventPatch { draft, status } = patch;
            e.title = draft.title;
            e.description = draft.description;
            e.date_time = draft.date_time;
            e.location_name = draft.location_name;
            e.image_url = draft.image_url;
            e.category_id = draft.category_id;
            e.min_tier_required = draft.min_tier_required;
            if let Some(status) = status {
                e.status = status;
            }
            e.updated_at = Utc::now();
            e.clone()
        }))
    }

    async fn transition_event_status(
        &self,
        id: Uuid,
        from: EventStatus,
        to: EventStatus,
    ) -> StoreResult<Option<Event>> {
        self.check()?;
        let Some(mut event) = self.events.get_mut(&id) else {
            return Ok(None);
        };
        if event.status != from {
            return Ok(None);
        }
        event.status = to;
        event.updated_at = Utc::now();
        Ok(Some(event.clone()))
    }

    async fn delete_event(&self, id: Uuid) -> StoreResult<bool> {
        self.check()?;
        Ok(self.events.remove(&id).is_some())
    }

    async fn list_venues(&self) -> StoreResult<Vec<Venue>> {
        self.check()?;
        let mut venues: Vec<Venue> = self.venues.iter().map(|v| v.clone()).collect();
        venues.sort_by(|a, b| (&a.name, a.id).cmp(&(&b.name, b.id)));
        Ok(venues)
    }

    async fn get_venue(&self, id: Uuid) -> StoreResult<Option<Venue>> {
        self.check()?;
        Ok(self.venues.get(&id).map(|v| v.clone()))
    }

    async fn insert_venue(&self, draft: VenueDraft) -> StoreResult<Venue> {
        self.check()?;
        let now = Utc::now();
        let venue = Venue {
            id: Uuid::now_v7(),
            name: draft.name,
            category: draft.category,
            location: draft.location,
            description: draft.description,
            image_url: draft.image_url,
            rating: draft.rating,
            capacity: draft.capacity,
            is_open: draft.is_open,
            created_at: now,
            updated_at: now,
        };
        self.venues.insert(venue.id, venue.clone());
        Ok(venue)
    }

    async fn update_venue(&self, id: Uuid, draft: VenueDraft) -> StoreResult<Option<Venue>> {
        self.check()?;
        Ok(self.venues.get_mut(&id).map(|mut v| {
            v.name = draft.name;
            v.category = draft.category;
            v.location = draft.location;
            v.description = draft.description;
            v.image_url = draft.image_url;
            v.rating = draft.rating;
            v.capacity = draft.capacity;
            v.is_open = draft.is_open;
            v.updated_at = Utc::now();
            v.clone()
        }))
    }

    async fn delete_venue(&self, id: Uuid) -> StoreResult<bool> {
        self.check()?;
        Ok(self.venues.remove(&id).is_some())
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        self.check()?;
        let mut categories: Vec<Category> = self.categories.iter().map(|c| c.clone()).collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::db::EventDraft;

    fn draft(title: &str, days_ahead: i64) -> EventDraft {
        EventDraft {
            title: title.to_string(),
            description: None,
            date_time: Utc::now() + Duration::days(days_ahead),
            location_name: "Los Cristianos".to_string(),
            image_url: None,
            category_id: None,
            min_tier_required: SubscriptionTier::Basic,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts_ignoring_case() {
        let store = MemoryStore::new();
        store
            .create_account("Dj@Parti.life", "hash", None, Role::Agent)
            .await
            .unwrap();

        let err = store
            .create_account("dj@parti.life", "hash", None, Role::User)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let found = store.find_account_by_email("DJ@PARTI.LIFE").await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_transition_is_compare_and_swap() {
        let store = MemoryStore::new();
        let agent = store
            .create_account("a@parti.life", "hash", None, Role::Agent)
            .await
            .unwrap();
        let event = store
            .insert_event(NewEvent {
                draft: draft("Techno Night", 2),
                created_by: agent.id,
                status: EventStatus::Pending,
            })
            .await
            .unwrap();

        let first = store
            .transition_event_status(event.id, EventStatus::Pending, EventStatus::Approved)
            .await
            .unwrap();
        assert_eq!(first.unwrap().status, EventStatus::Approved);

        let second = store
            .transition_event_status(event.id, EventStatus::Pending, EventStatus::Rejected)
            .await
            .unwrap();
        assert!(second.is_none());
        assert_eq!(
            store.get_event(event.id).await.unwrap().unwrap().status,
            EventStatus::Approved
        );
    }

    #[tokio::test]
    async fn test_find_events_orders_by_date() {
        let store = MemoryStore::new();
        let agent = store
            .create_account("a@parti.life", "hash", None, Role::Agent)
            .await
            .unwrap();
        for (title, days) in [("Third", 9), ("First", 1), ("Second", 5)] {
            store
                .insert_event(NewEvent {
                    draft: draft(title, days),
                    created_by: agent.id,
                    status: EventStatus::Approved,
                })
                .await
                .unwrap();
        }

        let events = store
            .find_events(&EventFilter::default(), EventOrder::DateTimeAsc)
            .await
            .unwrap();
        let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
    }

    #[tokio::test]
    async fn test_insert_event_requires_existing_profile() {
        let store = MemoryStore::new();
        let result = store
            .insert_event(NewEvent {
                draft: draft("Orphan", 1),
                created_by: Uuid::now_v7(),
                status: EventStatus::Pending,
            })
            .await;
        assert!(matches!(result, Err(StoreError::Backend(_))));
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_call() {
        let store = MemoryStore::new();
        store.set_unavailable(true);

        let err = store.get_profile(Uuid::now_v7()).await.unwrap_err();
        assert_eq!(err.to_string(), "connection refused: store unavailable");

        store.set_unavailable(false);
        assert!(store.get_profile(Uuid::now_v7()).await.unwrap().is_none());
    }
}
