//! Database Queries
//!
//! Runtime queries (no compile-time `DATABASE_URL` required).
//!
//! All query functions include error context logging to aid debugging.

use chrono::{DateTime, Utc};
use parti_common::{EventStatus, Role, SubscriptionTier};
use sqlx::{PgPool, QueryBuilder};
use tracing::error;
use uuid::Uuid;

use super::models::{
    Account, Category, Event, EventFilter, EventOrder, EventPatch, NewEvent, Profile, Session,
    Venue, VenueDraft,
};

/// Log and return a database error with context.
///
/// This helper ensures all database errors are logged with relevant context
/// before being propagated, making production debugging easier.
macro_rules! db_error {
    ($query:expr) => {
        |e| {
            error!(query = $query, error = %e, "Database query failed");
            e
        }
    };
    ($query:expr, $($field:tt)*) => {
        |e| {
            error!(query = $query, $($field)*, error = %e, "Database query failed");
            e
        }
    };
}

// ============================================================================
// Account Queries
// ============================================================================

/// Find account by email (case-insensitive).
pub async fn find_account_by_email(pool: &PgPool, email: &str) -> sqlx::Result<Option<Account>> {
    sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE LOWER(email) = LOWER($1)")
        .bind(email)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_account_by_email"))
}

/// Create an account and its profile in one transaction.
///
/// The profile starts on the basic tier with the given role.
pub async fn create_account(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    full_name: Option<&str>,
    role: Role,
) -> sqlx::Result<(Account, Profile)> {
    let mut tx = pool.begin().await?;

    let account = sqlx::query_as::<_, Account>(
        r"
        INSERT INTO accounts (email, password_hash)
        VALUES ($1, $2)
        RETURNING *
        ",
    )
    .bind(email)
    .bind(password_hash)
    .fetch_one(&mut *tx)
    .await
    .map_err(db_error!("create_account.account"))?;

    let profile = sqlx::query_as::<_, Profile>(
        r"
        INSERT INTO profiles (id, role, subscription_tier, full_name)
        VALUES ($1, $2, 'basic', $3)
        RETURNING *
        ",
    )
    .bind(account.id)
    .bind(role)
    .bind(full_name)
    .fetch_one(&mut *tx)
    .await
    .map_err(db_error!("create_account.profile", account_id = %account.id))?;

    tx.commit().await?;

    Ok((account, profile))
}

// ============================================================================
// Session Queries
// ============================================================================

/// Record a refresh-token session.
pub async fn create_session(
    pool: &PgPool,
    id: Uuid,
    account_id: Uuid,
    token_hash: &str,
    expires_at: DateTime<Utc>,
) -> sqlx::Result<Session> {
    sqlx::query_as::<_, Session>(
        r"
        INSERT INTO sessions (id, account_id, token_hash, expires_at)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        ",
    )
    .bind(id)
    .bind(account_id)
    .bind(token_hash)
    .bind(expires_at)
    .fetch_one(pool)
    .await
    .map_err(db_error!("create_session", account_id = %account_id))
}

/// Find an unexpired session by refresh-token hash.
pub async fn find_session_by_token_hash(
    pool: &PgPool,
    token_hash: &str,
) -> sqlx::Result<Option<Session>> {
    sqlx::query_as::<_, Session>(
        "SELECT * FROM sessions WHERE token_hash = $1 AND expires_at > NOW()",
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("find_session_by_token_hash"))
}

/// Delete a session by refresh-token hash. Returns whether a row was removed.
pub async fn delete_session_by_token_hash(pool: &PgPool, token_hash: &str) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
        .bind(token_hash)
        .execute(pool)
        .await
        .map_err(db_error!("delete_session_by_token_hash"))?;

    Ok(result.rows_affected() > 0)
}

// ============================================================================
// Profile Queries
// ============================================================================

/// Find profile by ID.
pub async fn find_profile_by_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<Profile>> {
    sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_profile_by_id", profile_id = %id))
}

/// Find multiple profiles by IDs (bulk lookup to avoid N+1 queries).
pub async fn find_profiles_by_ids(pool: &PgPool, ids: &[Uuid]) -> sqlx::Result<Vec<Profile>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await
        .map_err(db_error!("find_profiles_by_ids", count = ids.len()))
}

/// List all profiles, newest first.
pub async fn list_profiles(pool: &PgPool) -> sqlx::Result<Vec<Profile>> {
    sqlx::query_as::<_, Profile>("SELECT * FROM profiles ORDER BY created_at DESC, id DESC")
        .fetch_all(pool)
        .await
        .map_err(db_error!("list_profiles"))
}

/// Set a profile's role. `None` when the profile does not exist.
pub async fn update_profile_role(
    pool: &PgPool,
    id: Uuid,
    role: Role,
) -> sqlx::Result<Option<Profile>> {
    sqlx::query_as::<_, Profile>(
        "UPDATE profiles SET role = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
    )
    .bind(role)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("update_profile_role", profile_id = %id, role = %role))
}

/// Set a profile's subscription tier. `None` when the profile does not exist.
pub async fn update_profile_tier(
    pool: &PgPool,
    id: Uuid,
    tier: SubscriptionTier,
) -> sqlx::Result<Option<Profile>> {
    sqlx::query_as::<_, Profile>(
        "UPDATE profiles SET subscription_tier = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
    )
    .bind(tier)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("update_profile_tier", profile_id = %id, tier = %tier))
}

/// Set the role of the profile whose account has this email.
///
/// Operator path used by `promote-admin`; bypasses request authorization.
pub async fn set_role_by_email(
    pool: &PgPool,
    email: &str,
    role: Role,
) -> sqlx::Result<Option<Profile>> {
    sqlx::query_as::<_, Profile>(
        r"
        UPDATE profiles p SET role = $1, updated_at = NOW()
        FROM accounts a
        WHERE a.id = p.id AND LOWER(a.email) = LOWER($2)
        RETURNING p.*
        ",
    )
    .bind(role)
    .bind(email)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("set_role_by_email", role = %role))
}

// ============================================================================
// Event Queries
// ============================================================================

/// Find event by ID.
pub async fn find_event_by_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<Event>> {
    sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_event_by_id", event_id = %id))
}

/// Find events matching a filter.
#[tracing::instrument(skip(pool))]
pub async fn find_events(
    pool: &PgPool,
    filter: &EventFilter,
    order: EventOrder,
) -> sqlx::Result<Vec<Event>> {
    let mut builder = QueryBuilder::new("SELECT * FROM events WHERE TRUE");

    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status);
    }
    if let Some(created_by) = filter.created_by {
        builder.push(" AND created_by = ").push_bind(created_by);
    }
    if let Some(from) = filter.starts_at_or_after {
        builder.push(" AND date_time >= ").push_bind(from);
    }
    if let Some(to) = filter.starts_before {
        builder.push(" AND date_time < ").push_bind(to);
    }
    if !filter.category_ids.is_empty() {
        builder
            .push(" AND category_id = ANY(")
            .push_bind(filter.category_ids.clone())
            .push(")");
    }

    builder.push(" ORDER BY ").push(order.sql());

    builder
        .build_query_as::<Event>()
        .fetch_all(pool)
        .await
        .map_err(db_error!("find_events", filter = ?filter))
}

/// Insert a new event.
pub async fn insert_event(pool: &PgPool, new: &NewEvent) -> sqlx::Result<Event> {
    let draft = &new.draft;
    sqlx::query_as::<_, Event>(
        r"
        INSERT INTO events
            (title, description, date_time, location_name, image_url, category_id,
             min_tier_required, created_by, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        ",
    )
    .bind(&draft.title)
    .bind(&draft.description)
    .bind(draft.date_time)
    .bind(&draft.location_name)
    .bind(&draft.image_url)
    .bind(draft.category_id)
    .bind(draft.min_tier_required)
    .bind(new.created_by)
    .bind(new.status)
    .fetch_one(pool)
    .await
    .map_err(db_error!("insert_event", created_by = %new.created_by))
}

/// Replace an event's editable fields. `created_by` is never touched.
///
/// The status is overwritten only when the patch carries one.
pub async fn update_event(
    pool: &PgPool,
    id: Uuid,
    patch: &EventPatch,
) -> sqlx::Result<Option<Event>> {
    let draft = &patch.draft;
    sqlx::query_as::<_, Event>(
        r"
        UPDATE events SET
            title = $1,
            description = $2,
            date_time = $3,
            location_name = $4,
            image_url = $5,
            category_id = $6,
            min_tier_required = $7,
            status = COALESCE($8, status),
            updated_at = NOW()
        WHERE id = $9
        RETURNING *
        ",
    )
    .bind(&draft.title)
    .bind(&draft.description)
    .bind(draft.date_time)
    .bind(&draft.location_name)
    .bind(&draft.image_url)
    .bind(draft.category_id)
    .bind(draft.min_tier_required)
    .bind(patch.status)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("update_event", event_id = %id))
}

/// Move an event from `from` to `to` only if it is still in `from`.
///
/// `None` when the event is missing or another writer changed its status first.
#[tracing::instrument(skip(pool))]
pub async fn transition_event_status(
    pool: &PgPool,
    id: Uuid,
    from: EventStatus,
    to: EventStatus,
) -> sqlx::Result<Option<Event>> {
    sqlx::query_as::<_, Event>(
        r"
        UPDATE events SET status = $1, updated_at = NOW()
        WHERE id = $2 AND status = $3
        RETURNING *
        ",
    )
    .bind(to)
    .bind(id)
    .bind(from)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("transition_event_status", event_id = %id, from = %from, to = %to))
}

/// Delete an event. Returns whether a row was removed.
pub async fn delete_event(pool: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(db_error!("delete_event", event_id = %id))?;

    Ok(result.rows_affected() > 0)
}

// ============================================================================
// Venue Queries
// ============================================================================

/// List venues by name.
pub async fn list_venues(pool: &PgPool) -> sqlx::Result<Vec<Venue>> {
    sqlx::query_as::<_, Venue>("SELECT * FROM venues ORDER BY name ASC, id ASC")
        .fetch_all(pool)
        .await
        .map_err(db_error!("list_venues"))
}

/// Find venue by ID.
pub async fn find_venue_by_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<Venue>> {
    sqlx::query_as::<_, Venue>("SELECT * FROM venues WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(db_error!("find_venue_by_id", venue_id = %id))
}

/// Insert a venue.
pub async fn insert_venue(pool: &PgPool, draft: &VenueDraft) -> sqlx::Result<Venue> {
    sqlx::query_as::<_, Venue>(
        r"
        INSERT INTO venues
            (name, category, location, description, image_url, rating, capacity, is_open)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        ",
    )
    .bind(&draft.name)
    .bind(&draft.category)
    .bind(&draft.location)
    .bind(&draft.description)
    .bind(&draft.image_url)
    .bind(draft.rating)
    .bind(draft.capacity)
    .bind(draft.is_open)
    .fetch_one(pool)
    .await
    .map_err(db_error!("insert_venue", name = %draft.name))
}

/// Replace a venue's fields. `None` when the venue does not exist.
pub async fn update_venue(
    pool: &PgPool,
    id: Uuid,
    draft: &VenueDraft,
) -> sqlx::Result<Option<Venue>> {
    sqlx::query_as::<_, Venue>(
        r"
        UPDATE venues SET
            name = $1,
            category = $2,
            location = $3,
            description = $4,
            image_url = $5,
            rating = $6,
            capacity = $7,
            is_open = $8,
            updated_at = NOW()
        WHERE id = $9
        RETURNING *
        ",
    )
    .bind(&draft.name)
    .bind(&draft.category)
    .bind(&draft.location)
    .bind(&draft.description)
    .bind(&draft.image_url)
    .bind(draft.rating)
    .bind(draft.capacity)
    .bind(draft.is_open)
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(db_error!("update_venue", venue_id = %id))
}

/// Delete a venue. Returns whether a row was removed.
pub async fn delete_venue(pool: &PgPool, id: Uuid) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM venues WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(db_error!("delete_venue", venue_id = %id))?;

    Ok(result.rows_affected() > 0)
}

// ============================================================================
// Category Queries
// ============================================================================

/// List categories by name.
pub async fn list_categories(pool: &PgPool) -> sqlx::Result<Vec<Category>> {
    sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name ASC")
        .fetch_all(pool)
        .await
        .map_err(db_error!("list_categories"))
}
