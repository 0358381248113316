//! Admin HTTP Handlers
//!
//! Every handler authorizes its own action against a fresh profile read.

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::Json;
use parti_common::{EventStatus, ProfileSummary, Role, SubscriptionTier};
use tracing::info;
use uuid::Uuid;

use super::types::{
    AdminError, AdminResult, AdminStatusResponse, PendingEvent, SetRoleRequest, SetTierRequest,
};
use crate::api::AppState;
use crate::auth::Caller;
use crate::db::{EventFilter, EventOrder};
use crate::permissions::{AccessError, Action, Target};

/// Events awaiting moderation, oldest first.
///
/// `GET /api/admin/events/pending`
#[tracing::instrument(skip(state))]
pub async fn pending_events(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> AdminResult<Json<Vec<PendingEvent>>> {
    state
        .access
        .require(
            state.store.as_ref(),
            caller,
            Action::ViewModerationQueue,
            Target::None,
        )
        .await?;

    let events = state
        .store
        .find_events(
            &EventFilter {
                status: Some(EventStatus::Pending),
                ..EventFilter::default()
            },
            EventOrder::CreatedAtAsc,
        )
        .await?;

    let mut creator_ids: Vec<Uuid> = events.iter().map(|e| e.created_by).collect();
    creator_ids.sort_unstable();
    creator_ids.dedup();

    let names: HashMap<Uuid, Option<String>> = state
        .store
        .get_profiles(&creator_ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p.full_name))
        .collect();

    let items = events
        .into_iter()
        .map(|event| PendingEvent {
            creator_name: names.get(&event.created_by).cloned().flatten(),
            event,
        })
        .collect();

    Ok(Json(items))
}

/// All profiles, newest first.
///
/// `GET /api/admin/profiles`
#[tracing::instrument(skip(state))]
pub async fn list_profiles(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> AdminResult<Json<Vec<ProfileSummary>>> {
    state
        .access
        .require(
            state.store.as_ref(),
            caller,
            Action::ListProfiles,
            Target::None,
        )
        .await?;

    let profiles = state.store.list_profiles().await?;
    Ok(Json(profiles.into_iter().map(Into::into).collect()))
}

/// Change a profile's role.
///
/// `PUT /api/admin/profiles/{id}/role`
#[tracing::instrument(skip(state, body))]
pub async fn set_role(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(profile_id): Path<Uuid>,
    Json(body): Json<SetRoleRequest>,
) -> AdminResult<Json<ProfileSummary>> {
    let admin = state
        .access
        .require(
            state.store.as_ref(),
            caller,
            Action::SetUserRole,
            Target::Profile(profile_id),
        )
        .await?;

    let role: Role = body
        .role
        .parse()
        .map_err(|e: parti_common::Error| AdminError::Validation(e.to_string()))?;

    let profile = state
        .store
        .update_profile_role(profile_id, role)
        .await?
        .ok_or_else(|| AdminError::NotFound("Profile".to_string()))?;

    info!(admin_id = %admin.id, user_id = %profile_id, role = %role, "Role changed");

    Ok(Json(profile.into()))
}

/// Change a profile's subscription tier.
///
/// `PUT /api/admin/profiles/{id}/tier`
#[tracing::instrument(skip(state, body))]
pub async fn set_tier(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(profile_id): Path<Uuid>,
    Json(body): Json<SetTierRequest>,
) -> AdminResult<Json<ProfileSummary>> {
    let admin = state
        .access
        .require(
            state.store.as_ref(),
            caller,
            Action::SetUserTier,
            Target::Profile(profile_id),
        )
        .await?;

    let tier: SubscriptionTier = body
        .tier
        .parse()
        .map_err(|e: parti_common::Error| AdminError::Validation(e.to_string()))?;

    let profile = state
        .store
        .update_profile_tier(profile_id, tier)
        .await?
        .ok_or_else(|| AdminError::NotFound("Profile".to_string()))?;

    info!(admin_id = %admin.id, user_id = %profile_id, tier = %tier, "Tier changed");

    Ok(Json(profile.into()))
}

/// Whether the caller is an admin.
///
/// `GET /api/admin/status`
///
/// Any signed-in caller may ask; the answer comes from a fresh profile read.
#[tracing::instrument(skip(state))]
pub async fn get_admin_status(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> AdminResult<Json<AdminStatusResponse>> {
    let id = caller.ok_or(AccessError::Unauthenticated)?;

    let is_admin = state
        .store
        .get_profile(id)
        .await?
        .is_some_and(|p| p.role.is_admin());

    Ok(Json(AdminStatusResponse { is_admin }))
}
