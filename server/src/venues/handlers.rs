//! Venue HTTP Handlers
//!
//! Reads are public. Writes are admin only and drop the cached venue list.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;
use uuid::Uuid;

use super::types::{VenueError, VenueRequest, VenueResult};
use crate::api::AppState;
use crate::auth::Caller;
use crate::cache::VENUES_KEY;
use crate::db::Venue;
use crate::permissions::{Action, Target};

/// GET /api/venues
pub async fn list_venues(State(state): State<AppState>) -> VenueResult<Json<Vec<Venue>>> {
    if let Some(cached) = state.cache.get(VENUES_KEY).await {
        return Ok(Json(cached));
    }

    let venues = state.store.list_venues().await?;
    state.cache.put(VENUES_KEY, &venues).await;
    Ok(Json(venues))
}

/// GET /api/venues/{id}
pub async fn get_venue(
    State(state): State<AppState>,
    Path(venue_id): Path<Uuid>,
) -> VenueResult<Json<Venue>> {
    state
        .store
        .get_venue(venue_id)
        .await?
        .map(Json)
        .ok_or(VenueError::NotFound)
}

/// POST /api/venues
#[tracing::instrument(skip(state, body))]
pub async fn create_venue(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(body): Json<VenueRequest>,
) -> VenueResult<(StatusCode, Json<Venue>)> {
    let admin = state
        .access
        .require(
            state.store.as_ref(),
            caller,
            Action::CreateOrEditVenue,
            Target::None,
        )
        .await?;
    let draft = body.into_draft()?;

    let venue = state.store.insert_venue(draft).await?;
    state.cache.invalidate_venues().await;
    info!(venue_id = %venue.id, admin_id = %admin.id, "Venue created");

    Ok((StatusCode::CREATED, Json(venue)))
}

/// PUT /api/venues/{id}
#[tracing::instrument(skip(state, body))]
pub async fn update_venue(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(venue_id): Path<Uuid>,
    Json(body): Json<VenueRequest>,
) -> VenueResult<Json<Venue>> {
    let admin = state
        .access
        .require(
            state.store.as_ref(),
            caller,
            Action::CreateOrEditVenue,
            Target::Venue(venue_id),
        )
        .await?;
    let draft = body.into_draft()?;

    let venue = state
        .store
        .update_venue(venue_id, draft)
        .await?
        .ok_or(VenueError::NotFound)?;
    state.cache.invalidate_venues().await;
    info!(venue_id = %venue.id, admin_id = %admin.id, "Venue updated");

    Ok(Json(venue))
}

/// DELETE /api/venues/{id}
#[tracing::instrument(skip(state))]
pub async fn delete_venue(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(venue_id): Path<Uuid>,
) -> VenueResult<StatusCode> {
    let admin = state
        .access
        .require(
            state.store.as_ref(),
            caller,
            Action::DeleteVenue,
            Target::Venue(venue_id),
        )
        .await?;

    if !state.store.delete_venue(venue_id).await? {
        return Err(VenueError::NotFound);
    }
    state.cache.invalidate_venues().await;
    info!(venue_id = %venue_id, admin_id = %admin.id, "Venue deleted");

    Ok(StatusCode::NO_CONTENT)
}
