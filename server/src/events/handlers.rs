//! Event HTTP Handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use super::service::{self, Moderation};
use super::types::{CalendarQuery, EventRequest, EventResult, RangeQuery};
use crate::api::AppState;
use crate::auth::Caller;
use crate::db::{Category, Event};
use crate::permissions::EventView;

/// GET /api/events
pub async fn list_events(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> EventResult<Json<Vec<EventView>>> {
    let viewer = service::resolve_viewer(&state, caller).await?;
    Ok(Json(service::list_upcoming(&state, &viewer).await?))
}

/// GET /api/events/{id}
pub async fn get_event(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(event_id): Path<Uuid>,
) -> EventResult<Json<EventView>> {
    let viewer = service::resolve_viewer(&state, caller).await?;
    Ok(Json(service::event_detail(&state, &viewer, event_id).await?))
}

/// GET /api/events/calendar?year=&month=
pub async fn calendar(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> EventResult<Json<Vec<String>>> {
    Ok(Json(
        service::calendar_dates(&state, query.year, query.month).await?,
    ))
}

/// GET /api/events/range?start=&end=&category=
pub async fn range(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Query(query): Query<RangeQuery>,
) -> EventResult<Json<Vec<EventView>>> {
    let category_ids = query.category_ids()?;
    let viewer = service::resolve_viewer(&state, caller).await?;
    Ok(Json(
        service::events_in_range(&state, &viewer, query.start, query.end, category_ids).await?,
    ))
}

/// GET /api/categories
pub async fn list_categories(State(state): State<AppState>) -> EventResult<Json<Vec<Category>>> {
    Ok(Json(service::list_categories(&state).await?))
}

/// POST /api/events
#[tracing::instrument(skip(state, body))]
pub async fn create_event(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(body): Json<EventRequest>,
) -> EventResult<(StatusCode, Json<Event>)> {
    let event = service::create_event(&state, caller, body).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// PUT /api/events/{id}
#[tracing::instrument(skip(state, body))]
pub async fn update_event(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(event_id): Path<Uuid>,
    Json(body): Json<EventRequest>,
) -> EventResult<Json<Event>> {
    Ok(Json(
        service::edit_event(&state, caller, event_id, body).await?,
    ))
}

/// DELETE /api/events/{id}
#[tracing::instrument(skip(state))]
pub async fn delete_event(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(event_id): Path<Uuid>,
) -> EventResult<StatusCode> {
    service::delete_event(&state, caller, event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/events/{id}/approve
pub async fn approve_event(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(event_id): Path<Uuid>,
) -> EventResult<Json<Event>> {
    Ok(Json(
        service::moderate_event(&state, caller, event_id, Moderation::Approve).await?,
    ))
}

/// POST /api/events/{id}/reject
pub async fn reject_event(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Path(event_id): Path<Uuid>,
) -> EventResult<Json<Event>> {
    Ok(Json(
        service::moderate_event(&state, caller, event_id, Moderation::Reject).await?,
    ))
}

/// GET /api/me/events
pub async fn my_events(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> EventResult<Json<Vec<Event>>> {
    Ok(Json(service::my_submissions(&state, caller).await?))
}
