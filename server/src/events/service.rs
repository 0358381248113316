//! Event submission and moderation workflow.
//!
//! Every mutation asks [`AccessControl`](crate::permissions::AccessControl)
//! first and performs no store write on denial. Reads resolve the viewer
//! and pass events through [`VisibilityPolicy`] before returning them.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use parti_common::EventStatus;
use tracing::info;
use uuid::Uuid;

use super::types::{EventError, EventRequest, EventResult};
use crate::api::AppState;
use crate::cache::{calendar_key, UPCOMING_EVENTS_KEY};
use crate::db::{Category, Event, EventDraft, EventFilter, EventOrder, EventPatch, NewEvent};
use crate::permissions::{
    Action, DetailAccess, EventView, Principal, Target, Viewer, VisibilityPolicy,
};
use crate::store::StoreError;

/// Moderation outcome for a pending event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Moderation {
    Approve,
    Reject,
}

impl Moderation {
    const fn action(self) -> Action {
        match self {
            Self::Approve => Action::ApproveEvent,
            Self::Reject => Action::RejectEvent,
        }
    }

    const fn status(self) -> EventStatus {
        match self {
            Self::Approve => EventStatus::Approved,
            Self::Reject => EventStatus::Rejected,
        }
    }
}

/// Who is looking, from a fresh profile read. Unknown ids are anonymous.
pub async fn resolve_viewer(state: &AppState, caller: Option<Uuid>) -> Result<Viewer, StoreError> {
    let Some(id) = caller else {
        return Ok(Viewer::anonymous());
    };
    Ok(state
        .store
        .get_profile(id)
        .await?
        .map_or_else(Viewer::anonymous, |p| Viewer::from(Principal::from(&p))))
}

async fn check_category(state: &AppState, draft: &EventDraft) -> EventResult<()> {
    let Some(category_id) = draft.category_id else {
        return Ok(());
    };
    let known = state
        .store
        .list_categories()
        .await?
        .iter()
        .any(|c| c.id == category_id);
    if known {
        Ok(())
    } else {
        Err(EventError::Validation(format!(
            "category_id: unknown category {category_id}"
        )))
    }
}

/// Submit an event. Admin submissions are approved immediately, everyone
/// else's wait for moderation.
///
/// The body is only validated once the caller may create events.
#[tracing::instrument(skip(state, request))]
pub async fn create_event(
    state: &AppState,
    caller: Option<Uuid>,
    request: EventRequest,
) -> EventResult<Event> {
    let principal = state
        .access
        .require(state.store.as_ref(), caller, Action::CreateEvent, Target::None)
        .await?;
    let draft = request.into_draft()?;
    check_category(state, &draft).await?;

    let status = if principal.is_admin() {
        EventStatus::Approved
    } else {
        EventStatus::Pending
    };

    let event = state
        .store
        .insert_event(NewEvent {
            draft,
            created_by: principal.id,
            status,
        })
        .await?;

    state.cache.invalidate_events(&[event.date_time]).await;
    info!(event_id = %event.id, user_id = %principal.id, status = %event.status, "Event created");

    Ok(event)
}

/// Edit an event. Non-admin edits send it back to moderation; admin edits
/// keep its status.
#[tracing::instrument(skip(state, request))]
pub async fn edit_event(
    state: &AppState,
    caller: Option<Uuid>,
    event_id: Uuid,
    request: EventRequest,
) -> EventResult<Event> {
    let principal = state
        .access
        .require(
            state.store.as_ref(),
            caller,
            Action::EditEvent,
            Target::Event(event_id),
        )
        .await?;
    let draft = request.into_draft()?;
    check_category(state, &draft).await?;

    let previous = state
        .store
        .get_event(event_id)
        .await?
        .ok_or(EventError::NotFound)?;

    let status = (!principal.is_admin()).then_some(EventStatus::Pending);
    let event = state
        .store
        .update_event(event_id, EventPatch { draft, status })
        .await?
        .ok_or(EventError::NotFound)?;

    state
        .cache
        .invalidate_events(&[previous.date_time, event.date_time])
        .await;
    info!(event_id = %event.id, user_id = %principal.id, status = %event.status, "Event edited");

    Ok(event)
}

/// Approve or reject a pending event.
///
/// Only `pending` events move; anything else is a conflict, so two racing
/// moderators cannot both succeed.
#[tracing::instrument(skip(state))]
pub async fn moderate_event(
    state: &AppState,
    caller: Option<Uuid>,
    event_id: Uuid,
    outcome: Moderation,
) -> EventResult<Event> {
    let principal = state
        .access
        .require(
            state.store.as_ref(),
            caller,
            outcome.action(),
            Target::Event(event_id),
        )
        .await?;

    let moved = state
        .store
        .transition_event_status(event_id, EventStatus::Pending, outcome.status())
        .await?;

    let event = match moved {
        Some(event) => event,
        None => {
            let current = state
                .store
                .get_event(event_id)
                .await?
                .ok_or(EventError::NotFound)?;
            return Err(EventError::Conflict(format!(
                "Event is {}, not pending",
                current.status
            )));
        }
    };

    state.cache.invalidate_events(&[event.date_time]).await;
    info!(event_id = %event.id, user_id = %principal.id, status = %event.status, "Event moderated");

    Ok(event)
}

/// Permanently delete an event.
#[tracing::instrument(skip(state))]
pub async fn delete_event(
    state: &AppState,
    caller: Option<Uuid>,
    event_id: Uuid,
) -> EventResult<()> {
    let principal = state
        .access
        .require(
            state.store.as_ref(),
            caller,
            Action::DeleteEvent,
            Target::Event(event_id),
        )
        .await?;

    let event = state
        .store
        .get_event(event_id)
        .await?
        .ok_or(EventError::NotFound)?;
    if !state.store.delete_event(event_id).await? {
        return Err(EventError::NotFound);
    }

    state.cache.invalidate_events(&[event.date_time]).await;
    info!(event_id = %event_id, user_id = %principal.id, "Event deleted");

    Ok(())
}

/// Approved events starting now or later, soonest first, masked for the
/// viewer.
pub async fn list_upcoming(state: &AppState, viewer: &Viewer) -> EventResult<Vec<EventView>> {
    let now = Utc::now();

    let events: Vec<Event> = if let Some(cached) = state.cache.get(UPCOMING_EVENTS_KEY).await {
        cached
    } else {
        let fresh = state
            .store
            .find_events(
                &EventFilter {
                    status: Some(EventStatus::Approved),
                    starts_at_or_after: Some(now),
                    ..EventFilter::default()
                },
                EventOrder::DateTimeAsc,
            )
            .await?;
        state.cache.put(UPCOMING_EVENTS_KEY, &fresh).await;
        fresh
    };

    Ok(events
        .into_iter()
        .filter(|e| e.date_time >= now)
        .map(|e| VisibilityPolicy::mask(viewer, e))
        .collect())
}

/// One event: full, locked placeholder, or not found.
pub async fn event_detail(
    state: &AppState,
    viewer: &Viewer,
    event_id: Uuid,
) -> EventResult<EventView> {
    let event = state
        .store
        .get_event(event_id)
        .await?
        .ok_or(EventError::NotFound)?;

    match VisibilityPolicy::detail_access(viewer, &event) {
        DetailAccess::Hidden => Err(EventError::NotFound),
        DetailAccess::Full | DetailAccess::Locked => Ok(VisibilityPolicy::mask(viewer, event)),
    }
}

/// First instant of a month and of the month after, in UTC.
fn month_bounds(year: i32, month: u32) -> EventResult<(DateTime<Utc>, DateTime<Utc>)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| EventError::Validation(format!("invalid month {year}-{month}")))?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| EventError::Validation(format!("invalid month {year}-{month}")))?;

    let to_utc = |d: NaiveDate| d.and_time(NaiveTime::MIN).and_utc();
    Ok((to_utc(start), to_utc(next)))
}

/// Distinct `YYYY-MM-DD` dates in a month with at least one approved event.
pub async fn calendar_dates(state: &AppState, year: i32, month: u32) -> EventResult<Vec<String>> {
    let (start, end) = month_bounds(year, month)?;
    let key = calendar_key(year, month);

    if let Some(cached) = state.cache.get(&key).await {
        return Ok(cached);
    }

    let events = state
        .store
        .find_events(
            &EventFilter {
                status: Some(EventStatus::Approved),
                starts_at_or_after: Some(start),
                starts_before: Some(end),
                ..EventFilter::default()
            },
            EventOrder::DateTimeAsc,
        )
        .await?;

    let mut dates: Vec<String> = events
        .iter()
        .map(|e| e.date_time.date_naive().format("%Y-%m-%d").to_string())
        .collect();
    dates.dedup();

    state.cache.put(&key, &dates).await;
    Ok(dates)
}

/// Approved events in `[start, end)`, optionally limited to categories,
/// masked for the viewer.
pub async fn events_in_range(
    state: &AppState,
    viewer: &Viewer,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    category_ids: Vec<Uuid>,
) -> EventResult<Vec<EventView>> {
    if end <= start {
        return Err(EventError::Validation("end must be after start".into()));
    }

    let events = state
        .store
        .find_events(
            &EventFilter {
                status: Some(EventStatus::Approved),
                starts_at_or_after: Some(start),
                starts_before: Some(end),
                category_ids,
                ..EventFilter::default()
            },
            EventOrder::DateTimeAsc,
        )
        .await?;

    Ok(events
        .into_iter()
        .map(|e| VisibilityPolicy::mask(viewer, e))
        .collect())
}

/// The caller's own submissions in any status, newest first.
#[tracing::instrument(skip(state))]
pub async fn my_submissions(state: &AppState, caller: Option<Uuid>) -> EventResult<Vec<Event>> {
    let principal = state
        .access
        .require(
            state.store.as_ref(),
            caller,
            Action::ViewOwnSubmissions,
            Target::None,
        )
        .await?;

    Ok(state
        .store
        .find_events(
            &EventFilter {
                created_by: Some(principal.id),
                ..EventFilter::default()
            },
            EventOrder::CreatedAtDesc,
        )
        .await?)
}

pub async fn list_categories(state: &AppState) -> EventResult<Vec<Category>> {
    Ok(state.store.list_categories().await?)
}

#[cfg(test)]
mod tests {
    use chrono::Datelike;

    use super::*;

    #[test]
    fn test_month_bounds() {
        let (start, end) = month_bounds(2026, 12).unwrap();
        assert_eq!(start.to_rfc3339(), "2026-12-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2027-01-01T00:00:00+00:00");
        assert_eq!(start.month(), 12);
    }

    #[test]
    fn test_month_bounds_rejects_bad_month() {
        assert!(matches!(
            month_bounds(2026, 13),
            Err(EventError::Validation(_))
        ));
        assert!(matches!(month_bounds(2026, 0), Err(EventError::Validation(_))));
    }
}
