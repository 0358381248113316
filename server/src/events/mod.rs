//! Events
//!
//! Public listings and calendar, agent submissions, and admin moderation.

mod handlers;
pub mod service;
pub mod types;

use axum::{
    routing::{get, post},
    Router,
};

use crate::api::AppState;

pub use service::{resolve_viewer, Moderation};
pub use types::{EventError, EventRequest, EventResult};

/// Create the events router (mounted under `/api`).
///
/// Anonymous callers may read; every write goes through the access rules.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/events",
            get(handlers::list_events).post(handlers::create_event),
        )
        .route("/events/calendar", get(handlers::calendar))
        .route("/events/range", get(handlers::range))
        .route(
            "/events/{id}",
            get(handlers::get_event)
                .put(handlers::update_event)
                .delete(handlers::delete_event),
        )
        .route("/events/{id}/approve", post(handlers::approve_event))
        .route("/events/{id}/reject", post(handlers::reject_event))
        .route("/categories", get(handlers::list_categories))
        .route("/me/events", get(handlers::my_events))
}
