//! Venues
//!
//! Place metadata. Anyone may browse; only admins write.

mod handlers;
pub mod types;

use axum::{routing::get, Router};

use crate::api::AppState;

pub use types::{VenueError, VenueRequest, VenueResult};

/// Create the venues router (mounted under `/api/venues`).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_venues).post(handlers::create_venue))
        .route(
            "/{id}",
            get(handlers::get_venue)
                .put(handlers::update_venue)
                .delete(handlers::delete_venue),
        )
}
