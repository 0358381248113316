//! Admin Module
//!
//! Moderation queue and profile management:
//! - Admin only: pending events, profile list, role and tier changes
//! - Any signed-in caller: `/status`

pub mod handlers;
pub mod types;

use axum::{
    routing::{get, put},
    Router,
};

use crate::api::AppState;

pub use types::{AdminError, AdminResult};

/// Create the admin router (mounted under `/api/admin`).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(handlers::get_admin_status))
        .route("/events/pending", get(handlers::pending_events))
        .route("/profiles", get(handlers::list_profiles))
        .route("/profiles/{id}/role", put(handlers::set_role))
        .route("/profiles/{id}/tier", put(handlers::set_tier))
}
