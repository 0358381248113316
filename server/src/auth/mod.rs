//! Authentication Service
//!
//! Email/password accounts, JWT sessions, and caller identification.

mod error;
mod handlers;
pub mod jwt;
mod middleware;
mod password;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use sha2::{Digest, Sha256};

use crate::api::AppState;

pub use error::{AuthError, AuthResult, ErrorResponse};
pub use handlers::AuthResponse;
pub use middleware::{identify_caller, require_auth, AuthUser, Caller};
pub use password::{hash_password, verify_password};

/// Hex SHA-256 of a refresh token, as stored in the sessions table.
#[must_use]
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Create authentication router.
///
/// Public routes:
/// - POST /signup - Create an account (role user or agent)
/// - POST /signin - Sign in with email/password
/// - POST /refresh - Rotate a refresh token
///
/// Protected routes (auth required):
/// - POST /signout - Invalidate a session
/// - GET /me - Current profile
pub fn router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/signup", post(handlers::signup))
        .route("/signin", post(handlers::signin))
        .route("/refresh", post(handlers::refresh));

    let protected_routes = Router::new()
        .route("/signout", post(handlers::signout))
        .route("/me", get(handlers::me))
        .layer(axum_middleware::from_fn_with_state(state, require_auth));

    public_routes.merge(protected_routes)
}
