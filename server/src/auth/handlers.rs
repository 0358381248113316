//! Authentication HTTP Handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};
use parti_common::{ProfileSummary, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::error::{AuthError, AuthResult};
use super::hash_token;
use super::jwt::{generate_token_pair, validate_refresh_token};
use super::middleware::AuthUser;
use super::password::{hash_password, verify_password};
use crate::api::AppState;
use crate::store::StoreError;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Signup request.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email)]
    pub email: String,
    /// Password (8-128 characters).
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(max = 100))]
    pub full_name: Option<String>,
    /// `user` or `agent`; defaults to `user`.
    #[serde(default)]
    pub role: Role,
}

/// Signin request.
#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// Token refresh request.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Signout request.
#[derive(Debug, Deserialize)]
pub struct SignoutRequest {
    /// Refresh token to invalidate.
    pub refresh_token: String,
}

/// Authentication response with tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token expiry in seconds.
    pub expires_in: i64,
    /// Always "Bearer".
    pub token_type: String,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Issue a token pair and record its refresh session.
async fn start_session(state: &AppState, account_id: Uuid) -> AuthResult<AuthResponse> {
    let tokens = generate_token_pair(
        account_id,
        &state.config.jwt_private_key,
        state.config.jwt_access_expiry,
        state.config.jwt_refresh_expiry,
    )?;

    let token_hash = hash_token(&tokens.refresh_token);
    let expires_at = Utc::now() + Duration::seconds(state.config.jwt_refresh_expiry);
    state
        .store
        .insert_session(tokens.refresh_token_id, account_id, &token_hash, expires_at)
        .await?;

    Ok(AuthResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.access_expires_in,
        token_type: "Bearer".to_string(),
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// Create an account and its profile, then sign in.
///
/// The chosen role must be `user` or `agent`; admin is granted only by
/// another admin.
///
/// POST /auth/signup
#[tracing::instrument(skip(state, body), fields(role = %body.role))]
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> AuthResult<(StatusCode, Json<AuthResponse>)> {
    body.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    if !body.role.is_self_assignable() {
        return Err(AuthError::Validation(format!(
            "role: {} cannot be chosen at signup",
            body.role
        )));
    }

    let password_hash = hash_password(&body.password).map_err(|_| AuthError::PasswordHash)?;
    let full_name = body
        .full_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let profile = state
        .store
        .create_account(&body.email, &password_hash, full_name, body.role)
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Store(other),
        })?;

    let response = start_session(&state, profile.id).await?;

    tracing::info!(user_id = %profile.id, role = %profile.role, "Account created");

    Ok((StatusCode::CREATED, Json(response)))
}

/// Sign in with email and password.
///
/// POST /auth/signin
#[tracing::instrument(skip(state, body))]
pub async fn signin(
    State(state): State<AppState>,
    Json(body): Json<SigninRequest>,
) -> AuthResult<Json<AuthResponse>> {
    let account = state
        .store
        .find_account_by_email(&body.email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let valid = verify_password(&body.password, &account.password_hash)
        .map_err(|_| AuthError::PasswordHash)?;
    if !valid {
        tracing::warn!(user_id = %account.id, "Failed sign-in");
        return Err(AuthError::InvalidCredentials);
    }

    let response = start_session(&state, account.id).await?;

    tracing::info!(user_id = %account.id, "User signed in");

    Ok(Json(response))
}

/// Exchange a refresh token for a new pair. The old session is deleted.
///
/// POST /auth/refresh
#[tracing::instrument(skip(state, body))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> AuthResult<Json<AuthResponse>> {
    let claims = validate_refresh_token(&body.refresh_token, &state.config.jwt_public_key)?;
    let account_id = claims.subject()?;

    let token_hash = hash_token(&body.refresh_token);
    let session = state
        .store
        .find_session_by_token_hash(&token_hash)
        .await?
        .ok_or(AuthError::InvalidToken)?;

    if session.account_id != account_id {
        return Err(AuthError::InvalidToken);
    }

    if state.store.get_profile(account_id).await?.is_none() {
        return Err(AuthError::InvalidToken);
    }

    // Rotation: a refresh token works once
    state.store.delete_session_by_token_hash(&token_hash).await?;
    let response = start_session(&state, account_id).await?;

    tracing::info!(user_id = %account_id, "Token refreshed");

    Ok(Json(response))
}

/// Invalidate a session.
///
/// POST /auth/signout
#[tracing::instrument(skip(state, body), fields(user_id = %auth_user.id))]
pub async fn signout(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(body): Json<SignoutRequest>,
) -> AuthResult<StatusCode> {
    let token_hash = hash_token(&body.refresh_token);

    // Only the session's owner may end it
    if let Some(session) = state.store.find_session_by_token_hash(&token_hash).await? {
        if session.account_id == auth_user.id {
            state.store.delete_session_by_token_hash(&token_hash).await?;
        }
    }

    tracing::info!(user_id = %auth_user.id, "User signed out");

    Ok(StatusCode::NO_CONTENT)
}

/// Current caller's profile, read fresh from the store.
///
/// GET /auth/me
#[tracing::instrument(skip(state), fields(user_id = %auth_user.id))]
pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AuthResult<Json<ProfileSummary>> {
    let profile = state
        .store
        .get_profile(auth_user.id)
        .await?
        .ok_or_else(|| AuthError::NotFound("profile".to_string()))?;

    Ok(Json(profile.into()))
}
