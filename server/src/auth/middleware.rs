//! Caller identification.
//!
//! [`identify_caller`] runs on every API route and records who is calling,
//! if anyone. [`require_auth`] additionally rejects requests without a valid
//! access token.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::api::AppState;

use super::error::{AuthError, AuthResult};
use super::jwt::validate_access_token;

/// The calling identity, `None` for anonymous requests.
///
/// Extracting it never fails: without [`identify_caller`] in front of the
/// route it is anonymous.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Caller(pub Option<Uuid>);

/// An authenticated caller. Only available behind [`require_auth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
}

/// Read the bearer token from the headers and validate it.
fn bearer_identity(headers: &HeaderMap, public_key: &str) -> AuthResult<Uuid> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingAuthHeader)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)?;

    validate_access_token(token, public_key)?.subject()
}

/// Insert [`Caller`] for every request. Invalid tokens are treated as
/// anonymous.
pub async fn identify_caller(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let caller = match bearer_identity(request.headers(), &state.config.jwt_public_key) {
        Ok(id) => Some(id),
        Err(AuthError::MissingAuthHeader) => None,
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring invalid bearer token");
            None
        }
    };

    request.extensions_mut().insert(Caller(caller));
    next.run(request).await
}

/// Middleware to require authentication.
///
/// Validates the bearer token and injects [`AuthUser`] (and [`Caller`]).
/// The profile is not loaded here; access checks re-read it.
///
/// # Usage
///
/// ```ignore
/// Router::new()
///     .route("/protected", get(handler))
///     .layer(axum::middleware::from_fn_with_state(state, require_auth))
/// ```
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let id = bearer_identity(request.headers(), &state.config.jwt_public_key)?;

    request.extensions_mut().insert(AuthUser { id });
    request.extensions_mut().insert(Caller(Some(id)));

    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Self>().copied().unwrap_or_default())
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .copied()
            .ok_or(AuthError::MissingAuthHeader)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;
    use crate::auth::jwt::generate_token_pair;
    use crate::config::Config;

    #[test]
    fn test_bearer_identity() {
        let config = Config::default_for_test();
        let id = Uuid::now_v7();
        let tokens = generate_token_pair(id, &config.jwt_private_key, 900, 604_800).unwrap();

        let mut headers = HeaderMap::new();
        assert!(matches!(
            bearer_identity(&headers, &config.jwt_public_key),
            Err(AuthError::MissingAuthHeader)
        ));

        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&tokens.access_token).unwrap(),
        );
        assert!(matches!(
            bearer_identity(&headers, &config.jwt_public_key),
            Err(AuthError::InvalidAuthHeader)
        ));

        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", tokens.access_token)).unwrap(),
        );
        assert_eq!(
            bearer_identity(&headers, &config.jwt_public_key).unwrap(),
            id
        );
    }
}
