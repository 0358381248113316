//! Authentication Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

/// Failures from signup, sign-in, token handling and the `Caller` extractor.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password. Both look the same to the client.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The token's profile no longer exists.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Email already registered")]
    UserAlreadyExists,

    /// Bad signature, wrong token type, or a revoked session.
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    /// No bearer token on a route that needs one.
    #[error("Not authenticated")]
    MissingAuthHeader,

    #[error("Invalid authorization header format")]
    InvalidAuthHeader,

    /// Signup or sign-in body rejected.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Password processing failed")]
    PasswordHash,

    /// Store error. The message is the store's own text.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Misconfigured keys or a token that could not be signed.
    #[error("Internal server error")]
    Internal(String),
}

/// JSON error body shared by every API error type.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable error message.
    pub message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::UserAlreadyExists => (StatusCode::CONFLICT, "USER_EXISTS"),
            Self::InvalidToken => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
            Self::TokenExpired => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED"),
            Self::MissingAuthHeader => (StatusCode::UNAUTHORIZED, "NOT_AUTHENTICATED"),
            Self::InvalidAuthHeader => (StatusCode::UNAUTHORIZED, "INVALID_AUTH_HEADER"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::PasswordHash | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
            Self::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
        };

        let body = Json(ErrorResponse {
            error: code.to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;
