//! JWT issuance and validation.
//!
//! Tokens are signed with Ed25519 (EdDSA). The private key only signs; any
//! holder of the public key can verify.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{AuthError, AuthResult};

/// JWT claims for access and refresh tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account/profile id).
    pub sub: String,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    pub typ: TokenType,
    /// Session id; present on refresh tokens only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl Claims {
    /// The subject as an id.
    pub fn subject(&self) -> AuthResult<Uuid> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Token pair returned after signin, signup and refresh.
#[derive(Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub access_expires_in: i64,
    /// Refresh token `jti`, used as the session id.
    pub refresh_token_id: Uuid,
}

fn decode_pem_key(base64_key: &str) -> AuthResult<Vec<u8>> {
    STANDARD
        .decode(base64_key)
        .map_err(|_| AuthError::Internal("Invalid base64 in JWT key".to_string()))
}

/// Issue an access token and a refresh token for an account.
///
/// `private_key` is a base64-encoded Ed25519 PEM.
pub fn generate_token_pair(
    account_id: Uuid,
    private_key: &str,
    access_expiry_seconds: i64,
    refresh_expiry_seconds: i64,
) -> AuthResult<TokenPair> {
    let now = Utc::now();
    let refresh_token_id = Uuid::now_v7();

    let key_bytes = decode_pem_key(private_key)?;
    let encoding_key = EncodingKey::from_ed_pem(&key_bytes)
        .map_err(|e| AuthError::Internal(format!("Invalid Ed25519 private key: {e}")))?;
    let header = Header::new(Algorithm::EdDSA);

    let access_token = encode(
        &header,
        &Claims {
            sub: account_id.to_string(),
            exp: (now + Duration::seconds(access_expiry_seconds)).timestamp(),
            iat: now.timestamp(),
            typ: TokenType::Access,
            jti: None,
        },
        &encoding_key,
    )
    .map_err(|e| AuthError::Internal(format!("Token signing failed: {e}")))?;

    let refresh_token = encode(
        &header,
        &Claims {
            sub: account_id.to_string(),
            exp: (now + Duration::seconds(refresh_expiry_seconds)).timestamp(),
            iat: now.timestamp(),
            typ: TokenType::Refresh,
            jti: Some(refresh_token_id.to_string()),
        },
        &encoding_key,
    )
    .map_err(|e| AuthError::Internal(format!("Token signing failed: {e}")))?;

    Ok(TokenPair {
        access_token,
        refresh_token,
        access_expires_in: access_expiry_seconds,
        refresh_token_id,
    })
}

fn decode_claims(token: &str, public_key: &str, expected: TokenType) -> AuthResult<Claims> {
    let mut validation = Validation::new(Algorithm::EdDSA);
    validation.validate_exp = true;
    validation.leeway = 0;

    let key_bytes = decode_pem_key(public_key)?;
    let decoding_key = DecodingKey::from_ed_pem(&key_bytes)
        .map_err(|e| AuthError::Internal(format!("Invalid Ed25519 public key: {e}")))?;

    let claims = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        })?
        .claims;

    if claims.typ != expected {
        return Err(AuthError::InvalidToken);
    }
    Ok(claims)
}

/// Validate an access token. Refresh tokens are rejected.
pub fn validate_access_token(token: &str, public_key: &str) -> AuthResult<Claims> {
    decode_claims(token, public_key, TokenType::Access)
}

/// Validate a refresh token. Access tokens, and refresh tokens without a
/// `jti`, are rejected.
pub fn validate_refresh_token(token: &str, public_key: &str) -> AuthResult<Claims> {
    let claims = decode_claims(token, public_key, TokenType::Refresh)?;
    if claims.jti.is_none() {
        return Err(AuthError::InvalidToken);
    }
    Ok(claims)
}
