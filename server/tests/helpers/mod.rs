//! Reusable test helpers for HTTP integration tests.
//!
//! Provides `TestApp` for building and sending requests through the full axum
//! router over an in-memory store, plus utilities for seeding profiles and
//! events and for minting access tokens.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{self, Method, Request, Response};
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use http_body_util::BodyExt;
use parti_common::{EventStatus, Role, SubscriptionTier};
use parti_server::api::{create_router, AppState};
use parti_server::auth::jwt;
use parti_server::cache::ViewCache;
use parti_server::config::Config;
use parti_server::db::{Event, EventDraft, NewEvent, Profile};
use parti_server::store::{MemoryStore, Store};
use tower::ServiceExt;
use uuid::Uuid;

// ============================================================================
// Test App
// ============================================================================

/// A test application wrapping the full axum router.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub config: Arc<Config>,
}

impl TestApp {
    /// Create a new test app with an empty store and no view cache.
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let config = Config::default_for_test();

        let state = AppState::new(store.clone(), ViewCache::disabled(), config.clone());
        let router = create_router(state);

        Self {
            router,
            store,
            config: Arc::new(config),
        }
    }

    /// Build an HTTP request with the given method and URI.
    pub fn request(method: Method, uri: &str) -> http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    /// Send a request through the router via `tower::ServiceExt::oneshot`.
    pub async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot request failed")
    }

    /// Send a request, optionally with a bearer token and a JSON body.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let mut builder = Self::request(method, uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let req = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.oneshot(req).await
    }

    /// Create a profile with the given role and tier and return it with an
    /// access token.
    pub async fn seed_profile(&self, role: Role, tier: SubscriptionTier) -> (Profile, String) {
        let email = format!("test_{}@parti.life", &Uuid::new_v4().to_string()[..8]);
        let profile = self
            .store
            .create_account(&email, "not-a-real-hash", Some("Test Person"), Role::User)
            .await
            .expect("Failed to create test account");

        if role != Role::User {
            self.store
                .update_profile_role(profile.id, role)
                .await
                .expect("Failed to set role");
        }
        let profile = if tier == SubscriptionTier::Basic {
            self.store.get_profile(profile.id).await.unwrap().unwrap()
        } else {
            self.store
                .update_profile_tier(profile.id, tier)
                .await
                .expect("Failed to set tier")
                .unwrap()
        };

        let token = generate_access_token(&self.config, profile.id);
        (profile, token)
    }

    /// Insert an event directly, bypassing the access rules.
    pub async fn seed_event(
        &self,
        created_by: Uuid,
        status: EventStatus,
        min_tier_required: SubscriptionTier,
        date_time: DateTime<Utc>,
    ) -> Event {
        self.store
            .insert_event(NewEvent {
                draft: EventDraft {
                    title: "Sunset Session".to_string(),
                    description: Some("Rooftop DJ set".to_string()),
                    date_time,
                    location_name: "Playa de las Americas".to_string(),
                    image_url: None,
                    category_id: None,
                    min_tier_required,
                },
                created_by,
                status,
            })
            .await
            .expect("Failed to seed event")
    }
}

/// Generate an access token for the given profile.
pub fn generate_access_token(config: &Config, user_id: Uuid) -> String {
    let pair = jwt::generate_token_pair(
        user_id,
        &config.jwt_private_key,
        config.jwt_access_expiry,
        config.jwt_refresh_expiry,
    )
    .expect("Failed to generate token pair");
    pair.access_token
}

/// A start time `days` from now.
pub fn days_from_now(days: i64) -> DateTime<Utc> {
    Utc::now() + Duration::days(days)
}

/// JSON body for a create/edit event request.
pub fn event_body(title: &str, tier: &str) -> serde_json::Value {
    serde_json::json!({
        "title": title,
        "description": "Open air, late finish",
        "date_time": days_from_now(3),
        "location_name": "Los Cristianos",
        "min_tier_required": tier,
    })
}

/// Collect a response body and parse it as JSON.
pub async fn body_to_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect response body")
        .to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        let preview = String::from_utf8_lossy(&bytes);
        panic!("Failed to parse response as JSON: {e}\nBody: {preview}")
    })
}
