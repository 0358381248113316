//! HTTP Integration Tests for Admin Endpoints
//!
//! Moderation queue, profile listing, role and tier changes under
//! `/api/admin`, and privilege changes taking effect without a new token.
//!
//! Run with: `cargo test --test admin_http_test -- --nocapture`

mod helpers;

use axum::http::Method;
use helpers::{body_to_json, days_from_now, TestApp};
use parti_common::{EventStatus, Role, SubscriptionTier};
use parti_server::store::Store;
use serde_json::json;
use uuid::Uuid;

// ============================================================================
// Access Control Tests
// ============================================================================

#[tokio::test]
async fn test_admin_routes_reject_non_admins() {
    let app = TestApp::new();
    let (target, _) = app.seed_profile(Role::User, SubscriptionTier::Basic).await;
    let (_, agent_token) = app.seed_profile(Role::Agent, SubscriptionTier::Vip).await;

    let role_uri = format!("/api/admin/profiles/{}/role", target.id);
    let tier_uri = format!("/api/admin/profiles/{}/tier", target.id);
    let cases = [
        (Method::GET, "/api/admin/events/pending", None),
        (Method::GET, "/api/admin/profiles", None),
        (Method::PUT, role_uri.as_str(), Some(json!({ "role": "admin" }))),
        (Method::PUT, tier_uri.as_str(), Some(json!({ "tier": "vip" }))),
    ];

    for (method, uri, body) in cases {
        let resp = app
            .send(method.clone(), uri, Some(&agent_token), body.clone())
            .await;
        assert_eq!(resp.status(), 403, "{method} {uri} as agent");

        let resp = app.send(method.clone(), uri, None, body).await;
        assert_eq!(resp.status(), 401, "{method} {uri} anonymous");
    }

    let stored = app.store.get_profile(target.id).await.unwrap().unwrap();
    assert_eq!(stored.role, Role::User);
    assert_eq!(stored.subscription_tier, SubscriptionTier::Basic);
}

#[tokio::test]
async fn test_admin_status() {
    let app = TestApp::new();
    let (_, user_token) = app.seed_profile(Role::User, SubscriptionTier::Basic).await;
    let (_, admin_token) = app.seed_profile(Role::Admin, SubscriptionTier::Basic).await;

    let json = body_to_json(
        app.send(Method::GET, "/api/admin/status", Some(&user_token), None)
            .await,
    )
    .await;
    assert_eq!(json["is_admin"], false);

    let json = body_to_json(
        app.send(Method::GET, "/api/admin/status", Some(&admin_token), None)
            .await,
    )
    .await;
    assert_eq!(json["is_admin"], true);

    let resp = app.send(Method::GET, "/api/admin/status", None, None).await;
    assert_eq!(resp.status(), 401);
}

// ============================================================================
// Moderation queue
// ============================================================================

#[tokio::test]
async fn test_pending_queue_oldest_first_with_names() {
    let app = TestApp::new();
    let (agent, _) = app.seed_profile(Role::Agent, SubscriptionTier::Basic).await;
    let (_, admin_token) = app.seed_profile(Role::Admin, SubscriptionTier::Basic).await;

    let first = app
        .seed_event(agent.id, EventStatus::Pending, SubscriptionTier::Basic, days_from_now(9))
        .await;
    app.seed_event(agent.id, EventStatus::Approved, SubscriptionTier::Basic, days_from_now(3))
        .await;
    let second = app
        .seed_event(agent.id, EventStatus::Pending, SubscriptionTier::Vip, days_from_now(1))
        .await;

    let resp = app
        .send(Method::GET, "/api/admin/events/pending", Some(&admin_token), None)
        .await;
    assert_eq!(resp.status(), 200);
    let json = body_to_json(resp).await;
    let queue = json.as_array().unwrap();
    assert_eq!(queue.len(), 2);
    assert_eq!(queue[0]["id"], first.id.to_string());
    assert_eq!(queue[1]["id"], second.id.to_string());
    assert_eq!(queue[0]["creator_name"], "Test Person");
    assert_eq!(queue[0]["status"], "pending");
}

// ============================================================================
// Profiles
// ============================================================================

#[tokio::test]
async fn test_list_profiles() {
    let app = TestApp::new();
    app.seed_profile(Role::User, SubscriptionTier::Basic).await;
    app.seed_profile(Role::Agent, SubscriptionTier::Vip).await;
    let (_, admin_token) = app.seed_profile(Role::Admin, SubscriptionTier::Basic).await;

    let resp = app
        .send(Method::GET, "/api/admin/profiles", Some(&admin_token), None)
        .await;
    assert_eq!(resp.status(), 200);
    assert_eq!(body_to_json(resp).await.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_promotion_takes_effect_on_next_request() {
    let app = TestApp::new();
    let (agent, agent_token) = app.seed_profile(Role::Agent, SubscriptionTier::Basic).await;
    let (_, admin_token) = app.seed_profile(Role::Admin, SubscriptionTier::Basic).await;
    let event = app
        .seed_event(agent.id, EventStatus::Pending, SubscriptionTier::Basic, days_from_now(2))
        .await;
    let approve_uri = format!("/api/events/{}/approve", event.id);

    let resp = app
        .send(Method::POST, &approve_uri, Some(&agent_token), None)
        .await;
    assert_eq!(resp.status(), 403);

    let resp = app
        .send(
            Method::PUT,
            &format!("/api/admin/profiles/{}/role", agent.id),
            Some(&admin_token),
            Some(json!({ "role": "admin" })),
        )
        .await;
    assert_eq!(resp.status(), 200);
    assert_eq!(body_to_json(resp).await["role"], "admin");

    // Same token, fresh role
    let resp = app
        .send(Method::POST, &approve_uri, Some(&agent_token), None)
        .await;
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_tier_upgrade_unlocks_vip_event() {
    let app = TestApp::new();
    let (agent, _) = app.seed_profile(Role::Agent, SubscriptionTier::Basic).await;
    let (user, user_token) = app.seed_profile(Role::User, SubscriptionTier::Basic).await;
    let (_, admin_token) = app.seed_profile(Role::Admin, SubscriptionTier::Basic).await;
    let event = app
        .seed_event(agent.id, EventStatus::Approved, SubscriptionTier::Vip, days_from_now(2))
        .await;
    let uri = format!("/api/events/{}", event.id);

    let before = body_to_json(app.send(Method::GET, &uri, Some(&user_token), None).await).await;
    assert_eq!(before["locked"], true);

    let resp = app
        .send(
            Method::PUT,
            &format!("/api/admin/profiles/{}/tier", user.id),
            Some(&admin_token),
            Some(json!({ "tier": "vip" })),
        )
        .await;
    assert_eq!(resp.status(), 200);
    assert_eq!(body_to_json(resp).await["subscription_tier"], "vip");

    let after = body_to_json(app.send(Method::GET, &uri, Some(&user_token), None).await).await;
    assert!(after.get("locked").is_none());
    assert_eq!(after["location_name"], "Playa de las Americas");
}

#[tokio::test]
async fn test_unknown_role_or_tier_rejected() {
    let app = TestApp::new();
    let (user, _) = app.seed_profile(Role::User, SubscriptionTier::Basic).await;
    let (_, admin_token) = app.seed_profile(Role::Admin, SubscriptionTier::Basic).await;

    let resp = app
        .send(
            Method::PUT,
            &format!("/api/admin/profiles/{}/role", user.id),
            Some(&admin_token),
            Some(json!({ "role": "superuser" })),
        )
        .await;
    assert_eq!(resp.status(), 400);
    assert_eq!(body_to_json(resp).await["error"], "VALIDATION_ERROR");

    let resp = app
        .send(
            Method::PUT,
            &format!("/api/admin/profiles/{}/tier", user.id),
            Some(&admin_token),
            Some(json!({ "tier": "platinum" })),
        )
        .await;
    assert_eq!(resp.status(), 400);

    let stored = app.store.get_profile(user.id).await.unwrap().unwrap();
    assert_eq!(stored.role, Role::User);
    assert_eq!(stored.subscription_tier, SubscriptionTier::Basic);
}

#[tokio::test]
async fn test_set_role_unknown_profile() {
    let app = TestApp::new();
    let (_, admin_token) = app.seed_profile(Role::Admin, SubscriptionTier::Basic).await;

    let resp = app
        .send(
            Method::PUT,
            &format!("/api/admin/profiles/{}/role", Uuid::now_v7()),
            Some(&admin_token),
            Some(json!({ "role": "agent" })),
        )
        .await;
    assert_eq!(resp.status(), 404);
}
