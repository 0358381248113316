//! API Router and Application State
//!
//! Central routing configuration and shared state.

use std::sync::Arc;

use axum::{
    extract::State, http::HeaderValue, middleware::from_fn_with_state, routing::get, Json,
    Router,
};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    admin, auth, cache::ViewCache, config::Config, events, permissions::AccessControl,
    store::Store, venues,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Persistent record store
    pub store: Arc<dyn Store>,
    /// Public view cache (may be disabled)
    pub cache: ViewCache,
    /// Rule table for guarded actions
    pub access: Arc<AccessControl>,
    /// Server configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state with the standard rule table.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, cache: ViewCache, config: Config) -> Self {
        Self {
            store,
            cache,
            access: Arc::new(AccessControl::default()),
            config: Arc::new(config),
        }
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(origin) => Some(origin),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    // Anonymous callers are allowed; handlers pass `Caller` to the access
    // checks, which reject what needs a profile.
    let api_routes = Router::new()
        .merge(events::router())
        .nest("/venues", venues::router())
        .nest("/admin", admin::router())
        .layer(from_fn_with_state(state.clone(), auth::identify_caller));

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Auth routes (pass state for middleware)
        .nest("/auth", auth::router(state.clone()))
        .nest("/api", api_routes)
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        // State
        .with_state(state)
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    /// Service status
    status: &'static str,
    /// Whether the Redis view cache is enabled
    view_cache: bool,
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        view_cache: state.cache.is_enabled(),
    })
}
