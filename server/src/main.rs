//! parti.life Server - Main Entry Point

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use parti_server::{api, cache::ViewCache, config, db, store::PgStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parti_server=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting parti.life server"
    );

    // Initialize database
    let db_pool = db::create_pool(&config.database_url, config.database_max_connections).await?;
    db::run_migrations(&db_pool).await?;

    // View cache is optional; the server runs uncached without Redis
    let cache = match config.redis_url.as_deref() {
        Some(url) => match db::create_redis_client(url).await {
            Ok(client) => {
                info!(ttl = config.view_cache_ttl, "View cache enabled");
                ViewCache::new(client, config.view_cache_ttl)
            }
            Err(e) => {
                warn!("Redis connection failed: {}. View cache disabled.", e);
                ViewCache::disabled()
            }
        },
        None => {
            info!("REDIS_URL not set, view cache disabled");
            ViewCache::disabled()
        }
    };

    // Build application state
    let store = Arc::new(PgStore::new(db_pool));
    let state = api::AppState::new(store, cache, config.clone());

    // Build router
    let app = api::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(address = %config.bind_address, "Server listening");

    // Graceful shutdown handler
    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Received shutdown signal, cleaning up...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server shutdown complete");

    Ok(())
}
