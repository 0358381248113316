//! Database Layer
//!
//! `PostgreSQL` pool setup and the embedded schema migrations under
//! `server/migrations`. Also opens the Redis connection behind the view
//! cache; Redis never holds authoritative data.

mod models;
mod queries;

#[cfg(test)]
mod tests;

use std::time::Duration;

use anyhow::Result;
pub use models::*;
pub use queries::*;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Pool size used when `DATABASE_MAX_CONNECTIONS` is unset.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 20;

/// Connections kept open while the server is idle.
const WARM_CONNECTIONS: u32 = 2;

fn pool_options(max_connections: u32) -> PgPoolOptions {
    let max_connections = max_connections.max(1);
    PgPoolOptions::new()
        .max_connections(max_connections)
        // A one-connection pool (promote-admin) keeps nothing warm
        .min_connections(WARM_CONNECTIONS.min(max_connections - 1))
        // Moderation and listing requests fail fast with STORE_ERROR
        // instead of queueing behind a saturated pool
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(600))
        // Every access decision re-reads the caller's profile, so a dead
        // connection would turn into a spurious 500
        .test_before_acquire(true)
}

/// Connect to `PostgreSQL` with at most `max_connections` connections.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = pool_options(max_connections).connect(database_url).await?;

    info!(max_connections, "Connected to PostgreSQL");
    Ok(pool)
}

/// Apply pending migrations. Safe to run on every start.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations completed");
    Ok(())
}

/// Connect the Redis client used by the view cache.
pub async fn create_redis_client(redis_url: &str) -> Result<fred::clients::Client> {
    use fred::prelude::*;

    let config = Config::from_url(redis_url)?;
    let client = Client::new(config, None, None, None);
    client.connect();
    client.wait_for_connect().await?;

    info!("Connected to Redis");
    Ok(client)
}

#[cfg(test)]
mod pool_tests {
    use super::*;

    #[test]
    fn test_server_pool_keeps_connections_warm() {
        let options = pool_options(DEFAULT_MAX_CONNECTIONS);
        assert_eq!(options.get_max_connections(), 20);
        assert_eq!(options.get_min_connections(), 2);
        assert_eq!(options.get_acquire_timeout(), Duration::from_secs(5));
        assert!(options.get_test_before_acquire());
    }

    #[test]
    fn test_single_connection_pool() {
        let options = pool_options(1);
        assert_eq!(options.get_max_connections(), 1);
        assert_eq!(options.get_min_connections(), 0);

        // Zero is treated as one
        assert_eq!(pool_options(0).get_max_connections(), 1);
    }
}
