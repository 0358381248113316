//! View Cache
//!
//! Redis cache for public, viewer-independent views: the upcoming approved
//! events, the venue list and calendar month dates. Entries hold store rows,
//! never profiles, and are masked per viewer after reading.
//!
//! The cache is best effort. Faults are logged and the caller falls back to
//! the store.

use chrono::{DateTime, Datelike, Utc};
use fred::prelude::*;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

/// Key for approved events starting now or later.
pub const UPCOMING_EVENTS_KEY: &str = "views:events:upcoming";

/// Key for the venue list.
pub const VENUES_KEY: &str = "views:venues";

/// Key for the event dates of one calendar month.
#[must_use]
pub fn calendar_key(year: i32, month: u32) -> String {
    format!("views:calendar:{year:04}-{month:02}")
}

/// Cache of rendered public views. Disabled when no Redis client is set.
#[derive(Clone)]
pub struct ViewCache {
    redis: Option<Client>,
    ttl: i64,
}

impl ViewCache {
    #[must_use]
    pub const fn new(redis: Client, ttl_seconds: i64) -> Self {
        Self {
            redis: Some(redis),
            ttl: ttl_seconds,
        }
    }

    /// A cache that never stores anything.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            redis: None,
            ttl: 0,
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.redis.is_some()
    }

    /// Read and decode a cached view. Misses and faults both return `None`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let redis = self.redis.as_ref()?;

        let raw: Option<String> = match redis.get(key).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, key, "View cache read failed");
                return None;
            }
        };

        match serde_json::from_str(&raw?) {
            Ok(value) => {
                debug!(key, "View cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(error = %e, key, "Discarding undecodable cached view");
                None
            }
        }
    }

    /// Store a view for the configured TTL.
    pub async fn put<T: Serialize>(&self, key: &str, value: &T) {
        let Some(redis) = self.redis.as_ref() else {
            return;
        };

        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, key, "Failed to encode view for cache");
                return;
            }
        };

        if let Err(e) = redis
            .set::<(), _, _>(key, json, Some(Expiration::EX(self.ttl)), None, false)
            .await
        {
            warn!(error = %e, key, "View cache write failed");
        }
    }

    /// Drop cached views.
    pub async fn invalidate(&self, keys: Vec<String>) {
        let Some(redis) = self.redis.as_ref() else {
            return;
        };
        if keys.is_empty() {
            return;
        }

        if let Err(e) = redis.del::<(), _>(keys.clone()).await {
            warn!(error = %e, ?keys, "View cache invalidation failed");
        }
    }

    /// Drop the event views touched by events on the given dates.
    pub async fn invalidate_events(&self, dates: &[DateTime<Utc>]) {
        self.invalidate(event_view_keys(dates)).await;
    }

    pub async fn invalidate_venues(&self) {
        self.invalidate(vec![VENUES_KEY.to_string()]).await;
    }
}

/// Upcoming list plus the calendar month of each date, without duplicates.
fn event_view_keys(dates: &[DateTime<Utc>]) -> Vec<String> {
    let mut keys = vec![UPCOMING_EVENTS_KEY.to_string()];
    for date in dates {
        let key = calendar_key(date.year(), date.month());
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    keys
}
