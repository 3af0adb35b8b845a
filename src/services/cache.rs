// src/services/cache.rs
use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::models::Snapshot;

pub const DEFAULT_TTL_SECS: i64 = 120;

/// Time-to-live memo of feed snapshots, keyed by source URL.
///
/// The lock is held while a fetch is in flight, so two callers never fetch
/// the same feed at once. Failed fetches leave the entry untouched.
pub struct SnapshotCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, Arc<Snapshot>>>,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        SnapshotCache {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached snapshot for `url` while it is younger than the TTL,
    /// otherwise run `fetch` and remember its result.
    pub async fn get_or_fetch<F, Fut>(&self, url: &str, now: DateTime<Utc>, fetch: F) -> Result<Arc<Snapshot>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Snapshot>>,
    {
        let mut entries = self.entries.lock().await;

        if let Some(snapshot) = entries.get(url) {
            let age = now - snapshot.fetched_at;
            if age < self.ttl {
                debug!("Cache hit for {} (age {}s)", url, age.num_seconds());
                return Ok(snapshot.clone());
            }
            info!("Cache expired for {} (age {}s), refetching", url, age.num_seconds());
        } else {
            info!("Cache empty for {}, fetching", url);
        }

        let snapshot = Arc::new(fetch().await?);
        entries.insert(url.to_string(), snapshot.clone());
        Ok(snapshot)
    }

    pub async fn age(&self, url: &str, now: DateTime<Utc>) -> Option<Duration> {
        self.entries.lock().await.get(url).map(|s| now - s.fetched_at)
    }

    pub async fn invalidate(&self, url: &str) -> bool {
        self.entries.lock().await.remove(url).is_some()
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        SnapshotCache::new(Duration::seconds(DEFAULT_TTL_SECS))
    }
}
