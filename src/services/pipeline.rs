// src/services/pipeline.rs
use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::{debug, info, warn};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::{QuakeError, Result};
use crate::models::{DailyAggregate, EarthquakeEvent, FeedSummary, Snapshot};
use crate::services::aggregate::daily_aggregates;
use crate::services::cache::{SnapshotCache, DEFAULT_TTL_SECS};
use crate::services::feed::fetch_feed;
use crate::services::normalizer::normalize;
use crate::services::plates::PlateOverlay;
use crate::services::summary::summarize;
use crate::services::window::TimeWindow;

/// Everything a request needs: config, HTTP client, the snapshot cache and
/// the plate overlay. Shared behind an `Arc` by the routes.
pub struct Dashboard {
    pub config: AppConfig,
    client: Client,
    cache: SnapshotCache,
    plates: PlateOverlay,
}

/// Filtered events of one request plus what was derived from them.
#[derive(Debug, Clone, Serialize)]
pub struct Selection {
    pub window: TimeWindow,
    pub fetched_at: DateTime<Utc>,
    pub summary: FeedSummary,
    pub daily: Vec<DailyAggregate>,
    pub events: Vec<EarthquakeEvent>,
}

impl Dashboard {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| QuakeError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(config, client))
    }

    /// A TTL that is not positive or does not fit a `Duration` falls back to
    /// the default; `AppConfig::from_lookup` already rejects those.
    pub fn with_client(config: AppConfig, client: Client) -> Self {
        let ttl = Some(config.cache_ttl_secs)
            .filter(|secs| *secs > 0)
            .and_then(Duration::try_seconds)
            .unwrap_or_else(|| {
                warn!(
                    "Unusable cache TTL {}s, using {}s",
                    config.cache_ttl_secs, DEFAULT_TTL_SECS
                );
                Duration::seconds(DEFAULT_TTL_SECS)
            });
        let cache = SnapshotCache::new(ttl);
        let plates = PlateOverlay::new(config.plates_url.clone());
        info!(
            "Dashboard ready: feed cached for {}s, plates from {}",
            cache.ttl().num_seconds(),
            plates.url()
        );
        Dashboard {
            config,
            client,
            cache,
            plates,
        }
    }

    /// Fetch and normalize the feed, bypassing the cache.
    pub async fn load_snapshot(&self) -> Result<Snapshot> {
        let url = &self.config.feed_url;
        let doc = fetch_feed(&self.client, url).await?;
        let events = normalize(&doc.features, self.config.timezone, self.config.malformed_policy)?;
        info!("Snapshot of {} events from {}", events.len(), url);
        Ok(Snapshot {
            source_url: url.clone(),
            fetched_at: Utc::now(),
            timezone: self.config.timezone,
            events,
        })
    }

    /// The current snapshot, served from cache while it is fresh.
    pub async fn snapshot(&self) -> Result<Arc<Snapshot>> {
        self.cache
            .get_or_fetch(&self.config.feed_url, Utc::now(), || self.load_snapshot())
            .await
    }

    /// Resolve optional query dates to a validated window. Missing dates
    /// default to the edges of the allowed range.
    pub fn window(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<TimeWindow> {
        let today = self.config.today();
        let bounds = self.config.bounds_on(today);
        let start = start.unwrap_or(bounds.min_date);
        let end = end.unwrap_or_else(|| bounds.upper(today));
        bounds.window(start, end, today, self.config.timezone)
    }

    /// Validate the window before touching the feed, then filter and aggregate.
    pub async fn select(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Selection> {
        let window = self.window(start, end)?;
        let snapshot = self.snapshot().await?;
        let selection = select_from(&snapshot, window);
        debug!(
            "Selected {} of {} events across {} days",
            selection.events.len(),
            snapshot.events.len(),
            selection.daily.len()
        );
        Ok(selection)
    }

    pub async fn plates(&self) -> Result<Arc<Value>> {
        self.plates.get(&self.client).await
    }
}

/// Filter a snapshot with an already validated window.
pub fn select_from(snapshot: &Snapshot, window: TimeWindow) -> Selection {
    let events = window.filter(&snapshot.events);
    Selection {
        summary: summarize(&events),
        daily: daily_aggregates(&events),
        fetched_at: snapshot.fetched_at,
        window,
        events,
    }
}
