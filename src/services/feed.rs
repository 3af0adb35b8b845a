// src/services/feed.rs
use log::{debug, info};
use reqwest::Client;
use serde_json::Value;

use crate::error::{QuakeError, Result};

pub const DEFAULT_FEED_URL: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_month.geojson";

/// Parsed feed body: the raw `features` list, not yet validated per feature.
#[derive(Debug, Clone)]
pub struct FeedDocument {
    pub features: Vec<Value>,
}

impl FeedDocument {
    /// Checks the top-level shape of an already-parsed document.
    pub fn from_value(doc: Value) -> Result<Self> {
        match doc {
            Value::Object(mut map) => match map.remove("features") {
                Some(Value::Array(features)) => Ok(FeedDocument { features }),
                Some(_) => Err(QuakeError::Format("'features' is not a list".into())),
                None => Err(QuakeError::Format("document has no 'features' list".into())),
            },
            _ => Err(QuakeError::Format("document is not a JSON object".into())),
        }
    }

    pub fn parse(body: &str) -> Result<Self> {
        let doc: Value = serde_json::from_str(body)?;
        Self::from_value(doc)
    }
}

/// GET a URL and return its body parsed as JSON, without shape checks.
pub async fn fetch_geojson(client: &Client, url: &str) -> Result<Value> {
    info!("Fetching GeoJSON from URL: {}", url);
    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    debug!("Received {} bytes from {}", body.len(), url);
    Ok(serde_json::from_str(&body)?)
}

/// Fetch the earthquake feed and return its feature list.
pub async fn fetch_feed(client: &Client, url: &str) -> Result<FeedDocument> {
    let doc = FeedDocument::from_value(fetch_geojson(client, url).await?)?;
    info!("Feed returned {} features", doc.features.len());
    Ok(doc)
}
