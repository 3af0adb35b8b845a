// src/services/plates.rs
use log::info;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::error::Result;
use crate::services::feed::fetch_geojson;

pub const DEFAULT_PLATES_URL: &str =
    "https://raw.githubusercontent.com/fraxen/tectonicplates/master/GeoJSON/PB2002_boundaries.json";

/// Tectonic plate boundary document, fetched once and kept for the life of
/// the process. The contents are never inspected, only passed to the map.
pub struct PlateOverlay {
    url: String,
    doc: OnceCell<Arc<Value>>,
}

impl PlateOverlay {
    pub fn new(url: impl Into<String>) -> Self {
        PlateOverlay {
            url: url.into(),
            doc: OnceCell::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_loaded(&self) -> bool {
        self.doc.initialized()
    }

    /// A failed fetch leaves the cell empty so the next call tries again.
    pub async fn get(&self, client: &Client) -> Result<Arc<Value>> {
        let doc = self
            .doc
            .get_or_try_init(|| async {
                let doc = fetch_geojson(client, &self.url).await?;
                info!("Loaded plate boundaries from {}", self.url);
                Ok::<_, crate::error::QuakeError>(Arc::new(doc))
            })
            .await?;
        Ok(doc.clone())
    }
}
