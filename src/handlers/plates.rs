// src/handlers/plates.rs
use log::{error, info};
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::services::pipeline::Dashboard;

pub async fn get_plates(dashboard: Arc<Dashboard>) -> Result<Json, Rejection> {
    info!("Handling request for plate boundaries");
    let doc = dashboard.plates().await.map_err(|e| {
        error!("Failed to load plate boundaries: {}", e);
        warp::reject::custom(ApiError::from(e))
    })?;
    Ok(warp::reply::json(doc.as_ref()))
}
