// src/handlers/earthquakes.rs
use chrono::NaiveDate;
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::models::FeedSummary;
use crate::services::pipeline::{Dashboard, Selection};
use crate::services::window::TimeWindow;

/// `?start=YYYY-MM-DD&end=YYYY-MM-DD`, both optional.
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Serialize)]
struct SummaryResponse<'a> {
    window: &'a TimeWindow,
    summary: &'a FeedSummary,
}

async fn run_selection(dashboard: &Dashboard, query: &DateRangeQuery) -> Result<Selection, Rejection> {
    dashboard.select(query.start, query.end).await.map_err(|e| {
        error!("Failed to select earthquakes for {:?}: {}", query, e);
        warp::reject::custom(ApiError::from(e))
    })
}

pub async fn get_earthquakes(query: DateRangeQuery, dashboard: Arc<Dashboard>) -> Result<Json, Rejection> {
    info!("Handling request for earthquakes {:?}", query);
    let selection = run_selection(&dashboard, &query).await?;
    Ok(warp::reply::json(&selection.events))
}

pub async fn get_daily(query: DateRangeQuery, dashboard: Arc<Dashboard>) -> Result<Json, Rejection> {
    info!("Handling request for daily aggregates {:?}", query);
    let selection = run_selection(&dashboard, &query).await?;
    Ok(warp::reply::json(&selection.daily))
}

pub async fn get_summary(query: DateRangeQuery, dashboard: Arc<Dashboard>) -> Result<Json, Rejection> {
    info!("Handling request for summary {:?}", query);
    let selection = run_selection(&dashboard, &query).await?;
    Ok(warp::reply::json(&SummaryResponse {
        window: &selection.window,
        summary: &selection.summary,
    }))
}

pub async fn get_dashboard(query: DateRangeQuery, dashboard: Arc<Dashboard>) -> Result<Json, Rejection> {
    info!("Handling dashboard request {:?}", query);
    let selection = run_selection(&dashboard, &query).await?;
    if selection.events.is_empty() {
        info!("No earthquakes in {} ..= {}", selection.window.start_date, selection.window.end_date);
    }
    Ok(warp::reply::json(&selection))
}

pub async fn get_health() -> Result<Json, Rejection> {
    Ok(warp::reply::json(&json!({ "status": "ok" })))
}
