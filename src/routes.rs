// src/routes.rs
use std::convert::Infallible;
use std::sync::Arc;
use log::info;
use warp::http::StatusCode;
use warp::reject::Rejection;
use warp::{Filter, Reply};

use crate::handlers::earthquakes::{get_daily, get_dashboard, get_earthquakes, get_health, get_summary, DateRangeQuery};
use crate::handlers::error::ApiError;
use crate::handlers::plates::get_plates;
use crate::services::pipeline::Dashboard;

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message: String;

    if err.is_not_found() {
        code = StatusCode::NOT_FOUND;
        message = "Not Found".into();
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status;
        message = api_error.message.clone();
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        code = StatusCode::BAD_REQUEST;
        message = format!("Invalid query: {}", e);
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = StatusCode::METHOD_NOT_ALLOWED;
        message = "Method Not Allowed".into();
    } else {
        code = StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".into();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes(dashboard: Arc<Dashboard>) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let dashboard_filter = warp::any().map(move || dashboard.clone());
    let range = warp::query::<DateRangeQuery>();

    let earthquakes_route = warp::path!("api" / "v1" / "earthquakes")
        .and(warp::get())
        .and(range.clone())
        .and(dashboard_filter.clone())
        .and_then(get_earthquakes);

    let daily_route = warp::path!("api" / "v1" / "earthquakes" / "daily")
        .and(warp::get())
        .and(range.clone())
        .and(dashboard_filter.clone())
        .and_then(get_daily);

    let summary_route = warp::path!("api" / "v1" / "earthquakes" / "summary")
        .and(warp::get())
        .and(range.clone())
        .and(dashboard_filter.clone())
        .and_then(get_summary);

    let dashboard_route = warp::path!("api" / "v1" / "dashboard")
        .and(warp::get())
        .and(range)
        .and(dashboard_filter.clone())
        .and_then(get_dashboard);

    let plates_route = warp::path!("api" / "v1" / "plates")
        .and(warp::get())
        .and(dashboard_filter)
        .and_then(get_plates);

    let health_route = warp::path!("api" / "v1" / "health")
        .and(warp::get())
        .and_then(get_health);

    info!("All routes configured successfully.");

    earthquakes_route
        .or(daily_route)
        .or(summary_route)
        .or(dashboard_route)
        .or(plates_route)
        .or(health_route)
        .recover(handle_rejection)
}
