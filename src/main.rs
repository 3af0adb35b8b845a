use dotenv::dotenv;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::Filter;

use quake_dashboard::config::AppConfig;
use quake_dashboard::routes;
use quake_dashboard::services::pipeline::Dashboard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();
    info!("Logger initialized. Starting the application...");

    let config = AppConfig::from_env()?;

    // Bind to 0.0.0.0 so the container's port mapping works
    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    info!("Will bind to: {}", addr);

    let dashboard = Arc::new(Dashboard::new(config)?);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET"]);

    let api = routes::routes(dashboard).with(cors);
    info!("Routes configured successfully with CORS.");

    info!("Starting server on {}", addr);
    warp::serve(api).run(addr).await;
    Ok(())
}
