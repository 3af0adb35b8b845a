// src/bin/fetch_quakes.rs
// One-shot run of the feed pipeline: `fetch_quakes [START [END]]`, dates as YYYY-MM-DD.
use anyhow::Context;
use chrono::NaiveDate;
use dotenv::dotenv;
use log::{error, info};

use quake_dashboard::config::AppConfig;
use quake_dashboard::services::pipeline::Dashboard;

fn parse_date(arg: Option<String>) -> anyhow::Result<Option<NaiveDate>> {
    arg.map(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").with_context(|| format!("bad date '{}'", s)))
        .transpose()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let start = parse_date(args.next())?;
    let end = parse_date(args.next())?;

    let config = AppConfig::from_env()?;
    info!("Testing earthquake feed at {}", config.feed_url);
    let dashboard = Dashboard::new(config)?;

    let selection = match dashboard.select(start, end).await {
        Ok(selection) => selection,
        Err(e) => {
            error!("ERROR: pipeline failed: {}", e);
            return Err(e.into());
        }
    };

    info!(
        "Window {} ..= {} (snapshot fetched {})",
        selection.window.start_date, selection.window.end_date, selection.fetched_at
    );
    if selection.events.is_empty() {
        info!("No earthquakes in range");
        return Ok(());
    }

    let summary = &selection.summary;
    info!("Total earthquakes: {}", summary.total_events);
    if let (Some(mag), Some(place)) = (summary.max_magnitude, summary.strongest_place.as_deref()) {
        info!("Strongest: M{:.1} {}", mag, place);
    }
    for day in &selection.daily {
        match day.avg_magnitude {
            Some(avg) => info!("  {}  {:>5}  avg M{:.2}", day.date, day.count, avg),
            None => info!("  {}  {:>5}  avg n/a", day.date, day.count),
        }
    }

    Ok(())
}
