// src/services/summary.rs
use crate::models::{EarthquakeEvent, FeedSummary};

/// Headline numbers for a set of events. An empty slice is the
/// "no data in range" state and yields zero with every other field `None`.
pub fn summarize(events: &[EarthquakeEvent]) -> FeedSummary {
    let strongest = events
        .iter()
        .filter(|e| e.magnitude.is_some())
        .max_by(|a, b| a.magnitude.partial_cmp(&b.magnitude).unwrap_or(std::cmp::Ordering::Equal));

    let mags: Vec<f64> = events.iter().filter_map(|e| e.magnitude).collect();
    let mean_magnitude = if mags.is_empty() {
        None
    } else {
        Some(mags.iter().sum::<f64>() / mags.len() as f64)
    };

    FeedSummary {
        total_events: events.len(),
        max_magnitude: strongest.and_then(|e| e.magnitude),
        mean_magnitude,
        strongest_place: strongest.and_then(|e| e.place.clone()),
        first_event_local: events.iter().map(|e| e.time_local).min(),
        last_event_local: events.iter().map(|e| e.time_local).max(),
    }
}
