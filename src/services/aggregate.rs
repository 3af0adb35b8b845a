// src/services/aggregate.rs
use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::models::{DailyAggregate, EarthquakeEvent};

#[derive(Default)]
struct DayAccumulator {
    count: usize,
    mag_sum: f64,
    mag_count: usize,
}

/// Per-local-date event counts and mean magnitudes, ascending by date.
pub fn daily_aggregates(events: &[EarthquakeEvent]) -> Vec<DailyAggregate> {
    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();

    for event in events {
        let day = days.entry(event.local_date()).or_default();
        day.count += 1;
        if let Some(mag) = event.magnitude {
            day.mag_sum += mag;
            day.mag_count += 1;
        }
    }

    days.into_iter()
        .map(|(date, acc)| DailyAggregate {
            date,
            count: acc.count,
            avg_magnitude: (acc.mag_count > 0).then(|| acc.mag_sum / acc.mag_count as f64),
        })
        .collect()
}
