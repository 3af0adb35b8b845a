// src/models.rs
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Serialize;

/// One normalized feed feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarthquakeEvent {
    pub place: Option<String>,
    pub magnitude: Option<f64>,
    pub time_utc: DateTime<Utc>,
    pub time_local: DateTime<Tz>,
    pub latitude: f64,
    pub longitude: f64,
}

impl EarthquakeEvent {
    pub fn local_date(&self) -> NaiveDate {
        self.time_local.date_naive()
    }
}

/// Result of one feed fetch. Replaced wholesale, never updated in place.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub source_url: String,
    pub fetched_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_tz")]
    pub timezone: Tz,
    pub events: Vec<EarthquakeEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub count: usize,
    /// `None` when no event of the day carries a magnitude.
    pub avg_magnitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedSummary {
    pub total_events: usize,
    pub max_magnitude: Option<f64>,
    pub mean_magnitude: Option<f64>,
    pub strongest_place: Option<String>,
    pub first_event_local: Option<DateTime<Tz>>,
    pub last_event_local: Option<DateTime<Tz>>,
}

fn serialize_tz<S: serde::Serializer>(tz: &Tz, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(tz.name())
}
