// src/services/window.rs
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use log::debug;
use serde::Serialize;

use crate::error::{QuakeError, Result};
use crate::models::EarthquakeEvent;

/// Inclusive range of local dates a caller may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateBounds {
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
}

impl DateBounds {
    pub fn new(min_date: NaiveDate, max_date: NaiveDate) -> Self {
        DateBounds { min_date, max_date }
    }

    /// January 1st through December 31st of `year`.
    pub fn calendar_year(year: i32) -> Option<Self> {
        Some(DateBounds {
            min_date: NaiveDate::from_ymd_opt(year, 1, 1)?,
            max_date: NaiveDate::from_ymd_opt(year, 12, 31)?,
        })
    }

    /// Latest date that may be requested: `max_date`, but never past `today`.
    pub fn upper(&self, today: NaiveDate) -> NaiveDate {
        self.max_date.min(today)
    }

    fn check(&self, label: &str, date: NaiveDate, today: NaiveDate) -> Result<()> {
        let upper = self.upper(today);
        if date < self.min_date || date > upper {
            return Err(QuakeError::Range(format!(
                "{} date {} is outside {}..={}",
                label, date, self.min_date, upper
            )));
        }
        Ok(())
    }

    /// Validate a requested window and build it in `tz`.
    ///
    /// `start > end` is accepted and yields a window that matches nothing.
    pub fn window(&self, start: NaiveDate, end: NaiveDate, today: NaiveDate, tz: Tz) -> Result<TimeWindow> {
        self.check("start", start, today)?;
        self.check("end", end, today)?;
        TimeWindow::new(start, end, tz)
    }
}

/// Instants from `start_date` 00:00 local up to, not including, the
/// midnight that follows `end_date`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start: DateTime<Tz>,
    pub end_exclusive: DateTime<Tz>,
}

impl TimeWindow {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, tz: Tz) -> Result<Self> {
        let next_day = end_date
            .succ_opt()
            .ok_or_else(|| QuakeError::Range(format!("end date {} has no following day", end_date)))?;
        let start = local_midnight(start_date, tz)?;
        let end_exclusive = local_midnight(next_day, tz)?;
        debug!("Time window {} .. {} (exclusive)", start, end_exclusive);
        Ok(TimeWindow {
            start_date,
            end_date,
            start,
            end_exclusive,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end_exclusive
    }

    pub fn contains(&self, event: &EarthquakeEvent) -> bool {
        event.time_local >= self.start && event.time_local < self.end_exclusive
    }

    /// Events inside the window, in their original order.
    pub fn filter(&self, events: &[EarthquakeEvent]) -> Vec<EarthquakeEvent> {
        if self.is_empty() {
            return Vec::new();
        }
        events.iter().filter(|e| self.contains(e)).cloned().collect()
    }
}

/// First instant of `date` in `tz`. A midnight skipped by a DST jump resolves
/// to the first valid local time after it.
fn local_midnight(date: NaiveDate, tz: Tz) -> Result<DateTime<Tz>> {
    let midnight: NaiveDateTime = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| QuakeError::Range(format!("invalid date {}", date)))?;

    (0..=24)
        .map(|step| midnight + Duration::minutes(15 * step))
        .find_map(|candidate| tz.from_local_datetime(&candidate).earliest())
        .ok_or_else(|| {
            QuakeError::Range(format!(
                "no valid local midnight for {}-{:02}-{:02} in {}",
                date.year(),
                date.month(),
                date.day(),
                tz.name()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use chrono_tz::America::Los_Angeles;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn event_at(local: NaiveDateTime, mag: f64) -> EarthquakeEvent {
        let time_local = Los_Angeles.from_local_datetime(&local).earliest().unwrap();
        EarthquakeEvent {
            place: Some(format!("at {}", local)),
            magnitude: Some(mag),
            time_utc: time_local.with_timezone(&Utc),
            time_local,
            latitude: 0.0,
            longitude: 0.0,
        }
    }

    fn sample() -> Vec<EarthquakeEvent> {
        vec![
            event_at(d(2024, 12, 31).and_hms_opt(23, 59, 59).unwrap(), 1.0),
            event_at(d(2025, 1, 1).and_hms_opt(0, 0, 0).unwrap(), 2.0),
            event_at(d(2025, 3, 1).and_hms_opt(12, 0, 0).unwrap(), 3.0),
            event_at(d(2025, 3, 3).and_hms_milli_opt(23, 59, 59, 900).unwrap(), 4.0),
            event_at(d(2025, 12, 31).and_hms_opt(23, 59, 59).unwrap(), 5.0),
            event_at(d(2026, 1, 1).and_hms_opt(0, 0, 0).unwrap(), 6.0),
        ]
    }

    fn bounds_2025() -> DateBounds {
        DateBounds::calendar_year(2025).unwrap()
    }

    #[test]
    fn window_includes_both_boundary_days() {
        let window = bounds_2025()
            .window(d(2025, 3, 1), d(2025, 3, 3), d(2025, 12, 31), Los_Angeles)
            .unwrap();
        let hits = window.filter(&sample());
        let mags: Vec<_> = hits.iter().map(|e| e.magnitude.unwrap()).collect();
        assert_eq!(mags, vec![3.0, 4.0]);
    }

    #[test]
    fn filter_is_idempotent() {
        let window = bounds_2025()
            .window(d(2025, 1, 1), d(2025, 3, 1), d(2025, 12, 31), Los_Angeles)
            .unwrap();
        let once = window.filter(&sample());
        let twice = window.filter(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn whole_year_returns_exactly_that_year() {
        let bounds = bounds_2025();
        let window = bounds
            .window(bounds.min_date, bounds.max_date, d(2026, 6, 1), Los_Angeles)
            .unwrap();
        let events = sample();
        let hits = window.filter(&events);
        let expected: Vec<_> = events.iter().filter(|e| e.local_date().year() == 2025).cloned().collect();
        assert_eq!(hits, expected);
        assert_eq!(hits.len(), 4);
    }

    #[test]
    fn start_after_end_is_empty_not_error() {
        let window = bounds_2025()
            .window(d(2025, 3, 3), d(2025, 3, 1), d(2025, 12, 31), Los_Angeles)
            .unwrap();
        assert!(window.is_empty());
        assert!(window.filter(&sample()).is_empty());
    }

    #[test]
    fn dates_outside_bounds_are_range_errors() {
        let bounds = bounds_2025();
        let today = d(2025, 12, 31);
        assert!(matches!(
            bounds.window(d(2024, 12, 31), d(2025, 1, 5), today, Los_Angeles),
            Err(QuakeError::Range(_))
        ));
        assert!(matches!(
            bounds.window(d(2025, 1, 1), d(2026, 1, 1), today, Los_Angeles),
            Err(QuakeError::Range(_))
        ));
    }

    #[test]
    fn upper_bound_is_clamped_to_today() {
        let bounds = bounds_2025();
        let today = d(2025, 6, 15);
        assert_eq!(bounds.upper(today), today);
        assert!(bounds.window(d(2025, 6, 1), today, today, Los_Angeles).is_ok());
        assert!(matches!(
            bounds.window(d(2025, 6, 1), d(2025, 6, 16), today, Los_Angeles),
            Err(QuakeError::Range(_))
        ));
    }

    #[test]
    fn window_spans_dst_day() {
        // 2025-03-09 is only 23 hours long in Los Angeles.
        let window = TimeWindow::new(d(2025, 3, 9), d(2025, 3, 9), Los_Angeles).unwrap();
        assert_eq!(window.end_exclusive - window.start, Duration::hours(23));
    }

    #[test]
    fn midnight_in_dst_gap_moves_forward() {
        // Sao Paulo skipped 00:00-01:00 on 2018-11-04.
        let tz = chrono_tz::America::Sao_Paulo;
        let start = local_midnight(d(2018, 11, 4), tz).unwrap();
        assert_eq!(start.naive_local(), d(2018, 11, 4).and_hms_opt(1, 0, 0).unwrap());
    }
}
