// src/services/normalizer.rs
use chrono::{TimeZone, Utc};
use chrono_tz::Tz;
use log::{debug, warn};
use serde_json::Value;
use std::str::FromStr;

use crate::error::{QuakeError, Result};
use crate::models::EarthquakeEvent;

/// What to do with a feature that lacks a required field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Abort the whole pass on the first bad feature.
    #[default]
    Strict,
    /// Log and drop bad features, keep the rest.
    Skip,
}

impl FromStr for MalformedPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(MalformedPolicy::Strict),
            "skip" => Ok(MalformedPolicy::Skip),
            other => Err(format!("unknown malformed-feature policy '{}'", other)),
        }
    }
}

/// Turn raw feed features into events, in feed order.
pub fn normalize(features: &[Value], tz: Tz, policy: MalformedPolicy) -> Result<Vec<EarthquakeEvent>> {
    let mut events = Vec::with_capacity(features.len());
    let mut skipped = 0usize;

    for (idx, feature) in features.iter().enumerate() {
        match normalize_feature(feature, tz) {
            Ok(event) => events.push(event),
            Err(e) => match policy {
                MalformedPolicy::Strict => {
                    return Err(QuakeError::Schema(format!("{} {}", describe(idx, feature), e)))
                }
                MalformedPolicy::Skip => {
                    warn!("Skipping {}: {}", describe(idx, feature), e);
                    skipped += 1;
                }
            },
        }
    }

    debug!("Normalized {} events ({} skipped)", events.len(), skipped);
    Ok(events)
}

fn describe(idx: usize, feature: &Value) -> String {
    match feature.get("id").and_then(Value::as_str) {
        Some(id) => format!("feature #{} ({})", idx, id),
        None => format!("feature #{}", idx),
    }
}

fn normalize_feature(feature: &Value, tz: Tz) -> std::result::Result<EarthquakeEvent, String> {
    let properties = feature
        .get("properties")
        .filter(|p| p.is_object())
        .ok_or("missing 'properties'")?;
    let geometry = feature
        .get("geometry")
        .filter(|g| g.is_object())
        .ok_or("missing 'geometry'")?;

    let place = match properties.get("place") {
        None => return Err("missing 'properties.place'".into()),
        Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => return Err(format!("'properties.place' is not a string: {}", other)),
    };

    let magnitude = match properties.get("mag") {
        None | Some(Value::Null) => None,
        Some(v) => Some(
            v.as_f64()
                .ok_or_else(|| format!("'properties.mag' is not a number: {}", v))?,
        ),
    };

    let millis = properties
        .get("time")
        .and_then(Value::as_i64)
        .ok_or("missing or non-integer 'properties.time'")?;
    let time_utc = Utc
        .timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| format!("'properties.time' out of range: {}", millis))?;

    // GeoJSON stores [longitude, latitude, depth].
    let coords = geometry
        .get("coordinates")
        .and_then(Value::as_array)
        .ok_or("missing 'geometry.coordinates'")?;
    let (longitude, latitude) = match (coords.first().and_then(Value::as_f64), coords.get(1).and_then(Value::as_f64)) {
        (Some(lon), Some(lat)) => (lon, lat),
        _ => return Err("'geometry.coordinates' needs at least two numbers".into()),
    };

    Ok(EarthquakeEvent {
        place,
        magnitude,
        time_utc,
        time_local: time_utc.with_timezone(&tz),
        latitude,
        longitude,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Offset, Timelike};
    use chrono_tz::America::Los_Angeles;
    use serde_json::json;

    fn feature(place: &str, mag: f64, time: i64, lon: f64, lat: f64) -> Value {
        json!({
            "type": "Feature",
            "properties": { "place": place, "mag": mag, "time": time },
            "geometry": { "type": "Point", "coordinates": [lon, lat, 10.0] },
            "id": format!("ev{}", time)
        })
    }

    #[test]
    fn preserves_count_and_order() {
        let features = vec![
            feature("c", 1.0, 1_700_000_300_000, 0.0, 0.0),
            feature("a", 2.0, 1_700_000_100_000, 0.0, 0.0),
            feature("b", 3.0, 1_700_000_200_000, 0.0, 0.0),
        ];
        let events = normalize(&features, Los_Angeles, MalformedPolicy::Strict).unwrap();
        assert_eq!(events.len(), 3);
        let places: Vec<_> = events.iter().map(|e| e.place.as_deref().unwrap()).collect();
        assert_eq!(places, vec!["c", "a", "b"]);
    }

    #[test]
    fn swaps_coordinate_order() {
        let features = vec![feature("x", 1.0, 1_700_000_000_000, -122.5, 37.75)];
        let events = normalize(&features, Los_Angeles, MalformedPolicy::Strict).unwrap();
        assert_eq!(events[0].longitude, -122.5);
        assert_eq!(events[0].latitude, 37.75);
    }

    #[test]
    fn local_time_follows_dst_transition() {
        // 2025-03-09 02:00 PST jumps to 03:00 PDT (10:00 UTC).
        let before = Utc.with_ymd_and_hms(2025, 3, 9, 9, 59, 59).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 3, 9, 10, 0, 0).unwrap();
        let features = vec![
            feature("before", 1.0, before.timestamp_millis(), 0.0, 0.0),
            feature("after", 1.0, after.timestamp_millis(), 0.0, 0.0),
        ];
        let events = normalize(&features, Los_Angeles, MalformedPolicy::Strict).unwrap();

        assert_eq!(events[0].time_utc, before);
        assert_eq!(events[0].time_local.offset().fix().local_minus_utc(), -8 * 3600);
        assert_eq!(events[0].time_local.hour(), 1);

        assert_eq!(events[1].time_utc, after);
        assert_eq!(events[1].time_local.offset().fix().local_minus_utc(), -7 * 3600);
        assert_eq!(events[1].time_local.hour(), 3);

        for e in &events {
            assert_eq!(e.time_local, e.time_utc.with_timezone(&Los_Angeles));
        }
    }

    #[test]
    fn null_and_negative_magnitudes() {
        let features = vec![
            json!({
                "properties": { "place": null, "mag": null, "time": 1_700_000_000_000i64 },
                "geometry": { "coordinates": [1.0, 2.0] }
            }),
            json!({
                "properties": { "place": "tiny", "time": 1_700_000_000_000i64 },
                "geometry": { "coordinates": [1.0, 2.0] }
            }),
            feature("negative", -0.4, 1_700_000_000_000, 1.0, 2.0),
        ];
        let events = normalize(&features, Los_Angeles, MalformedPolicy::Strict).unwrap();
        assert_eq!(events[0].place, None);
        assert_eq!(events[0].magnitude, None);
        assert_eq!(events[1].magnitude, None);
        assert_eq!(events[2].magnitude, Some(-0.4));
    }

    #[test]
    fn strict_policy_aborts_on_missing_field() {
        let features = vec![
            feature("ok", 1.0, 1_700_000_000_000, 0.0, 0.0),
            json!({
                "id": "broken1",
                "properties": { "place": "no time", "mag": 1.0 },
                "geometry": { "coordinates": [0.0, 0.0] }
            }),
        ];
        let err = normalize(&features, Los_Angeles, MalformedPolicy::Strict).unwrap_err();
        match err {
            QuakeError::Schema(msg) => {
                assert!(msg.contains("#1"));
                assert!(msg.contains("broken1"));
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn strict_policy_rejects_short_coordinates_and_missing_place() {
        let short = json!({
            "properties": { "place": "x", "mag": 1.0, "time": 1_700_000_000_000i64 },
            "geometry": { "coordinates": [10.0] }
        });
        assert!(matches!(
            normalize(&[short], Los_Angeles, MalformedPolicy::Strict),
            Err(QuakeError::Schema(_))
        ));

        let no_place = json!({
            "properties": { "mag": 1.0, "time": 1_700_000_000_000i64 },
            "geometry": { "coordinates": [10.0, 20.0] }
        });
        assert!(matches!(
            normalize(&[no_place], Los_Angeles, MalformedPolicy::Strict),
            Err(QuakeError::Schema(_))
        ));
    }

    #[test]
    fn skip_policy_drops_only_bad_features() {
        let features = vec![
            feature("first", 1.0, 1_700_000_000_000, 0.0, 0.0),
            json!({ "properties": { "place": "no geometry", "time": 1 } }),
            feature("third", 2.0, 1_700_000_100_000, 0.0, 0.0),
        ];
        let events = normalize(&features, Los_Angeles, MalformedPolicy::Skip).unwrap();
        let places: Vec<_> = events.iter().map(|e| e.place.as_deref().unwrap()).collect();
        assert_eq!(places, vec!["first", "third"]);
    }

    #[test]
    fn policy_from_str() {
        assert_eq!("strict".parse::<MalformedPolicy>().unwrap(), MalformedPolicy::Strict);
        assert_eq!(" SKIP ".parse::<MalformedPolicy>().unwrap(), MalformedPolicy::Skip);
        assert!("lenient".parse::<MalformedPolicy>().is_err());
    }
}
