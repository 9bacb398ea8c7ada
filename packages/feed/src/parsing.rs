//! Parsing of raw feed records.
//!
//! Socrata returns every field as a string, but other feeds emit numbers
//! for coordinates, so both shapes are accepted. A record without a usable
//! coordinate is malformed and dropped; a record with an unparseable
//! timestamp is kept with `occurred_at = None`.

use chrono::{DateTime, NaiveDateTime};
use nox_crime_incident_models::{GeoPoint, IncidentRecord, UNKNOWN_CATEGORY};

use crate::feed_def::FeedColumns;

/// Parses a feed timestamp into local wall-clock time.
///
/// Accepts Socrata floating timestamps (ISO 8601 with optional fractional
/// seconds and no offset) and RFC 3339 timestamps, whose offset is kept as
/// the incident's local time.
#[must_use]
pub fn parse_feed_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive);
        }
    }
    None
}

/// Reads a coordinate from a JSON string or number.
#[must_use]
pub fn parse_coordinate(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Builds a point from raw lat/lng values. Returns `None` if either is
/// missing, unparseable, zero or out of range.
///
/// A coordinate of exactly `0.0` is valid WGS84 but is how feeds mark an
/// unknown location, so it is treated as missing rather than as a point on
/// the equator or prime meridian.
#[must_use]
pub fn parse_location(lat: &serde_json::Value, lng: &serde_json::Value) -> Option<GeoPoint> {
    let latitude = parse_coordinate(lat)?;
    let longitude = parse_coordinate(lng)?;
    if latitude == 0.0 || longitude == 0.0 {
        return None;
    }
    GeoPoint::new(latitude, longitude).ok()
}

/// Converts one raw feed row into an [`IncidentRecord`].
///
/// Returns `None` for malformed rows (not an object, or no usable
/// coordinates).
#[must_use]
pub fn parse_record(row: serde_json::Value, columns: &FeedColumns) -> Option<IncidentRecord> {
    let serde_json::Value::Object(raw) = row else {
        return None;
    };

    let location = parse_location(
        raw.get(&columns.latitude).unwrap_or(&serde_json::Value::Null),
        raw.get(&columns.longitude).unwrap_or(&serde_json::Value::Null),
    )?;

    let category = raw
        .get(&columns.category)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_CATEGORY)
        .to_string();

    let occurred_at = raw
        .get(&columns.date)
        .and_then(serde_json::Value::as_str)
        .and_then(parse_feed_timestamp);

    Some(IncidentRecord {
        category,
        occurred_at,
        location,
        raw,
    })
}
