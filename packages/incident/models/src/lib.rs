#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geographic point, reporting window and incident record types.
//!
//! These are the values that cross the boundary between the incident feed
//! and the brief generator. Constructors validate their input and never
//! clamp to a default: a bad coordinate, radius or window is rejected with
//! an [`InvalidInputError`].

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// Days between "now" and the end of the reporting window. The public feed
/// lags real time by a few days.
pub const DEFAULT_REPORTING_LAG_DAYS: u32 = 3;

/// Length of the reporting window in days.
pub const DEFAULT_REPORTING_SPAN_DAYS: u32 = 7;

/// Category assigned to records whose feed category field is missing.
pub const UNKNOWN_CATEGORY: &str = "UNKNOWN";

/// Error returned when a point, radius or window fails validation.
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidInputError {
    /// Latitude is not finite or outside `[-90, 90]`.
    Latitude {
        /// The rejected latitude.
        value: f64,
    },
    /// Longitude is not finite or outside `[-180, 180]`.
    Longitude {
        /// The rejected longitude.
        value: f64,
    },
    /// Radius is not finite or not strictly positive.
    Radius {
        /// The rejected radius in kilometers.
        value: f64,
    },
    /// A trailing window reaches past the representable date range.
    WindowOutOfRange {
        /// Requested days between "now" and the window end.
        lag_days: u32,
        /// Requested window length in days.
        span_days: u32,
    },
    /// Window end is not after its start.
    Window {
        /// Requested window start.
        start: NaiveDateTime,
        /// Requested window end.
        end: NaiveDateTime,
    },
}

impl std::fmt::Display for InvalidInputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Latitude { value } => {
                write!(f, "invalid latitude {value}: expected -90 to 90")
            }
            Self::Longitude { value } => {
                write!(f, "invalid longitude {value}: expected -180 to 180")
            }
            Self::Radius { value } => {
                write!(f, "invalid radius {value} km: must be greater than zero")
            }
            Self::WindowOutOfRange {
                lag_days,
                span_days,
            } => write!(
                f,
                "invalid time window: {span_days} days ending {lag_days} days ago is out of range"
            ),
            Self::Window { start, end } => {
                write!(f, "invalid time window {start} to {end}: end must be after start")
            }
        }
    }
}

impl std::error::Error for InvalidInputError {}

/// A WGS84 coordinate.
///
/// Deserialization goes through [`GeoPoint::new`], so a stored point with
/// out-of-range coordinates is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawGeoPoint")]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGeoPoint {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = InvalidInputError;

    fn try_from(raw: RawGeoPoint) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl GeoPoint {
    /// Creates a point after checking both coordinates are in range.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError`] if either coordinate is non-finite or
    /// out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidInputError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(InvalidInputError::Latitude { value: latitude });
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(InvalidInputError::Longitude { value: longitude });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Checks that a search radius is usable.
///
/// # Errors
///
/// Returns [`InvalidInputError::Radius`] if the radius is non-finite or not
/// strictly positive.
pub fn validate_radius(radius_km: f64) -> Result<f64, InvalidInputError> {
    if radius_km.is_finite() && radius_km > 0.0 {
        Ok(radius_km)
    } else {
        Err(InvalidInputError::Radius { value: radius_km })
    }
}

/// An inclusive range of feed-local wall-clock timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawTimeWindow")]
pub struct TimeWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTimeWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TryFrom<RawTimeWindow> for TimeWindow {
    type Error = InvalidInputError;

    fn try_from(raw: RawTimeWindow) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl TimeWindow {
    /// Creates a window from explicit bounds.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError::Window`] unless `end > start`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, InvalidInputError> {
        if end <= start {
            return Err(InvalidInputError::Window { start, end });
        }
        Ok(Self { start, end })
    }

    /// The window of `span_days` ending `lag_days` before `now`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError::Window`] if `span_days` is zero, or
    /// [`InvalidInputError::WindowOutOfRange`] if the window would start
    /// before the earliest representable date.
    pub fn trailing(
        now: NaiveDateTime,
        lag_days: u32,
        span_days: u32,
    ) -> Result<Self, InvalidInputError> {
        let out_of_range = InvalidInputError::WindowOutOfRange {
            lag_days,
            span_days,
        };
        let end = now
            .checked_sub_signed(TimeDelta::days(i64::from(lag_days)))
            .ok_or_else(|| out_of_range.clone())?;
        let start = end
            .checked_sub_signed(TimeDelta::days(i64::from(span_days)))
            .ok_or(out_of_range)?;
        Self::new(start, end)
    }

    /// The default weekly reporting window: seven days ending three days
    /// before `now`.
    #[must_use]
    pub fn reporting_week(now: NaiveDateTime) -> Self {
        let end = now - TimeDelta::days(i64::from(DEFAULT_REPORTING_LAG_DAYS));
        let start = end - TimeDelta::days(i64::from(DEFAULT_REPORTING_SPAN_DAYS));
        Self { start, end }
    }

    /// Window start.
    #[must_use]
    pub const fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Window end.
    #[must_use]
    pub const fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Whether `at` falls inside the window, inclusive on both ends.
    #[must_use]
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at <= self.end
    }
}

/// A single incident as returned by the feed.
///
/// `occurred_at` is feed-local wall-clock time and is `None` when the
/// feed's timestamp could not be parsed; such records still count toward
/// totals but carry no time-of-day information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    /// Feed-defined category, e.g. `"THEFT"`. Not validated.
    pub category: String,
    /// When the incident occurred, in the feed's local time.
    pub occurred_at: Option<NaiveDateTime>,
    /// Where the incident occurred.
    pub location: GeoPoint,
    /// The untouched feed record.
    pub raw: serde_json::Map<String, serde_json::Value>,
}

/// Incidents in feed order (typically newest first).
pub type IncidentSet = Vec<IncidentRecord>;

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn accepts_chicago_point() {
        let point = GeoPoint::new(41.8781, -87.6298).unwrap();
        assert!((point.latitude() - 41.8781).abs() < f64::EPSILON);
        assert!((point.longitude() - -87.6298).abs() < f64::EPSILON);
        assert_eq!(point.to_string(), "41.8781, -87.6298");
    }

    #[test]
    fn accepts_extreme_bounds() {
        assert!(GeoPoint::new(90.0, 180.0).is_ok());
        assert!(GeoPoint::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert_eq!(
            GeoPoint::new(91.0, 0.0),
            Err(InvalidInputError::Latitude { value: 91.0 })
        );
        assert_eq!(
            GeoPoint::new(0.0, -180.5),
            Err(InvalidInputError::Longitude { value: -180.5 })
        );
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn rejects_non_positive_radius() {
        assert!(validate_radius(0.8).is_ok());
        assert!(validate_radius(0.0).is_err());
        assert!(validate_radius(-1.0).is_err());
        assert!(validate_radius(f64::NAN).is_err());
    }

    #[test]
    fn rejects_inverted_window() {
        let a = at("2024-01-08T00:00:00");
        let b = at("2024-01-15T00:00:00");
        assert!(TimeWindow::new(a, b).is_ok());
        assert!(TimeWindow::new(b, a).is_err());
        assert!(TimeWindow::new(a, a).is_err());
    }

    #[test]
    fn reporting_week_lags_three_days() {
        let now = at("2024-01-18T12:00:00");
        let window = TimeWindow::reporting_week(now);
        assert_eq!(window.end(), at("2024-01-15T12:00:00"));
        assert_eq!(window.start(), at("2024-01-08T12:00:00"));
        assert_eq!(TimeWindow::trailing(now, 3, 7).unwrap(), window);
    }

    #[test]
    fn trailing_rejects_empty_span() {
        assert!(TimeWindow::trailing(at("2024-01-18T12:00:00"), 3, 0).is_err());
    }

    #[test]
    fn trailing_rejects_lag_past_minimum_date() {
        assert_eq!(
            TimeWindow::trailing(at("2024-01-18T12:00:00"), u32::MAX, 7),
            Err(InvalidInputError::WindowOutOfRange {
                lag_days: u32::MAX,
                span_days: 7,
            })
        );
    }

    #[test]
    fn deserializing_checks_coordinates() {
        let point: GeoPoint =
            serde_json::from_str(r#"{"latitude":41.8781,"longitude":-87.6298}"#).unwrap();
        assert_eq!(point, GeoPoint::new(41.8781, -87.6298).unwrap());

        let err = serde_json::from_str::<GeoPoint>(r#"{"latitude":500.0,"longitude":-999.0}"#)
            .unwrap_err();
        assert!(err.to_string().contains("invalid latitude 500"), "{err}");
        assert!(
            serde_json::from_str::<GeoPoint>(r#"{"latitude":41.0,"longitude":-999.0}"#).is_err()
        );
    }

    #[test]
    fn deserializing_checks_window_order() {
        let window: TimeWindow = serde_json::from_str(
            r#"{"start":"2024-01-01T00:00:00","end":"2024-01-15T00:00:00"}"#,
        )
        .unwrap();
        assert_eq!(window.start(), at("2024-01-01T00:00:00"));

        assert!(
            serde_json::from_str::<TimeWindow>(
                r#"{"start":"2024-01-15T00:00:00","end":"2024-01-01T00:00:00"}"#,
            )
            .is_err()
        );
    }

    #[test]
    fn serialized_point_reads_back() {
        let point = GeoPoint::new(-33.8688, 151.2093).unwrap();
        let json = serde_json::to_string(&point).unwrap();
        assert_eq!(serde_json::from_str::<GeoPoint>(&json).unwrap(), point);
    }

    #[test]
    fn window_contains_is_inclusive() {
        let window =
            TimeWindow::new(at("2024-01-08T00:00:00"), at("2024-01-15T00:00:00")).unwrap();
        assert!(window.contains(at("2024-01-08T00:00:00")));
        assert!(window.contains(at("2024-01-15T00:00:00")));
        assert!(window.contains(at("2024-01-10T13:45:00")));
        assert!(!window.contains(at("2024-01-07T23:59:59")));
        assert!(!window.contains(at("2024-01-15T00:00:01")));
    }
}
