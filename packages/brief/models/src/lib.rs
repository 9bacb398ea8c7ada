#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Brief value types.
//!
//! A [`Brief`] is the structured summary of the incidents near one location
//! over one reporting window. It is built fresh per request and never
//! mutated afterwards.

use chrono::{DateTime, Utc, Weekday};
use nox_crime_incident_models::GeoPoint;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A four-way partition of the day used for risk attribution.
///
/// Declaration order is the canonical order used to break ties.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TimeBucket {
    /// 06:00 to 12:00
    Morning,
    /// 12:00 to 18:00
    Afternoon,
    /// 18:00 to midnight
    Evening,
    /// Midnight to 06:00
    LateNight,
}

impl TimeBucket {
    /// Buckets an hour of the day. Hours outside `0..24` are treated modulo
    /// 24 so every input lands in exactly one bucket.
    #[must_use]
    pub const fn from_hour(hour: u32) -> Self {
        match hour % 24 {
            0..6 => Self::LateNight,
            6..12 => Self::Morning,
            12..18 => Self::Afternoon,
            _ => Self::Evening,
        }
    }

    /// Human-readable label including the hour range.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Morning => "morning (6AM-noon)",
            Self::Afternoon => "afternoon (noon-6PM)",
            Self::Evening => "evening (6PM-midnight)",
            Self::LateNight => "late night (midnight-6AM)",
        }
    }

    /// All buckets in canonical order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Morning, Self::Afternoon, Self::Evening, Self::LateNight]
    }
}

/// Day of the week, Monday first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum DayOfWeek {
    /// Monday
    Monday,
    /// Tuesday
    Tuesday,
    /// Wednesday
    Wednesday,
    /// Thursday
    Thursday,
    /// Friday
    Friday,
    /// Saturday
    Saturday,
    /// Sunday
    Sunday,
}

impl DayOfWeek {
    /// All days in canonical order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Monday,
            Self::Tuesday,
            Self::Wednesday,
            Self::Thursday,
            Self::Friday,
            Self::Saturday,
            Self::Sunday,
        ]
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => Self::Monday,
            Weekday::Tue => Self::Tuesday,
            Weekday::Wed => Self::Wednesday,
            Weekday::Thu => Self::Thursday,
            Weekday::Fri => Self::Friday,
            Weekday::Sat => Self::Saturday,
            Weekday::Sun => Self::Sunday,
        }
    }
}

/// One row of the category ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    /// Feed category string.
    pub category: String,
    /// Incidents in this category.
    pub count: u64,
    /// Share of all incidents, `0.0..=100.0`.
    pub percentage: f64,
}

impl CategoryShare {
    /// Percentage rounded to the nearest whole number for display.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn rounded_percentage(&self) -> u32 {
        self.percentage.round().clamp(0.0, 100.0) as u32
    }
}

/// Summary of the incidents near one location over one reporting window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brief {
    /// Display name of the location.
    pub label: String,
    /// The location the brief covers.
    pub location: GeoPoint,
    /// Every incident in the set, including those without a timestamp.
    pub incident_count: u64,
    /// At most three categories, most frequent first.
    pub top_categories: Vec<CategoryShare>,
    /// Time of day with the most incidents. `None` when no incident carried
    /// a usable timestamp.
    pub riskiest_bucket: Option<TimeBucket>,
    /// Incidents in [`Self::riskiest_bucket`].
    pub riskiest_bucket_count: u64,
    /// Weekday with the most incidents.
    pub riskiest_day: Option<DayOfWeek>,
    /// Deduplicated advisories, at most three.
    pub recommendations: Vec<String>,
    /// Whether the incident count crossed the elevated-activity threshold.
    pub elevated_activity: bool,
    /// When the brief was built.
    pub generated_at: DateTime<Utc>,
}

impl Brief {
    /// The "all clear" brief for a location with no incidents.
    #[must_use]
    pub fn all_clear(label: &str, location: GeoPoint, generated_at: DateTime<Utc>) -> Self {
        Self {
            label: label.to_string(),
            location,
            incident_count: 0,
            top_categories: Vec::new(),
            riskiest_bucket: None,
            riskiest_bucket_count: 0,
            riskiest_day: None,
            recommendations: Vec::new(),
            elevated_activity: false,
            generated_at,
        }
    }

    /// Whether this is the zero-incident variant.
    #[must_use]
    pub const fn is_all_clear(&self) -> bool {
        self.incident_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_hour_maps_to_one_bucket() {
        let mut counts = [0_u32; 4];
        for hour in 0..24 {
            let bucket = TimeBucket::from_hour(hour);
            let idx = TimeBucket::all().iter().position(|b| *b == bucket).unwrap();
            counts[idx] += 1;
        }
        assert_eq!(counts, [6, 6, 6, 6]);
    }

    #[test]
    fn bucket_boundaries_are_half_open() {
        assert_eq!(TimeBucket::from_hour(0), TimeBucket::LateNight);
        assert_eq!(TimeBucket::from_hour(5), TimeBucket::LateNight);
        assert_eq!(TimeBucket::from_hour(6), TimeBucket::Morning);
        assert_eq!(TimeBucket::from_hour(11), TimeBucket::Morning);
        assert_eq!(TimeBucket::from_hour(12), TimeBucket::Afternoon);
        assert_eq!(TimeBucket::from_hour(17), TimeBucket::Afternoon);
        assert_eq!(TimeBucket::from_hour(18), TimeBucket::Evening);
        assert_eq!(TimeBucket::from_hour(23), TimeBucket::Evening);
    }

    #[test]
    fn bucket_names_are_kebab_case() {
        assert_eq!(TimeBucket::LateNight.to_string(), "late-night");
        assert_eq!("evening".parse::<TimeBucket>().unwrap(), TimeBucket::Evening);
        assert_eq!(
            serde_json::to_string(&TimeBucket::LateNight).unwrap(),
            "\"late-night\""
        );
    }

    #[test]
    fn weekday_conversion_is_monday_first() {
        assert_eq!(DayOfWeek::from(Weekday::Mon), DayOfWeek::all()[0]);
        assert_eq!(DayOfWeek::from(Weekday::Sun), DayOfWeek::all()[6]);
        assert_eq!(DayOfWeek::Wednesday.to_string(), "Wednesday");
    }

    #[test]
    fn rounds_percentage_to_nearest() {
        let share = |percentage| CategoryShare {
            category: "THEFT".to_string(),
            count: 1,
            percentage,
        };
        assert_eq!(share(66.666).rounded_percentage(), 67);
        assert_eq!(share(33.333).rounded_percentage(), 33);
        assert_eq!(share(100.0).rounded_percentage(), 100);
    }

    #[test]
    fn all_clear_has_no_breakdown() {
        let point = GeoPoint::new(41.8781, -87.6298).unwrap();
        let brief = Brief::all_clear("Home", point, Utc::now());
        assert!(brief.is_all_clear());
        assert!(brief.top_categories.is_empty());
        assert!(brief.riskiest_bucket.is_none());
        assert!(brief.riskiest_day.is_none());
        assert!(brief.recommendations.is_empty());
        assert!(!brief.elevated_activity);
    }
}
