//! Aggregation of an incident set into a [`Brief`].

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike as _, Timelike as _, Utc};
use nox_crime_brief_models::{Brief, CategoryShare, DayOfWeek, TimeBucket};
use nox_crime_incident_models::{GeoPoint, IncidentRecord};

use crate::config::{AdvisoryRule, BriefConfig};

/// Number of categories listed in a brief.
pub const TOP_CATEGORY_LIMIT: usize = 3;

/// Number of advisories listed in a brief.
pub const RECOMMENDATION_LIMIT: usize = 3;

/// Summarizes `incidents` with the built-in configuration, stamped with the
/// current time.
#[must_use]
pub fn summarize(incidents: &[IncidentRecord], point: GeoPoint, label: &str) -> Brief {
    BriefGenerator::default().generate(incidents, point, label, Utc::now())
}

/// Builds briefs from incident sets.
#[derive(Debug, Clone, Default)]
pub struct BriefGenerator {
    config: BriefConfig,
}

impl BriefGenerator {
    /// Creates a generator with an explicit configuration.
    #[must_use]
    pub const fn new(config: BriefConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &BriefConfig {
        &self.config
    }

    /// Builds the brief for `incidents` around `point`.
    ///
    /// Incidents without a timestamp count toward the total but are left
    /// out of the time-of-day and weekday tallies.
    #[must_use]
    pub fn generate(
        &self,
        incidents: &[IncidentRecord],
        point: GeoPoint,
        label: &str,
        generated_at: DateTime<Utc>,
    ) -> Brief {
        if incidents.is_empty() {
            return Brief::all_clear(label, point, generated_at);
        }

        let incident_count = incidents.len() as u64;
        let top_categories = rank_categories(incidents, TOP_CATEGORY_LIMIT);

        let mut buckets: BTreeMap<TimeBucket, u64> = BTreeMap::new();
        let mut days: BTreeMap<DayOfWeek, u64> = BTreeMap::new();
        for occurred_at in incidents.iter().filter_map(|i| i.occurred_at) {
            *buckets
                .entry(TimeBucket::from_hour(occurred_at.hour()))
                .or_default() += 1;
            *days
                .entry(DayOfWeek::from(occurred_at.weekday()))
                .or_default() += 1;
        }

        let riskiest_bucket = riskiest(TimeBucket::all(), &buckets);
        let riskiest_day = riskiest(DayOfWeek::all(), &days);
        let recommendations = recommend(&top_categories, &self.config.advisories);

        Brief {
            label: label.to_string(),
            location: point,
            incident_count,
            top_categories,
            riskiest_bucket: riskiest_bucket.map(|(bucket, _)| bucket),
            riskiest_bucket_count: riskiest_bucket.map_or(0, |(_, count)| count),
            riskiest_day: riskiest_day.map(|(day, _)| day),
            recommendations,
            elevated_activity: incident_count > self.config.elevated_activity_threshold,
            generated_at,
        }
    }
}

/// Tallies categories and returns the `limit` most frequent. Equal counts
/// keep the order in which the categories first appear.
#[allow(clippy::cast_precision_loss)]
fn rank_categories(incidents: &[IncidentRecord], limit: usize) -> Vec<CategoryShare> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut tally: Vec<(&str, u64)> = Vec::new();

    for incident in incidents {
        let category = incident.category.as_str();
        if let Some(&idx) = index.get(category) {
            tally[idx].1 += 1;
        } else {
            index.insert(category, tally.len());
            tally.push((category, 1));
        }
    }

    // Stable sort preserves first-seen order among equal counts.
    tally.sort_by(|a, b| b.1.cmp(&a.1));

    let total = incidents.len() as f64;
    tally
        .into_iter()
        .take(limit)
        .map(|(category, count)| CategoryShare {
            category: category.to_string(),
            count,
            percentage: count as f64 / total * 100.0,
        })
        .collect()
}

/// Returns the key with the highest non-zero tally, preferring the earliest
/// key in `canonical` on ties.
fn riskiest<K: Copy + Ord>(canonical: &[K], tally: &BTreeMap<K, u64>) -> Option<(K, u64)> {
    let mut best: Option<(K, u64)> = None;
    for key in canonical {
        let count = tally.get(key).copied().unwrap_or(0);
        if count > best.map_or(0, |(_, c)| c) {
            best = Some((*key, count));
        }
    }
    best
}

/// Picks one advisory per top category (the first matching rule), dropping
/// duplicates and capping the list.
fn recommend(top_categories: &[CategoryShare], rules: &[AdvisoryRule]) -> Vec<String> {
    let mut recommendations: Vec<String> = Vec::new();

    for share in top_categories {
        let Some(rule) = rules.iter().find(|rule| rule.matches(&share.category)) else {
            continue;
        };
        if !recommendations.contains(&rule.advice) {
            recommendations.push(rule.advice.clone());
        }
    }

    recommendations.truncate(RECOMMENDATION_LIMIT);
    recommendations
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;

    fn point() -> GeoPoint {
        GeoPoint::new(41.8781, -87.6298).unwrap()
    }

    fn incident(category: &str, at: Option<&str>) -> IncidentRecord {
        IncidentRecord {
            category: category.to_string(),
            occurred_at: at
                .map(|s| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()),
            location: point(),
            raw: serde_json::Map::new(),
        }
    }

    fn repeat(category: &str, at: &str, n: usize) -> Vec<IncidentRecord> {
        (0..n).map(|_| incident(category, Some(at))).collect()
    }

    fn generate(incidents: &[IncidentRecord]) -> Brief {
        BriefGenerator::default().generate(incidents, point(), "Home", Utc::now())
    }

    // 2024-01-15 is a Monday.
    const MONDAY_EVENING: &str = "2024-01-15T19:00:00";

    #[test]
    fn theft_and_battery_on_monday_evening() {
        let mut incidents = repeat("THEFT", MONDAY_EVENING, 10);
        incidents.extend(repeat("BATTERY", MONDAY_EVENING, 5));

        let brief = generate(&incidents);

        assert_eq!(brief.incident_count, 15);
        assert_eq!(brief.top_categories.len(), 2);
        assert_eq!(brief.top_categories[0].category, "THEFT");
        assert_eq!(brief.top_categories[0].count, 10);
        assert_eq!(brief.top_categories[0].rounded_percentage(), 67);
        assert_eq!(brief.top_categories[1].category, "BATTERY");
        assert_eq!(brief.top_categories[1].count, 5);
        assert_eq!(brief.top_categories[1].rounded_percentage(), 33);
        assert_eq!(brief.riskiest_day, Some(DayOfWeek::Monday));
        assert_eq!(brief.riskiest_bucket, Some(TimeBucket::Evening));
        assert_eq!(brief.riskiest_bucket_count, 15);
        assert_eq!(
            brief.recommendations,
            ["Secure vehicles in view", "Avoid solo walks after dark"]
        );
        assert!(!brief.elevated_activity);
    }

    #[test]
    fn empty_input_is_all_clear() {
        let brief = summarize(&[], point(), "Home");
        assert!(brief.is_all_clear());
        assert_eq!(brief.incident_count, 0);
        assert!(brief.top_categories.is_empty());
        assert!(brief.riskiest_bucket.is_none());
        assert!(brief.riskiest_day.is_none());
        assert!(brief.recommendations.is_empty());
        assert_eq!(brief.label, "Home");
    }

    #[test]
    fn elevated_activity_above_threshold() {
        assert!(generate(&repeat("THEFT", MONDAY_EVENING, 60)).elevated_activity);
        assert!(generate(&repeat("THEFT", MONDAY_EVENING, 51)).elevated_activity);
        assert!(!generate(&repeat("THEFT", MONDAY_EVENING, 50)).elevated_activity);
        assert!(!generate(&repeat("THEFT", MONDAY_EVENING, 49)).elevated_activity);
    }

    #[test]
    fn top_categories_capped_and_ties_keep_first_seen() {
        let incidents: Vec<IncidentRecord> = [
            "ASSAULT", "BATTERY", "THEFT", "THEFT", "BATTERY", "ROBBERY", "ROBBERY", "NARCOTICS",
        ]
        .iter()
        .map(|c| incident(c, Some(MONDAY_EVENING)))
        .collect();

        let brief = generate(&incidents);
        let ranked: Vec<(&str, u64)> = brief
            .top_categories
            .iter()
            .map(|s| (s.category.as_str(), s.count))
            .collect();
        assert_eq!(ranked, [("BATTERY", 2), ("THEFT", 2), ("ROBBERY", 2)]);
        for pair in brief.top_categories.windows(2) {
            assert!(pair[0].count >= pair[1].count);
        }
    }

    #[test]
    fn category_match_is_exact_string() {
        let incidents = vec![
            incident("THEFT", Some(MONDAY_EVENING)),
            incident("Theft", Some(MONDAY_EVENING)),
        ];
        assert_eq!(generate(&incidents).top_categories.len(), 2);
    }

    #[test]
    fn bucket_tie_resolves_to_canonical_order() {
        let incidents = vec![
            incident("THEFT", Some("2024-01-15T22:00:00")),
            incident("THEFT", Some("2024-01-15T02:00:00")),
            incident("THEFT", Some("2024-01-15T09:00:00")),
        ];
        let brief = generate(&incidents);
        assert_eq!(brief.riskiest_bucket, Some(TimeBucket::Morning));
        assert_eq!(brief.riskiest_bucket_count, 1);
    }

    #[test]
    fn day_tie_resolves_to_monday_first() {
        let incidents = vec![
            incident("THEFT", Some("2024-01-21T12:00:00")),
            incident("THEFT", Some("2024-01-17T12:00:00")),
            incident("THEFT", Some("2024-01-15T12:00:00")),
        ];
        let first = generate(&incidents);
        assert_eq!(first.riskiest_day, Some(DayOfWeek::Monday));
        for _ in 0..5 {
            assert_eq!(generate(&incidents).riskiest_day, first.riskiest_day);
        }
    }

    #[test]
    fn undated_incidents_count_but_are_not_bucketed() {
        let incidents = vec![
            incident("THEFT", None),
            incident("THEFT", None),
            incident("BATTERY", Some("2024-01-16T03:00:00")),
        ];
        let brief = generate(&incidents);
        assert_eq!(brief.incident_count, 3);
        assert_eq!(brief.riskiest_bucket, Some(TimeBucket::LateNight));
        assert_eq!(brief.riskiest_bucket_count, 1);
        assert_eq!(brief.riskiest_day, Some(DayOfWeek::Tuesday));
    }

    #[test]
    fn all_undated_has_no_riskiest_period() {
        let brief = generate(&[incident("THEFT", None)]);
        assert_eq!(brief.incident_count, 1);
        assert!(brief.riskiest_bucket.is_none());
        assert!(brief.riskiest_day.is_none());
        assert!(!brief.is_all_clear());
    }

    #[test]
    fn recommendations_are_deduplicated() {
        let mut incidents = repeat("THEFT", MONDAY_EVENING, 3);
        incidents.extend(repeat("MOTOR VEHICLE THEFT", MONDAY_EVENING, 2));
        incidents.extend(repeat("BURGLARY", MONDAY_EVENING, 1));

        let brief = generate(&incidents);
        assert_eq!(
            brief.recommendations,
            ["Secure vehicles in view", "Verify locks before leaving"]
        );
    }

    #[test]
    fn unmatched_categories_give_no_recommendations() {
        let brief = generate(&repeat("NARCOTICS", MONDAY_EVENING, 4));
        assert!(brief.recommendations.is_empty());
    }

    #[test]
    fn recommendations_never_exceed_limit() {
        let config = BriefConfig {
            elevated_activity_threshold: 50,
            advisories: ["a", "b", "c", "d"]
                .iter()
                .map(|k| AdvisoryRule {
                    keyword: (*k).to_string(),
                    advice: format!("advice {k}"),
                })
                .collect(),
        };
        let incidents: Vec<IncidentRecord> = ["A", "B", "C", "D"]
            .iter()
            .map(|c| incident(c, Some(MONDAY_EVENING)))
            .collect();

        let brief = BriefGenerator::new(config).generate(&incidents, point(), "Home", Utc::now());
        assert_eq!(brief.recommendations.len(), RECOMMENDATION_LIMIT);
        let mut unique = brief.recommendations.clone();
        unique.dedup();
        assert_eq!(unique.len(), brief.recommendations.len());
    }
}
