//! TOML-driven feed definitions.
//!
//! Each incident feed is described by a TOML file under `feeds/`: where the
//! Socrata endpoint lives, which columns hold the timestamp, category and
//! coordinates, and the defaults used when a caller does not override them.

use serde::Deserialize;

use crate::FilterStrategy;

/// Upper bound on records requested in a single feed call.
pub const MAX_PAGE_SIZE: u64 = 5_000;

/// Upper bound on pages requested in a single fetch.
pub const MAX_PAGES: u64 = 20;

/// Upper bound on the reporting lag and span, in days.
pub const MAX_REPORTING_DAYS: u32 = 365;

/// Errors from parsing or validating a feed definition.
#[derive(Debug, thiserror::Error)]
pub enum FeedConfigError {
    /// TOML syntax or shape error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A field holds a value the fetcher cannot use.
    #[error("Invalid feed definition '{id}': {message}")]
    Invalid {
        /// Feed identifier.
        id: String,
        /// Description of what went wrong.
        message: String,
    },
}

/// A complete feed definition parsed from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedDefinition {
    /// Unique identifier (e.g., `"chicago"`).
    pub id: String,
    /// Human-readable name shown as the brief's attribution.
    pub name: String,
    /// City and state the feed covers (e.g., `"Chicago, IL"`).
    pub city: String,
    /// Socrata resource URL.
    pub api_url: String,
    /// Radius used when the caller does not pass one.
    #[serde(default = "default_radius_km")]
    pub default_radius_km: f64,
    /// Filtering strategy used when the caller does not pick one.
    #[serde(default)]
    pub strategy: FilterStrategy,
    /// Per-request network timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Days between "now" and the end of the reporting window.
    #[serde(default = "default_lag_days")]
    pub reporting_lag_days: u32,
    /// Reporting window length in days.
    #[serde(default = "default_span_days")]
    pub reporting_span_days: u32,
    /// Column names in the feed's records.
    pub columns: FeedColumns,
    /// `$limit` per strategy.
    #[serde(default)]
    pub page_size: PageSizes,
    /// Most pages requested per fetch before the result is reported as
    /// truncated.
    #[serde(default = "default_max_pages")]
    pub max_pages: u64,
}

/// Feed column names.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedColumns {
    /// Timestamp column, used for `$where` and `$order`.
    pub date: String,
    /// Category column (e.g., `"primary_type"`).
    pub category: String,
    /// Latitude column.
    pub latitude: String,
    /// Longitude column.
    pub longitude: String,
}

/// Record limits for each filtering strategy.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageSizes {
    /// Limit for bounding-box queries.
    #[serde(default = "default_bounding_box_page")]
    pub bounding_box: u64,
    /// Limit for the broader exact-radius batch.
    #[serde(default = "default_exact_radius_page")]
    pub exact_radius: u64,
}

impl Default for PageSizes {
    fn default() -> Self {
        Self {
            bounding_box: default_bounding_box_page(),
            exact_radius: default_exact_radius_page(),
        }
    }
}

impl PageSizes {
    /// Returns the limit for `strategy`.
    #[must_use]
    pub const fn for_strategy(&self, strategy: FilterStrategy) -> u64 {
        match strategy {
            FilterStrategy::BoundingBox => self.bounding_box,
            FilterStrategy::ExactRadius => self.exact_radius,
        }
    }
}

const fn default_radius_km() -> f64 {
    0.8
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_lag_days() -> u32 {
    nox_crime_incident_models::DEFAULT_REPORTING_LAG_DAYS
}

const fn default_span_days() -> u32 {
    nox_crime_incident_models::DEFAULT_REPORTING_SPAN_DAYS
}

const fn default_max_pages() -> u64 {
    4
}

const fn default_bounding_box_page() -> u64 {
    1_000
}

const fn default_exact_radius_page() -> u64 {
    MAX_PAGE_SIZE
}

/// Parses and validates a feed definition.
///
/// # Errors
///
/// Returns [`FeedConfigError`] if the TOML is malformed or a value is out of
/// range.
pub fn parse_feed_toml(toml_str: &str) -> Result<FeedDefinition, FeedConfigError> {
    let def: FeedDefinition = toml::de::from_str(toml_str)?;
    validate(&def)?;
    Ok(def)
}

fn validate(def: &FeedDefinition) -> Result<(), FeedConfigError> {
    let invalid = |message: String| FeedConfigError::Invalid {
        id: def.id.clone(),
        message,
    };

    if def.id.is_empty() {
        return Err(invalid("id must not be empty".to_string()));
    }
    if !(def.default_radius_km.is_finite() && def.default_radius_km > 0.0) {
        return Err(invalid(format!(
            "default_radius_km must be positive, got {}",
            def.default_radius_km
        )));
    }
    if def.timeout_secs == 0 {
        return Err(invalid("timeout_secs must be at least 1".to_string()));
    }
    if def.reporting_lag_days > MAX_REPORTING_DAYS {
        return Err(invalid(format!(
            "reporting_lag_days must be at most {MAX_REPORTING_DAYS}, got {}",
            def.reporting_lag_days
        )));
    }
    if def.reporting_span_days > MAX_REPORTING_DAYS {
        return Err(invalid(format!(
            "reporting_span_days must be at most {MAX_REPORTING_DAYS}, got {}",
            def.reporting_span_days
        )));
    }
    if def.max_pages == 0 || def.max_pages > MAX_PAGES {
        return Err(invalid(format!(
            "max_pages must be between 1 and {MAX_PAGES}, got {}",
            def.max_pages
        )));
    }
    if def.reporting_span_days == 0 {
        return Err(invalid("reporting_span_days must be at least 1".to_string()));
    }
    for (label, size) in [
        ("bounding_box", def.page_size.bounding_box),
        ("exact_radius", def.page_size.exact_radius),
    ] {
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(invalid(format!(
                "page_size.{label} must be between 1 and {MAX_PAGE_SIZE}, got {size}"
            )));
        }
    }

    Ok(())
}
