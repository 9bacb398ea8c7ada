#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Address lookup for registering a location.
//!
//! Resolves typed addresses to a short list of candidates the user can
//! confirm, and turns a shared coordinate back into a display label. Both
//! go through Nominatim / `OpenStreetMap`; when reverse lookup fails the
//! label falls back to the formatted coordinate.

pub mod nominatim;

use nox_crime_incident_models::GeoPoint;
use serde::Deserialize;
use thiserror::Error;

pub use nominatim::NominatimGeocoder;

/// One possible match for a typed address.
#[derive(Debug, Clone, PartialEq)]
pub struct AddressCandidate {
    /// The matched/canonical address returned by the geocoder.
    pub address: String,
    /// Where the address is.
    pub location: GeoPoint,
}

/// Geocoder settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocoderConfig {
    /// Nominatim base URL, without the `/search` or `/reverse` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Appended to free-text searches to keep matches in the covered city
    /// (e.g., `"Chicago, IL"`).
    pub city_context: String,
    /// Maximum candidates returned from a search.
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: usize,
    /// Per-request network timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl GeocoderConfig {
    /// Settings for the public Nominatim instance scoped to `city_context`.
    #[must_use]
    pub fn for_city(city_context: &str) -> Self {
        Self {
            base_url: default_base_url(),
            city_context: city_context.to_string(),
            candidate_limit: default_candidate_limit(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

const fn default_candidate_limit() -> usize {
    3
}

const fn default_timeout_secs() -> u64 {
    10
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,
}

/// Label used when no address is known for a point.
#[must_use]
pub fn coordinate_label(point: GeoPoint) -> String {
    point.to_string()
}
