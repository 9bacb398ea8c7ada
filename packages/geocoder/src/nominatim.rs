//! Nominatim / OpenStreetMap geocoder client.
//!
//! Nominatim has strict rate limits: **1 request per second** maximum on
//! the public instance. Lookups here are user-initiated and infrequent, so
//! no client-side throttling is applied.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use std::time::Duration;

use nox_crime_incident_models::GeoPoint;

use crate::{AddressCandidate, GeocodeError, GeocoderConfig, coordinate_label};

const USER_AGENT: &str = "NOX Crime Bot";

/// Geocoder backed by a Nominatim instance.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    config: GeocoderConfig,
}

impl NominatimGeocoder {
    /// Creates a geocoder with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn new(config: GeocoderConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, config })
    }

    /// Searches for `address_text` within the configured city and returns
    /// up to `candidate_limit` matches.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the HTTP request or response parsing
    /// fails.
    pub async fn search(&self, address_text: &str) -> Result<Vec<AddressCandidate>, GeocodeError> {
        let query = format!("{address_text}, {}", self.config.city_context);
        let limit = self.config.candidate_limit.to_string();
        let resp = self
            .client
            .get(format!("{}/search", self.config.base_url))
            .query(&[
                ("q", query.as_str()),
                ("format", "jsonv2"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        let body: serde_json::Value = resp.json().await?;
        let mut candidates = parse_search_response(&body)?;
        candidates.truncate(self.config.candidate_limit);
        Ok(candidates)
    }

    /// Looks up the address at `point`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the HTTP request or response parsing
    /// fails.
    pub async fn reverse(&self, point: GeoPoint) -> Result<Option<String>, GeocodeError> {
        let lat = point.latitude().to_string();
        let lon = point.longitude().to_string();
        let resp = self
            .client
            .get(format!("{}/reverse", self.config.base_url))
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("format", "jsonv2"),
            ])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        let body: serde_json::Value = resp.json().await?;
        Ok(parse_reverse_response(&body))
    }

    /// Returns a display label for `point`, falling back to the formatted
    /// coordinate when reverse lookup fails or finds nothing.
    pub async fn label_for(&self, point: GeoPoint) -> String {
        match self.reverse(point).await {
            Ok(Some(address)) => address,
            Ok(None) => coordinate_label(point),
            Err(e) => {
                log::warn!("Reverse geocoding failed for {point}: {e}");
                coordinate_label(point)
            }
        }
    }
}

/// Parses a Nominatim search response. Entries without usable coordinates
/// are skipped.
fn parse_search_response(body: &serde_json::Value) -> Result<Vec<AddressCandidate>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    Ok(results
        .iter()
        .filter_map(|result| {
            let lat = result["lat"].as_str()?.parse::<f64>().ok()?;
            let lon = result["lon"].as_str()?.parse::<f64>().ok()?;
            let location = GeoPoint::new(lat, lon).ok()?;
            let address = result["display_name"].as_str()?.to_string();
            Some(AddressCandidate { address, location })
        })
        .collect())
}

/// Extracts the display name from a Nominatim reverse response. Nominatim
/// reports "nothing here" as an object with an `error` field.
fn parse_reverse_response(body: &serde_json::Value) -> Option<String> {
    body["display_name"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(String::from)
}
