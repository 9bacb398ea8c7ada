#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Incident feed fetcher.
//!
//! Retrieves incidents near a point within a reporting window from a public
//! open-data feed. Two interchangeable [`FilterStrategy`] variants sit
//! behind the same [`IncidentFetcher`] contract:
//!
//! * [`FilterStrategy::BoundingBox`] pushes a latitude/longitude range into
//!   the feed's own query language. Cheap, but a box rather than a circle.
//! * [`FilterStrategy::ExactRadius`] fetches a time-windowed batch and keeps
//!   only records within the geodesic radius of the point.
//!
//! A failed fetch is always surfaced as a [`FetchError`]; it is never
//! reported as an empty incident set.

pub mod feed_def;
pub mod geometry;
pub mod parsing;
pub mod registry;
pub mod socrata;

use async_trait::async_trait;
use nox_crime_incident_models::{
    GeoPoint, IncidentSet, InvalidInputError, TimeWindow, validate_radius,
};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Errors that make incident data unavailable for a request.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Connection failure, timeout or body read failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The feed answered with a non-success status.
    #[error("Feed returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The response body was not valid JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The response was JSON but not the expected shape.
    #[error("Unexpected feed response: {message}")]
    Decode {
        /// Description of what went wrong.
        message: String,
    },
}

impl FetchError {
    /// Whether this error means "data unavailable" as opposed to a
    /// legitimate zero-incident result.
    ///
    /// Always `true`: a feed that fails for any reason has produced no data,
    /// and a zero-incident week is only ever reported as `Ok` with an empty
    /// set. Input problems are rejected earlier as
    /// [`InvalidInputError`] when the [`FeedQuery`] is built.
    #[must_use]
    #[allow(clippy::unused_self)]
    pub const fn is_unavailable(&self) -> bool {
        true
    }
}

/// How incidents are restricted to the area around the query point.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FilterStrategy {
    /// Latitude/longitude range pushed to the feed query.
    #[default]
    BoundingBox,
    /// Client-side geodesic distance check on a time-windowed batch.
    ExactRadius,
}

/// A validated fetch request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedQuery {
    /// Center of the search area.
    pub point: GeoPoint,
    /// Search radius in kilometers, strictly positive.
    pub radius_km: f64,
    /// Reporting window.
    pub window: TimeWindow,
}

impl FeedQuery {
    /// Creates a query after validating the radius.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError::Radius`] if `radius_km` is non-finite or
    /// not strictly positive.
    pub fn new(
        point: GeoPoint,
        radius_km: f64,
        window: TimeWindow,
    ) -> Result<Self, InvalidInputError> {
        Ok(Self {
            point,
            radius_km: validate_radius(radius_km)?,
            window,
        })
    }
}

/// Trait that all incident feeds implement.
#[async_trait]
pub trait IncidentFetcher: Send + Sync {
    /// Returns a unique identifier for this feed (e.g., `"chicago"`).
    fn id(&self) -> &str;

    /// Returns the human-readable name of this feed.
    fn name(&self) -> &str;

    /// Fetches incidents within `query.radius_km` of `query.point` that
    /// occurred inside `query.window`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the feed cannot be reached or its response
    /// cannot be decoded.
    async fn fetch(&self, query: &FeedQuery) -> Result<IncidentSet, FetchError>;
}
