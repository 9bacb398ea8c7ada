//! Socrata SODA API incident fetcher.
//!
//! Pages through `$where`/`$limit`/`$offset`/`$order` queries until a short
//! page or the feed's `max_pages` is reached. The date range is always
//! pushed to the feed; the bounding-box strategy also pushes the
//! latitude/longitude range, while the exact-radius strategy filters a
//! broader batch client-side by geodesic distance.

use std::time::Duration;

use async_trait::async_trait;
use nox_crime_incident_models::{IncidentRecord, IncidentSet};

use crate::feed_def::{FeedColumns, FeedDefinition};
use crate::geometry::{BoundingBox, within_radius};
use crate::parsing::parse_record;
use crate::{FeedQuery, FetchError, FilterStrategy, IncidentFetcher};

/// Timestamp format used in `$where` clauses.
const SOQL_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const USER_AGENT: &str = concat!("nox-crime/", env!("CARGO_PKG_VERSION"));

/// Incident fetcher backed by a Socrata dataset.
pub struct SocrataFetcher {
    client: reqwest::Client,
    feed: FeedDefinition,
    strategy: FilterStrategy,
}

impl SocrataFetcher {
    /// Creates a fetcher using the feed's default strategy and a client
    /// bounded by the feed's timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the HTTP client cannot be built.
    pub fn new(feed: FeedDefinition) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(feed.timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self::with_client(client, feed))
    }

    /// Creates a fetcher around an existing client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, feed: FeedDefinition) -> Self {
        let strategy = feed.strategy;
        Self {
            client,
            feed,
            strategy,
        }
    }

    /// Overrides the filtering strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: FilterStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// The active filtering strategy.
    #[must_use]
    pub const fn strategy(&self) -> FilterStrategy {
        self.strategy
    }

    /// The feed this fetcher queries.
    #[must_use]
    pub const fn feed(&self) -> &FeedDefinition {
        &self.feed
    }

    /// Records requested per page under the active strategy.
    #[must_use]
    pub const fn page_limit(&self) -> u64 {
        self.feed.page_size.for_strategy(self.strategy)
    }

    /// Query parameters for the page of `query` starting at `offset`.
    #[must_use]
    pub fn query_params(&self, query: &FeedQuery, offset: u64) -> Vec<(&'static str, String)> {
        let columns = &self.feed.columns;
        vec![
            ("$where", where_clause(columns, query, self.strategy)),
            ("$limit", self.page_limit().to_string()),
            ("$offset", offset.to_string()),
            ("$order", format!("{} DESC", columns.date)),
        ]
    }

    async fn fetch_page(
        &self,
        query: &FeedQuery,
        offset: u64,
    ) -> Result<Vec<serde_json::Value>, FetchError> {
        let response = self
            .client
            .get(&self.feed.api_url)
            .query(&self.query_params(query, offset))
            .send()
            .await
            .inspect_err(|e| log::error!("{} feed request failed: {e}", self.feed.id))?;

        let status = response.status();
        if !status.is_success() {
            log::error!("{} feed returned HTTP {status}", self.feed.id);
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        let body: serde_json::Value = serde_json::from_str(&text)?;
        let serde_json::Value::Array(rows) = body else {
            return Err(FetchError::Decode {
                message: format!("{} feed response is not an array", self.feed.id),
            });
        };

        Ok(rows)
    }
}

#[async_trait]
impl IncidentFetcher for SocrataFetcher {
    fn id(&self) -> &str {
        &self.feed.id
    }

    fn name(&self) -> &str {
        &self.feed.name
    }

    async fn fetch(&self, query: &FeedQuery) -> Result<IncidentSet, FetchError> {
        let page_limit = self.page_limit();

        log::debug!(
            "Fetching {} incidents: strategy={}, point={}, radius={}km",
            self.feed.id,
            self.strategy,
            query.point,
            query.radius_km
        );

        let mut rows: Vec<serde_json::Value> = Vec::new();
        let mut offset: u64 = 0;
        let mut pages: u64 = 0;

        loop {
            let page = self.fetch_page(query, offset).await?;
            let count = page.len() as u64;
            rows.extend(page);
            offset += count;
            pages += 1;

            if count < page_limit {
                break;
            }
            if pages >= self.feed.max_pages {
                log::warn!(
                    "{} feed still had full pages after {offset} records ({pages} x {page_limit}); \
                     incidents beyond that are not counted",
                    self.feed.id
                );
                break;
            }
            log::debug!("{} feed page full, fetching from offset {offset}", self.feed.id);
        }

        let received = rows.len();
        let incidents = collect_incidents(rows, &self.feed.columns, query, self.strategy);

        log::info!(
            "Fetched {} incidents near {} ({received} received from {} in {pages} page(s))",
            incidents.len(),
            query.point,
            self.feed.id
        );

        Ok(incidents)
    }
}

/// Builds the SoQL `$where` clause for `query`.
#[must_use]
pub fn where_clause(columns: &FeedColumns, query: &FeedQuery, strategy: FilterStrategy) -> String {
    let start = query.window.start().format(SOQL_TIMESTAMP_FORMAT);
    let end = query.window.end().format(SOQL_TIMESTAMP_FORMAT);
    let date_range = format!("{} between '{start}' and '{end}'", columns.date);

    let area = match strategy {
        FilterStrategy::BoundingBox => {
            let bbox = BoundingBox::around(query.point, query.radius_km);
            format!(
                "{lat} >= {} AND {lat} <= {} AND {lon} >= {} AND {lon} <= {}",
                bbox.min_lat,
                bbox.max_lat,
                bbox.min_lon,
                bbox.max_lon,
                lat = columns.latitude,
                lon = columns.longitude,
            )
        }
        FilterStrategy::ExactRadius => format!(
            "{} IS NOT NULL AND {} IS NOT NULL",
            columns.latitude, columns.longitude
        ),
    };

    format!("{date_range} AND {area}")
}

/// Parses raw rows and keeps those matching `query` under `strategy`.
///
/// Malformed rows are skipped. Rows whose timestamp parses but falls
/// outside the window are dropped; rows with an unparseable timestamp are
/// kept since the feed already filtered on its own date column.
#[must_use]
pub fn collect_incidents(
    rows: Vec<serde_json::Value>,
    columns: &FeedColumns,
    query: &FeedQuery,
    strategy: FilterStrategy,
) -> IncidentSet {
    let bbox = BoundingBox::around(query.point, query.radius_km);
    let mut malformed = 0_usize;

    let incidents: IncidentSet = rows
        .into_iter()
        .filter_map(|row| {
            let record = parse_record(row, columns);
            if record.is_none() {
                malformed += 1;
            }
            record
        })
        .filter(|record| in_window(record, query))
        .filter(|record| match strategy {
            FilterStrategy::BoundingBox => bbox.contains(record.location),
            FilterStrategy::ExactRadius => {
                within_radius(query.point, record.location, query.radius_km)
            }
        })
        .collect();

    if malformed > 0 {
        log::debug!("Skipped {malformed} malformed incident records");
    }

    incidents
}

fn in_window(record: &IncidentRecord, query: &FeedQuery) -> bool {
    record
        .occurred_at
        .is_none_or(|at| query.window.contains(at))
}
