//! Fetch-then-summarize orchestration.
//!
//! `Ok` with an all-clear brief means the feed answered with zero
//! incidents. `Err` means the data was unavailable; callers must not show
//! that as "all clear".

use chrono::Utc;
use nox_crime_brief_models::Brief;
use nox_crime_feed::{FeedQuery, FetchError, IncidentFetcher};

use crate::generator::BriefGenerator;

/// Fetches incidents for `query` and summarizes them under `label`.
///
/// # Errors
///
/// Returns the fetcher's [`FetchError`] unchanged when the feed is
/// unavailable.
pub async fn generate_report(
    fetcher: &dyn IncidentFetcher,
    generator: &BriefGenerator,
    query: &FeedQuery,
    label: &str,
) -> Result<Brief, FetchError> {
    let incidents = fetcher.fetch(query).await.inspect_err(|e| {
        log::warn!("Incident data unavailable from {}: {e}", fetcher.id());
    })?;

    let brief = generator.generate(&incidents, query.point, label, Utc::now());
    log::info!(
        "Built brief for '{label}': {} incidents, all_clear={}",
        brief.incident_count,
        brief.is_all_clear()
    );

    Ok(brief)
}
