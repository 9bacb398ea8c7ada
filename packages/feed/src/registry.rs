//! Feed registry: loads feed definitions from embedded TOML configs.
//!
//! Each `.toml` file in `packages/feed/feeds/` is baked into the binary at
//! compile time via [`include_str!`].

use crate::feed_def::{FeedDefinition, parse_feed_toml};

/// TOML configs embedded at compile time.
const FEED_TOMLS: &[(&str, &str)] = &[("chicago", include_str!("../feeds/chicago.toml"))];

/// Feed used when the caller does not name one.
pub const DEFAULT_FEED_ID: &str = "chicago";

#[cfg(test)]
const EXPECTED_FEED_COUNT: usize = 1;

/// Returns all configured feed definitions, parsed from embedded TOML.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_feeds() -> Vec<FeedDefinition> {
    FEED_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_feed_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up a feed definition by id.
#[must_use]
pub fn feed_by_id(id: &str) -> Option<FeedDefinition> {
    all_feeds().into_iter().find(|feed| feed.id == id)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn loads_all_feeds() {
        assert_eq!(all_feeds().len(), EXPECTED_FEED_COUNT);
    }

    #[test]
    fn feed_ids_are_unique() {
        let mut seen = BTreeSet::new();
        for feed in all_feeds() {
            assert!(seen.insert(feed.id.clone()), "Duplicate feed ID: {}", feed.id);
        }
    }

    #[test]
    fn default_feed_exists() {
        let feed = feed_by_id(DEFAULT_FEED_ID).unwrap();
        assert_eq!(feed.columns.category, "primary_type");
        assert!(feed.api_url.starts_with("https://"));
    }

    #[test]
    fn unknown_feed_is_none() {
        assert!(feed_by_id("atlantis").is_none());
    }
}
