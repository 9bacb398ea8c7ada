#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Brief generator.
//!
//! Turns an incident set into a [`Brief`]: total count, the top categories
//! with their share, the riskiest time of day and weekday, and a short list
//! of advisories chosen from a keyword rule table. [`report`] composes a
//! fetch with summarization and keeps "data unavailable" distinct from
//! "all clear".

pub mod config;
pub mod generator;
pub mod render;
pub mod report;

pub use config::{AdvisoryRule, BriefConfig};
pub use generator::{BriefGenerator, summarize};
pub use nox_crime_brief_models::{Brief, CategoryShare, DayOfWeek, TimeBucket};
pub use render::{RenderOptions, render_brief};
pub use report::generate_report;

/// Errors from loading brief configuration.
#[derive(Debug, thiserror::Error)]
pub enum BriefError {
    /// TOML syntax or shape error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A configuration value is unusable.
    #[error("Invalid brief config: {message}")]
    Invalid {
        /// Description of what went wrong.
        message: String,
    },
}
