//! Brief configuration.
//!
//! The defaults live in `config/brief.toml`, embedded at compile time.
//! Callers may load their own TOML with [`BriefConfig::from_toml_str`].

use serde::Deserialize;

use crate::BriefError;

const EMBEDDED_CONFIG: &str = include_str!("../config/brief.toml");

/// Maps a category keyword to an advisory line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AdvisoryRule {
    /// Case-insensitive substring matched against category names.
    pub keyword: String,
    /// Advisory shown when the keyword matches.
    pub advice: String,
}

impl AdvisoryRule {
    /// Whether this rule applies to `category`.
    #[must_use]
    pub fn matches(&self, category: &str) -> bool {
        category
            .to_lowercase()
            .contains(&self.keyword.to_lowercase())
    }
}

/// Tunable parts of brief generation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BriefConfig {
    /// Incident counts strictly above this set the elevated-activity flag.
    pub elevated_activity_threshold: u64,
    /// Keyword rules, in priority order.
    #[serde(default)]
    pub advisories: Vec<AdvisoryRule>,
}

impl BriefConfig {
    /// Parses and validates a brief configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BriefError`] if the TOML is malformed or a rule has an
    /// empty keyword or advice.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, BriefError> {
        let config: Self = toml::de::from_str(toml_str)?;

        if let Some(rule) = config
            .advisories
            .iter()
            .find(|rule| rule.keyword.trim().is_empty() || rule.advice.trim().is_empty())
        {
            return Err(BriefError::Invalid {
                message: format!("advisory rule {rule:?} has an empty keyword or advice"),
            });
        }

        Ok(config)
    }

    /// The built-in configuration.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (this is a compile-time
    /// guarantee since the config is embedded).
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_toml_str(EMBEDDED_CONFIG)
            .unwrap_or_else(|e| panic!("Failed to parse brief.toml: {e}"))
    }
}

impl Default for BriefConfig {
    fn default() -> Self {
        Self::embedded()
    }
}
