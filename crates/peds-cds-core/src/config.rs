//! Resolver configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// How to choose among several rules that all cover a patient.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RuleSelection {
    /// First covering rule in store order.
    #[default]
    FirstMatch,
    /// Smallest age span, then smallest weight span; open bounds count as infinite.
    NarrowestRange,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResolverConfig {
    pub rule_selection: RuleSelection,
    /// Citations attached to every dosage result
    pub dosage_citations: Vec<String>,
    /// Warn when the per-day total exceeds `max_daily_dose`. Off by default.
    pub daily_dose_warning: bool,
    /// Source name on content citations
    pub citation_source: String,
    pub default_content_limit: usize,
    /// Upper clamp for content result counts
    pub max_content_limit: usize,
    /// Excerpt length in characters
    pub excerpt_chars: usize,
    /// Minimum similarity for drug name suggestions (0.0 - 1.0)
    pub min_suggestion_similarity: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            rule_selection: RuleSelection::FirstMatch,
            dosage_citations: vec![
                "Nelson Textbook of Pediatrics - Pediatric Drug Dosing Guidelines".to_string(),
            ],
            daily_dose_warning: false,
            citation_source: "Nelson Textbook of Pediatrics".to_string(),
            default_content_limit: 10,
            max_content_limit: 50,
            excerpt_chars: 200,
            min_suggestion_similarity: 0.5,
        }
    }
}

impl ResolverConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ResolverConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dosage_citations.is_empty() {
            return Err(ConfigError::Invalid(
                "dosage_citations must not be empty".into(),
            ));
        }
        if self.default_content_limit == 0 || self.max_content_limit == 0 {
            return Err(ConfigError::Invalid("content limits must be positive".into()));
        }
        if self.default_content_limit > self.max_content_limit {
            return Err(ConfigError::Invalid(format!(
                "default_content_limit ({}) exceeds max_content_limit ({})",
                self.default_content_limit, self.max_content_limit
            )));
        }
        if self.excerpt_chars == 0 {
            return Err(ConfigError::Invalid("excerpt_chars must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.min_suggestion_similarity) {
            return Err(ConfigError::Invalid(
                "min_suggestion_similarity must be within 0.0..=1.0".into(),
            ));
        }
        Ok(())
    }
}
