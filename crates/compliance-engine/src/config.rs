//! Tunable parameters for marker placement
//!
//! All distances are in page layout units (the same unit the host reports
//! fragment `y` values and page height in). Every field has a default, so an
//! empty TOML document is a valid configuration.

use crate::error::EngineError;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper clamp bound for every resolved position
    pub top_margin: f64,
    /// Distance from the page bottom that positions may not cross
    pub bottom_margin: f64,
    /// Minimum separation between two markers after overlap resolution
    pub min_gap: f64,
    /// Group markers into a cluster badge after overlap resolution
    pub clustering: bool,
    /// Markers within this distance of a cluster's first member join it
    pub cluster_threshold: f64,
    /// Vertical step between members of an expanded cluster
    pub cluster_stack_spacing: f64,
    /// Length of the short-snippet retry of the verbatim search
    pub query_min_chars: usize,
    /// Longest query used for the verbatim search
    pub query_max_chars: usize,
    /// Minimum length of a usable search string
    pub min_search_text_len: usize,
    pub keyword_max_count: usize,
    /// Fragments per sliding window in the keyword search
    pub keyword_window: usize,
    /// Minimum fraction of keywords a window must contain
    pub keyword_threshold: f64,
    /// Neighbours glued to each fragment in the span search
    pub span_neighbors: usize,
    pub estimated_paragraphs_per_page: u32,
    /// Delays of the re-resolution ladder after a page load event
    pub retry_delays_ms: Vec<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            top_margin: 30.0,
            bottom_margin: 30.0,
            min_gap: 28.0,
            clustering: false,
            cluster_threshold: 50.0,
            cluster_stack_spacing: 22.0,
            query_min_chars: 20,
            query_max_chars: 50,
            min_search_text_len: 10,
            keyword_max_count: 8,
            keyword_window: 3,
            keyword_threshold: 0.55,
            span_neighbors: 2,
            estimated_paragraphs_per_page: 12,
            retry_delays_ms: vec![800, 1500, 2500],
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed,
    /// or the values fail [`EngineConfig::validate`].
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse and validate configuration from a TOML string
    ///
    /// ```
    /// use compliance_engine::config::EngineConfig;
    ///
    /// let config = EngineConfig::from_str("min_gap = 30.0").unwrap();
    /// assert_eq!(config.min_gap, 30.0);
    /// assert_eq!(config.top_margin, 30.0);
    /// ```
    pub fn from_str(s: &str) -> Result<Self, EngineError> {
        let config: EngineConfig =
            toml::from_str(s).map_err(|e| EngineError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let finite_non_negative = |v: f64| v.is_finite() && v >= 0.0;
        let finite_positive = |v: f64| v.is_finite() && v > 0.0;

        if !(finite_non_negative(self.top_margin) && finite_non_negative(self.bottom_margin)) {
            return Err(EngineError::InvalidConfig(
                "margins must be finite and non-negative".to_string(),
            ));
        }
        if !finite_positive(self.min_gap) {
            return Err(EngineError::InvalidConfig(
                "min_gap must be finite and positive".to_string(),
            ));
        }
        if !(finite_non_negative(self.cluster_threshold)
            && finite_positive(self.cluster_stack_spacing))
        {
            return Err(EngineError::InvalidConfig(
                "cluster distances must be finite and positive".to_string(),
            ));
        }
        if self.query_min_chars == 0 || self.query_min_chars > self.query_max_chars {
            return Err(EngineError::InvalidConfig(format!(
                "query_min_chars ({}) must be in 1..=query_max_chars ({})",
                self.query_min_chars, self.query_max_chars
            )));
        }
        if !(self.keyword_threshold > 0.0 && self.keyword_threshold <= 1.0) {
            return Err(EngineError::InvalidConfig(format!(
                "keyword_threshold must be in (0, 1], got {}",
                self.keyword_threshold
            )));
        }
        if self.keyword_window == 0 {
            return Err(EngineError::InvalidConfig(
                "keyword_window must be at least 1".to_string(),
            ));
        }
        if self.estimated_paragraphs_per_page == 0 {
            return Err(EngineError::InvalidConfig(
                "estimated_paragraphs_per_page must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
