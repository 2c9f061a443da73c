//! Recommender configuration.
//!
//! Every field has a default, so a JSON file only needs the values it
//! changes:
//!
//! ```json
//! { "min_votes": 500, "top_k": 10 }
//! ```

use data_loader::RatingStore;
use matrix::{DEFAULT_MIN_VOTES, MatrixBuilder};
use recommenders::{
    DEFAULT_MIN_CORRELATION, DEFAULT_OVERLAP_FRACTION, DEFAULT_SCORE_THRESHOLD, DEFAULT_TOP_K,
    ItemBasedRecommender, NeighborhoodSelector, UserBasedRecommender,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Tuning parameters for the whole pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecommenderConfig {
    /// Movies need strictly more ratings than this to enter the matrix
    pub min_votes: u32,
    pub overlap_fraction: f64,
    pub min_correlation: f64,
    pub score_threshold: f64,
    pub top_k: usize,
    /// Drop movies the target already rated from user-based results
    pub exclude_watched: bool,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            min_votes: DEFAULT_MIN_VOTES,
            overlap_fraction: DEFAULT_OVERLAP_FRACTION,
            min_correlation: DEFAULT_MIN_CORRELATION,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            top_k: DEFAULT_TOP_K,
            exclude_watched: false,
        }
    }
}

impl RecommenderConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.overlap_fraction) {
            return Err(ConfigError::Invalid {
                field: "overlap_fraction",
                reason: format!("{} is outside [0, 1]", self.overlap_fraction),
            });
        }
        if !(-1.0..=1.0).contains(&self.min_correlation) {
            return Err(ConfigError::Invalid {
                field: "min_correlation",
                reason: format!("{} is outside [-1, 1]", self.min_correlation),
            });
        }
        if !self.score_threshold.is_finite() {
            return Err(ConfigError::Invalid {
                field: "score_threshold",
                reason: "must be a finite number".to_string(),
            });
        }
        if self.top_k == 0 {
            return Err(ConfigError::Invalid {
                field: "top_k",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn matrix_builder(&self) -> MatrixBuilder {
        MatrixBuilder::new().with_min_votes(self.min_votes)
    }

    pub fn neighborhood_selector(&self) -> NeighborhoodSelector {
        NeighborhoodSelector::new()
            .with_overlap_fraction(self.overlap_fraction)
            .with_min_correlation(self.min_correlation)
    }

    pub fn user_based(&self, store: Arc<RatingStore>) -> UserBasedRecommender {
        UserBasedRecommender::new(store)
            .with_score_threshold(self.score_threshold)
            .with_top_k(self.top_k)
            .with_exclude_watched(self.exclude_watched)
    }

    pub fn item_based(&self) -> ItemBasedRecommender {
        ItemBasedRecommender::new().with_top_k(self.top_k)
    }
}
