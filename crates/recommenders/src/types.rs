//! Result types shared by the recommenders.

use data_loader::{MovieId, UserId};
use matrix::{RecommendError, Result};

/// A user whose ratings correlate with the target user's
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub user_id: UserId,
    /// Pearson correlation with the target over the target's watched movies
    pub correlation: f64,
}

/// One entry of a user-based ranking
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecommendation {
    pub movie_id: MovieId,
    pub title: String,
    /// Mean of correlation × rating over the neighbors who rated the movie
    pub weighted_score: f64,
    /// How many neighbors rated the movie
    pub contributors: usize,
}

/// One entry of an item-based ranking
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarMovie {
    pub movie_id: MovieId,
    pub title: String,
    pub correlation: f64,
    /// Users who rated both this movie and the reference
    pub shared_raters: usize,
}

/// Why a user-based query came back empty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// The neighborhood was empty, so there was nothing to aggregate
    NoNeighbors,
    /// Neighbors exist but no movie scored above the threshold
    NoScoreAboveThreshold,
}

/// Result of `UserBasedRecommender::recommend`.
///
/// An empty neighborhood is not an error; it is reported through `signal`
/// so the caller can relax thresholds or fall back to item-based results.
#[derive(Debug, Clone, PartialEq)]
pub struct UserBasedOutcome {
    pub recommendations: Vec<UserRecommendation>,
    pub signal: Option<Signal>,
}

impl UserBasedOutcome {
    pub fn empty(signal: Signal) -> Self {
        Self {
            recommendations: Vec::new(),
            signal: Some(signal),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty()
    }

    /// Convert into a typed result, turning `NoNeighbors` into an error
    pub fn into_result(self, user_id: UserId) -> Result<Vec<UserRecommendation>> {
        match self.signal {
            Some(Signal::NoNeighbors) => Err(RecommendError::NoNeighbors { user_id }),
            _ => Ok(self.recommendations),
        }
    }
}
