//! User-based collaborative filtering.
//!
//! "Users who rate like you rated these movies highly."
//!
//! ## Algorithm
//! 1. Look up every rating each neighbor has made (full catalog, not just
//!    the matrix columns)
//! 2. Weight each rating by the neighbor's correlation with the target
//! 3. Average the weighted ratings per movie
//! 4. Keep movies whose average is above the score threshold, best first

use crate::types::{Neighbor, Signal, UserBasedOutcome, UserRecommendation};
use data_loader::{MovieId, RatingStore, UserId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Weighted scores must be strictly above this to be recommended
pub const DEFAULT_SCORE_THRESHOLD: f64 = 3.5;

/// Default number of recommendations returned
pub const DEFAULT_TOP_K: usize = 5;

/// Ranks movies by the correlation-weighted ratings of a neighborhood
#[derive(Debug, Clone)]
pub struct UserBasedRecommender {
    /// Shared reference to the raw ratings (read-only, so no Mutex needed)
    store: Arc<RatingStore>,

    score_threshold: f64,
    top_k: usize,

    /// Drop movies the target already rated before ranking
    exclude_watched: bool,
}

impl UserBasedRecommender {
    pub fn new(store: Arc<RatingStore>) -> Self {
        Self {
            store,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            top_k: DEFAULT_TOP_K,
            exclude_watched: false,
        }
    }

    /// Configure the weighted score threshold (default: 3.5)
    pub fn with_score_threshold(mut self, threshold: f64) -> Self {
        self.score_threshold = threshold;
        self
    }

    /// Configure how many movies to return (default: 5)
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Skip movies the target has already rated (default: false)
    pub fn with_exclude_watched(mut self, exclude: bool) -> Self {
        self.exclude_watched = exclude;
        self
    }

    /// Rank movies for `target` from its neighborhood.
    ///
    /// Ratings made by the target itself never contribute. An empty
    /// neighborhood yields an empty outcome with `Signal::NoNeighbors`.
    #[instrument(skip(self, neighbors), fields(neighbors = neighbors.len()))]
    pub fn recommend(&self, neighbors: &[Neighbor], target: UserId) -> UserBasedOutcome {
        let contributors: Vec<&Neighbor> =
            neighbors.iter().filter(|n| n.user_id != target).collect();
        if contributors.is_empty() {
            debug!("No neighbors for user {}", target);
            return UserBasedOutcome::empty(Signal::NoNeighbors);
        }

        let scores = self.weighted_scores(&contributors);

        let watched: HashSet<MovieId> = if self.exclude_watched {
            self.store
                .get_user_ratings(target)
                .iter()
                .map(|r| r.movie_id)
                .collect()
        } else {
            HashSet::new()
        };

        let mut ranked: Vec<(MovieId, f64, usize)> = scores
            .into_iter()
            .map(|(movie_id, (sum, count))| (movie_id, sum / count as f64, count))
            .filter(|&(movie_id, score, _)| {
                score > self.score_threshold && !watched.contains(&movie_id)
            })
            .collect();

        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        let above_threshold = ranked.len();
        ranked.truncate(self.top_k);

        let recommendations: Vec<UserRecommendation> = ranked
            .into_iter()
            .filter_map(|(movie_id, weighted_score, contributors)| {
                let movie = self.store.get_movie(movie_id)?;
                Some(UserRecommendation {
                    movie_id,
                    title: movie.title.clone(),
                    weighted_score,
                    contributors,
                })
            })
            .collect();

        debug!(
            "Recommending {} movies to user {} from {} neighbors",
            recommendations.len(),
            target,
            contributors.len()
        );

        // An empty list caused by top_k or missing titles is not a threshold miss
        let signal = (above_threshold == 0).then_some(Signal::NoScoreAboveThreshold);
        UserBasedOutcome {
            recommendations,
            signal,
        }
    }

    /// Sum and count of correlation × rating per movie.
    ///
    /// Neighbors are visited in the given order, so the floating point sums
    /// are the same on every call.
    fn weighted_scores(&self, neighbors: &[&Neighbor]) -> HashMap<MovieId, (f64, usize)> {
        let mut scores: HashMap<MovieId, (f64, usize)> = HashMap::new();
        for neighbor in neighbors {
            for rating in self.store.get_user_ratings(neighbor.user_id) {
                let entry = scores.entry(rating.movie_id).or_insert((0.0, 0));
                entry.0 += neighbor.correlation * rating.rating as f64;
                entry.1 += 1;
            }
        }
        scores
    }
}
