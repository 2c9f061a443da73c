//! Neighborhood selection - users who rate like the target user.
//!
//! ## Algorithm
//! 1. Collect the target's watched movies (non-missing cells of its row)
//! 2. Count, for every user, how many of those movies they rated
//! 3. Keep users whose count is strictly above `watched * overlap_fraction`
//! 4. Correlate each kept user with the target over the watched movies
//! 5. Keep correlations >= `min_correlation`, best first

use crate::types::Neighbor;
use data_loader::UserId;
use matrix::{RatingMatrix, RecommendError, Result, pearson};
use rayon::prelude::*;
use tracing::{debug, instrument};

/// Share of the target's watched movies another user must have rated
pub const DEFAULT_OVERLAP_FRACTION: f64 = 0.60;

/// Lowest correlation accepted into the neighborhood
pub const DEFAULT_MIN_CORRELATION: f64 = 0.65;

/// Selects the users most similar to a target user
#[derive(Debug, Clone)]
pub struct NeighborhoodSelector {
    overlap_fraction: f64,
    min_correlation: f64,
}

impl NeighborhoodSelector {
    pub fn new() -> Self {
        Self {
            overlap_fraction: DEFAULT_OVERLAP_FRACTION,
            min_correlation: DEFAULT_MIN_CORRELATION,
        }
    }

    /// Configure the overlap fraction (default: 0.60)
    pub fn with_overlap_fraction(mut self, fraction: f64) -> Self {
        self.overlap_fraction = fraction;
        self
    }

    /// Configure the correlation floor (default: 0.65)
    pub fn with_min_correlation(mut self, min: f64) -> Self {
        self.min_correlation = min;
        self
    }

    pub fn overlap_fraction(&self) -> f64 {
        self.overlap_fraction
    }

    pub fn min_correlation(&self) -> f64 {
        self.min_correlation
    }

    /// Neighbors of `target`, by correlation descending then user id ascending.
    ///
    /// The target itself is never part of the result. Users whose
    /// correlation is undefined (fewer than two shared ratings, or a constant
    /// rating pattern) are left out.
    #[instrument(skip(self, matrix))]
    pub fn select_neighbors(&self, matrix: &RatingMatrix, target: UserId) -> Result<Vec<Neighbor>> {
        let target_row = matrix
            .row_index(target)
            .ok_or(RecommendError::UnknownUser(target))?;

        // The target's row only holds watched columns, so correlating against
        // it restricts every pair to the watched movies
        let watched = matrix.row(target_row);
        let mut is_watched = vec![false; matrix.n_movies()];
        for &(column, _) in watched {
            is_watched[column] = true;
        }

        let threshold = watched.len() as f64 * self.overlap_fraction;
        let candidates: Vec<usize> = (0..matrix.n_users())
            .into_par_iter()
            .filter(|&row| {
                let shared = matrix
                    .row(row)
                    .iter()
                    .filter(|&&(column, _)| is_watched[column])
                    .count();
                shared as f64 > threshold
            })
            .collect();

        debug!(
            "User {} watched {} movies; {} users exceed the overlap threshold {:.1}",
            target,
            watched.len(),
            candidates.len(),
            threshold
        );

        let mut neighbors: Vec<Neighbor> = candidates
            .par_iter()
            .filter(|&&row| row != target_row)
            .filter_map(|&row| {
                let correlation = pearson(watched, matrix.row(row))?;
                (correlation >= self.min_correlation).then(|| Neighbor {
                    user_id: matrix.user_at(row),
                    correlation,
                })
            })
            .collect();

        neighbors.sort_by(|a, b| {
            b.correlation
                .total_cmp(&a.correlation)
                .then(a.user_id.cmp(&b.user_id))
        });

        debug!("Selected {} neighbors for user {}", neighbors.len(), target);
        Ok(neighbors)
    }
}

impl Default for NeighborhoodSelector {
    fn default() -> Self {
        Self::new()
    }
}
