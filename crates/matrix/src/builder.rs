//! MatrixBuilder - popularity filter and pivot.
//!
//! ## Algorithm
//! 1. Join ratings to movies on movie id (ratings without a movie record drop out)
//! 2. Count ratings per movie, keep movies with count > min_votes
//! 3. Pivot: one row per user in the store, one column per kept movie
//! 4. Duplicate (user, movie) ratings collapse to their mean

use crate::correlation::Entry;
use crate::error::{RecommendError, Result};
use crate::rating_matrix::RatingMatrix;
use data_loader::{MovieId, Rating, RatingStore, UserId};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// Default popularity threshold: a movie needs more than this many ratings
pub const DEFAULT_MIN_VOTES: u32 = 1000;

/// Builds a `RatingMatrix` from a `RatingStore`
#[derive(Debug, Clone)]
pub struct MatrixBuilder {
    /// Movies with this many ratings or fewer are dropped
    min_votes: u32,
}

impl MatrixBuilder {
    pub fn new() -> Self {
        Self {
            min_votes: DEFAULT_MIN_VOTES,
        }
    }

    /// Configure the popularity threshold (default: 1000)
    pub fn with_min_votes(mut self, min_votes: u32) -> Self {
        self.min_votes = min_votes;
        self
    }

    pub fn min_votes(&self) -> u32 {
        self.min_votes
    }

    /// Build the matrix.
    ///
    /// Fails with `EmptyResult` when no movie passes the popularity filter.
    #[instrument(skip(self, store), fields(min_votes = self.min_votes))]
    pub fn build(&self, store: &RatingStore) -> Result<RatingMatrix> {
        // Step 1-2: inner join + popularity filter
        let mut movies: Vec<MovieId> = store
            .rated_movies()
            .filter(|(movie_id, ratings)| {
                store.get_movie(*movie_id).is_some() && ratings.len() > self.min_votes as usize
            })
            .map(|(movie_id, _)| movie_id)
            .collect();
        movies.sort_unstable();

        if movies.is_empty() {
            return Err(RecommendError::EmptyResult {
                min_votes: self.min_votes,
            });
        }
        debug!("{} movies pass the popularity filter", movies.len());

        // Every user in the store gets a row, even with nothing retained
        let users = store.user_ids();
        let user_index: HashMap<UserId, usize> =
            users.iter().enumerate().map(|(row, &u)| (u, row)).collect();
        let movie_index: HashMap<MovieId, usize> =
            movies.iter().enumerate().map(|(col, &m)| (m, col)).collect();

        let titles: Vec<String> = movies
            .iter()
            .map(|&m| {
                store
                    .get_movie(m)
                    .map(|movie| movie.title.clone())
                    .unwrap_or_default()
            })
            .collect();

        // Step 3-4: one column per movie, built in parallel, collected in order
        let columns: Vec<Vec<Entry>> = movies
            .par_iter()
            .map(|&movie_id| pivot_column(store.get_movie_ratings(movie_id), &user_index))
            .collect();

        // Transpose; columns are visited in order so every row stays sorted
        let mut rows: Vec<Vec<Entry>> = vec![Vec::new(); users.len()];
        for (col, entries) in columns.iter().enumerate() {
            for &(row, value) in entries {
                rows[row].push((col, value));
            }
        }

        let matrix = RatingMatrix {
            users,
            movies,
            titles,
            user_index,
            movie_index,
            rows,
            columns,
        };

        info!(
            users = matrix.n_users(),
            movies = matrix.n_movies(),
            cells = matrix.n_ratings(),
            "Built rating matrix"
        );
        Ok(matrix)
    }
}

impl Default for MatrixBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn one movie's ratings into a column sorted by row, averaging repeats
fn pivot_column(ratings: &[Rating], user_index: &HashMap<UserId, usize>) -> Vec<Entry> {
    let mut cells: Vec<(usize, f32)> = ratings
        .iter()
        .filter_map(|r| user_index.get(&r.user_id).map(|&row| (row, r.rating)))
        .collect();
    cells.sort_by_key(|&(row, _)| row);

    let mut column: Vec<Entry> = Vec::with_capacity(cells.len());
    let mut i = 0;
    while i < cells.len() {
        let row = cells[i].0;
        let mut sum = 0.0f64;
        let mut count = 0usize;
        while i < cells.len() && cells[i].0 == row {
            sum += cells[i].1 as f64;
            count += 1;
            i += 1;
        }
        column.push((row, (sum / count as f64) as f32));
    }
    column
}
