//! RatingStore loading and validation.
//!
//! Reads `movie.csv` and `rating.csv` from a dataset directory, fills the
//! store and checks rating values before anything downstream sees them.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use std::path::Path;
use tracing::{info, warn};

/// File name of the movie table inside a dataset directory
pub const MOVIES_FILE: &str = "movie.csv";

/// File name of the rating table inside a dataset directory
pub const RATINGS_FILE: &str = "rating.csv";

impl RatingStore {
    /// Load the MovieLens CSV tables from a directory
    ///
    /// Steps:
    /// 1. Parse both files in parallel
    /// 2. Insert movies and ratings
    /// 3. Validate rating values and report orphan ratings
    pub fn load_from_files(data_dir: &Path) -> Result<Self> {
        info!("Loading MovieLens tables from {:?}", data_dir);

        let movies_path = data_dir.join(MOVIES_FILE);
        let ratings_path = data_dir.join(RATINGS_FILE);

        // rating.csv dominates the load time, movie.csv rides along
        let (movies, ratings) = rayon::join(
            || parser::parse_movies(&movies_path),
            || parser::parse_ratings(&ratings_path),
        );
        let movies = movies?;
        let ratings = ratings?;

        info!("Parsed {} movies, {} ratings", movies.len(), ratings.len());

        let store = Self::from_records(movies, ratings);
        store.validate()?;

        let (users, movies, ratings) = store.counts();
        info!(users, movies, ratings, "RatingStore built and validated");
        Ok(store)
    }

    /// Build a store from already-parsed records
    pub fn from_records(movies: Vec<Movie>, ratings: Vec<Rating>) -> Self {
        let mut store = RatingStore::new();
        for movie in movies {
            store.insert_movie(movie);
        }
        for rating in ratings {
            store.insert_rating(rating);
        }
        store
    }

    /// Validate data integrity
    ///
    /// The store must hold at least one rating, and rating values must lie
    /// in [0.5, 5.0]. Ratings for movie ids without a movie record are legal
    /// (they never reach the matrix) and are only counted and logged.
    pub fn validate(&self) -> Result<()> {
        if self.rating_count == 0 {
            return Err(DataLoadError::ValidationError(
                "no ratings were loaded".to_string(),
            ));
        }

        if let Some(bad) = self
            .user_ratings
            .values()
            .flatten()
            .find(|r| !(MIN_RATING..=MAX_RATING).contains(&r.rating))
        {
            return Err(DataLoadError::InvalidValue {
                field: "rating".to_string(),
                value: bad.rating.to_string(),
            });
        }

        let orphans = self.orphan_rating_count();
        if orphans > 0 {
            warn!(orphans, "Ratings reference movie ids with no movie record");
        }
        Ok(())
    }

    /// Number of ratings whose movie id has no movie record
    pub fn orphan_rating_count(&self) -> usize {
        self.movie_ratings
            .iter()
            .filter(|(movie_id, _)| !self.movies.contains_key(movie_id))
            .map(|(_, ratings)| ratings.len())
            .sum()
    }
}
