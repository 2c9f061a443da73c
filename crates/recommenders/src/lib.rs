//! # Recommenders Crate
//!
//! The two collaborative filtering strategies, both reading the shared
//! `RatingMatrix`.
//!
//! ## Components
//!
//! ### Neighborhood Selection
//! Finds users who rated enough of the target's movies, and rated them the
//! same way (Pearson correlation over the target's watched movies).
//!
//! ### User-Based Recommender
//! "Users who rate like you rated these highly":
//! - Weights each neighbor rating by the neighbor's correlation
//! - Averages per movie, keeps scores above the threshold
//!
//! ### Item-Based Recommender
//! "Movies rated like this one":
//! - Correlates the reference movie's ratings with every other movie
//!
//! ## Example Usage
//!
//! ```ignore
//! use recommenders::{ItemBasedRecommender, NeighborhoodSelector, UserBasedRecommender};
//! use matrix::MatrixBuilder;
//! use std::sync::Arc;
//!
//! let store = Arc::new(RatingStore::load_from_files(Path::new("data/ml-20m"))?);
//! let matrix = MatrixBuilder::new().build(&store)?;
//!
//! let neighbors = NeighborhoodSelector::new().select_neighbors(&matrix, user_id)?;
//! let outcome = UserBasedRecommender::new(store.clone()).recommend(&neighbors, user_id);
//!
//! let similar = ItemBasedRecommender::new()
//!     .recommend_similar_to_title(&matrix, "Toy Story (1995)")?;
//! ```

pub mod item_based;
pub mod neighborhood;
pub mod types;
pub mod user_based;

pub use item_based::ItemBasedRecommender;
pub use neighborhood::{DEFAULT_MIN_CORRELATION, DEFAULT_OVERLAP_FRACTION, NeighborhoodSelector};
pub use types::{Neighbor, Signal, SimilarMovie, UserBasedOutcome, UserRecommendation};
pub use user_based::{DEFAULT_SCORE_THRESHOLD, DEFAULT_TOP_K, UserBasedRecommender};

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{Genre, Movie, Rating, RatingStore};
    use matrix::MatrixBuilder;
    use std::sync::Arc;

    fn create_test_store() -> RatingStore {
        let movies = vec![Movie {
            id: 1,
            title: "Test Movie (2000)".to_string(),
            genres: vec![Genre::Action],
        }];
        let ratings = vec![Rating {
            user_id: 1,
            movie_id: 1,
            rating: 5.0,
            timestamp: 1000000,
        }];
        RatingStore::from_records(movies, ratings)
    }

    #[test]
    fn test_defaults() {
        let selector = NeighborhoodSelector::default();
        assert_eq!(selector.overlap_fraction(), DEFAULT_OVERLAP_FRACTION);
        assert_eq!(selector.min_correlation(), DEFAULT_MIN_CORRELATION);
    }

    #[test]
    fn test_single_rating_pipeline() {
        let store = Arc::new(create_test_store());
        let matrix = MatrixBuilder::new().with_min_votes(0).build(&store).unwrap();

        let neighbors = NeighborhoodSelector::new()
            .select_neighbors(&matrix, 1)
            .unwrap();
        assert!(neighbors.is_empty());

        let outcome = UserBasedRecommender::new(store).recommend(&neighbors, 1);
        assert_eq!(outcome.signal, Some(Signal::NoNeighbors));

        let similar = ItemBasedRecommender::new()
            .recommend_similar(&matrix, 1)
            .unwrap();
        assert!(similar.is_empty());
    }
}
