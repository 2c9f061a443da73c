//! Item-based collaborative filtering.
//!
//! "Movies rated like this one."
//!
//! Correlates the reference movie's column of the rating matrix with every
//! other column, over the users who rated both, and returns the closest
//! movies.

use crate::types::SimilarMovie;
use crate::user_based::DEFAULT_TOP_K;
use data_loader::MovieId;
use matrix::{RatingMatrix, RecommendError, Result, overlap, pearson};
use rayon::prelude::*;
use tracing::{debug, instrument};

/// Ranks movies by rating correlation with a reference movie
#[derive(Debug, Clone)]
pub struct ItemBasedRecommender {
    top_k: usize,
}

impl ItemBasedRecommender {
    pub fn new() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Configure how many movies to return (default: 5)
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Movies most correlated with `reference`, best first.
    ///
    /// The reference itself is always excluded, as are movies whose
    /// correlation with it is undefined.
    #[instrument(skip(self, matrix))]
    pub fn recommend_similar(
        &self,
        matrix: &RatingMatrix,
        reference: MovieId,
    ) -> Result<Vec<SimilarMovie>> {
        let reference_column = matrix
            .column_index(reference)
            .ok_or(RecommendError::UnknownMovie(reference))?;
        let reference_vector = matrix.column(reference_column);

        // Column order is movie id order, so sorting on the column index
        // breaks ties by movie id
        let mut scored: Vec<(usize, f64)> = (0..matrix.n_movies())
            .into_par_iter()
            .filter(|&column| matrix.movie_at(column) != reference)
            .filter_map(|column| {
                pearson(reference_vector, matrix.column(column)).map(|r| (column, r))
            })
            .collect();

        debug!(
            "Movie {} has a defined correlation with {} of {} movies",
            reference,
            scored.len(),
            matrix.n_movies() - 1
        );

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(self.top_k);

        Ok(scored
            .into_iter()
            .map(|(column, correlation)| SimilarMovie {
                movie_id: matrix.movie_at(column),
                title: matrix.title_at(column).to_string(),
                correlation,
                shared_raters: overlap(reference_vector, matrix.column(column)),
            })
            .collect())
    }

    /// Same as `recommend_similar`, looking the reference up by title
    pub fn recommend_similar_to_title(
        &self,
        matrix: &RatingMatrix,
        title: &str,
    ) -> Result<Vec<SimilarMovie>> {
        let reference = matrix.find_title(title)?;
        self.recommend_similar(matrix, reference)
    }
}

impl Default for ItemBasedRecommender {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{Genre, Movie, Rating, RatingStore, UserId};
    use matrix::MatrixBuilder;

    fn rating(user_id: UserId, movie_id: MovieId, rating: f32) -> Rating {
        Rating {
            user_id,
            movie_id,
            rating,
            timestamp: 1000000,
        }
    }

    fn movie(id: MovieId, title: &str) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            genres: vec![Genre::Thriller],
        }
    }

    /// Columns over users 1-4:
    /// movie 1 (reference) [5, 4, 3, -]
    /// movie 2             [5, 4, 3, 1]  identical on shared users
    /// movie 3             [3, 5, 2, 4]  weakly correlated
    /// movie 4             [1, 2, 3, 4]  anti-correlated
    /// movie 5             [-, -, 4, 4]  one shared rater -> undefined
    fn create_test_matrix() -> RatingMatrix {
        let columns: [(MovieId, [Option<f32>; 4]); 5] = [
            (1, [Some(5.0), Some(4.0), Some(3.0), None]),
            (2, [Some(5.0), Some(4.0), Some(3.0), Some(1.0)]),
            (3, [Some(3.0), Some(5.0), Some(2.0), Some(4.0)]),
            (4, [Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
            (5, [None, None, Some(4.0), Some(4.0)]),
        ];

        let mut ratings = Vec::new();
        for (movie_id, cells) in columns {
            for (i, cell) in cells.iter().enumerate() {
                if let Some(r) = cell {
                    ratings.push(rating(i as UserId + 1, movie_id, *r));
                }
            }
        }
        let movies = vec![
            movie(1, "Reference (1999)"),
            movie(2, "Twin (1999)"),
            movie(3, "Loose (2001)"),
            movie(4, "Opposite (2003)"),
            movie(5, "Sparse (2005)"),
        ];
        let store = RatingStore::from_records(movies, ratings);
        MatrixBuilder::new().with_min_votes(0).build(&store).unwrap()
    }

    #[test]
    fn test_recommend_similar_ranking() {
        let matrix = create_test_matrix();
        let similar = ItemBasedRecommender::new()
            .recommend_similar(&matrix, 1)
            .unwrap();

        let ids: Vec<MovieId> = similar.iter().map(|s| s.movie_id).collect();
        assert_eq!(ids, vec![2, 3, 4]);

        assert!((similar[0].correlation - 1.0).abs() < 1e-9);
        assert_eq!(similar[0].shared_raters, 3);
        assert_eq!(similar[0].title, "Twin (1999)");
        assert!((similar[2].correlation + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_reference_is_excluded() {
        let matrix = create_test_matrix();
        let recommender = ItemBasedRecommender::new().with_top_k(10);

        for &movie_id in matrix.movies() {
            let similar = recommender.recommend_similar(&matrix, movie_id).unwrap();
            assert!(similar.iter().all(|s| s.movie_id != movie_id));
        }
    }

    #[test]
    fn test_top_k() {
        let matrix = create_test_matrix();
        let similar = ItemBasedRecommender::new()
            .with_top_k(1)
            .recommend_similar(&matrix, 1)
            .unwrap();
        assert_eq!(similar.len(), 1);
        assert_eq!(similar[0].movie_id, 2);
    }

    #[test]
    fn test_unknown_movie() {
        let matrix = create_test_matrix();
        let recommender = ItemBasedRecommender::new();

        assert_eq!(
            recommender.recommend_similar(&matrix, 77).unwrap_err(),
            RecommendError::UnknownMovie(77)
        );
        assert!(matches!(
            recommender.recommend_similar_to_title(&matrix, "Missing (1990)"),
            Err(RecommendError::UnknownTitle(_))
        ));
    }

    #[test]
    fn test_lookup_by_title() {
        let matrix = create_test_matrix();
        let recommender = ItemBasedRecommender::new();

        assert_eq!(
            recommender
                .recommend_similar_to_title(&matrix, "Reference (1999)")
                .unwrap(),
            recommender.recommend_similar(&matrix, 1).unwrap()
        );
    }

    #[test]
    fn test_only_undefined_correlations_give_empty_list() {
        let store = RatingStore::from_records(
            vec![movie(1, "A (2000)"), movie(2, "B (2000)")],
            vec![rating(1, 1, 4.0), rating(1, 2, 3.0), rating(2, 2, 5.0)],
        );
        let matrix = MatrixBuilder::new().with_min_votes(0).build(&store).unwrap();

        let similar = ItemBasedRecommender::new()
            .recommend_similar(&matrix, 1)
            .unwrap();
        assert!(similar.is_empty());
    }
}
