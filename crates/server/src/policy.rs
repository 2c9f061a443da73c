//! Choosing which movie an item-based query for a user starts from, and
//! which user a demo query runs for.

use data_loader::{MovieId, RatingStore, UserId};
use matrix::RatingMatrix;
use rand::Rng;
use rand::seq::IndexedRandom;

/// Picks the reference movie for an item-based query on behalf of a user
pub trait ReferencePolicy: Send + Sync + std::fmt::Debug {
    /// `None` when nothing the user rated qualifies
    fn select(
        &self,
        store: &RatingStore,
        matrix: &RatingMatrix,
        user_id: UserId,
    ) -> Option<MovieId>;
}

/// The user's most recent rating equal to `top_rating`, restricted to movies
/// in the matrix. Equal timestamps go to the lower movie id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MostRecentTopRated {
    pub top_rating: f32,
}

impl Default for MostRecentTopRated {
    fn default() -> Self {
        Self {
            top_rating: data_loader::MAX_RATING,
        }
    }
}

impl ReferencePolicy for MostRecentTopRated {
    fn select(
        &self,
        store: &RatingStore,
        matrix: &RatingMatrix,
        user_id: UserId,
    ) -> Option<MovieId> {
        store
            .get_user_ratings(user_id)
            .iter()
            .filter(|r| r.rating == self.top_rating && matrix.contains_movie(r.movie_id))
            .max_by(|a, b| {
                a.timestamp
                    .cmp(&b.timestamp)
                    .then(b.movie_id.cmp(&a.movie_id))
            })
            .map(|r| r.movie_id)
    }
}

/// Uniformly sample a user with at least one rating in the matrix
pub fn sample_user<R: Rng + ?Sized>(matrix: &RatingMatrix, rng: &mut R) -> Option<UserId> {
    let candidates: Vec<UserId> = (0..matrix.n_users())
        .filter(|&row| !matrix.row(row).is_empty())
        .map(|row| matrix.user_at(row))
        .collect();
    candidates.choose(rng).copied()
}
