//! Errors shared by the matrix and recommender crates.
//!
//! Every variant is recoverable: callers can relax a threshold and retry, or
//! report that no recommendation is available.

use data_loader::{MovieId, UserId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommendError {
    /// The popularity filter removed every movie
    #[error("No movie has more than {min_votes} ratings; the rating matrix would be empty")]
    EmptyResult { min_votes: u32 },

    #[error("User {0} is not a row of the rating matrix")]
    UnknownUser(UserId),

    #[error("Movie {0} is not a column of the rating matrix")]
    UnknownMovie(MovieId),

    #[error("No movie in the rating matrix is titled {0:?}")]
    UnknownTitle(String),

    /// Several retained movies share the title
    #[error("Title {title:?} matches several movies: {ids:?}")]
    AmbiguousTitle { title: String, ids: Vec<MovieId> },

    #[error("No user correlates with user {user_id} above the threshold")]
    NoNeighbors { user_id: UserId },

    #[error("Reference policy selected no movie for user {user_id}")]
    NoReferenceMovie { user_id: UserId },
}

pub type Result<T> = std::result::Result<T, RecommendError>;
