//! # Matrix Crate
//!
//! Turns a `RatingStore` into the user × movie `RatingMatrix` that both
//! recommenders read, and provides the correlation they share.
//!
//! ## Components
//!
//! - **builder**: `MatrixBuilder` (popularity filter + pivot)
//! - **rating_matrix**: the immutable matrix with row and column views
//! - **correlation**: pairwise-complete Pearson over sparse vectors
//! - **error**: `RecommendError`, used by every query on the matrix
//!
//! ## Example Usage
//!
//! ```ignore
//! use matrix::MatrixBuilder;
//! use std::sync::Arc;
//!
//! let matrix = Arc::new(MatrixBuilder::new().with_min_votes(1000).build(&store)?);
//! println!("{} users x {} movies", matrix.n_users(), matrix.n_movies());
//! ```

pub mod builder;
pub mod correlation;
pub mod error;
pub mod rating_matrix;

pub use builder::{DEFAULT_MIN_VOTES, MatrixBuilder};
pub use correlation::{Entry, MIN_SHARED_OBSERVATIONS, overlap, pearson};
pub use error::{RecommendError, Result};
pub use rating_matrix::RatingMatrix;
