//! # Data Loader Crate
//!
//! Loads the MovieLens `movie.csv` / `rating.csv` tables into a read-only
//! `RatingStore`.
//!
//! ## Main Components
//!
//! - **types**: Domain types (Movie, Rating, Genre) and the RatingStore
//! - **parser**: CSV parsing into Rust structs
//! - **store**: Loading and validating a dataset directory
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::RatingStore;
//! use std::path::Path;
//!
//! let store = RatingStore::load_from_files(Path::new("data/ml-20m"))?;
//!
//! let movie = store.get_movie(1).unwrap();
//! let ratings = store.get_movie_ratings(1);
//! println!("{} has {} ratings", movie.title, ratings.len());
//! ```

pub mod error;
pub mod parser;
pub mod store;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use store::{MOVIES_FILE, RATINGS_FILE};
pub use types::{Genre, MAX_RATING, MIN_RATING, Movie, MovieId, Rating, RatingStore, UserId};
