//! Core domain types for the MovieLens rating tables.
//!
//! This module defines the records read from `movie.csv` and `rating.csv`
//! and the `RatingStore` that holds them in memory.
//!
//! Key Rust concepts demonstrated here:
//! - Type aliases for domain clarity (UserId, MovieId)
//! - `Copy` structs for small records passed around by value
//! - HashMap indices that hand out borrowed slices instead of clones

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user
pub type UserId = u32;

/// Unique identifier for a movie
pub type MovieId = u32;

// =============================================================================
// Movie-related Types
// =============================================================================

/// Represents a movie in the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    /// Human-facing title, e.g. "Toy Story (1995)"
    ///
    /// Titles are not guaranteed unique across the catalog.
    pub title: String,
    pub genres: Vec<Genre>,
}

/// Movie genres from MovieLens
///
/// The 18 classic genres plus the two extra labels that appear in the 20M
/// export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
    Action,
    Adventure,
    Animation,
    Children,
    Comedy,
    Crime,
    Documentary,
    Drama,
    Fantasy,
    FilmNoir,
    Horror,
    Imax,
    Musical,
    Mystery,
    Romance,
    SciFi,
    Thriller,
    War,
    Western,
    NoGenresListed,
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Genre::Action => "Action",
            Genre::Adventure => "Adventure",
            Genre::Animation => "Animation",
            Genre::Children => "Children",
            Genre::Comedy => "Comedy",
            Genre::Crime => "Crime",
            Genre::Documentary => "Documentary",
            Genre::Drama => "Drama",
            Genre::Fantasy => "Fantasy",
            Genre::FilmNoir => "Film-Noir",
            Genre::Horror => "Horror",
            Genre::Imax => "IMAX",
            Genre::Musical => "Musical",
            Genre::Mystery => "Mystery",
            Genre::Romance => "Romance",
            Genre::SciFi => "Sci-Fi",
            Genre::Thriller => "Thriller",
            Genre::War => "War",
            Genre::Western => "Western",
            Genre::NoGenresListed => "(no genres listed)",
        };
        f.write_str(label)
    }
}

// =============================================================================
// Rating Type
// =============================================================================

/// A single rating from a user for a movie
///
/// Rust concept: every field is `Copy`, so the whole struct is too and
/// `*rating` copies it out of a borrowed slice without a `clone()`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    /// Rating value from 0.5 to 5.0 in half-star steps
    pub rating: f32,
    /// Unix timestamp (seconds) when the rating was made
    pub timestamp: i64,
}

/// Lowest rating value accepted by validation
pub const MIN_RATING: f32 = 0.5;

/// Highest rating value accepted by validation
pub const MAX_RATING: f32 = 5.0;

// =============================================================================
// RatingStore - read-only tables
// =============================================================================

/// Holds every movie and rating record and answers read-only queries.
///
/// The store is filled once (by `load_from_files` or the `insert_*`
/// methods in tests) and then shared behind an `Arc`; nothing mutates it
/// afterwards.
///
/// Rust concepts demonstrated:
/// - `Arc<RatingStore>` gives several owners read access to one allocation
/// - Getters return `&[Rating]` borrowed from the map, valid while the
///   store is alive
#[derive(Debug, Default)]
pub struct RatingStore {
    pub(crate) movies: HashMap<MovieId, Movie>,

    /// All ratings made by each user, in insertion order
    pub(crate) user_ratings: HashMap<UserId, Vec<Rating>>,
    /// All ratings received by each movie id, including ids with no movie record
    pub(crate) movie_ratings: HashMap<MovieId, Vec<Rating>>,

    pub(crate) rating_count: usize,
}

impl RatingStore {
    /// Creates a new, empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a movie by ID
    pub fn get_movie(&self, id: MovieId) -> Option<&Movie> {
        self.movies.get(&id)
    }

    /// Get all ratings made by a user
    ///
    /// Returns an empty slice if the user has no ratings
    pub fn get_user_ratings(&self, user_id: UserId) -> &[Rating] {
        self.user_ratings
            .get(&user_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get all ratings for a movie id
    pub fn get_movie_ratings(&self, movie_id: MovieId) -> &[Rating] {
        self.movie_ratings
            .get(&movie_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Whether any rating belongs to this user
    pub fn contains_user(&self, user_id: UserId) -> bool {
        self.user_ratings.contains_key(&user_id)
    }

    /// Every user that has at least one rating, ascending
    pub fn user_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.user_ratings.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Every movie with a movie record, ascending
    pub fn movie_ids(&self) -> Vec<MovieId> {
        let mut ids: Vec<MovieId> = self.movies.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Iterate over all rated movie ids together with their ratings
    pub fn rated_movies(&self) -> impl Iterator<Item = (MovieId, &[Rating])> {
        self.movie_ratings
            .iter()
            .map(|(&movie_id, ratings)| (movie_id, ratings.as_slice()))
    }

    /// Movies whose title equals `title` exactly, ascending by id
    pub fn find_movies_by_title(&self, title: &str) -> Vec<&Movie> {
        let mut found: Vec<&Movie> = self
            .movies
            .values()
            .filter(|movie| movie.title == title)
            .collect();
        found.sort_unstable_by_key(|movie| movie.id);
        found
    }

    /// Case-insensitive substring search over titles
    ///
    /// Exact (case-insensitive) matches come first, then by id.
    pub fn search_titles(&self, query: &str) -> Vec<&Movie> {
        let query = query.to_lowercase();
        let mut found: Vec<(bool, &Movie)> = self
            .movies
            .values()
            .filter_map(|movie| {
                let title = movie.title.to_lowercase();
                if title.contains(&query) {
                    Some((title != query, movie))
                } else {
                    None
                }
            })
            .collect();
        found.sort_unstable_by_key(|(inexact, movie)| (*inexact, movie.id));
        found.into_iter().map(|(_, movie)| movie).collect()
    }

    /// Insert a movie into the store
    pub fn insert_movie(&mut self, movie: Movie) {
        self.movies.insert(movie.id, movie);
    }

    /// Insert a rating and update both rating indices
    pub fn insert_rating(&mut self, rating: Rating) {
        self.user_ratings
            .entry(rating.user_id)
            .or_default()
            .push(rating);

        self.movie_ratings
            .entry(rating.movie_id)
            .or_default()
            .push(rating);

        self.rating_count += 1;
    }

    /// (users, movies, ratings) counts for logging and validation
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.user_ratings.len(), self.movies.len(), self.rating_count)
    }
}
