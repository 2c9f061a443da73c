//! The user × movie rating matrix.
//!
//! Logically a dense table (one row per user, one column per popular movie,
//! a cell is a rating or "no rating"). Physically two sparse views of the same
//! cells: row-major for user neighborhoods and column-major for movie
//! similarity. Columns are keyed by `MovieId`; the title is carried only for
//! presentation.

use crate::correlation::Entry;
use crate::error::{RecommendError, Result};
use data_loader::{MovieId, UserId};
use std::collections::HashMap;

/// Immutable rating matrix built by `MatrixBuilder`.
///
/// Rows are sorted by ascending user id, columns by ascending movie id. Each
/// row slice is sorted by column index and each column slice by row index.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingMatrix {
    pub(crate) users: Vec<UserId>,
    pub(crate) movies: Vec<MovieId>,
    pub(crate) titles: Vec<String>,

    pub(crate) user_index: HashMap<UserId, usize>,
    pub(crate) movie_index: HashMap<MovieId, usize>,

    pub(crate) rows: Vec<Vec<Entry>>,
    pub(crate) columns: Vec<Vec<Entry>>,
}

impl RatingMatrix {
    /// Number of rows (users)
    pub fn n_users(&self) -> usize {
        self.users.len()
    }

    /// Number of columns (movies)
    pub fn n_movies(&self) -> usize {
        self.movies.len()
    }

    /// Number of non-missing cells
    pub fn n_ratings(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Row order of users
    pub fn users(&self) -> &[UserId] {
        &self.users
    }

    /// Column order of movies
    pub fn movies(&self) -> &[MovieId] {
        &self.movies
    }

    pub fn contains_user(&self, user_id: UserId) -> bool {
        self.user_index.contains_key(&user_id)
    }

    pub fn contains_movie(&self, movie_id: MovieId) -> bool {
        self.movie_index.contains_key(&movie_id)
    }

    pub fn row_index(&self, user_id: UserId) -> Option<usize> {
        self.user_index.get(&user_id).copied()
    }

    pub fn column_index(&self, movie_id: MovieId) -> Option<usize> {
        self.movie_index.get(&movie_id).copied()
    }

    pub fn user_at(&self, row: usize) -> UserId {
        self.users[row]
    }

    pub fn movie_at(&self, column: usize) -> MovieId {
        self.movies[column]
    }

    pub fn title_at(&self, column: usize) -> &str {
        &self.titles[column]
    }

    /// Title of a retained movie
    pub fn title(&self, movie_id: MovieId) -> Option<&str> {
        self.column_index(movie_id).map(|c| self.title_at(c))
    }

    /// Non-missing cells of a row as `(column, rating)`
    pub fn row(&self, row: usize) -> &[Entry] {
        &self.rows[row]
    }

    /// Non-missing cells of a column as `(row, rating)`
    pub fn column(&self, column: usize) -> &[Entry] {
        &self.columns[column]
    }

    /// The cell for (user, movie); `None` if either key is absent or the
    /// user never rated the movie
    pub fn get(&self, user_id: UserId, movie_id: MovieId) -> Option<f32> {
        let row = self.row_index(user_id)?;
        let column = self.column_index(movie_id)?;
        let entries = &self.rows[row];
        entries
            .binary_search_by_key(&column, |&(c, _)| c)
            .ok()
            .map(|i| entries[i].1)
    }

    /// Movies the user has a rating for, in column order
    pub fn rated_movies(&self, user_id: UserId) -> Result<Vec<MovieId>> {
        let row = self
            .row_index(user_id)
            .ok_or(RecommendError::UnknownUser(user_id))?;
        Ok(self.rows[row].iter().map(|&(c, _)| self.movies[c]).collect())
    }

    /// Resolve a title to its single retained movie.
    ///
    /// Titles are not unique in MovieLens, so a title shared by several
    /// retained movies is reported instead of silently picking one.
    pub fn find_title(&self, title: &str) -> Result<MovieId> {
        let ids: Vec<MovieId> = self
            .titles
            .iter()
            .enumerate()
            .filter(|(_, t)| t.as_str() == title)
            .map(|(c, _)| self.movies[c])
            .collect();

        match ids.as_slice() {
            [] => Err(RecommendError::UnknownTitle(title.to_string())),
            [id] => Ok(*id),
            _ => Err(RecommendError::AmbiguousTitle {
                title: title.to_string(),
                ids,
            }),
        }
    }
}
