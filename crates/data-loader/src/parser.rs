//! Parser for the MovieLens CSV tables.
//!
//! - movie.csv: movieId,title,genres
//! - rating.csv: userId,movieId,rating,timestamp
//!
//! Titles may contain commas and are quoted in that case, so the files are
//! read with the `csv` crate rather than split by hand.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Row layout of movie.csv
#[derive(Debug, Deserialize)]
struct MovieRecord {
    #[serde(rename = "movieId")]
    movie_id: MovieId,
    title: String,
    genres: String,
}

/// Row layout of rating.csv
///
/// The timestamp is kept as text because the two published exports disagree
/// on its format.
#[derive(Debug, Deserialize)]
struct RatingRecord {
    #[serde(rename = "userId")]
    user_id: UserId,
    #[serde(rename = "movieId")]
    movie_id: MovieId,
    rating: f32,
    timestamp: String,
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn csv_error(file: &str, err: csv::Error) -> DataLoadError {
    DataLoadError::ParseError {
        file: file.to_string(),
        line: err.position().map(|p| p.line()).unwrap_or(0),
        reason: err.to_string(),
    }
}

/// Read every row of a headered CSV stream into `T`, keeping line numbers
/// for error messages.
fn read_rows<R: Read, T: for<'de> Deserialize<'de>>(
    reader: R,
    file: &str,
) -> Result<Vec<(u64, T)>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers().map_err(|e| csv_error(file, e))?.clone();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| csv_error(file, e))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row: T = record
            .deserialize(Some(&headers))
            .map_err(|e| DataLoadError::ParseError {
                file: file.to_string(),
                line,
                reason: e.to_string(),
            })?;
        rows.push((line, row));
    }
    Ok(rows)
}

/// Parse the movie.csv file
pub fn parse_movies(path: &Path) -> Result<Vec<Movie>> {
    let file = open(path)?;
    parse_movies_from_reader(file, &file_label(path))
}

/// Parse movie rows from any reader; `file` is only used in error messages
pub fn parse_movies_from_reader<R: Read>(reader: R, file: &str) -> Result<Vec<Movie>> {
    read_rows::<R, MovieRecord>(reader, file)?
        .into_iter()
        .map(|(line, record)| {
            let genres = parse_genres(&record.genres).map_err(|e| DataLoadError::ParseError {
                file: file.to_string(),
                line,
                reason: e.to_string(),
            })?;
            Ok(Movie {
                id: record.movie_id,
                title: record.title,
                genres,
            })
        })
        .collect()
}

/// Parse the rating.csv file
pub fn parse_ratings(path: &Path) -> Result<Vec<Rating>> {
    let file = open(path)?;
    parse_ratings_from_reader(file, &file_label(path))
}

/// Parse rating rows from any reader; `file` is only used in error messages
pub fn parse_ratings_from_reader<R: Read>(reader: R, file: &str) -> Result<Vec<Rating>> {
    read_rows::<R, RatingRecord>(reader, file)?
        .into_iter()
        .map(|(line, record)| {
            let timestamp =
                parse_timestamp(&record.timestamp).ok_or_else(|| DataLoadError::ParseError {
                    file: file.to_string(),
                    line,
                    reason: format!("Invalid timestamp: {}", record.timestamp),
                })?;
            Ok(Rating {
                user_id: record.user_id,
                movie_id: record.movie_id,
                rating: record.rating,
                timestamp,
            })
        })
        .collect()
}

/// Parse a timestamp into unix seconds
///
/// Example: "1112486027" -> Some(1112486027)
///          "2005-04-02 23:53:47" -> Some(1112486027)
fn parse_timestamp(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(seconds) = s.parse::<i64>() {
        return Some(seconds);
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.and_utc().timestamp())
}

/// Parse a genre string into Genre enum
///
/// Example: "Action" -> Ok(Genre::Action)
///          "Sci-Fi" -> Ok(Genre::SciFi)
fn parse_genre(s: &str) -> Result<Genre> {
    match s {
        "Action" => Ok(Genre::Action),
        "Adventure" => Ok(Genre::Adventure),
        "Animation" => Ok(Genre::Animation),
        // 1M spells it with an apostrophe, 20M without
        "Children" | "Children's" => Ok(Genre::Children),
        "Comedy" => Ok(Genre::Comedy),
        "Crime" => Ok(Genre::Crime),
        "Documentary" => Ok(Genre::Documentary),
        "Drama" => Ok(Genre::Drama),
        "Fantasy" => Ok(Genre::Fantasy),
        "Film-Noir" => Ok(Genre::FilmNoir),
        "Horror" => Ok(Genre::Horror),
        "IMAX" => Ok(Genre::Imax),
        "Musical" => Ok(Genre::Musical),
        "Mystery" => Ok(Genre::Mystery),
        "Romance" => Ok(Genre::Romance),
        "Sci-Fi" => Ok(Genre::SciFi),
        "Thriller" => Ok(Genre::Thriller),
        "War" => Ok(Genre::War),
        "Western" => Ok(Genre::Western),
        "(no genres listed)" => Ok(Genre::NoGenresListed),
        _ => Err(DataLoadError::InvalidValue {
            field: "genre".to_string(),
            value: s.to_string(),
        }),
    }
}

/// Parse pipe-separated genres
///
/// Example: "Action|Adventure|Sci-Fi" -> vec![Genre::Action, Genre::Adventure, Genre::SciFi]
fn parse_genres(s: &str) -> Result<Vec<Genre>> {
    s.split('|')
        .filter(|g| !g.is_empty())
        .map(parse_genre)
        .collect()
}
