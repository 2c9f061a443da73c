//! Example: user-based and item-based recommendations for one user
//!
//! Run with: cargo run --package recommenders --example recommend_for_user -- [user_id]
//!
//! This example shows how to:
//! 1. Load the MovieLens 20M dataset
//! 2. Build the rating matrix of popular movies
//! 3. Select the user's neighborhood and rank movies from it
//! 4. Find movies rated like the user's first top-rated movie

use anyhow::Context;
use data_loader::RatingStore;
use matrix::MatrixBuilder;
use recommenders::{ItemBasedRecommender, NeighborhoodSelector, UserBasedRecommender};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let user_id: u32 = std::env::args()
        .nth(1)
        .map(|arg| arg.parse())
        .transpose()
        .context("user id must be a number")?
        .unwrap_or(1);

    println!("=== Hybrid Recommendations Example ===\n");

    println!("Loading MovieLens dataset...");
    let start = Instant::now();
    let store = Arc::new(RatingStore::load_from_files(Path::new("data/ml-20m"))?);
    println!("Loaded dataset in {:?}\n", start.elapsed());

    println!("Building rating matrix...");
    let start = Instant::now();
    let matrix = MatrixBuilder::new().build(&store)?;
    println!(
        "Built {} users x {} movies in {:?}\n",
        matrix.n_users(),
        matrix.n_movies(),
        start.elapsed()
    );

    let start = Instant::now();
    let neighbors = NeighborhoodSelector::new().select_neighbors(&matrix, user_id)?;
    println!("Found {} neighbors in {:?}", neighbors.len(), start.elapsed());
    for neighbor in neighbors.iter().take(5) {
        println!("  user {} (r = {:.3})", neighbor.user_id, neighbor.correlation);
    }

    let outcome = UserBasedRecommender::new(store.clone()).recommend(&neighbors, user_id);
    println!("\nUser-based recommendations:");
    if let Some(signal) = outcome.signal {
        println!("  (none: {:?})", signal);
    }
    for (i, rec) in outcome.recommendations.iter().enumerate() {
        println!(
            "  {}. {} (score {:.2}, {} neighbors)",
            i + 1,
            rec.title,
            rec.weighted_score,
            rec.contributors
        );
    }

    let reference = store
        .get_user_ratings(user_id)
        .iter()
        .find(|r| r.rating == 5.0 && matrix.contains_movie(r.movie_id))
        .map(|r| r.movie_id);

    match reference {
        Some(movie_id) => {
            println!(
                "\nMovies rated like {}:",
                matrix.title(movie_id).unwrap_or("?")
            );
            let similar = ItemBasedRecommender::new().recommend_similar(&matrix, movie_id)?;
            for (i, movie) in similar.iter().enumerate() {
                println!(
                    "  {}. {} (r = {:.3}, {} shared raters)",
                    i + 1,
                    movie.title,
                    movie.correlation,
                    movie.shared_raters
                );
            }
        }
        None => println!("\nUser {} has no 5-star rating on a popular movie", user_id),
    }

    Ok(())
}
