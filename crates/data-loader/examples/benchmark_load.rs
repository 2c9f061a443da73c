use data_loader::RatingStore;
use std::path::Path;
use std::time::Instant;

fn main() {
    let data_dir = Path::new("data/ml-20m");

    println!("Loading MovieLens 20M CSV tables...\n");

    let start = Instant::now();
    let store = RatingStore::load_from_files(data_dir).expect("Failed to load dataset");
    let elapsed = start.elapsed();

    let (users, movies, ratings) = store.counts();

    println!("\n=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Users: {}", users);
    println!("Movies: {}", movies);
    println!("Ratings: {}", ratings);
    println!("Orphan ratings: {}", store.orphan_rating_count());
    println!(
        "\nPerformance: {:.0} ratings/second",
        ratings as f64 / elapsed.as_secs_f64()
    );
}
