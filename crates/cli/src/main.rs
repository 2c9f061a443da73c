use anyhow::{Context, Result, anyhow};
use clap::{ArgGroup, Args, Parser, Subcommand};
use colored::Colorize;
use data_loader::{MovieId, RatingStore, UserId};
use rand::SeedableRng;
use rand::rngs::StdRng;
use recommenders::Signal;
use server::{
    RecommendationOrchestrator, RecommenderConfig, SimilarRecommendations, UserRecommendations,
    sample_user,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Hybrid movie recommender over the MovieLens ratings
#[derive(Parser)]
#[command(name = "hybrid-recs")]
#[command(about = "User-based and item-based collaborative filtering", long_about = None)]
struct Cli {
    /// Path to the MovieLens dataset directory (movie.csv, rating.csv)
    #[arg(short, long, default_value = "data/ml-20m", global = true)]
    data_dir: PathBuf,

    /// JSON file with recommender settings; flags below override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: ConfigOverrides,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConfigOverrides {
    /// Movies need more than this many ratings to be considered
    #[arg(long, global = true)]
    min_votes: Option<u32>,

    /// Share of the user's movies a neighbor must have rated
    #[arg(long, global = true)]
    overlap_fraction: Option<f64>,

    /// Lowest correlation accepted for a neighbor
    #[arg(long, global = true)]
    min_correlation: Option<f64>,

    /// Weighted scores must be above this to be recommended
    #[arg(long, global = true)]
    score_threshold: Option<f64>,

    /// Number of movies to return
    #[arg(long, global = true)]
    top_k: Option<usize>,

    /// Leave out movies the user already rated
    #[arg(long, global = true)]
    exclude_watched: bool,
}

/// Which user a query runs for
#[derive(Args)]
#[command(group(ArgGroup::new("target").required(true).args(["user_id", "random"])))]
struct UserTarget {
    /// User ID to query
    #[arg(long)]
    user_id: Option<UserId>,

    /// Pick a user at random instead
    #[arg(long)]
    random: bool,

    /// Seed for --random
    #[arg(long, requires = "random")]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend movies from the ratings of similar users
    Recommend {
        #[command(flatten)]
        target: UserTarget,
    },

    /// List movies rated like a reference movie
    #[command(group(
        ArgGroup::new("reference")
            .required(true)
            .args(["title", "movie_id", "user_id", "random"])
    ))]
    Similar {
        /// Exact title of the reference movie, e.g. "Toy Story (1995)"
        #[arg(long)]
        title: Option<String>,

        /// Movie ID of the reference movie
        #[arg(long)]
        movie_id: Option<MovieId>,

        /// Use this user's most recent top-rated movie as the reference
        #[arg(long)]
        user_id: Option<UserId>,

        /// Same as --user-id, for a random user
        #[arg(long)]
        random: bool,

        /// Seed for --random
        #[arg(long, requires = "random")]
        seed: Option<u64>,
    },

    /// Run the user-based and item-based queries together
    Hybrid {
        #[command(flatten)]
        target: UserTarget,
    },

    /// Show a user's rating history
    User {
        /// User ID to display
        #[arg(long)]
        user_id: UserId,
    },

    /// Search for movies by title
    Search {
        /// Movie title to search for (case-insensitive substring match)
        #[arg(long)]
        title: String,
    },

    /// Time hybrid queries for randomly sampled users
    Benchmark {
        /// Number of queries to run
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Seed for sampling users
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), &cli.overrides)?;
    debug!(?config, "Recommender settings");

    println!("Loading MovieLens dataset from {}...", cli.data_dir.display());
    let start = Instant::now();
    let store = Arc::new(
        RatingStore::load_from_files(&cli.data_dir).context("Failed to load MovieLens dataset")?,
    );
    println!("{} Loaded dataset in {:?}", "✓".green(), start.elapsed());

    match cli.command {
        Commands::Recommend { target } => {
            let orchestrator = build_orchestrator(store, config)?;
            let user_id = resolve_user(&orchestrator, target.user_id, target.random, target.seed)?;
            let result = orchestrator.recommend_for_user(user_id)?;
            print_user_recommendations(&result);
        }
        Commands::Similar {
            title,
            movie_id,
            user_id,
            random,
            seed,
        } => {
            let orchestrator = build_orchestrator(store, config)?;
            let result = match (title, movie_id) {
                (Some(title), _) => orchestrator.similar_to_title(&title)?,
                (None, Some(movie_id)) => orchestrator.similar_to_movie(movie_id)?,
                (None, None) => {
                    let user_id = resolve_user(&orchestrator, user_id, random, seed)?;
                    orchestrator.similar_for_user(user_id)?
                }
            };
            print_similar(&result);
        }
        Commands::Hybrid { target } => {
            let orchestrator = build_orchestrator(store, config)?;
            let user_id = resolve_user(&orchestrator, target.user_id, target.random, target.seed)?;
            let hybrid = orchestrator.hybrid(user_id).await?;
            print_user_recommendations(&hybrid.user);
            println!();
            match &hybrid.similar {
                Some(similar) => print_similar(similar),
                None => println!(
                    "{}",
                    format!("User {} has no top-rated movie in the matrix", user_id).yellow()
                ),
            }
        }
        Commands::User { user_id } => handle_user(&store, user_id)?,
        Commands::Search { title } => handle_search(&store, &title)?,
        Commands::Benchmark { requests, seed } => {
            let orchestrator = build_orchestrator(store, config)?;
            handle_benchmark(orchestrator, requests, seed).await?
        }
    }

    Ok(())
}

fn build_orchestrator(
    store: Arc<RatingStore>,
    config: RecommenderConfig,
) -> Result<RecommendationOrchestrator> {
    let start = Instant::now();
    let orchestrator = RecommendationOrchestrator::new(store, config)?;
    println!(
        "{} Built {} x {} rating matrix in {:?}",
        "✓".green(),
        orchestrator.matrix().n_users(),
        orchestrator.matrix().n_movies(),
        start.elapsed()
    );
    Ok(orchestrator)
}

/// Config file (or defaults) with command-line overrides applied
fn load_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<RecommenderConfig> {
    let mut config = match path {
        Some(path) => RecommenderConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RecommenderConfig::default(),
    };

    if let Some(min_votes) = overrides.min_votes {
        config.min_votes = min_votes;
    }
    if let Some(fraction) = overrides.overlap_fraction {
        config.overlap_fraction = fraction;
    }
    if let Some(min) = overrides.min_correlation {
        config.min_correlation = min;
    }
    if let Some(threshold) = overrides.score_threshold {
        config.score_threshold = threshold;
    }
    if let Some(top_k) = overrides.top_k {
        config.top_k = top_k;
    }
    if overrides.exclude_watched {
        config.exclude_watched = true;
    }

    config.validate().context("Invalid recommender settings")?;
    Ok(config)
}

fn resolve_user(
    orchestrator: &RecommendationOrchestrator,
    user_id: Option<UserId>,
    random: bool,
    seed: Option<u64>,
) -> Result<UserId> {
    if let Some(user_id) = user_id {
        return Ok(user_id);
    }
    if !random {
        return Err(anyhow!("Either --user-id or --random is required"));
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let user_id = sample_user(orchestrator.matrix(), &mut rng)
        .ok_or_else(|| anyhow!("No user has rated a movie in the matrix"))?;
    println!("{} Picked user {}", "✓".green(), user_id);
    Ok(user_id)
}

/// Handle the 'user' command
fn handle_user(store: &RatingStore, user_id: UserId) -> Result<()> {
    let ratings = store.get_user_ratings(user_id);
    if ratings.is_empty() {
        return Err(anyhow!("User {} not found", user_id));
    }

    println!("{}", format!("User ID: {}", user_id).bold().blue());
    let avg_rating = ratings.iter().map(|r| r.rating as f64).sum::<f64>() / ratings.len() as f64;
    println!("{}Number of ratings: {}", "• ".cyan(), ratings.len());
    println!("{}Average rating: {:.2}", "• ".cyan(), avg_rating);

    let mut top_rated: Vec<_> = ratings.iter().collect();
    top_rated.sort_by(|a, b| {
        b.rating
            .total_cmp(&a.rating)
            .then(b.timestamp.cmp(&a.timestamp))
    });
    println!("Top rated movies:");
    for rating in top_rated.iter().take(10) {
        if let Some(movie) = store.get_movie(rating.movie_id) {
            println!("  - {} (Rating: {})", movie.title, rating.rating);
        }
    }
    Ok(())
}

/// Handle the 'search' command
fn handle_search(store: &RatingStore, title: &str) -> Result<()> {
    let matches = store.search_titles(title);

    println!("{}", format!("Search results for '{}':", title).bold().blue());
    if matches.is_empty() {
        println!("  (no matches)");
    }
    for movie in matches.iter().take(20) {
        let genres = movie
            .genres
            .iter()
            .map(|g| g.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{}: {} [{}] ({} ratings)",
            movie.id.to_string().green(),
            movie.title,
            genres,
            store.get_movie_ratings(movie.id).len()
        );
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    orchestrator: RecommendationOrchestrator,
    requests: usize,
    seed: u64,
) -> Result<()> {
    if requests == 0 {
        return Err(anyhow!("--requests must be at least 1"));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let user_ids: Vec<UserId> = (0..requests)
        .map(|_| sample_user(orchestrator.matrix(), &mut rng))
        .collect::<Option<_>>()
        .ok_or_else(|| anyhow!("No user has rated a movie in the matrix"))?;

    let wall_clock = Instant::now();
    let mut handles = vec![];
    for user in user_ids {
        let orchestrator = orchestrator.clone();
        handles.push(tokio::spawn(async move {
            let start = Instant::now();
            orchestrator.hybrid(user).await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        }));
    }

    let mut timings: Vec<Duration> = vec![];
    for handle in handles {
        timings.push(handle.await??);
    }
    let total_time = wall_clock.elapsed();
    if total_time > Duration::from_secs(60) {
        warn!("Benchmark took {:?}; consider a higher --min-votes", total_time);
    }

    timings.sort();
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];
    let avg_latency = timings.iter().sum::<Duration>() / timings.len() as u32;

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!(
        "Throughput: {:.2} queries/second",
        requests as f64 / total_time.as_secs_f64()
    );
    Ok(())
}

fn print_user_recommendations(result: &UserRecommendations) {
    println!(
        "{}",
        format!(
            "Recommendations for user {} ({} neighbors):",
            result.user_id,
            result.neighbors.len()
        )
        .bold()
        .blue()
    );

    match result.outcome.signal {
        Some(Signal::NoNeighbors) => println!(
            "{}",
            "No similar users found; try a lower --min-correlation or --overlap-fraction".yellow()
        ),
        Some(Signal::NoScoreAboveThreshold) => println!(
            "{}",
            "No movie scored above the threshold; try a lower --score-threshold".yellow()
        ),
        None => {}
    }

    for (i, rec) in result.outcome.recommendations.iter().enumerate() {
        println!(
            "{}. {} - Score: {:.2} ({} neighbors)",
            (i + 1).to_string().green(),
            rec.title,
            rec.weighted_score,
            rec.contributors
        );
    }
}

fn print_similar(result: &SimilarRecommendations) {
    println!(
        "{}",
        format!("Movies rated like {}:", result.reference_title)
            .bold()
            .blue()
    );
    if result.similar.is_empty() {
        println!("{}", "No movie shares enough raters with the reference".yellow());
    }
    for (i, movie) in result.similar.iter().enumerate() {
        println!(
            "{}. {} - Correlation: {:.3} ({} shared raters)",
            (i + 1).to_string().green(),
            movie.title,
            movie.correlation,
            movie.shared_raters
        );
    }
}
