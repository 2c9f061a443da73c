//! Small hand-built datasets run through the full matrix + recommender path.

use data_loader::{Genre, Movie, MovieId, Rating, RatingStore, UserId};
use matrix::{MatrixBuilder, RatingMatrix};
use recommenders::{ItemBasedRecommender, NeighborhoodSelector, Signal, UserBasedRecommender};
use std::sync::Arc;

const A: MovieId = 10;
const B: MovieId = 20;
const C: MovieId = 30;
const D: MovieId = 40;

fn store(ratings: &[(UserId, MovieId, f32)]) -> Arc<RatingStore> {
    let movies = [(A, "Alpha (1990)"), (B, "Beta (1991)"), (C, "Gamma (1992)"), (D, "Delta (1993)")]
        .into_iter()
        .map(|(id, title)| Movie {
            id,
            title: title.to_string(),
            genres: vec![Genre::Drama],
        })
        .collect();
    let ratings = ratings
        .iter()
        .map(|&(user_id, movie_id, rating)| Rating {
            user_id,
            movie_id,
            rating,
            timestamp: 1000000,
        })
        .collect();
    Arc::new(RatingStore::from_records(movies, ratings))
}

fn matrix(store: &RatingStore) -> RatingMatrix {
    MatrixBuilder::new().with_min_votes(0).build(store).unwrap()
}

fn neighbor_ids(store: &RatingStore, target: UserId) -> Vec<UserId> {
    NeighborhoodSelector::new()
        .with_overlap_fraction(0.5)
        .with_min_correlation(0.65)
        .select_neighbors(&matrix(store), target)
        .unwrap()
        .iter()
        .map(|n| n.user_id)
        .collect()
}

#[test]
fn test_neighborhood_keeps_agreeing_user() {
    // Users 2 and 3 both share A and B with user 1 (threshold 3 * 0.5 = 1.5).
    // User 3 rates both 1.0, a constant pattern with no defined correlation.
    let store = store(&[
        (1, A, 5.0),
        (1, B, 4.0),
        (1, C, 3.0),
        (2, A, 5.0),
        (2, B, 4.0),
        (2, D, 2.0),
        (3, A, 1.0),
        (3, B, 1.0),
    ]);
    assert_eq!(neighbor_ids(&store, 1), vec![2]);
}

#[test]
fn test_neighborhood_drops_disagreeing_user() {
    let store = store(&[
        (1, A, 5.0),
        (1, B, 4.0),
        (1, C, 3.0),
        (2, A, 5.0),
        (2, B, 4.0),
        (2, D, 2.0),
        (3, A, 1.0),
        (3, B, 2.0),
    ]);

    let neighbors = NeighborhoodSelector::new()
        .with_overlap_fraction(0.5)
        .with_min_correlation(-1.0)
        .select_neighbors(&matrix(&store), 1)
        .unwrap();
    let user_3 = neighbors.iter().find(|n| n.user_id == 3).unwrap();
    assert!((user_3.correlation + 1.0).abs() < 1e-9);

    assert_eq!(neighbor_ids(&store, 1), vec![2]);
}

#[test]
fn test_user_based_recommends_neighbor_favorites() {
    let store = store(&[
        (1, A, 5.0),
        (1, B, 4.0),
        (1, C, 3.0),
        (2, A, 5.0),
        (2, B, 4.0),
        (2, D, 2.0),
        (3, A, 1.0),
        (3, B, 2.0),
    ]);
    let neighbors = NeighborhoodSelector::new()
        .with_overlap_fraction(0.5)
        .select_neighbors(&matrix(&store), 1)
        .unwrap();

    // Neighbor 2 (correlation 1.0) scores A 5.0, B 4.0, D 2.0
    let outcome = UserBasedRecommender::new(store.clone()).recommend(&neighbors, 1);
    let ids: Vec<MovieId> = outcome.recommendations.iter().map(|r| r.movie_id).collect();
    assert_eq!(ids, vec![A, B]);
    assert_eq!(outcome.recommendations[0].title, "Alpha (1990)");

    let unseen = UserBasedRecommender::new(store)
        .with_exclude_watched(true)
        .recommend(&neighbors, 1);
    assert!(unseen.is_empty());
    assert_eq!(unseen.signal, Some(Signal::NoScoreAboveThreshold));
}

#[test]
fn test_item_based_prefers_identical_pattern() {
    // Over users 1-4: A = [5, 4, 3, -], B = [5, 4, 3, 1], C = [2, 5, 1, 3]
    let store = store(&[
        (1, A, 5.0),
        (2, A, 4.0),
        (3, A, 3.0),
        (1, B, 5.0),
        (2, B, 4.0),
        (3, B, 3.0),
        (4, B, 1.0),
        (1, C, 2.0),
        (2, C, 5.0),
        (3, C, 1.0),
        (4, C, 3.0),
    ]);
    let similar = ItemBasedRecommender::new()
        .recommend_similar_to_title(&matrix(&store), "Alpha (1990)")
        .unwrap();

    let ids: Vec<MovieId> = similar.iter().map(|s| s.movie_id).collect();
    assert_eq!(ids, vec![B, C]);
    assert!((similar[0].correlation - 1.0).abs() < 1e-9);
    assert_eq!(similar[0].shared_raters, 3);
    assert!(similar[1].correlation < similar[0].correlation);
}

#[test]
fn test_vote_threshold_is_strict() {
    // A has 3 ratings, B has 2
    let store = store(&[
        (1, A, 5.0),
        (2, A, 4.0),
        (3, A, 3.0),
        (1, B, 5.0),
        (2, B, 4.0),
    ]);
    let matrix = MatrixBuilder::new().with_min_votes(2).build(&store).unwrap();
    assert_eq!(matrix.movies(), &[A]);
}
