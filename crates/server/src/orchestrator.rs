//! # Recommendation Orchestrator
//!
//! Builds the rating matrix once and answers every query against it:
//! 1. User-based: neighborhood selection, then weighted neighbor ratings
//! 2. Item-based: movies correlated with a reference movie
//! 3. Hybrid: both for one user, run concurrently on the blocking pool
//!
//! The store and matrix are immutable and shared through `Arc`, so the
//! orchestrator is cheap to clone into blocking tasks.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use tracing::{debug, info, instrument};

use data_loader::{MovieId, RatingStore, UserId};
use matrix::{RatingMatrix, RecommendError, Result};
use recommenders::{
    ItemBasedRecommender, Neighbor, NeighborhoodSelector, SimilarMovie, UserBasedOutcome,
    UserBasedRecommender,
};

use crate::config::RecommenderConfig;
use crate::policy::{MostRecentTopRated, ReferencePolicy};

/// User-based result together with the neighborhood it came from
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecommendations {
    pub user_id: UserId,
    pub neighbors: Vec<Neighbor>,
    pub outcome: UserBasedOutcome,
}

/// Item-based result together with its reference movie
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarRecommendations {
    pub reference: MovieId,
    pub reference_title: String,
    pub similar: Vec<SimilarMovie>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HybridRecommendations {
    pub user: UserRecommendations,
    /// `None` when the reference policy found no movie for the user
    pub similar: Option<SimilarRecommendations>,
}

/// Main orchestrator that owns the matrix snapshot and the recommenders
#[derive(Debug, Clone)]
pub struct RecommendationOrchestrator {
    store: Arc<RatingStore>,
    matrix: Arc<RatingMatrix>,
    config: RecommenderConfig,
    selector: NeighborhoodSelector,
    user_based: UserBasedRecommender,
    item_based: ItemBasedRecommender,
    policy: Arc<dyn ReferencePolicy>,
}

impl RecommendationOrchestrator {
    /// Validate `config` and build the matrix from `store`
    pub fn new(store: Arc<RatingStore>, config: RecommenderConfig) -> anyhow::Result<Self> {
        config.validate().context("Invalid recommender configuration")?;

        let start = Instant::now();
        let matrix = config
            .matrix_builder()
            .build(&store)
            .context("Failed to build rating matrix")?;
        info!(
            "Built {} x {} rating matrix ({} ratings) in {:.2?}",
            matrix.n_users(),
            matrix.n_movies(),
            matrix.n_ratings(),
            start.elapsed()
        );

        Ok(Self {
            selector: config.neighborhood_selector(),
            user_based: config.user_based(store.clone()),
            item_based: config.item_based(),
            policy: Arc::new(MostRecentTopRated::default()),
            store,
            matrix: Arc::new(matrix),
            config,
        })
    }

    /// Replace the reference policy used by `similar_for_user` and `hybrid`
    pub fn with_policy(mut self, policy: Arc<dyn ReferencePolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn store(&self) -> &Arc<RatingStore> {
        &self.store
    }

    pub fn matrix(&self) -> &Arc<RatingMatrix> {
        &self.matrix
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    /// Neighborhood plus user-based ranking for `user_id`.
    ///
    /// An empty neighborhood is reported through the outcome's signal, not
    /// as an error.
    #[instrument(skip(self))]
    pub fn recommend_for_user(&self, user_id: UserId) -> Result<UserRecommendations> {
        let start = Instant::now();
        let neighbors = self.selector.select_neighbors(&self.matrix, user_id)?;
        let outcome = self.user_based.recommend(&neighbors, user_id);
        info!(
            "User-based query for user {}: {} neighbors, {} recommendations in {:.2?}",
            user_id,
            neighbors.len(),
            outcome.recommendations.len(),
            start.elapsed()
        );
        Ok(UserRecommendations {
            user_id,
            neighbors,
            outcome,
        })
    }

    #[instrument(skip(self))]
    pub fn similar_to_movie(&self, movie_id: MovieId) -> Result<SimilarRecommendations> {
        let start = Instant::now();
        let similar = self.item_based.recommend_similar(&self.matrix, movie_id)?;
        let reference_title = self.matrix.title(movie_id).unwrap_or_default().to_string();
        info!(
            "Item-based query for {:?}: {} similar movies in {:.2?}",
            reference_title,
            similar.len(),
            start.elapsed()
        );
        Ok(SimilarRecommendations {
            reference: movie_id,
            reference_title,
            similar,
        })
    }

    pub fn similar_to_title(&self, title: &str) -> Result<SimilarRecommendations> {
        let movie_id = self.matrix.find_title(title)?;
        self.similar_to_movie(movie_id)
    }

    /// Item-based ranking from the movie the reference policy picks for
    /// `user_id`
    #[instrument(skip(self))]
    pub fn similar_for_user(&self, user_id: UserId) -> Result<SimilarRecommendations> {
        if !self.matrix.contains_user(user_id) {
            return Err(RecommendError::UnknownUser(user_id));
        }
        let reference = self
            .policy
            .select(&self.store, &self.matrix, user_id)
            .ok_or(RecommendError::NoReferenceMovie { user_id })?;
        debug!("Reference movie for user {} is {}", user_id, reference);
        self.similar_to_movie(reference)
    }

    /// Run the user-based and item-based queries for `user_id` in parallel.
    ///
    /// A user without a qualifying reference movie still gets the
    /// user-based half; any other failure fails the whole query.
    ///
    /// Rust concept: `spawn_blocking` takes a `'static` closure, so each
    /// task gets its own clone of the orchestrator (the matrix is behind `Arc`)
    pub async fn hybrid(&self, user_id: UserId) -> anyhow::Result<HybridRecommendations> {
        let start = Instant::now();

        let (user_result, similar_result) = tokio::join!(
            tokio::task::spawn_blocking({
                let orchestrator = self.clone();
                move || orchestrator.recommend_for_user(user_id)
            }),
            tokio::task::spawn_blocking({
                let orchestrator = self.clone();
                move || orchestrator.similar_for_user(user_id)
            })
        );

        let user = user_result.context("User-based task panicked")??;
        let similar = match similar_result.context("Item-based task panicked")? {
            Ok(similar) => Some(similar),
            Err(RecommendError::NoReferenceMovie { .. }) => None,
            Err(e) => return Err(e.into()),
        };

        info!(
            "Total time for hybrid query for user {}: {:.2?}",
            user_id,
            start.elapsed()
        );
        Ok(HybridRecommendations { user, similar })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{Genre, Movie, Rating};
    use recommenders::Signal;

    // ============================================================================
    // Test Fixtures
    // ============================================================================

    fn rating(user_id: UserId, movie_id: MovieId, rating: f32, timestamp: i64) -> Rating {
        Rating {
            user_id,
            movie_id,
            rating,
            timestamp,
        }
    }

    /// Four users over five movies, every movie rated at least three times.
    ///
    /// User 1 agrees with user 2 on movies 1-3 and disagrees with user 3.
    /// User 4 has no 5-star rating and disagrees with everyone.
    fn build_test_store() -> Arc<RatingStore> {
        let movies = vec![
            Movie {
                id: 1,
                title: "The Matrix (1999)".to_string(),
                genres: vec![Genre::Action, Genre::SciFi],
            },
            Movie {
                id: 2,
                title: "Toy Story (1995)".to_string(),
                genres: vec![Genre::Animation, Genre::Children, Genre::Comedy],
            },
            Movie {
                id: 3,
                title: "Pulp Fiction (1994)".to_string(),
                genres: vec![Genre::Crime, Genre::Drama],
            },
            Movie {
                id: 4,
                title: "Forrest Gump (1994)".to_string(),
                genres: vec![Genre::Drama, Genre::Romance],
            },
            Movie {
                id: 5,
                title: "Heat (1995)".to_string(),
                genres: vec![Genre::Action, Genre::Crime],
            },
        ];

        let ratings = vec![
            rating(1, 1, 5.0, 100),
            rating(1, 2, 4.0, 200),
            rating(1, 3, 3.0, 300),
            rating(1, 4, 5.0, 400),
            rating(2, 1, 5.0, 100),
            rating(2, 2, 4.0, 100),
            rating(2, 3, 3.0, 100),
            rating(2, 5, 5.0, 100),
            rating(3, 1, 1.0, 100),
            rating(3, 2, 2.0, 100),
            rating(3, 3, 3.0, 100),
            rating(3, 4, 4.0, 100),
            rating(3, 5, 2.0, 100),
            rating(4, 2, 4.5, 100),
            rating(4, 4, 4.0, 100),
            rating(4, 5, 4.0, 100),
        ];
        Arc::new(RatingStore::from_records(movies, ratings))
    }

    fn build_test_orchestrator() -> RecommendationOrchestrator {
        let config = RecommenderConfig {
            min_votes: 2,
            ..RecommenderConfig::default()
        };
        RecommendationOrchestrator::new(build_test_store(), config)
            .expect("Failed to build orchestrator")
    }

    fn ids(similar: &SimilarRecommendations) -> Vec<MovieId> {
        similar.similar.iter().map(|s| s.movie_id).collect()
    }

    // ============================================================================
    // Construction
    // ============================================================================

    #[test]
    fn test_orchestrator_construction() {
        let orchestrator = build_test_orchestrator();
        assert_eq!(orchestrator.matrix().n_users(), 4);
        assert_eq!(orchestrator.matrix().n_movies(), 5);
        assert_eq!(orchestrator.config().min_votes, 2);
    }

    #[test]
    fn test_construction_fails_when_no_movie_is_popular() {
        let config = RecommenderConfig {
            min_votes: 100,
            ..RecommenderConfig::default()
        };
        let err = RecommendationOrchestrator::new(build_test_store(), config).unwrap_err();
        assert_eq!(
            err.downcast_ref::<RecommendError>(),
            Some(&RecommendError::EmptyResult { min_votes: 100 })
        );
    }

    #[test]
    fn test_construction_rejects_invalid_config() {
        let config = RecommenderConfig {
            top_k: 0,
            ..RecommenderConfig::default()
        };
        assert!(RecommendationOrchestrator::new(build_test_store(), config).is_err());
    }

    // ============================================================================
    // Synchronous queries
    // ============================================================================

    #[test]
    fn test_recommend_for_user() {
        let orchestrator = build_test_orchestrator();
        let result = orchestrator.recommend_for_user(1).unwrap();

        let neighbor_ids: Vec<UserId> = result.neighbors.iter().map(|n| n.user_id).collect();
        assert_eq!(neighbor_ids, vec![2]);

        // User 2's ratings weighted by 1.0; movies 1 and 5 tie at 5.0
        let movie_ids: Vec<MovieId> = result
            .outcome
            .recommendations
            .iter()
            .map(|r| r.movie_id)
            .collect();
        assert_eq!(movie_ids, vec![1, 5, 2]);
        assert_eq!(result.outcome.signal, None);
    }

    #[test]
    fn test_recommend_for_user_excluding_watched() {
        let config = RecommenderConfig {
            min_votes: 2,
            exclude_watched: true,
            ..RecommenderConfig::default()
        };
        let orchestrator = RecommendationOrchestrator::new(build_test_store(), config).unwrap();
        let result = orchestrator.recommend_for_user(1).unwrap();

        assert_eq!(result.outcome.recommendations.len(), 1);
        assert_eq!(result.outcome.recommendations[0].title, "Heat (1995)");
    }

    #[test]
    fn test_recommend_for_unknown_user() {
        let orchestrator = build_test_orchestrator();
        assert_eq!(
            orchestrator.recommend_for_user(99).unwrap_err(),
            RecommendError::UnknownUser(99)
        );
    }

    #[test]
    fn test_similar_to_title() {
        let orchestrator = build_test_orchestrator();
        let result = orchestrator.similar_to_title("Forrest Gump (1994)").unwrap();

        assert_eq!(result.reference, 4);
        // Movies 3 and 5 have a constant pattern on the shared raters
        assert_eq!(ids(&result), vec![1, 2]);
        assert_eq!(result, orchestrator.similar_to_movie(4).unwrap());
    }

    #[test]
    fn test_similar_for_user_uses_most_recent_five_star() {
        let orchestrator = build_test_orchestrator();
        let result = orchestrator.similar_for_user(1).unwrap();
        assert_eq!(result.reference, 4);
        assert_eq!(result.reference_title, "Forrest Gump (1994)");
    }

    #[test]
    fn test_similar_for_user_without_reference() {
        let orchestrator = build_test_orchestrator();
        assert_eq!(
            orchestrator.similar_for_user(4).unwrap_err(),
            RecommendError::NoReferenceMovie { user_id: 4 }
        );
        assert_eq!(
            orchestrator.similar_for_user(99).unwrap_err(),
            RecommendError::UnknownUser(99)
        );
    }

    #[test]
    fn test_custom_policy() {
        let orchestrator = build_test_orchestrator()
            .with_policy(Arc::new(MostRecentTopRated { top_rating: 3.0 }));
        let result = orchestrator.similar_for_user(1).unwrap();
        assert_eq!(result.reference, 3);
    }

    // ============================================================================
    // Hybrid
    // ============================================================================

    #[tokio::test]
    async fn test_hybrid_combines_both_queries() {
        let orchestrator = build_test_orchestrator();
        let hybrid = orchestrator.hybrid(1).await.unwrap();

        assert_eq!(hybrid.user, orchestrator.recommend_for_user(1).unwrap());
        assert_eq!(hybrid.similar, Some(orchestrator.similar_for_user(1).unwrap()));
    }

    #[tokio::test]
    async fn test_hybrid_without_neighbors_or_reference() {
        let orchestrator = build_test_orchestrator();
        let hybrid = orchestrator.hybrid(4).await.unwrap();

        assert!(hybrid.user.neighbors.is_empty());
        assert_eq!(hybrid.user.outcome.signal, Some(Signal::NoNeighbors));
        assert_eq!(hybrid.similar, None);
    }

    #[tokio::test]
    async fn test_hybrid_unknown_user() {
        let orchestrator = build_test_orchestrator();
        let err = orchestrator.hybrid(99).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<RecommendError>(),
            Some(&RecommendError::UnknownUser(99))
        );
    }

    #[tokio::test]
    async fn test_hybrid_is_idempotent() {
        let orchestrator = build_test_orchestrator();
        let first = orchestrator.hybrid(1).await.unwrap();
        let second = orchestrator.hybrid(1).await.unwrap();
        assert_eq!(first, second);
    }
}
