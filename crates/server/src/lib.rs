//! Server crate for the hybrid recommender.
//!
//! Holds the configuration, the reference-movie policy and the
//! orchestrator that serves user-based, item-based and hybrid queries from
//! one shared rating matrix.

pub mod config;
pub mod orchestrator;
pub mod policy;

pub use config::{ConfigError, RecommenderConfig};
pub use orchestrator::{
    HybridRecommendations, RecommendationOrchestrator, SimilarRecommendations,
    UserRecommendations,
};
pub use policy::{MostRecentTopRated, ReferencePolicy, sample_user};
