//! # matchX
//!
//! A profile matching and recommendation engine.
//!
//! matchX encodes user profiles into weighted feature vectors (scaled
//! numeric attributes, one-hot categorical attributes and TF-IDF interest
//! tags), keeps only candidates that are mutually compatible by gender and
//! orientation, and ranks them by cosine similarity with a per-block
//! breakdown of every score.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! matchx --profiles profiles.json --http-port 8080
//! curl http://localhost:8080/recommendations/u1?top_n=5
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use matchx::prelude::*;
//!
//! let source = JsonFileSource::new("profiles.json");
//! let service = RecommenderService::default();
//! service.fit(source.load().unwrap()).unwrap();
//!
//! for m in service.recommend("u1", 10).unwrap() {
//!     println!("{} {:.3}", m.uid, m.similarity_score);
//! }
//! ```
//!
//! ## Crate Structure
//!
//! - `matchx-core` - Profile records, corpus snapshots, vectors, errors
//! - `matchx-similarity` - Encoder, compatibility filter, ranker, service
//! - `matchx-storage` - Profile sources (JSON, JSON-lines, in-memory)
//! - `matchx-api` - REST API

// Re-export core types
pub use matchx_core::{
    CategoricalColumn, NumericColumn,
    ProfileCorpus, ProfileRecord,
    Vector,
    Error, Result,
};

// Re-export the recommendation engine
pub use matchx_similarity::{
    EncoderConfig, FeatureWeights, FeatureEncoder,
    CompatibilityFilter, MatchFilter,
    SimilarityRanker, RankedMatch,
    BlockScores, PairExplanation, ServiceStats,
    RecommenderService,
};

// Re-export storage
pub use matchx_storage::{JsonFileSource, MemorySource, ProfileSource};

// Re-export API
pub use matchx_api::RestApi;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ProfileCorpus, ProfileRecord,
        Error, Result,
        EncoderConfig, FeatureWeights,
        RecommenderService, RankedMatch,
        JsonFileSource, MemorySource, ProfileSource,
        RestApi,
    };
}
