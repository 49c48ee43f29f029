//! # matchX Similarity
//!
//! Profile recommendation engine: encode a corpus of profiles into weighted
//! feature vectors, keep only mutually compatible candidates, and rank them
//! by cosine similarity with a per-block explanation.
//!
//! ## Example
//!
//! ```rust
//! use matchx_core::{ProfileCorpus, ProfileRecord};
//! use matchx_similarity::RecommenderService;
//!
//! let corpus = ProfileCorpus::new(vec![
//!     ProfileRecord::new("a", "Alex")
//!         .with_gender("Male")
//!         .with_orientation("Straight")
//!         .with_age(30)
//!         .with_location("Boston")
//!         .with_income_bracket("Middle")
//!         .with_education_level("Master's")
//!         .with_interest_tags("hiking, coffee"),
//!     ProfileRecord::new("b", "Blair")
//!         .with_gender("Female")
//!         .with_orientation("Straight")
//!         .with_age(28)
//!         .with_location("Boston")
//!         .with_income_bracket("High")
//!         .with_education_level("Bachelor's")
//!         .with_interest_tags("coffee, jazz"),
//! ])
//! .unwrap();
//!
//! let service = RecommenderService::default();
//! service.fit(corpus).unwrap();
//!
//! let matches = service.recommend("a", 10).unwrap();
//! assert_eq!(matches[0].uid, "b");
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────┐
//! │   Corpus    │────>│   Encoder   │────>│ FeatureMatrix│
//! │ (profiles)  │     │ (fit/encode)│     │  (rows)      │
//! └─────────────┘     └─────────────┘     └──────────────┘
//!       │                                        │
//!       │   ┌─────────────┐     ┌─────────────┐  │
//!       └──>│Compatibility│────>│   Ranker    │<─┘
//!           │  (filter)   │     │  (cosine)   │
//!           └─────────────┘     └─────────────┘
//!                                      │
//!                               ┌─────────────┐
//!                               │  Explain    │
//!                               │ (breakdown) │
//!                               └─────────────┘
//! ```

pub mod config;
pub mod text;
pub mod encoder;
pub mod compatibility;
pub mod rerank;
pub mod explain;
pub mod service;

// Re-export main types for convenience
pub use config::{ConfigError, EncoderConfig, FeatureWeights, DEFAULT_MAX_TEXT_FEATURES};
pub use text::{tokenize, TextVectorizer};
pub use encoder::{
    BlockLayout,
    CategoricalVocabulary,
    FeatureEncoder,
    FeatureMatrix,
    FeatureSpace,
    NumericScaler,
};
pub use compatibility::{
    Acceptance,
    CompatibilityFilter,
    GenderCategory,
    MatchFilter,
    Orientation,
    Verdict,
};
pub use rerank::{RankedMatch, SimilarityRanker};
pub use explain::{BlockScores, PairExplanation, ServiceStats};
pub use service::{
    validate_top_n,
    FittedState,
    RecommenderService,
    DEFAULT_TOP_N,
    MAX_TOP_N,
    MIN_TOP_N,
};
