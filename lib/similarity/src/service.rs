//! Recommender service
//!
//! Owns the single fitted state and serves recommendations from it. A fit
//! builds the new state completely before publishing it with one pointer
//! swap, so concurrent readers only ever see a whole state.

use crate::compatibility::{CompatibilityFilter, GenderCategory, MatchFilter};
use crate::config::EncoderConfig;
use crate::encoder::{FeatureEncoder, FeatureMatrix, FeatureSpace};
use crate::explain::{PairExplanation, ServiceStats};
use crate::rerank::{RankedMatch, SimilarityRanker};
use chrono::{DateTime, Utc};
use matchx_core::{Error, ProfileCorpus, Result};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

pub const MIN_TOP_N: i64 = 1;
pub const MAX_TOP_N: i64 = 50;
pub const DEFAULT_TOP_N: i64 = 10;

/// Reject out-of-range result sizes instead of clamping them
pub fn validate_top_n(top_n: i64) -> Result<usize> {
    if !(MIN_TOP_N..=MAX_TOP_N).contains(&top_n) {
        return Err(Error::Validation(format!(
            "top_n must be between {} and {}, got {}",
            MIN_TOP_N, MAX_TOP_N, top_n
        )));
    }
    usize::try_from(top_n).map_err(|e| Error::Validation(e.to_string()))
}

/// Everything produced by one fit. Never mutated after publication.
#[derive(Debug)]
pub struct FittedState {
    corpus: ProfileCorpus,
    space: FeatureSpace,
    matrix: FeatureMatrix,
    fitted_at: DateTime<Utc>,
}

impl FittedState {
    pub fn corpus(&self) -> &ProfileCorpus {
        &self.corpus
    }

    pub fn space(&self) -> &FeatureSpace {
        &self.space
    }

    pub fn matrix(&self) -> &FeatureMatrix {
        &self.matrix
    }

    pub fn fitted_at(&self) -> DateTime<Utc> {
        self.fitted_at
    }

    fn ranker(&self) -> Result<SimilarityRanker<'_>> {
        SimilarityRanker::new(&self.space, &self.matrix)
    }
}

pub struct RecommenderService {
    encoder: FeatureEncoder,
    filter: CompatibilityFilter,
    state: RwLock<Option<Arc<FittedState>>>,
}

impl RecommenderService {
    pub fn new(config: EncoderConfig) -> Result<Self> {
        Ok(Self {
            encoder: FeatureEncoder::new(config)?,
            filter: CompatibilityFilter::new(),
            state: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &EncoderConfig {
        self.encoder.config()
    }

    /// The currently published state, if any
    pub fn snapshot(&self) -> Option<Arc<FittedState>> {
        self.state.read().clone()
    }

    pub fn is_fitted(&self) -> bool {
        self.state.read().is_some()
    }

    /// Fit on `corpus` and publish the result, replacing any previous state.
    /// On failure the previous state stays in place.
    pub fn fit(&self, corpus: ProfileCorpus) -> Result<()> {
        let started = Instant::now();
        let profiles = corpus.len();

        let (space, matrix) = self.encoder.fit(&corpus).map_err(|e| {
            match &e {
                Error::Internal(_) => error!(profiles, error = %e, "fit failed unexpectedly"),
                _ => warn!(profiles, error = %e, "fit rejected"),
            }
            e
        })?;

        if matrix.len() != corpus.len() {
            error!(profiles, rows = matrix.len(), "fit produced a misaligned matrix");
            return Err(Error::Internal(format!(
                "matrix has {} rows for {} profiles",
                matrix.len(),
                corpus.len()
            )));
        }

        let generation = space.generation();
        let dimensions = space.dim();
        let vocabulary = space.text().dim();
        let state = Arc::new(FittedState {
            corpus,
            space,
            matrix,
            fitted_at: Utc::now(),
        });

        *self.state.write() = Some(state);

        info!(
            profiles,
            dimensions,
            vocabulary,
            generation,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "recommender fitted"
        );
        Ok(())
    }

    /// True when there is no state yet or the profile count has changed
    pub fn needs_refit(&self, corpus: &ProfileCorpus) -> bool {
        match self.snapshot() {
            Some(state) => state.corpus.len() != corpus.len(),
            None => true,
        }
    }

    /// Refit only when [`Self::needs_refit`] says so.
    /// Returns whether a fit happened.
    pub fn refresh(&self, corpus: ProfileCorpus) -> Result<bool> {
        if !self.needs_refit(&corpus) {
            debug!(profiles = corpus.len(), "refresh skipped, corpus unchanged");
            return Ok(false);
        }
        self.fit(corpus)?;
        Ok(true)
    }

    /// Rank compatible candidates for `uid` against the current state
    pub fn recommend(&self, uid: &str, top_n: i64) -> Result<Vec<RankedMatch>> {
        let top_n = validate_top_n(top_n)?;
        let state = self.snapshot().ok_or(Error::NotFitted)?;
        let profiles = state.corpus.len();

        let query_position = state
            .corpus
            .position(uid)
            .ok_or_else(|| Error::NotFound(uid.to_string()))?;

        let eligible = self.filter.eligible_at(&state.corpus, query_position);
        if eligible.is_empty() {
            debug!(uid, profiles, "no compatible candidates");
            return Ok(Vec::new());
        }

        let matches = state
            .ranker()
            .and_then(|ranker| ranker.rank(&state.corpus, query_position, &eligible, top_n))
            .map_err(|e| {
                error!(uid, profiles, error = %e, "ranking failed");
                e
            })?;

        debug!(
            uid,
            profiles,
            eligible = eligible.len(),
            returned = matches.len(),
            "recommendations ranked"
        );
        Ok(matches)
    }

    /// Explain the relationship between two fitted profiles
    pub fn explain(&self, uid: &str, candidate_uid: &str) -> Result<PairExplanation> {
        let state = self.snapshot().ok_or(Error::NotFitted)?;

        let query_position = state
            .corpus
            .position(uid)
            .ok_or_else(|| Error::NotFound(uid.to_string()))?;
        let candidate_position = state
            .corpus
            .position(candidate_uid)
            .ok_or_else(|| Error::NotFound(candidate_uid.to_string()))?;

        let (query, candidate) = match (
            state.corpus.get(query_position),
            state.corpus.get(candidate_position),
        ) {
            (Some(q), Some(c)) => (q, c),
            _ => return Err(Error::Internal("profile position out of range".to_string())),
        };

        let breakdown = state
            .ranker()?
            .score_rows(query_position, candidate_position)?;

        Ok(PairExplanation {
            query_uid: uid.to_string(),
            candidate_uid: candidate_uid.to_string(),
            query_category: GenderCategory::from_label(query.gender()),
            candidate_category: GenderCategory::from_label(candidate.gender()),
            verdict: self.filter.verdict(query, candidate),
            similarity_score: breakdown.total(),
            breakdown,
        })
    }

    pub fn stats(&self) -> ServiceStats {
        match self.snapshot() {
            Some(state) => ServiceStats {
                fitted: true,
                profiles: state.corpus.len(),
                dimensions: state.space.dim(),
                text_vocabulary: state.space.text().dim(),
                generation: Some(state.space.generation()),
                fitted_at: Some(state.fitted_at),
            },
            None => ServiceStats::unfitted(),
        }
    }
}

impl Default for RecommenderService {
    fn default() -> Self {
        Self {
            encoder: FeatureEncoder::default(),
            filter: CompatibilityFilter::new(),
            state: RwLock::new(None),
        }
    }
}
