//! Cosine ranking of eligible candidates
//!
//! Scores each candidate row against the query row of the same
//! [`FeatureMatrix`] and keeps the best `top_n`, ties resolved by corpus
//! order.

use crate::encoder::{FeatureMatrix, FeatureSpace};
use crate::explain::BlockScores;
use matchx_core::{Error, ProfileCorpus, Result, Vector};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// One ranked recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMatch {
    pub uid: String,
    pub name: String,
    pub gender: String,
    pub age: u32,
    pub interest_tags: String,
    pub similarity_score: f32,
    /// Per-block contributions, summing to `similarity_score`
    pub breakdown: BlockScores,
}

/// Ranks candidates inside one fitted feature space
#[derive(Debug, Clone, Copy)]
pub struct SimilarityRanker<'a> {
    space: &'a FeatureSpace,
    matrix: &'a FeatureMatrix,
}

impl<'a> SimilarityRanker<'a> {
    /// Bind a ranker to a space and the matrix it produced
    pub fn new(space: &'a FeatureSpace, matrix: &'a FeatureMatrix) -> Result<Self> {
        if space.generation() != matrix.generation() {
            return Err(Error::Internal(format!(
                "feature matrix generation {} does not match feature space generation {}",
                matrix.generation(),
                space.generation()
            )));
        }
        Ok(Self { space, matrix })
    }

    fn row(&self, position: usize) -> Result<&'a Vector> {
        let row = self.matrix.row(position).ok_or_else(|| {
            Error::Internal(format!(
                "row {} out of range for a matrix of {}",
                position,
                self.matrix.len()
            ))
        })?;
        if row.dim() != self.space.dim() {
            return Err(Error::Internal(format!(
                "row {} has width {}, expected {}",
                position,
                row.dim(),
                self.space.dim()
            )));
        }
        Ok(row)
    }

    /// Cosine similarity between two vectors split into block contributions.
    /// Both norms must be non-zero for a non-zero score.
    pub fn score(&self, query: &Vector, candidate: &Vector) -> BlockScores {
        let denominator = query.norm() * candidate.norm();
        if denominator == 0.0 {
            return BlockScores::default();
        }

        let layout = self.space.layout();
        BlockScores {
            numeric: query.dot_range(candidate, layout.numeric.clone()) / denominator,
            categorical: query.dot_range(candidate, layout.categorical.clone()) / denominator,
            text: query.dot_range(candidate, layout.text.clone()) / denominator,
        }
    }

    /// Score between two corpus rows
    pub fn score_rows(&self, query_position: usize, candidate_position: usize) -> Result<BlockScores> {
        Ok(self.score(self.row(query_position)?, self.row(candidate_position)?))
    }

    /// Score `eligible` rows against the query row, sort descending and keep
    /// at most `top_n`.
    ///
    /// `eligible` is expected in corpus order; the sort is stable so equal
    /// scores keep that order.
    pub fn rank(
        &self,
        corpus: &ProfileCorpus,
        query_position: usize,
        eligible: &[usize],
        top_n: usize,
    ) -> Result<Vec<RankedMatch>> {
        if corpus.len() != self.matrix.len() {
            return Err(Error::Internal(format!(
                "corpus of {} profiles does not match a matrix of {} rows",
                corpus.len(),
                self.matrix.len()
            )));
        }
        if eligible.is_empty() || top_n == 0 {
            return Ok(Vec::new());
        }

        let query = self.row(query_position)?;

        let mut scored: Vec<(usize, BlockScores)> = eligible
            .par_iter()
            .map(|&position| Ok((position, self.score(query, self.row(position)?))))
            .collect::<Result<_>>()?;

        scored.sort_by_key(|(_, scores)| Reverse(OrderedFloat(scores.total())));
        scored.truncate(top_n);

        scored
            .into_iter()
            .map(|(position, breakdown)| {
                let record = corpus.get(position).ok_or_else(|| {
                    Error::Internal(format!("candidate position {} out of range", position))
                })?;
                Ok(RankedMatch {
                    uid: record.uid.clone(),
                    name: record.name.clone(),
                    gender: record.gender().to_string(),
                    age: record.age(),
                    interest_tags: record.interest_tags().to_string(),
                    similarity_score: breakdown.total(),
                    breakdown,
                })
            })
            .collect()
    }
}
