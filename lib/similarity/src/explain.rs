//! Explainability types
//!
//! Breaks a similarity score down into the contribution of each feature
//! block and reports why a pair was (or was not) eligible.

use crate::compatibility::{GenderCategory, Verdict};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Contribution of each feature block to a cosine score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockScores {
    pub numeric: f32,
    pub categorical: f32,
    pub text: f32,
}

impl BlockScores {
    #[inline]
    pub fn total(&self) -> f32 {
        self.numeric + self.categorical + self.text
    }

    /// Name of the block contributing the most, if any contributes
    pub fn dominant(&self) -> Option<&'static str> {
        [
            ("numeric", self.numeric),
            ("categorical", self.categorical),
            ("text", self.text),
        ]
        .into_iter()
        .filter(|(_, score)| *score > 0.0)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(name, _)| name)
    }
}

/// Full explanation for one (query, candidate) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairExplanation {
    pub query_uid: String,
    pub candidate_uid: String,
    pub query_category: GenderCategory,
    pub candidate_category: GenderCategory,
    pub verdict: Verdict,
    /// Cosine score of the pair, regardless of eligibility
    pub similarity_score: f32,
    pub breakdown: BlockScores,
}

impl PairExplanation {
    /// Whether the candidate would appear in the query's recommendations
    pub fn is_eligible(&self) -> bool {
        self.verdict.is_mutual()
    }
}

/// Summary of the currently published fitted state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceStats {
    pub fitted: bool,
    pub profiles: usize,
    pub dimensions: usize,
    pub text_vocabulary: usize,
    pub generation: Option<u64>,
    pub fitted_at: Option<DateTime<Utc>>,
}

impl ServiceStats {
    pub fn unfitted() -> Self {
        Self {
            fitted: false,
            profiles: 0,
            dimensions: 0,
            text_vocabulary: 0,
            generation: None,
            fitted_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total() {
        let scores = BlockScores {
            numeric: 0.25,
            categorical: 0.5,
            text: 0.125,
        };
        assert!((scores.total() - 0.875).abs() < 1e-6);
    }

    #[test]
    fn test_dominant_block() {
        let scores = BlockScores {
            numeric: -0.2,
            categorical: 0.3,
            text: 0.6,
        };
        assert_eq!(scores.dominant(), Some("text"));
        assert_eq!(BlockScores::default().dominant(), None);
    }

    #[test]
    fn test_serialize_explanation() {
        let explanation = PairExplanation {
            query_uid: "a".to_string(),
            candidate_uid: "b".to_string(),
            query_category: GenderCategory::Male,
            candidate_category: GenderCategory::NonBinary,
            verdict: Verdict {
                query_accepts: true,
                candidate_accepts: false,
            },
            similarity_score: 0.5,
            breakdown: BlockScores::default(),
        };
        let json = serde_json::to_value(&explanation).unwrap();
        assert_eq!(json["candidate_category"], "non_binary");
        assert_eq!(json["verdict"]["candidate_accepts"], false);
        assert!(!explanation.is_eligible());
    }
}
