//! Bidirectional gender/orientation compatibility
//!
//! A candidate is eligible for a query profile only when each side would
//! accept the other. Acceptance comes from a static rule table keyed by
//! (orientation, gender category). Pairs the table does not model accept
//! everyone, so unmodeled combinations are never silently excluded.

use matchx_core::{Error, ProfileCorpus, ProfileRecord, Result};
use serde::{Deserialize, Serialize};

/// Coarse gender category used by the rule table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenderCategory {
    Male,
    Female,
    NonBinary,
    Transgender,
    Other,
}

impl GenderCategory {
    /// Map a free-form gender label to its category.
    /// Matching ignores ASCII case and surrounding whitespace; unknown
    /// labels fall into `Other`.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        let is = |name: &str| label.eq_ignore_ascii_case(name);

        if is("male") {
            GenderCategory::Male
        } else if is("female") {
            GenderCategory::Female
        } else if is("transgender") || is("transgender male") || is("transgender female") {
            GenderCategory::Transgender
        } else if is("non-binary") || is("nonbinary") || is("genderfluid") {
            GenderCategory::NonBinary
        } else {
            GenderCategory::Other
        }
    }
}

/// Sexual orientations modeled by the rule table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Straight,
    Gay,
    Lesbian,
    Bisexual,
    Pansexual,
    Queer,
    Asexual,
    Demisexual,
}

impl Orientation {
    const ALL: [Orientation; 8] = [
        Orientation::Straight,
        Orientation::Gay,
        Orientation::Lesbian,
        Orientation::Bisexual,
        Orientation::Pansexual,
        Orientation::Queer,
        Orientation::Asexual,
        Orientation::Demisexual,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Orientation::Straight => "Straight",
            Orientation::Gay => "Gay",
            Orientation::Lesbian => "Lesbian",
            Orientation::Bisexual => "Bisexual",
            Orientation::Pansexual => "Pansexual",
            Orientation::Queer => "Queer",
            Orientation::Asexual => "Asexual",
            Orientation::Demisexual => "Demisexual",
        }
    }

    /// `None` for labels outside the table
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|o| o.name().eq_ignore_ascii_case(label))
    }
}

use GenderCategory::{Female, Male, NonBinary, Transgender};

const OPEN: &[GenderCategory] = &[Female, Male, Transgender, NonBinary];

/// Accepted candidate categories for an (orientation, gender) pair,
/// `None` when the pair is not modeled
pub fn rule(orientation: Orientation, gender: GenderCategory) -> Option<&'static [GenderCategory]> {
    use Orientation::*;

    match (orientation, gender) {
        (Straight, Male) => Some(&[Female, Transgender]),
        (Straight, Female) => Some(&[Male, Transgender]),
        (Gay, Male) => Some(&[Male, Transgender]),
        (Gay, Female) => Some(&[Female, Transgender]),
        (Lesbian, Female) => Some(&[Female, Transgender]),
        (Bisexual | Pansexual | Queer | Asexual | Demisexual, Male | Female) => Some(OPEN),
        _ => None,
    }
}

/// The set of candidate categories a profile accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// Unmodeled orientation/gender pair
    Any,
    Only(&'static [GenderCategory]),
}

impl Acceptance {
    pub fn of(record: &ProfileRecord) -> Self {
        let gender = GenderCategory::from_label(record.gender());
        Orientation::from_label(record.sexual_orientation())
            .and_then(|orientation| rule(orientation, gender))
            .map_or(Acceptance::Any, Acceptance::Only)
    }

    #[inline]
    pub fn accepts(&self, category: GenderCategory) -> bool {
        match self {
            Acceptance::Any => true,
            Acceptance::Only(categories) => categories.contains(&category),
        }
    }
}

/// Outcome of both directional checks for one pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// The query accepts the candidate's gender category
    pub query_accepts: bool,
    /// The candidate accepts the query's gender category
    pub candidate_accepts: bool,
}

impl Verdict {
    #[inline]
    pub fn is_mutual(&self) -> bool {
        self.query_accepts && self.candidate_accepts
    }
}

/// Pairwise eligibility check applied before ranking
pub trait MatchFilter: Send + Sync {
    fn verdict(&self, query: &ProfileRecord, candidate: &ProfileRecord) -> Verdict;

    fn accepts(&self, query: &ProfileRecord, candidate: &ProfileRecord) -> bool {
        self.verdict(query, candidate).is_mutual()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CompatibilityFilter;

impl CompatibilityFilter {
    pub fn new() -> Self {
        Self
    }

    /// Positions of the candidates eligible for `uid`, in corpus order
    pub fn eligible(&self, corpus: &ProfileCorpus, uid: &str) -> Result<Vec<usize>> {
        let position = corpus
            .position(uid)
            .ok_or_else(|| Error::NotFound(uid.to_string()))?;
        Ok(self.eligible_at(corpus, position))
    }

    /// Same as [`Self::eligible`] for a query already resolved to a position
    pub fn eligible_at(&self, corpus: &ProfileCorpus, query_position: usize) -> Vec<usize> {
        let Some(query) = corpus.get(query_position) else {
            return Vec::new();
        };
        let query_acceptance = Acceptance::of(query);
        let query_category = GenderCategory::from_label(query.gender());

        corpus
            .iter()
            .enumerate()
            .filter(|&(position, _)| position != query_position)
            .filter(|(_, candidate)| {
                query_acceptance.accepts(GenderCategory::from_label(candidate.gender()))
                    && Acceptance::of(candidate).accepts(query_category)
            })
            .map(|(position, _)| position)
            .collect()
    }
}

impl MatchFilter for CompatibilityFilter {
    fn verdict(&self, query: &ProfileRecord, candidate: &ProfileRecord) -> Verdict {
        Verdict {
            query_accepts: Acceptance::of(query)
                .accepts(GenderCategory::from_label(candidate.gender())),
            candidate_accepts: Acceptance::of(candidate)
                .accepts(GenderCategory::from_label(query.gender())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(uid: &str, gender: &str, orientation: &str) -> ProfileRecord {
        ProfileRecord::new(uid, uid)
            .with_gender(gender)
            .with_orientation(orientation)
    }

    #[test]
    fn test_gender_categories() {
        assert_eq!(GenderCategory::from_label("Male"), Male);
        assert_eq!(GenderCategory::from_label(" female "), Female);
        assert_eq!(GenderCategory::from_label("Transgender"), Transgender);
        assert_eq!(GenderCategory::from_label("Transgender Female"), Transgender);
        assert_eq!(GenderCategory::from_label("Non-binary"), NonBinary);
        assert_eq!(GenderCategory::from_label("Genderfluid"), NonBinary);
        assert_eq!(
            GenderCategory::from_label("Prefer Not to Say"),
            GenderCategory::Other
        );
        assert_eq!(GenderCategory::from_label(""), GenderCategory::Other);
    }

    #[test]
    fn test_orientation_parse() {
        assert_eq!(Orientation::from_label("straight"), Some(Orientation::Straight));
        assert_eq!(Orientation::from_label("Demisexual"), Some(Orientation::Demisexual));
        assert_eq!(Orientation::from_label("Aromantic"), None);
    }

    #[test]
    fn test_rule_table() {
        assert_eq!(
            rule(Orientation::Straight, Male),
            Some(&[Female, Transgender][..])
        );
        assert_eq!(rule(Orientation::Lesbian, Male), None);
        assert_eq!(rule(Orientation::Bisexual, Female), Some(OPEN));
        assert_eq!(rule(Orientation::Gay, NonBinary), None);
    }

    #[test]
    fn test_unmodeled_pair_accepts_all() {
        let record = person("x", "Non-binary", "Straight");
        assert_eq!(Acceptance::of(&record), Acceptance::Any);

        let record = person("y", "Male", "Aromantic");
        assert_eq!(Acceptance::of(&record), Acceptance::Any);
    }

    #[test]
    fn test_straight_pair_is_mutual() {
        let filter = CompatibilityFilter::new();
        let verdict = filter.verdict(
            &person("a", "Male", "Straight"),
            &person("b", "Female", "Straight"),
        );
        assert!(verdict.is_mutual());
    }

    #[test]
    fn test_one_sided_rejection() {
        let filter = CompatibilityFilter::new();
        // a gay man accepts a straight man, who does not accept him back
        let verdict = filter.verdict(
            &person("a", "Male", "Gay"),
            &person("b", "Male", "Straight"),
        );
        assert!(verdict.query_accepts);
        assert!(!verdict.candidate_accepts);
        assert!(!filter.accepts(&person("a", "Male", "Gay"), &person("b", "Male", "Straight")));
    }

    #[test]
    fn test_eligible_excludes_self_and_keeps_order() {
        let corpus = ProfileCorpus::new(vec![
            person("a", "Male", "Straight"),
            person("b", "Female", "Straight"),
            person("c", "Male", "Straight"),
            person("d", "Female", "Bisexual"),
            person("e", "Female", "Lesbian"),
        ])
        .unwrap();

        let eligible = CompatibilityFilter::new().eligible(&corpus, "a").unwrap();
        assert_eq!(eligible, vec![1, 3]);
    }

    #[test]
    fn test_eligible_unknown_uid() {
        let corpus = ProfileCorpus::new(vec![person("a", "Male", "Straight")]).unwrap();
        assert!(matches!(
            CompatibilityFilter::new().eligible(&corpus, "zzz"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_eligible_empty_is_not_error() {
        let corpus = ProfileCorpus::new(vec![
            person("a", "Male", "Straight"),
            person("c", "Male", "Straight"),
        ])
        .unwrap();
        let eligible = CompatibilityFilter::new().eligible(&corpus, "a").unwrap();
        assert!(eligible.is_empty());
    }

    #[test]
    fn test_excluded_means_a_direction_failed() {
        let genders = ["Male", "Female", "Non-binary", "Transgender", "Genderfluid", "Other"];
        let orientations = ["Straight", "Gay", "Lesbian", "Bisexual", "Queer", "Unknown"];
        let mut records = Vec::new();
        for g in genders {
            for o in orientations {
                records.push(person(&format!("{}-{}", g, o), g, o));
            }
        }
        let corpus = ProfileCorpus::new(records).unwrap();
        let filter = CompatibilityFilter::new();

        for (q, query) in corpus.iter().enumerate() {
            let eligible = filter.eligible_at(&corpus, q);
            for (c, candidate) in corpus.iter().enumerate() {
                if c == q {
                    continue;
                }
                let verdict = filter.verdict(query, candidate);
                assert_eq!(eligible.contains(&c), verdict.is_mutual());
            }
        }
    }
}
