//! Feature Encoder
//!
//! Fits scaling and vocabulary parameters over a profile corpus and turns
//! every profile into one fixed-width vector made of three weighted blocks:
//!
//! ```text
//! [ numeric (z-scores) | categorical (one-hot per column) | text (tf-idf) ]
//!     × w_numeric           × w_categorical                 × w_text
//! ```
//!
//! Vectors are only comparable when produced by the same [`FeatureSpace`];
//! each fit stamps its space and matrix with a fresh generation number.

use crate::config::{EncoderConfig, FeatureWeights};
use crate::text::TextVectorizer;
use ahash::AHashMap;
use matchx_core::{
    CategoricalColumn, Error, NumericColumn, ProfileCorpus, ProfileRecord, Result, Vector,
};
use rayon::prelude::*;
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Read by the compatibility filter for every pair
const REQUIRED_CATEGORICAL: &[CategoricalColumn] =
    &[CategoricalColumn::Gender, CategoricalColumn::SexualOrientation];
const REQUIRED_NUMERIC: &[NumericColumn] = &[NumericColumn::Age];

/// Population mean and standard deviation of one numeric column
#[derive(Debug, Clone, PartialEq)]
pub struct NumericScaler {
    pub column: NumericColumn,
    pub mean: f64,
    pub std: f64,
}

impl NumericScaler {
    fn fit(column: NumericColumn, corpus: &ProfileCorpus) -> Self {
        let n = corpus.len() as f64;
        let values = || corpus.iter().map(|r| r.numeric(column).unwrap_or(0.0));

        let mean = values().sum::<f64>() / n;
        let variance = values().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();

        Self {
            column,
            mean,
            // constant column: leave values centered but unscaled
            std: if std > 0.0 { std } else { 1.0 },
        }
    }

    #[inline]
    pub fn transform(&self, record: &ProfileRecord) -> f32 {
        let value = record.numeric(self.column).unwrap_or(0.0);
        ((value - self.mean) / self.std) as f32
    }
}

/// Sorted set of values observed for one categorical column at fit time
#[derive(Debug, Clone)]
pub struct CategoricalVocabulary {
    pub column: CategoricalColumn,
    values: Vec<String>,
    index: AHashMap<String, usize>,
}

impl CategoricalVocabulary {
    fn fit(column: CategoricalColumn, corpus: &ProfileCorpus) -> Self {
        let mut values: Vec<String> = corpus
            .iter()
            .filter_map(|r| r.categorical(column))
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();
        values.sort();
        values.dedup();

        let index = values
            .iter()
            .enumerate()
            .map(|(i, v)| (v.clone(), i))
            .collect();

        Self {
            column,
            values,
            index,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Offset of a value inside this column's one-hot slot.
    /// `None` for empty, absent or unseen values.
    #[inline]
    pub fn lookup(&self, record: &ProfileRecord) -> Option<usize> {
        record
            .categorical(self.column)
            .and_then(|value| self.index.get(value).copied())
    }
}

/// Dimension ranges of the three feature blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockLayout {
    pub numeric: Range<usize>,
    pub categorical: Range<usize>,
    pub text: Range<usize>,
}

impl BlockLayout {
    fn new(numeric: usize, categorical: usize, text: usize) -> Self {
        Self {
            numeric: 0..numeric,
            categorical: numeric..numeric + categorical,
            text: numeric + categorical..numeric + categorical + text,
        }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.text.end
    }
}

/// Parameters fitted once per corpus snapshot
#[derive(Debug, Clone)]
pub struct FeatureSpace {
    generation: u64,
    weights: FeatureWeights,
    scalers: Vec<NumericScaler>,
    vocabularies: Vec<CategoricalVocabulary>,
    text: TextVectorizer,
    layout: BlockLayout,
}

impl FeatureSpace {
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.layout.dim()
    }

    pub fn layout(&self) -> &BlockLayout {
        &self.layout
    }

    pub fn weights(&self) -> FeatureWeights {
        self.weights
    }

    pub fn scalers(&self) -> &[NumericScaler] {
        &self.scalers
    }

    pub fn vocabularies(&self) -> &[CategoricalVocabulary] {
        &self.vocabularies
    }

    pub fn text(&self) -> &TextVectorizer {
        &self.text
    }

    /// Encode a record into this space.
    ///
    /// Works for records outside the fit corpus: unseen categories and
    /// unknown terms contribute zeros and never add dimensions.
    pub fn encode(&self, record: &ProfileRecord) -> Vector {
        let mut vector = Vector::zeros(self.dim());
        let data = vector.as_mut_slice();

        for (i, scaler) in self.scalers.iter().enumerate() {
            data[self.layout.numeric.start + i] = scaler.transform(record) * self.weights.numeric;
        }

        let mut offset = self.layout.categorical.start;
        for vocabulary in &self.vocabularies {
            if let Some(slot) = vocabulary.lookup(record) {
                data[offset + slot] = self.weights.categorical;
            }
            offset += vocabulary.len();
        }

        let text_block = &mut data[self.layout.text.clone()];
        self.text.transform_into(record.interest_tags(), text_block);
        vector.scale_range(self.layout.text.clone(), self.weights.text);

        vector
    }
}

/// One encoded row per corpus record, in corpus order
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    generation: u64,
    rows: Vec<Vector>,
}

impl FeatureMatrix {
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn row(&self, position: usize) -> Option<&Vector> {
        self.rows.get(position)
    }

    pub fn rows(&self) -> &[Vector] {
        &self.rows
    }
}

/// Fits a [`FeatureSpace`] and encodes the corpus into a [`FeatureMatrix`]
#[derive(Debug, Clone, Default)]
pub struct FeatureEncoder {
    config: EncoderConfig,
}

impl FeatureEncoder {
    /// Create an encoder, rejecting invalid configurations up front
    pub fn new(config: EncoderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn fit(&self, corpus: &ProfileCorpus) -> Result<(FeatureSpace, FeatureMatrix)> {
        if corpus.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        self.check_columns(corpus)?;

        let scalers: Vec<NumericScaler> = self
            .config
            .numeric_columns
            .iter()
            .map(|&column| NumericScaler::fit(column, corpus))
            .collect();

        let vocabularies: Vec<CategoricalVocabulary> = self
            .config
            .categorical_columns
            .iter()
            .map(|&column| CategoricalVocabulary::fit(column, corpus))
            .collect();

        let text = TextVectorizer::fit(
            corpus.iter().map(|r| r.interest_tags()),
            self.config.max_text_features,
        );

        let layout = BlockLayout::new(
            scalers.len(),
            vocabularies.iter().map(CategoricalVocabulary::len).sum(),
            text.dim(),
        );

        let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        let space = FeatureSpace {
            generation,
            weights: self.config.weights,
            scalers,
            vocabularies,
            text,
            layout,
        };

        let rows: Vec<Vector> = corpus
            .records()
            .par_iter()
            .map(|record| space.encode(record))
            .collect();

        if rows.len() != corpus.len() {
            return Err(Error::Internal(format!(
                "encoded {} rows for a corpus of {}",
                rows.len(),
                corpus.len()
            )));
        }

        Ok((space, FeatureMatrix { generation, rows }))
    }

    /// Only the columns the filter and ranker cannot do without are
    /// required. Other configured columns may be absent everywhere: a
    /// categorical one fits to a zero-width slot, a numeric one to a
    /// constant zero.
    fn check_columns(&self, corpus: &ProfileCorpus) -> Result<()> {
        for &column in REQUIRED_CATEGORICAL {
            if !corpus.has_categorical(column) {
                return Err(missing_column(column.name()));
            }
        }
        for &column in REQUIRED_NUMERIC {
            if self.config.numeric_columns.contains(&column) && !corpus.has_numeric(column) {
                return Err(missing_column(column.name()));
            }
        }
        if !corpus.has_interest_tags() {
            return Err(missing_column("interest_tags"));
        }

        for &column in &self.config.numeric_columns {
            if !corpus.has_numeric(column) {
                debug!(column = column.name(), "optional column absent, encoded as zero");
            }
        }
        for &column in &self.config.categorical_columns {
            if !corpus.has_categorical(column) {
                debug!(column = column.name(), "optional column absent, zero-width slot");
            }
        }
        Ok(())
    }
}

fn missing_column(name: &str) -> Error {
    Error::Configuration(format!("column '{}' is absent from every profile", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(uid: &str, gender: &str, age: u32, location: &str, tags: &str) -> ProfileRecord {
        ProfileRecord::new(uid, uid.to_uppercase())
            .with_gender(gender)
            .with_orientation("Straight")
            .with_age(age)
            .with_location(location)
            .with_income_bracket("Middle")
            .with_education_level("Bachelor's")
            .with_interest_tags(tags)
    }

    fn create_test_corpus() -> ProfileCorpus {
        ProfileCorpus::new(vec![
            profile("a", "Male", 30, "Boston", "hiking, coffee"),
            profile("b", "Female", 28, "Denver", "coffee, jazz"),
            profile("c", "Female", 35, "Boston", ""),
        ])
        .unwrap()
    }

    #[test]
    fn test_fit_layout() {
        let corpus = create_test_corpus();
        let (space, matrix) = FeatureEncoder::default().fit(&corpus).unwrap();

        // numeric: age
        assert_eq!(space.layout().numeric, 0..1);
        // categorical: gender(2) + orientation(1) + location(2) + income(1) + education(1)
        assert_eq!(space.layout().categorical, 1..8);
        // text: coffee, hiking, jazz
        assert_eq!(space.layout().text, 8..11);
        assert_eq!(matrix.len(), corpus.len());
        assert!(matrix.rows().iter().all(|row| row.dim() == space.dim()));
        assert_eq!(space.generation(), matrix.generation());
    }

    #[test]
    fn test_numeric_standardized() {
        let corpus = create_test_corpus();
        let (space, matrix) = FeatureEncoder::default().fit(&corpus).unwrap();
        let scaler = &space.scalers()[0];
        assert!((scaler.mean - 31.0).abs() < 1e-9);

        let weight = space.weights().numeric;
        let sum: f32 = matrix.rows().iter().map(|r| r.as_slice()[0] / weight).sum();
        let sum_sq: f32 = matrix
            .rows()
            .iter()
            .map(|r| (r.as_slice()[0] / weight).powi(2))
            .sum();
        assert!(sum.abs() < 1e-5);
        assert!((sum_sq / 3.0 - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_zero_std_treated_as_one() {
        let corpus = ProfileCorpus::new(vec![
            profile("a", "Male", 30, "Boston", "x1"),
            profile("b", "Female", 30, "Boston", "x2"),
        ])
        .unwrap();
        let (space, matrix) = FeatureEncoder::default().fit(&corpus).unwrap();
        assert_eq!(space.scalers()[0].std, 1.0);
        assert_eq!(matrix.row(0).unwrap().as_slice()[0], 0.0);
    }

    #[test]
    fn test_categorical_one_hot_weighted() {
        let corpus = create_test_corpus();
        let (space, matrix) = FeatureEncoder::default().fit(&corpus).unwrap();
        let categorical = space.layout().categorical.clone();

        let row = &matrix.row(0).unwrap().as_slice()[categorical];
        let hot: Vec<f32> = row.iter().copied().filter(|v| *v != 0.0).collect();
        // one hot slot per categorical column
        assert_eq!(hot, vec![2.0; 5]);
    }

    #[test]
    fn test_unseen_category_maps_to_zeros() {
        let corpus = create_test_corpus();
        let (space, _) = FeatureEncoder::default().fit(&corpus).unwrap();

        let stranger = profile("z", "Agender", 30, "Atlantis", "")
            .with_orientation("Unknown")
            .with_income_bracket("Unknown")
            .with_education_level("Unknown");
        let vector = space.encode(&stranger);
        let categorical = &vector.as_slice()[space.layout().categorical.clone()];
        assert!(categorical.iter().all(|v| *v == 0.0));
        assert_eq!(vector.dim(), space.dim());
    }

    #[test]
    fn test_empty_tags_zero_text_block() {
        let corpus = create_test_corpus();
        let (space, matrix) = FeatureEncoder::default().fit(&corpus).unwrap();
        let text = &matrix.row(2).unwrap().as_slice()[space.layout().text.clone()];
        assert!(text.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_text_block_norm_equals_weight() {
        let corpus = create_test_corpus();
        let (space, matrix) = FeatureEncoder::default().fit(&corpus).unwrap();
        let text = &matrix.row(0).unwrap().as_slice()[space.layout().text.clone()];
        let norm: f32 = text.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - space.weights().text).abs() < 1e-5);
    }

    #[test]
    fn test_empty_corpus_error() {
        let corpus = ProfileCorpus::new(Vec::new()).unwrap();
        assert!(matches!(
            FeatureEncoder::default().fit(&corpus),
            Err(Error::EmptyCorpus)
        ));
    }

    #[test]
    fn test_missing_column_error() {
        let corpus = ProfileCorpus::new(vec![ProfileRecord::new("a", "A")
            .with_gender("Male")
            .with_age(30)
            .with_interest_tags("")])
        .unwrap();
        let err = FeatureEncoder::default().fit(&corpus).unwrap_err();
        assert!(matches!(err, Error::Configuration(ref msg) if msg.contains("sexual_orientation")));
    }

    #[test]
    fn test_missing_age_column_error() {
        let corpus = ProfileCorpus::new(vec![ProfileRecord::new("a", "A")
            .with_gender("Male")
            .with_orientation("Straight")
            .with_interest_tags("")])
        .unwrap();
        let err = FeatureEncoder::default().fit(&corpus).unwrap_err();
        assert!(matches!(err, Error::Configuration(ref msg) if msg.contains("age")));
    }

    #[test]
    fn test_absent_optional_columns_fit() {
        let bare = |uid: &str, gender: &str, age: u32, tags: &str| {
            ProfileRecord::new(uid, uid)
                .with_gender(gender)
                .with_orientation("Straight")
                .with_age(age)
                .with_interest_tags(tags)
        };
        let corpus = ProfileCorpus::new(vec![
            bare("A", "Male", 30, ""),
            bare("B", "Female", 28, "hiking,coffee"),
            bare("C", "Male", 31, ""),
        ])
        .unwrap();

        let (space, matrix) = FeatureEncoder::default().fit(&corpus).unwrap();
        // location, income and education fit to empty vocabularies
        let widths: Vec<usize> = space.vocabularies().iter().map(|v| v.len()).collect();
        assert_eq!(widths, vec![2, 1, 0, 0, 0]);
        assert_eq!(space.layout().categorical, 1..4);
        assert_eq!(space.layout().text, 4..6);
        assert_eq!(matrix.len(), 3);
    }

    #[test]
    fn test_absent_optional_numeric_is_constant_zero() {
        let corpus = create_test_corpus();
        let encoder = FeatureEncoder::new(EncoderConfig::default().with_engagement_columns()).unwrap();
        let (space, matrix) = encoder.fit(&corpus).unwrap();

        let likes = &space.scalers()[1];
        assert_eq!(likes.column, NumericColumn::LikesReceived);
        assert_eq!(likes.mean, 0.0);
        assert_eq!(likes.std, 1.0);
        assert!(matrix.rows().iter().all(|r| r.as_slice()[1] == 0.0));
        // app_usage_time_label contributes no dimensions
        assert!(space.vocabularies()[5].is_empty());
    }

    #[test]
    fn test_missing_value_in_some_records_defaults() {
        let corpus = ProfileCorpus::new(vec![
            profile("a", "Male", 30, "Boston", "coffee"),
            ProfileRecord::new("b", "B"),
        ])
        .unwrap();
        let (space, matrix) = FeatureEncoder::default().fit(&corpus).unwrap();
        // age defaults to zero: mean 15, std 15
        assert!((space.scalers()[0].mean - 15.0).abs() < 1e-9);
        assert_eq!(matrix.len(), 2);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EncoderConfig {
            max_text_features: 0,
            ..Default::default()
        };
        assert!(matches!(
            FeatureEncoder::new(config),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_engagement_columns_encoded() {
        let mut a = profile("a", "Male", 30, "Boston", "coffee");
        a.likes_received = Some(10.0);
        a.app_usage_time_label = Some("High".to_string());
        let mut b = profile("b", "Female", 28, "Boston", "jazz");
        b.mutual_matches = Some(2.0);
        b.app_usage_time_min = Some(45.0);

        let corpus = ProfileCorpus::new(vec![a, b]).unwrap();
        let encoder = FeatureEncoder::new(EncoderConfig::default().with_engagement_columns()).unwrap();
        let (space, _) = encoder.fit(&corpus).unwrap();
        assert_eq!(space.layout().numeric, 0..4);
        assert_eq!(space.vocabularies().len(), 6);
    }

    #[test]
    fn test_refit_new_generation() {
        let corpus = create_test_corpus();
        let encoder = FeatureEncoder::default();
        let (first, _) = encoder.fit(&corpus).unwrap();
        let (second, _) = encoder.fit(&corpus).unwrap();
        assert_ne!(first.generation(), second.generation());
    }
}
