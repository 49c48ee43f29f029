//! Encoder configuration
//!
//! Declares which profile columns feed each feature block and how strongly
//! each block counts in the combined vector. Weights are tuning knobs: they
//! change how much a block moves the cosine score, not what is encoded.

use matchx_core::{CategoricalColumn, NumericColumn};
use serde::{Deserialize, Serialize};

/// Default upper bound on the interest-term vocabulary
pub const DEFAULT_MAX_TEXT_FEATURES: usize = 500;

/// Scalar multipliers applied to each feature block before concatenation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FeatureWeights {
    #[serde(default = "default_numeric_weight")]
    pub numeric: f32,
    #[serde(default = "default_categorical_weight")]
    pub categorical: f32,
    #[serde(default = "default_text_weight")]
    pub text: f32,
}

fn default_numeric_weight() -> f32 {
    3.0
}

fn default_categorical_weight() -> f32 {
    2.0
}

fn default_text_weight() -> f32 {
    2.0
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self {
            numeric: default_numeric_weight(),
            categorical: default_categorical_weight(),
            text: default_text_weight(),
        }
    }
}

impl FeatureWeights {
    pub fn new(numeric: f32, categorical: f32, text: f32) -> Self {
        Self {
            numeric,
            categorical,
            text,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (block, weight) in [
            ("numeric", self.numeric),
            ("categorical", self.categorical),
            ("text", self.text),
        ] {
            if !weight.is_finite() {
                return Err(ConfigError::NonFiniteWeight(block));
            }
            if weight < 0.0 {
                return Err(ConfigError::NegativeWeight(block));
            }
        }
        Ok(())
    }
}

/// Configuration for [`crate::FeatureEncoder`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EncoderConfig {
    #[serde(default)]
    pub weights: FeatureWeights,

    /// Columns standardized into the numeric block
    #[serde(default = "default_numeric_columns")]
    pub numeric_columns: Vec<NumericColumn>,

    /// Columns one-hot encoded into the categorical block
    #[serde(default = "default_categorical_columns")]
    pub categorical_columns: Vec<CategoricalColumn>,

    /// Keep only the K most frequent interest terms
    #[serde(default = "default_max_text_features")]
    pub max_text_features: usize,
}

fn default_numeric_columns() -> Vec<NumericColumn> {
    vec![NumericColumn::Age]
}

fn default_categorical_columns() -> Vec<CategoricalColumn> {
    vec![
        CategoricalColumn::Gender,
        CategoricalColumn::SexualOrientation,
        CategoricalColumn::Location,
        CategoricalColumn::IncomeBracket,
        CategoricalColumn::EducationLevel,
    ]
}

fn default_max_text_features() -> usize {
    DEFAULT_MAX_TEXT_FEATURES
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            weights: FeatureWeights::default(),
            numeric_columns: default_numeric_columns(),
            categorical_columns: default_categorical_columns(),
            max_text_features: default_max_text_features(),
        }
    }
}

impl EncoderConfig {
    pub fn with_weights(mut self, weights: FeatureWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Also encode the engagement columns carried by exported datasets
    pub fn with_engagement_columns(mut self) -> Self {
        for column in [
            NumericColumn::LikesReceived,
            NumericColumn::MutualMatches,
            NumericColumn::AppUsageTimeMin,
        ] {
            if !self.numeric_columns.contains(&column) {
                self.numeric_columns.push(column);
            }
        }
        if !self
            .categorical_columns
            .contains(&CategoricalColumn::AppUsageTimeLabel)
        {
            self.categorical_columns
                .push(CategoricalColumn::AppUsageTimeLabel);
        }
        self
    }

    /// Parse a configuration from JSON, filling unspecified fields with defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;

        if self.max_text_features == 0 {
            return Err(ConfigError::ZeroTextFeatures);
        }

        for (i, column) in self.numeric_columns.iter().enumerate() {
            if self.numeric_columns[..i].contains(column) {
                return Err(ConfigError::DuplicateColumn(column.name()));
            }
        }
        for (i, column) in self.categorical_columns.iter().enumerate() {
            if self.categorical_columns[..i].contains(column) {
                return Err(ConfigError::DuplicateColumn(column.name()));
            }
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Weight of the {0} block must be finite")]
    NonFiniteWeight(&'static str),

    #[error("Weight of the {0} block cannot be negative")]
    NegativeWeight(&'static str),

    #[error("max_text_features must be at least 1")]
    ZeroTextFeatures,

    #[error("Column '{0}' is listed more than once")]
    DuplicateColumn(&'static str),

    #[error("Invalid encoder configuration: {0}")]
    Parse(String),
}

impl From<ConfigError> for matchx_core::Error {
    fn from(err: ConfigError) -> Self {
        matchx_core::Error::Configuration(err.to_string())
    }
}
