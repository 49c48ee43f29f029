use ahash::AHashMap;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::{Error, Result};

/// A user's static matching attributes.
///
/// Every field except `uid` is optional on the wire. Absent fields are kept
/// as `None` so the encoder can tell a column that was never supplied apart
/// from one that is present but empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProfileRecord {
    pub uid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(
        default,
        alias = "orientation",
        skip_serializing_if = "Option::is_none"
    )]
    pub sexual_orientation: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_u32",
        skip_serializing_if = "Option::is_none"
    )]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income_bracket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_tags: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub likes_received: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub mutual_matches: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub app_usage_time_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_usage_time_label: Option<String>,
}

impl ProfileRecord {
    pub fn new(uid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    pub fn with_orientation(mut self, orientation: impl Into<String>) -> Self {
        self.sexual_orientation = Some(orientation.into());
        self
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_income_bracket(mut self, bracket: impl Into<String>) -> Self {
        self.income_bracket = Some(bracket.into());
        self
    }

    pub fn with_education_level(mut self, level: impl Into<String>) -> Self {
        self.education_level = Some(level.into());
        self
    }

    pub fn with_interest_tags(mut self, tags: impl Into<String>) -> Self {
        self.interest_tags = Some(tags.into());
        self
    }

    pub fn gender(&self) -> &str {
        self.gender.as_deref().unwrap_or("")
    }

    pub fn sexual_orientation(&self) -> &str {
        self.sexual_orientation.as_deref().unwrap_or("")
    }

    /// Age, defaulting to zero when absent
    pub fn age(&self) -> u32 {
        self.age.unwrap_or(0)
    }

    pub fn interest_tags(&self) -> &str {
        self.interest_tags.as_deref().unwrap_or("")
    }

    /// Raw value of a numeric column, `None` when absent
    pub fn numeric(&self, column: NumericColumn) -> Option<f64> {
        match column {
            NumericColumn::Age => self.age.map(f64::from),
            NumericColumn::LikesReceived => self.likes_received,
            NumericColumn::MutualMatches => self.mutual_matches,
            NumericColumn::AppUsageTimeMin => self.app_usage_time_min,
        }
    }

    /// Raw value of a categorical column, `None` when absent
    pub fn categorical(&self, column: CategoricalColumn) -> Option<&str> {
        match column {
            CategoricalColumn::Gender => self.gender.as_deref(),
            CategoricalColumn::SexualOrientation => self.sexual_orientation.as_deref(),
            CategoricalColumn::Location => self.location.as_deref(),
            CategoricalColumn::IncomeBracket => self.income_bracket.as_deref(),
            CategoricalColumn::EducationLevel => self.education_level.as_deref(),
            CategoricalColumn::AppUsageTimeLabel => self.app_usage_time_label.as_deref(),
        }
    }
}

/// Numeric profile columns the encoder can standardize
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NumericColumn {
    Age,
    LikesReceived,
    MutualMatches,
    AppUsageTimeMin,
}

impl NumericColumn {
    pub fn name(self) -> &'static str {
        match self {
            NumericColumn::Age => "age",
            NumericColumn::LikesReceived => "likes_received",
            NumericColumn::MutualMatches => "mutual_matches",
            NumericColumn::AppUsageTimeMin => "app_usage_time_min",
        }
    }
}

impl fmt::Display for NumericColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Categorical profile columns the encoder can one-hot encode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalColumn {
    Gender,
    SexualOrientation,
    Location,
    IncomeBracket,
    EducationLevel,
    AppUsageTimeLabel,
}

impl CategoricalColumn {
    pub fn name(self) -> &'static str {
        match self {
            CategoricalColumn::Gender => "gender",
            CategoricalColumn::SexualOrientation => "sexual_orientation",
            CategoricalColumn::Location => "location",
            CategoricalColumn::IncomeBracket => "income_bracket",
            CategoricalColumn::EducationLevel => "education_level",
            CategoricalColumn::AppUsageTimeLabel => "app_usage_time_label",
        }
    }
}

impl fmt::Display for CategoricalColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An immutable snapshot of profile records with uid lookup.
///
/// Construction rejects empty and duplicate uids, so every uid resolves to
/// exactly one row.
#[derive(Debug, Clone, Default)]
pub struct ProfileCorpus {
    records: Vec<ProfileRecord>,
    index: AHashMap<String, usize>,
}

impl ProfileCorpus {
    pub fn new(records: Vec<ProfileRecord>) -> Result<Self> {
        let mut index = AHashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            if record.uid.is_empty() {
                return Err(Error::Configuration(format!(
                    "profile at position {} has an empty uid",
                    position
                )));
            }
            if index.insert(record.uid.clone(), position).is_some() {
                return Err(Error::Configuration(format!(
                    "duplicate uid '{}'",
                    record.uid
                )));
            }
        }
        Ok(Self { records, index })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn get(&self, position: usize) -> Option<&ProfileRecord> {
        self.records.get(position)
    }

    /// Row position of a uid in corpus order
    #[inline]
    pub fn position(&self, uid: &str) -> Option<usize> {
        self.index.get(uid).copied()
    }

    pub fn find(&self, uid: &str) -> Option<&ProfileRecord> {
        self.position(uid).and_then(|position| self.records.get(position))
    }

    pub fn records(&self) -> &[ProfileRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProfileRecord> {
        self.records.iter()
    }

    pub fn has_numeric(&self, column: NumericColumn) -> bool {
        self.records.iter().any(|r| r.numeric(column).is_some())
    }

    pub fn has_categorical(&self, column: CategoricalColumn) -> bool {
        self.records.iter().any(|r| r.categorical(column).is_some())
    }

    pub fn has_interest_tags(&self) -> bool {
        self.records.iter().any(|r| r.interest_tags.is_some())
    }

    pub fn into_records(self) -> Vec<ProfileRecord> {
        self.records
    }
}

impl TryFrom<Vec<ProfileRecord>> for ProfileCorpus {
    type Error = Error;

    fn try_from(records: Vec<ProfileRecord>) -> Result<Self> {
        Self::new(records)
    }
}

/// Largest age accepted from serialized records
pub const MAX_AGE: u32 = 120;

// Exported tables often carry numbers as floats or strings ("29", 29.0).
// Null and blank strings mean absent; anything else unparseable is an error.
fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => return Ok(None),
        Some(value) => value,
    };

    let number = match &value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) if s.trim().is_empty() => return Ok(None),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match number {
        Some(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(de::Error::custom(format!("expected a number, got {}", value))),
    }
}

fn lenient_u32<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    match lenient_f64(deserializer)? {
        None => Ok(None),
        Some(v) if (0.0..=f64::from(MAX_AGE)).contains(&v) => Ok(Some(v.round() as u32)),
        Some(v) => Err(de::Error::custom(format!(
            "age {} outside 0..={}",
            v, MAX_AGE
        ))),
    }
}
