use crate::ProfileSource;
use matchx_core::{Error, ProfileCorpus, ProfileRecord, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// On-disk layout of a profile file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// A single JSON array of records
    Array,
    /// One JSON record per line, blank lines ignored
    Lines,
}

impl SourceFormat {
    /// Sniff the format from the first non-whitespace character
    pub fn detect(contents: &str) -> Self {
        if contents.trim_start().starts_with('[') {
            SourceFormat::Array
        } else {
            SourceFormat::Lines
        }
    }
}

/// Profile records stored in a JSON or JSON-lines file
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse records from file contents in either supported format
    pub fn parse(contents: &str) -> Result<Vec<ProfileRecord>> {
        match SourceFormat::detect(contents) {
            SourceFormat::Array => Ok(serde_json::from_str(contents)?),
            SourceFormat::Lines => contents
                .lines()
                .enumerate()
                .filter(|(_, line)| !line.trim().is_empty())
                .map(|(i, line)| {
                    serde_json::from_str(line).map_err(|e| {
                        Error::Serialization(format!("line {}: {}", i + 1, e))
                    })
                })
                .collect(),
        }
    }
}

impl ProfileSource for JsonFileSource {
    fn load(&self) -> Result<ProfileCorpus> {
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "failed to read profile file");
            e
        })?;
        let records = Self::parse(&contents)?;
        debug!(path = %self.path.display(), profiles = records.len(), "profiles loaded");
        ProfileCorpus::new(records)
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}
