use crate::ProfileSource;
use matchx_core::{ProfileCorpus, ProfileRecord, Result};
use parking_lot::RwLock;

/// In-memory profile list, mutable between loads
#[derive(Debug, Default)]
pub struct MemorySource {
    records: RwLock<Vec<ProfileRecord>>,
}

impl MemorySource {
    pub fn new(records: Vec<ProfileRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    pub fn push(&self, record: ProfileRecord) {
        self.records.write().push(record);
    }

    pub fn replace(&self, records: Vec<ProfileRecord>) {
        *self.records.write() = records;
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl ProfileSource for MemorySource {
    fn load(&self) -> Result<ProfileCorpus> {
        ProfileCorpus::new(self.records.read().clone())
    }

    fn describe(&self) -> String {
        format!("memory:{} profiles", self.len())
    }
}

impl From<Vec<ProfileRecord>> for MemorySource {
    fn from(records: Vec<ProfileRecord>) -> Self {
        Self::new(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_snapshot() {
        let source = MemorySource::new(vec![ProfileRecord::new("a", "Ann")]);
        let corpus = source.load().unwrap();
        source.push(ProfileRecord::new("b", "Ben"));

        assert_eq!(corpus.len(), 1);
        assert_eq!(source.load().unwrap().len(), 2);
    }

    #[test]
    fn test_replace() {
        let source = MemorySource::from(vec![ProfileRecord::new("a", "Ann")]);
        source.replace(Vec::new());
        assert!(source.is_empty());
        assert!(source.load().unwrap().is_empty());
    }
}
