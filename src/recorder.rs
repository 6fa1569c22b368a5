// In memory review history.

use crate::pool::Review;
use crate::traits::DrillResult;
use serde::{Deserialize, Serialize};

/// A review with the moment it was stored.
#[derive(Debug, PartialEq, Clone, Deserialize, Serialize)]
pub struct Record<K> {
    pub review: Review<K>,
    pub time: std::time::SystemTime,
}

/// Something to keep the review history.
pub trait Recorder<K>: std::fmt::Debug {
    /// Store a review.
    fn store_record(&mut self, review: &Review<K>) -> DrillResult<()>;

    /// Retrieve all reviews of an item, oldest first.
    fn get_records_by_key(&self, key: &K) -> DrillResult<Vec<Record<K>>>;
}

/// Recorder that only keeps all records in memory, it is (de)serializable so callers can
/// snapshot it.
#[derive(Debug, Deserialize, Serialize)]
pub struct MemoryRecorder<K> {
    records: Vec<Record<K>>,
}

impl<K> Default for MemoryRecorder<K> {
    fn default() -> Self {
        MemoryRecorder { records: vec![] }
    }
}

impl<K: Clone> MemoryRecorder<K> {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from(records: &[Record<K>]) -> Self {
        MemoryRecorder {
            records: records.to_vec(),
        }
    }

    pub fn records(&self) -> &[Record<K>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<K: Clone + PartialEq + std::fmt::Debug> Recorder<K> for MemoryRecorder<K> {
    fn store_record(&mut self, review: &Review<K>) -> DrillResult<()> {
        self.records.push(Record {
            review: review.clone(),
            time: std::time::SystemTime::now(),
        });
        Ok(())
    }

    fn get_records_by_key(&self, key: &K) -> DrillResult<Vec<Record<K>>> {
        Ok(self
            .records
            .iter()
            .filter(|z| &z.review.key == key)
            .cloned()
            .collect::<_>())
    }
}
