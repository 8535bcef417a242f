//! Memory Index - In-process ordered map of score → records
//!
//! A `BTreeMap<i64, BTreeSet<Record>>` behind a `RwLock`. The outer map
//! orders by score, the inner set orders same-score records and enforces
//! uniqueness.
//!
//! # Performance
//! - Insert: O(log n)
//! - Range query: O(log n + k) where k = results
//! - Top-k: O(k) from the back of the map

use crate::index::OrderedRecordIndex;
use crate::storage::{Limit, Record, ScoreRange, StorageError, StorageResult};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct ScoreMap {
    by_score: BTreeMap<i64, BTreeSet<Record>>,
    len: usize,
}

/// In-memory ordered record index
///
/// Readers share the lock; an insert holds the write half for both the
/// duplicate check and the insertion.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    inner: RwLock<ScoreMap>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, ScoreMap>> {
        self.inner
            .read()
            .map_err(|e| StorageError::Lock(format!("Failed to acquire index read lock: {}", e)))
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, ScoreMap>> {
        self.inner
            .write()
            .map_err(|e| StorageError::Lock(format!("Failed to acquire index write lock: {}", e)))
    }

    /// Number of distinct scores currently stored
    pub fn distinct_scores(&self) -> StorageResult<usize> {
        Ok(self.read()?.by_score.len())
    }
}

impl OrderedRecordIndex for MemoryIndex {
    fn insert(&self, score: i64, record: Record) -> StorageResult<bool> {
        let mut map = self.write()?;
        let inserted = map.by_score.entry(score).or_default().insert(record);
        if inserted {
            map.len += 1;
        }
        Ok(inserted)
    }

    fn range_inclusive(&self, range: ScoreRange, limit: Limit) -> StorageResult<Vec<Record>> {
        let map = self.read()?;
        Ok(map
            .by_score
            .range(range.low()..=range.high())
            .flat_map(|(_, records)| records.iter())
            .take(limit.cap())
            .cloned()
            .collect())
    }

    fn top_by_score_descending(&self, count: usize) -> StorageResult<Vec<Record>> {
        let map = self.read()?;
        Ok(map
            .by_score
            .iter()
            .rev()
            .flat_map(|(_, records)| records.iter().rev())
            .take(count)
            .cloned()
            .collect())
    }

    fn size(&self) -> StorageResult<usize> {
        Ok(self.read()?.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::contract;

    #[test]
    fn test_empty_index() {
        contract::empty_index(&MemoryIndex::new());
    }

    #[test]
    fn test_rejects_duplicates() {
        contract::rejects_duplicates(&MemoryIndex::new());
    }

    #[test]
    fn test_inclusive_bounds() {
        contract::inclusive_bounds(&MemoryIndex::new());
    }

    #[test]
    fn test_orders_and_limits() {
        contract::orders_and_limits(&MemoryIndex::new());
    }

    #[test]
    fn test_same_millisecond_in_creation_order() {
        contract::same_millisecond_in_creation_order(&MemoryIndex::new());
    }

    #[test]
    fn test_top_descending() {
        contract::top_descending(&MemoryIndex::new());
    }

    #[test]
    fn test_concurrent_inserts() {
        contract::concurrent_inserts(&MemoryIndex::new());
    }

    #[test]
    fn test_same_score_shares_bucket() {
        let index = MemoryIndex::new();
        let t = contract::origin();
        index.insert(0, Record::generate(t, "a")).unwrap();
        index.insert(0, Record::generate(t, "b")).unwrap();
        index.insert(1, Record::generate(t, "c")).unwrap();

        assert_eq!(index.size().unwrap(), 3);
        assert_eq!(index.distinct_scores().unwrap(), 2);
    }

    #[test]
    fn test_poisoned_lock_is_reported() {
        let index = std::sync::Arc::new(MemoryIndex::new());
        let clone = std::sync::Arc::clone(&index);
        let _ = std::thread::spawn(move || {
            let _guard = clone.inner.write().unwrap();
            panic!("poison the index lock");
        })
        .join();

        assert!(matches!(index.size(), Err(StorageError::Lock(_))));
    }
}
