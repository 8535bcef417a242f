//! Chronolog Index Structures
//!
//! The ordered record index stores records keyed by their score and
//! answers the two query shapes the store needs:
//!
//! - **MemoryIndex**: In-process `BTreeMap` of score → set of records
//! - **SqliteIndex**: SQLite-backed B-tree table with the same contract
//!
//! # Architecture
//!
//! ```text
//! save(record)      → score(created) → insert(score, record)  → true | duplicate
//! get_range(a, b)   → [score(a), score(b)] → range_inclusive → ascending records
//! get_last()        → top_by_score_descending(1)
//! ```
//!
//! # Ordering
//!
//! Records are ordered by score first. Records sharing a score are ordered
//! by `Record`'s `Ord` (created, id, content), so scans are
//! deterministic and repeatable.

mod memory;
mod sqlite;

pub use memory::MemoryIndex;
pub use sqlite::SqliteIndex;

use crate::storage::{Limit, Record, ScoreRange, StorageResult};

/// Score-ordered collection of unique records
///
/// Implementations must be safe to share between threads. `insert` must be
/// atomic with respect to its duplicate check: two concurrent inserts of an
/// equal record yield exactly one `true`.
///
/// Callers derive `score` from `record.created` with a single scorer, so
/// equal records always arrive with equal scores.
pub trait OrderedRecordIndex: Send + Sync {
    /// Insert a record under `score`
    ///
    /// Returns `false` and leaves the index unchanged if an equal record is
    /// already stored.
    fn insert(&self, score: i64, record: Record) -> StorageResult<bool>;

    /// Records with a score inside `range`, ascending, at most `limit` of
    /// them taken from the low end
    fn range_inclusive(&self, range: ScoreRange, limit: Limit) -> StorageResult<Vec<Record>>;

    /// Up to `count` records with the highest scores, descending
    fn top_by_score_descending(&self, count: usize) -> StorageResult<Vec<Record>>;

    /// Number of stored records
    fn size(&self) -> StorageResult<usize>;
}
