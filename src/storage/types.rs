//! Core data types for the Chronolog record store
//!
//! This module defines the fundamental types used throughout the storage layer:
//! - `Record`: An immutable, timestamped entry
//! - `RecordDraft`: A record whose fields have not been validated yet
//! - `ScoreRange`: An inclusive interval of scores for range scans
//! - `Limit`: Optional cap on the size of a result set

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

use crate::storage::error::{StorageError, StorageResult};

/// A single immutable record
///
/// Equality covers all three fields. Ordering is (created, id, content),
/// so records sharing a score stay in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    /// Producer-assigned unique identifier
    pub id: Uuid,
    /// Creation time, as a local date-time without zone
    pub created: NaiveDateTime,
    /// Opaque payload
    pub content: String,
}

impl Record {
    pub fn new(id: Uuid, created: NaiveDateTime, content: impl Into<String>) -> Self {
        Self {
            id,
            created,
            content: content.into(),
        }
    }

    /// Create a record with a random id
    pub fn generate(created: NaiveDateTime, content: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4(), created, content)
    }

    /// Builder method: replace the content, keeping id and timestamp
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }
}

impl Ord for Record {
    fn cmp(&self, other: &Self) -> Ordering {
        self.created
            .cmp(&other.created)
            .then_with(|| self.id.cmp(&other.id))
            .then_with(|| self.content.cmp(&other.content))
    }
}

impl PartialOrd for Record {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Record(id={}, created={}, content={:?})",
            self.id, self.created, self.content
        )
    }
}

/// Unvalidated record, as received from a producer
///
/// Any field may be missing. Converting into a [`Record`] checks presence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordDraft {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub created: Option<NaiveDateTime>,
    #[serde(default)]
    pub content: Option<String>,
}

impl RecordDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn created(mut self, created: NaiveDateTime) -> Self {
        self.created = Some(created);
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

impl From<Record> for RecordDraft {
    fn from(record: Record) -> Self {
        Self {
            id: Some(record.id),
            created: Some(record.created),
            content: Some(record.content),
        }
    }
}

impl TryFrom<RecordDraft> for Record {
    type Error = StorageError;

    fn try_from(draft: RecordDraft) -> StorageResult<Self> {
        let mut missing = Vec::new();
        if draft.id.map_or(true, |id| id.is_nil()) {
            missing.push("id");
        }
        if draft.created.is_none() {
            missing.push("created");
        }
        if draft.content.is_none() {
            missing.push("content");
        }

        match (draft.id, draft.created, draft.content) {
            (Some(id), Some(created), Some(content)) if missing.is_empty() => Ok(Record {
                id,
                created,
                content,
            }),
            _ => Err(StorageError::Validation(format!(
                "Null value in record: {}",
                missing.join(", ")
            ))),
        }
    }
}

/// Inclusive score interval `[low, high]`, always with `low <= high`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreRange {
    low: i64,
    high: i64,
}

impl ScoreRange {
    /// Create a range, rejecting `low > high`
    pub fn try_new(low: i64, high: i64) -> StorageResult<Self> {
        if low <= high {
            Ok(Self { low, high })
        } else {
            Err(StorageError::Validation(format!(
                "From is larger than to ({} > {})",
                low, high
            )))
        }
    }

    /// Range covering a single score
    pub fn point(score: i64) -> Self {
        Self {
            low: score,
            high: score,
        }
    }

    /// Lowest matching score (inclusive)
    pub fn low(&self) -> i64 {
        self.low
    }

    /// Highest matching score (inclusive)
    pub fn high(&self) -> i64 {
        self.high
    }

    pub fn contains(&self, score: i64) -> bool {
        score >= self.low && score <= self.high
    }

    /// Width of the window in milliseconds
    pub fn width(&self) -> i64 {
        self.high.saturating_sub(self.low)
    }
}

/// Maximum number of records a scan may return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Limit {
    #[default]
    Unbounded,
    At(usize),
}

impl Limit {
    /// The cap as a plain count
    pub fn cap(&self) -> usize {
        match self {
            Limit::Unbounded => usize::MAX,
            Limit::At(n) => *n,
        }
    }

    /// The tighter of two limits
    pub fn min(self, other: Limit) -> Limit {
        match (self, other) {
            (Limit::Unbounded, l) | (l, Limit::Unbounded) => l,
            (Limit::At(a), Limit::At(b)) => Limit::At(a.min(b)),
        }
    }
}

impl From<usize> for Limit {
    fn from(n: usize) -> Self {
        Limit::At(n)
    }
}

impl From<Option<usize>> for Limit {
    fn from(n: Option<usize>) -> Self {
        n.map_or(Limit::Unbounded, Limit::At)
    }
}
