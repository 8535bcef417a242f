//! Chronolog Record Store
//!
//! The record store orchestrates the write and read paths:
//! - Write path: RecordDraft → validate → score → index insert
//! - Read path: bounds → score range → index scan
//!
//! Thread-safe: the store is shared behind an `Arc` and all mutation
//! happens inside the index.

use crate::index::{MemoryIndex, OrderedRecordIndex, SqliteIndex};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::score::Scorer;
use crate::storage::types::{Limit, Record, RecordDraft, ScoreRange};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default cap applied to range queries from untrusted callers
pub const DEFAULT_MAX_PAGE_SIZE: usize = 1000;

/// Which index implementation backs the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    /// In-process ordered map, empty at every start
    #[default]
    Memory,
    /// SQLite file under the data directory
    Sqlite,
}

impl fmt::Display for IndexBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexBackend::Memory => write!(f, "memory"),
            IndexBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

impl std::str::FromStr for IndexBackend {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(IndexBackend::Memory),
            "sqlite" => Ok(IndexBackend::Sqlite),
            other => Err(StorageError::Validation(format!(
                "Unknown index backend: {}",
                other
            ))),
        }
    }
}

/// Configuration for the record store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Index implementation
    pub backend: IndexBackend,
    /// Directory for the SQLite backend
    pub data_dir: PathBuf,
    /// Converts `created` to index scores
    pub scorer: Scorer,
    /// Cap applied by `get_page`
    pub max_page_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: IndexBackend::Memory,
            data_dir: PathBuf::from("chronolog_data"),
            scorer: Scorer::utc(),
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    pub fn backend(mut self, backend: IndexBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn scorer(mut self, scorer: Scorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn max_page_size(mut self, max_page_size: usize) -> Self {
        self.max_page_size = max_page_size;
        self
    }
}

/// The Chronolog record store
pub struct RecordStore {
    index: Arc<dyn OrderedRecordIndex>,
    scorer: Scorer,
    max_page_size: usize,
}

impl RecordStore {
    /// Open a store with the configured backend
    pub fn open(config: StoreConfig) -> StorageResult<Self> {
        if config.max_page_size == 0 {
            return Err(StorageError::Validation(
                "max_page_size must be greater than zero".to_string(),
            ));
        }

        let index: Arc<dyn OrderedRecordIndex> = match config.backend {
            IndexBackend::Memory => Arc::new(MemoryIndex::new()),
            IndexBackend::Sqlite => Arc::new(SqliteIndex::open(&config.data_dir)?),
        };

        tracing::info!(
            backend = %config.backend,
            offset = %config.scorer.offset(),
            max_page_size = config.max_page_size,
            "Record store opened"
        );

        Ok(Self {
            index,
            scorer: config.scorer,
            max_page_size: config.max_page_size,
        })
    }

    /// In-memory store with default settings
    pub fn in_memory() -> Self {
        Self::with_index(Arc::new(MemoryIndex::new()), Scorer::utc())
    }

    /// Store over an existing index
    pub fn with_index(index: Arc<dyn OrderedRecordIndex>, scorer: Scorer) -> Self {
        Self {
            index,
            scorer,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }

    /// Save a record
    ///
    /// Fails with `Validation` if a field is missing and with
    /// `DuplicateRecord` if an equal record is already stored.
    pub fn save(&self, draft: impl Into<RecordDraft>) -> StorageResult<()> {
        let record = Record::try_from(draft.into())?;
        let score = self.scorer.score(&record.created)?;

        if !self.index.insert(score, record.clone())? {
            return Err(StorageError::DuplicateRecord(format!(
                "{} is already added",
                record
            )));
        }

        tracing::debug!(id = %record.id, score, "Created record");
        Ok(())
    }

    /// The record with the highest score, if any
    pub fn get_last(&self) -> StorageResult<Option<Record>> {
        let last = self.index.top_by_score_descending(1)?.into_iter().next();
        tracing::debug!(found = last.is_some(), "GetLast");
        Ok(last)
    }

    /// Records created within `[from, to]`, ascending, at most `limit`
    pub fn get_range(
        &self,
        from: &NaiveDateTime,
        to: &NaiveDateTime,
        limit: impl Into<Limit>,
    ) -> StorageResult<Vec<Record>> {
        let low = self.scorer.score(from)?;
        let high = self.scorer.score(to)?;
        let range = ScoreRange::try_new(low, high)?;

        let records = self.index.range_inclusive(range, limit.into())?;
        tracing::debug!(
            low,
            window = range.width(),
            results = records.len(),
            "GetRange"
        );
        Ok(records)
    }

    /// Records created within `[from, to]` without a cap
    pub fn get_range_unbounded(
        &self,
        from: &NaiveDateTime,
        to: &NaiveDateTime,
    ) -> StorageResult<Vec<Record>> {
        self.get_range(from, to, Limit::Unbounded)
    }

    /// Range query capped to the configured page size
    pub fn get_page(&self, from: &NaiveDateTime, to: &NaiveDateTime) -> StorageResult<Vec<Record>> {
        self.get_range(from, to, Limit::At(self.max_page_size))
    }

    /// Number of stored records
    pub fn len(&self) -> StorageResult<usize> {
        self.index.size()
    }

    pub fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn max_page_size(&self) -> usize {
        self.max_page_size
    }
}
