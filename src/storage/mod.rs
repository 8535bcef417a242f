//! Chronolog Storage
//!
//! This module provides the record store and its building blocks:
//!
//! - **types**: Core data structures (Record, RecordDraft, ScoreRange, Limit)
//! - **score**: Local date-time → epoch-millisecond score conversion
//! - **store**: The record store orchestrating validation and the index
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//!   RecordDraft → Validate → Score → Index insert (duplicate check)
//!
//! Read Path:
//!   [from, to] → Score range → Index scan → Records (ascending)
//! ```
//!
//! # Example
//!
//! ```rust
//! use chronolog::storage::{Limit, Record, RecordStore};
//! use chrono::NaiveDate;
//!
//! let store = RecordStore::in_memory();
//! let created = NaiveDate::from_ymd_opt(2024, 1, 1)
//!     .unwrap()
//!     .and_hms_opt(9, 0, 0)
//!     .unwrap();
//!
//! store.save(Record::generate(created, "hello")).unwrap();
//!
//! let last = store.get_last().unwrap();
//! assert_eq!(last.map(|r| r.content), Some("hello".to_string()));
//!
//! let found = store.get_range(&created, &created, Limit::At(10)).unwrap();
//! assert_eq!(found.len(), 1);
//! ```

pub mod error;
pub mod score;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use score::Scorer;
pub use store::{IndexBackend, RecordStore, StoreConfig, DEFAULT_MAX_PAGE_SIZE};
pub use types::{Limit, Record, RecordDraft, ScoreRange};
