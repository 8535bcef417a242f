//! # Chronolog
//!
//! An append-only store of immutable, timestamped records answering two
//! questions: "what is the most recent record" and "which records were
//! created within `[from, to]`".
//!
//! ## Features
//!
//! - **Ordered index**: Records keyed by epoch-millisecond score, many per score
//! - **Uniqueness**: Identical records are rejected, even under concurrent writers
//! - **Inclusive ranges**: Both bounds of a range query are matches
//! - **Backends**: In-memory `BTreeMap` or SQLite B-tree
//!
//! ## Modules
//!
//! - [`storage`]: Records, scoring and the record store
//! - [`index`]: Ordered index trait and its backends
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML + environment configuration
//!
//! ## Quick Start
//!
//! ```rust
//! use chronolog::storage::{Record, RecordStore, StorageError};
//! use chrono::NaiveDate;
//!
//! let store = RecordStore::in_memory();
//! let t = NaiveDate::from_ymd_opt(2024, 5, 1)
//!     .unwrap()
//!     .and_hms_opt(10, 0, 0)
//!     .unwrap();
//!
//! let record = Record::generate(t, "first");
//! store.save(record.clone()).unwrap();
//!
//! // Saving the identical record again is rejected
//! assert!(matches!(
//!     store.save(record),
//!     Err(StorageError::DuplicateRecord(_))
//! ));
//!
//! let in_range = store.get_range_unbounded(&t, &t).unwrap();
//! assert_eq!(in_range.len(), 1);
//! ```

pub mod api;
pub mod config;
pub mod index;
pub mod storage;

// Re-export top-level types for convenience
pub use storage::{
    IndexBackend, Limit, Record, RecordDraft, RecordStore, ScoreRange, Scorer, StorageError,
    StorageResult, StoreConfig,
};

pub use index::{MemoryIndex, OrderedRecordIndex, SqliteIndex};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use config::{
    generate_default_config, Config, ConfigError, LoggingConfig,
    StorageConfig as ConfigStorageConfig, ApiConfig as ConfigApiConfig,
};
