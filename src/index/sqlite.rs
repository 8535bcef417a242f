//! SQLite Index - SQLite-backed B-tree for record range queries
//!
//! Stores each record as a row keyed by `(score, created, id, content)`.
//! The primary key doubles as the uniqueness check and as the scan order,
//! so range scans are a B-tree seek followed by a sequential read.
//!
//! Text columns are written in fixed-width forms (hyphenated lowercase
//! UUID, nine-digit fractional seconds) so SQLite's binary collation sorts
//! same-score rows exactly like `Record`'s `Ord`. Years outside
//! 0000-9999 do not keep that property.
//!
//! # Performance
//! - Insert: O(log n) per record
//! - Range query: O(log n + k) where k = results

use crate::index::OrderedRecordIndex;
use crate::storage::{Limit, Record, ScoreRange, StorageError, StorageResult};
use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OpenFlags, Row};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

const CREATED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9f";

const SELECT_COLUMNS: &str = "SELECT id, created, content FROM records";

/// SQLite-backed ordered record index
///
/// The connection is serialized by a mutex, so every operation including
/// `INSERT OR IGNORE` runs atomically.
pub struct SqliteIndex {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteIndex {
    /// Create or open an index file inside `data_dir`
    pub fn open(data_dir: &Path) -> StorageResult<Self> {
        let path = data_dir.join("records.db");

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        // Configure for performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA cache_size = 10000;
            PRAGMA temp_store = MEMORY;
            ",
        )?;

        Self::init(conn, Some(path))
    }

    /// Create a private in-memory database
    pub fn in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> StorageResult<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS records (
                score INTEGER NOT NULL,
                id TEXT NOT NULL,
                created TEXT NOT NULL,
                content TEXT NOT NULL,
                PRIMARY KEY (score, created, id, content)
            ) WITHOUT ROWID",
            [],
        )?;

        tracing::debug!(path = ?path, "Opened SQLite record index");

        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Lock(format!("Failed to acquire index lock: {}", e)))
    }

    /// Get the database file path, `None` for in-memory indexes
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Force checkpoint for WAL mode
    pub fn checkpoint(&self) -> StorageResult<()> {
        self.lock()?
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }

    fn query_records(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> StorageResult<Vec<Record>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(sql)?;
        let rows = stmt.query_map(params, row_to_record)?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

impl OrderedRecordIndex for SqliteIndex {
    fn insert(&self, score: i64, record: Record) -> StorageResult<bool> {
        let changed = self.lock()?.execute(
            "INSERT OR IGNORE INTO records (score, id, created, content)
             VALUES (?, ?, ?, ?)",
            params![
                score,
                record.id.to_string(),
                format_created(&record.created),
                record.content
            ],
        )?;

        Ok(changed == 1)
    }

    fn range_inclusive(&self, range: ScoreRange, limit: Limit) -> StorageResult<Vec<Record>> {
        let sql = format!(
            "{} WHERE score >= ? AND score <= ?
             ORDER BY score, created, id, content
             LIMIT ?",
            SELECT_COLUMNS
        );
        self.query_records(&sql, params![range.low(), range.high(), sql_limit(limit)])
    }

    fn top_by_score_descending(&self, count: usize) -> StorageResult<Vec<Record>> {
        let sql = format!(
            "{} ORDER BY score DESC, created DESC, id DESC, content DESC
             LIMIT ?",
            SELECT_COLUMNS
        );
        self.query_records(&sql, params![sql_limit(Limit::At(count))])
    }

    fn size(&self) -> StorageResult<usize> {
        let count: i64 = self
            .lock()?
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// SQLite treats a negative LIMIT as "no limit"
fn sql_limit(limit: Limit) -> i64 {
    match limit {
        Limit::Unbounded => -1,
        Limit::At(n) => i64::try_from(n).unwrap_or(i64::MAX),
    }
}

fn format_created(created: &NaiveDateTime) -> String {
    created.format(CREATED_FORMAT).to_string()
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<Record> {
    let id: String = row.get(0)?;
    let created: String = row.get(1)?;
    let content: String = row.get(2)?;

    let id = Uuid::parse_str(&id)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;
    let created = NaiveDateTime::parse_from_str(&created, CREATED_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;

    Ok(Record {
        id,
        created,
        content,
    })
}
