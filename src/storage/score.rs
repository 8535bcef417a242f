//! Score conversion
//!
//! Records carry a local date-time. The index orders them by a numeric
//! score: epoch milliseconds of that local time interpreted in a fixed
//! UTC offset. The offset is configured once and passed in explicitly.

use chrono::{FixedOffset, NaiveDateTime, Offset, SubsecRound, TimeZone, Utc};

use crate::storage::error::{StorageError, StorageResult};

const SECONDS_PER_MINUTE: i32 = 60;

/// Converts local date-times to index scores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scorer {
    offset: FixedOffset,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::utc()
    }
}

impl Scorer {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Scorer interpreting local times as UTC
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// Build from an offset in minutes east of UTC
    pub fn from_offset_minutes(minutes: i32) -> StorageResult<Self> {
        minutes
            .checked_mul(SECONDS_PER_MINUTE)
            .and_then(FixedOffset::east_opt)
            .map(Self::new)
            .ok_or_else(|| {
                StorageError::Validation(format!("UTC offset out of range: {} minutes", minutes))
            })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Epoch milliseconds of `created` in this scorer's offset
    ///
    /// Sub-millisecond precision is floored.
    pub fn score(&self, created: &NaiveDateTime) -> StorageResult<i64> {
        self.offset
            .from_local_datetime(created)
            .single()
            .map(|dt| dt.timestamp_millis())
            .ok_or_else(|| {
                StorageError::Validation(format!("Timestamp out of range: {}", created))
            })
    }

    /// Current local time in this offset, truncated to milliseconds
    pub fn now(&self) -> NaiveDateTime {
        Utc::now()
            .with_timezone(&self.offset)
            .naive_local()
            .trunc_subsecs(3)
    }
}
