//! Error types for field construction, snapshot loading, and consistency checks.

use std::io;

use thiserror::Error;

/// A text value does not fit its fixed-width field.
#[derive(Debug, Error)]
pub enum FieldError {
    #[error("text is {len} bytes, limit is {max}")]
    TooLong { max: usize, len: usize },

    #[error("text contains a NUL byte")]
    InteriorNul,

    #[error("{field}: {source}")]
    Field {
        field: &'static str,
        #[source]
        source: Box<FieldError>,
    },
}

impl FieldError {
    pub(crate) fn in_field(self, field: &'static str) -> Self {
        FieldError::Field {
            field,
            source: Box::new(self),
        }
    }
}

/// Reasons a snapshot could not be written or installed.
///
/// Every variant is reported before any state is replaced; a failed load
/// leaves the target store as it was.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("bad magic {found:#010x}, expected {expected:#010x}")]
    BadMagic { found: u32, expected: u32 },

    #[error("unsupported format version {0}")]
    UnsupportedVersion(u32),

    #[error("header truncated: {available} of {expected} bytes")]
    TruncatedHeader { expected: usize, available: usize },

    #[error("{count} records need {expected} bytes, only {available} available")]
    TruncatedRecords {
        count: u64,
        expected: u64,
        available: u64,
    },

    #[error("record {index}: {field} is not valid UTF-8")]
    InvalidText { index: usize, field: &'static str },

    #[error("next identifier {0} is outside 1..i32::MAX")]
    InvalidNextId(i32),

    #[error("record {index} has non-positive identifier {id}")]
    InvalidId { index: usize, id: i32 },

    #[error("identifier {id} is not below next identifier {next_id}")]
    IdNotBelowNext { id: i32, next_id: i32 },

    #[error("identifier {0} appears more than once")]
    DuplicateId(i32),
}

/// A broken link between the index and the record array.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsistencyError {
    #[error("index holds {index} keys but the store holds {records} records")]
    CountMismatch { index: usize, records: usize },

    #[error("identifier {id} maps to position {position}, past the end ({len})")]
    PositionOutOfRange { id: i32, position: usize, len: usize },

    #[error("identifier {id} maps to position {position}, which holds {found}")]
    WrongRecord { id: i32, position: usize, found: i32 },

    #[error("record {id} at position {position} is not reachable through the index")]
    Unindexed { id: i32, position: usize },

    #[error("index capacity {0} is not a power of two")]
    CapacityNotPow2(usize),

    #[error("index occupancy {occupied}/{capacity} exceeds the load limit")]
    Overloaded { occupied: usize, capacity: usize },
}

/// Result type for snapshot operations.
pub type Result<T> = std::result::Result<T, SnapshotError>;
