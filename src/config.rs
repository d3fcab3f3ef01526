//! Construction-time sizing for a `Store`.

/// Smallest index capacity; smaller requests are rounded up to this.
pub const MIN_INDEX_CAPACITY: usize = 16;

/// Occupancy limit (live + tombstones) as a fraction `NUM / DEN` of capacity.
pub const LOAD_NUM: usize = 3;
pub const LOAD_DEN: usize = 4;

/// Tombstone count that must be exceeded before a same-capacity compaction
/// is considered.
pub const TOMBSTONE_FLOOR: usize = 32;

/// First record-array capacity when growing from empty.
pub const FIRST_RECORD_CAPACITY: usize = 8;

/// Initial sizing for a `Store`. Both values are hints: the index rounds
/// up to a power of two (at least `MIN_INDEX_CAPACITY`) and the record
/// array allocates lazily when `record_capacity` is zero.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StoreConfig {
    pub index_capacity: usize,
    pub record_capacity: usize,
}

impl StoreConfig {
    pub const fn new() -> Self {
        Self {
            index_capacity: MIN_INDEX_CAPACITY,
            record_capacity: 0,
        }
    }

    pub const fn index_capacity(mut self, n: usize) -> Self {
        self.index_capacity = n;
        self
    }

    pub const fn record_capacity(mut self, n: usize) -> Self {
        self.record_capacity = n;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new()
    }
}
