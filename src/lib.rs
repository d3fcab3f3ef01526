//! record-store: a single-threaded in-memory record store keyed by
//! store-assigned integer identifiers.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: O(1) average add/find/delete over fixed-shape records while
//!   keeping the records themselves in one dense, hole-free array.
//! - Layers:
//!   - HashIndex: open-addressing table mapping identifier -> array
//!     position. Linear probing, tombstone deletion, power-of-two
//!     capacity. Knows nothing about record contents.
//!   - RecordStore: growable dense array of records with swap-delete.
//!   - Store: public API; assigns identifiers and keeps the two layers in
//!     lockstep.
//!   - snapshot: flat binary file format layered on `Store::bulk_replace`.
//!
//! Constraints
//! - Single-threaded: no locking; exclusive access through `&mut Store`.
//! - Identifiers start at 1, are assigned only by `Store::add`, and are
//!   never reused after deletion.
//! - Every key in the index points at the position of the record carrying
//!   that key, and every record is reachable through the index.
//! - Index occupancy (live + tombstones) stays at or below 3/4 of capacity
//!   after every insert and delete.
//!
//! Swap-delete and index repair
//! - Deleting position `p` moves the last record into `p`. The index entry
//!   for the deleted key becomes a tombstone and the moved record's entry
//!   is re-pointed to `p` inside one `HashIndex::remove_and_relocate` call,
//!   before any threshold rehash. Physical order is therefore not insertion
//!   order.
//!
//! Rehash policy
//! - Growth: before an insert that would push occupancy past 3/4, the table
//!   doubles and only live entries are reinserted.
//! - Compaction: when tombstones outnumber live keys and exceed a floor of
//!   32, the table is rebuilt at the same capacity.
//! - Growth is checked first; a table that qualifies for both doubles.
//! - Capacity never shrinks.
//!
//! Failure model
//! - Allocation failure aborts (standard Rust allocator behaviour).
//!   The last identifier `add` hands out is `i32::MAX - 1`; one more
//!   `add` aborts, since the snapshot header cannot represent a larger
//!   counter.
//! - Lookups of absent identifiers return `None`/`false`; snapshot problems
//!   are returned as `SnapshotError` with the store left untouched.
//! - The library never prints. Rehash, growth, and snapshot events are
//!   emitted as `tracing` debug/trace events for hosts that subscribe.
//!
//! Notes and non-goals
//! - No concurrent access, secondary indexes, range queries, or format
//!   migration.
//! - References returned by `find` borrow the store, so the borrow checker
//!   rules out holding one across a reallocating `add`/`delete`.

mod config;
mod error;
pub mod hash_index;
mod hash_index_proptest;
mod hashing;
mod record;
pub mod record_store;
pub mod snapshot;
mod store;

// Public surface
pub use config::StoreConfig;
pub use error::{ConsistencyError, FieldError, Result, SnapshotError};
pub use record::{
    Director, FixedText, Genre, Record, RecordFields, RecordId, Title, DIRECTOR_BUF, GENRE_BUF,
    TITLE_BUF,
};
pub use snapshot::Snapshot;
pub use store::Store;
