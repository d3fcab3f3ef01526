//! RecordStore: dense, contiguous record array with swap-delete.

use crate::config::FIRST_RECORD_CAPACITY;
use crate::record::{Record, RecordId};

/// Growable array of records. Positions `0..len()` are always live; there
/// are no holes. Capacity is tracked explicitly so growth follows a fixed
/// doubling schedule independent of the allocator's rounding.
#[derive(Clone, Debug, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    cap: usize,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        let mut s = Self::new();
        s.reserve(n);
        s
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Make room for at least `need` records in total.
    pub fn reserve(&mut self, need: usize) {
        if self.cap >= need {
            return;
        }
        let mut new_cap = if self.cap == 0 {
            FIRST_RECORD_CAPACITY
        } else {
            self.cap * 2
        };
        while new_cap < need {
            new_cap *= 2;
        }
        tracing::trace!(from = self.cap, to = new_cap, "record_store.grow");
        self.records.reserve_exact(new_cap - self.records.len());
        self.cap = new_cap;
    }

    /// Place `record` at the next free position and return that position.
    pub fn append(&mut self, record: Record) -> usize {
        self.reserve(self.records.len() + 1);
        let position = self.records.len();
        self.records.push(record);
        position
    }

    /// Remove the record at `position` by moving the last record into it.
    ///
    /// Returns the removed record and, when another record was moved, that
    /// record's identifier; it now lives at `position`. Insertion order is
    /// not preserved.
    ///
    /// # Panics
    /// If `position >= len()`.
    pub fn swap_delete(&mut self, position: usize) -> (Record, Option<RecordId>) {
        let removed = self.records.swap_remove(position);
        let moved = self.records.get(position).map(Record::id);
        (removed, moved)
    }

    pub fn get(&self, position: usize) -> Option<&Record> {
        self.records.get(position)
    }

    pub fn get_mut(&mut self, position: usize) -> Option<&mut Record> {
        self.records.get_mut(position)
    }

    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordFields;

    fn rec(n: i32) -> Record {
        let fields = RecordFields::new(&format!("t{n}"), "g", "d", 2000, 90, 5.0).unwrap();
        Record::new(RecordId::new(n).unwrap(), fields)
    }

    fn ids(s: &RecordStore) -> Vec<i32> {
        s.iter().map(|r| r.id().get()).collect()
    }

    #[test]
    fn append_returns_consecutive_positions() {
        let mut s = RecordStore::new();
        assert_eq!(s.capacity(), 0);
        assert_eq!(s.append(rec(1)), 0);
        assert_eq!(s.append(rec(2)), 1);
        assert_eq!(s.capacity(), 8);
        assert_eq!(s.get(1).map(|r| r.id().get()), Some(2));
        assert!(s.get(2).is_none());
    }

    #[test]
    fn capacity_doubles_on_overflow() {
        let mut s = RecordStore::new();
        for n in 1..=9 {
            s.append(rec(n));
        }
        assert_eq!(s.capacity(), 16);
        for n in 10..=17 {
            s.append(rec(n));
        }
        assert_eq!(s.capacity(), 32);
    }

    #[test]
    fn reserve_jumps_to_requested_minimum() {
        let mut s = RecordStore::with_capacity(100);
        assert_eq!(s.capacity(), 128);
        s.reserve(50);
        assert_eq!(s.capacity(), 128);
    }

    /// Invariant: deleting a middle position moves the last record into it.
    #[test]
    fn swap_delete_middle_moves_last() {
        let mut s = RecordStore::new();
        for n in 1..=4 {
            s.append(rec(n));
        }
        let (removed, moved) = s.swap_delete(1);
        assert_eq!(removed.id().get(), 2);
        assert_eq!(moved.map(RecordId::get), Some(4));
        assert_eq!(ids(&s), vec![1, 4, 3]);
    }

    /// Invariant: deleting the last position moves nothing.
    #[test]
    fn swap_delete_last_moves_nothing() {
        let mut s = RecordStore::new();
        for n in 1..=3 {
            s.append(rec(n));
        }
        let (removed, moved) = s.swap_delete(2);
        assert_eq!(removed.id().get(), 3);
        assert_eq!(moved, None);
        assert_eq!(ids(&s), vec![1, 2]);

        let (_, moved) = s.swap_delete(0);
        assert_eq!(moved.map(RecordId::get), Some(2));
        let (_, moved) = s.swap_delete(0);
        assert_eq!(moved, None);
        assert!(s.is_empty());
    }

    #[test]
    #[should_panic]
    fn swap_delete_out_of_range_panics() {
        let mut s = RecordStore::new();
        s.append(rec(1));
        let _ = s.swap_delete(1);
    }
}
