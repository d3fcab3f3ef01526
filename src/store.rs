//! Store: keeps a `HashIndex` and a `RecordStore` in lockstep.

use crate::config::StoreConfig;
use crate::error::{ConsistencyError, SnapshotError};
use crate::hash_index::HashIndex;
use crate::record::{Record, RecordFields, RecordId};
use crate::record_store::RecordStore;

/// In-memory record store with O(1) average add, find, and delete.
///
/// Identifiers are assigned by the store, start at 1, and are never
/// reused. Physical order is not insertion order once anything has been
/// deleted.
#[derive(Clone, Debug)]
pub struct Store {
    index: HashIndex,
    records: RecordStore,
    next_id: i32,
}

impl Store {
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            index: HashIndex::with_capacity(config.index_capacity),
            records: RecordStore::with_capacity(config.record_capacity),
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of live records.
    pub fn count(&self) -> usize {
        self.len()
    }

    /// Identifier the next `add` will assign.
    pub fn next_id(&self) -> i32 {
        self.next_id
    }

    pub fn add(&mut self, fields: RecordFields) -> RecordId {
        let id = RecordId::new(self.next_id).expect("next identifier is always positive");
        self.next_id = match self.next_id.checked_add(1) {
            Some(n) => n,
            // Identifiers must stay representable in the snapshot header.
            None => std::process::abort(),
        };
        let position = self.records.append(Record::new(id, fields));
        self.index.put(id, position);
        id
    }

    pub fn find(&self, id: RecordId) -> Option<&Record> {
        let position = self.index.get(id)?;
        let record = self
            .records
            .get(position)
            .expect("index position must be inside the record array");
        debug_assert_eq!(record.id(), id);
        Some(record)
    }

    /// Mutable access to a record's fields. The identifier stays fixed.
    pub fn find_mut(&mut self, id: RecordId) -> Option<&mut RecordFields> {
        let position = self.index.get(id)?;
        let record = self
            .records
            .get_mut(position)
            .expect("index position must be inside the record array");
        Some(record.fields_mut())
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.index.contains_key(id)
    }

    /// Remove a record, returning it. `None` when `id` is not live.
    pub fn remove(&mut self, id: RecordId) -> Option<Record> {
        let position = self.index.get(id)?;
        let (removed, moved) = self.records.swap_delete(position);
        let relocated = self.index.remove_and_relocate(id, moved.map(|m| (m, position)));
        debug_assert!(relocated);
        Some(removed)
    }

    pub fn delete(&mut self, id: RecordId) -> bool {
        self.remove(id).is_some()
    }

    /// Records in current physical order.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn records(&self) -> &[Record] {
        self.records.as_slice()
    }

    /// Records whose title, genre, or director contains `keyword`,
    /// ignoring case. Linear scan in physical order.
    pub fn search<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a Record> + 'a {
        self.records.iter().filter(move |r| r.matches(keyword))
    }

    /// Replace the whole contents with `records` and set the counter to
    /// `next_id`, rebuilding the index from scratch.
    ///
    /// Fails without touching `self` when the input would break identifier
    /// uniqueness: `next_id` outside `1..i32::MAX` (at `i32::MAX` the next
    /// `add` could not advance the counter), a duplicate identifier, or an
    /// identifier not below `next_id`.
    pub fn bulk_replace(&mut self, records: Vec<Record>, next_id: i32) -> Result<(), SnapshotError> {
        if next_id <= 0 || next_id == i32::MAX {
            return Err(SnapshotError::InvalidNextId(next_id));
        }
        let mut index = HashIndex::for_keys(records.len());
        let mut store = RecordStore::with_capacity(records.len());
        for record in records {
            let id = record.id();
            if id.get() >= next_id {
                return Err(SnapshotError::IdNotBelowNext {
                    id: id.get(),
                    next_id,
                });
            }
            if index.contains_key(id) {
                return Err(SnapshotError::DuplicateId(id.get()));
            }
            let position = store.append(record);
            index.put(id, position);
        }
        tracing::debug!(
            records = store.len(),
            next_id,
            index_capacity = index.capacity(),
            "store.bulk_replace"
        );
        self.index = index;
        self.records = store;
        self.next_id = next_id;
        Ok(())
    }

    /// Verify that the index and the record array describe the same set of
    /// identifiers and that the index is within its load limit.
    pub fn check_consistency(&self) -> Result<(), ConsistencyError> {
        if !self.index.capacity().is_power_of_two() {
            return Err(ConsistencyError::CapacityNotPow2(self.index.capacity()));
        }
        if !self.index.is_well_formed() {
            return Err(ConsistencyError::Overloaded {
                occupied: self.index.len() + self.index.tombstones(),
                capacity: self.index.capacity(),
            });
        }
        if self.index.len() != self.records.len() {
            return Err(ConsistencyError::CountMismatch {
                index: self.index.len(),
                records: self.records.len(),
            });
        }
        for (id, position) in self.index.iter() {
            match self.records.get(position) {
                None => {
                    return Err(ConsistencyError::PositionOutOfRange {
                        id: id.get(),
                        position,
                        len: self.records.len(),
                    })
                }
                Some(r) if r.id() != id => {
                    return Err(ConsistencyError::WrongRecord {
                        id: id.get(),
                        position,
                        found: r.id().get(),
                    })
                }
                Some(_) => {}
            }
        }
        for (position, r) in self.records.iter().enumerate() {
            if self.index.get(r.id()) != Some(position) {
                return Err(ConsistencyError::Unindexed {
                    id: r.id().get(),
                    position,
                });
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn index(&self) -> &HashIndex {
        &self.index
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a Store {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
