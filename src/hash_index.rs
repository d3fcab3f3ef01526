//! HashIndex: open-addressing map from record identifier to array position.
//!
//! Linear probing over a power-of-two slot array. Deleted entries leave a
//! tombstone so later probe sequences still walk past them; tombstones are
//! recycled by `put` and dropped wholesale by a rehash.

use crate::config::{LOAD_DEN, LOAD_NUM, MIN_INDEX_CAPACITY, TOMBSTONE_FLOOR};
use crate::hashing::{mix32, next_pow2};
use crate::record::RecordId;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Slot {
    Empty,
    Filled { key: RecordId, position: usize },
    Tomb,
}

#[derive(Clone, Debug)]
pub struct HashIndex {
    slots: Vec<Slot>,
    live: usize,
    tombs: usize,
}

impl HashIndex {
    pub fn new() -> Self {
        Self::with_capacity(MIN_INDEX_CAPACITY)
    }

    /// Table with room for at least `n` slots, rounded up to a power of two.
    pub fn with_capacity(n: usize) -> Self {
        let cap = next_pow2(n.max(MIN_INDEX_CAPACITY));
        Self {
            slots: vec![Slot::Empty; cap],
            live: 0,
            tombs: 0,
        }
    }

    /// Table sized so that `n` keys fit without a growth rehash.
    pub fn for_keys(n: usize) -> Self {
        Self::with_capacity(n.saturating_mul(LOAD_DEN).div_ceil(LOAD_NUM))
    }

    pub fn len(&self) -> usize {
        self.live
    }
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
    pub fn tombstones(&self) -> usize {
        self.tombs
    }

    #[inline]
    fn start(&self, key: RecordId) -> usize {
        mix32(key.hash_bits()) as usize & (self.capacity() - 1)
    }

    /// Slot index holding `key`, if any. Stops at the first empty slot and
    /// never walks more than one full lap.
    fn probe(&self, key: RecordId) -> Option<usize> {
        let mask = self.capacity() - 1;
        let start = self.start(key);
        for step in 0..self.capacity() {
            let idx = (start + step) & mask;
            match self.slots[idx] {
                Slot::Empty => return None,
                Slot::Filled { key: k, .. } if k == key => return Some(idx),
                Slot::Filled { .. } | Slot::Tomb => {}
            }
        }
        None
    }

    pub fn get(&self, key: RecordId) -> Option<usize> {
        match self.slots[self.probe(key)?] {
            Slot::Filled { position, .. } => Some(position),
            Slot::Empty | Slot::Tomb => None,
        }
    }

    pub fn contains_key(&self, key: RecordId) -> bool {
        self.probe(key).is_some()
    }

    /// Map `key` to `position`, overwriting any existing mapping.
    pub fn put(&mut self, key: RecordId, position: usize) {
        self.maybe_rehash(1);

        let mask = self.capacity() - 1;
        let start = self.start(key);
        let mut first_tomb = None;
        for step in 0..self.capacity() {
            let idx = (start + step) & mask;
            match self.slots[idx] {
                Slot::Empty => {
                    let target = first_tomb.unwrap_or(idx);
                    self.claim(target, key, position);
                    return;
                }
                Slot::Tomb => {
                    if first_tomb.is_none() {
                        first_tomb = Some(idx);
                    }
                }
                Slot::Filled { key: k, .. } if k == key => {
                    self.slots[idx] = Slot::Filled { key, position };
                    return;
                }
                Slot::Filled { .. } => {}
            }
        }
        // A full lap without an empty slot: every slot is filled or a tombstone.
        let target = first_tomb.expect("index has no free slot after the load check");
        self.claim(target, key, position);
    }

    fn claim(&mut self, idx: usize, key: RecordId, position: usize) {
        if self.slots[idx] == Slot::Tomb {
            self.tombs -= 1;
        }
        self.slots[idx] = Slot::Filled { key, position };
        self.live += 1;
    }

    pub fn remove(&mut self, key: RecordId) -> bool {
        self.remove_and_relocate(key, None)
    }

    /// Remove `key` and, in the same step, point `moved.0` at `moved.1`.
    ///
    /// This is the index half of a swap-delete: the record that filled the
    /// vacated array slot is re-pointed before any threshold rehash runs, so
    /// no intermediate state is ever observable. Returns false (and changes
    /// nothing) when `key` is absent.
    pub fn remove_and_relocate(&mut self, key: RecordId, moved: Option<(RecordId, usize)>) -> bool {
        let Some(idx) = self.probe(key) else {
            return false;
        };
        self.slots[idx] = Slot::Tomb;
        self.live -= 1;
        self.tombs += 1;

        if let Some((moved_key, new_position)) = moved {
            let j = self
                .probe(moved_key)
                .expect("relocated identifier must already be indexed");
            self.slots[j] = Slot::Filled {
                key: moved_key,
                position: new_position,
            };
        }

        self.maybe_rehash(0);
        true
    }

    fn over_load(&self, incoming: usize) -> bool {
        (self.live + self.tombs + incoming) * LOAD_DEN > self.capacity() * LOAD_NUM
    }

    /// Growth takes precedence: a table that is both over the load limit and
    /// tombstone-heavy doubles rather than compacting in place. Through
    /// `put`/`remove` alone that state does not arise, because the
    /// compaction branch fires as soon as its condition holds.
    fn maybe_rehash(&mut self, incoming: usize) {
        if self.over_load(incoming) {
            self.rehash(self.capacity() * 2);
        } else if self.tombs > self.live && self.tombs > TOMBSTONE_FLOOR {
            self.rehash(self.capacity());
        }
    }

    fn rehash(&mut self, new_cap: usize) {
        tracing::debug!(
            from = self.capacity(),
            to = new_cap,
            live = self.live,
            tombstones = self.tombs,
            "hash_index.rehash"
        );
        let old = std::mem::replace(&mut self.slots, vec![Slot::Empty; new_cap]);
        self.live = 0;
        self.tombs = 0;
        let mask = new_cap - 1;
        for slot in old {
            if let Slot::Filled { key, .. } = slot {
                let mut idx = self.start(key);
                while self.slots[idx] != Slot::Empty {
                    idx = (idx + 1) & mask;
                }
                self.slots[idx] = slot;
                self.live += 1;
            }
        }
    }

    /// Live `(key, position)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, usize)> + '_ {
        self.slots.iter().filter_map(|s| match *s {
            Slot::Filled { key, position } => Some((key, position)),
            Slot::Empty | Slot::Tomb => None,
        })
    }

    /// True when the capacity is a power of two and occupancy is within the
    /// load limit.
    pub fn is_well_formed(&self) -> bool {
        self.capacity().is_power_of_two() && !self.over_load(0)
    }
}

impl Default for HashIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: i32) -> RecordId {
        RecordId::new(n).unwrap()
    }

    /// Invariant: `put` then `get` returns the stored position; a second
    /// `put` on the same key overwrites without growing `len`.
    #[test]
    fn put_get_overwrite() {
        let mut ix = HashIndex::new();
        ix.put(id(5), 0);
        ix.put(id(9), 1);
        assert_eq!(ix.get(id(5)), Some(0));
        assert_eq!(ix.get(id(9)), Some(1));
        assert_eq!(ix.get(id(7)), None);

        ix.put(id(5), 42);
        assert_eq!(ix.get(id(5)), Some(42));
        assert_eq!(ix.len(), 2);
    }

    /// Invariant: removal leaves a tombstone; the key is gone and removing it
    /// again reports false without touching counters.
    #[test]
    fn remove_marks_tombstone() {
        let mut ix = HashIndex::new();
        ix.put(id(1), 0);
        assert!(ix.remove(id(1)));
        assert_eq!(ix.get(id(1)), None);
        assert_eq!(ix.len(), 0);
        assert_eq!(ix.tombstones(), 1);

        assert!(!ix.remove(id(1)));
        assert_eq!(ix.tombstones(), 1);
    }

    /// Invariant: lookups probe past tombstones, and a later insert recycles
    /// the first tombstone on its path. Keys 2 and 4 share start slot 1 at
    /// capacity 16.
    #[test]
    fn probe_walks_past_and_recycles_tombstones() {
        let mut ix = HashIndex::new();
        assert_eq!(ix.start(id(2)), ix.start(id(4)));

        ix.put(id(2), 10);
        ix.put(id(4), 20);
        assert!(ix.remove(id(2)));
        assert_eq!(ix.get(id(4)), Some(20), "probe must continue past the tombstone");

        // Overwriting 4 must find the live entry, not claim the tombstone.
        ix.put(id(4), 21);
        assert_eq!(ix.len(), 1);
        assert_eq!(ix.tombstones(), 1);
        assert_eq!(ix.get(id(4)), Some(21));

        // A fresh key on the same path reuses the tombstone.
        ix.put(id(2), 11);
        assert_eq!(ix.tombstones(), 0);
        assert_eq!(ix.slots[ix.start(id(2))], Slot::Filled { key: id(2), position: 11 });
        assert_eq!(ix.get(id(4)), Some(21));
    }

    /// Invariant: capacity doubles only when the next insert would push
    /// occupancy past 3/4. 12 keys fit in 16 slots; the 13th doubles.
    #[test]
    fn grows_when_load_limit_would_be_exceeded() {
        let mut ix = HashIndex::new();
        for n in 1..=12 {
            ix.put(id(n), n as usize);
        }
        assert_eq!(ix.capacity(), 16);
        ix.put(id(13), 13);
        assert_eq!(ix.capacity(), 32);
        for n in 1..=13 {
            assert_eq!(ix.get(id(n)), Some(n as usize));
        }
        assert!(ix.is_well_formed());
    }

    /// Invariant: when tombstones outnumber live keys and exceed the floor,
    /// the table compacts at the same capacity.
    #[test]
    fn tombstone_heavy_table_compacts_in_place() {
        let mut ix = HashIndex::new();
        for n in 1..=40 {
            ix.put(id(n), n as usize);
        }
        assert_eq!(ix.capacity(), 64);

        for n in 1..=32 {
            assert!(ix.remove(id(n)));
        }
        assert_eq!(ix.tombstones(), 32);

        assert!(ix.remove(id(33)));
        assert_eq!(ix.tombstones(), 0);
        assert_eq!(ix.capacity(), 64);
        assert_eq!(ix.len(), 7);
        for n in 34..=40 {
            assert_eq!(ix.get(id(n)), Some(n as usize));
        }
    }

    /// Invariant: `remove_and_relocate` drops one key and re-points another
    /// in a single call.
    #[test]
    fn remove_and_relocate_repoints_moved_key() {
        let mut ix = HashIndex::new();
        ix.put(id(1), 0);
        ix.put(id(2), 1);
        ix.put(id(3), 2);
        assert!(ix.remove_and_relocate(id(1), Some((id(3), 0))));
        assert_eq!(ix.get(id(1)), None);
        assert_eq!(ix.get(id(3)), Some(0));
        assert_eq!(ix.get(id(2)), Some(1));
        assert_eq!(ix.len(), 2);

        assert!(!ix.remove_and_relocate(id(1), Some((id(2), 9))));
        assert_eq!(ix.get(id(2)), Some(1), "a miss must not relocate anything");
    }

    /// Invariant: a table that is over the load limit and tombstone-heavy at
    /// the same time doubles rather than compacting. `remove` would compact
    /// first, so the slots are tombstoned directly here.
    #[test]
    fn growth_wins_over_compaction() {
        let mut ix = HashIndex::with_capacity(64);
        for n in 1..=48 {
            ix.put(id(n), n as usize);
        }
        assert_eq!(ix.capacity(), 64);
        for slot in ix.slots.iter_mut() {
            if matches!(*slot, Slot::Filled { key, .. } if key.get() <= 38) {
                *slot = Slot::Tomb;
            }
        }
        ix.live = 10;
        ix.tombs = 38;

        ix.put(id(100), 100);
        assert_eq!(ix.capacity(), 128);
        assert_eq!(ix.tombstones(), 0);
        assert_eq!(ix.len(), 11);
        for n in 39..=48 {
            assert_eq!(ix.get(id(n)), Some(n as usize));
        }
        assert_eq!(ix.get(id(100)), Some(100));
        assert_eq!(ix.get(id(1)), None);
    }

    #[test]
    fn for_keys_avoids_growth() {
        let mut ix = HashIndex::for_keys(100);
        let cap = ix.capacity();
        assert_eq!(cap, 256);
        for n in 1..=100 {
            ix.put(id(n), n as usize);
        }
        assert_eq!(ix.capacity(), cap);
    }
}
