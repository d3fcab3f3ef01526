#![cfg(test)]

// Property tests for HashIndex kept inside the crate so they can reach the
// slot-level counters without widening the public API.

use crate::config::{LOAD_DEN, LOAD_NUM};
use crate::hash_index::HashIndex;
use crate::record::RecordId;
use proptest::prelude::*;
use std::collections::HashMap;

#[derive(Clone, Debug)]
enum Op {
    Put(i32, usize),
    Remove(i32),
    Get(i32),
    Relocate(i32, i32, usize),
}

// Small key space so removals and re-puts hit the same probe paths, with
// enough operations to cross several growth and compaction thresholds.
fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    let key = 1i32..=96;
    let op = prop_oneof![
        4 => (key.clone(), 0usize..1000).prop_map(|(k, p)| Op::Put(k, p)),
        3 => key.clone().prop_map(Op::Remove),
        2 => key.clone().prop_map(Op::Get),
        1 => (key.clone(), key, 0usize..1000).prop_map(|(a, b, p)| Op::Relocate(a, b, p)),
    ];
    proptest::collection::vec(op, 1..400)
}

fn id(n: i32) -> RecordId {
    RecordId::new(n).unwrap()
}

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants exercised after every operation:
// - `get` agrees with the model for every key in the key space.
// - `len` equals the model size; tombstones never go negative.
// - Capacity is a power of two and never shrinks.
// - (live + tombstones) * 4 <= capacity * 3.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_index_matches_model(ops in arb_ops()) {
        let mut sut = HashIndex::new();
        let mut model: HashMap<i32, usize> = HashMap::new();
        let mut last_cap = sut.capacity();

        for op in ops {
            match op {
                Op::Put(k, p) => {
                    sut.put(id(k), p);
                    model.insert(k, p);
                }
                Op::Remove(k) => {
                    let removed = sut.remove(id(k));
                    prop_assert_eq!(removed, model.remove(&k).is_some());
                }
                Op::Get(k) => {
                    prop_assert_eq!(sut.get(id(k)), model.get(&k).copied());
                }
                Op::Relocate(a, b, p) => {
                    // Only meaningful when `b` is live and distinct from `a`.
                    if a != b && model.contains_key(&b) {
                        let removed = sut.remove_and_relocate(id(a), Some((id(b), p)));
                        let expected = model.remove(&a).is_some();
                        prop_assert_eq!(removed, expected);
                        if expected {
                            model.insert(b, p);
                        }
                    }
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            prop_assert!(sut.capacity().is_power_of_two());
            prop_assert!(sut.capacity() >= last_cap, "capacity must never shrink");
            last_cap = sut.capacity();
            prop_assert!(
                (sut.len() + sut.tombstones()) * LOAD_DEN <= sut.capacity() * LOAD_NUM,
                "occupancy {} + {} over limit for capacity {}",
                sut.len(), sut.tombstones(), sut.capacity()
            );
        }

        for k in 1..=96 {
            prop_assert_eq!(sut.get(id(k)), model.get(&k).copied());
        }
        let mut seen: Vec<(i32, usize)> = sut.iter().map(|(k, p)| (k.get(), p)).collect();
        let mut expected: Vec<(i32, usize)> = model.into_iter().collect();
        seen.sort_unstable();
        expected.sort_unstable();
        prop_assert_eq!(seen, expected);
    }
}
