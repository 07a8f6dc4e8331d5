#![cfg(test)]

// Property tests for the tables kept inside the crate so they can check
// the chain structure through `RawTable::check_invariants`.

use crate::raw::threshold;
use crate::{GenericTable, SeededHash, StdSeeded, StringTable};
use proptest::prelude::*;
use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Add(usize, i32),
    Remove(usize),
    Take(usize),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    Iterate,
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            6 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Add(i, v)),
            2 => idx.clone().prop_map(Op::Remove),
            1 => idx.clone().prop_map(Op::Take),
            2 => idx.clone().prop_map(Op::Get),
            1 => prop_oneof![contains_pool, "[a-z]{0,5}"].prop_map(Op::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Mutate(i, d)),
            1 => Just(Op::Iterate),
            1 => Just(Op::Clear),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Drives a GenericTable and a std HashMap model through the same operations.
// Invariants checked after every op:
// - `len`/`is_empty` parity with the model.
// - Every entry is linked into exactly the bucket its hash selects.
// - Bucket count is a power of two that never shrinks, and the entry count
//   stays within one insertion of the load threshold.
fn run_generic<H>(
    mut sut: GenericTable<String, i32, H>,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError>
where
    H: SeededHash<String>,
{
    let mut model: HashMap<String, i32> = HashMap::new();
    let mut buckets = sut.bucket_count();

    for op in ops {
        match op {
            Op::Add(i, v) => {
                sut.add(pool[i].clone(), v);
                model.insert(pool[i].clone(), v);
            }
            Op::Remove(i) => {
                let removed = sut.remove(&pool[i]);
                prop_assert_eq!(removed, model.remove(&pool[i]).is_some());
            }
            Op::Take(i) => {
                let taken = sut.take(&pool[i]);
                let expected = model.remove_entry(&pool[i]);
                prop_assert_eq!(taken, expected);
            }
            Op::Get(i) => {
                prop_assert_eq!(sut.get(&pool[i]), model.get(&pool[i]));
            }
            Op::Contains(s) => {
                prop_assert_eq!(sut.contains(&s), model.contains_key(&s));
            }
            Op::Mutate(i, d) => {
                if let Some(v) = sut.get_mut(&pool[i]) {
                    *v = v.wrapping_add(d);
                    let mv = model.get_mut(&pool[i]).expect("model has key");
                    *mv = mv.wrapping_add(d);
                } else {
                    prop_assert!(!model.contains_key(&pool[i]));
                }
            }
            Op::Iterate => {
                let seen: BTreeMap<_, _> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                let expected: BTreeMap<_, _> = model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(seen.len(), sut.len(), "iteration yields each entry once");
                prop_assert_eq!(seen, expected);
            }
            Op::Clear => {
                sut.clear();
                model.clear();
            }
        }

        sut.raw().check_invariants();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.bucket_count() >= buckets, "tables never shrink");
        buckets = sut.bucket_count();
        prop_assert!(sut.len() <= threshold(sut.bucket_count()) + 1);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_generic_state_machine((pool, ops) in arb_scenario(), seed in any::<u64>()) {
        let sut: GenericTable<String, i32> =
            GenericTable::with_seed_and_hasher(seed, StdSeeded::default());
        run_generic(sut, &pool, ops)?;
    }

    // Same invariants under worst-case collisions: every key hashes to 0, so
    // all entries share one chain and equality alone resolves lookups.
    #[test]
    fn prop_generic_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sut = GenericTable::with_seed_and_hasher(0, |_: &String, _: u64| 0u64);
        run_generic(sut, &pool, ops)?;
    }

    // StringTable against a model; after each op the chain structure is valid.
    #[test]
    fn prop_string_state_machine((pool, ops) in arb_scenario(), seed in any::<u64>()) {
        let mut sut: StringTable<i32> = StringTable::new(seed);
        let mut model: HashMap<String, i32> = HashMap::new();
        for op in ops {
            match op {
                Op::Add(i, v) => {
                    sut.add(&pool[i], v);
                    model.insert(pool[i].clone(), v);
                }
                Op::Remove(i) => {
                    prop_assert_eq!(sut.remove(&pool[i]), model.remove(&pool[i]).is_some());
                }
                Op::Take(i) => {
                    prop_assert_eq!(sut.take(&pool[i]), model.remove(&pool[i]));
                }
                Op::Get(i) => prop_assert_eq!(sut.get(&pool[i]), model.get(&pool[i])),
                Op::Contains(s) => prop_assert_eq!(sut.contains(&s), model.contains_key(&s)),
                Op::Mutate(i, d) => {
                    if let Some(v) = sut.get_mut(&pool[i]) {
                        *v = v.wrapping_add(d);
                        if let Some(mv) = model.get_mut(&pool[i]) { *mv = mv.wrapping_add(d); }
                    }
                }
                Op::Iterate => {
                    let seen: BTreeSet<_> = sut.iter().map(|(k, v)| (k.to_string(), *v)).collect();
                    let expected: BTreeSet<_> = model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                    prop_assert_eq!(seen, expected);
                }
                Op::Clear => {
                    sut.clear();
                    model.clear();
                }
            }
            sut.raw().check_invariants();
            prop_assert_eq!(sut.len(), model.len());
        }
    }

    // Every value handed to a table is dropped exactly once across
    // overwrites, removals and the final release.
    #[test]
    fn prop_values_dropped_exactly_once((pool, ops) in arb_scenario()) {
        let live = Rc::new(Cell::new(0i64));
        struct Counted(Rc<Cell<i64>>);
        impl Drop for Counted {
            fn drop(&mut self) {
                self.0.set(self.0.get() - 1);
            }
        }
        let make = |live: &Rc<Cell<i64>>| {
            live.set(live.get() + 1);
            Counted(live.clone())
        };

        let mut sut: GenericTable<String, Counted> = GenericTable::new();
        for op in ops {
            match op {
                Op::Add(i, _) | Op::Mutate(i, _) => sut.add(pool[i].clone(), make(&live)),
                Op::Remove(i) | Op::Take(i) => { sut.remove(&pool[i]); }
                Op::Clear => sut.clear(),
                Op::Get(_) | Op::Contains(_) | Op::Iterate => {}
            }
            prop_assert_eq!(live.get(), sut.len() as i64, "live values equal stored entries");
        }
        sut.release();
        prop_assert_eq!(live.get(), 0);
    }
}
