#![cfg(test)]

// Property tests for KeyStore + ValueStore kept inside the crate so they do
// not require feature gates to access internal modules.

use crate::key_store::{Insert, KeyStore};
use crate::value_store::ValueStore;
use core::hash::BuildHasher;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::hash::Hasher;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Set(usize, i32),
    Remove(usize),
    Find(usize),
    Contains(String),
    Iterate,
    Rehash(usize),
    Reserve(usize),
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Set(i, v)),
            2 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::Find),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            1 => Just(OpI::Iterate),
            1 => (0usize..300).prop_map(OpI::Rehash),
            1 => (0usize..100).prop_map(OpI::Reserve),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run_state_machine<S: BuildHasher>(
    hasher: S,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut keys: KeyStore<String, S> = KeyStore::with_layout(hasher, 1.0, 8);
    let mut values: ValueStore<i32> = ValueStore::new();
    let mut model: HashMap<String, i32> = HashMap::new();

    for op in ops {
        match op {
            OpI::Set(i, v) => {
                let k = pool[i].clone();
                let already = model.contains_key(&k);
                match keys.insert(k.clone()) {
                    Insert::New(h) => {
                        prop_assert!(!already, "new slot only for absent keys");
                        prop_assert!(values.put(h, v).is_none());
                    }
                    Insert::Existing(h) => {
                        prop_assert!(already, "existing slot only for live keys");
                        let prev = values.put(h, v);
                        prop_assert_eq!(prev, model.get(&k).copied());
                    }
                }
                model.insert(k, v);
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                match keys.remove(k) {
                    Some((h, kk)) => {
                        prop_assert_eq!(&kk, k);
                        let mv = model.remove(k).expect("present in model");
                        prop_assert_eq!(values.take(h), Some(mv));
                        prop_assert!(keys.key(h).is_none(), "removed handle must not resolve");
                    }
                    None => prop_assert!(!model.contains_key(k)),
                }
            }
            OpI::Find(i) => {
                let k = &pool[i];
                let found = keys.find(k).and_then(|h| values.get(h)).copied();
                prop_assert_eq!(found, model.get(k).copied());
            }
            OpI::Contains(s) => {
                prop_assert_eq!(keys.contains_key(&s), model.contains_key(&s));
            }
            OpI::Iterate => {
                let s_keys: BTreeSet<_> = keys.iter().map(|(_, k)| k.clone()).collect();
                let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                prop_assert_eq!(s_keys, m_keys);
                for (h, k) in keys.iter() {
                    prop_assert_eq!(values.get(h), model.get(k));
                }
            }
            OpI::Rehash(n) => {
                prop_assert!(keys.rehash(n).is_ok());
                prop_assert!(keys.bucket_count() >= n);
                prop_assert!(keys.bucket_count().is_power_of_two());
            }
            OpI::Reserve(n) => {
                let before = keys.bucket_count();
                prop_assert!(keys.reserve(n).is_ok());
                prop_assert!(keys.bucket_count() >= before);
                prop_assert!(keys.bucket_count() >= n);
            }
            OpI::Clear => {
                keys.clear();
                values.clear();
                model.clear();
            }
        }

        // Post-conditions after each op
        prop_assert_eq!(keys.len(), model.len());
        prop_assert_eq!(values.len(), model.len());
        prop_assert_eq!(keys.is_empty(), model.is_empty());
        prop_assert!(keys.load_factor() <= keys.max_load_factor());
    }
    Ok(())
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - Insert of a live key reuses its handle; the value store replaces in place.
// - `remove` returns the stored key, invalidates the handle, frees the value.
// - `find`/`contains_key` parity with the model for pooled and random keys.
// - Iteration yields each live key exactly once with its current value.
// - Rehash/reserve keep every entry and respect the load factor.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_state_machine(std::collections::hash_map::RandomState::new(), &pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: Same state-machine invariants as above, under worst-case
// collision behavior (constant hasher).
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_state_machine(ConstBuildHasher, &pool, ops)?;
    }
}
