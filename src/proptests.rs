use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::{BTreeMap, BTreeSet};

// Small chunks over a small key range so chunks fill and drain often.
const MAX_SIZE: usize = 63;
const CHUNK_SIZE: usize = 4;
const KEYS: usize = 64;

fn config() -> ArrayConfig {
    ArrayConfig::new(MAX_SIZE, CHUNK_SIZE).unwrap()
}

#[derive(Clone, Debug, Arbitrary)]
enum ShrinkOp {
    #[proptest(weight = 8)]
    Set(
        #[proptest(strategy = "0..KEYS")] usize,
        #[proptest(strategy = "proptest::option::of(0u8..4)")] Option<u8>,
    ),
    #[proptest(weight = 3)]
    Get(#[proptest(strategy = "0..KEYS")] usize),
    #[proptest(weight = 1)]
    Clear,
}

#[derive(Clone, Debug, Arbitrary)]
enum SlotOp {
    #[proptest(weight = 5)]
    Write(
        #[proptest(strategy = "0..KEYS")] usize,
        #[proptest(strategy = "proptest::option::of(any::<u16>())")] Option<u16>,
    ),
    #[proptest(weight = 3)]
    Get(#[proptest(strategy = "0..KEYS")] usize),
    #[proptest(weight = 1)]
    Touch(#[proptest(strategy = "0..KEYS")] usize),
}

fn occupied_chunks(m: &BTreeMap<usize, u8>) -> usize {
    m.keys()
        .map(|k| k / CHUNK_SIZE)
        .collect::<BTreeSet<_>>()
        .len()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_two_level_equivalence(ops in prop::collection::vec(any::<ShrinkOp>(), 0..=2000)) {
        let mut t: TwoLevelArray<u8> = TwoLevelArray::with_config(config());
        let mut m: BTreeMap<usize, u8> = BTreeMap::new();

        for op in ops {
            match op {
                ShrinkOp::Set(key, value) => {
                    let old_m = match value {
                        Some(v) => m.insert(key, v),
                        None => m.remove(&key),
                    };
                    prop_assert_eq!(t.set(key, value), old_m);
                }
                ShrinkOp::Get(key) => {
                    prop_assert_eq!(t.get(key), m.get(&key));
                }
                ShrinkOp::Clear => {
                    t.clear();
                    m.clear();
                }
            }

            prop_assert_eq!(t.len(), m.len());
            prop_assert_eq!(t.allocated_chunks(), occupied_chunks(&m));
        }

        t.validate();
        for key in 0..KEYS {
            prop_assert_eq!(t.get(key), m.get(&key));
        }
    }

    #[test]
    fn prop_empty_write_never_allocates(key in 0..KEYS, filled in prop::collection::btree_set(0..KEYS, 0..16)) {
        let mut t: TwoLevelArray<u8> = TwoLevelArray::with_config(config());
        for &k in &filled {
            t.insert(k, 1);
        }
        let before = t.allocated_chunks();
        let had_chunk = t.is_chunk_allocated(key / CHUNK_SIZE);

        t.set(key, None);

        if had_chunk {
            prop_assert!(t.allocated_chunks() <= before);
        } else {
            prop_assert_eq!(t.allocated_chunks(), before);
            prop_assert!(!t.is_chunk_allocated(key / CHUNK_SIZE));
        }
        t.validate();
    }

    #[test]
    fn prop_never_shrink_keeps_chunks(ops in prop::collection::vec(any::<SlotOp>(), 0..=2000)) {
        let mut t: NeverShrinkArray<u16> = NeverShrinkArray::with_config(config());
        let mut m: BTreeMap<usize, u16> = BTreeMap::new();
        let mut touched: BTreeSet<usize> = BTreeSet::new();

        for op in ops {
            match op {
                SlotOp::Write(key, value) => {
                    let old = std::mem::replace(t.slot_mut(key), value);
                    let old_m = match value {
                        Some(v) => m.insert(key, v),
                        None => m.remove(&key),
                    };
                    prop_assert_eq!(old, old_m);
                    touched.insert(key / CHUNK_SIZE);
                }
                SlotOp::Get(key) => {
                    prop_assert_eq!(t.get(key), m.get(&key));
                }
                SlotOp::Touch(key) => {
                    prop_assert_eq!(t.slot_mut(key).as_ref(), m.get(&key));
                    touched.insert(key / CHUNK_SIZE);
                }
            }

            prop_assert_eq!(t.allocated_chunks(), touched.len());
        }

        prop_assert_eq!(t.stats().present_values, m.len());
        for chunk_index in 0..config().num_chunks() {
            prop_assert_eq!(t.is_chunk_allocated(chunk_index), touched.contains(&chunk_index));
        }
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_clear_order_full_chunk() {
    // Keys 4..8 make up chunk 1; key 0 keeps chunk 0 alive throughout.
    let keys: Vec<usize> = (4..8).collect();

    let mut base: TwoLevelArray<u32> = TwoLevelArray::with_config(config());
    base.insert(0, 100);
    for &k in &keys {
        base.insert(k, k as u32);
        // Rewriting the same value must not disturb the occupancy count.
        base.insert(k, k as u32);
    }
    base.validate();

    for_each_permutation(&keys, |perm| {
        let mut t = base.clone();
        let last = perm.len() - 1;
        for (i, k) in perm.into_iter().enumerate() {
            assert_eq!(t.remove(k), Some(k as u32));
            assert_eq!(t.is_chunk_allocated(1), i != last);
            t.validate();
        }
        assert_eq!(t.allocated_chunks(), 1);
        assert_eq!(t.get(0), Some(&100));

        // The freed chunk is not brought back by empty writes.
        for k in 4..8 {
            t.set(k, None);
        }
        assert!(!t.is_chunk_allocated(1));
    });
}

#[test]
fn exhaustive_fill_order_never_shrink() {
    let keys: Vec<usize> = (8..12).collect();

    for_each_permutation(&keys, |perm| {
        let mut t: NeverShrinkArray<usize> = NeverShrinkArray::with_config(config());
        for &k in &perm {
            *t.slot_mut(k) = Some(k);
        }
        for &k in &perm {
            assert_eq!(t.take(k), Some(k));
        }
        assert_eq!(t.allocated_chunks(), 1);
        assert!(t.is_chunk_allocated(2));
        assert_eq!(t.stats().present_values, 0);
    });
}
