use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    Insert(u16, u32),
    Get(u16),
    Contains(u16),
}

/// Replay `ops` against `map` and a `BTreeMap`, checking every answer and the
/// tree's invariants after each step.
fn check_against_btree<M: OrderedMap<u16, u32>>(mut map: M, ops: &[Op]) -> Result<(), TestCaseError> {
    let mut model: BTreeMap<u16, u32> = BTreeMap::new();

    for op in ops {
        match *op {
            Op::Insert(key, value) => {
                prop_assert_eq!(map.insert(key, value), model.insert(key, value));
                prop_assert_eq!(map.verify(), Ok(()));
            }
            Op::Get(key) => {
                prop_assert_eq!(map.get(&key), model.get(&key));
            }
            Op::Contains(key) => {
                prop_assert_eq!(map.contains_key(&key), model.contains_key(&key));
            }
        }
        prop_assert_eq!(map.len(), model.len());
    }

    let got: Vec<u16> = map.keys().copied().collect();
    let expected: Vec<u16> = model.keys().copied().collect();
    prop_assert_eq!(got, expected);
    Ok(())
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(any::<Op>(), 0..=400)
}

/// Keys drawn from a narrow range so replacements are common.
fn dense_ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        3 => (0u16..64, any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        1 => (0u16..64).prop_map(Op::Get),
        1 => (0u16..64).prop_map(Op::Contains),
    ];
    prop::collection::vec(op, 0..=400)
}

fn log2(n: usize) -> f64 {
    (n as f64).log2()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_avl_matches_btree(ops in ops_strategy()) {
        check_against_btree(AvlTreeMap::new(), &ops)?;
    }

    #[test]
    fn prop_red_black_matches_btree(ops in ops_strategy()) {
        check_against_btree(RedBlackTreeMap::new(), &ops)?;
    }

    #[test]
    fn prop_basic_matches_btree(ops in ops_strategy()) {
        check_against_btree(BasicBstMap::new(), &ops)?;
    }

    #[test]
    fn prop_dense_keys_all_engines(ops in dense_ops_strategy()) {
        check_against_btree(AvlTreeMap::new(), &ops)?;
        check_against_btree(RedBlackTreeMap::new(), &ops)?;
        check_against_btree(BasicBstMap::new(), &ops)?;
    }

    #[test]
    fn prop_engines_agree(pairs in prop::collection::vec((any::<u16>(), any::<u32>()), 0..=500)) {
        let avl: AvlTreeMap<u16, u32> = pairs.iter().copied().collect();
        let rb: RedBlackTreeMap<u16, u32> = pairs.iter().copied().collect();
        let basic: BasicBstMap<u16, u32> = pairs.iter().copied().collect();

        let from_avl: Vec<(u16, u32)> = avl.iter().map(|(k, v)| (*k, *v)).collect();
        let from_rb: Vec<(u16, u32)> = rb.iter().map(|(k, v)| (*k, *v)).collect();
        let from_basic: Vec<(u16, u32)> = basic.iter().map(|(k, v)| (*k, *v)).collect();
        prop_assert_eq!(&from_avl, &from_rb);
        prop_assert_eq!(&from_avl, &from_basic);
    }

    #[test]
    fn prop_height_is_logarithmic(keys in prop::collection::btree_set(any::<u32>(), 1..=2000)) {
        // Ascending order is the worst case for an unbalanced tree.
        let mut avl = AvlTreeMap::new();
        let mut rb = RedBlackTreeMap::new();
        for &k in &keys {
            avl.insert(k, ());
            rb.insert(k, ());
        }
        let n = keys.len();
        prop_assert!(avl.height() as f64 <= 1.44 * log2(n + 2));
        prop_assert!(rb.height() as f64 <= 2.0 * log2(n + 1));
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
fn exhaustive_insert_order_small_set() {
    let keys: Vec<u8> = (1..=7).collect();

    for_each_permutation(&keys, |perm| {
        let mut avl = AvlTreeMap::new();
        let mut rb = RedBlackTreeMap::new();
        for (i, &k) in perm.iter().enumerate() {
            avl.insert(k, i);
            rb.insert(k, i);
            avl.verify().unwrap();
            rb.verify().unwrap();
        }
        assert_eq!(avl.keys().copied().collect::<Vec<_>>(), keys);
        assert_eq!(rb.keys().copied().collect::<Vec<_>>(), keys);
        assert!(avl.height() <= 4, "perm {perm:?}");
        assert!(rb.height() <= 6, "perm {perm:?}");
    });
}

#[test]
fn global_switch_verifies_every_insert() {
    debug::set_verify_on_insert(true);
    let mut avl = AvlTreeMap::new();
    let mut rb = RedBlackTreeMap::new();
    for k in (0u32..300).rev().chain(300..600) {
        avl.insert(k, k);
        rb.insert(k, k);
    }
    assert!(debug::verify_on_insert());
    assert_eq!(avl.len(), 600);
    assert_eq!(rb.len(), 600);
}
