//! Property-based testing for the open-addressing containers
//!
//! Validates the container engine against a reference associative array
//! oracle over randomized operation sequences, and checks the structural
//! invariants (power-of-two capacity, one-free-slot guarantee, expand
//! threshold) after every single operation.

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{HashMap, HashSet};

use flathash::map::capacity::expand_at_count;
use flathash::{FlatHashMap, FlatHashSet, HashStrategy, TableConfig};

// =============================================================================
// OPERATION GENERATORS
// =============================================================================

#[derive(Debug, Clone)]
enum MapOp {
    Insert(i32, i64),
    Remove(i32),
    Get(i32),
    Clear,
}

/// Keys from a small range so sequences collide and hit the sentinel key 0
fn key_strategy() -> impl Strategy<Value = i32> {
    -50i32..=50
}

fn map_ops_strategy() -> impl Strategy<Value = Vec<MapOp>> {
    prop::collection::vec(
        prop_oneof![
            8 => (key_strategy(), any::<i64>()).prop_map(|(k, v)| MapOp::Insert(k, v)),
            4 => key_strategy().prop_map(MapOp::Remove),
            4 => key_strategy().prop_map(MapOp::Get),
            1 => Just(MapOp::Clear),
        ],
        0..600,
    )
}

/// Main-buffer occupancy: the sentinel entry lives out of band and does not
/// consume a slot
fn main_slots_used(map: &FlatHashMap<i32, i64>) -> usize {
    map.len() - usize::from(map.contains_key(&0))
}

fn assert_table_invariants(map: &FlatHashMap<i32, i64>) -> Result<(), TestCaseError> {
    prop_assert!(map.capacity().is_power_of_two());
    let used = main_slots_used(map);
    prop_assert!(used < map.capacity(), "no free slot left for probing");
    prop_assert!(
        used <= expand_at_count(map.capacity(), map.load_factor()),
        "occupancy {} above expand threshold",
        used
    );
    Ok(())
}

// =============================================================================
// ORACLE EQUIVALENCE
// =============================================================================

proptest! {
    #[test]
    fn prop_map_matches_oracle(ops in map_ops_strategy()) {
        let mut map = FlatHashMap::<i32, i64>::new();
        let mut oracle: HashMap<i32, i64> = HashMap::new();

        for op in ops {
            match op {
                MapOp::Insert(k, v) => {
                    prop_assert_eq!(map.insert(k, v).unwrap(), oracle.insert(k, v));
                }
                MapOp::Remove(k) => {
                    prop_assert_eq!(map.remove(&k), oracle.remove(&k));
                }
                MapOp::Get(k) => {
                    prop_assert_eq!(map.get(&k), oracle.get(&k));
                }
                MapOp::Clear => {
                    map.clear();
                    oracle.clear();
                }
            }
            prop_assert_eq!(map.len(), oracle.len());
            assert_table_invariants(&map)?;
        }

        // final key sets and per-key values agree
        let mut from_map: Vec<(i32, i64)> = map.iter().map(|(k, v)| (k, *v)).collect();
        let mut from_oracle: Vec<(i32, i64)> = oracle.iter().map(|(k, v)| (*k, *v)).collect();
        from_map.sort_unstable();
        from_oracle.sort_unstable();
        prop_assert_eq!(from_map, from_oracle);
    }

    #[test]
    fn prop_set_matches_oracle(
        ops in prop::collection::vec((key_strategy(), any::<bool>()), 0..400)
    ) {
        let mut set = FlatHashSet::<i32>::new();
        let mut oracle: HashSet<i32> = HashSet::new();

        for (key, insert) in ops {
            if insert {
                prop_assert_eq!(set.insert(key).unwrap(), oracle.insert(key));
            } else {
                prop_assert_eq!(set.remove(&key), oracle.remove(&key));
            }
            prop_assert_eq!(set.len(), oracle.len());
            prop_assert!(set.capacity().is_power_of_two());
        }

        let mut from_set: Vec<i32> = set.iter().collect();
        let mut from_oracle: Vec<i32> = oracle.into_iter().collect();
        from_set.sort_unstable();
        from_oracle.sort_unstable();
        prop_assert_eq!(from_set, from_oracle);
    }

    #[test]
    fn prop_insert_remove_round_trip(
        existing in prop::collection::hash_set(key_strategy(), 0..40),
        key in key_strategy(),
        value in any::<i64>(),
    ) {
        let mut map = FlatHashMap::<i32, i64>::new();
        for &k in &existing {
            map.insert(k, i64::from(k)).unwrap();
        }

        let was_present = map.contains_key(&key);
        let size_before = map.len();

        map.insert(key, value).unwrap();
        prop_assert_eq!(map.get(&key), Some(&value));
        prop_assert_eq!(map.remove(&key), Some(value));

        if was_present {
            prop_assert_eq!(map.len(), size_before - 1);
        } else {
            prop_assert_eq!(map.len(), size_before);
            prop_assert!(!map.contains_key(&key));
        }
        assert_table_invariants(&map)?;
    }

    #[test]
    fn prop_sentinel_key_equivalent_to_ordinary_key(
        value_a in any::<i64>(),
        value_b in any::<i64>(),
    ) {
        // key 0 (the internal empty marker) and key 1 must be
        // indistinguishable from the caller's perspective
        for key in [0i32, 1] {
            let mut map = FlatHashMap::<i32, i64>::new();

            prop_assert_eq!(map.insert(key, value_a).unwrap(), None);
            prop_assert_eq!(map.len(), 1);
            prop_assert!(map.contains_key(&key));
            prop_assert_eq!(map.get(&key), Some(&value_a));

            prop_assert_eq!(map.insert(key, value_b).unwrap(), Some(value_a));
            prop_assert_eq!(map.len(), 1);

            prop_assert_eq!(map.remove(&key), Some(value_b));
            prop_assert_eq!(map.len(), 0);
            prop_assert_eq!(map.get(&key), None);
        }
    }
}

// =============================================================================
// SHIFT-DELETION ON FORCED COLLISION CLUSTERS
// =============================================================================

/// Hashes every key identically so all keys form one probe cluster
#[derive(Clone, Copy, Debug, Default)]
struct ConstantHash;

impl HashStrategy<i32> for ConstantHash {
    fn hash(&self, _key: &i32) -> u32 {
        0
    }

    fn equals(&self, a: &i32, b: &i32) -> bool {
        a == b
    }
}

proptest! {
    #[test]
    fn prop_cluster_survivors_stay_reachable(
        keys in prop::collection::hash_set(1i32..10_000, 2..30),
        victim_pick in any::<prop::sample::Index>(),
    ) {
        let keys: Vec<i32> = keys.into_iter().collect();
        let mut map = FlatHashMap::<i32, i64, ConstantHash>::with_strategy(
            TableConfig::default(),
            ConstantHash,
        )
        .unwrap();

        for &k in &keys {
            map.insert(k, i64::from(k) * 3).unwrap();
        }

        let victim = keys[victim_pick.index(keys.len())];
        prop_assert_eq!(map.remove(&victim), Some(i64::from(victim) * 3));

        for &k in keys.iter().filter(|&&k| k != victim) {
            prop_assert_eq!(map.get(&k), Some(&(i64::from(k) * 3)));
        }
        prop_assert_eq!(map.get(&victim), None);
    }

    #[test]
    fn prop_cluster_survives_interleaved_churn(
        keys in prop::collection::hash_set(1i32..10_000, 4..24),
    ) {
        // remove every other cluster member, then verify and re-insert
        let keys: Vec<i32> = keys.into_iter().collect();
        let mut map = FlatHashMap::<i32, i64, ConstantHash>::with_strategy(
            TableConfig::default(),
            ConstantHash,
        )
        .unwrap();

        for &k in &keys {
            map.insert(k, i64::from(k)).unwrap();
        }
        for (i, &k) in keys.iter().enumerate() {
            if i % 2 == 0 {
                prop_assert_eq!(map.remove(&k), Some(i64::from(k)));
            }
        }
        for (i, &k) in keys.iter().enumerate() {
            if i % 2 == 0 {
                prop_assert_eq!(map.get(&k), None);
            } else {
                prop_assert_eq!(map.get(&k), Some(&i64::from(k)));
            }
        }
        for (i, &k) in keys.iter().enumerate() {
            if i % 2 == 0 {
                map.insert(k, i64::from(k)).unwrap();
            }
        }
        for &k in &keys {
            prop_assert_eq!(map.get(&k), Some(&i64::from(k)));
        }
    }
}

// =============================================================================
// RESIZE THRESHOLD SCENARIO
// =============================================================================

#[test]
fn threshold_triggers_exactly_one_resize() {
    // lf 0.75 on a 16-slot buffer expands at 12 occupied slots: the 13th
    // distinct key doubles capacity exactly once and loses nothing
    let config = TableConfig {
        expected_elements: 10,
        load_factor: 0.75,
        ..TableConfig::default()
    };
    let mut map = FlatHashMap::<i32, i64>::with_config(config).unwrap();
    assert_eq!(map.capacity(), 16);
    assert_eq!(expand_at_count(map.capacity(), map.load_factor()), 12);

    for k in 1..=12 {
        map.insert(k, i64::from(k)).unwrap();
        assert_eq!(map.capacity(), 16);
    }
    map.insert(13, 13).unwrap();
    assert_eq!(map.capacity(), 32);

    for k in 1..=13 {
        assert_eq!(map.get(&k), Some(&i64::from(k)));
    }
}
