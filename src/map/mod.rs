//! Open-addressing containers
//!
//! This module provides the resizable open-addressing table engine shared by
//! the map and set variants:
//! - [`FlatHashMap`]: key-value table over sentinel-capable keys
//! - [`FlatHashSet`]: key-only table with the same probe and resize logic
//! - [`capacity`]: the pure sizing policy behind all growth decisions
//! - [`SentinelKey`]: the reserved empty-slot marker contract
//!
//! All variants probe linearly over a power-of-two slot buffer and delete by
//! backward shifting, so there are no tombstones and no probe-sequence decay
//! under churn.

pub mod capacity;
mod open_map;
mod open_set;
mod sentinel;

pub use open_map::{FlatHashMap, Iter as MapIter, PooledIter as PooledMapIter, TableConfig};
pub use open_set::{FlatHashSet, Iter as SetIter, PooledIter as PooledSetIter};
pub use sentinel::SentinelKey;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_exports() {
        let mut map = FlatHashMap::<i32, u32>::new();
        map.insert(1, 2).unwrap();
        assert_eq!(map.get(&1), Some(&2));

        let mut set = FlatHashSet::<i32>::new();
        assert!(set.insert(1).unwrap());

        assert!(capacity::round_capacity(100).is_power_of_two());
        assert_eq!(<i32 as SentinelKey>::SENTINEL, 0);

        let config = TableConfig::packed();
        assert_eq!(config.load_factor, capacity::MAX_LOAD_FACTOR);
    }
}
