//! FlatHashSet - open-addressing hash set with backward-shift deletion
//!
//! The set form of the open-addressing engine: one flat key buffer, linear
//! probing, no tombstones. A genuine key equal to the empty-slot marker is
//! tracked by a single out-of-band flag.
//!
//! # Examples
//!
//! ```rust
//! use flathash::FlatHashSet;
//!
//! let mut set = FlatHashSet::<i32>::new();
//! assert!(set.insert(3).unwrap());
//! assert!(!set.insert(3).unwrap());
//! assert!(set.contains(&3));
//! assert!(set.remove(&3));
//! ```

use crate::error::Result;
use crate::hash::{DefaultStrategy, HashStrategy, Mixer};
use crate::map::capacity;
use crate::map::open_map::TableConfig;
use crate::map::sentinel::SentinelKey;
use crate::pool::{IterCursor, IteratorPool};

/// Open-addressing hash set over sentinel-capable keys
pub struct FlatHashSet<K, S = DefaultStrategy>
where
    K: SentinelKey,
    S: HashStrategy<K>,
{
    keys: Vec<K>,
    size: usize,
    has_sentinel_key: bool,
    resize_at: usize,
    load_factor: f64,
    mixer: Mixer,
    seed: u32,
    strategy: S,
}

impl<K, S> FlatHashSet<K, S>
where
    K: SentinelKey,
    S: HashStrategy<K> + Default,
{
    /// Create an empty set with default configuration
    pub fn new() -> Self {
        Self::from_validated(capacity::MIN_CAPACITY, &TableConfig::default(), S::default())
    }

    /// Create a set sized for `expected_elements` at the default load factor
    pub fn with_capacity(expected_elements: usize) -> Result<Self> {
        Self::with_config(TableConfig::with_expected_elements(expected_elements))
    }

    /// Create a set from a full configuration
    pub fn with_config(config: TableConfig) -> Result<Self> {
        Self::with_strategy(config, S::default())
    }
}

impl<K, S> FlatHashSet<K, S>
where
    K: SentinelKey,
    S: HashStrategy<K>,
{
    /// Create a set with an explicit hashing strategy
    pub fn with_strategy(config: TableConfig, strategy: S) -> Result<Self> {
        let buffer_size = capacity::min_buffer_size(config.expected_elements, config.load_factor)?;
        Ok(Self::from_validated(buffer_size, &config, strategy))
    }

    fn from_validated(buffer_size: usize, config: &TableConfig, strategy: S) -> Self {
        Self {
            keys: vec![K::SENTINEL; buffer_size],
            size: 0,
            has_sentinel_key: false,
            resize_at: capacity::expand_at_count(buffer_size, config.load_factor),
            load_factor: config.load_factor,
            mixer: config.mixer,
            seed: config.seed,
            strategy,
        }
    }

    /// Add `key`; returns true if it was not already present
    pub fn insert(&mut self, key: K) -> Result<bool> {
        if key.is_sentinel() {
            let added = !self.has_sentinel_key;
            self.has_sentinel_key = true;
            return Ok(added);
        }

        let mask = self.mask();
        let mut slot = self.hash_slot(&key);
        loop {
            let existing = self.keys[slot];
            if existing.is_sentinel() {
                break;
            }
            if self.strategy.equals(&existing, &key) {
                return Ok(false);
            }
            slot = (slot + 1) & mask;
        }

        if self.size == self.resize_at {
            self.allocate_then_insert_then_rehash(slot, key)?;
        } else {
            self.keys[slot] = key;
        }
        self.size += 1;
        Ok(true)
    }

    /// Whether the set contains `key`
    pub fn contains(&self, key: &K) -> bool {
        if key.is_sentinel() {
            return self.has_sentinel_key;
        }
        self.find_slot(key).is_some()
    }

    /// Remove `key`; returns true if it was present
    pub fn remove(&mut self, key: &K) -> bool {
        if key.is_sentinel() {
            let present = self.has_sentinel_key;
            self.has_sentinel_key = false;
            return present;
        }
        match self.find_slot(key) {
            Some(slot) => {
                self.shift_conflicting_keys(slot);
                self.size -= 1;
                true
            }
            None => false,
        }
    }

    /// Number of elements, counting the sentinel-key element
    pub fn len(&self) -> usize {
        self.size + usize::from(self.has_sentinel_key)
    }

    /// Whether the set holds no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current slot-buffer length; always a power of two
    pub fn capacity(&self) -> usize {
        self.keys.len()
    }

    /// The configured load factor
    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    /// Current occupancy as a fraction of capacity
    pub fn current_load(&self) -> f64 {
        self.len() as f64 / self.keys.len() as f64
    }

    /// Drop every element, keeping the allocated buffer
    pub fn clear(&mut self) {
        self.size = 0;
        self.has_sentinel_key = false;
        self.keys.fill(K::SENTINEL);
    }

    /// Grow the buffer, if needed, so `expected_elements` fit without
    /// another resize
    pub fn ensure_capacity(&mut self, expected_elements: usize) -> Result<()> {
        if expected_elements > self.resize_at {
            let buffer_size = capacity::min_buffer_size(expected_elements, self.load_factor)?;
            if buffer_size > self.keys.len() {
                self.rehash_into_new_buffer(buffer_size);
            }
        }
        Ok(())
    }

    /// Iterate over elements in ascending slot order; the sentinel-key
    /// element, if present, is yielded last
    pub fn iter(&self) -> Iter<'_, K> {
        Iter {
            keys: &self.keys,
            slot: 0,
            sentinel_left: self.has_sentinel_key,
        }
    }

    /// Iterate using a cursor borrowed from `pool`, returned on drop
    pub fn pooled_iter<'a>(&'a self, pool: &'a mut IteratorPool<IterCursor>) -> PooledIter<'a, K> {
        let cursor = pool.borrow();
        PooledIter {
            keys: &self.keys,
            sentinel_present: self.has_sentinel_key,
            cursor: Some(cursor),
            pool,
        }
    }

    /// Keep only the elements for which `f` returns true
    ///
    /// Each removal performs the backward-shift repair, and a slot that
    /// receives a shifted-back element is re-examined before the scan
    /// advances.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K) -> bool,
    {
        if self.has_sentinel_key && !f(&K::SENTINEL) {
            self.has_sentinel_key = false;
        }
        let mut slot = 0;
        while slot < self.keys.len() {
            let key = self.keys[slot];
            if !key.is_sentinel() && !f(&key) {
                self.shift_conflicting_keys(slot);
                self.size -= 1;
                continue;
            }
            slot += 1;
        }
    }

    #[inline]
    fn mask(&self) -> usize {
        self.keys.len() - 1
    }

    #[inline]
    fn hash_slot(&self, key: &K) -> usize {
        self.mixer.mix(self.strategy.hash(key), self.seed) as usize & self.mask()
    }

    fn find_slot(&self, key: &K) -> Option<usize> {
        debug_assert!(!key.is_sentinel());
        let mask = self.mask();
        let mut slot = self.hash_slot(key);
        loop {
            let existing = &self.keys[slot];
            if existing.is_sentinel() {
                return None;
            }
            if self.strategy.equals(existing, key) {
                return Some(slot);
            }
            slot = (slot + 1) & mask;
        }
    }

    fn shift_conflicting_keys(&mut self, mut gap: usize) {
        let mask = self.mask();
        let mut distance = 0usize;
        loop {
            distance += 1;
            let slot = (gap + distance) & mask;
            let existing = self.keys[slot];
            if existing.is_sentinel() {
                break;
            }
            let ideal = self.hash_slot(&existing);
            if (slot.wrapping_sub(ideal) & mask) >= distance {
                self.keys[gap] = existing;
                gap = slot;
                distance = 0;
            }
        }
        self.keys[gap] = K::SENTINEL;
    }

    fn allocate_then_insert_then_rehash(&mut self, slot: usize, key: K) -> Result<()> {
        debug_assert_eq!(self.size, self.resize_at);
        debug_assert!(self.keys[slot].is_sentinel());

        let buffer_size = capacity::next_buffer_size(self.keys.len())?;
        self.keys[slot] = key;
        self.rehash_into_new_buffer(buffer_size);
        Ok(())
    }

    fn rehash_into_new_buffer(&mut self, buffer_size: usize) {
        log::trace!(
            "rehashing {} elements: {} -> {} slots",
            self.size,
            self.keys.len(),
            buffer_size
        );

        let old_keys = std::mem::replace(&mut self.keys, vec![K::SENTINEL; buffer_size]);
        let mask = buffer_size - 1;
        for key in old_keys.iter().filter(|k| !k.is_sentinel()) {
            let mut slot = self.hash_slot(key);
            while !self.keys[slot].is_sentinel() {
                slot = (slot + 1) & mask;
            }
            self.keys[slot] = *key;
        }
        self.resize_at = capacity::expand_at_count(buffer_size, self.load_factor);
    }
}

impl<K, S> Default for FlatHashSet<K, S>
where
    K: SentinelKey,
    S: HashStrategy<K> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a set's elements in ascending slot order
pub struct Iter<'a, K>
where
    K: SentinelKey,
{
    keys: &'a [K],
    slot: usize,
    sentinel_left: bool,
}

impl<K> Iterator for Iter<'_, K>
where
    K: SentinelKey,
{
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        while self.slot < self.keys.len() {
            let slot = self.slot;
            self.slot += 1;
            let key = self.keys[slot];
            if !key.is_sentinel() {
                return Some(key);
            }
        }
        if self.sentinel_left {
            self.sentinel_left = false;
            return Some(K::SENTINEL);
        }
        None
    }
}

/// Iterator over a set's elements using a pooled cursor
pub struct PooledIter<'a, K>
where
    K: SentinelKey,
{
    keys: &'a [K],
    sentinel_present: bool,
    cursor: Option<IterCursor>,
    pool: &'a mut IteratorPool<IterCursor>,
}

impl<K> Iterator for PooledIter<'_, K>
where
    K: SentinelKey,
{
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor.as_mut()?;
        while cursor.slot < self.keys.len() {
            let slot = cursor.slot;
            cursor.slot += 1;
            let key = self.keys[slot];
            if !key.is_sentinel() {
                return Some(key);
            }
        }
        if self.sentinel_present && !cursor.sentinel_emitted {
            cursor.sentinel_emitted = true;
            return Some(K::SENTINEL);
        }
        None
    }
}

impl<K> Drop for PooledIter<'_, K>
where
    K: SentinelKey,
{
    fn drop(&mut self) {
        if let Some(cursor) = self.cursor.take() {
            self.pool.release(cursor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_contains_remove() {
        let mut set = FlatHashSet::<i64>::new();
        assert!(set.insert(5).unwrap());
        assert!(!set.insert(5).unwrap());
        assert!(set.contains(&5));
        assert_eq!(set.len(), 1);

        assert!(set.remove(&5));
        assert!(!set.remove(&5));
        assert!(set.is_empty());
    }

    #[test]
    fn test_sentinel_element() {
        let mut set = FlatHashSet::<i32>::new();
        assert!(!set.contains(&0));

        assert!(set.insert(0).unwrap());
        assert!(!set.insert(0).unwrap());
        assert!(set.contains(&0));
        assert_eq!(set.len(), 1);

        assert!(set.remove(&0));
        assert!(!set.contains(&0));
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_growth_keeps_elements() {
        let mut set = FlatHashSet::<i64>::new();
        for i in 0..1000 {
            set.insert(i).unwrap();
        }
        assert_eq!(set.len(), 1000);
        assert!(set.capacity().is_power_of_two());
        for i in 0..1000 {
            assert!(set.contains(&i), "element {} lost", i);
        }
    }

    #[test]
    fn test_iteration() {
        let mut set = FlatHashSet::<i32>::new();
        set.insert(0).unwrap();
        for i in 1..=20 {
            set.insert(i).unwrap();
        }

        let mut seen: Vec<i32> = set.iter().collect();
        assert_eq!(seen.len(), 21);
        seen.sort_unstable();
        assert_eq!(seen, (0..=20).collect::<Vec<_>>());
        assert_eq!(set.iter().last(), Some(0));
    }

    #[test]
    fn test_retain() {
        let mut set = FlatHashSet::<i32>::new();
        for i in 0..=50 {
            set.insert(i).unwrap();
        }
        set.retain(|k| k % 5 == 0);
        assert_eq!(set.len(), 11);
        for i in 0..=50 {
            assert_eq!(set.contains(&i), i % 5 == 0);
        }
    }

    #[test]
    fn test_clear() {
        let mut set = FlatHashSet::<i32>::new();
        set.insert(0).unwrap();
        set.insert(1).unwrap();
        set.clear();
        assert!(set.is_empty());
        assert!(!set.contains(&0));
        assert!(!set.contains(&1));
    }

    #[test]
    fn test_pooled_iteration() {
        let mut pool = IteratorPool::new(crate::pool::IterPoolConfig::with_initial_size(1)).unwrap();
        let mut set = FlatHashSet::<i32>::new();
        for i in 0..10 {
            set.insert(i).unwrap();
        }
        let count = set.pooled_iter(&mut pool).count();
        assert_eq!(count, 10);
        assert_eq!(pool.stats().releases, 1);
    }

    #[test]
    fn test_invalid_load_factor_rejected() {
        let config = TableConfig {
            load_factor: 0.99,
            ..TableConfig::default()
        };
        assert!(FlatHashSet::<i32>::with_config(config).is_err());
    }

    #[test]
    fn test_with_capacity_no_early_resize() {
        let mut set = FlatHashSet::<i32>::with_capacity(100).unwrap();
        let capacity = set.capacity();
        for i in 1..=100 {
            set.insert(i).unwrap();
        }
        assert_eq!(set.capacity(), capacity);
    }
}
