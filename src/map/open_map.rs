//! FlatHashMap - open-addressing hash map with backward-shift deletion
//!
//! All entries live directly in one flat slot buffer; collisions resolve by
//! linear probing and deletions repair the probe sequence by shifting later
//! cluster members backward, so the table carries no tombstone markers and
//! lookups never degrade after heavy churn.
//!
//! Slot emptiness is encoded by the key type's [`SentinelKey`] marker. A
//! genuine key equal to the marker is held out of band: a flag plus one
//! dedicated value slot at the tail of the value buffer.
//!
//! # Examples
//!
//! ```rust
//! use flathash::FlatHashMap;
//!
//! let mut map = FlatHashMap::<i64, u32>::new();
//! map.insert(7, 700).unwrap();
//! assert_eq!(map.get(&7), Some(&700));
//!
//! // zero is an ordinary key from the caller's perspective
//! map.insert(0, 1).unwrap();
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.remove(&0), Some(1));
//! ```

use std::mem;

use crate::error::Result;
use crate::hash::{DefaultStrategy, HashStrategy, Mixer};
use crate::map::capacity;
use crate::map::sentinel::SentinelKey;
use crate::pool::{IterCursor, IteratorPool};

/// Construction parameters shared by [`FlatHashMap`] and
/// [`crate::FlatHashSet`]
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Number of elements the table should hold before its first resize
    pub expected_elements: usize,
    /// Occupancy fraction that triggers growth, in `[0.10, 0.90]`
    pub load_factor: f64,
    /// Mixing function applied to raw strategy hashes
    pub mixer: Mixer,
    /// Seed folded into every mix, for callers wanting distinct probe
    /// orders across tables
    pub seed: u32,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            expected_elements: capacity::DEFAULT_EXPECTED_ELEMENTS,
            load_factor: capacity::DEFAULT_LOAD_FACTOR,
            mixer: Mixer::default(),
            seed: 0,
        }
    }
}

impl TableConfig {
    /// Configuration sized for `expected_elements` at the default load factor
    pub fn with_expected_elements(expected_elements: usize) -> Self {
        Self {
            expected_elements,
            ..Self::default()
        }
    }

    /// Dense configuration: load factor 0.90, trades probe length for memory
    pub fn packed() -> Self {
        Self {
            load_factor: capacity::MAX_LOAD_FACTOR,
            ..Self::default()
        }
    }

    /// Sparse configuration: load factor 0.50, trades memory for short probes
    pub fn sparse() -> Self {
        Self {
            load_factor: 0.50,
            ..Self::default()
        }
    }
}

/// Open-addressing hash map over sentinel-capable keys
///
/// Generic over key type `K`, value type `V` and hashing strategy `S`. The
/// strategy is immutable for the table's lifetime; the table never calls the
/// key's own equality directly.
#[derive(Debug)]
pub struct FlatHashMap<K, V, S = DefaultStrategy>
where
    K: SentinelKey,
    S: HashStrategy<K>,
{
    /// Slot buffer; the sentinel marker denotes an unoccupied slot
    keys: Vec<K>,
    /// Parallel value buffer with one extra tail slot for the sentinel key
    values: Vec<V>,
    /// Occupied main-buffer slots, excluding the out-of-band sentinel entry
    size: usize,
    has_sentinel_key: bool,
    resize_at: usize,
    load_factor: f64,
    mixer: Mixer,
    seed: u32,
    strategy: S,
}

impl<K, V, S> FlatHashMap<K, V, S>
where
    K: SentinelKey,
    V: Default,
    S: HashStrategy<K> + Default,
{
    /// Create an empty map with default configuration
    pub fn new() -> Self {
        Self::from_validated(capacity::MIN_CAPACITY, &TableConfig::default(), S::default())
    }

    /// Create a map sized for `expected_elements` at the default load factor
    pub fn with_capacity(expected_elements: usize) -> Result<Self> {
        Self::with_config(TableConfig::with_expected_elements(expected_elements))
    }

    /// Create a map from a full configuration
    ///
    /// An out-of-range load factor is a configuration error, reported before
    /// any buffer allocation.
    pub fn with_config(config: TableConfig) -> Result<Self> {
        Self::with_strategy(config, S::default())
    }
}

impl<K, V, S> FlatHashMap<K, V, S>
where
    K: SentinelKey,
    V: Default,
    S: HashStrategy<K>,
{
    /// Create a map with an explicit hashing strategy
    pub fn with_strategy(config: TableConfig, strategy: S) -> Result<Self> {
        let buffer_size = capacity::min_buffer_size(config.expected_elements, config.load_factor)?;
        Ok(Self::from_validated(buffer_size, &config, strategy))
    }

    fn from_validated(buffer_size: usize, config: &TableConfig, strategy: S) -> Self {
        let mut values = Vec::with_capacity(buffer_size + 1);
        values.resize_with(buffer_size + 1, V::default);
        Self {
            keys: vec![K::SENTINEL; buffer_size],
            values,
            size: 0,
            has_sentinel_key: false,
            resize_at: capacity::expand_at_count(buffer_size, config.load_factor),
            load_factor: config.load_factor,
            mixer: config.mixer,
            seed: config.seed,
            strategy,
        }
    }

    /// Insert a key-value pair, returning the previous value if the key was
    /// present
    ///
    /// Fails only when a required resize would exceed the maximum buffer
    /// length; the table is left untouched in that case.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>> {
        if key.is_sentinel() {
            let tail = self.keys.len();
            if self.has_sentinel_key {
                return Ok(Some(mem::replace(&mut self.values[tail], value)));
            }
            self.values[tail] = value;
            self.has_sentinel_key = true;
            return Ok(None);
        }

        let mask = self.mask();
        let mut slot = self.hash_slot(&key);
        loop {
            let existing = self.keys[slot];
            if existing.is_sentinel() {
                break;
            }
            if self.strategy.equals(&existing, &key) {
                return Ok(Some(mem::replace(&mut self.values[slot], value)));
            }
            slot = (slot + 1) & mask;
        }

        if self.size == self.resize_at {
            self.allocate_then_insert_then_rehash(slot, key, value)?;
        } else {
            self.keys[slot] = key;
            self.values[slot] = value;
        }
        self.size += 1;
        Ok(None)
    }

    /// Get a reference to the value stored for `key`
    pub fn get(&self, key: &K) -> Option<&V> {
        if key.is_sentinel() {
            return if self.has_sentinel_key {
                Some(&self.values[self.keys.len()])
            } else {
                None
            };
        }
        let slot = self.find_slot(key)?;
        Some(&self.values[slot])
    }

    /// Get a mutable reference to the value stored for `key`
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        if key.is_sentinel() {
            if self.has_sentinel_key {
                let tail = self.keys.len();
                return Some(&mut self.values[tail]);
            }
            return None;
        }
        let slot = self.find_slot(key)?;
        Some(&mut self.values[slot])
    }

    /// Whether the map contains `key`
    pub fn contains_key(&self, key: &K) -> bool {
        if key.is_sentinel() {
            return self.has_sentinel_key;
        }
        self.find_slot(key).is_some()
    }

    /// Remove `key`, returning its value if it was present
    ///
    /// Repairs the probe sequence by shifting conflicting entries backward
    /// into the vacated slot; no tombstone is left behind.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        if key.is_sentinel() {
            if !self.has_sentinel_key {
                return None;
            }
            self.has_sentinel_key = false;
            let tail = self.keys.len();
            return Some(mem::take(&mut self.values[tail]));
        }
        let slot = self.find_slot(key)?;
        let value = mem::take(&mut self.values[slot]);
        self.shift_conflicting_keys(slot);
        self.size -= 1;
        Some(value)
    }

    /// Number of entries, counting the sentinel-key entry
    pub fn len(&self) -> usize {
        self.size + usize::from(self.has_sentinel_key)
    }

    /// Whether the map holds no entries
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

    /// Drop every entry, keeping the allocated buffers
    pub fn clear(&mut self) {
        self.size = 0;
        self.has_sentinel_key = false;
        self.keys.fill(K::SENTINEL);
        for value in self.values.iter_mut() {
            *value = V::default();
        }
    }

    /// Grow the buffers, if needed, so `expected_elements` entries fit
    /// without another resize
    pub fn ensure_capacity(&mut self, expected_elements: usize) -> Result<()> {
        if expected_elements > self.resize_at {
            let buffer_size = capacity::min_buffer_size(expected_elements, self.load_factor)?;
            if buffer_size > self.keys.len() {
                self.rehash_into_new_buffers(buffer_size);
            }
        }
        Ok(())
    }

    /// Iterate over entries in ascending slot order; the sentinel-key entry,
    /// if present, is yielded last
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            keys: &self.keys,
            values: &self.values,
            slot: 0,
            sentinel_left: self.has_sentinel_key,
        }
    }

    /// Iterate using a cursor borrowed from `pool`, returned on drop
    pub fn pooled_iter<'a>(
        &'a self,
        pool: &'a mut IteratorPool<IterCursor>,
    ) -> PooledIter<'a, K, V> {
        let cursor = pool.borrow();
        PooledIter {
            keys: &self.keys,
            values: &self.values,
            sentinel_present: self.has_sentinel_key,
            cursor: Some(cursor),
            pool,
        }
    }

    /// Keep only the entries for which `f` returns true
    ///
    /// This is the iteration-scoped removal operation: each removal performs
    /// the same backward-shift repair as [`FlatHashMap::remove`], and a slot
    /// that receives a shifted-back entry is re-examined before the scan
    /// advances.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        if self.has_sentinel_key {
            let tail = self.keys.len();
            if !f(&K::SENTINEL, &self.values[tail]) {
                self.has_sentinel_key = false;
                self.values[tail] = V::default();
            }
        }
        let mut slot = 0;
        while slot < self.keys.len() {
            let key = self.keys[slot];
            if !key.is_sentinel() && !f(&key, &self.values[slot]) {
                self.values[slot] = V::default();
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

    /// Probe the main buffer for a non-sentinel key; `None` means absent.
    /// Terminates because at least one slot is always empty.
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

    /// Close the gap left by a removed entry
    ///
    /// Walks forward from the gap; any entry whose ideal slot lies on the
    /// far side of the gap (probe-order distance to its ideal slot spans the
    /// gap) is pulled back into it and the walk resumes from the slot it
    /// vacated. The first empty slot ends the walk.
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
                self.values[gap] = mem::take(&mut self.values[slot]);
                gap = slot;
                distance = 0;
            }
        }
        self.keys[gap] = K::SENTINEL;
    }

    /// Grow one step and re-insert everything, the pending entry included
    ///
    /// New buffers are allocated before anything is written, so a
    /// capacity-exceeded failure leaves the table exactly as it was; the
    /// pending entry first lands in the old buffer's free slot and is
    /// rehashed along with the rest.
    fn allocate_then_insert_then_rehash(&mut self, slot: usize, key: K, value: V) -> Result<()> {
        debug_assert_eq!(self.size, self.resize_at);
        debug_assert!(self.keys[slot].is_sentinel());

        let buffer_size = capacity::next_buffer_size(self.keys.len())?;
        self.keys[slot] = key;
        self.values[slot] = value;
        self.rehash_into_new_buffers(buffer_size);
        Ok(())
    }

    fn rehash_into_new_buffers(&mut self, buffer_size: usize) {
        log::trace!(
            "rehashing {} entries: {} -> {} slots",
            self.size,
            self.keys.len(),
            buffer_size
        );

        let mut new_values = Vec::with_capacity(buffer_size + 1);
        new_values.resize_with(buffer_size + 1, V::default);
        let old_keys = mem::replace(&mut self.keys, vec![K::SENTINEL; buffer_size]);
        let mut old_values = mem::replace(&mut self.values, new_values);

        if self.has_sentinel_key {
            self.values[buffer_size] = mem::take(&mut old_values[old_keys.len()]);
        }

        let mask = buffer_size - 1;
        for (i, key) in old_keys.iter().enumerate() {
            if key.is_sentinel() {
                continue;
            }
            let mut slot = self.hash_slot(key);
            while !self.keys[slot].is_sentinel() {
                slot = (slot + 1) & mask;
            }
            self.keys[slot] = *key;
            self.values[slot] = mem::take(&mut old_values[i]);
        }

        self.resize_at = capacity::expand_at_count(buffer_size, self.load_factor);
    }
}

impl<K, V, S> Default for FlatHashMap<K, V, S>
where
    K: SentinelKey,
    V: Default,
    S: HashStrategy<K> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a map's entries in ascending slot order
pub struct Iter<'a, K, V>
where
    K: SentinelKey,
{
    keys: &'a [K],
    values: &'a [V],
    slot: usize,
    sentinel_left: bool,
}

impl<'a, K, V> Iterator for Iter<'a, K, V>
where
    K: SentinelKey,
{
    type Item = (K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while self.slot < self.keys.len() {
            let slot = self.slot;
            self.slot += 1;
            let key = self.keys[slot];
            if !key.is_sentinel() {
                return Some((key, &self.values[slot]));
            }
        }
        if self.sentinel_left {
            self.sentinel_left = false;
            return Some((K::SENTINEL, &self.values[self.keys.len()]));
        }
        None
    }
}

/// Iterator over a map's entries using a pooled cursor
///
/// The cursor is released back to the pool when the iterator drops.
pub struct PooledIter<'a, K, V>
where
    K: SentinelKey,
{
    keys: &'a [K],
    values: &'a [V],
    sentinel_present: bool,
    cursor: Option<IterCursor>,
    pool: &'a mut IteratorPool<IterCursor>,
}

impl<'a, K, V> Iterator for PooledIter<'a, K, V>
where
    K: SentinelKey,
{
    type Item = (K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor.as_mut()?;
        while cursor.slot < self.keys.len() {
            let slot = cursor.slot;
            cursor.slot += 1;
            let key = self.keys[slot];
            if !key.is_sentinel() {
                return Some((key, &self.values[slot]));
            }
        }
        if self.sentinel_present && !cursor.sentinel_emitted {
            cursor.sentinel_emitted = true;
            return Some((K::SENTINEL, &self.values[self.keys.len()]));
        }
        None
    }
}

impl<K, V> Drop for PooledIter<'_, K, V>
where
    K: SentinelKey,
{
    fn drop(&mut self) {
        if let Some(cursor) = self.cursor.take() {
            self.pool.release(cursor);
        }
    }
}
