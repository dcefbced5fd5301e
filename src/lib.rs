//! # Flathash: Open-Addressing Collections and Indirect Sorting
//!
//! This crate provides a performance-oriented collection core: resizable
//! open-addressing hash maps and sets over sentinel-capable keys, and an
//! index-based sorting engine driven by comparators over positions.
//!
//! ## Key Features
//!
//! - **Flat storage**: all entries live in one slot buffer; collisions
//!   resolve by linear probing over a power-of-two capacity
//! - **No tombstones**: deletions repair the probe sequence by backward
//!   shifting, so lookups never degrade under churn
//! - **Sentinel empty markers**: slot emptiness is encoded in the key data;
//!   a genuine sentinel-equal key is handled out of band and invisible to
//!   callers
//! - **Pluggable hashing strategies**: natural, avalanche-mixed and
//!   reference-identity hashing behind one capability trait
//! - **Bit mixers**: phi and Murmur avalanche conditioning against weak or
//!   sequential hash codes, selectable per table
//! - **Indirect sorting**: stable merge sort and dual-pivot quicksort that
//!   permute position arrays and never move the underlying data
//! - **Pooled iteration cursors**: a bounded free list recycles iterator
//!   state for open/close-heavy workloads
//!
//! ## Quick Start
//!
//! ```rust
//! use flathash::{FlatHashMap, FlatHashSet, sort};
//!
//! // Open-addressing map over primitive keys
//! let mut map = FlatHashMap::<i64, u32>::new();
//! map.insert(42, 1).unwrap();
//! assert_eq!(map.get(&42), Some(&1));
//!
//! // Zero is a legal key even though it marks empty slots internally
//! map.insert(0, 7).unwrap();
//! assert_eq!(map.len(), 2);
//!
//! // Set variant shares the same engine
//! let mut set = FlatHashSet::<i32>::new();
//! assert!(set.insert(3).unwrap());
//!
//! // Indirect sorting: a permutation of positions, the data never moves
//! let data = [30u32, 10, 20];
//! let order = sort::mergesort(data.len(), sort::comparing(&data));
//! assert_eq!(order, vec![1, 2, 0]);
//! ```
//!
//! Everything in this crate is strictly single-threaded: no internal
//! synchronization, no atomics. Callers needing concurrent access supply
//! external mutual exclusion.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod hash;
pub mod map;
pub mod pool;
pub mod sort;

// Re-export core types
pub use error::{FlatHashError, Result};
pub use hash::{DefaultStrategy, HashStrategy, IdentityStrategy, MixedStrategy, Mixer};
pub use map::{FlatHashMap, FlatHashSet, SentinelKey, TableConfig};
pub use pool::{IterCursor, IterPoolConfig, IteratorPool, PoolItem, PoolStats};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library (currently a logging hook only)
pub fn init() {
    log::debug!("Initializing flathash v{}", VERSION);
}
