//! Bounded pool of reusable iterator cursors
//!
//! Iteration over a table allocates a small cursor object; workloads that
//! open and close many iterators can recycle cursors through an
//! [`IteratorPool`] instead of hitting the allocator each time. The pool is
//! a bounded free list: it grows linearly in fixed-size increments while
//! demand rises, and once it holds a configured multiple of its initial
//! size it discards surplus batches instead of growing further, bounding
//! steady-state memory.
//!
//! Pool sizing is explicit configuration passed in wherever a pool is
//! created; there is no process-wide mutable default. Like every other part
//! of this crate, a pool is strictly single-threaded.

use crate::error::{FlatHashError, Result};

/// An object that can live in an [`IteratorPool`]
pub trait PoolItem: Default {
    /// Return the object to its freshly-constructed state
    fn reset(&mut self);
}

/// Sizing configuration for an [`IteratorPool`]
#[derive(Debug, Clone)]
pub struct IterPoolConfig {
    /// Number of cursors preallocated at construction
    pub initial_size: usize,
    /// Number of cursors added per growth step
    pub growth_increment: usize,
    /// Free-list bound as a multiple of `initial_size`; reaching it
    /// triggers a shrink instead of further growth
    pub shrink_multiple: usize,
}

impl Default for IterPoolConfig {
    fn default() -> Self {
        let cpus = num_cpus::get().max(1);
        Self {
            initial_size: cpus,
            growth_increment: cpus,
            shrink_multiple: 4,
        }
    }
}

impl IterPoolConfig {
    /// Configuration with an explicit initial size and default growth policy
    pub fn with_initial_size(initial_size: usize) -> Self {
        Self {
            initial_size,
            growth_increment: initial_size.max(1),
            shrink_multiple: 4,
        }
    }
}

/// Usage counters for a pool
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Cursors handed out
    pub borrows: u64,
    /// Cursors returned
    pub releases: u64,
    /// Cursors constructed (prefill plus growth)
    pub created: u64,
    /// Cursors dropped by shrink passes
    pub discarded: u64,
}

/// Bounded free list of reusable cursor objects
pub struct IteratorPool<T: PoolItem> {
    free: Vec<T>,
    config: IterPoolConfig,
    stats: PoolStats,
}

impl<T: PoolItem> IteratorPool<T> {
    /// Create a pool prefilled to the configured initial size
    pub fn new(config: IterPoolConfig) -> Result<Self> {
        if config.initial_size == 0 {
            return Err(FlatHashError::configuration(
                "pool initial_size must be positive",
            ));
        }
        if config.growth_increment == 0 {
            return Err(FlatHashError::configuration(
                "pool growth_increment must be positive",
            ));
        }
        if config.shrink_multiple < 2 {
            return Err(FlatHashError::configuration(
                "pool shrink_multiple must be at least 2",
            ));
        }

        let mut free = Vec::with_capacity(config.initial_size);
        free.resize_with(config.initial_size, T::default);
        let created = config.initial_size as u64;

        Ok(Self {
            free,
            config,
            stats: PoolStats {
                created,
                ..PoolStats::default()
            },
        })
    }

    /// Take a cursor from the pool, growing by one increment if empty
    ///
    /// The returned cursor is always reset to its initial state.
    pub fn borrow(&mut self) -> T {
        self.stats.borrows += 1;
        if self.free.is_empty() {
            self.free.resize_with(self.config.growth_increment, T::default);
            self.stats.created += self.config.growth_increment as u64;
        }
        let mut item = self.free.pop().unwrap_or_default();
        item.reset();
        item
    }

    /// Return a cursor to the pool
    ///
    /// Once the free list has reached `shrink_multiple * initial_size`
    /// cursors, a surplus batch is discarded instead, including the one
    /// being returned.
    pub fn release(&mut self, item: T) {
        self.stats.releases += 1;
        let limit = self.config.shrink_multiple * self.config.initial_size;
        if self.free.len() + 1 > limit {
            let target = limit.saturating_sub(self.config.growth_increment);
            let dropped = self.free.len() - target + 1;
            self.free.truncate(target);
            self.stats.discarded += dropped as u64;
            log::debug!(
                "iterator pool shrank to {} cursors ({} discarded)",
                target,
                dropped
            );
            return;
        }
        self.free.push(item);
    }

    /// Number of cursors currently available without growing
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Usage counters
    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }

    /// The sizing configuration this pool was built with
    pub fn config(&self) -> &IterPoolConfig {
        &self.config
    }
}

/// Reusable cursor state for pooled table iteration
#[derive(Debug, Clone, Default)]
pub struct IterCursor {
    pub(crate) slot: usize,
    pub(crate) sentinel_emitted: bool,
}

impl PoolItem for IterCursor {
    fn reset(&mut self) {
        self.slot = 0;
        self.sentinel_emitted = false;
    }
}
