//! Pluggable hashing strategies
//!
//! Tables never call a key's own equality or hash directly; every comparison
//! and hash goes through a [`HashStrategy`], so identity-based or custom
//! bucketing behavior can be swapped in without touching the table engine.
//!
//! Three interchangeable implementations are provided:
//! - [`DefaultStrategy`]: the key's natural `Hash`/`Eq` through a fixed-seed
//!   AHash state, folded to 32 bits
//! - [`MixedStrategy`]: the default hash passed through the Murmur avalanche
//!   mix, for keys whose natural hash codes are weak
//! - [`IdentityStrategy`]: reference identity for `Rc` and raw-pointer keys

use std::hash::Hash;
use std::rc::Rc;

use crate::hash::bit_mixer;

// Fixed AHash seeds keep the default strategy deterministic across runs.
const SEED_A: u64 = 0x243f_6a88_85a3_08d3;
const SEED_B: u64 = 0x1319_8a2e_0370_7344;
const SEED_C: u64 = 0xa409_3822_299f_31d0;
const SEED_D: u64 = 0x082e_fa98_ec4e_6c89;

/// A hash/equality pair over keys of type `K`
///
/// Implementations must keep the two functions consistent:
/// `equals(a, b)` implies `hash(a) == hash(b)`.
pub trait HashStrategy<K: ?Sized> {
    /// Raw 32-bit hash of a key; the table applies its own mixer on top
    fn hash(&self, key: &K) -> u32;

    /// Whether two keys are the same key under this strategy
    fn equals(&self, a: &K, b: &K) -> bool;
}

/// Natural hashing: the key's own `Hash` and `Eq` implementations
#[derive(Clone)]
pub struct DefaultStrategy {
    state: ahash::RandomState,
}

impl Default for DefaultStrategy {
    fn default() -> Self {
        Self {
            state: ahash::RandomState::with_seeds(SEED_A, SEED_B, SEED_C, SEED_D),
        }
    }
}

impl std::fmt::Debug for DefaultStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DefaultStrategy")
    }
}

impl<K: Hash + Eq + ?Sized> HashStrategy<K> for DefaultStrategy {
    #[inline]
    fn hash(&self, key: &K) -> u32 {
        bit_mixer::fold64(self.state.hash_one(key))
    }

    #[inline]
    fn equals(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// Natural hashing with a Murmur avalanche pass on top
///
/// The standard choice when key hash codes may be sequential or otherwise
/// poorly distributed.
#[derive(Clone, Debug, Default)]
pub struct MixedStrategy {
    inner: DefaultStrategy,
}

impl<K: Hash + Eq + ?Sized> HashStrategy<K> for MixedStrategy {
    #[inline]
    fn hash(&self, key: &K) -> u32 {
        bit_mixer::mix32(self.inner.hash(key))
    }

    #[inline]
    fn equals(&self, a: &K, b: &K) -> bool {
        a == b
    }
}

/// Reference identity: keys hash by allocation address and compare by
/// pointer equality, so two structurally equal keys are distinct entries
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityStrategy;

impl<T> HashStrategy<Rc<T>> for IdentityStrategy {
    #[inline]
    fn hash(&self, key: &Rc<T>) -> u32 {
        bit_mixer::fold64(Rc::as_ptr(key) as usize as u64)
    }

    #[inline]
    fn equals(&self, a: &Rc<T>, b: &Rc<T>) -> bool {
        Rc::ptr_eq(a, b)
    }
}

impl<T> HashStrategy<*const T> for IdentityStrategy {
    #[inline]
    fn hash(&self, key: &*const T) -> u32 {
        bit_mixer::fold64(*key as usize as u64)
    }

    #[inline]
    fn equals(&self, a: &*const T, b: &*const T) -> bool {
        std::ptr::eq(*a, *b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_strategy_deterministic() {
        let s = DefaultStrategy::default();
        assert_eq!(HashStrategy::<i64>::hash(&s, &42), HashStrategy::<i64>::hash(&s, &42));

        let other = DefaultStrategy::default();
        assert_eq!(
            HashStrategy::<i64>::hash(&s, &42),
            HashStrategy::<i64>::hash(&other, &42)
        );
    }

    #[test]
    fn test_default_strategy_consistency() {
        // equals(a, b) implies hash(a) == hash(b)
        let s = DefaultStrategy::default();
        for k in [0i64, 1, -1, i64::MAX, i64::MIN] {
            let copy = k;
            assert!(s.equals(&k, &copy));
            assert_eq!(s.hash(&k), s.hash(&copy));
        }
    }

    #[test]
    fn test_mixed_strategy_differs_from_default() {
        let plain = DefaultStrategy::default();
        let mixed = MixedStrategy::default();
        assert_ne!(
            HashStrategy::<i64>::hash(&plain, &7),
            HashStrategy::<i64>::hash(&mixed, &7)
        );
        assert!(mixed.equals(&7i64, &7i64));
    }

    #[test]
    fn test_identity_strategy_distinguishes_equal_content() {
        let a = Rc::new(5i32);
        let b = Rc::new(5i32);
        let s = IdentityStrategy;

        assert!(!s.equals(&a, &b));
        assert!(s.equals(&a, &Rc::clone(&a)));
        assert_eq!(s.hash(&a), s.hash(&Rc::clone(&a)));
    }

    #[test]
    fn test_identity_strategy_raw_pointers() {
        let x = 1i32;
        let y = 1i32;
        let px: *const i32 = &x;
        let py: *const i32 = &y;
        let s = IdentityStrategy;

        assert!(s.equals(&px, &px));
        assert!(!s.equals(&px, &py));
        assert_eq!(s.hash(&px), s.hash(&px));
    }
}
