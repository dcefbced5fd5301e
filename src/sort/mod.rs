//! Index-based sorting engine
//!
//! Both routines here operate only through a comparator over integer
//! positions and never touch the keyed data itself, so one algorithm sorts
//! primitive buffers, parallel arrays or index-only projections alike:
//! - [`mergesort`] / [`mergesort_range`]: stable top-down merge sort
//!   producing an order array
//! - [`quicksort`] / [`quicksort_range`]: non-stable dual-pivot quicksort
//!   over a caller-owned index slice, with order-array producers
//!   [`quicksort_order`] / [`quicksort_order_range`]
//!
//! The windowed forms sort `(start, length)` sub-ranges without disturbing
//! out-of-window positions.

mod merge;
mod quick;

pub use merge::{mergesort, mergesort_range};
pub use quick::{quicksort, quicksort_order, quicksort_order_range, quicksort_range};

use std::cmp::Ordering;

/// Build an index comparator from a data slice
///
/// # Examples
///
/// ```rust
/// use flathash::sort::{comparing, mergesort};
///
/// let data = [3u64, 1, 2];
/// let order = mergesort(data.len(), comparing(&data));
/// assert_eq!(order, vec![1, 2, 0]);
/// ```
pub fn comparing<T: Ord>(data: &[T]) -> impl FnMut(u32, u32) -> Ordering + '_ {
    move |a, b| data[a as usize].cmp(&data[b as usize])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_exports() {
        let data = [2i32, 0, 1];

        let stable = mergesort(data.len(), comparing(&data));
        assert_eq!(stable, vec![1, 2, 0]);

        let quick = quicksort_order(data.len(), comparing(&data));
        assert_eq!(quick, vec![1, 2, 0]);

        let mut order: Vec<u32> = (0..3).collect();
        quicksort(&mut order, comparing(&data));
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_both_engines_agree_on_distinct_keys() {
        let data: Vec<i32> = vec![9, -3, 14, 0, 7, -8, 22, 5];
        assert_eq!(
            mergesort(data.len(), comparing(&data)),
            quicksort_order(data.len(), comparing(&data))
        );
    }
}
