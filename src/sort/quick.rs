//! Dual-pivot indirect quicksort
//!
//! In-place, non-stable sort of an index slice through a comparator over
//! positions. Because the comparator addresses fixed data positions and only
//! the index slice is permuted, pivot handles captured at partition start
//! stay valid across every swap.
//!
//! Windows at or below [`INSERTION_SORT_THRESHOLD`] elements use insertion
//! sort. Larger windows take five equally spaced samples, order them with a
//! fixed 9-comparison network and use the 2nd and 4th as pivots
//! `p1 <= p2`, partitioning into `[< p1 | p1..p2 | > p2]` in one pass with
//! two moving boundaries. Equal pivots fall back to a single-pivot
//! three-way partition. A middle region spanning more than 4/7 of the
//! window gets a compaction pass that collapses runs equal to either pivot
//! before the middle recursion.

use std::cmp::Ordering;

/// Windows at or below this length sort by insertion
const INSERTION_SORT_THRESHOLD: usize = 17;

/// Middle regions larger than `4/7` of the window trigger a compaction pass
const MIDDLE_FRACTION_NUM: usize = 4;
const MIDDLE_FRACTION_DEN: usize = 7;

/// Sort an index slice in place by `cmp`
///
/// Not stable: equal-comparing positions may be reordered.
///
/// # Examples
///
/// ```rust
/// use flathash::sort::quicksort;
///
/// let data = [40u32, 10, 30, 20];
/// let mut order: Vec<u32> = (0..data.len() as u32).collect();
/// quicksort(&mut order, |a, b| data[a as usize].cmp(&data[b as usize]));
/// assert_eq!(order, vec![1, 3, 2, 0]);
/// ```
pub fn quicksort<F>(order: &mut [u32], mut cmp: F)
where
    F: FnMut(u32, u32) -> Ordering,
{
    if order.len() > 1 {
        sort_window(order, 0, order.len() - 1, &mut cmp);
    }
}

/// Sort the window `order[start..start + length]` in place by `cmp`;
/// elements outside the window are never touched
pub fn quicksort_range<F>(order: &mut [u32], start: usize, length: usize, cmp: F)
where
    F: FnMut(u32, u32) -> Ordering,
{
    quicksort(&mut order[start..start + length], cmp);
}

/// Sort positions `0..length` by `cmp`, returning the order array
pub fn quicksort_order<F>(length: usize, cmp: F) -> Vec<u32>
where
    F: FnMut(u32, u32) -> Ordering,
{
    quicksort_order_range(0, length, cmp)
}

/// Sort the position window `start..start + length` by `cmp`, returning
/// the order array
pub fn quicksort_order_range<F>(start: u32, length: usize, mut cmp: F) -> Vec<u32>
where
    F: FnMut(u32, u32) -> Ordering,
{
    debug_assert!(start as u64 + length as u64 <= u32::MAX as u64 + 1);
    let mut order: Vec<u32> = (start..start + length as u32).collect();
    if length > 1 {
        sort_window(&mut order, 0, length - 1, &mut cmp);
    }
    order
}

/// Recursive sort of the inclusive window `[lo, hi]`
fn sort_window<F>(a: &mut [u32], lo: usize, hi: usize, cmp: &mut F)
where
    F: FnMut(u32, u32) -> Ordering,
{
    let len = hi - lo + 1;
    if len <= INSERTION_SORT_THRESHOLD {
        insertion_sort(a, lo, hi, cmp);
        return;
    }

    // five equally spaced samples, ordered by a fixed 9-comparison network
    let sixth = len / 6;
    let m1 = lo + sixth;
    let m2 = m1 + sixth;
    let m3 = m2 + sixth;
    let m4 = m3 + sixth;
    let m5 = m4 + sixth;
    sort_samples(a, [m1, m2, m3, m4, m5], cmp);

    let p1 = a[m2];
    let p2 = a[m4];

    if cmp(p1, p2) == Ordering::Equal {
        sort_equal_pivots(a, lo, hi, p1, cmp);
        return;
    }

    // pivots to the window ends, then one partitioning pass
    a.swap(m2, lo);
    a.swap(m4, hi);

    let mut less = lo + 1;
    let mut great = hi - 1;
    let mut k = less;
    while k <= great {
        if cmp(a[k], p1) == Ordering::Less {
            a.swap(k, less);
            less += 1;
        } else if cmp(a[k], p2) == Ordering::Greater {
            while k < great && cmp(a[great], p2) == Ordering::Greater {
                great -= 1;
            }
            a.swap(k, great);
            great -= 1;
            if cmp(a[k], p1) == Ordering::Less {
                a.swap(k, less);
                less += 1;
            }
        }
        k += 1;
    }

    // pivots into their final slots
    less -= 1;
    great += 1;
    a.swap(lo, less);
    a.swap(hi, great);

    if less > lo {
        sort_window(a, lo, less - 1, cmp);
    }
    if great < hi {
        sort_window(a, great + 1, hi, cmp);
    }

    // middle region [less + 1, great - 1] holds p1..p2 values
    if less + 1 < great {
        let mut lt = less + 1;
        let mut gt = great - 1;
        if gt - lt + 1 > len / MIDDLE_FRACTION_DEN * MIDDLE_FRACTION_NUM {
            compact_pivot_runs(a, &mut lt, &mut gt, p1, p2, cmp);
        }
        if lt < gt {
            sort_window(a, lt, gt, cmp);
        }
    }
}

/// Collapse runs equal to either pivot toward the middle region's edges,
/// shrinking `[lt, gt]` to the positions that still need sorting
fn compact_pivot_runs<F>(
    a: &mut [u32],
    lt: &mut usize,
    gt: &mut usize,
    p1: u32,
    p2: u32,
    cmp: &mut F,
) where
    F: FnMut(u32, u32) -> Ordering,
{
    while *lt <= *gt && cmp(a[*lt], p1) == Ordering::Equal {
        *lt += 1;
    }
    while *gt > *lt && cmp(a[*gt], p2) == Ordering::Equal {
        *gt -= 1;
    }
    let mut k = *lt;
    while k <= *gt {
        if cmp(a[k], p1) == Ordering::Equal {
            a.swap(k, *lt);
            *lt += 1;
            k += 1;
        } else if cmp(a[k], p2) == Ordering::Equal {
            // the element swapped in from the far edge is unexamined
            a.swap(k, *gt);
            if *gt == 0 {
                break;
            }
            *gt -= 1;
        } else {
            k += 1;
        }
    }
}

/// Single-pivot three-way partition for the equal-pivots case:
/// `[< p | == p | > p]`, recursing into the outer regions only
fn sort_equal_pivots<F>(a: &mut [u32], lo: usize, hi: usize, pivot: u32, cmp: &mut F)
where
    F: FnMut(u32, u32) -> Ordering,
{
    let mut lt = lo;
    let mut i = lo;
    let mut gt = hi;
    while i <= gt {
        match cmp(a[i], pivot) {
            Ordering::Less => {
                a.swap(lt, i);
                lt += 1;
                i += 1;
            }
            Ordering::Greater => {
                a.swap(i, gt);
                if gt == 0 {
                    break;
                }
                gt -= 1;
            }
            Ordering::Equal => i += 1,
        }
    }
    if lt > lo {
        sort_window(a, lo, lt - 1, cmp);
    }
    if gt < hi {
        sort_window(a, gt + 1, hi, cmp);
    }
}

/// Order five sampled slots with 9 compare-exchanges
fn sort_samples<F>(a: &mut [u32], m: [usize; 5], cmp: &mut F)
where
    F: FnMut(u32, u32) -> Ordering,
{
    let [m1, m2, m3, m4, m5] = m;
    compare_exchange(a, m1, m2, cmp);
    compare_exchange(a, m4, m5, cmp);
    compare_exchange(a, m3, m5, cmp);
    compare_exchange(a, m3, m4, cmp);
    compare_exchange(a, m1, m4, cmp);
    compare_exchange(a, m1, m3, cmp);
    compare_exchange(a, m2, m5, cmp);
    compare_exchange(a, m2, m4, cmp);
    compare_exchange(a, m2, m3, cmp);
}

#[inline]
fn compare_exchange<F>(a: &mut [u32], i: usize, j: usize, cmp: &mut F)
where
    F: FnMut(u32, u32) -> Ordering,
{
    if cmp(a[i], a[j]) == Ordering::Greater {
        a.swap(i, j);
    }
}

fn insertion_sort<F>(a: &mut [u32], lo: usize, hi: usize, cmp: &mut F)
where
    F: FnMut(u32, u32) -> Ordering,
{
    for i in lo + 1..=hi {
        let pos = a[i];
        let mut j = i;
        while j > lo && cmp(a[j - 1], pos) == Ordering::Greater {
            a[j] = a[j - 1];
            j -= 1;
        }
        a[j] = pos;
    }
}
