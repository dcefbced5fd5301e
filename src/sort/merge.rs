//! Stable indirect merge sort
//!
//! Produces an order array: a permutation of positions sorted by a
//! comparator over those positions. The underlying data never moves, which
//! lets the same routine order primitive buffers, parallel arrays or any
//! projection the comparator can address.
//!
//! Top-down recursive merge with ping-pong buffers. Sub-ranges at or below
//! [`INSERTION_SORT_THRESHOLD`] elements use insertion sort, and a merge
//! step whose halves are already in order degenerates to a single copy, so
//! presorted and nearly-sorted inputs complete in linear passes. Equal
//! elements keep their original relative position order.

use std::cmp::Ordering;

/// Sub-ranges at or below this length sort by insertion instead of merging
const INSERTION_SORT_THRESHOLD: usize = 30;

/// Stable sort of positions `0..length` by `cmp`, returning the order array
///
/// # Examples
///
/// ```rust
/// use flathash::sort::mergesort;
///
/// let data = [5u32, 3, 3, 1, 2];
/// let order = mergesort(data.len(), |a, b| data[a as usize].cmp(&data[b as usize]));
/// // equal elements (the two 3s) keep ascending position order
/// assert_eq!(order, vec![3, 4, 1, 2, 0]);
/// ```
pub fn mergesort<F>(length: usize, cmp: F) -> Vec<u32>
where
    F: FnMut(u32, u32) -> Ordering,
{
    mergesort_range(0, length, cmp)
}

/// Stable sort of the position window `start..start + length`, returning
/// the order array; positions outside the window are never compared
pub fn mergesort_range<F>(start: u32, length: usize, mut cmp: F) -> Vec<u32>
where
    F: FnMut(u32, u32) -> Ordering,
{
    debug_assert!(start as u64 + length as u64 <= u32::MAX as u64 + 1);
    let mut src: Vec<u32> = (start..start + length as u32).collect();
    if length > 1 {
        let mut dst = src.clone();
        top_down_merge_sort(&mut src, &mut dst, 0, length, &mut cmp);
        dst
    } else {
        src
    }
}

/// Recursive step: sort `[start, end)` of `to`, using `from` as scratch.
/// Both buffers hold identical content for the range on entry.
fn top_down_merge_sort<F>(from: &mut [u32], to: &mut [u32], start: usize, end: usize, cmp: &mut F)
where
    F: FnMut(u32, u32) -> Ordering,
{
    if end - start <= INSERTION_SORT_THRESHOLD {
        insertion_sort(to, start, end, cmp);
        return;
    }

    let mid = (start + end) / 2;
    top_down_merge_sort(to, from, start, mid, cmp);
    top_down_merge_sort(to, from, mid, end, cmp);

    // halves already in order: one copy instead of a merge
    if cmp(from[mid - 1], from[mid]) != Ordering::Greater {
        to[start..end].copy_from_slice(&from[start..end]);
        return;
    }

    let (mut left, mut right) = (start, mid);
    for i in start..end {
        if right == end || (left < mid && cmp(from[left], from[right]) != Ordering::Greater) {
            to[i] = from[left];
            left += 1;
        } else {
            to[i] = from[right];
            right += 1;
        }
    }
}

fn insertion_sort<F>(order: &mut [u32], start: usize, end: usize, cmp: &mut F)
where
    F: FnMut(u32, u32) -> Ordering,
{
    for i in start + 1..end {
        let pos = order[i];
        let mut j = i;
        while j > start && cmp(order[j - 1], pos) == Ordering::Greater {
            order[j] = order[j - 1];
            j -= 1;
        }
        order[j] = pos;
    }
}
