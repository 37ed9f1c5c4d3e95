use std::cmp::Ordering;

use crate::Error;

/// Binary search over [first, last) and return the index of the first element for which search
/// returns an ordering of greater or equal.  Never evaluates search(last).
pub fn binary_search_by<F: FnMut(usize) -> Ordering>(
    first: usize,
    last: usize,
    mut search: F,
) -> usize {
    let mut left = first;
    let mut right = last;
    while left < right {
        let mid = left + (right - left) / 2;
        match search(mid) {
            Ordering::Less => {
                left = mid + 1;
            }
            Ordering::Greater => {
                right = mid;
            }
            Ordering::Equal => {
                return mid;
            }
        }
    }
    left
}

/// Return the first index in [first, last) for which search returns false.  Assumes the range is
/// partitioned such that every true precedes every false.
pub fn partition_by<F: FnMut(usize) -> bool>(first: usize, last: usize, mut search: F) -> usize {
    binary_search_by(first, last, move |probe| {
        if search(probe) {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    })
}

/// The number of elements of the sorted `slice` that are less than or equal to `value`.
pub fn rank_sorted(slice: &[u64], value: u64) -> usize {
    partition_by(0, slice.len(), |idx| slice[idx] <= value)
}

/// Search the inclusive range [first, last] of a strictly increasing function for `target`.
///
/// When some position maps to target, return it.  Otherwise return the insertion point when
/// looking for the leftmost bound, and the predecessor when looking for the rightmost bound.  The
/// predecessor of first is first - 1, so the result may fall outside [first, last].
pub fn search_increasing<F>(
    target: u64,
    first: i64,
    last: i64,
    rightmost: bool,
    mut probe: F,
) -> Result<i64, Error>
where
    F: FnMut(usize) -> Result<u64, Error>,
{
    let mut sp = first;
    let mut ep = last;
    while sp <= ep {
        let mid = sp + (ep - sp) / 2;
        let value = probe(usize::try_from(mid)?)?;
        match target.cmp(&value) {
            Ordering::Equal => {
                return Ok(mid);
            }
            Ordering::Less => {
                ep = mid - 1;
            }
            Ordering::Greater => {
                sp = mid + 1;
            }
        }
    }
    Ok(if rightmost { ep } else { sp })
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////
