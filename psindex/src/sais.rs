//! Suffix Array-Induced Sort (sais, for short) is an algorithm to construct the suffix array of a
//! string in linear time in the length of the string.  A suffix array contains all possible
//! suffixes of a string in sorted order such that SA[i] indicates that S[i..] would be the i'th
//! suffix in sorted order.
//!
//! The index treats suffix sorting as a pluggable collaborator.  Anything that implements
//! [SuffixSorter] can stand in for [Sais].

#![allow(non_snake_case)]

use crate::{Error, SENTINEL};

/// The symbols SA-IS sorts over:  the sentinel and 256 byte values.
pub const ALPHABET_SIZE: usize = 257;

const EMPTY: usize = usize::MAX;

//////////////////////////////////////////// SuffixSorter //////////////////////////////////////////

/// Produce the suffix array of a sentinel-terminated text.  The sentinel appears exactly once, as
/// the last byte, and sorts before every other byte.
pub trait SuffixSorter {
    fn suffix_array(&self, text: &[u8]) -> Result<Vec<usize>, Error>;
}

/////////////////////////////////////////////// Sais ///////////////////////////////////////////////

/// The linear-time default [SuffixSorter].
#[derive(Clone, Copy, Debug, Default)]
pub struct Sais;

impl SuffixSorter for Sais {
    fn suffix_array(&self, text: &[u8]) -> Result<Vec<usize>, Error> {
        let S = symbols(text)?;
        let mut SA = vec![0; S.len()];
        sais(&S, ALPHABET_SIZE, &mut SA)?;
        Ok(SA)
    }
}

/// Map a sentinel-terminated text onto `[0, ALPHABET_SIZE)`:  the sentinel becomes 0 and every
/// other byte b becomes b + 1.
pub fn symbols(text: &[u8]) -> Result<Vec<usize>, Error> {
    match text.split_last() {
        Some((&SENTINEL, body)) => {
            if let Some(offset) = body.iter().position(|c| *c == SENTINEL) {
                return Err(Error::sentinel_in_input(offset));
            }
            let mut S: Vec<usize> = body.iter().map(|c| *c as usize + 1).collect();
            S.push(0);
            Ok(S)
        }
        _ => Err(Error::BadSuffixArray("text is not sentinel-terminated")),
    }
}

////////////////////////////////////////////// LSType //////////////////////////////////////////////

/// An L-type character is larger than the suffix that follows it.  An S-type character is smaller.
/// Ties take on the type of the next character.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum LSType {
    L,
    S,
}

fn get_types(S: &[usize]) -> Vec<LSType> {
    let mut types = vec![LSType::S; S.len()];
    for i in (0..S.len().saturating_sub(1)).rev() {
        types[i] = if S[i] > S[i + 1] || (S[i] == S[i + 1] && types[i + 1] == LSType::L) {
            LSType::L
        } else {
            LSType::S
        };
    }
    types
}

/// Is position i the left-most S in a run of S-type characters?
fn is_lms(T: &[LSType], i: usize) -> bool {
    i > 0 && i < T.len() && T[i - 1] == LSType::L && T[i] == LSType::S
}

/// The first (or one past the last) suffix-array slot of each symbol's bucket.
fn buckets(S: &[usize], K: usize, limits: bool) -> Vec<usize> {
    let mut counts = vec![0; K];
    for s in S.iter() {
        counts[*s] += 1;
    }
    let mut sum = 0;
    for count in counts.iter_mut() {
        sum += *count;
        *count = if limits { sum } else { sum - *count };
    }
    counts
}

/// Left-to-right pass that places every L-type suffix after the suffix it precedes.
fn induce_L(S: &[usize], SA: &mut [usize], T: &[LSType], K: usize) {
    let mut starts = buckets(S, K, false);
    for i in 0..SA.len() {
        let j = SA[i];
        if j != EMPTY && j > 0 && T[j - 1] == LSType::L {
            SA[starts[S[j - 1]]] = j - 1;
            starts[S[j - 1]] += 1;
        }
    }
}

/// Right-to-left pass that places every S-type suffix, filling buckets from their limits.
fn induce_S(S: &[usize], SA: &mut [usize], T: &[LSType], K: usize) {
    let mut limits = buckets(S, K, true);
    for i in (0..SA.len()).rev() {
        let j = SA[i];
        if j != EMPTY && j > 0 && T[j - 1] == LSType::S {
            limits[S[j - 1]] -= 1;
            SA[limits[S[j - 1]]] = j - 1;
        }
    }
}

/// Two LMS substrings are equal when they match symbol-for-symbol and type-for-type up to and
/// including the next LMS position.
fn lms_substrings_equal(S: &[usize], T: &[LSType], a: usize, b: usize) -> bool {
    let mut d = 0;
    loop {
        if S[a + d] != S[b + d] || T[a + d] != T[b + d] {
            return false;
        }
        if d > 0 && (is_lms(T, a + d) || is_lms(T, b + d)) {
            return is_lms(T, a + d) && is_lms(T, b + d);
        }
        d += 1;
    }
}

/// Sort the suffixes of S into SA.  S must end with a unique 0 and draw every symbol from [0, K).
pub fn sais(S: &[usize], K: usize, SA: &mut [usize]) -> Result<(), Error> {
    let n = S.len();
    if n == 0 || n != SA.len() {
        return Err(Error::LogicError("suffix array does not match its text"));
    }
    if S[n - 1] != 0 || S[..n - 1].iter().any(|s| *s == 0 || *s >= K) {
        return Err(Error::LogicError("text must end with its unique least symbol"));
    }
    if n == 1 {
        SA[0] = 0;
        return Ok(());
    }
    let T = get_types(S);
    // Sort the LMS substrings by seeding LMS positions at the ends of their buckets and inducing.
    SA.fill(EMPTY);
    let mut limits = buckets(S, K, true);
    for i in 0..n {
        if is_lms(&T, i) {
            limits[S[i]] -= 1;
            SA[limits[S[i]]] = i;
        }
    }
    induce_L(S, SA, &T, K);
    induce_S(S, SA, &T, K);
    // Name each LMS substring by its rank among distinct LMS substrings.
    let mut names = vec![EMPTY; n];
    let mut name = 0;
    let mut prev = None;
    for pos in SA.iter().copied().filter(|pos| is_lms(&T, *pos)) {
        if !prev
            .map(|prev| lms_substrings_equal(S, &T, prev, pos))
            .unwrap_or(false)
        {
            name += 1;
        }
        names[pos] = name - 1;
        prev = Some(pos);
    }
    // The reduced string lists names in text order.  When every name is unique, its suffix array
    // follows directly; otherwise recurse.
    let lms: Vec<usize> = (0..n).filter(|i| is_lms(&T, *i)).collect();
    let S1: Vec<usize> = lms.iter().map(|pos| names[*pos]).collect();
    let mut SA1 = vec![0; S1.len()];
    if name < S1.len() {
        sais(&S1, name, &mut SA1)?;
    } else {
        for (i, s) in S1.iter().enumerate() {
            SA1[*s] = i;
        }
    }
    // Seed the LMS suffixes in their true order and induce the rest.
    SA.fill(EMPTY);
    let mut limits = buckets(S, K, true);
    for idx in SA1.iter().rev() {
        let pos = lms[*idx];
        limits[S[pos]] -= 1;
        SA[limits[S[pos]]] = pos;
    }
    induce_L(S, SA, &T, K);
    induce_S(S, SA, &T, K);
    Ok(())
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////
