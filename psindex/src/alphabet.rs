//! The alphabet of a text: each distinct byte, its rank in suffix order, and the boundary at which
//! its suffixes begin in the suffix array.  Boundaries are the classic C-array of an FM-index.

use crate::binary_search::rank_sorted;
use crate::Error;

///////////////////////////////////////////// Alphabet /////////////////////////////////////////////

/// An [Alphabet] is stored by rank.  Rank 0 is the sentinel because the sentinel sorts before
/// every other suffix.  The entry at rank `alpha_size() - 1` is synthetic:  it carries symbol 0
/// and boundary n so that every real rank has an upper bound.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Alphabet {
    symbols: Vec<u8>,
    boundaries: Vec<u64>,
    ranks: [Option<u32>; 256],
}

impl Alphabet {
    /// Derive the alphabet from a sentinel-terminated text and its suffix array.
    pub fn from_suffix_array(text: &[u8], sa: &[usize]) -> Result<Self, Error> {
        if text.len() != sa.len() || text.is_empty() {
            return Err(Error::BadSuffixArray("suffix array does not cover the text"));
        }
        let mut symbols = vec![];
        let mut boundaries = vec![];
        let mut ranks = [None; 256];
        for (idx, pos) in sa.iter().enumerate() {
            let c = *text
                .get(*pos)
                .ok_or(Error::BadSuffixArray("suffix array entry past end of text"))?;
            if symbols.last() == Some(&c) {
                continue;
            }
            if ranks[c as usize].is_some() {
                return Err(Error::BadSuffixArray("suffix array is not grouped by symbol"));
            }
            ranks[c as usize] = Some(u32::try_from(symbols.len())?);
            symbols.push(c);
            boundaries.push(idx as u64);
        }
        symbols.push(0);
        boundaries.push(text.len() as u64);
        Ok(Self {
            symbols,
            boundaries,
            ranks,
        })
    }

    /// Reassemble an alphabet from its serialized entries, each `(symbol, boundary, rank)` in rank
    /// order, and the alphabet list.  `n` is the size of the sentinel-terminated text.
    pub fn from_entries(entries: &[(u8, i64, i32)], list: &[u8], n: u64) -> Result<Self, Error> {
        if entries.len() < 2 || entries.len() != list.len() {
            return Err(Error::corrupt("alphabet has the wrong number of entries"));
        }
        let mut symbols = Vec::with_capacity(entries.len());
        let mut boundaries = Vec::with_capacity(entries.len());
        let mut ranks = [None; 256];
        for (idx, (symbol, boundary, rank)) in entries.iter().enumerate() {
            if usize::try_from(*rank).ok() != Some(idx) {
                return Err(Error::corrupt("alphabet ranks are not dense"));
            }
            if list[idx] != *symbol {
                return Err(Error::corrupt("alphabet list disagrees with alphabet map"));
            }
            let boundary =
                u64::try_from(*boundary).map_err(|_| Error::corrupt("negative alphabet boundary"))?;
            if boundaries.last().map(|last| *last >= boundary).unwrap_or(boundary != 0) {
                return Err(Error::corrupt("alphabet boundaries are not increasing"));
            }
            boundaries.push(boundary);
            symbols.push(*symbol);
            if idx + 1 < entries.len() {
                if ranks[*symbol as usize].is_some() {
                    return Err(Error::corrupt("alphabet repeats a symbol"));
                }
                ranks[*symbol as usize] = Some(idx as u32);
            }
        }
        if boundaries.last() != Some(&n) || symbols.last() != Some(&0) {
            return Err(Error::corrupt("alphabet does not end at the text size"));
        }
        Ok(Self {
            symbols,
            boundaries,
            ranks,
        })
    }

    /// The number of entries, including the synthetic upper bound.
    pub fn alpha_size(&self) -> usize {
        self.symbols.len()
    }

    /// The number of distinct symbols in the text, including the sentinel.
    pub fn sigma_size(&self) -> usize {
        self.symbols.len() - 1
    }

    /// The rank of `c`, or None if `c` does not occur in the text.
    pub fn rank_of(&self, c: u8) -> Option<usize> {
        self.ranks[c as usize].map(|r| r as usize)
    }

    /// The symbol of a real (non-synthetic) rank.
    pub fn symbol(&self, rank: usize) -> Option<u8> {
        if rank < self.sigma_size() {
            Some(self.symbols[rank])
        } else {
            None
        }
    }

    /// The half-open suffix-array range of suffixes that begin with `c`.
    pub fn range_of(&self, c: u8) -> Option<(u64, u64)> {
        let rank = self.rank_of(c)?;
        Some((self.boundaries[rank], self.boundaries[rank + 1]))
    }

    /// The rank whose suffix-array range contains position `i`.
    pub fn rank_at(&self, i: usize) -> Option<usize> {
        let rank = rank_sorted(&self.boundaries[..self.sigma_size()], i as u64);
        if rank == 0 || i as u64 >= self.boundaries[self.sigma_size()] {
            None
        } else {
            Some(rank - 1)
        }
    }

    /// The alphabet list:  symbols in rank order, followed by the synthetic 0.
    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    pub fn boundaries(&self) -> &[u64] {
        &self.boundaries
    }

    /// The alphabet map in rank order, as `(symbol, boundary, rank)`.
    pub fn entries(&self) -> impl Iterator<Item = (u8, i64, i32)> + '_ {
        self.symbols
            .iter()
            .zip(self.boundaries.iter())
            .enumerate()
            .map(|(rank, (s, b))| (*s, *b as i64, rank as i32))
    }
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{assert_eq_with_ctx, test_cases_for, TestCase};

    fn check_alphabet(t: &TestCase) {
        let alphabet = Alphabet::from_suffix_array(&t.terminated(), t.SA).unwrap();
        assert_eq_with_ctx!(t.symbols, alphabet.symbols(), t.text);
        assert_eq_with_ctx!(t.boundaries, alphabet.boundaries(), t.text);
        assert_eq!(t.symbols.len(), alphabet.alpha_size());
        assert_eq!(Some(0), alphabet.rank_of(crate::SENTINEL));
        for c in t.not_in_text.iter() {
            assert_eq!(None, alphabet.rank_of(*c));
            assert_eq!(None, alphabet.range_of(*c));
        }
        for (i, pos) in t.SA.iter().enumerate() {
            let rank = alphabet.rank_at(i).unwrap();
            assert_eq!(Some(t.terminated()[*pos]), alphabet.symbol(rank));
        }
        let entries: Vec<_> = alphabet.entries().collect();
        let parsed =
            Alphabet::from_entries(&entries, alphabet.symbols(), t.SA.len() as u64).unwrap();
        assert_eq!(alphabet, parsed);
    }

    test_cases_for! {alphabet, super::check_alphabet}

    #[test]
    fn banana_ranges() {
        let t = crate::test_util::BANANA;
        let alphabet = Alphabet::from_suffix_array(&t.terminated(), t.SA).unwrap();
        assert_eq!(Some((1, 4)), alphabet.range_of(b'a'));
        assert_eq!(Some((4, 5)), alphabet.range_of(b'b'));
        assert_eq!(Some((5, 7)), alphabet.range_of(b'n'));
        assert_eq!(None, alphabet.symbol(4));
        assert_eq!(None, alphabet.rank_at(7));
        assert_eq!(4, alphabet.sigma_size());
    }

    #[test]
    fn zero_byte_is_not_the_upper_bound() {
        let text = &[0u8, 1];
        let alphabet = Alphabet::from_suffix_array(text, &[1, 0]).unwrap();
        assert_eq!(&[1, 0, 0], alphabet.symbols());
        assert_eq!(Some(1), alphabet.rank_of(0));
        assert_eq!(Some((1, 2)), alphabet.range_of(0));
    }

    #[test]
    fn ungrouped_suffix_array() {
        assert!(Alphabet::from_suffix_array(b"ab\x01", &[2, 0, 1]).is_ok());
        assert!(Alphabet::from_suffix_array(b"aba\x01", &[3, 0, 1, 2]).is_err());
    }

    #[test]
    fn corrupt_entries() {
        let entries = &[(1u8, 0i64, 0i32), (b'a', 1, 1), (0, 3, 2)];
        assert!(Alphabet::from_entries(entries, &[1, b'a', 0], 3).is_ok());
        assert!(Alphabet::from_entries(entries, &[1, b'b', 0], 3).is_err());
        assert!(Alphabet::from_entries(entries, &[1, b'a', 0], 4).is_err());
        let entries = &[(1u8, 0i64, 0i32), (b'a', 1, 2), (0, 3, 1)];
        assert!(Alphabet::from_entries(entries, &[1, b'a', 0], 3).is_err());
        let entries = &[(1u8, 0i64, 0i32), (b'a', 0, 1), (0, 3, 2)];
        assert!(Alphabet::from_entries(entries, &[1, b'a', 0], 3).is_err());
        let entries = &[(1u8, 1i64, 0i32), (b'a', 2, 1), (0, 3, 2)];
        assert!(Alphabet::from_entries(entries, &[1, b'a', 0], 3).is_err());
    }
}
