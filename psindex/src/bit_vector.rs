use crate::binary_search::partition_by;
use crate::tables::select_in_word;
use crate::Error;

//////////////////////////////////////////// RankSelect ////////////////////////////////////////////

/// The capabilities the index needs from a bitmap.
pub trait RankSelect {
    /// The number of bits in the bitmap.
    fn len(&self) -> usize;
    /// True when the bitmap has zero bits.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// The value of the x'th bit.
    fn access(&self, x: usize) -> bool;
    /// The number of set bits at positions i < x.
    fn rank1(&self, x: usize) -> usize;
    /// The number of unset bits at positions i < x.
    fn rank0(&self, x: usize) -> usize {
        x - self.rank1(x)
    }
    /// The position of the r'th (zero-based) set bit.
    fn select1(&self, r: usize) -> Option<usize>;
    /// The position of the r'th (zero-based) unset bit.
    fn select0(&self, r: usize) -> Option<usize>;
}

///////////////////////////////////////////// BitVector ////////////////////////////////////////////

/// A plain bitmap with one cumulative popcount per 64-bit word.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BitVector {
    len: usize,
    words: Vec<u64>,
    // ranks[i] is the number of set bits in words[..i]; one longer than words.
    ranks: Vec<u64>,
}

impl BitVector {
    pub fn from_bits<I: IntoIterator<Item = bool>>(bits: I) -> Self {
        let mut len = 0;
        let mut words = vec![];
        for bit in bits {
            if len % 64 == 0 {
                words.push(0u64);
            }
            if bit {
                words[len / 64] |= 1u64 << (len % 64);
            }
            len += 1;
        }
        let mut ranks = Vec::with_capacity(words.len() + 1);
        let mut acc = 0u64;
        ranks.push(acc);
        for word in words.iter() {
            acc += word.count_ones() as u64;
            ranks.push(acc);
        }
        Self { len, words, ranks }
    }

    /// Reassemble a bitmap from its serialized parts without recomputing the rank directory.
    pub fn from_parts(len: usize, words: Vec<u64>, ranks: Vec<u64>) -> Result<Self, Error> {
        if words.len() != len.div_ceil(64) {
            return Err(Error::corrupt("bitmap has the wrong number of words"));
        }
        if ranks.len() != words.len() + 1 || ranks[0] != 0 {
            return Err(Error::corrupt("bitmap has a malformed rank directory"));
        }
        if ranks
            .windows(2)
            .zip(words.iter())
            .any(|(w, word)| w[1].checked_sub(w[0]) != Some(word.count_ones() as u64))
        {
            return Err(Error::corrupt("bitmap rank directory disagrees with its words"));
        }
        // Bits past len must be clear.
        if len % 64 != 0 && words.last().is_some_and(|word| word >> (len % 64) != 0) {
            return Err(Error::corrupt("bitmap has bits set past its length"));
        }
        Ok(Self { len, words, ranks })
    }

    pub fn words(&self) -> &[u64] {
        &self.words
    }

    pub fn ranks(&self) -> &[u64] {
        &self.ranks
    }

    fn ones(&self) -> usize {
        self.ranks[self.words.len()] as usize
    }

    fn zeroes_before_word(&self, word: usize) -> usize {
        word * 64 - self.ranks[word] as usize
    }
}

impl RankSelect for BitVector {
    fn len(&self) -> usize {
        self.len
    }

    fn access(&self, x: usize) -> bool {
        assert!(x < self.len);
        self.words[x / 64] & (1u64 << (x % 64)) != 0
    }

    fn rank1(&self, x: usize) -> usize {
        assert!(x <= self.len);
        let (word, bit) = (x / 64, x % 64);
        let mut rank = self.ranks[word] as usize;
        if bit > 0 {
            rank += (self.words[word] & ((1u64 << bit) - 1)).count_ones() as usize;
        }
        rank
    }

    fn select1(&self, r: usize) -> Option<usize> {
        if r >= self.ones() {
            return None;
        }
        let word = partition_by(0, self.words.len(), |w| self.ranks[w + 1] as usize <= r);
        let within = r - self.ranks[word] as usize;
        select_in_word(self.words[word], within).map(|bit| word * 64 + bit)
    }

    fn select0(&self, r: usize) -> Option<usize> {
        if r >= self.len - self.ones() {
            return None;
        }
        let word = partition_by(0, self.words.len(), |w| self.zeroes_before_word(w + 1) <= r);
        let within = r - self.zeroes_before_word(word);
        select_in_word(!self.words[word], within).map(|bit| word * 64 + bit)
    }
}

//////////////////////////////////////// ReferenceBitVector ////////////////////////////////////////

/// A [ReferenceBitVector] is an inefficient, but easy to understand and verify, bitmap.
#[cfg(test)]
pub struct ReferenceBitVector {
    bits: Vec<bool>,
}

#[cfg(test)]
impl ReferenceBitVector {
    pub fn new(bits: &[bool]) -> Self {
        Self {
            bits: bits.to_vec(),
        }
    }
}

#[cfg(test)]
impl RankSelect for ReferenceBitVector {
    fn len(&self) -> usize {
        self.bits.len()
    }

    fn access(&self, x: usize) -> bool {
        self.bits[x]
    }

    fn rank1(&self, x: usize) -> usize {
        self.bits[..x].iter().filter(|b| **b).count()
    }

    fn select1(&self, r: usize) -> Option<usize> {
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, b)| **b)
            .nth(r)
            .map(|(idx, _)| idx)
    }

    fn select0(&self, r: usize) -> Option<usize> {
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, b)| !**b)
            .nth(r)
            .map(|(idx, _)| idx)
    }
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////
