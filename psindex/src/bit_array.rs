use crate::Error;

///////////////////////////////////////////// BitArray /////////////////////////////////////////////

/// A [BitArray] is a fixed-length sequence of fixed-width integers packed into 64-bit words.  Bits
/// are assigned least-significant first, and an entry may straddle two words.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BitArray {
    len: usize,
    bits: usize,
    words: Vec<u64>,
}

impl BitArray {
    /// The number of words that back `len` entries of `bits` bits each.  This always includes one
    /// word of slack.
    pub fn words_for(len: usize, bits: usize) -> usize {
        len * bits / 64 + 1
    }

    /// A zeroed array of `len` entries of `bits` bits each.
    pub fn new(len: usize, bits: usize) -> Self {
        assert!(bits <= 64);
        Self {
            len,
            bits,
            words: vec![0; Self::words_for(len, bits)],
        }
    }

    /// Wrap previously-serialized words.
    pub fn from_words(len: usize, bits: usize, words: Vec<u64>) -> Result<Self, Error> {
        if bits > 64 {
            return Err(Error::corrupt("bit array wider than 64 bits"));
        }
        if words.len() != Self::words_for(len, bits) {
            return Err(Error::corrupt("bit array has the wrong number of words"));
        }
        Ok(Self { len, bits, words })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bits(&self) -> usize {
        self.bits
    }

    pub fn words(&self) -> &[u64] {
        &self.words
    }

    fn mask(&self) -> u64 {
        if self.bits == 64 {
            u64::MAX
        } else {
            (1u64 << self.bits) - 1
        }
    }

    /// Load the entry at `index`.
    ///
    /// # Panics
    ///
    /// - When `index >= self.len()`.
    pub fn get(&self, index: usize) -> u64 {
        assert!(index < self.len);
        if self.bits == 0 {
            return 0;
        }
        let pos = index * self.bits;
        let (word, offset) = (pos / 64, pos % 64);
        let mut x = self.words[word] >> offset;
        if offset + self.bits > 64 {
            x |= self.words[word + 1] << (64 - offset);
        }
        x & self.mask()
    }

    /// Store `value` at `index`, truncated to the width of the array.
    ///
    /// # Panics
    ///
    /// - When `index >= self.len()`.
    pub fn set(&mut self, index: usize, value: u64) {
        assert!(index < self.len);
        if self.bits == 0 {
            return;
        }
        let mask = self.mask();
        let value = value & mask;
        let pos = index * self.bits;
        let (word, offset) = (pos / 64, pos % 64);
        self.words[word] &= !(mask << offset);
        self.words[word] |= value << offset;
        if offset + self.bits > 64 {
            let spill = 64 - offset;
            self.words[word + 1] &= !(mask >> spill);
            self.words[word + 1] |= value >> spill;
        }
    }
}

/// The number of bits needed to represent every value in `[0, n)`: ceil(log2(n)).
pub fn bits_for(n: u64) -> usize {
    if n <= 1 {
        0
    } else {
        (64 - (n - 1).leading_zeros()) as usize
    }
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////
