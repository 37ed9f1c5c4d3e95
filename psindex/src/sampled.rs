//! Sampled suffix and inverse suffix arrays.  Unsampled values are recovered by walking Ψ.

use crate::bit_array::{bits_for, BitArray};
use crate::npa::Psi;
use crate::{Error, LOOKUP_ISA, LOOKUP_SA};

////////////////////////////////////////////// Samples /////////////////////////////////////////////

/// Every `rate`-th suffix-array entry, and the inverse entry of every `rate`-th text position.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Samples {
    n: usize,
    base: u32,
    sa: BitArray,
    isa: BitArray,
}

impl Samples {
    /// The number of entries in each sampled array.
    pub fn sampled_size(n: usize, base: u32) -> usize {
        (n >> base) + 1
    }

    /// The width of each sampled entry.
    pub fn sampled_bits(n: usize) -> usize {
        bits_for(n as u64 + 1)
    }

    pub fn construct(sa: &[usize], base: u32) -> Self {
        let n = sa.len();
        let rate = 1usize << base;
        let size = Self::sampled_size(n, base);
        let bits = Self::sampled_bits(n);
        let mut ssa = BitArray::new(size, bits);
        let mut sisa = BitArray::new(size, bits);
        for (i, pos) in sa.iter().enumerate() {
            if i % rate == 0 {
                ssa.set(i / rate, *pos as u64);
            }
            if pos % rate == 0 {
                sisa.set(pos / rate, i as u64);
            }
        }
        Self {
            n,
            base,
            sa: ssa,
            isa: sisa,
        }
    }

    /// Wrap deserialized arrays, checking their shape against n and the sampling base.
    pub fn from_arrays(n: usize, base: u32, sa: BitArray, isa: BitArray) -> Result<Self, Error> {
        let size = Self::sampled_size(n, base);
        let bits = Self::sampled_bits(n);
        for array in [&sa, &isa] {
            if array.len() != size || array.bits() != bits {
                return Err(Error::corrupt("sampled array has the wrong shape"));
            }
        }
        Ok(Self { n, base, sa, isa })
    }

    pub fn rate(&self) -> usize {
        1 << self.base
    }

    pub fn sa(&self) -> &BitArray {
        &self.sa
    }

    pub fn isa(&self) -> &BitArray {
        &self.isa
    }

    /// SA[i], together with the number of Ψ hops it took to reach a sample.
    pub fn walk_sa<P: Psi + ?Sized>(&self, psi: &P, i: usize) -> Result<(usize, usize), Error> {
        LOOKUP_SA.click();
        if i >= self.n {
            return Err(Error::out_of_bounds("sa", i, self.n));
        }
        let rate = self.rate();
        let mut i = i;
        let mut hops = 0;
        while i % rate != 0 {
            i = psi.psi(i)?;
            hops += 1;
            if hops >= self.n {
                return Err(Error::corrupt("psi does not reach a sampled suffix"));
            }
        }
        let value = self.sa.get(i / rate) as usize;
        if value >= self.n {
            return Err(Error::corrupt("sampled suffix array entry out of range"));
        }
        let value = if value < hops {
            self.n - (hops - value)
        } else {
            value - hops
        };
        Ok((value, hops))
    }

    /// ISA[i], together with the number of Ψ hops past the sample.
    pub fn walk_isa<P: Psi + ?Sized>(&self, psi: &P, i: usize) -> Result<(usize, usize), Error> {
        LOOKUP_ISA.click();
        if i >= self.n {
            return Err(Error::out_of_bounds("isa", i, self.n));
        }
        let rate = self.rate();
        let mut value = self.isa.get(i / rate) as usize;
        if value >= self.n {
            return Err(Error::corrupt("sampled inverse suffix array entry out of range"));
        }
        let hops = i % rate;
        for _ in 0..hops {
            value = psi.psi(value)?;
        }
        Ok((value, hops))
    }

    pub fn lookup_sa<P: Psi + ?Sized>(&self, psi: &P, i: usize) -> Result<usize, Error> {
        Ok(self.walk_sa(psi, i)?.0)
    }

    pub fn lookup_isa<P: Psi + ?Sized>(&self, psi: &P, i: usize) -> Result<usize, Error> {
        Ok(self.walk_isa(psi, i)?.0)
    }
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////
