//! [PsiIndex] ties the alphabet, the contexts, the NPA, and the sampled arrays together into a
//! self-index that answers count, locate, and extract queries.

use std::io::{Read, Write};

use buffertk::{length_free, pack_helper, stack_pack, Packable, Unpackable, Unpacker};
use indicio::{clue, INFO};

use crate::alphabet::Alphabet;
use crate::bit_array::{bits_for, BitArray};
use crate::binary_search::search_increasing;
use crate::context::ContextMap;
use crate::npa::{Npa, NpaParts, Psi};
use crate::options::{IndexOptions, MAX_SAMPLING_BASE};
use crate::sais::{Sais, SuffixSorter};
use crate::sampled::Samples;
use crate::wavelet_tree::WaveletTree;
use crate::{
    inverse, Error, Index, Range, BACKWARD_SEARCH_STEP, COLLECTOR, CONSTRUCT, DESERIALIZE,
    EXTRACT, SENTINEL, SERIALIZE,
};

///////////////////////////////////////////// Metadata /////////////////////////////////////////////

/// The scalar sizes that determine how to read every other part of an index.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Metadata {
    /// Size of the text, including the sentinel.
    pub original_size: u32,
    pub sampled_sa_size: u32,
    pub alpha_size: u32,
    pub sigma_size: u32,
    pub bits: u32,
    pub sampled_sa_bits: u32,
    pub sampling_base: u32,
    pub sampling_rate: u32,
    pub num_contexts: u32,
}

impl Metadata {
    const SIZE: usize = 36;

    fn fields(&self) -> [u32; 9] {
        [
            self.original_size,
            self.sampled_sa_size,
            self.alpha_size,
            self.sigma_size,
            self.bits,
            self.sampled_sa_bits,
            self.sampling_base,
            self.sampling_rate,
            self.num_contexts,
        ]
    }

    /// The number of 64-bit words behind each sampled array.
    fn sampled_words(&self) -> usize {
        BitArray::words_for(
            self.sampled_sa_size as usize,
            self.sampled_sa_bits as usize,
        )
    }

    fn validate(&self) -> Result<(), Error> {
        let n = self.original_size as usize;
        if n == 0 {
            return Err(Error::corrupt("index of an empty text"));
        }
        if self.sampling_base > MAX_SAMPLING_BASE || self.sampling_rate != 1 << self.sampling_base
        {
            return Err(Error::corrupt("sampling rate disagrees with sampling base"));
        }
        if self.sampled_sa_size as usize != Samples::sampled_size(n, self.sampling_base) {
            return Err(Error::corrupt("sampled size disagrees with text size"));
        }
        let bits = Samples::sampled_bits(n) as u32;
        if self.sampled_sa_bits != bits || self.bits != bits {
            return Err(Error::corrupt("sample width disagrees with text size"));
        }
        if self.alpha_size < 2
            || self.alpha_size as usize > crate::sais::ALPHABET_SIZE
            || self.alpha_size.checked_sub(1) != Some(self.sigma_size)
        {
            return Err(Error::corrupt("alphabet size disagrees with sigma size"));
        }
        if self.num_contexts == 0 || self.num_contexts > self.original_size {
            return Err(Error::corrupt("context count disagrees with text size"));
        }
        Ok(())
    }
}

impl Packable for Metadata {
    fn pack_sz(&self) -> usize {
        Self::SIZE
    }

    fn pack(&self, out: &mut [u8]) {
        let mut out = out;
        for field in self.fields() {
            out = pack_helper(field, out);
        }
    }
}

impl<'a> Unpackable<'a> for Metadata {
    type Error = Error;

    fn unpack<'b: 'a>(buf: &'b [u8]) -> Result<(Self, &'b [u8]), Error> {
        let mut up = Unpacker::new(buf);
        let mut fields = [0u32; 9];
        for field in fields.iter_mut() {
            *field = up.unpack()?;
        }
        let [
            original_size,
            sampled_sa_size,
            alpha_size,
            sigma_size,
            bits,
            sampled_sa_bits,
            sampling_base,
            sampling_rate,
            num_contexts,
        ] = fields;
        Ok((
            Self {
                original_size,
                sampled_sa_size,
                alpha_size,
                sigma_size,
                bits,
                sampled_sa_bits,
                sampling_base,
                sampling_rate,
                num_contexts,
            },
            up.remain(),
        ))
    }
}

///////////////////////////////////////////// PsiIndex /////////////////////////////////////////////

/// A compressed self-index over one byte string.  Immutable once built; every query takes `&self`
/// and may run from many threads at once.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PsiIndex {
    metadata: Metadata,
    alphabet: Alphabet,
    contexts: ContextMap,
    samples: Samples,
    npa: Npa,
}

impl PsiIndex {
    /// Build an index over `text` using the built-in suffix sorter.
    pub fn construct(text: &[u8], options: &IndexOptions) -> Result<Self, Error> {
        Self::construct_with(text, options, &Sais)
    }

    /// Build an index over `text`, sorting suffixes with `sorter`.
    pub fn construct_with(
        text: &[u8],
        options: &IndexOptions,
        sorter: &dyn SuffixSorter,
    ) -> Result<Self, Error> {
        options.validate()?;
        if let Some(offset) = text.iter().position(|c| *c == SENTINEL) {
            return Err(Error::sentinel_in_input(offset));
        }
        let mut terminated = Vec::with_capacity(text.len() + 1);
        terminated.extend_from_slice(text);
        terminated.push(SENTINEL);
        let n = terminated.len();
        let original_size = u32::try_from(n).map_err(|_| Error::TextTooLong)?;
        u32::try_from(n + 1).map_err(|_| Error::TextTooLong)?;
        let sa = sorter.suffix_array(&terminated)?;
        check_permutation(&sa, n)?;
        if sa[0] != n - 1 {
            return Err(Error::BadSuffixArray("sentinel does not sort first"));
        }
        let isa = inverse(&sa);
        let alphabet = Alphabet::from_suffix_array(&terminated, &sa)?;
        let mut ranks = Vec::with_capacity(n);
        for c in terminated.iter() {
            let rank = alphabet
                .rank_of(*c)
                .ok_or(Error::LogicError("symbol missing from alphabet"))?;
            ranks.push(u32::try_from(rank)?);
        }
        drop(terminated);
        let (contexts, ids) =
            ContextMap::build(&ranks, options.context_len, alphabet.sigma_size())?;
        let npa = Npa::construct(&ranks, &sa, &isa, &ids, contexts.len())?;
        drop(isa);
        let samples = Samples::construct(&sa, options.sampling_base);
        let metadata = Metadata {
            original_size,
            sampled_sa_size: u32::try_from(Samples::sampled_size(n, options.sampling_base))?,
            alpha_size: u32::try_from(alphabet.alpha_size())?,
            sigma_size: u32::try_from(alphabet.sigma_size())?,
            bits: bits_for(n as u64 + 1) as u32,
            sampled_sa_bits: Samples::sampled_bits(n) as u32,
            sampling_base: options.sampling_base,
            sampling_rate: u32::try_from(options.sampling_rate())?,
            num_contexts: u32::try_from(contexts.len())?,
        };
        CONSTRUCT.click();
        clue!(COLLECTOR, INFO, {
            construct: true,
            original_size: indicio::Value::from(n as u64),
            alpha_size: indicio::Value::from(metadata.alpha_size as u64),
            num_contexts: indicio::Value::from(metadata.num_contexts as u64),
            sampling_rate: indicio::Value::from(metadata.sampling_rate as u64),
        });
        Ok(Self {
            metadata,
            alphabet,
            contexts,
            samples,
            npa,
        })
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// The alphabet list:  distinct symbols in rank order, then a trailing 0.
    pub fn alphabet(&self) -> &[u8] {
        self.alphabet.symbols()
    }

    /// The distinct k-gram codes, in context-id order.
    pub fn context_codes(&self) -> &[u64] {
        self.contexts.codes()
    }

    /// Size of the text plus the sentinel.
    pub fn original_size(&self) -> usize {
        self.metadata.original_size as usize
    }

    /// Ψ(i) = ISA[(SA[i] + 1) mod n].
    pub fn lookup_npa(&self, i: usize) -> Result<usize, Error> {
        self.npa.psi(i)
    }

    /// The text offset of the i'th suffix in sorted order.
    pub fn lookup_sa(&self, i: usize) -> Result<usize, Error> {
        self.samples.lookup_sa(&self.npa, i)
    }

    /// The sorted position of the suffix at text offset i.
    pub fn lookup_isa(&self, i: usize) -> Result<usize, Error> {
        self.samples.lookup_isa(&self.npa, i)
    }

    /// Like [PsiIndex::lookup_sa], but also return the number of Ψ hops taken.
    pub fn lookup_sa_with_hops(&self, i: usize) -> Result<(usize, usize), Error> {
        self.samples.walk_sa(&self.npa, i)
    }

    /// Like [PsiIndex::lookup_isa], but also return the number of Ψ hops taken.
    pub fn lookup_isa_with_hops(&self, i: usize) -> Result<(usize, usize), Error> {
        self.samples.walk_isa(&self.npa, i)
    }

    /// The inclusive range of sorted suffixes that begin with `pattern`.  Patterns that do not
    /// occur, the empty pattern, and patterns containing the sentinel yield [Range::EMPTY].
    pub fn get_range(&self, pattern: &[u8]) -> Result<Range, Error> {
        let Some((last, rest)) = pattern.split_last() else {
            return Ok(Range::EMPTY);
        };
        let Some((c1, c2)) = self.column_bounds(*last) else {
            return Ok(Range::EMPTY);
        };
        let mut range = Range::new(c1, c2);
        for c in rest.iter().rev() {
            BACKWARD_SEARCH_STEP.click();
            let Some((c1, c2)) = self.column_bounds(*c) else {
                return Ok(Range::EMPTY);
            };
            let probe = |i: usize| self.npa.psi(i).map(|x| x as u64);
            let first = search_increasing(range.first as u64, c1, c2, false, probe)?;
            let second = search_increasing(range.second as u64, c1, c2, true, probe)?;
            if second < first {
                return Ok(Range::EMPTY);
            }
            range = Range::new(first, second);
        }
        Ok(range)
    }

    /// The inclusive suffix-array bounds of the suffixes that start with `c`.
    fn column_bounds(&self, c: u8) -> Option<(i64, i64)> {
        if c == SENTINEL {
            return None;
        }
        let (start, limit) = self.alphabet.range_of(c)?;
        Some((start as i64, limit as i64 - 1))
    }

    /// The symbol that begins the i'th sorted suffix.
    fn symbol_at(&self, i: usize) -> Result<u8, Error> {
        let n = self.metadata.original_size as usize;
        let rank = self
            .alphabet
            .rank_at(i)
            .ok_or(Error::out_of_bounds("symbol", i, n))?;
        self.alphabet
            .symbol(rank)
            .ok_or(Error::corrupt("column has no symbol"))
    }

    fn check_extract(&self, offset: usize, length: usize) -> Result<(), Error> {
        let size = self.length();
        if offset > size || length > size - offset {
            return Err(Error::BadExtract {
                offset,
                length,
                size,
            });
        }
        Ok(())
    }

    /// Write the serialized index to `w`.
    pub fn serialize<W: Write>(&self, w: &mut W) -> Result<(), Error> {
        SERIALIZE.click();
        w.write_all(&stack_pack(self).to_vec())?;
        Ok(())
    }

    /// Read exactly one serialized index from `r`.  Sections are read by their declared lengths,
    /// so a truncated stream fails without reading past the index.
    pub fn deserialize<R: Read>(r: &mut R) -> Result<Self, Error> {
        let mut buf = Vec::new();
        read_section(r, Metadata::SIZE, &mut buf)?;
        let metadata = Metadata::unpack(&buf)?.0;
        metadata.validate()?;
        let alpha = metadata.alpha_size as usize;
        let fixed = alpha * 13
            + metadata.num_contexts as usize * 16
            + alpha
            + 2 * 8 * metadata.sampled_words();
        read_section(r, fixed, &mut buf)?;
        for width in [8, 8, 8, 8, 8, 4, 4, 4, 4] {
            let count = read_count(r, &mut buf)?;
            read_section(r, count * width, &mut buf)?;
        }
        for _ in 0..metadata.num_contexts {
            let len = read_count(r, &mut buf)?;
            read_section(r, len, &mut buf)?;
        }
        let (index, rem) = Self::unpack(&buf)?;
        if !rem.is_empty() {
            return Err(Error::LogicError("deserialize read more than one index"));
        }
        Ok(index)
    }
}

/// A suffix sorter's output must be a permutation of [0, n).
fn check_permutation(sa: &[usize], n: usize) -> Result<(), Error> {
    if sa.len() != n {
        return Err(Error::BadSuffixArray("suffix array has the wrong length"));
    }
    let mut seen = vec![false; n];
    for pos in sa.iter() {
        match seen.get_mut(*pos) {
            Some(seen) if !*seen => *seen = true,
            _ => {
                return Err(Error::BadSuffixArray("suffix array is not a permutation"));
            }
        }
    }
    Ok(())
}

fn read_section<R: Read>(r: &mut R, len: usize, buf: &mut Vec<u8>) -> Result<(), Error> {
    let start = buf.len();
    r.take(len as u64).read_to_end(buf)?;
    if buf.len() - start != len {
        return Err(Error::corrupt("index is truncated"));
    }
    Ok(())
}

fn read_count<R: Read>(r: &mut R, buf: &mut Vec<u8>) -> Result<usize, Error> {
    read_section(r, 4, buf)?;
    let count = u32::unpack(&buf[buf.len() - 4..])?.0;
    Ok(count as usize)
}

fn unpack_u64s(up: &mut Unpacker) -> Result<Vec<u64>, Error> {
    let count: u32 = up.unpack()?;
    let mut values: Vec<u64> = Vec::with_capacity((count as usize).min(up.remain().len() / 8));
    for _ in 0..count {
        values.push(up.unpack()?);
    }
    Ok(values)
}

fn unpack_u32s(up: &mut Unpacker) -> Result<Vec<u32>, Error> {
    let count: u32 = up.unpack()?;
    let mut values: Vec<u32> = Vec::with_capacity((count as usize).min(up.remain().len() / 4));
    for _ in 0..count {
        values.push(up.unpack()?);
    }
    Ok(values)
}

fn unpack_bytes<'a>(up: &mut Unpacker<'a>, len: usize) -> Result<&'a [u8], Error> {
    let rem = up.remain();
    if rem.len() < len {
        return Err(Error::corrupt("index is truncated"));
    }
    up.advance(len);
    Ok(&rem[..len])
}

impl Packable for PsiIndex {
    fn pack_sz(&self) -> usize {
        let p = self.npa.parts();
        let alpha = self.alphabet.alpha_size();
        let wide = [
            &p.neccol,
            &p.necrow,
            &p.rowoffsets,
            &p.coloffsets,
            &p.celloffsets,
        ];
        let narrow = [&p.rowsizes, &p.colsizes, &p.roff, &p.coff];
        Metadata::SIZE
            + alpha * 13
            + self.contexts.len() * 16
            + alpha
            + 8 * (self.samples.sa().words().len() + self.samples.isa().words().len())
            + wide.iter().map(|a| 4 + 8 * a.len()).sum::<usize>()
            + narrow.iter().map(|a| 4 + 4 * a.len()).sum::<usize>()
            + p.trees
                .iter()
                .map(|t| 4 + t.as_ref().map(|t| t.pack_sz()).unwrap_or(0))
                .sum::<usize>()
    }

    fn pack(&self, out: &mut [u8]) {
        let p = self.npa.parts();
        let mut out = pack_helper(&self.metadata, out);
        for (symbol, boundary, rank) in self.alphabet.entries() {
            out = pack_helper(symbol, out);
            out = pack_helper(boundary, out);
            out = pack_helper(rank, out);
        }
        for (code, id) in self.contexts.pairs() {
            out = pack_helper(code, out);
            out = pack_helper(id, out);
        }
        out = pack_helper(length_free(self.alphabet.symbols()), out);
        out = pack_helper(length_free(self.samples.sa().words()), out);
        out = pack_helper(length_free(self.samples.isa().words()), out);
        for array in [
            &p.neccol,
            &p.necrow,
            &p.rowoffsets,
            &p.coloffsets,
            &p.celloffsets,
        ] {
            out = pack_helper(array.len() as u32, out);
            out = pack_helper(length_free(&array[..]), out);
        }
        for array in [&p.rowsizes, &p.colsizes, &p.roff, &p.coff] {
            out = pack_helper(array.len() as u32, out);
            out = pack_helper(length_free(&array[..]), out);
        }
        for tree in p.trees.iter() {
            match tree {
                Some(tree) => {
                    out = pack_helper(tree.pack_sz() as u32, out);
                    out = pack_helper(tree, out);
                }
                None => {
                    out = pack_helper(0u32, out);
                }
            }
        }
    }
}

impl<'a> Unpackable<'a> for PsiIndex {
    type Error = Error;

    fn unpack<'b: 'a>(buf: &'b [u8]) -> Result<(Self, &'b [u8]), Error> {
        let mut up = Unpacker::new(buf);
        let metadata: Metadata = up.unpack()?;
        metadata.validate()?;
        let n = metadata.original_size as usize;
        let mut entries = vec![];
        for _ in 0..metadata.alpha_size {
            let symbol: u8 = up.unpack()?;
            let boundary: i64 = up.unpack()?;
            let rank: i32 = up.unpack()?;
            entries.push((symbol, boundary, rank));
        }
        let mut pairs = vec![];
        for _ in 0..metadata.num_contexts {
            let code: i64 = up.unpack()?;
            let id: i64 = up.unpack()?;
            pairs.push((code, id));
        }
        let list = unpack_bytes(&mut up, metadata.alpha_size as usize)?;
        let mut sampled = vec![];
        for _ in 0..2 {
            let mut words: Vec<u64> = vec![];
            for _ in 0..metadata.sampled_words() {
                words.push(up.unpack()?);
            }
            sampled.push(BitArray::from_words(
                metadata.sampled_sa_size as usize,
                metadata.sampled_sa_bits as usize,
                words,
            )?);
        }
        let neccol = unpack_u64s(&mut up)?;
        let necrow = unpack_u64s(&mut up)?;
        let rowoffsets = unpack_u64s(&mut up)?;
        let coloffsets = unpack_u64s(&mut up)?;
        let celloffsets = unpack_u64s(&mut up)?;
        let rowsizes = unpack_u32s(&mut up)?;
        let colsizes = unpack_u32s(&mut up)?;
        let roff = unpack_u32s(&mut up)?;
        let coff = unpack_u32s(&mut up)?;
        let mut trees = vec![];
        for _ in 0..metadata.num_contexts {
            let len: u32 = up.unpack()?;
            trees.push(if len == 0 {
                None
            } else {
                Some(WaveletTree::from_bytes(unpack_bytes(
                    &mut up,
                    len as usize,
                )?)?)
            });
        }
        let alphabet = Alphabet::from_entries(&entries, list, n as u64)?;
        let contexts = ContextMap::from_pairs(&pairs)?;
        let isa = sampled.pop().ok_or(Error::LogicError("missing sampled array"))?;
        let sa = sampled.pop().ok_or(Error::LogicError("missing sampled array"))?;
        let samples = Samples::from_arrays(n, metadata.sampling_base, sa, isa)?;
        let npa = Npa::from_parts(
            n,
            NpaParts {
                neccol,
                necrow,
                rowoffsets,
                coloffsets,
                celloffsets,
                rowsizes,
                colsizes,
                roff,
                coff,
                trees,
            },
        )?;
        if npa.num_contexts() != contexts.len()
            || npa.parts().coloffsets[..] != alphabet.boundaries()[..alphabet.sigma_size()]
        {
            return Err(Error::corrupt("NPA disagrees with the alphabet or contexts"));
        }
        DESERIALIZE.click();
        clue!(COLLECTOR, INFO, {
            deserialize: true,
            original_size: indicio::Value::from(n as u64),
            alpha_size: indicio::Value::from(metadata.alpha_size as u64),
            num_contexts: indicio::Value::from(metadata.num_contexts as u64),
            sampling_rate: indicio::Value::from(metadata.sampling_rate as u64),
        });
        Ok((
            Self {
                metadata,
                alphabet,
                contexts,
                samples,
                npa,
            },
            up.remain(),
        ))
    }
}

impl Index for PsiIndex {
    fn length(&self) -> usize {
        self.original_size() - 1
    }

    fn count(&self, pattern: &[u8]) -> Result<usize, Error> {
        Ok(self.get_range(pattern)?.len())
    }

    fn search(&self, pattern: &[u8]) -> Result<Vec<usize>, Error> {
        self.get_range(pattern)?
            .positions()
            .map(|i| self.lookup_sa(i))
            .collect()
    }

    fn extract(&self, offset: usize, length: usize) -> Result<Vec<u8>, Error> {
        EXTRACT.click();
        self.check_extract(offset, length)?;
        let mut text = Vec::with_capacity(length);
        if length == 0 {
            return Ok(text);
        }
        let mut s = self.lookup_isa(offset)?;
        text.push(self.symbol_at(s)?);
        while text.len() < length {
            s = self.npa.psi(s)?;
            text.push(self.symbol_at(s)?);
        }
        Ok(text)
    }

    fn extract_until(&self, offset: usize, delimiter: u8) -> Result<Vec<u8>, Error> {
        EXTRACT.click();
        self.check_extract(offset, 0)?;
        let mut text = vec![];
        let mut s = self.lookup_isa(offset)?;
        loop {
            let c = self.symbol_at(s)?;
            if c == delimiter || c == SENTINEL {
                return Ok(text);
            }
            text.push(c);
            s = self.npa.psi(s)?;
        }
    }
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////
