//! The next-pointer array (NPA) stores Ψ(i) = ISA[(SA[i] + 1) mod n] as a sparse grid.
//!
//! Columns are the alphabet ranks that partition the suffix array.  Rows are the contexts that
//! follow the first symbol of each suffix.  Within a column, suffixes are sorted by their context,
//! so each (row, column) pair is one contiguous cell.  Within a row, the Ψ values of every cell
//! interleave to cover one contiguous range that starts at the row's offset.  A wavelet tree over
//! "which column owns this value" recovers the value from a (column, offset-in-cell) pair.

use crate::binary_search::rank_sorted;
use crate::wavelet_tree::{OrderedSequenceIndex, WaveletTree};
use crate::{Error, LOOKUP_NPA};

//////////////////////////////////////////////// Psi ///////////////////////////////////////////////

/// Anything that can answer Ψ over `[0, len())`.
pub trait Psi {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn psi(&self, i: usize) -> Result<usize, Error>;
}

impl Psi for [usize] {
    fn len(&self) -> usize {
        <[usize]>::len(self)
    }

    fn psi(&self, i: usize) -> Result<usize, Error> {
        self.get(i)
            .copied()
            .ok_or_else(|| Error::out_of_bounds("psi", i, <[usize]>::len(self)))
    }
}

////////////////////////////////////////////// NpaParts ////////////////////////////////////////////

/// The flattened arrays of an [Npa].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NpaParts {
    /// The row of each cell, grouped by column.
    pub neccol: Vec<u64>,
    /// The columns of each row, grouped by row.
    pub necrow: Vec<u64>,
    /// The first Ψ value of each row.
    pub rowoffsets: Vec<u64>,
    /// The first suffix-array position of each column.
    pub coloffsets: Vec<u64>,
    /// The offset of each cell within its column, parallel to `neccol`.
    pub celloffsets: Vec<u64>,
    pub rowsizes: Vec<u32>,
    pub colsizes: Vec<u32>,
    pub roff: Vec<u32>,
    pub coff: Vec<u32>,
    /// One tree per row with more than one column.
    pub trees: Vec<Option<WaveletTree>>,
}

//////////////////////////////////////////// NpaBuilder ////////////////////////////////////////////

/// Accumulate the grid one suffix-array position at a time.
struct NpaBuilder {
    coloffsets: Vec<u64>,
    columns: Vec<Vec<(u32, u64)>>,
    rows: Vec<Vec<(u32, Vec<u64>)>>,
    symbol: Option<u32>,
    context: u32,
}

impl NpaBuilder {
    fn new(num_contexts: usize) -> Self {
        Self {
            coloffsets: vec![],
            columns: vec![],
            rows: vec![vec![]; num_contexts],
            symbol: None,
            context: 0,
        }
    }

    /// Record that suffix-array position `i` starts with `symbol`, is followed by `context`, and
    /// has Ψ(i) = `psi`.
    fn push(&mut self, i: usize, symbol: u32, context: u32, psi: usize) -> Result<(), Error> {
        let colstart = match self.symbol {
            Some(prev) if prev == symbol => {
                *self.coloffsets.last().ok_or(Error::LogicError("column without start"))? as usize
            }
            Some(prev) if prev > symbol => {
                return Err(Error::LogicError("suffix array is not sorted by symbol"));
            }
            _ => {
                self.symbol = Some(symbol);
                self.coloffsets.push(i as u64);
                self.columns.push(vec![(context, 0)]);
                self.context = context;
                i
            }
        };
        if context != self.context {
            if context < self.context {
                return Err(Error::LogicError("contexts decrease within a column"));
            }
            let cells = self
                .columns
                .last_mut()
                .ok_or(Error::LogicError("cell without column"))?;
            cells.push((context, (i - colstart) as u64));
            self.context = context;
        }
        let col = u32::try_from(self.coloffsets.len() - 1)?;
        let row = self
            .rows
            .get_mut(context as usize)
            .ok_or(Error::LogicError("context id out of range"))?;
        match row.last_mut() {
            Some((c, values)) if *c == col => values.push(psi as u64),
            _ => row.push((col, vec![psi as u64])),
        }
        Ok(())
    }

    fn finish(self, n: usize) -> Result<Npa, Error> {
        let mut parts = NpaParts {
            coloffsets: self.coloffsets,
            ..NpaParts::default()
        };
        for cells in self.columns.into_iter() {
            parts.coff.push(u32::try_from(parts.neccol.len())?);
            parts.colsizes.push(u32::try_from(cells.len())?);
            for (row, offset) in cells.into_iter() {
                parts.neccol.push(row as u64);
                parts.celloffsets.push(offset);
            }
        }
        let mut total = 0u64;
        for row in self.rows.into_iter() {
            let bias = row
                .iter()
                .flat_map(|(_, values)| values.iter())
                .min()
                .copied()
                .ok_or(Error::LogicError("context owns no values"))?;
            if bias != total {
                return Err(Error::LogicError("context values are not contiguous"));
            }
            let len: usize = row.iter().map(|(_, values)| values.len()).sum();
            parts.roff.push(u32::try_from(parts.necrow.len())?);
            parts.rowsizes.push(u32::try_from(row.len())?);
            parts.rowoffsets.push(bias);
            parts.necrow.extend(row.iter().map(|(col, _)| *col as u64));
            let tree = if row.len() > 1 {
                let mut sequence = vec![u64::MAX; len];
                for (pos, (_, values)) in row.iter().enumerate() {
                    for value in values.iter() {
                        let slot = sequence
                            .get_mut((value - bias) as usize)
                            .ok_or(Error::LogicError("context value out of range"))?;
                        *slot = pos as u64;
                    }
                }
                if sequence.iter().any(|s| *s == u64::MAX) {
                    return Err(Error::LogicError("context values are not contiguous"));
                }
                Some(WaveletTree::new(&sequence, 0, row.len() as u64 - 1)?)
            } else {
                None
            };
            parts.trees.push(tree);
            total += len as u64;
        }
        if total != n as u64 {
            return Err(Error::LogicError("contexts do not cover the suffix array"));
        }
        Ok(Npa { n, parts })
    }
}

//////////////////////////////////////////////// Npa ///////////////////////////////////////////////

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Npa {
    n: usize,
    parts: NpaParts,
}

impl Npa {
    /// Build the NPA for a text of n symbols, including the sentinel.
    ///
    /// - `ranks[p]` is the alphabet rank of the symbol at text position p.
    /// - `contexts[p]` is the context id of the k-gram that starts at p.
    pub fn construct(
        ranks: &[u32],
        sa: &[usize],
        isa: &[usize],
        contexts: &[u32],
        num_contexts: usize,
    ) -> Result<Self, Error> {
        let n = sa.len();
        if ranks.len() != n || isa.len() != n || contexts.len() != n {
            return Err(Error::LogicError("NPA inputs differ in length"));
        }
        let mut builder = NpaBuilder::new(num_contexts);
        for (i, pos) in sa.iter().enumerate() {
            let next = (pos + 1) % n;
            builder.push(i, ranks[*pos], contexts[next], isa[next])?;
        }
        builder.finish(n)
    }

    /// Reassemble an NPA from deserialized parts, checking that every offset lands in bounds.
    pub fn from_parts(n: usize, parts: NpaParts) -> Result<Self, Error> {
        let cols = parts.coloffsets.len();
        let rows = parts.rowsizes.len();
        if n == 0 || cols == 0 || rows == 0 {
            return Err(Error::corrupt("NPA is empty"));
        }
        if parts.colsizes.len() != cols || parts.coff.len() != cols {
            return Err(Error::corrupt("NPA column arrays differ in length"));
        }
        if parts.roff.len() != rows || parts.rowoffsets.len() != rows || parts.trees.len() != rows
        {
            return Err(Error::corrupt("NPA row arrays differ in length"));
        }
        if parts.neccol.len() != parts.celloffsets.len() {
            return Err(Error::corrupt("NPA cell arrays differ in length"));
        }
        check_starts(&parts.coloffsets, n, "NPA column offsets")?;
        check_starts(&parts.rowoffsets, n, "NPA row offsets")?;
        if parts.neccol.iter().any(|r| *r as usize >= rows) {
            return Err(Error::corrupt("NPA cell points past the last row"));
        }
        let mut row_lens = vec![0u64; rows];
        let mut cells = 0usize;
        for col in 0..cols {
            let size = parts.colsizes[col] as usize;
            if size == 0 || parts.coff[col] as usize != cells {
                return Err(Error::corrupt("NPA column does not follow its predecessor"));
            }
            let width = extent(&parts.coloffsets, col, n);
            let slice = parts
                .celloffsets
                .get(cells..cells + size)
                .ok_or(Error::corrupt("NPA column overruns its cells"))?;
            if slice[0] != 0
                || slice.windows(2).any(|w| w[0] >= w[1])
                || slice[size - 1] >= width
            {
                return Err(Error::corrupt("NPA cell offsets are out of order"));
            }
            for (idx, offset) in slice.iter().enumerate() {
                let end = slice.get(idx + 1).copied().unwrap_or(width);
                row_lens[parts.neccol[cells + idx] as usize] += end - offset;
            }
            cells += size;
        }
        if cells != parts.neccol.len() {
            return Err(Error::corrupt("NPA columns do not cover their cells"));
        }
        let mut entries = 0usize;
        for row in 0..rows {
            let size = parts.rowsizes[row] as usize;
            if size == 0 || parts.roff[row] as usize != entries {
                return Err(Error::corrupt("NPA row does not follow its predecessor"));
            }
            let slice = parts
                .necrow
                .get(entries..entries + size)
                .ok_or(Error::corrupt("NPA row overruns its columns"))?;
            if slice.windows(2).any(|w| w[0] >= w[1]) || slice[size - 1] as usize >= cols {
                return Err(Error::corrupt("NPA row columns are out of order"));
            }
            let len = extent(&parts.rowoffsets, row, n);
            if row_lens[row] != len {
                return Err(Error::corrupt("NPA row length disagrees with its cells"));
            }
            let len = len as usize;
            match &parts.trees[row] {
                None if size == 1 => {}
                Some(tree)
                    if size > 1
                        && tree.len() == len
                        && tree.lo() == 0
                        && tree.hi() == size as u64 - 1 => {}
                _ => {
                    return Err(Error::corrupt("NPA row tree does not match the row"));
                }
            }
            entries += size;
        }
        if entries != parts.necrow.len() {
            return Err(Error::corrupt("NPA rows do not cover their columns"));
        }
        Ok(Self { n, parts })
    }

    pub fn parts(&self) -> &NpaParts {
        &self.parts
    }

    pub fn num_contexts(&self) -> usize {
        self.parts.rowsizes.len()
    }

    /// The column, equivalently the alphabet rank, of suffix-array position `i`.
    pub fn column_of(&self, i: usize) -> Result<usize, Error> {
        if i >= self.n {
            return Err(Error::out_of_bounds("column", i, self.n));
        }
        rank_sorted(&self.parts.coloffsets, i as u64)
            .checked_sub(1)
            .ok_or(Error::corrupt("NPA has no column zero"))
    }
}

impl Psi for Npa {
    fn len(&self) -> usize {
        self.n
    }

    fn psi(&self, i: usize) -> Result<usize, Error> {
        LOOKUP_NPA.click();
        let p = &self.parts;
        let col = self.column_of(i)?;
        let coloff = p.coloffsets[col];
        let start = p.coff[col] as usize;
        let size = p.colsizes[col] as usize;
        let cells = p
            .celloffsets
            .get(start..start + size)
            .ok_or(Error::corrupt("NPA column overruns its cells"))?;
        let within = i as u64 - coloff;
        let cell = rank_sorted(cells, within)
            .checked_sub(1)
            .ok_or(Error::corrupt("NPA column has no first cell"))?;
        let celloff = (within - cells[cell]) as usize;
        let row = *p
            .neccol
            .get(start + cell)
            .ok_or(Error::corrupt("NPA cell has no row"))? as usize;
        let (rstart, rsize) = match (p.roff.get(row), p.rowsizes.get(row)) {
            (Some(rstart), Some(rsize)) => (*rstart as usize, *rsize as usize),
            _ => {
                return Err(Error::corrupt("NPA cell points past the last row"));
            }
        };
        let columns = p
            .necrow
            .get(rstart..rstart + rsize)
            .ok_or(Error::corrupt("NPA row overruns its columns"))?;
        let pos = rank_sorted(columns, col as u64)
            .checked_sub(1)
            .ok_or(Error::corrupt("NPA row does not hold the column"))?;
        if columns[pos] != col as u64 {
            return Err(Error::corrupt("NPA row does not hold the column"));
        }
        let value = match &p.trees[row] {
            Some(tree) => tree
                .select_q(celloff, pos as u64)
                .ok_or(Error::corrupt("NPA cell offset exceeds its row"))?,
            None => celloff,
        };
        Ok(p.rowoffsets[row] as usize + value)
    }
}

/// Offsets must start at zero, strictly increase, and stay below n.
fn check_starts(offsets: &[u64], n: usize, what: &'static str) -> Result<(), Error> {
    if offsets.first() != Some(&0)
        || offsets.windows(2).any(|w| w[0] >= w[1])
        || offsets.last().map(|x| *x >= n as u64).unwrap_or(true)
    {
        return Err(Error::corrupt(what));
    }
    Ok(())
}

/// The distance from `offsets[idx]` to the next offset, or to n for the last.
fn extent(offsets: &[u64], idx: usize, n: usize) -> u64 {
    offsets.get(idx + 1).copied().unwrap_or(n as u64) - offsets[idx]
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////
