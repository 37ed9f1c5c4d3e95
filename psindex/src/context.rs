//! Contexts partition the NPA into rows.  The context of text position p is the k-gram of alphabet
//! ranks that starts at p and wraps around the end of the sentinel-terminated text.

use crate::Error;

/// The code of the k-gram that starts at `p`, reading `ranks` cyclically.  Codes compare in the
/// same order as the k-grams they encode.
pub fn code_at(ranks: &[u32], p: usize, k: usize, sigma: u64) -> u64 {
    let n = ranks.len();
    let mut code = 0u64;
    for j in 0..k {
        code = code * sigma + ranks[(p + j) % n] as u64;
    }
    code
}

/// Check that every k-gram over `sigma` symbols has a code that fits a signed 64-bit integer.
pub fn check_fits(context_len: u32, sigma_size: usize) -> Result<(), Error> {
    let too_long = Error::ContextTooLong {
        context_len,
        sigma_size,
    };
    match (sigma_size as u64).checked_pow(context_len) {
        Some(x) if x <= i64::MAX as u64 => Ok(()),
        _ => Err(too_long),
    }
}

//////////////////////////////////////////// ContextMap ////////////////////////////////////////////

/// A [ContextMap] assigns dense ids to the distinct k-gram codes of a text, in ascending code
/// order.  The id of a code is its index in `codes`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ContextMap {
    codes: Vec<u64>,
}

impl ContextMap {
    /// Compute the context map and the context id of every text position.
    pub fn build(
        ranks: &[u32],
        context_len: u32,
        sigma_size: usize,
    ) -> Result<(Self, Vec<u32>), Error> {
        check_fits(context_len, sigma_size)?;
        let k = context_len as usize;
        let sigma = sigma_size as u64;
        let per_position: Vec<u64> = (0..ranks.len())
            .map(|p| code_at(ranks, p, k, sigma))
            .collect();
        let mut codes = per_position.clone();
        codes.sort_unstable();
        codes.dedup();
        let map = Self { codes };
        let mut ids = Vec::with_capacity(per_position.len());
        for code in per_position.into_iter() {
            let id = map
                .id_of(code)
                .ok_or(Error::LogicError("context code vanished from the map"))?;
            ids.push(u32::try_from(id)?);
        }
        Ok((map, ids))
    }

    /// Reassemble a context map from serialized `(code, id)` pairs.
    pub fn from_pairs(pairs: &[(i64, i64)]) -> Result<Self, Error> {
        let mut codes = Vec::with_capacity(pairs.len());
        for (idx, (code, id)) in pairs.iter().enumerate() {
            if usize::try_from(*id).ok() != Some(idx) {
                return Err(Error::corrupt("context ids are not dense"));
            }
            let code = u64::try_from(*code).map_err(|_| Error::corrupt("negative context code"))?;
            if codes.last().map(|last| *last >= code).unwrap_or(false) {
                return Err(Error::corrupt("context codes are not increasing"));
            }
            codes.push(code);
        }
        Ok(Self { codes })
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn id_of(&self, code: u64) -> Option<usize> {
        self.codes.binary_search(&code).ok()
    }

    pub fn codes(&self) -> &[u64] {
        &self.codes
    }

    /// The context map as `(code, id)` pairs in id order.
    pub fn pairs(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.codes
            .iter()
            .enumerate()
            .map(|(id, code)| (*code as i64, id as i64))
    }
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////
