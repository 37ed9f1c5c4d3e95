//! A brute-force [Index] over the plain text.  Slow, but obviously correct.

use crate::{Error, Index};

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ReferenceIndex {
    text: Vec<u8>,
}

impl ReferenceIndex {
    pub fn new(text: &[u8]) -> Self {
        ReferenceIndex {
            text: text.to_vec(),
        }
    }
}

impl Index for ReferenceIndex {
    fn length(&self) -> usize {
        self.text.len()
    }

    fn count(&self, pattern: &[u8]) -> Result<usize, Error> {
        Ok(self.search(pattern)?.len())
    }

    fn search(&self, pattern: &[u8]) -> Result<Vec<usize>, Error> {
        if pattern.is_empty() {
            return Ok(vec![]);
        }
        Ok(self
            .text
            .windows(pattern.len())
            .enumerate()
            .filter(|(_, candidate)| *candidate == pattern)
            .map(|(idx, _)| idx)
            .collect())
    }

    fn extract(&self, offset: usize, length: usize) -> Result<Vec<u8>, Error> {
        let size = self.text.len();
        if offset > size || length > size - offset {
            return Err(Error::BadExtract {
                offset,
                length,
                size,
            });
        }
        Ok(self.text[offset..offset + length].to_vec())
    }

    fn extract_until(&self, offset: usize, delimiter: u8) -> Result<Vec<u8>, Error> {
        let tail = self.extract(offset, self.text.len().saturating_sub(offset))?;
        Ok(tail.into_iter().take_while(|c| *c != delimiter).collect())
    }
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////
