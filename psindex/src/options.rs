use crate::Error;

/// The largest sampling base accepted.  Larger bases make every locate walk Ψ for too long.
pub const MAX_SAMPLING_BASE: u32 = 20;

/// Options for constructing a [crate::PsiIndex].
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "command_line", derive(arrrg_derive::CommandLine))]
pub struct IndexOptions {
    /// Length of the k-gram that partitions Ψ into rows.
    #[cfg_attr(
        feature = "command_line",
        arrrg(optional, "Length of the context that partitions the index.", "K")
    )]
    pub context_len: u32,
    /// Sample every 2^sampling_base entries of the suffix array and its inverse.
    #[cfg_attr(
        feature = "command_line",
        arrrg(optional, "Sample one in 2^B suffix-array entries.", "B")
    )]
    pub sampling_base: u32,
}

impl IndexOptions {
    /// Set the context length.
    pub fn context_len(mut self, context_len: u32) -> Self {
        self.context_len = context_len;
        self
    }

    /// Set the sampling base.
    pub fn sampling_base(mut self, sampling_base: u32) -> Self {
        self.sampling_base = sampling_base;
        self
    }

    pub fn sampling_rate(&self) -> usize {
        1usize << self.sampling_base
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.context_len == 0 {
            return Err(Error::BadOptions("context_len must be at least 1"));
        }
        if self.sampling_base > MAX_SAMPLING_BASE {
            return Err(Error::BadOptions("sampling_base must be at most 20"));
        }
        Ok(())
    }
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            context_len: 3,
            sampling_base: 5,
        }
    }
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = IndexOptions::default();
        assert_eq!(3, options.context_len);
        assert_eq!(5, options.sampling_base);
        assert_eq!(32, options.sampling_rate());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn builders() {
        let options = IndexOptions::default().context_len(7).sampling_base(0);
        assert_eq!(7, options.context_len);
        assert_eq!(1, options.sampling_rate());
        assert!(options.validate().is_ok());
    }

    #[test]
    fn rejected() {
        assert!(IndexOptions::default().context_len(0).validate().is_err());
        assert!(IndexOptions::default().sampling_base(21).validate().is_err());
        assert!(IndexOptions::default().sampling_base(20).validate().is_ok());
    }
}
