//! psindex builds a compressed, self-indexing representation of a byte string.  The index counts,
//! locates, and extracts substrings without ever decompressing the text.  Everything is derived
//! from Ψ, the suffix-array successor function, which is stored as a grid of (context, column)
//! cells with one wavelet tree per context.

use std::num::TryFromIntError;

use indicio::{clue, ERROR};

pub mod alphabet;
pub mod binary_search;
pub mod bit_array;
pub mod bit_vector;
pub mod context;
pub mod index;
pub mod npa;
pub mod options;
pub mod reference;
pub mod sais;
pub mod sampled;
pub mod tables;
pub mod wavelet_tree;

pub use index::{Metadata, PsiIndex};
pub use options::IndexOptions;
pub use reference::ReferenceIndex;
pub use sais::{Sais, SuffixSorter};

///////////////////////////////////////////// constants ////////////////////////////////////////////

/// The byte appended to every input.  It must not appear in the input itself.
pub const SENTINEL: u8 = 1;

//////////////////////////////////////////// biometrics ////////////////////////////////////////////

static CONSTRUCT: biometrics::Counter = biometrics::Counter::new("psindex.construct");
static SERIALIZE: biometrics::Counter = biometrics::Counter::new("psindex.serialize");
static DESERIALIZE: biometrics::Counter = biometrics::Counter::new("psindex.deserialize");
static LOOKUP_NPA: biometrics::Counter = biometrics::Counter::new("psindex.lookup.npa");
static LOOKUP_SA: biometrics::Counter = biometrics::Counter::new("psindex.lookup.sa");
static LOOKUP_ISA: biometrics::Counter = biometrics::Counter::new("psindex.lookup.isa");
static BACKWARD_SEARCH_STEP: biometrics::Counter =
    biometrics::Counter::new("psindex.backward_search.step");
static EXTRACT: biometrics::Counter = biometrics::Counter::new("psindex.extract");

static SENTINEL_IN_INPUT: biometrics::Counter =
    biometrics::Counter::new("psindex.error.sentinel_in_input");
static OUT_OF_BOUNDS: biometrics::Counter = biometrics::Counter::new("psindex.error.out_of_bounds");
static CORRUPT: biometrics::Counter = biometrics::Counter::new("psindex.error.corrupt");
static BUFFER_ERROR: biometrics::Counter = biometrics::Counter::new("psindex.error.buffertk");
static PROTOBUF_ERROR: biometrics::Counter = biometrics::Counter::new("psindex.error.prototk");
static IO_ERROR: biometrics::Counter = biometrics::Counter::new("psindex.error.io");

pub fn register_biometrics(collector: &biometrics::Collector) {
    collector.register_counter(&CONSTRUCT);
    collector.register_counter(&SERIALIZE);
    collector.register_counter(&DESERIALIZE);
    collector.register_counter(&LOOKUP_NPA);
    collector.register_counter(&LOOKUP_SA);
    collector.register_counter(&LOOKUP_ISA);
    collector.register_counter(&BACKWARD_SEARCH_STEP);
    collector.register_counter(&EXTRACT);
    collector.register_counter(&SENTINEL_IN_INPUT);
    collector.register_counter(&OUT_OF_BOUNDS);
    collector.register_counter(&CORRUPT);
    collector.register_counter(&BUFFER_ERROR);
    collector.register_counter(&PROTOBUF_ERROR);
    collector.register_counter(&IO_ERROR);
}

////////////////////////////////////////////// indicio /////////////////////////////////////////////

pub static COLLECTOR: indicio::Collector = indicio::Collector::new();

/////////////////////////////////////////////// Error //////////////////////////////////////////////

#[derive(Debug)]
pub enum Error {
    /// The input contained the sentinel byte at `offset`.
    SentinelInInput { offset: usize },
    /// An index into SA, ISA, or Ψ space fell outside `[0, size)`.
    OutOfBounds {
        what: &'static str,
        index: usize,
        size: usize,
    },
    /// Extraction would run past the end of the text.
    BadExtract {
        offset: usize,
        length: usize,
        size: usize,
    },
    /// sigma_size^context_len does not fit in a signed 64-bit context code.
    ContextTooLong { context_len: u32, sigma_size: usize },
    BadOptions(&'static str),
    BadSuffixArray(&'static str),
    TextTooLong,
    IntoUsize,
    Corrupt(&'static str),
    LogicError(&'static str),
    Buffer(buffertk::Error),
    Protobuf(prototk::Error),
    Io(std::io::Error),
}

impl Error {
    pub(crate) fn out_of_bounds(what: &'static str, index: usize, size: usize) -> Self {
        OUT_OF_BOUNDS.click();
        Self::OutOfBounds { what, index, size }
    }

    pub(crate) fn corrupt(what: &'static str) -> Self {
        CORRUPT.click();
        clue!(COLLECTOR, ERROR, {
            corrupt: what,
        });
        Self::Corrupt(what)
    }

    pub(crate) fn sentinel_in_input(offset: usize) -> Self {
        SENTINEL_IN_INPUT.click();
        clue!(COLLECTOR, ERROR, {
            sentinel_in_input: indicio::Value::from(offset as u64),
        });
        Self::SentinelInInput { offset }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::SentinelInInput { offset } => {
                write!(f, "input contains the sentinel byte at offset {}", offset)
            }
            Error::OutOfBounds { what, index, size } => {
                write!(f, "{} index out of bounds: i = {} size = {}", what, index, size)
            }
            Error::BadExtract {
                offset,
                length,
                size,
            } => write!(
                f,
                "cannot extract {} bytes at offset {} from text of {} bytes",
                length, offset, size
            ),
            Error::ContextTooLong {
                context_len,
                sigma_size,
            } => write!(
                f,
                "context of length {} over {} symbols overflows the context code",
                context_len, sigma_size
            ),
            Error::BadOptions(what) => write!(f, "bad options: {}", what),
            Error::BadSuffixArray(what) => write!(f, "bad suffix array: {}", what),
            Error::TextTooLong => write!(f, "text too long"),
            Error::IntoUsize => write!(f, "integer does not fit"),
            Error::Corrupt(what) => write!(f, "corrupt index: {}", what),
            Error::LogicError(what) => write!(f, "logic error: {}", what),
            Error::Buffer(err) => write!(f, "buffertk: {}", err),
            Error::Protobuf(err) => write!(f, "prototk: {}", err),
            Error::Io(err) => write!(f, "io: {}", err),
        }
    }
}

impl std::error::Error for Error {}

impl From<TryFromIntError> for Error {
    fn from(_: TryFromIntError) -> Self {
        Self::IntoUsize
    }
}

impl From<buffertk::Error> for Error {
    fn from(err: buffertk::Error) -> Self {
        BUFFER_ERROR.click();
        Self::Buffer(err)
    }
}

impl From<prototk::Error> for Error {
    fn from(err: prototk::Error) -> Self {
        PROTOBUF_ERROR.click();
        Self::Protobuf(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        IO_ERROR.click();
        Self::Io(err)
    }
}

/////////////////////////////////////////////// Range //////////////////////////////////////////////

/// An inclusive range of suffix-array positions.  A range whose second is less than its first
/// holds no positions.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Range {
    pub first: i64,
    pub second: i64,
}

impl Range {
    pub const EMPTY: Range = Range {
        first: 0,
        second: -1,
    };

    pub fn new(first: i64, second: i64) -> Self {
        Self { first, second }
    }

    pub fn is_empty(&self) -> bool {
        self.second < self.first
    }

    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.second - self.first + 1) as usize
        }
    }

    /// Iterate the suffix-array positions of this range in index order.
    pub fn positions(&self) -> impl Iterator<Item = usize> {
        let (first, len) = (self.first.max(0) as usize, self.len());
        first..first + len
    }
}

impl Default for Range {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.first, self.second)
    }
}

/////////////////////////////////////////////// Index //////////////////////////////////////////////

/// The operations every full-text index answers, whether compressed or not.
pub trait Index {
    /// Length of the indexed text, not counting the sentinel.
    fn length(&self) -> usize;
    /// Number of occurrences of `pattern` in the text.
    fn count(&self, pattern: &[u8]) -> Result<usize, Error>;
    /// Offsets of every occurrence of `pattern`, in no particular order.
    fn search(&self, pattern: &[u8]) -> Result<Vec<usize>, Error>;
    /// Exactly `length` bytes of text starting at `offset`.
    fn extract(&self, offset: usize, length: usize) -> Result<Vec<u8>, Error>;
    /// Text starting at `offset`, up to but excluding the first `delimiter` or the end of text.
    fn extract_until(&self, offset: usize, delimiter: u8) -> Result<Vec<u8>, Error>;
}

////////////////////////////////////////////// inverse /////////////////////////////////////////////

/// Invert a permutation of `[0, x.len())`.
pub fn inverse(x: &[usize]) -> Vec<usize> {
    let mut ix = vec![0; x.len()];
    for (idx, x) in x.iter().enumerate() {
        ix[*x] = idx;
    }
    ix
}

///////////////////////////////////////////// test_util ////////////////////////////////////////////

#[cfg(test)]
pub mod test_util {
    #[macro_export]
    macro_rules! assert_eq_with_ctx {
        (@inner [$($elems:tt)*] , $($rem:tt)*) => {
            format!("{} = {:?}; {}", stringify!($($elems)*), $($elems)*, assert_eq_with_ctx!(@inner [] $($rem)*))
        };

        (@inner [$($elems:tt)*] $e:tt $($rem:tt)*) => {
            assert_eq_with_ctx!(@inner [$($elems)* $e] $($rem)*)
        };

        (@inner [$($elems:tt)*]) => {
            format!("{} = {:?}", stringify!($($elems)*), $($elems)*)
        };

        ($lhs:expr, $rhs:expr, $($rem:expr),+) => {
            assert_eq!($lhs, $rhs, "{} == {}; {}", stringify!($lhs), stringify!($rhs), assert_eq_with_ctx!(@inner [] $($rem),*));
        };

        ($lhs:expr, $rhs:expr) => {
            assert_eq!($lhs, $rhs, "{} == {}", stringify!($lhs), stringify!($rhs));
        };
    }

    pub(crate) use assert_eq_with_ctx;

    // NOTE(rescrv):  Worked by hand and cross-checked, so that each representation of a text has
    // one canonical place to look.  S maps the sentinel to 0 and every other byte b to b + 1.
    #[allow(non_snake_case)]
    pub struct TestCase {
        pub text: &'static [u8],
        pub symbols: &'static [u8],
        pub boundaries: &'static [u64],
        pub not_in_text: &'static [u8],
        pub S: &'static [usize],
        pub SA: &'static [usize],
        pub ISA: &'static [usize],
        pub PSI: &'static [usize],
        pub lstype: &'static str,
        pub lmspos: &'static str,
        #[allow(clippy::type_complexity)]
        pub searches: &'static [(&'static [u8], &'static [usize])],
    }

    impl TestCase {
        /// The text with the sentinel appended.
        pub fn terminated(&self) -> Vec<u8> {
            let mut text = self.text.to_vec();
            text.push(crate::SENTINEL);
            text
        }
    }

    pub const BANANA: &TestCase = &TestCase {
        text: b"banana",
        symbols: &[1, b'a', b'b', b'n', 0],
        boundaries: &[0, 1, 4, 5, 7],
        not_in_text: b"cxz",
        S: &[99, 98, 111, 98, 111, 98, 0],
        SA: &[6, 5, 3, 1, 0, 4, 2],
        ISA: &[4, 3, 6, 2, 5, 1, 0],
        PSI: &[4, 0, 5, 6, 3, 1, 2],
        lstype: "LSLSLLS",
        lmspos: " * *  *",
        searches: &[
            (b"an", &[1, 3]),
            (b"na", &[2, 4]),
            (b"ana", &[1, 3]),
            (b"banana", &[0]),
            (b"nab", &[]),
        ],
    };

    pub const MISSISSIPPI: &TestCase = &TestCase {
        text: b"mississippi",
        symbols: &[1, b'i', b'm', b'p', b's', 0],
        boundaries: &[0, 1, 5, 6, 8, 12],
        not_in_text: b"abn",
        S: &[110, 106, 116, 116, 106, 116, 116, 106, 113, 113, 106, 0],
        SA: &[11, 10, 7, 4, 1, 0, 9, 8, 6, 3, 5, 2],
        ISA: &[5, 4, 11, 9, 3, 10, 8, 2, 7, 6, 1, 0],
        PSI: &[5, 0, 7, 10, 11, 4, 1, 6, 2, 3, 8, 9],
        lstype: "LSLLSLLSLLLS",
        lmspos: " *  *  *   *",
        searches: &[
            (b"iss", &[1, 4]),
            (b"ssi", &[2, 5]),
            (b"p", &[8, 9]),
            (b"i", &[1, 4, 7, 10]),
            (b"issississ", &[]),
        ],
    };

    pub const MISSISSIPPI_BANANA: &TestCase = &TestCase {
        text: b"mississippibanana",
        symbols: &[1, b'a', b'b', b'i', b'm', b'n', b'p', b's', 0],
        boundaries: &[0, 1, 4, 5, 9, 10, 12, 14, 18],
        not_in_text: b"cde",
        S: &[
            110, 106, 116, 116, 106, 116, 116, 106, 113, 113, 106, 99, 98, 111, 98, 111, 98, 0,
        ],
        SA: &[17, 16, 14, 12, 11, 10, 7, 4, 1, 0, 15, 13, 9, 8, 6, 3, 5, 2],
        ISA: &[9, 8, 17, 15, 7, 16, 14, 6, 13, 12, 5, 4, 3, 11, 2, 10, 1, 0],
        PSI: &[9, 0, 10, 11, 3, 4, 13, 16, 17, 8, 1, 2, 5, 12, 6, 7, 14, 15],
        lstype: "LSLLSLLSLLLLSLSLLS",
        lmspos: " *  *  *    * *  *",
        searches: &[(b"ana", &[12, 14]), (b"ssi", &[2, 5]), (b"pib", &[9])],
    };

    pub const SAIS_EXAMPLE: &TestCase = &TestCase {
        text: b"baabababbab",
        symbols: &[1, b'a', b'b', 0],
        boundaries: &[0, 1, 6, 12],
        not_in_text: b"c",
        S: &[99, 98, 98, 99, 98, 99, 98, 99, 99, 98, 99, 0],
        SA: &[11, 1, 9, 2, 4, 6, 10, 0, 8, 3, 5, 7],
        ISA: &[7, 1, 3, 9, 4, 10, 5, 11, 8, 2, 6, 0],
        PSI: &[7, 3, 6, 9, 10, 11, 0, 1, 2, 4, 5, 8],
        lstype: "LSSLSLSLLSLS",
        lmspos: " *  * *  * *",
        searches: &[(b"ab", &[2, 4, 6, 9]), (b"bab", &[3, 5, 8]), (b"bbb", &[])],
    };

    pub const ABRACADABRA: &TestCase = &TestCase {
        text: b"abracadabra",
        symbols: &[1, b'a', b'b', b'c', b'd', b'r', 0],
        boundaries: &[0, 1, 6, 8, 9, 10, 12],
        not_in_text: b"xyz",
        S: &[98, 99, 115, 98, 100, 98, 101, 98, 99, 115, 98, 0],
        SA: &[11, 10, 7, 0, 3, 5, 8, 1, 4, 6, 9, 2],
        ISA: &[3, 7, 11, 4, 8, 5, 9, 2, 6, 10, 1, 0],
        PSI: &[3, 0, 6, 7, 8, 9, 10, 11, 5, 2, 1, 4],
        lstype: "SSLSLSLSSLLS",
        lmspos: "   * * *   *",
        searches: &[
            (b"abra", &[0, 7]),
            (b"a", &[0, 3, 5, 7, 10]),
            (b"cad", &[4]),
            (b"abrab", &[]),
        ],
    };

    #[macro_export]
    macro_rules! test_cases_for {
        ($name:ident, $check:path) => {
            mod $name {
                #[test]
                fn banana() {
                    $check($crate::test_util::BANANA);
                }

                #[test]
                fn mississippi() {
                    $check($crate::test_util::MISSISSIPPI);
                }

                #[test]
                fn mississippi_banana() {
                    $check($crate::test_util::MISSISSIPPI_BANANA);
                }

                #[test]
                fn sais_example() {
                    $check($crate::test_util::SAIS_EXAMPLE);
                }

                #[test]
                fn abracadabra() {
                    $check($crate::test_util::ABRACADABRA);
                }
            }
        };
    }

    pub(crate) use test_cases_for;

    proptest::prop_compose! {
        /// Texts over a small alphabet that never contain the sentinel.
        pub fn arb_text()(text in proptest::collection::vec(proptest::sample::select(vec![0u8, b'a', b'b', b'c', 0xff]), 0..96)) -> Vec<u8> {
            text
        }
    }
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::test_util::*;
    use super::*;

    #[test]
    #[allow(clippy::assertions_on_constants)]
    fn u32_as_usize() {
        assert!(u32::BITS <= usize::BITS);
    }

    #[test]
    #[allow(clippy::assertions_on_constants)]
    fn usize_as_u64() {
        assert!(usize::BITS <= u64::BITS);
    }

    #[test]
    fn inverse() {
        let x = &[8, 6, 9, 5, 0, 3, 1, 2, 7, 4];
        let ix = &[4, 6, 7, 5, 9, 3, 1, 8, 0, 2];
        let returned: &[usize] = &super::inverse(x);
        assert_eq!(ix, returned);
        let returned: &[usize] = &super::inverse(returned);
        assert_eq!(x, returned);
    }

    #[test]
    fn range() {
        assert!(Range::EMPTY.is_empty());
        assert_eq!(0, Range::EMPTY.len());
        assert_eq!(0, Range::EMPTY.positions().count());
        assert_eq!(Range::EMPTY, Range::default());
        let range = Range::new(2, 3);
        assert!(!range.is_empty());
        assert_eq!(2, range.len());
        assert_eq!(vec![2, 3], range.positions().collect::<Vec<_>>());
        assert_eq!("[2, 3]", range.to_string());
    }

    fn check_isa(t: &TestCase) {
        let returned = super::inverse(t.SA);
        assert_eq_with_ctx!(t.ISA, returned);
    }

    test_cases_for! {isa, super::check_isa}

    fn check_psi(t: &TestCase) {
        let n = t.SA.len();
        let returned: Vec<usize> = (0..n).map(|i| t.ISA[(t.SA[i] + 1) % n]).collect();
        assert_eq_with_ctx!(t.PSI, returned);
    }

    test_cases_for! {psi, super::check_psi}
}
