#![allow(dead_code)]

extern crate psindex;

use psindex::{Index, IndexOptions, PsiIndex, ReferenceIndex};

pub const CARGO_TOML: &[u8] = include_bytes!("../Cargo.toml");
pub const LIB_RS: &[u8] = include_bytes!("../src/lib.rs");
pub const INDEX_RS: &[u8] = include_bytes!("../src/index.rs");

pub const PANGRAMS: &[u8] = b"The quick brown fox jumps over the lazy dog.\n\
Pack my box with five dozen liquor jugs.\n\
How vexingly quick daft zebras jump!\n\
The five boxing wizards jump quickly.\n\
Sphinx of black quartz, judge my vow.\n";

pub const RUNS: &[u8] = b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaabbbbbbbbbbbbbbbbbbbbbbbbaaaaaaaaaaaaaaaaaaaaaaaaab";

// Words common to the texts above, in rough order of frequency.
pub const COMMON_WORDS: &[&str] = &[
    "e", "the", "fn", "self", "Error", "pub", "let", "index", "quick", "jump", "aab", "ba", "::",
    "\n", "not-present",
];

pub fn check_length<I: Index>(reference: &ReferenceIndex, index: &I) {
    assert_eq!(reference.length(), index.length());
}

pub fn check_extract<I: Index>(reference: &ReferenceIndex, index: &I) {
    for offset in 0..=reference.length() {
        for count in 0..5.min(reference.length() - offset + 1) {
            let expected = reference.extract(offset, count).unwrap();
            let returned = index.extract(offset, count).unwrap();
            assert_eq!(expected, returned, "offset = {}, count = {}", offset, count);
        }
    }
    assert!(index.extract(reference.length() + 1, 0).is_err());
    assert!(index.extract(0, reference.length() + 1).is_err());
}

pub fn check_extract_until<I: Index>(reference: &ReferenceIndex, index: &I) {
    for offset in (0..=reference.length()).step_by(7) {
        for delimiter in [b'\n', b' ', b'a'] {
            let expected = reference.extract_until(offset, delimiter).unwrap();
            let returned = index.extract_until(offset, delimiter).unwrap();
            assert_eq!(expected, returned, "offset = {}", offset);
        }
    }
}

pub fn check_search<I: Index>(reference: &ReferenceIndex, index: &I) {
    for word in COMMON_WORDS {
        let mut expected = reference.search(word.as_bytes()).unwrap();
        let mut returned = index.search(word.as_bytes()).unwrap();
        expected.sort_unstable();
        returned.sort_unstable();
        assert_eq!(expected, returned, "word = {:?}", word);
    }
}

pub fn check_count<I: Index>(reference: &ReferenceIndex, index: &I) {
    for word in COMMON_WORDS {
        let expected = reference.count(word.as_bytes()).unwrap();
        let returned = index.count(word.as_bytes()).unwrap();
        assert_eq!(expected, returned, "word = {:?}", word);
    }
}

pub fn check_all<I: Index>(reference: &ReferenceIndex, index: &I) {
    check_length(reference, index);
    check_extract(reference, index);
    check_extract_until(reference, index);
    check_search(reference, index);
    check_count(reference, index);
}

/// Check an index, and the index it serializes to, against the reference.
pub fn check_text(text: &[u8], options: IndexOptions) {
    let reference = ReferenceIndex::new(text);
    let index = PsiIndex::construct(text, &options).unwrap();
    check_all(&reference, &index);
    let mut buf = vec![];
    index.serialize(&mut buf).unwrap();
    let parsed = PsiIndex::deserialize(&mut &buf[..]).unwrap();
    assert_eq!(index, parsed);
    check_all(&reference, &parsed);
}

#[macro_export]
macro_rules! text_tests {
    ($($name:ident: $options:expr,)*) => {
    $(
        mod $name {
            use super::common::check_text;

            #[test]
            fn cargo_toml() {
                check_text(super::common::CARGO_TOML, $options);
            }

            #[test]
            fn lib_rs() {
                check_text(super::common::LIB_RS, $options);
            }

            #[test]
            fn index_rs() {
                check_text(super::common::INDEX_RS, $options);
            }

            #[test]
            fn pangrams() {
                check_text(super::common::PANGRAMS, $options);
            }

            #[test]
            fn runs() {
                check_text(super::common::RUNS, $options);
            }

            #[test]
            fn empty() {
                check_text(b"", $options);
            }
        }
    )*
    }
}
