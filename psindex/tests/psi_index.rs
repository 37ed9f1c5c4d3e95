extern crate psindex;

mod common;

use psindex::{Index, IndexOptions, PsiIndex, Range};

text_tests! {
    default_options: psindex::IndexOptions::default(),
    dense_sampling: psindex::IndexOptions::default().sampling_base(0),
    single_symbol_contexts: psindex::IndexOptions::default().context_len(1).sampling_base(2),
    long_contexts: psindex::IndexOptions::default().context_len(6).sampling_base(3),
    sparse_sampling: psindex::IndexOptions::default().sampling_base(12),
}

#[test]
fn banana() {
    let index = PsiIndex::construct(b"banana", &IndexOptions::default()).unwrap();
    assert_eq!(6, index.length());
    assert_eq!(2, index.count(b"ana").unwrap());
    let mut offsets = index.search(b"ana").unwrap();
    offsets.sort();
    assert_eq!(vec![1, 3], offsets);
    assert_eq!(b"banana".to_vec(), index.extract(0, 6).unwrap());
    assert_eq!(b"".to_vec(), index.extract_until(1, b'a').unwrap());
    assert_eq!(Range::EMPTY, index.get_range(b"xyz").unwrap());
    assert_eq!(Range::new(2, 3), index.get_range(b"ana").unwrap());
    assert_eq!(&[1, b'a', b'b', b'n', 0], index.alphabet());
}

#[test]
fn mississippi() {
    let index = PsiIndex::construct(b"mississippi", &IndexOptions::default()).unwrap();
    assert_eq!(4, index.count(b"i").unwrap());
    assert_eq!(2, index.count(b"ssi").unwrap());
    assert_eq!(1, index.count(b"mississippi").unwrap());
    assert_eq!(0, index.count(b"mississippis").unwrap());
    let mut offsets = index.search(b"issi").unwrap();
    offsets.sort();
    assert_eq!(vec![1, 4], offsets);
    assert_eq!(b"sip".to_vec(), index.extract(6, 3).unwrap());
    assert_eq!(b"m".to_vec(), index.extract_until(0, b'i').unwrap());
    let metadata = index.metadata();
    assert_eq!(12, metadata.original_size);
    assert_eq!(6, metadata.alpha_size);
    assert_eq!(5, metadata.sigma_size);
    assert_eq!(32, metadata.sampling_rate);
}

#[test]
fn every_byte() {
    let text: Vec<u8> = (0..=255u8).filter(|c| *c != psindex::SENTINEL).collect();
    let mut doubled = text.clone();
    doubled.extend_from_slice(&text);
    let options = IndexOptions::default().context_len(2);
    let index = PsiIndex::construct(&doubled, &options).unwrap();
    assert_eq!(257, index.metadata().alpha_size);
    for c in text.iter() {
        let mut offsets = index.search(&[*c]).unwrap();
        offsets.sort();
        let first = text.iter().position(|x| x == c).unwrap();
        assert_eq!(vec![first, first + text.len()], offsets);
    }
    assert_eq!(doubled, index.extract(0, doubled.len()).unwrap());
}

#[test]
fn sentinel_rejected() {
    assert!(matches!(
        PsiIndex::construct(b"tab\x01separated", &IndexOptions::default()),
        Err(psindex::Error::SentinelInInput { offset: 3 })
    ));
}

#[test]
fn serialized_file_round_trip() {
    let text = common::PANGRAMS;
    let index = PsiIndex::construct(text, &IndexOptions::default()).unwrap();
    let mut path = std::env::temp_dir();
    path.push(format!("psindex-round-trip-{}.psi", std::process::id()));
    {
        let mut file = std::io::BufWriter::new(std::fs::File::create(&path).unwrap());
        index.serialize(&mut file).unwrap();
    }
    let mut file = std::io::BufReader::new(std::fs::File::open(&path).unwrap());
    let parsed = PsiIndex::deserialize(&mut file).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(index, parsed);
    assert_eq!(text.to_vec(), parsed.extract(0, text.len()).unwrap());
}
