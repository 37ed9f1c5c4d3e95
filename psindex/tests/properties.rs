extern crate psindex;

use proptest::prelude::*;

use psindex::{Index, IndexOptions, PsiIndex, ReferenceIndex};

prop_compose! {
    /// Texts over a handful of symbols, including byte 0 and byte 255, so patterns recur often.
    fn arb_text()(text in proptest::collection::vec(proptest::sample::select(vec![0u8, b'a', b'b', b'c', b'n', 0xff]), 0..128)) -> Vec<u8> {
        text
    }
}

prop_compose! {
    fn arb_options()(context_len in 1u32..6, sampling_base in 0u32..6) -> IndexOptions {
        IndexOptions::default().context_len(context_len).sampling_base(sampling_base)
    }
}

prop_compose! {
    fn arb_pattern()(pattern in proptest::collection::vec(proptest::sample::select(vec![0u8, b'a', b'b', b'c', b'x']), 1..5)) -> Vec<u8> {
        pattern
    }
}

proptest! {
    #[test]
    fn extract_reproduces_text(text in arb_text(), options in arb_options()) {
        let index = PsiIndex::construct(&text, &options).unwrap();
        prop_assert_eq!(&text, &index.extract(0, text.len()).unwrap());
        for offset in 0..text.len() {
            prop_assert_eq!(&text[offset..], &index.extract(offset, text.len() - offset).unwrap()[..]);
        }
    }

    #[test]
    fn sa_and_isa_are_inverses(text in arb_text(), options in arb_options()) {
        let index = PsiIndex::construct(&text, &options).unwrap();
        let n = text.len() + 1;
        for i in 0..n {
            prop_assert_eq!(i, index.lookup_sa(index.lookup_isa(i).unwrap()).unwrap());
            prop_assert_eq!(i, index.lookup_isa(index.lookup_sa(i).unwrap()).unwrap());
        }
    }

    #[test]
    fn psi_follows_the_text(text in arb_text(), options in arb_options()) {
        let index = PsiIndex::construct(&text, &options).unwrap();
        let n = text.len() + 1;
        for i in 0..n {
            let next = (index.lookup_sa(i).unwrap() + 1) % n;
            prop_assert_eq!(index.lookup_isa(next).unwrap(), index.lookup_npa(i).unwrap());
        }
    }

    #[test]
    fn count_and_search_agree(text in arb_text(), options in arb_options(), pattern in arb_pattern()) {
        let index = PsiIndex::construct(&text, &options).unwrap();
        let reference = ReferenceIndex::new(&text);
        let mut expected = reference.search(&pattern).unwrap();
        let mut returned = index.search(&pattern).unwrap();
        expected.sort();
        returned.sort();
        prop_assert_eq!(index.count(&pattern).unwrap(), returned.len());
        prop_assert_eq!(expected, returned);
    }

    #[test]
    fn every_occurrence_is_found(text in arb_text(), options in arb_options()) {
        let index = PsiIndex::construct(&text, &options).unwrap();
        for offset in 0..text.len() {
            for len in 1..4.min(text.len() - offset + 1) {
                let pattern = &text[offset..offset + len];
                let found = index.search(pattern).unwrap();
                prop_assert!(found.contains(&offset));
                for pos in found {
                    prop_assert_eq!(pattern, &text[pos..pos + len]);
                }
            }
        }
    }

    #[test]
    fn serialization_is_faithful(text in arb_text(), options in arb_options(), pattern in arb_pattern()) {
        let index = PsiIndex::construct(&text, &options).unwrap();
        let mut buf = vec![];
        index.serialize(&mut buf).unwrap();
        let parsed = PsiIndex::deserialize(&mut &buf[..]).unwrap();
        let mut again = vec![];
        parsed.serialize(&mut again).unwrap();
        prop_assert_eq!(&buf, &again);
        prop_assert_eq!(index.count(&pattern).unwrap(), parsed.count(&pattern).unwrap());
        for i in 0..text.len() + 1 {
            prop_assert_eq!(index.lookup_npa(i).unwrap(), parsed.lookup_npa(i).unwrap());
            prop_assert_eq!(index.lookup_sa(i).unwrap(), parsed.lookup_sa(i).unwrap());
        }
    }

    #[test]
    fn isa_walks_stay_below_the_sampling_rate(text in arb_text(), options in arb_options()) {
        let index = PsiIndex::construct(&text, &options).unwrap();
        let rate = options.sampling_rate();
        for i in 0..text.len() + 1 {
            let (_, hops) = index.lookup_isa_with_hops(i).unwrap();
            prop_assert!(hops < rate);
            let (_, hops) = index.lookup_sa_with_hops(i).unwrap();
            prop_assert!(hops <= text.len());
        }
    }

    #[test]
    fn extract_until_stops_at_delimiter(text in arb_text(), offset in 0usize..128, delimiter in proptest::sample::select(vec![0u8, b'a', b'x'])) {
        let offset = offset.min(text.len());
        let index = PsiIndex::construct(&text, &IndexOptions::default()).unwrap();
        let expected: Vec<u8> = text[offset..].iter().copied().take_while(|c| *c != delimiter).collect();
        prop_assert_eq!(expected, index.extract_until(offset, delimiter).unwrap());
    }
}
