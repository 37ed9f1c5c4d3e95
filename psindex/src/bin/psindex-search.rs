//! Count, locate, or extract against an index built by psindex-build.

use std::fs::File;
use std::io::BufReader;

use arrrg::CommandLine;
use arrrg_derive::CommandLine;

use psindex::{Index, PsiIndex};

#[derive(CommandLine, Debug, Default, Eq, PartialEq)]
struct SearchOptions {
    #[arrrg(required, "Index written by psindex-build.", "FILE")]
    index: String,
    #[arrrg(optional, "Pattern to search for.", "PATTERN")]
    pattern: Option<String>,
    #[arrrg(flag, "Print the number of occurrences rather than their offsets.")]
    count: bool,
    #[arrrg(optional, "Print LEN bytes of text starting at OFF.", "OFF:LEN")]
    extract: Option<String>,
}

fn parse_extract(arg: &str) -> Option<(usize, usize)> {
    let (offset, length) = arg.split_once(':')?;
    Some((offset.parse().ok()?, length.parse().ok()?))
}

fn main() {
    let (options, free) = SearchOptions::from_command_line(
        "Usage: psindex-search --index FILE [--pattern PATTERN [--count]] [--extract OFF:LEN]",
    );
    if !free.is_empty() {
        panic!("free arguments are not accepted");
    }
    let mut input = BufReader::new(File::open(&options.index).expect("index should open"));
    let index = PsiIndex::deserialize(&mut input).expect("index should deserialize");
    if let Some(pattern) = options.pattern.as_ref() {
        if options.count {
            let count = index.count(pattern.as_bytes()).expect("count should succeed");
            println!("{}", count);
        } else {
            let mut offsets = index.search(pattern.as_bytes()).expect("search should succeed");
            offsets.sort();
            for offset in offsets {
                println!("{}", offset);
            }
        }
    }
    if let Some(extract) = options.extract.as_ref() {
        let Some((offset, length)) = parse_extract(extract) else {
            panic!("--extract takes OFF:LEN");
        };
        let text = index.extract(offset, length).expect("extract should succeed");
        println!("{}", String::from_utf8_lossy(&text));
    }
}
