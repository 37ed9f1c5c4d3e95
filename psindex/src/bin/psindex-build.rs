//! Build a compressed index over one file.

use std::fs::{read, File};
use std::io::{BufWriter, Write};

use arrrg::CommandLine;
use arrrg_derive::CommandLine;

use psindex::{IndexOptions, PsiIndex};

#[derive(CommandLine, Debug, Eq, PartialEq)]
struct BuildOptions {
    #[arrrg(required, "File to index.", "FILE")]
    input: String,
    #[arrrg(required, "Where to write the index.", "FILE")]
    output: String,
    #[arrrg(nested)]
    index: IndexOptions,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            input: "input".to_string(),
            output: "input.psi".to_string(),
            index: IndexOptions::default(),
        }
    }
}

fn main() {
    let (options, free) = BuildOptions::from_command_line(
        "Usage: psindex-build --input FILE --output FILE [--index-context-len K] [--index-sampling-base B]",
    );
    if !free.is_empty() {
        panic!("free arguments are not accepted");
    }
    let text = read(&options.input).expect("input should read");
    let index = PsiIndex::construct(&text, &options.index).expect("index should construct");
    let mut out = BufWriter::new(File::create(&options.output).expect("output should create"));
    index.serialize(&mut out).expect("index should serialize");
    out.flush().expect("output should flush");
    let metadata = index.metadata();
    println!(
        "indexed {} bytes over {} symbols in {} contexts",
        text.len(),
        metadata.sigma_size,
        metadata.num_contexts
    );
}
