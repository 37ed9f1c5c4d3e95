use std::fs::read;

use buffertk::Unpackable;

use psindex::PsiIndex;

fn main() {
    for file in std::env::args().skip(1) {
        let data = read(&file).expect("should be able to read file");
        let (index, rem) = PsiIndex::unpack(&data).expect("should be able to parse index");
        println!("{}", file);
        println!("{:#?}", index.metadata());
        println!("alphabet: {:?}", index.alphabet());
        println!("contexts: {}", index.context_codes().len());
        if !rem.is_empty() {
            println!("{} trailing bytes", rem.len());
        }
    }
}
