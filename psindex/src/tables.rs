//! Lookup tables shared by every bitmap in the process.

use std::sync::OnceLock;

/// SELECT_IN_BYTE[b][r] is the bit position of the r'th set bit of b, or 8 when b has fewer than
/// r + 1 bits set.
static SELECT_IN_BYTE: OnceLock<[[u8; 8]; 256]> = OnceLock::new();

/// Return the select-in-byte table, building it on first use.
pub fn select_in_byte() -> &'static [[u8; 8]; 256] {
    SELECT_IN_BYTE.get_or_init(|| {
        let mut table = [[8u8; 8]; 256];
        for (byte, row) in table.iter_mut().enumerate() {
            let mut r = 0;
            for bit in 0..8 {
                if byte & (1 << bit) != 0 {
                    row[r] = bit as u8;
                    r += 1;
                }
            }
        }
        table
    })
}

/// Position of the r'th (zero-based) set bit within word, or None if word has too few set bits.
pub fn select_in_word(word: u64, mut r: usize) -> Option<usize> {
    let table = select_in_byte();
    for idx in 0..8 {
        let byte = ((word >> (idx * 8)) & 0xff) as usize;
        let ones = byte.count_ones() as usize;
        if r < ones {
            return Some(idx * 8 + table[byte][r] as usize);
        }
        r -= ones;
    }
    None
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////
