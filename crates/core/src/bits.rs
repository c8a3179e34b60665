//! Bit sequence helpers.
//!
//! A bit sequence is a plain `Vec<bool>` / `&[bool]`: the exchange type
//! between every pipeline stage. These helpers convert between bit
//! sequences, `0`/`1` strings and fixed-width unsigned integers.
//! Integers are always laid out most-significant bit first.

/// Render bits as a string of `0` and `1` characters.
pub fn format_bits(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

/// Parse a string of `0` and `1` characters.
///
/// Returns `None` if any other character is present.
pub fn parse_bits(s: &str) -> Option<Vec<bool>> {
    s.chars()
        .map(|c| match c {
            '0' => Some(false),
            '1' => Some(true),
            _ => None,
        })
        .collect()
}

/// Number of bits needed to represent `value` (0 needs 0 bits).
pub fn bit_width(value: usize) -> usize {
    (usize::BITS - value.leading_zeros()) as usize
}

/// Append `value` as `width` bits, MSB first.
///
/// Bits of `value` above `width` are ignored; callers check for overflow.
pub fn push_uint(out: &mut Vec<bool>, value: u64, width: usize) {
    for shift in (0..width).rev() {
        out.push(shift < 64 && (value >> shift) & 1 == 1);
    }
}

/// Read an MSB-first unsigned integer from up to 64 bits.
pub fn read_uint(bits: &[bool]) -> u64 {
    bits.iter().fold(0u64, |acc, &b| (acc << 1) | b as u64)
}

/// Pack a block of at most 64 bits into a word, bit `j` of the block at bit `j` of the word.
pub(crate) fn block_to_word(block: &[bool]) -> u64 {
    debug_assert!(block.len() <= 64);
    block
        .iter()
        .enumerate()
        .fold(0u64, |acc, (j, &b)| acc | ((b as u64) << j))
}

/// Inverse of [`block_to_word`], appending `len` bits to `out`.
pub(crate) fn word_to_block(word: u64, len: usize, out: &mut Vec<bool>) {
    out.extend((0..len).map(|j| (word >> j) & 1 == 1));
}
