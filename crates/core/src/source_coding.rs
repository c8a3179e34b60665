//! Entropy coder: symbols to bits and back through a [`CodeTable`].

use crate::error::{Result, SourceError};
use crate::shannon_fano::CodeTable;
use std::collections::HashMap;

/// Concatenate the code of every symbol of `message`, in order.
///
/// # Errors
/// - `SourceError::EmptyInput` for an empty message
/// - `SourceError::UnknownSymbol` if a symbol has no table entry
pub fn compress(message: &str, table: &CodeTable) -> Result<Vec<bool>> {
    if message.is_empty() {
        return Err(SourceError::EmptyInput.into());
    }

    let mut bits = Vec::with_capacity(message.len() * table.max_code_len());
    for (position, symbol) in message.chars().enumerate() {
        let code = table
            .code(symbol)
            .ok_or(SourceError::UnknownSymbol { symbol, position })?;
        bits.extend_from_slice(code);
    }
    Ok(bits)
}

/// Result of a lenient decompression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decompressed {
    /// Every symbol whose code was matched completely
    pub message: String,
    /// Bits left in the match buffer when the input ran out
    pub trailing_bits: usize,
}

/// Decode `bits` and report, rather than reject, unmatched trailing bits.
///
/// Bits accumulate in a buffer; whenever the buffer equals a code, its
/// symbol is emitted and the buffer resets. The prefix-free invariant
/// makes the first match the only possible one. A buffer longer than the
/// longest code stops the scan, and everything from its start is reported
/// as trailing.
pub fn decompress_lenient(bits: &[bool], table: &CodeTable) -> Decompressed {
    let reverse: HashMap<&[bool], char> = table
        .entries()
        .iter()
        .map(|(symbol, code)| (code.as_slice(), *symbol))
        .collect();

    let max_len = table.max_code_len();
    let mut message = String::new();
    let mut start = 0;
    for end in 1..=bits.len() {
        if end - start > max_len {
            // No code is this long; nothing after `start` can match
            break;
        }
        if let Some(&symbol) = reverse.get(&bits[start..end]) {
            message.push(symbol);
            start = end;
        }
    }

    let trailing_bits = bits.len() - start;
    if trailing_bits > 0 {
        tracing::warn!(trailing_bits, "decompression left unmatched bits");
    }

    Decompressed {
        message,
        trailing_bits,
    }
}

/// Decode `bits` into symbols.
///
/// # Errors
/// `SourceError::TrailingBits` if the input ends partway through a code.
/// Use [`decompress_lenient`] to keep the decoded prefix instead.
pub fn decompress(bits: &[bool], table: &CodeTable) -> Result<String> {
    let decoded = decompress_lenient(bits, table);
    if decoded.trailing_bits > 0 {
        return Err(SourceError::TrailingBits {
            bits: decoded.trailing_bits,
        }
        .into());
    }
    Ok(decoded.message)
}
