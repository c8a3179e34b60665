//! Shannon-Fano prefix code construction.
//!
//! The alphabet, already sorted by descending frequency, is split into two
//! contiguous groups so that the first group's weight comes as close as
//! possible to half of the total without exceeding it. The first symbol
//! always joins the first group, which keeps both groups non-empty. The
//! first group is labelled `0`, the second `1`, and each group is split
//! again until it holds a single symbol.
//!
//! The splits form a binary tree whose leaves are the symbols, so the
//! resulting codes are prefix-free by construction. Splitting uses the
//! integer counts rather than floating-point probabilities, which keeps the
//! table an exact, deterministic function of the frequency table.

use crate::error::{Result, SourceError};
use crate::frequency::{FrequencyTable, SymbolFrequency};
use std::collections::HashMap;

/// Mapping from symbol to a non-empty, prefix-free binary code.
///
/// # Invariants
/// - at least one entry
/// - symbols are unique, every code is non-empty
/// - no code is a prefix of another
///
/// Tables produced by [`build`] satisfy these by construction. Tables
/// received from elsewhere go through [`CodeTable::from_entries`], which
/// checks them.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeTable {
    entries: Vec<(char, Vec<bool>)>,
    index: HashMap<char, usize>,
}

impl CodeTable {
    /// Validate and wrap externally supplied entries.
    ///
    /// # Errors
    /// `SourceError::MalformedCodeTable` if the table is empty, has an empty
    /// code, repeats a symbol, or is not prefix-free.
    pub fn from_entries(entries: Vec<(char, Vec<bool>)>) -> Result<Self> {
        if entries.is_empty() {
            return Err(malformed("table has no entries"));
        }

        let mut index = HashMap::with_capacity(entries.len());
        for (slot, (symbol, code)) in entries.iter().enumerate() {
            if code.is_empty() {
                return Err(malformed(format!("symbol {symbol:?} has an empty code")));
            }
            if index.insert(*symbol, slot).is_some() {
                return Err(malformed(format!("symbol {symbol:?} appears twice")));
            }
        }

        // In lexicographic order every extension of a code sorts right after it
        let mut codes: Vec<&Vec<bool>> = entries.iter().map(|(_, code)| code).collect();
        codes.sort();
        for pair in codes.windows(2) {
            if pair[1].starts_with(pair[0]) {
                return Err(malformed(format!(
                    "code {} is a prefix of {}",
                    crate::bits::format_bits(pair[0]),
                    crate::bits::format_bits(pair[1])
                )));
            }
        }

        Ok(Self { entries, index })
    }

    /// Code assigned to `symbol`.
    pub fn code(&self, symbol: char) -> Option<&[bool]> {
        self.index
            .get(&symbol)
            .map(|&slot| self.entries[slot].1.as_slice())
    }

    /// Entries in construction order (most frequent symbol first for built tables).
    pub fn entries(&self) -> &[(char, Vec<bool>)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Length of the longest code.
    pub fn max_code_len(&self) -> usize {
        self.entries.iter().map(|(_, c)| c.len()).max().unwrap_or(0)
    }

    /// Expected code length in bits per symbol under `frequencies`.
    ///
    /// Symbols missing from the table contribute nothing.
    pub fn average_length(&self, frequencies: &FrequencyTable) -> f64 {
        frequencies
            .entries()
            .iter()
            .filter_map(|e| self.code(e.symbol).map(|c| e.probability * c.len() as f64))
            .sum()
    }
}

fn malformed(reason: impl Into<String>) -> crate::error::Error {
    SourceError::MalformedCodeTable(reason.into()).into()
}

/// Split tree over a slice of the sorted alphabet.
enum Node {
    Leaf(usize),
    Split(Box<Node>, Box<Node>),
}

impl Node {
    /// Build the tree for `group`, whose first symbol sits at `offset` in the alphabet.
    fn build(group: &[SymbolFrequency], offset: usize) -> Node {
        if group.len() <= 1 {
            return Node::Leaf(offset);
        }
        let split = split_point(group);
        let (head, tail) = group.split_at(split);
        Node::Split(
            Box::new(Node::build(head, offset)),
            Box::new(Node::build(tail, offset + split)),
        )
    }

    fn collect(&self, prefix: &mut Vec<bool>, codes: &mut [Vec<bool>]) {
        match self {
            Node::Leaf(slot) => codes[*slot] = prefix.clone(),
            Node::Split(zero, one) => {
                prefix.push(false);
                zero.collect(prefix, codes);
                prefix.pop();
                prefix.push(true);
                one.collect(prefix, codes);
                prefix.pop();
            }
        }
    }
}

/// Length of the first group: the longest prefix (at least one symbol)
/// whose weight does not exceed half the group total.
fn split_point(group: &[SymbolFrequency]) -> usize {
    let total: usize = group.iter().map(|e| e.count).sum();
    let mut running = group[0].count;
    let mut split = 1;
    while split < group.len() && 2 * (running + group[split].count) <= total {
        running += group[split].count;
        split += 1;
    }
    // Counts are positive, so the last symbol never fits under half
    debug_assert!(split < group.len());
    split
}

/// Build the Shannon-Fano code table for a frequency table.
///
/// A single-symbol alphabet gets the one-bit code `0` so every code stays
/// non-empty.
pub fn build(frequencies: &FrequencyTable) -> CodeTable {
    let alphabet = frequencies.entries();
    let mut codes = vec![Vec::new(); alphabet.len()];

    if alphabet.len() == 1 {
        codes[0].push(false);
    } else {
        Node::build(alphabet, 0).collect(&mut Vec::new(), &mut codes);
    }

    let entries: Vec<(char, Vec<bool>)> = alphabet
        .iter()
        .map(|e| e.symbol)
        .zip(codes)
        .collect();
    let index = entries
        .iter()
        .enumerate()
        .map(|(slot, (symbol, _))| (*symbol, slot))
        .collect();

    tracing::debug!(
        symbols = entries.len(),
        max_code_len = entries.iter().map(|(_, c)| c.len()).max().unwrap_or(0),
        "built Shannon-Fano code table"
    );

    CodeTable { entries, index }
}
