//! Symbol frequency model.
//!
//! Counts every symbol of a message and orders the alphabet by descending
//! frequency. Ties keep first-occurrence order in the message, so the
//! resulting table (and every code built from it) is a deterministic
//! function of the message.

use crate::error::{Result, SourceError};
use std::collections::HashMap;

/// One row of a frequency table.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolFrequency {
    pub symbol: char,
    /// Occurrences in the source message
    pub count: usize,
    /// `count / total`
    pub probability: f64,
}

/// Symbol probabilities of one message, most frequent first.
///
/// # Invariants
/// - non-empty; every count is at least 1
/// - counts are non-increasing; equal counts keep first-occurrence order
/// - probabilities sum to 1.0 (up to rounding)
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTable {
    entries: Vec<SymbolFrequency>,
    total: usize,
}

impl FrequencyTable {
    /// Build the table for a message.
    ///
    /// # Errors
    /// `SourceError::EmptyInput` if the message has no symbols.
    pub fn from_message(message: &str) -> Result<Self> {
        let mut index: HashMap<char, usize> = HashMap::new();
        let mut counts: Vec<(char, usize)> = Vec::new();

        for symbol in message.chars() {
            match index.get(&symbol) {
                Some(&slot) => counts[slot].1 += 1,
                None => {
                    index.insert(symbol, counts.len());
                    counts.push((symbol, 1));
                }
            }
        }

        if counts.is_empty() {
            return Err(SourceError::EmptyInput.into());
        }

        // Stable sort keeps first-occurrence order among equal counts
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        let total: usize = counts.iter().map(|&(_, c)| c).sum();
        let entries = counts
            .into_iter()
            .map(|(symbol, count)| SymbolFrequency {
                symbol,
                count,
                probability: count as f64 / total as f64,
            })
            .collect();

        Ok(Self { entries, total })
    }

    /// Rows in descending-frequency order.
    pub fn entries(&self) -> &[SymbolFrequency] {
        &self.entries
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: construction rejects empty messages.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total symbol count of the source message.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Probability of `symbol`, or `None` if it never occurred.
    pub fn probability(&self, symbol: char) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.symbol == symbol)
            .map(|e| e.probability)
    }

    /// Shannon entropy in bits per symbol: `Σ p·log2(1/p)`.
    pub fn entropy(&self) -> f64 {
        self.entries
            .iter()
            .map(|e| e.probability * (1.0 / e.probability).log2())
            .sum()
    }
}
