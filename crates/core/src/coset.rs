//! Coset (error-pattern) table for codes without a syndrome locator.
//!
//! For every codeword `c` and every position `j`, the word `c ^ (1 << j)`
//! is filed under its syndrome together with `c`. A received word found in
//! the table is corrected to its codeword. When the code has repeated or
//! zero columns in H, two codewords can reach the same word; such words are
//! marked ambiguous and never corrected.
//!
//! The table depends only on the code, is built once, and is shared
//! read-only by every block and message using that code.

use crate::error::{CodeError, Result};
use crate::gf2::BitMatrix;
use crate::linear_code::LinearCode;
use std::collections::HashMap;

/// Largest k for which the table enumerates all 2^k codewords.
pub const MAX_COSET_K: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Unique(u64),
    Ambiguous,
}

/// Syndrome -> (received word -> codeword) for all single-bit error patterns.
#[derive(Debug, Clone)]
pub struct CosetTable {
    k: usize,
    n: usize,
    /// Parity sub-matrix of the code the table enumerates
    parity: BitMatrix,
    rows: HashMap<u64, HashMap<u64, Entry>>,
    ambiguous: usize,
}

impl CosetTable {
    /// Enumerate every codeword of `code` and its single-bit variants.
    ///
    /// # Errors
    /// `CodeError::CosetTableTooLarge` if `k > MAX_COSET_K`.
    pub fn build(code: &LinearCode) -> Result<Self> {
        let (k, n) = (code.k(), code.n());
        if k > MAX_COSET_K {
            return Err(CodeError::CosetTableTooLarge { k, max: MAX_COSET_K }.into());
        }

        let mut rows: HashMap<u64, HashMap<u64, Entry>> = HashMap::new();
        for data in 0..(1u64 << k) {
            let codeword = code.encode_word(data);
            for pos in 0..n {
                let received = codeword ^ (1 << pos);
                let syndrome = code.syndrome(received);
                // Zero-syndrome variants are themselves codewords
                if syndrome == 0 {
                    continue;
                }
                rows.entry(syndrome)
                    .or_default()
                    .entry(received)
                    .and_modify(|e| {
                        if *e != Entry::Unique(codeword) {
                            *e = Entry::Ambiguous;
                        }
                    })
                    .or_insert(Entry::Unique(codeword));
            }
        }

        let ambiguous = rows
            .values()
            .flat_map(|row| row.values())
            .filter(|&&e| e == Entry::Ambiguous)
            .count();

        tracing::debug!(
            k,
            n,
            syndromes = rows.len(),
            ambiguous,
            "built coset table"
        );

        Ok(Self {
            k,
            n,
            parity: code.parity().clone(),
            rows,
            ambiguous,
        })
    }

    /// Codeword a received word corrects to, if it is an unambiguous
    /// single-bit variant of exactly one codeword.
    pub fn correct(&self, syndrome: u64, received: u64) -> Option<u64> {
        match self.rows.get(&syndrome)?.get(&received)? {
            Entry::Unique(codeword) => Some(*codeword),
            Entry::Ambiguous => None,
        }
    }

    /// True if some single-bit variant carries this syndrome.
    pub fn has_syndrome(&self, syndrome: u64) -> bool {
        self.rows.contains_key(&syndrome)
    }

    /// Number of distinct non-zero syndromes reachable by one flip.
    pub fn syndrome_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of received words reachable from more than one codeword.
    pub fn ambiguous_count(&self) -> usize {
        self.ambiguous
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn n(&self) -> usize {
        self.n
    }

    /// True if the table was built for exactly this code: same dimensions
    /// and same parity sub-matrix.
    pub fn matches(&self, code: &LinearCode) -> bool {
        self.k == code.k() && self.n == code.n() && &self.parity == code.parity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gf2::BitMatrix;

    #[test]
    fn test_canonical_code_fully_resolvable() {
        let code = LinearCode::canonical(4, 7).unwrap();
        let table = CosetTable::build(&code).unwrap();
        assert_eq!(table.syndrome_count(), 7);
        assert_eq!(table.ambiguous_count(), 0);

        let codeword = code.encode_word(0b1010);
        for pos in 0..7 {
            let received = codeword ^ (1 << pos);
            let s = code.syndrome(received);
            assert_eq!(table.correct(s, received), Some(codeword));
        }
    }

    #[test]
    fn test_repeated_columns_are_ambiguous() {
        // Both data columns of H equal 0b01: distance-2 code
        let parity = BitMatrix::from_rows(2, vec![0b01, 0b01]).unwrap();
        let code = LinearCode::with_parity(2, 4, parity).unwrap();
        assert!(!code.corrects_single_errors());

        let table = CosetTable::build(&code).unwrap();
        assert!(table.ambiguous_count() > 0);

        // Flipping data bit 0 of the all-zero codeword looks like flipping
        // data bit 1 of codeword 0b11 -> ambiguous
        let received = 0b0001;
        let s = code.syndrome(received);
        assert_eq!(table.correct(s, received), None);
    }

    #[test]
    fn test_unreachable_syndrome() {
        // Zero parity: every data-bit flip has syndrome 0 and is invisible,
        // only parity flips register
        let parity = BitMatrix::zeros(2, 2).unwrap();
        let code = LinearCode::with_parity(2, 4, parity).unwrap();
        let table = CosetTable::build(&code).unwrap();
        assert!(table.has_syndrome(0b01));
        assert!(table.has_syndrome(0b10));
        assert!(!table.has_syndrome(0b11));
        assert_eq!(table.correct(0b11, 0b1100), None);
    }

    #[test]
    fn test_matches_only_its_own_code() {
        use rand::SeedableRng;
        use rand_chacha::ChaCha8Rng;

        let own = LinearCode::random_parity(8, 13, &mut ChaCha8Rng::seed_from_u64(1)).unwrap();
        let other = LinearCode::random_parity(8, 13, &mut ChaCha8Rng::seed_from_u64(2)).unwrap();
        assert_ne!(own.parity(), other.parity());

        let table = CosetTable::build(&own).unwrap();
        assert!(table.matches(&own));
        assert!(!table.matches(&other));
        assert!(!table.matches(&LinearCode::canonical(8, 13).unwrap()));
        assert_eq!((table.k(), table.n()), (8, 13));
    }

    #[test]
    fn test_too_large() {
        let code = LinearCode::canonical(20, 25).unwrap();
        assert!(matches!(
            CosetTable::build(&code),
            Err(crate::error::Error::Code(CodeError::CosetTableTooLarge { k: 20, .. }))
        ));
    }
}
