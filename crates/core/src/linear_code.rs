//! Systematic binary linear block codes.
//!
//! A `(n, k)` code is described by its k × (n−k) parity sub-matrix `P`:
//!
//! ```text
//! G = [ I(k) | P  ]        k × n
//! H = [ Pᵗ | I(n−k) ]      (n−k) × n
//! ```
//!
//! so `G·Hᵗ = P + P = 0` and every codeword `c = d·G` has syndrome
//! `H·cᵗ = 0`. Codewords are packed into a `u64` with block bit `j` at
//! bit `j`; the first k bits of a codeword are the data block.
//!
//! # Constructions
//!
//! - [`Construction::Canonical`] (default): column `j` of `H` is a distinct
//!   non-zero r-bit value, `r = n−k`. Parity positions take the powers of
//!   two (the identity block), data positions take the remaining values in
//!   ascending order. Any single flipped bit yields the syndrome equal to
//!   its column, so the syndrome names the error position directly and the
//!   code has minimum distance 3. Requires `2^r − 1 ≥ n`.
//! - [`Construction::RandomParity`]: `P` is drawn at random. Columns of `H`
//!   may repeat or vanish, so there is no closed-form locator and the
//!   minimum distance may drop below 3. Decoding goes through a
//!   [`CosetTable`](crate::coset::CosetTable) and may report blocks as
//!   uncorrectable. The parity matrix must travel with the message; it is
//!   never regenerated by the decoder.

use crate::error::{CodeError, Result};
use crate::gf2::{BitMatrix, MAX_COLS};
use rand::Rng;
use std::collections::HashMap;

/// How the parity sub-matrix was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construction {
    /// Hamming-style column assignment with a syndrome locator
    Canonical,
    /// Explicit, usually random, parity matrix; decoded via coset table
    RandomParity,
}

/// A systematic `(n, k)` linear block code with its G and H matrices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearCode {
    k: usize,
    n: usize,
    construction: Construction,
    parity: BitMatrix,
    generator: BitMatrix,
    parity_check: BitMatrix,
    /// Syndrome value -> flipped position (canonical construction only)
    locator: HashMap<u64, usize>,
}

impl LinearCode {
    /// Canonical single-error-correcting code.
    ///
    /// # Errors
    /// - `CodeError::InvalidParameters` unless `1 <= k < n <= 64`
    /// - `CodeError::InsufficientParity` if `2^(n-k) - 1 < n`
    pub fn canonical(k: usize, n: usize) -> Result<Self> {
        check_dimensions(k, n)?;
        let r = n - k;
        if r < usize::BITS as usize && (1usize << r) - 1 < n {
            return Err(CodeError::InsufficientParity { k, n }.into());
        }

        let data_columns: Vec<u64> = (1u64..)
            .filter(|v| !v.is_power_of_two())
            .take(k)
            .collect();
        let parity = BitMatrix::from_rows(r, data_columns)?;

        let mut code = Self::assemble(k, n, Construction::Canonical, parity)?;
        code.locator = (0..n)
            .map(|pos| (code.parity_check.column(pos), pos))
            .collect();

        tracing::debug!(k, n, "built canonical linear code");
        Ok(code)
    }

    /// Code with a uniformly random parity sub-matrix.
    ///
    /// Lower guarantee than [`LinearCode::canonical`]: single errors are
    /// only correctable where the coset table resolves them uniquely.
    pub fn random_parity<R: Rng + ?Sized>(k: usize, n: usize, rng: &mut R) -> Result<Self> {
        check_dimensions(k, n)?;
        let r = n - k;
        let mask = if r == 64 { u64::MAX } else { (1u64 << r) - 1 };
        let rows = (0..k).map(|_| rng.gen::<u64>() & mask).collect();
        let parity = BitMatrix::from_rows(r, rows)?;

        tracing::debug!(k, n, "built random-parity linear code");
        Self::assemble(k, n, Construction::RandomParity, parity)
    }

    /// Rebuild a random-parity code from its transmitted parity sub-matrix.
    ///
    /// # Errors
    /// `CodeError::DimensionMismatch` unless `parity` is k × (n−k).
    pub fn with_parity(k: usize, n: usize, parity: BitMatrix) -> Result<Self> {
        check_dimensions(k, n)?;
        Self::assemble(k, n, Construction::RandomParity, parity)
    }

    fn assemble(k: usize, n: usize, construction: Construction, parity: BitMatrix) -> Result<Self> {
        if parity.rows() != k || parity.cols() != n - k {
            return Err(CodeError::DimensionMismatch {
                expected_rows: k,
                expected_cols: n - k,
                rows: parity.rows(),
                cols: parity.cols(),
            }
            .into());
        }

        let generator = BitMatrix::identity(k)?.augment(&parity)?;
        let parity_check = parity.transpose()?.augment(&BitMatrix::identity(n - k)?)?;

        Ok(Self {
            k,
            n,
            construction,
            parity,
            generator,
            parity_check,
            locator: HashMap::new(),
        })
    }

    /// Data bits per block.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Codeword bits per block.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Parity bits per block, `n − k`.
    pub fn redundancy(&self) -> usize {
        self.n - self.k
    }

    pub fn construction(&self) -> Construction {
        self.construction
    }

    /// Parity sub-matrix P (k × (n−k)).
    pub fn parity(&self) -> &BitMatrix {
        &self.parity
    }

    /// Generator matrix G = [I | P].
    pub fn generator(&self) -> &BitMatrix {
        &self.generator
    }

    /// Parity-check matrix H = [Pᵗ | I].
    pub fn parity_check(&self) -> &BitMatrix {
        &self.parity_check
    }

    /// Code rate k/n.
    pub fn rate(&self) -> f64 {
        self.k as f64 / self.n as f64
    }

    /// Encode a k-bit data word into an n-bit codeword (`d·G`).
    pub fn encode_word(&self, data: u64) -> u64 {
        self.generator.vec_mul(data)
    }

    /// Syndrome `H·wᵗ` of a received n-bit word.
    pub fn syndrome(&self, word: u64) -> u64 {
        self.parity_check.mul_vec(word)
    }

    /// Leading k data bits of a codeword.
    pub fn data_word(&self, word: u64) -> u64 {
        if self.k == 64 {
            word
        } else {
            word & ((1u64 << self.k) - 1)
        }
    }

    /// Position whose single flip produces `syndrome`, for canonical codes.
    pub fn locate(&self, syndrome: u64) -> Option<usize> {
        self.locator.get(&syndrome).copied()
    }

    /// True if every column of H is non-zero and distinct, i.e. the code
    /// has minimum distance at least 3.
    pub fn corrects_single_errors(&self) -> bool {
        let mut seen = std::collections::HashSet::with_capacity(self.n);
        (0..self.n).all(|j| {
            let col = self.parity_check.column(j);
            col != 0 && seen.insert(col)
        })
    }

    /// Check `G·Hᵗ = 0`.
    pub fn is_consistent(&self) -> bool {
        self.parity_check
            .transpose()
            .and_then(|ht| self.generator.mul(&ht))
            .map(|product| product.is_zero())
            .unwrap_or(false)
    }
}

fn check_dimensions(k: usize, n: usize) -> Result<()> {
    let reason = if k == 0 {
        "k must be at least 1"
    } else if n <= k {
        "n must exceed k"
    } else if n > MAX_COLS {
        "n must be at most 64"
    } else {
        return Ok(());
    };
    Err(CodeError::InvalidParameters {
        k,
        n,
        reason: reason.to_string(),
    }
    .into())
}

/// Build the canonical `(n, k)` code.
pub fn build_linear_code(k: usize, n: usize) -> Result<LinearCode> {
    LinearCode::canonical(k, n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_hamming_15_11_structure() {
        let code = LinearCode::canonical(11, 15).unwrap();
        assert_eq!(code.generator().rows(), 11);
        assert_eq!(code.generator().cols(), 15);
        assert_eq!(code.parity_check().rows(), 4);
        assert_eq!(code.parity_check().cols(), 15);
        assert!(code.is_consistent());
        assert!(code.corrects_single_errors());

        let columns: Vec<u64> = (0..15).map(|j| code.parity_check().column(j)).collect();
        assert_eq!(columns, vec![3, 5, 6, 7, 9, 10, 11, 12, 13, 14, 15, 1, 2, 4, 8]);
    }

    #[test]
    fn test_generator_identity_block() {
        let code = LinearCode::canonical(4, 7).unwrap();
        for i in 0..4 {
            for j in 0..4 {
                assert_eq!(code.generator().get(i, j), i == j);
            }
        }
        assert_eq!(code.data_word(code.encode_word(0b1011)), 0b1011);
    }

    #[test]
    fn test_codewords_have_zero_syndrome() {
        let code = LinearCode::canonical(11, 15).unwrap();
        for data in 0..(1u64 << 11) {
            assert_eq!(code.syndrome(code.encode_word(data)), 0);
        }
    }

    #[test]
    fn test_encoding_injective() {
        let code = LinearCode::canonical(4, 7).unwrap();
        let mut words: Vec<u64> = (0..16).map(|d| code.encode_word(d)).collect();
        words.sort();
        words.dedup();
        assert_eq!(words.len(), 16);
    }

    #[test]
    fn test_locator_names_every_position() {
        let code = LinearCode::canonical(11, 15).unwrap();
        let word = code.encode_word(0b101_1001_0110);
        for pos in 0..15 {
            let s = code.syndrome(word ^ (1 << pos));
            assert_ne!(s, 0);
            assert_eq!(code.locate(s), Some(pos));
        }
    }

    #[test]
    fn test_shortened_code_leaves_unused_syndromes() {
        // (10, 6): 4 parity bits, 15 syndromes for 10 positions
        let code = LinearCode::canonical(6, 10).unwrap();
        assert!(code.corrects_single_errors());
        assert_eq!(code.locate(15), None);
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(
            LinearCode::canonical(11, 15).unwrap(),
            build_linear_code(11, 15).unwrap()
        );
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(LinearCode::canonical(0, 3).is_err());
        assert!(LinearCode::canonical(5, 5).is_err());
        assert!(LinearCode::canonical(60, 65).is_err());
        assert!(matches!(
            LinearCode::canonical(12, 15),
            Err(crate::error::Error::Code(CodeError::InsufficientParity { k: 12, n: 15 }))
        ));
    }

    #[test]
    fn test_random_parity_is_consistent_and_reproducible() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let code = LinearCode::random_parity(8, 12, &mut rng).unwrap();
        assert_eq!(code.construction(), Construction::RandomParity);
        assert!(code.is_consistent());
        assert_eq!(code.locate(1), None);

        let rebuilt = LinearCode::with_parity(8, 12, code.parity().clone()).unwrap();
        assert_eq!(rebuilt, code);
    }

    #[test]
    fn test_with_parity_dimension_mismatch() {
        let parity = BitMatrix::zeros(3, 4).unwrap();
        assert!(matches!(
            LinearCode::with_parity(8, 12, parity),
            Err(crate::error::Error::Code(CodeError::DimensionMismatch { .. }))
        ));
    }
}
