//! Dense matrices over GF(2).
//!
//! Addition is XOR and multiplication is AND. Each row is packed into a
//! `u64` with column `j` at bit `j`, which bounds matrices to 64 columns;
//! block codes here never need more.

use crate::error::{CodeError, Result};

/// Maximum number of columns a [`BitMatrix`] can hold.
pub const MAX_COLS: usize = 64;

/// Dense GF(2) matrix with u64-packed rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    n_rows: usize,
    n_cols: usize,
    rows: Vec<u64>,
}

impl BitMatrix {
    /// All-zero matrix.
    pub fn zeros(n_rows: usize, n_cols: usize) -> Result<Self> {
        if n_cols > MAX_COLS {
            return Err(CodeError::InvalidParameters {
                k: n_rows,
                n: n_cols,
                reason: format!("at most {MAX_COLS} columns are supported"),
            }
            .into());
        }
        Ok(Self {
            n_rows,
            n_cols,
            rows: vec![0; n_rows],
        })
    }

    /// Identity matrix of size `n`.
    pub fn identity(n: usize) -> Result<Self> {
        let mut m = Self::zeros(n, n)?;
        for i in 0..n {
            m.rows[i] = 1 << i;
        }
        Ok(m)
    }

    /// Build from packed rows; bits above `n_cols` must be clear.
    pub fn from_rows(n_cols: usize, rows: Vec<u64>) -> Result<Self> {
        let mut m = Self::zeros(0, n_cols)?;
        let mask = m.col_mask();
        if let Some(&bad) = rows.iter().find(|&&r| r & !mask != 0) {
            return Err(CodeError::InvalidParameters {
                k: rows.len(),
                n: n_cols,
                reason: format!("row {bad:#x} has bits beyond column {n_cols}"),
            }
            .into());
        }
        m.n_rows = rows.len();
        m.rows = rows;
        Ok(m)
    }

    pub fn rows(&self) -> usize {
        self.n_rows
    }

    pub fn cols(&self) -> usize {
        self.n_cols
    }

    /// Packed row `i`.
    pub fn row(&self, i: usize) -> u64 {
        self.rows[i]
    }

    /// All packed rows.
    pub fn packed_rows(&self) -> &[u64] {
        &self.rows
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        row < self.n_rows && col < self.n_cols && (self.rows[row] >> col) & 1 == 1
    }

    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        debug_assert!(row < self.n_rows && col < self.n_cols);
        if value {
            self.rows[row] |= 1 << col;
        } else {
            self.rows[row] &= !(1 << col);
        }
    }

    /// Packed column `j`, row `i` at bit `i` (requires at most 64 rows).
    pub fn column(&self, col: usize) -> u64 {
        self.rows
            .iter()
            .enumerate()
            .fold(0u64, |acc, (i, &r)| acc | (((r >> col) & 1) << i))
    }

    pub fn transpose(&self) -> Result<Self> {
        let mut t = Self::zeros(self.n_cols, self.n_rows)?;
        for j in 0..self.n_cols {
            t.rows[j] = self.column(j);
        }
        Ok(t)
    }

    /// Horizontal concatenation `[self | other]`.
    pub fn augment(&self, other: &BitMatrix) -> Result<Self> {
        if self.n_rows != other.n_rows {
            return Err(CodeError::DimensionMismatch {
                expected_rows: self.n_rows,
                expected_cols: other.n_cols,
                rows: other.n_rows,
                cols: other.n_cols,
            }
            .into());
        }
        let mut m = Self::zeros(self.n_rows, self.n_cols + other.n_cols)?;
        for i in 0..self.n_rows {
            m.rows[i] = self.rows[i] | (other.rows[i] << self.n_cols);
        }
        Ok(m)
    }

    /// Row vector times matrix: XOR of the rows selected by the bits of `v`.
    pub fn vec_mul(&self, v: u64) -> u64 {
        self.rows
            .iter()
            .enumerate()
            .filter(|&(i, _)| (v >> i) & 1 == 1)
            .fold(0, |acc, (_, &r)| acc ^ r)
    }

    /// Matrix times column vector: bit `i` is the parity of `row_i & v`.
    pub fn mul_vec(&self, v: u64) -> u64 {
        self.rows
            .iter()
            .enumerate()
            .fold(0, |acc, (i, &r)| acc | (((r & v).count_ones() as u64 & 1) << i))
    }

    /// Matrix product `self · other`.
    pub fn mul(&self, other: &BitMatrix) -> Result<Self> {
        if self.n_cols != other.n_rows {
            return Err(CodeError::DimensionMismatch {
                expected_rows: self.n_cols,
                expected_cols: other.n_cols,
                rows: other.n_rows,
                cols: other.n_cols,
            }
            .into());
        }
        let mut m = Self::zeros(self.n_rows, other.n_cols)?;
        for i in 0..self.n_rows {
            m.rows[i] = other.vec_mul(self.rows[i]);
        }
        Ok(m)
    }

    pub fn is_zero(&self) -> bool {
        self.rows.iter().all(|&r| r == 0)
    }

    fn col_mask(&self) -> u64 {
        if self.n_cols == 64 {
            u64::MAX
        } else {
            (1u64 << self.n_cols) - 1
        }
    }
}

impl std::fmt::Display for BitMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for i in 0..self.n_rows {
            for j in 0..self.n_cols {
                f.write_str(if self.get(i, j) { "1" } else { "0" })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
