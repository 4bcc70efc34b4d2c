//! Weighted alignment matrix
//!
//! Row 0 and column 0 are not the classical `0, 1, 2, ...` Levenshtein
//! boundary. Cell `[0][1]` and `[1][0]` both hold the cost between the two
//! sequences' first symbols; from there each boundary accumulates the cost
//! between consecutive symbols of its own sequence.

use crate::inventory::{CostModel, Phoneme};

/// Dense `(len(seq2) + 1) x (len(seq1) + 1)` cost matrix.
///
/// Cell `[i][j]` holds the minimum accumulated phonetic cost of turning the
/// first `j` symbols of sequence 1 into the first `i` symbols of sequence 2.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentMatrix {
    rows: usize,
    cols: usize,
    cells: Vec<f64>,
}

impl AlignmentMatrix {
    /// Fill the matrix for `seq1` (columns) against `seq2` (rows).
    pub(crate) fn compute<C>(
        seq1: &[&Phoneme],
        seq2: &[&Phoneme],
        model: &C,
        transposition: bool,
    ) -> Self
    where
        C: CostModel + ?Sized,
    {
        let m = seq1.len();
        let n = seq2.len();
        let rows = n + 1;
        let cols = m + 1;
        tracing::trace!(rows, cols, model = model.name(), "filling alignment matrix");

        let mut matrix = Self {
            rows,
            cols,
            cells: vec![0.0; rows * cols],
        };

        let seed = match (seq1.first(), seq2.first()) {
            (Some(a), Some(b)) => model.cost(a, b),
            _ => 0.0,
        };

        if m > 0 {
            matrix.set(0, 1, seed);
            for j in 2..=m {
                let chained = matrix.get(0, j - 1) + model.cost(seq1[j - 2], seq1[j - 1]);
                matrix.set(0, j, chained);
            }
        }
        if n > 0 {
            matrix.set(1, 0, seed);
            for i in 2..=n {
                let chained = matrix.get(i - 1, 0) + model.cost(seq2[i - 2], seq2[i - 1]);
                matrix.set(i, 0, chained);
            }
        }

        for i in 1..=n {
            for j in 1..=m {
                let cost = model.cost(seq1[j - 1], seq2[i - 1]);

                let mut best = matrix
                    .get(i - 1, j) // deletion
                    .min(matrix.get(i, j - 1)) // insertion
                    .min(matrix.get(i - 1, j - 1)); // substitution

                if transposition && is_swap(seq1, seq2, i, j) {
                    best = best.min(matrix.get(i - 2, j - 2));
                }

                matrix.set(i, j, best + cost);
            }
        }

        matrix
    }

    /// Number of rows, `len(seq2) + 1`
    #[inline]
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns, `len(seq1) + 1`
    #[inline]
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Value at row `i`, column `j`.
    ///
    /// # Panics
    ///
    /// Panics if the cell is outside the matrix.
    #[inline]
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.rows && j < self.cols, "cell ({i}, {j}) out of bounds");
        self.cells[i * self.cols + j]
    }

    #[inline]
    fn set(&mut self, i: usize, j: usize, value: f64) {
        self.cells[i * self.cols + j] = value;
    }

    /// One row as a slice
    #[must_use]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.cells[i * self.cols..(i + 1) * self.cols]
    }

    /// The bottom-right cell: the weighted distance
    #[inline]
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.cells[self.cells.len() - 1]
    }
}

/// Whether the two symbols ending at `(i, j)` are an adjacent swap
#[inline]
pub(crate) fn is_swap(seq1: &[&Phoneme], seq2: &[&Phoneme], i: usize, j: usize) -> bool {
    i > 1
        && j > 1
        && seq1[j - 1].id() == seq2[i - 2].id()
        && seq1[j - 2].id() == seq2[i - 1].id()
}
