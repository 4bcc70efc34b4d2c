//! Alignment reconstruction from a filled matrix
//!
//! Starting at the bottom-right cell, the walk repeatedly steps to the
//! cheapest valid predecessor until it reaches `(0, 0)`. Ties are broken by
//! a fixed preference: substitute, then delete, then insert, then transpose.

use super::matrix::{is_swap, AlignmentMatrix};
use crate::inventory::Phoneme;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Two cell values closer than this are treated as equal when labelling a
/// step "same"
const COST_EPSILON: f64 = 1e-12;

/// Edit operation attached to one alignment step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditOp {
    /// The step added no cost
    Same,
    /// Consumed one symbol of sequence 1 only (move from `[i][j-1]`)
    Insert,
    /// Consumed one symbol of sequence 2 only (move from `[i-1][j]`)
    Delete,
    /// Consumed one symbol of each sequence (move from `[i-1][j-1]`)
    Substitute,
    /// Consumed an adjacent swapped pair (move from `[i-2][j-2]`); only
    /// produced when the transposition term is enabled
    Transpose,
}

impl EditOp {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EditOp::Same => "same",
            EditOp::Insert => "insert",
            EditOp::Delete => "delete",
            EditOp::Substitute => "substitute",
            EditOp::Transpose => "transpose",
        }
    }
}

impl fmt::Display for EditOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of a reconstructed alignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentStep {
    pub op: EditOp,
    /// Cumulative cost at the cell this step arrives at
    pub cost: f64,
    /// Index into sequence 1 consumed by this step, if any
    pub seq1_index: Option<usize>,
    /// Index into sequence 2 consumed by this step, if any
    pub seq2_index: Option<usize>,
}

/// Weighted distance plus the steps that realise it, in forward order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    pub distance: f64,
    pub steps: Vec<AlignmentStep>,
}

impl Alignment {
    /// Operation of each step, in order
    #[must_use]
    pub fn ops(&self) -> Vec<EditOp> {
        self.steps.iter().map(|s| s.op).collect()
    }
}

#[derive(Clone, Copy)]
enum Move {
    Substitute,
    Delete,
    Insert,
    Transpose,
}

/// Walk the matrix back from the bottom-right cell
pub(crate) fn traceback(
    matrix: &AlignmentMatrix,
    seq1: &[&Phoneme],
    seq2: &[&Phoneme],
    transposition: bool,
) -> Vec<AlignmentStep> {
    let mut steps = Vec::with_capacity(seq1.len() + seq2.len());
    let (mut i, mut j) = (seq2.len(), seq1.len());

    while i > 0 || j > 0 {
        let current = matrix.get(i, j);

        let mut candidates: [Option<(Move, usize, usize)>; 4] = [None; 4];
        if i > 0 && j > 0 {
            candidates[0] = Some((Move::Substitute, i - 1, j - 1));
        }
        if i > 0 {
            candidates[1] = Some((Move::Delete, i - 1, j));
        }
        if j > 0 {
            candidates[2] = Some((Move::Insert, i, j - 1));
        }
        if transposition && is_swap(seq1, seq2, i, j) {
            candidates[3] = Some((Move::Transpose, i - 2, j - 2));
        }

        // Strict `<` keeps the earlier candidate on ties
        let mut chosen: Option<(Move, usize, usize, f64)> = None;
        for (mv, pi, pj) in candidates.iter().flatten().copied() {
            let value = matrix.get(pi, pj);
            match chosen {
                Some((_, _, _, best)) if value >= best => {}
                _ => chosen = Some((mv, pi, pj, value)),
            }
        }
        // At least one of i, j is positive, so a candidate always exists
        let Some((mv, pi, pj, value)) = chosen else {
            break;
        };

        let (seq1_index, seq2_index) = match mv {
            Move::Substitute | Move::Transpose => (Some(j - 1), Some(i - 1)),
            Move::Delete => (None, Some(i - 1)),
            Move::Insert => (Some(j - 1), None),
        };
        let op = if (value - current).abs() <= COST_EPSILON {
            EditOp::Same
        } else {
            match mv {
                Move::Substitute => EditOp::Substitute,
                Move::Delete => EditOp::Delete,
                Move::Insert => EditOp::Insert,
                Move::Transpose => EditOp::Transpose,
            }
        };

        steps.push(AlignmentStep {
            op,
            cost: current,
            seq1_index,
            seq2_index,
        });
        i = pi;
        j = pj;
    }

    steps.reverse();
    steps
}
