//! Batch alignment over many sequences
//!
//! Symbol resolution runs sequentially so the first invalid symbol reported
//! is always the first in input order. The matrix fills themselves are
//! independent and fan out over rayon once the input is large enough.

use crate::alignment::{PhoneticAligner, Symbols};
use crate::error::Result;
use crate::inventory::CostModel;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Minimum number of alignments before work is spread over the rayon pool.
///
/// Below this the cost of coordinating the pool outweighs a handful of
/// small matrix fills.
pub const PARALLEL_THRESHOLD: usize = 100;

/// One ranked candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Position of the candidate in the input
    pub index: usize,
    pub distance: f64,
    /// `1 / (1 + distance)`
    pub similarity: f64,
}

impl MatchResult {
    fn new(index: usize, distance: f64) -> Self {
        Self {
            index,
            distance,
            similarity: 1.0 / (1.0 + distance),
        }
    }
}

fn resolve_all<'a, C, S>(aligner: &PhoneticAligner<'a, C>, sequences: &[Vec<S>]) -> Result<Vec<Symbols<'a>>>
where
    C: CostModel + ?Sized,
    S: AsRef<[u8]>,
{
    sequences.iter().map(|s| aligner.resolve(s)).collect()
}

/// Distance from `query` to each candidate, in input order.
///
/// # Errors
///
/// Returns the first [`PhoneticError::InvalidSymbol`](crate::PhoneticError::InvalidSymbol)
/// found in the query or any candidate.
pub fn distances_to<C, S>(
    aligner: &PhoneticAligner<'_, C>,
    query: &[S],
    candidates: &[Vec<S>],
) -> Result<Vec<f64>>
where
    C: CostModel + ?Sized,
    S: AsRef<[u8]>,
{
    let query = aligner.resolve(query)?;
    let candidates = resolve_all(aligner, candidates)?;

    let distances = if candidates.len() >= PARALLEL_THRESHOLD {
        candidates
            .par_iter()
            .map(|c| aligner.distance_phonemes(&query, c))
            .collect()
    } else {
        candidates
            .iter()
            .map(|c| aligner.distance_phonemes(&query, c))
            .collect()
    };
    Ok(distances)
}

/// Full distance matrix: row `i` holds the distance from sequence `i` to
/// every sequence. Tables need not be symmetric, so both triangles are
/// computed.
pub fn pairwise_distances<C, S>(
    aligner: &PhoneticAligner<'_, C>,
    sequences: &[Vec<S>],
) -> Result<Vec<Vec<f64>>>
where
    C: CostModel + ?Sized,
    S: AsRef<[u8]>,
{
    let resolved = resolve_all(aligner, sequences)?;
    let row = |a: &Symbols<'_>| -> Vec<f64> {
        resolved
            .iter()
            .map(|b| aligner.distance_phonemes(a, b))
            .collect()
    };

    tracing::debug!(sequences = resolved.len(), "computing pairwise distances");

    let rows = if resolved.len() * resolved.len() >= PARALLEL_THRESHOLD {
        resolved.par_iter().map(row).collect()
    } else {
        resolved.iter().map(row).collect()
    };
    Ok(rows)
}

/// Candidates closest to `query`, nearest first.
///
/// Candidates further than `max_distance` are dropped; at most `limit`
/// results are returned. Equal distances keep input order.
///
/// # Example
/// ```
/// use ipadist::alignment::PhoneticAligner;
/// use ipadist::batch::best_matches;
/// use ipadist::inventory::PhonemeInventory;
///
/// let inventory = PhonemeInventory::builder("toy")
///     .phonemes(["a", "b", "ab"])
///     .distance("a", "ab", 0.5)
///     .symmetric()
///     .build()
///     .unwrap();
/// let aligner = PhoneticAligner::new(&inventory);
/// let candidates = vec![vec!["b"], vec!["ab"], vec!["a"]];
/// let matches = best_matches(&aligner, &["a"], &candidates, 2, None).unwrap();
/// assert_eq!(matches[0].index, 2);
/// assert_eq!(matches[1].index, 1);
/// ```
pub fn best_matches<C, S>(
    aligner: &PhoneticAligner<'_, C>,
    query: &[S],
    candidates: &[Vec<S>],
    limit: usize,
    max_distance: Option<f64>,
) -> Result<Vec<MatchResult>>
where
    C: CostModel + ?Sized,
    S: AsRef<[u8]>,
{
    let mut results: Vec<MatchResult> = distances_to(aligner, query, candidates)?
        .into_iter()
        .enumerate()
        .filter(|(_, d)| max_distance.map_or(true, |max| *d <= max))
        .map(|(i, d)| MatchResult::new(i, d))
        .collect();

    results.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(Ordering::Equal)
    });
    results.truncate(limit);
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PhoneticError;
    use crate::inventory::PhonemeInventory;

    fn toy() -> PhonemeInventory {
        PhonemeInventory::builder("toy")
            .phonemes(["a", "b", "ab"])
            .distance("a", "b", 1.0)
            .distance("a", "ab", 0.5)
            .distance("b", "ab", 0.7)
            .symmetric()
            .build()
            .unwrap()
    }

    #[test]
    fn test_distances_to_matches_single() {
        let inv = toy();
        let aligner = PhoneticAligner::new(&inv);
        let candidates = vec![vec!["ab"], vec!["a", "b"], vec![]];
        let distances = distances_to(&aligner, &["a", "b"], &candidates).unwrap();
        assert_eq!(distances.len(), 3);
        for (c, d) in candidates.iter().zip(&distances) {
            assert_eq!(*d, aligner.distance(&["a", "b"], c).unwrap());
        }
        assert!((distances[0] - 1.2).abs() < 1e-12);
        assert_eq!(distances[1], 0.0);
    }

    #[test]
    fn test_parallel_path_agrees() {
        let inv = toy();
        let aligner = PhoneticAligner::new(&inv);
        let symbols = ["a", "b", "ab"];
        let candidates: Vec<Vec<&str>> = (0..PARALLEL_THRESHOLD + 20)
            .map(|i| (0..(i % 5)).map(|k| symbols[(i + k) % 3]).collect())
            .collect();
        let distances = distances_to(&aligner, &["ab", "a"], &candidates).unwrap();
        for (c, d) in candidates.iter().zip(&distances) {
            assert_eq!(*d, aligner.distance(&["ab", "a"], c).unwrap());
        }
    }

    #[test]
    fn test_pairwise_diagonal_zero() {
        let inv = toy();
        let aligner = PhoneticAligner::new(&inv);
        let seqs = vec![vec!["a", "b"], vec!["ab"], vec!["b", "b", "a"]];
        let m = pairwise_distances(&aligner, &seqs).unwrap();
        assert_eq!(m.len(), 3);
        for (i, row) in m.iter().enumerate() {
            assert_eq!(row.len(), 3);
            assert_eq!(row[i], 0.0);
        }
        assert!((m[0][1] - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_best_matches_ranked_and_limited() {
        let inv = toy();
        let aligner = PhoneticAligner::new(&inv);
        let candidates = vec![vec!["b"], vec!["ab"], vec!["a"], vec!["a"]];
        let matches = best_matches(&aligner, &["a"], &candidates, 3, None).unwrap();
        let order: Vec<usize> = matches.iter().map(|m| m.index).collect();
        assert_eq!(order, vec![2, 3, 1]);
        assert_eq!(matches[0].similarity, 1.0);
        assert!((matches[2].similarity - 1.0 / 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_best_matches_max_distance() {
        let inv = toy();
        let aligner = PhoneticAligner::new(&inv);
        let candidates = vec![vec!["b"], vec!["ab"]];
        let matches = best_matches(&aligner, &["a"], &candidates, 10, Some(0.5)).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].index, 1);
    }

    #[test]
    fn test_invalid_candidate_reported() {
        let inv = toy();
        let aligner = PhoneticAligner::new(&inv);
        let candidates = vec![vec!["a"], vec!["x"], vec!["y"]];
        let err = distances_to(&aligner, &["a"], &candidates).unwrap_err();
        match err {
            PhoneticError::InvalidSymbol { symbol, .. } => assert_eq!(symbol, "x"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
