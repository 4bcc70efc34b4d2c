//! Weighted alignment engine
//!
//! Edit distance where every operation is weighted by the phonetic distance
//! of the symbols involved instead of a unit cost.
//!
//! The recurrence for cell `[i][j]` takes the minimum of the deletion
//! (`[i-1][j]`), insertion (`[i][j-1]`) and substitution (`[i-1][j-1]`)
//! predecessors and adds `cost(seq1[j-1], seq2[i-1])`. Two swapped adjacent
//! symbols are scored as two edits unless the transposition term is enabled
//! in [`AlignOptions`].

mod matrix;
mod traceback;

pub use matrix::AlignmentMatrix;
pub use traceback::{Alignment, AlignmentStep, EditOp};

use crate::error::Result;
use crate::inventory::{CostModel, Phoneme, PhonemeInventory};
use crate::normalize::IpaNormalization;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Resolved input sequence; typical transcriptions fit inline
pub(crate) type Symbols<'a> = SmallVec<[&'a Phoneme; 32]>;

/// Alignment configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignOptions {
    /// Also consider `[i-2][j-2]` when the last two symbols are swapped
    pub transposition: bool,
    /// Normalization applied by the `*_str` methods before segmentation
    pub normalization: Option<IpaNormalization>,
}

impl AlignOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_transposition(mut self, enabled: bool) -> Self {
        self.transposition = enabled;
        self
    }

    #[must_use]
    pub fn with_normalization(mut self, mode: IpaNormalization) -> Self {
        self.normalization = Some(mode);
        self
    }
}

/// Phonetically weighted aligner over one inventory.
///
/// Symbols are validated against the inventory; costs come from the cost
/// model, which is the inventory's own table unless another model (such as
/// a compiled [`CostProgram`](crate::compiler::CostProgram)) is supplied.
///
/// # Example
///
/// ```rust
/// use ipadist::alignment::PhoneticAligner;
/// use ipadist::inventory::PhonemeInventory;
///
/// let inventory = PhonemeInventory::builder("toy")
///     .phonemes(["a", "b", "ab"])
///     .distance("a", "b", 1.0)
///     .distance("a", "ab", 0.5)
///     .distance("b", "ab", 0.7)
///     .symmetric()
///     .build()
///     .unwrap();
///
/// let aligner = PhoneticAligner::new(&inventory);
/// let d = aligner.distance(&["a", "b"], &["ab"]).unwrap();
/// assert!((d - 1.2).abs() < 1e-12);
/// assert!(aligner.distance(&["a", "q"], &["ab"]).is_err());
/// ```
#[derive(Debug)]
pub struct PhoneticAligner<'a, C: CostModel + ?Sized = PhonemeInventory> {
    inventory: &'a PhonemeInventory,
    model: &'a C,
    options: AlignOptions,
}

impl<C: CostModel + ?Sized> Clone for PhoneticAligner<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: CostModel + ?Sized> Copy for PhoneticAligner<'_, C> {}

impl<'a> PhoneticAligner<'a> {
    /// Aligner using the inventory's distance table
    #[must_use]
    pub fn new(inventory: &'a PhonemeInventory) -> Self {
        Self {
            inventory,
            model: inventory,
            options: AlignOptions::default(),
        }
    }
}

impl<'a, C: CostModel + ?Sized> PhoneticAligner<'a, C> {
    /// Aligner validating against `inventory` but scoring with `model`
    #[must_use]
    pub fn with_cost_model(inventory: &'a PhonemeInventory, model: &'a C) -> Self {
        Self {
            inventory,
            model,
            options: AlignOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: AlignOptions) -> Self {
        self.options = options;
        self
    }

    #[inline]
    #[must_use]
    pub fn options(&self) -> AlignOptions {
        self.options
    }

    #[inline]
    #[must_use]
    pub fn inventory(&self) -> &'a PhonemeInventory {
        self.inventory
    }

    /// Weighted distance between two symbol sequences.
    ///
    /// Both empty is 0.0 by convention and builds no matrix.
    ///
    /// # Errors
    ///
    /// Returns [`PhoneticError::InvalidSymbol`](crate::PhoneticError::InvalidSymbol)
    /// for the first symbol of either sequence that is not in the inventory.
    pub fn distance<S: AsRef<[u8]>>(&self, seq1: &[S], seq2: &[S]) -> Result<f64> {
        let a = self.resolve(seq1)?;
        let b = self.resolve(seq2)?;
        Ok(self.distance_phonemes(&a, &b))
    }

    /// Weighted distance between already-resolved phoneme sequences
    #[must_use]
    pub fn distance_phonemes(&self, seq1: &[&Phoneme], seq2: &[&Phoneme]) -> f64 {
        if seq1.is_empty() && seq2.is_empty() {
            return 0.0;
        }
        AlignmentMatrix::compute(seq1, seq2, self.model, self.options.transposition).distance()
    }

    /// Distance plus the edit steps that realise it
    pub fn align<S: AsRef<[u8]>>(&self, seq1: &[S], seq2: &[S]) -> Result<Alignment> {
        let a = self.resolve(seq1)?;
        let b = self.resolve(seq2)?;
        Ok(self.align_phonemes(&a, &b))
    }

    #[must_use]
    pub fn align_phonemes(&self, seq1: &[&Phoneme], seq2: &[&Phoneme]) -> Alignment {
        if seq1.is_empty() && seq2.is_empty() {
            return Alignment {
                distance: 0.0,
                steps: Vec::new(),
            };
        }
        let matrix =
            AlignmentMatrix::compute(seq1, seq2, self.model, self.options.transposition);
        let steps = traceback::traceback(&matrix, seq1, seq2, self.options.transposition);
        Alignment {
            distance: matrix.distance(),
            steps,
        }
    }

    /// The full filled matrix, for inspection
    pub fn matrix<S: AsRef<[u8]>>(&self, seq1: &[S], seq2: &[S]) -> Result<AlignmentMatrix> {
        let a = self.resolve(seq1)?;
        let b = self.resolve(seq2)?;
        Ok(AlignmentMatrix::compute(
            &a,
            &b,
            self.model,
            self.options.transposition,
        ))
    }

    /// Segment two transcriptions with the inventory, then align them
    pub fn distance_str(&self, text1: &str, text2: &str) -> Result<f64> {
        let a = self.segment(text1)?;
        let b = self.segment(text2)?;
        Ok(self.distance_phonemes(&a, &b))
    }

    pub fn align_str(&self, text1: &str, text2: &str) -> Result<Alignment> {
        let a = self.segment(text1)?;
        let b = self.segment(text2)?;
        Ok(self.align_phonemes(&a, &b))
    }

    /// Similarity in (0.0, 1.0]: `1 / (1 + distance)`
    pub fn similarity<S: AsRef<[u8]>>(&self, seq1: &[S], seq2: &[S]) -> Result<f64> {
        Ok(1.0 / (1.0 + self.distance(seq1, seq2)?))
    }

    pub(crate) fn resolve<S: AsRef<[u8]>>(&self, seq: &[S]) -> Result<Symbols<'a>> {
        seq.iter()
            .map(|s| self.inventory.resolve(s.as_ref()))
            .collect()
    }

    fn segment(&self, text: &str) -> Result<Vec<&'a Phoneme>> {
        match self.options.normalization {
            Some(mode) => self.inventory.segment_normalized(text, mode),
            None => self.inventory.segment(text),
        }
    }
}
