//! Phoneme inventory and pairwise distance table
//!
//! The inventory is the one piece of configuration both components share:
//! a named, ordered set of phonemes (short byte sequences) and a dense table
//! of phonetic distances over every ordered pair. It is immutable once
//! built and is passed explicitly into the aligner and the compiler.

use crate::compiler::trie::ByteTrie;
use crate::error::{display_bytes, PhoneticError, Result};
use crate::normalize::{normalize_ipa, IpaNormalization};
use crate::SENTINEL_COST;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;
use unicode_segmentation::UnicodeSegmentation;

/// Inline capacity for phoneme bytes; IPA symbols with a diacritic fit in four
pub type PhonemeBytes = SmallVec<[u8; 4]>;

/// One member of a [`PhonemeInventory`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Phoneme {
    id: usize,
    bytes: PhonemeBytes,
}

impl Phoneme {
    /// Position of this phoneme in its inventory
    #[inline]
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Byte length
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}

impl fmt::Display for Phoneme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&display_bytes(&self.bytes))
    }
}

/// Source of per-phoneme substitution costs.
///
/// Implemented by [`PhonemeInventory`] (table lookup) and by the compiled
/// [`CostProgram`](crate::compiler::CostProgram), which resolves the
/// phonemes from their raw bytes through generated dispatch logic.
pub trait CostModel: Send + Sync {
    /// Phonetic distance from `a` to `b`
    fn cost(&self, a: &Phoneme, b: &Phoneme) -> f64;

    /// Name of the model for debugging/logging
    fn name(&self) -> &'static str;
}

/// Named, immutable phoneme set with its distance table.
///
/// # Example
///
/// ```rust
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
/// assert_eq!(inventory.len(), 3);
/// assert_eq!(inventory.distance_between(b"ab", b"b"), Some(0.7));
/// ```
#[derive(Debug, Clone)]
pub struct PhonemeInventory {
    name: String,
    phonemes: Vec<Phoneme>,
    /// Row-major `len * len` table, indexed `[from * len + to]`
    distances: Vec<f64>,
    trie: ByteTrie,
}

/// Serializable state for PhonemeInventory (the trie is rebuilt on load)
#[derive(Debug, Clone, Serialize, Deserialize)]
struct InventoryState {
    name: String,
    phonemes: Vec<PhonemeBytes>,
    distances: Vec<f64>,
}

impl PhonemeInventory {
    /// Start building an inventory from an explicit distance table
    pub fn builder(name: impl Into<String>) -> InventoryBuilder {
        InventoryBuilder::new(name)
    }

    /// Build an inventory by sampling a black-box distance function once for
    /// every ordered pair of phonemes, including each phoneme with itself.
    ///
    /// # Errors
    ///
    /// Fails if the phoneme set has an empty or duplicated entry, or if
    /// `distance_fn` yields a negative or non-finite value.
    pub fn from_fn<I, S, F>(name: impl Into<String>, phonemes: I, mut distance_fn: F) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
        F: FnMut(&Phoneme, &Phoneme) -> f64,
    {
        let phonemes = collect_phonemes(phonemes);
        let trie = build_trie(&phonemes)?;
        let n = phonemes.len();
        let mut distances = Vec::with_capacity(n * n);
        for a in &phonemes {
            for b in &phonemes {
                let value = distance_fn(a, b);
                validate_distance(a.as_bytes(), b.as_bytes(), value)?;
                distances.push(value);
            }
        }
        Ok(Self {
            name: name.into(),
            phonemes,
            distances,
            trie,
        })
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of phonemes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.phonemes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phonemes.is_empty()
    }

    /// All phonemes in inventory order
    #[inline]
    #[must_use]
    pub fn phonemes(&self) -> &[Phoneme] {
        &self.phonemes
    }

    #[inline]
    #[must_use]
    pub fn phoneme(&self, id: usize) -> Option<&Phoneme> {
        self.phonemes.get(id)
    }

    /// Byte trie over the inventory, built once at construction
    #[inline]
    #[must_use]
    pub fn trie(&self) -> &ByteTrie {
        &self.trie
    }

    /// Look up the phoneme with exactly these bytes
    #[must_use]
    pub fn get(&self, bytes: &[u8]) -> Option<&Phoneme> {
        self.trie.exact(bytes).map(|id| &self.phonemes[id])
    }

    /// Like [`get`](Self::get), but an unknown symbol is an error.
    ///
    /// # Errors
    ///
    /// Returns [`PhoneticError::InvalidSymbol`] naming the symbol and this
    /// inventory.
    pub fn resolve(&self, bytes: &[u8]) -> Result<&Phoneme> {
        self.get(bytes).ok_or_else(|| self.invalid_symbol(display_bytes(bytes)))
    }

    pub(crate) fn invalid_symbol(&self, symbol: String) -> PhoneticError {
        PhoneticError::InvalidSymbol {
            symbol,
            inventory: self.name.clone(),
            inventory_size: self.phonemes.len(),
        }
    }

    /// Distance between two phoneme ids.
    ///
    /// Ids outside the inventory yield the sentinel cost.
    #[inline]
    #[must_use]
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        let n = self.phonemes.len();
        if from >= n || to >= n {
            return SENTINEL_COST;
        }
        self.distances[from * n + to]
    }

    /// Distance between two phonemes given by their bytes, `None` if either
    /// is not in the inventory
    #[must_use]
    pub fn distance_between(&self, from: &[u8], to: &[u8]) -> Option<f64> {
        let a = self.trie.exact(from)?;
        let b = self.trie.exact(to)?;
        Some(self.distance(a, b))
    }

    /// Whether `distance(a, b) == distance(b, a)` for every pair
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        let n = self.phonemes.len();
        (0..n).all(|a| (a + 1..n).all(|b| self.distances[a * n + b] == self.distances[b * n + a]))
    }

    /// Phoneme ids grouped by byte length, in ascending length order
    #[must_use]
    pub fn by_length(&self) -> BTreeMap<usize, Vec<usize>> {
        let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for p in &self.phonemes {
            groups.entry(p.len()).or_default().push(p.id);
        }
        groups
    }

    /// Split raw text into phonemes by repeated longest-prefix match.
    ///
    /// # Errors
    ///
    /// Returns [`PhoneticError::InvalidSymbol`] carrying the grapheme cluster
    /// at the first position where no phoneme matches.
    ///
    /// # Example
    /// ```
    /// use ipadist::inventory::PhonemeInventory;
    ///
    /// let inventory = PhonemeInventory::from_fn("toy", ["t", "ʃ", "tʃ", "a"], |_, _| 1.0).unwrap();
    /// let symbols: Vec<String> = inventory
    ///     .segment("tʃat")
    ///     .unwrap()
    ///     .iter()
    ///     .map(|p| p.to_string())
    ///     .collect();
    /// assert_eq!(symbols, vec!["tʃ", "a", "t"]);
    /// ```
    pub fn segment(&self, text: &str) -> Result<Vec<&Phoneme>> {
        let bytes = text.as_bytes();
        let mut out = Vec::with_capacity(bytes.len());
        let mut pos = 0;
        while pos < bytes.len() {
            match self.trie.longest_match(&bytes[pos..]) {
                Some((len, id)) => {
                    out.push(&self.phonemes[id]);
                    pos += len;
                }
                None => {
                    let symbol = text
                        .get(pos..)
                        .and_then(|rest| rest.graphemes(true).next())
                        .map(str::to_string)
                        .unwrap_or_else(|| display_bytes(&bytes[pos..pos + 1]));
                    return Err(self.invalid_symbol(symbol));
                }
            }
        }
        Ok(out)
    }

    /// Normalize `text` and then [`segment`](Self::segment) it
    pub fn segment_normalized(&self, text: &str, mode: IpaNormalization) -> Result<Vec<&Phoneme>> {
        let normalized = normalize_ipa(text, mode);
        // Phonemes borrow from self, not from the normalized text
        self.segment(&normalized)
    }

    /// Serialize the inventory (name, phonemes, table) to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let state = InventoryState {
            name: self.name.clone(),
            phonemes: self.phonemes.iter().map(|p| p.bytes.clone()).collect(),
            distances: self.distances.clone(),
        };
        Ok(bincode::serialize(&state)?)
    }

    /// Restore an inventory written by [`to_bytes`](Self::to_bytes).
    ///
    /// The trie is rebuilt and every table entry is validated again.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let state: InventoryState = bincode::deserialize(data)?;
        let n = state.phonemes.len();
        if state.distances.len() != n * n {
            return Err(PhoneticError::Serialization(Box::new(bincode::ErrorKind::Custom(
                format!(
                    "distance table has {} entries, expected {}",
                    state.distances.len(),
                    n * n
                ),
            ))));
        }
        let phonemes = collect_phonemes(state.phonemes);
        let trie = build_trie(&phonemes)?;
        for a in &phonemes {
            for b in &phonemes {
                validate_distance(a.as_bytes(), b.as_bytes(), state.distances[a.id * n + b.id])?;
            }
        }
        Ok(Self {
            name: state.name,
            phonemes,
            distances: state.distances,
            trie,
        })
    }
}

impl CostModel for PhonemeInventory {
    #[inline]
    fn cost(&self, a: &Phoneme, b: &Phoneme) -> f64 {
        self.distance(a.id, b.id)
    }

    fn name(&self) -> &'static str {
        "distance_table"
    }
}

/// Builder for a [`PhonemeInventory`] with an explicit, possibly sparse,
/// distance table.
///
/// Pairs that are never given a distance take the default (the sentinel
/// cost 1.0 unless changed); each phoneme's distance to itself defaults to
/// 0.0. With [`symmetric`](Self::symmetric) every recorded pair is mirrored.
#[derive(Debug, Clone)]
pub struct InventoryBuilder {
    name: String,
    phonemes: Vec<PhonemeBytes>,
    entries: Vec<(PhonemeBytes, PhonemeBytes, f64)>,
    symmetric: bool,
    self_distance: f64,
    default_distance: f64,
}

impl InventoryBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phonemes: Vec::new(),
            entries: Vec::new(),
            symmetric: false,
            self_distance: 0.0,
            default_distance: SENTINEL_COST,
        }
    }

    /// Add one phoneme
    pub fn phoneme(mut self, symbol: impl AsRef<[u8]>) -> Self {
        self.phonemes.push(SmallVec::from_slice(symbol.as_ref()));
        self
    }

    /// Add phonemes in order
    pub fn phonemes<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        self.phonemes
            .extend(symbols.into_iter().map(|s| SmallVec::from_slice(s.as_ref())));
        self
    }

    /// Record the distance from `from` to `to`
    pub fn distance(mut self, from: impl AsRef<[u8]>, to: impl AsRef<[u8]>, value: f64) -> Self {
        self.entries.push((
            SmallVec::from_slice(from.as_ref()),
            SmallVec::from_slice(to.as_ref()),
            value,
        ));
        self
    }

    /// Mirror every recorded distance onto the reverse pair
    pub fn symmetric(mut self) -> Self {
        self.symmetric = true;
        self
    }

    pub fn with_self_distance(mut self, value: f64) -> Self {
        self.self_distance = value;
        self
    }

    pub fn with_default_distance(mut self, value: f64) -> Self {
        self.default_distance = value;
        self
    }

    /// Validate and build the inventory.
    ///
    /// # Errors
    ///
    /// - [`PhoneticError::EmptyPhoneme`] / [`PhoneticError::DuplicateByteSequence`]
    ///   from trie construction
    /// - [`PhoneticError::UnknownPhoneme`] if a distance names a phoneme that
    ///   was not added
    /// - [`PhoneticError::InvalidDistance`] for negative or non-finite values
    /// - [`PhoneticError::InvalidDefault`] if the default or self distance is
    ///   negative or non-finite
    pub fn build(self) -> Result<PhonemeInventory> {
        let phonemes = collect_phonemes(self.phonemes);
        let trie = build_trie(&phonemes)?;
        let n = phonemes.len();

        validate_default("default_distance", self.default_distance)?;
        validate_default("self_distance", self.self_distance)?;
        let mut distances = vec![self.default_distance; n * n];
        for i in 0..n {
            distances[i * n + i] = self.self_distance;
        }

        for (from, to, value) in &self.entries {
            let a = trie.exact(from).ok_or_else(|| PhoneticError::UnknownPhoneme {
                symbol: display_bytes(from),
            })?;
            let b = trie.exact(to).ok_or_else(|| PhoneticError::UnknownPhoneme {
                symbol: display_bytes(to),
            })?;
            validate_distance(from, to, *value)?;
            distances[a * n + b] = *value;
            if self.symmetric {
                distances[b * n + a] = *value;
            }
        }

        Ok(PhonemeInventory {
            name: self.name,
            phonemes,
            distances,
            trie,
        })
    }
}

fn collect_phonemes<I, S>(symbols: I) -> Vec<Phoneme>
where
    I: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    symbols
        .into_iter()
        .enumerate()
        .map(|(id, s)| Phoneme {
            id,
            bytes: SmallVec::from_slice(s.as_ref()),
        })
        .collect()
}

fn build_trie(phonemes: &[Phoneme]) -> Result<ByteTrie> {
    ByteTrie::build(phonemes.iter().map(|p| (p.id, p.as_bytes())))
}

fn validate_distance(from: &[u8], to: &[u8], value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(PhoneticError::InvalidDistance {
            from: display_bytes(from),
            to: display_bytes(to),
            value,
        });
    }
    Ok(())
}

fn validate_default(setting: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(PhoneticError::InvalidDefault { setting, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn test_builder_table() {
        let inv = toy();
        assert_eq!(inv.name(), "toy");
        assert_eq!(inv.len(), 3);
        assert_eq!(inv.distance(0, 0), 0.0);
        assert_eq!(inv.distance(0, 1), 1.0);
        assert_eq!(inv.distance(2, 0), 0.5);
        assert_eq!(inv.distance_between(b"b", b"ab"), Some(0.7));
        assert_eq!(inv.distance_between(b"b", b"x"), None);
        assert!(inv.is_symmetric());
    }

    #[test]
    fn test_builder_asymmetric_and_defaults() {
        let inv = PhonemeInventory::builder("asym")
            .phonemes(["p", "b", "m"])
            .distance("p", "b", 0.2)
            .distance("b", "p", 0.4)
            .build()
            .unwrap();
        assert_eq!(inv.distance_between(b"p", b"b"), Some(0.2));
        assert_eq!(inv.distance_between(b"b", b"p"), Some(0.4));
        // never recorded
        assert_eq!(inv.distance_between(b"p", b"m"), Some(SENTINEL_COST));
        assert!(!inv.is_symmetric());
    }

    #[test]
    fn test_out_of_range_ids_are_sentinel() {
        let inv = toy();
        assert_eq!(inv.distance(0, 99), SENTINEL_COST);
    }

    #[test]
    fn test_from_fn_samples_every_pair() {
        let mut calls = 0;
        let inv = PhonemeInventory::from_fn("fn", ["a", "e", "i"], |a, b| {
            calls += 1;
            (a.id() as f64 - b.id() as f64).abs() / 2.0
        })
        .unwrap();
        assert_eq!(calls, 9);
        assert_eq!(inv.distance(0, 2), 1.0);
        assert_eq!(inv.distance(1, 1), 0.0);
    }

    #[test]
    fn test_from_fn_rejects_negative() {
        let err = PhonemeInventory::from_fn("neg", ["a", "b"], |_, _| -0.5).unwrap_err();
        assert!(matches!(err, PhoneticError::InvalidDistance { .. }));
    }

    #[test]
    fn test_builder_rejects_nan() {
        let err = PhonemeInventory::builder("nan")
            .phonemes(["a", "b"])
            .distance("a", "b", f64::NAN)
            .build()
            .unwrap_err();
        assert!(matches!(err, PhoneticError::InvalidDistance { .. }));
    }

    #[test]
    fn test_builder_rejects_bad_defaults() {
        let err = PhonemeInventory::builder("defaults")
            .phonemes(["a", "b"])
            .with_default_distance(f64::INFINITY)
            .build()
            .unwrap_err();
        match err {
            PhoneticError::InvalidDefault { setting, .. } => {
                assert_eq!(setting, "default_distance")
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = PhonemeInventory::builder("defaults")
            .phonemes(["a", "b"])
            .with_self_distance(-0.1)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("self_distance"));
        assert!(!err.to_string().contains('*'));
    }

    #[test]
    fn test_builder_rejects_unknown() {
        let err = PhonemeInventory::builder("unknown")
            .phonemes(["a"])
            .distance("a", "z", 0.1)
            .build()
            .unwrap_err();
        match err {
            PhoneticError::UnknownPhoneme { symbol } => assert_eq!(symbol, "z"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_phoneme_rejected() {
        let err = PhonemeInventory::builder("dup")
            .phonemes(["a", "ɪ", "ɪ"])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            PhoneticError::DuplicateByteSequence {
                first_index: 1,
                second_index: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_resolve_invalid_symbol() {
        let inv = toy();
        assert_eq!(inv.resolve(b"ab").unwrap().id(), 2);
        match inv.resolve(b"c").unwrap_err() {
            PhoneticError::InvalidSymbol {
                symbol,
                inventory,
                inventory_size,
            } => {
                assert_eq!(symbol, "c");
                assert_eq!(inventory, "toy");
                assert_eq!(inventory_size, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_segment_longest_match() {
        let inv = toy();
        let ids: Vec<usize> = inv.segment("abba").unwrap().iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec![2, 1, 0]);
        assert!(inv.segment("").unwrap().is_empty());
    }

    #[test]
    fn test_segment_reports_grapheme() {
        let inv = toy();
        match inv.segment("abé").unwrap_err() {
            PhoneticError::InvalidSymbol { symbol, .. } => assert_eq!(symbol, "é"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_segment_normalized() {
        let inv = toy();
        let ids: Vec<usize> = inv
            .segment_normalized("/a b/", IpaNormalization::StripDelimiters)
            .unwrap()
            .iter()
            .map(|p| p.id())
            .collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_by_length() {
        let inv = PhonemeInventory::from_fn("len", ["a", "ʃ", "b", "tʃ"], |_, _| 0.0).unwrap();
        let groups = inv.by_length();
        assert_eq!(groups.get(&1), Some(&vec![0, 2]));
        assert_eq!(groups.get(&2), Some(&vec![1]));
        assert_eq!(groups.get(&3), Some(&vec![3]));
    }

    #[test]
    fn test_bytes_roundtrip_preserves_table() {
        let inv = toy();
        let restored = PhonemeInventory::from_bytes(&inv.to_bytes().unwrap()).unwrap();
        assert_eq!(restored.name(), "toy");
        assert_eq!(restored.phonemes(), inv.phonemes());
        assert_eq!(restored.distance_between(b"a", b"ab"), Some(0.5));
        assert_eq!(restored.trie().len(), 3);
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        assert!(PhonemeInventory::from_bytes(&[1, 2, 3]).is_err());
    }
}
