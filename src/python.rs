//! Python bindings
//!
//! Exposes the inventory, the aligner and the dispatch compiler to Python.
//! Inventories are shared behind an `Arc` so alignment can run with the GIL
//! released.

use crate::alignment::{AlignOptions, PhoneticAligner};
use crate::batch;
use crate::compiler::{CompileOptions, DispatchCompiler, Target};
use crate::error::PhoneticError;
use crate::inventory::PhonemeInventory;
use crate::normalize::IpaNormalization;
use crate::SENTINEL_COST;
use pyo3::create_exception;
use pyo3::prelude::*;
use pyo3::types::PyBytes;
use std::collections::HashMap;
use std::sync::Arc;

// ============================================================================
// Custom Python Exceptions
// ============================================================================
//
// IpaDistError (base)
//   ├── ValidationError - Invalid argument values (unknown mode, target, ...)
//   ├── InvalidSymbolError - Input symbol not in the inventory
//   ├── InventoryError - Inventory construction or table problems
//   └── CompileError - Unusable code generation options

create_exception!(ipadist, IpaDistError, pyo3::exceptions::PyException);
create_exception!(ipadist, ValidationError, IpaDistError);
create_exception!(ipadist, InvalidSymbolError, IpaDistError);
create_exception!(ipadist, InventoryError, IpaDistError);
create_exception!(ipadist, CompileError, IpaDistError);

impl From<PhoneticError> for PyErr {
    fn from(err: PhoneticError) -> Self {
        let msg = err.to_string();
        match err {
            PhoneticError::InvalidSymbol { .. } => InvalidSymbolError::new_err(msg),
            PhoneticError::DuplicateByteSequence { .. }
            | PhoneticError::InvalidDistance { .. }
            | PhoneticError::InvalidDefault { .. }
            | PhoneticError::UnknownPhoneme { .. }
            | PhoneticError::EmptyPhoneme => InventoryError::new_err(msg),
            PhoneticError::InvalidPrefix(_) | PhoneticError::InvalidSentinel(_) => {
                CompileError::new_err(msg)
            }
            PhoneticError::Io(_) | PhoneticError::Serialization(_) => {
                pyo3::exceptions::PyIOError::new_err(msg)
            }
        }
    }
}

fn parse_normalization(mode: Option<&str>) -> PyResult<Option<IpaNormalization>> {
    match mode {
        None => Ok(None),
        Some("nfc") => Ok(Some(IpaNormalization::Nfc)),
        Some("nfd") => Ok(Some(IpaNormalization::Nfd)),
        Some("strip") => Ok(Some(IpaNormalization::StripDelimiters)),
        Some("strict") => Ok(Some(IpaNormalization::Strict)),
        Some(other) => Err(ValidationError::new_err(format!(
            "Unknown normalization '{}'. Valid: nfc, nfd, strip, strict",
            other
        ))),
    }
}

fn parse_target(target: &str) -> PyResult<Target> {
    match target {
        "c" => Ok(Target::C),
        "rust" => Ok(Target::Rust),
        other => Err(ValidationError::new_err(format!(
            "Unknown target '{}'. Valid: c, rust",
            other
        ))),
    }
}

// ============================================================================
// Inventory
// ============================================================================

/// An immutable phoneme inventory with its distance table.
///
/// `distances` maps `(from, to)` symbol pairs to a cost. Unlisted pairs cost
/// `default_distance`; a phoneme's distance to itself is 0.0.
#[pyclass(name = "PhonemeInventory", frozen)]
#[derive(Clone)]
pub struct PyPhonemeInventory {
    inner: Arc<PhonemeInventory>,
}

#[pymethods]
impl PyPhonemeInventory {
    #[new]
    #[pyo3(signature = (name, phonemes, distances=None, symmetric=false, default_distance=SENTINEL_COST))]
    fn new(
        name: String,
        phonemes: Vec<String>,
        distances: Option<HashMap<(String, String), f64, ahash::RandomState>>,
        symmetric: bool,
        default_distance: f64,
    ) -> PyResult<Self> {
        let mut builder = PhonemeInventory::builder(name)
            .phonemes(&phonemes)
            .with_default_distance(default_distance);
        if symmetric {
            builder = builder.symmetric();
        }

        // dict order is not meaningful; apply pairs in a fixed order
        let mut entries: Vec<((String, String), f64)> =
            distances.unwrap_or_default().into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        for ((from, to), value) in entries {
            builder = builder.distance(from, to, value);
        }

        Ok(Self {
            inner: Arc::new(builder.build()?),
        })
    }

    #[getter]
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "PhonemeInventory(name='{}', phonemes={})",
            self.inner.name(),
            self.inner.len()
        )
    }

    /// Phoneme symbols in id order
    fn phonemes(&self) -> Vec<String> {
        self.inner.phonemes().iter().map(|p| p.to_string()).collect()
    }

    fn __contains__(&self, symbol: &str) -> bool {
        self.inner.get(symbol.as_bytes()).is_some()
    }

    /// Table distance between two symbols
    fn distance(&self, from: &str, to: &str) -> PyResult<f64> {
        let a = self.inner.resolve(from.as_bytes())?;
        let b = self.inner.resolve(to.as_bytes())?;
        Ok(self.inner.distance(a.id(), b.id()))
    }

    /// Split a transcription into phoneme symbols by longest match
    #[pyo3(signature = (text, normalization=None))]
    fn segment(&self, text: &str, normalization: Option<&str>) -> PyResult<Vec<String>> {
        let phonemes = match parse_normalization(normalization)? {
            Some(mode) => self.inner.segment_normalized(text, mode)?,
            None => self.inner.segment(text)?,
        };
        Ok(phonemes.iter().map(|p| p.to_string()).collect())
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    fn to_bytes<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyBytes>> {
        let bytes = self.inner.to_bytes()?;
        Ok(PyBytes::new(py, &bytes))
    }

    #[staticmethod]
    fn from_bytes(data: &[u8]) -> PyResult<Self> {
        Ok(Self {
            inner: Arc::new(PhonemeInventory::from_bytes(data)?),
        })
    }
}

// ============================================================================
// Alignment
// ============================================================================

/// Phonetically weighted distance between two symbol sequences.
#[pyfunction]
#[pyo3(signature = (inventory, seq1, seq2, transposition=false))]
fn distance(
    py: Python<'_>,
    inventory: &PyPhonemeInventory,
    seq1: Vec<String>,
    seq2: Vec<String>,
    transposition: bool,
) -> PyResult<f64> {
    let inventory = Arc::clone(&inventory.inner);
    let options = AlignOptions::new().with_transposition(transposition);
    let d = py.allow_threads(|| {
        PhoneticAligner::new(&inventory)
            .with_options(options)
            .distance(&seq1, &seq2)
    })?;
    Ok(d)
}

/// Distance between two raw transcriptions, segmented with the inventory.
#[pyfunction]
#[pyo3(signature = (inventory, text1, text2, normalization=None, transposition=false))]
fn distance_str(
    py: Python<'_>,
    inventory: &PyPhonemeInventory,
    text1: &str,
    text2: &str,
    normalization: Option<&str>,
    transposition: bool,
) -> PyResult<f64> {
    let mut options = AlignOptions::new().with_transposition(transposition);
    if let Some(mode) = parse_normalization(normalization)? {
        options = options.with_normalization(mode);
    }
    let inventory = Arc::clone(&inventory.inner);
    let (text1, text2) = (text1.to_string(), text2.to_string());
    let d = py.allow_threads(|| {
        PhoneticAligner::new(&inventory)
            .with_options(options)
            .distance_str(&text1, &text2)
    })?;
    Ok(d)
}

/// Distance plus edit steps.
///
/// Returns `(distance, steps)` where each step is
/// `(op, cost, seq1_index, seq2_index)`.
#[pyfunction]
#[pyo3(signature = (inventory, seq1, seq2, transposition=false))]
#[allow(clippy::type_complexity)]
fn align(
    py: Python<'_>,
    inventory: &PyPhonemeInventory,
    seq1: Vec<String>,
    seq2: Vec<String>,
    transposition: bool,
) -> PyResult<(f64, Vec<(String, f64, Option<usize>, Option<usize>)>)> {
    let inventory = Arc::clone(&inventory.inner);
    let options = AlignOptions::new().with_transposition(transposition);
    let alignment = py.allow_threads(|| {
        PhoneticAligner::new(&inventory)
            .with_options(options)
            .align(&seq1, &seq2)
    })?;
    let steps = alignment
        .steps
        .into_iter()
        .map(|s| (s.op.to_string(), s.cost, s.seq1_index, s.seq2_index))
        .collect();
    Ok((alignment.distance, steps))
}

/// Rank candidate sequences by distance to `query`.
///
/// Returns `(index, distance)` pairs, nearest first.
#[pyfunction]
#[pyo3(signature = (inventory, query, candidates, limit=10, max_distance=None))]
fn best_matches(
    py: Python<'_>,
    inventory: &PyPhonemeInventory,
    query: Vec<String>,
    candidates: Vec<Vec<String>>,
    limit: usize,
    max_distance: Option<f64>,
) -> PyResult<Vec<(usize, f64)>> {
    let inventory = Arc::clone(&inventory.inner);
    let matches = py.allow_threads(|| {
        let aligner = PhoneticAligner::new(&inventory);
        batch::best_matches(&aligner, &query, &candidates, limit, max_distance)
    })?;
    Ok(matches.into_iter().map(|m| (m.index, m.distance)).collect())
}

// ============================================================================
// Code generation
// ============================================================================

/// Generate the boundary detector and cost lookup as source text.
#[pyfunction]
#[pyo3(signature = (inventory, target="c", prefix="ipa", sentinel=SENTINEL_COST))]
fn compile_dispatch(
    inventory: &PyPhonemeInventory,
    target: &str,
    prefix: &str,
    sentinel: f64,
) -> PyResult<String> {
    let options = CompileOptions::default()
        .with_target(parse_target(target)?)
        .with_prefix(prefix)
        .with_sentinel(sentinel);
    let compiled = DispatchCompiler::new(&inventory.inner, options).compile()?;
    Ok(compiled.render())
}

// ============================================================================
// Module
// ============================================================================

#[pymodule]
fn ipadist(py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("IpaDistError", py.get_type::<IpaDistError>())?;
    m.add("ValidationError", py.get_type::<ValidationError>())?;
    m.add("InvalidSymbolError", py.get_type::<InvalidSymbolError>())?;
    m.add("InventoryError", py.get_type::<InventoryError>())?;
    m.add("CompileError", py.get_type::<CompileError>())?;

    m.add_class::<PyPhonemeInventory>()?;

    m.add_function(wrap_pyfunction!(distance, m)?)?;
    m.add_function(wrap_pyfunction!(distance_str, m)?)?;
    m.add_function(wrap_pyfunction!(align, m)?)?;
    m.add_function(wrap_pyfunction!(best_matches, m)?)?;
    m.add_function(wrap_pyfunction!(compile_dispatch, m)?)?;

    m.add("SENTINEL_COST", SENTINEL_COST)?;
    Ok(())
}
