//! ipadist - Phonetically weighted edit distance over IPA transcriptions
//!
//! Two components share one [`PhonemeInventory`]:
//!
//! - the **alignment engine** ([`alignment`]) computes an edit distance
//!   where every operation is weighted by the phonetic distance of the
//!   symbols involved, and can reconstruct the edit steps;
//! - the **dispatch compiler** ([`compiler`]) turns the inventory into
//!   branching code that finds phoneme boundaries in a byte buffer and looks
//!   up the cost between two phonemes without any table at run time.
//!
//! # Features
//! - Arbitrary inventories of multi-byte phonemes with asymmetric costs
//! - Optional adjacent-transposition term
//! - C and Rust code generation, plus in-process evaluation of the same
//!   dispatch programs
//! - Parallel batch alignment
//! - Python bindings (`python` feature)
//!
//! # Example
//!
//! ```rust
//! use ipadist::{PhonemeInventory, PhoneticAligner};
//!
//! let inventory = PhonemeInventory::builder("toy")
//!     .phonemes(["a", "b", "ab"])
//!     .distance("a", "b", 1.0)
//!     .distance("a", "ab", 0.5)
//!     .distance("b", "ab", 0.7)
//!     .symmetric()
//!     .build()
//!     .unwrap();
//!
//! let d = PhoneticAligner::new(&inventory).distance(&["a", "b"], &["ab"]).unwrap();
//! assert!((d - 1.2).abs() < 1e-12);
//! ```

pub mod alignment;
pub mod batch;
pub mod compiler;
pub mod error;
pub mod inventory;
pub mod normalize;

#[cfg(feature = "python")]
mod python;

pub use alignment::{AlignOptions, Alignment, AlignmentMatrix, AlignmentStep, EditOp, PhoneticAligner};
pub use compiler::{CompileOptions, CompiledDispatch, DispatchCompiler, Target};
pub use error::{PhoneticError, Result};
pub use inventory::{CostModel, InventoryBuilder, Phoneme, PhonemeInventory};
pub use normalize::IpaNormalization;

// ============================================================================
// Constants
// ============================================================================

/// Cost of any pair the inventory cannot resolve.
///
/// Generated lookups return it for unknown or pruned pairs, and inventories
/// use it for pairs that were never given a distance.
pub const SENTINEL_COST: f64 = 1.0;
