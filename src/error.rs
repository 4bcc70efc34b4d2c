//! Error types shared by the alignment engine and the dispatch compiler.

use thiserror::Error;

/// Errors raised while building an inventory, aligning, or emitting code.
///
/// Every variant is deterministic: the same input always produces the same
/// error, so none of them are worth retrying.
#[derive(Error, Debug)]
pub enum PhoneticError {
    /// An input symbol is not a member of the phoneme inventory
    #[error("Invalid symbol '{symbol}': not in phoneme inventory '{inventory}' ({inventory_size} phonemes)")]
    InvalidSymbol {
        symbol: String,
        inventory: String,
        inventory_size: usize,
    },

    /// Two inventory entries share the same complete byte path
    #[error("Duplicate byte sequence: phoneme #{second_index} '{second}' collides with phoneme #{first_index} '{first}'")]
    DuplicateByteSequence {
        first: String,
        second: String,
        first_index: usize,
        second_index: usize,
    },

    /// A distance table entry is negative or not finite
    #[error("Invalid distance {value} for pair ('{from}', '{to}'): must be finite and non-negative")]
    InvalidDistance { from: String, to: String, value: f64 },

    /// A builder-wide default (`default_distance`, `self_distance`) is
    /// negative or not finite
    #[error("Invalid {setting} {value}: must be finite and non-negative")]
    InvalidDefault { setting: &'static str, value: f64 },

    /// A distance was recorded for a phoneme that was never added
    #[error("Unknown phoneme '{symbol}' in distance table")]
    UnknownPhoneme { symbol: String },

    /// Zero-length phoneme in the inventory
    #[error("Phoneme inventory contains an empty phoneme")]
    EmptyPhoneme,

    /// Generated function names would not be valid identifiers
    #[error("Invalid function prefix '{0}': must be an ASCII identifier")]
    InvalidPrefix(String),

    /// The fallback cost of generated lookups must be finite
    #[error("Invalid sentinel cost {0}: must be finite")]
    InvalidSentinel(f64),

    /// Writing generated code to the caller's sink failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Inventory (de)serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, PhoneticError>;

/// Render a byte sequence for error messages.
///
/// Valid UTF-8 is shown as text; anything else is shown as `\xNN` escapes.
pub(crate) fn display_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|b| format!("\\x{:02x}", b)).collect(),
    }
}
