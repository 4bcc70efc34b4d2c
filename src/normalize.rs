//! IPA transcription normalization
//!
//! Inventories are byte sequences, so input text must use the same Unicode
//! composition as the inventory before it is segmented.

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// Characters that delimit or annotate a transcription without being part
/// of any phoneme: phonemic/phonetic brackets, stress marks, syllable and
/// foot boundaries.
const TRANSCRIPTION_MARKS: &[char] = &['/', '[', ']', 'ˈ', 'ˌ', '.', '|', '‖'];

/// Normalization mode for IPA text preprocessing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IpaNormalization {
    /// Unicode canonical composition (NFC)
    Nfc,
    /// Unicode canonical decomposition (NFD); use when the inventory stores
    /// base letters and combining diacritics separately
    Nfd,
    /// Remove brackets, stress and boundary marks, and whitespace
    StripDelimiters,
    /// NFC followed by StripDelimiters
    Strict,
}

/// Normalize a transcription according to the specified mode
#[must_use]
pub fn normalize_ipa(s: &str, mode: IpaNormalization) -> String {
    match mode {
        IpaNormalization::Nfc => s.nfc().collect(),
        IpaNormalization::Nfd => s.nfd().collect(),
        IpaNormalization::StripDelimiters => strip_marks(s),
        IpaNormalization::Strict => strip_marks(&s.nfc().collect::<String>()),
    }
}

fn strip_marks(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace() && !TRANSCRIPTION_MARKS.contains(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nfc_composes() {
        // e + combining acute
        let decomposed = "e\u{0301}";
        assert_eq!(normalize_ipa(decomposed, IpaNormalization::Nfc), "\u{00e9}");
    }

    #[test]
    fn test_nfd_decomposes() {
        assert_eq!(normalize_ipa("\u{00e9}", IpaNormalization::Nfd), "e\u{0301}");
    }

    #[test]
    fn test_strip_delimiters() {
        assert_eq!(
            normalize_ipa("/ˈfoʊ.nim/", IpaNormalization::StripDelimiters),
            "foʊnim"
        );
        assert_eq!(
            normalize_ipa("[a b | c]", IpaNormalization::StripDelimiters),
            "abc"
        );
    }

    #[test]
    fn test_strict() {
        assert_eq!(
            normalize_ipa(" [ˈe\u{0301}] ", IpaNormalization::Strict),
            "\u{00e9}"
        );
    }
}
