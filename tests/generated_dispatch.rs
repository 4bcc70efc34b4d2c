//! Tests for generated Rust dispatch source.
//!
//! `generated/mixed_dispatch.rs` is the output of `render()` for the
//! inventory below, compiled into this test. Against the real generated
//! functions:
//!
//! 1. **Up to date**: the checked-in file equals a fresh `render()`
//! 2. **Detector completeness**: every phoneme is consumed whole
//! 3. **Table agreement**: every phoneme pair returns the table value,
//!    at any offset into a larger buffer
//! 4. **Sentinel**: undecodable or out-of-range operands return exactly 1.0
//! 5. **Interpreter agreement**: generated code and `CostProgram::eval`
//!    agree on arbitrary ranges

use ipadist::compiler::{CompileOptions, CompiledDispatch, DispatchCompiler, Target};
use ipadist::PhonemeInventory;
use proptest::prelude::*;

#[allow(clippy::all)]
mod generated {
    include!("generated/mixed_dispatch.rs");
}

use generated::{mixed_phoneme_cost, mixed_phoneme_len};

// Regenerate with `compiled().render()` if the emitter or the inventory changes
const CHECKED_IN: &str = include_str!("generated/mixed_dispatch.rs");

const SYMBOLS: [&str; 6] = ["a", "b", "ab", "t", "ʃ", "tʃ"];

fn inventory() -> PhonemeInventory {
    PhonemeInventory::builder("mixed")
        .phonemes(SYMBOLS)
        .distance("a", "b", 1.0)
        .distance("a", "ab", 0.5)
        .distance("b", "ab", 0.7)
        .distance("t", "tʃ", 0.25)
        .distance("ʃ", "tʃ", 0.4)
        .distance("t", "ʃ", 0.8)
        .distance("a", "t", 1.5)
        .symmetric()
        .build()
        .unwrap()
}

fn compiled(inv: &PhonemeInventory) -> CompiledDispatch {
    let options = CompileOptions::default()
        .with_target(Target::Rust)
        .with_prefix("mixed");
    DispatchCompiler::new(inv, options).compile().unwrap()
}

#[test]
fn checked_in_source_is_current() {
    let inv = inventory();
    assert_eq!(CHECKED_IN, compiled(&inv).render());
}

#[test]
fn detector_consumes_every_phoneme() {
    let inv = inventory();
    for p in inv.phonemes() {
        let bytes = p.as_bytes();
        assert_eq!(mixed_phoneme_len(bytes, 0, bytes.len()), p.len(), "{p}");
    }
    assert_eq!(mixed_phoneme_len(b"", 0, 0), 0);
    assert_eq!(mixed_phoneme_len(b"z", 0, 1), 0);
    assert_eq!(mixed_phoneme_len(b"ab", 2, 2), 0);
    // a truncated "tʃ" falls back to "t"
    let tsh = "tʃ".as_bytes();
    assert_eq!(mixed_phoneme_len(tsh, 0, 2), 1);
    // half of "ʃ" is not a phoneme
    assert_eq!(mixed_phoneme_len(&tsh[1..], 0, 1), 0);
}

#[test]
fn detector_splits_like_segmentation() {
    let inv = inventory();
    let text = "tʃabʃtab";
    let buf = text.as_bytes();
    let mut lengths = Vec::new();
    let mut pos = 0;
    while pos < buf.len() {
        let n = mixed_phoneme_len(buf, pos, buf.len());
        assert!(n > 0, "stuck at byte {pos}");
        lengths.push(n);
        pos += n;
    }
    let expected: Vec<usize> = inv
        .segment(text)
        .unwrap()
        .iter()
        .map(|p| p.len())
        .collect();
    assert_eq!(lengths, expected);
}

#[test]
fn lookup_matches_table() {
    let inv = inventory();
    for a in inv.phonemes() {
        for b in inv.phonemes() {
            let (x, y) = (a.as_bytes(), b.as_bytes());
            assert_eq!(
                mixed_phoneme_cost(x, 0, x.len(), y, 0, y.len()),
                inv.distance(a.id(), b.id()),
                "{a} -> {b}"
            );
        }
    }
}

#[test]
fn lookup_reads_at_offsets() {
    let inv = inventory();
    for a in inv.phonemes() {
        for b in inv.phonemes() {
            let left = [b"zz".as_slice(), a.as_bytes(), b"z".as_slice()].concat();
            let right = [b"q".as_slice(), b.as_bytes(), b"qq".as_slice()].concat();
            assert_eq!(
                mixed_phoneme_cost(&left, 2, a.len(), &right, 1, b.len()),
                inv.distance(a.id(), b.id()),
                "{a} -> {b}"
            );
        }
    }
}

#[test]
fn lookup_sentinel_for_undecodable_operands() {
    let ab = b"ab";
    let tsh = "tʃ".as_bytes();
    // not a phoneme on one side
    assert_eq!(mixed_phoneme_cost(b"z", 0, 1, b"a", 0, 1), 1.0);
    assert_eq!(mixed_phoneme_cost(b"a", 0, 1, b"z", 0, 1), 1.0);
    // "ba" and a partial "tʃ" have valid lengths but no phoneme
    assert_eq!(mixed_phoneme_cost(b"ba", 0, 2, b"a", 0, 1), 1.0);
    assert_eq!(mixed_phoneme_cost(tsh, 0, 2, b"t", 0, 1), 1.0);
    // no phoneme is four bytes long
    assert_eq!(mixed_phoneme_cost(b"abab", 0, 4, b"a", 0, 1), 1.0);
    // empty operands
    assert_eq!(mixed_phoneme_cost(ab, 0, 0, b"a", 0, 1), 1.0);
    assert_eq!(mixed_phoneme_cost(b"a", 0, 1, ab, 1, 0), 1.0);
    // ranges past the end of the buffer
    assert_eq!(mixed_phoneme_cost(ab, 1, 2, b"a", 0, 1), 1.0);
    assert_eq!(mixed_phoneme_cost(b"a", 0, 1, ab, 3, 1), 1.0);
    assert_eq!(mixed_phoneme_cost(ab, usize::MAX, 2, b"a", 0, 1), 1.0);
    // a pruned pair is indistinguishable from an unknown one
    assert_eq!(mixed_phoneme_cost(b"a", 0, 1, b"b", 0, 1), 1.0);
}

/// Phoneme bytes mixed with stray bytes, including either half of "ʃ"
fn arb_buffer() -> impl Strategy<Value = Vec<u8>> {
    let pieces = prop::sample::select(vec![
        b"a".to_vec(),
        b"b".to_vec(),
        b"t".to_vec(),
        "ʃ".as_bytes().to_vec(),
        b"z".to_vec(),
        vec![0xca],
        vec![0x83],
    ]);
    prop::collection::vec(pieces, 0..5).prop_map(|v| v.concat())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn generated_lookup_matches_interpreter(
        a in arb_buffer(),
        b in arb_buffer(),
        a_off in 0usize..6,
        a_len in 0usize..5,
        b_off in 0usize..6,
        b_len in 0usize..5,
    ) {
        let inv = inventory();
        let compiled = compiled(&inv);
        prop_assert_eq!(
            mixed_phoneme_cost(&a, a_off, a_len, &b, b_off, b_len),
            compiled.cost.eval(&a, a_off, a_len, &b, b_off, b_len)
        );
    }

    #[test]
    fn generated_detector_matches_interpreter(buf in arb_buffer(), pos in 0usize..10) {
        let inv = inventory();
        let compiled = compiled(&inv);
        prop_assert_eq!(
            mixed_phoneme_len(&buf, pos, buf.len()),
            compiled.detector.eval(&buf, pos, buf.len())
        );
    }
}
