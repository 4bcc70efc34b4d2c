//! Lowering of byte tries into dispatch programs
//!
//! A dispatch program is the branch tree that the emitters print as nested
//! `switch`/`match` statements. Keeping it as data lets the same structure be
//! executed in-process (`eval`) and printed for a native toolchain, so both
//! always agree.

use super::trie::{ByteTrie, NodeId};
use crate::error::Result;
use crate::inventory::{CostModel, Phoneme, PhonemeInventory};
use std::collections::BTreeMap;

// ============================================================================
// Boundary detector
// ============================================================================

/// Branch tree of the phoneme-boundary detector
#[derive(Debug, Clone, PartialEq)]
pub enum DetectNode {
    /// Consume this many bytes
    Accept(usize),
    /// Read the byte `depth` positions past the cursor. An unmatched byte or
    /// the end of the buffer yields `fallback`, the length of the longest
    /// phoneme already matched on this path (0 if none).
    Branch {
        depth: usize,
        arms: Vec<(u8, DetectNode)>,
        fallback: usize,
    },
}

/// Longest-prefix phoneme matcher over a byte buffer
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorProgram {
    root: DetectNode,
    max_len: usize,
}

impl DetectorProgram {
    #[inline]
    #[must_use]
    pub fn root(&self) -> &DetectNode {
        &self.root
    }

    /// Length in bytes of the longest phoneme
    #[inline]
    #[must_use]
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Number of bytes consumed by the phoneme starting at `pos`, or 0 if
    /// no phoneme starts there. Only `buf[..len]` is considered.
    ///
    /// # Example
    /// ```
    /// use ipadist::compiler::{CompileOptions, DispatchCompiler};
    /// use ipadist::inventory::PhonemeInventory;
    ///
    /// let inventory = PhonemeInventory::from_fn("toy", ["a", "b", "ab"], |_, _| 1.0).unwrap();
    /// let compiled = DispatchCompiler::new(&inventory, CompileOptions::default()).compile().unwrap();
    /// let buf = b"abba";
    /// assert_eq!(compiled.detector.eval(buf, 0, buf.len()), 2);
    /// assert_eq!(compiled.detector.eval(buf, 2, buf.len()), 1);
    /// assert_eq!(compiled.detector.eval(buf, 4, buf.len()), 0);
    /// ```
    #[must_use]
    pub fn eval(&self, buf: &[u8], pos: usize, len: usize) -> usize {
        let len = len.min(buf.len());
        if pos >= len {
            return 0;
        }
        let rest = &buf[pos..len];

        let mut node = &self.root;
        loop {
            match node {
                DetectNode::Accept(n) => return *n,
                DetectNode::Branch {
                    depth,
                    arms,
                    fallback,
                } => {
                    let Some(&byte) = rest.get(*depth) else {
                        return *fallback;
                    };
                    match arms.binary_search_by_key(&byte, |(b, _)| *b) {
                        Ok(i) => node = &arms[i].1,
                        Err(_) => return *fallback,
                    }
                }
            }
        }
    }

    /// Split `buf` into phoneme byte lengths; stops at the first position
    /// where no phoneme matches and returns the lengths so far with that
    /// position.
    #[must_use]
    pub fn split(&self, buf: &[u8]) -> (Vec<usize>, usize) {
        let mut lengths = Vec::new();
        let mut pos = 0;
        while pos < buf.len() {
            let n = self.eval(buf, pos, buf.len());
            if n == 0 {
                break;
            }
            lengths.push(n);
            pos += n;
        }
        (lengths, pos)
    }
}

/// Lower a trie into a boundary detector
#[must_use]
pub fn lower_detector(trie: &ByteTrie) -> DetectorProgram {
    fn lower(trie: &ByteTrie, node: NodeId, depth: usize, fallback: usize) -> DetectNode {
        let arms = trie
            .children(node)
            .map(|(byte, child)| {
                let consumed = depth + 1;
                // Every leaf is terminal, so a leaf needs no further test
                let sub = if trie.is_leaf(child) {
                    DetectNode::Accept(consumed)
                } else {
                    let inner = if trie.terminal(child).is_some() {
                        consumed
                    } else {
                        fallback
                    };
                    lower(trie, child, consumed, inner)
                };
                (byte, sub)
            })
            .collect();
        DetectNode::Branch {
            depth,
            arms,
            fallback,
        }
    }

    let program = DetectorProgram {
        root: lower(trie, ByteTrie::ROOT, 0, 0),
        max_len: trie.max_depth(),
    };
    tracing::debug!(
        phonemes = trie.len(),
        max_len = program.max_len,
        "lowered boundary detector"
    );
    program
}

// ============================================================================
// Phonetic cost lookup
// ============================================================================

/// Which operand of the cost lookup a branch reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    First,
    Second,
}

/// Branch tree of the phonetic-cost lookup. Anything unmatched yields the
/// sentinel cost.
#[derive(Debug, Clone, PartialEq)]
pub enum CostNode {
    Return(f64),
    /// Switch on byte `depth` of one operand
    Byte {
        operand: Operand,
        depth: usize,
        arms: Vec<(u8, CostNode)>,
    },
    /// Switch on the second operand's byte length
    Length { arms: Vec<(usize, CostNode)> },
}

/// Pairwise phoneme cost lookup, one body per first-operand byte length
#[derive(Debug, Clone, PartialEq)]
pub struct CostProgram {
    sentinel: f64,
    by_length: Vec<(usize, CostNode)>,
    emitted_pairs: usize,
    pruned_pairs: usize,
}

impl CostProgram {
    /// Cost returned for anything that is not a known, recorded pair
    #[inline]
    #[must_use]
    pub fn sentinel(&self) -> f64 {
        self.sentinel
    }

    /// Bodies keyed by first-operand byte length, ascending
    #[inline]
    #[must_use]
    pub fn bodies(&self) -> &[(usize, CostNode)] {
        &self.by_length
    }

    /// Number of pairs with an explicit return
    #[inline]
    #[must_use]
    pub fn emitted_pairs(&self) -> usize {
        self.emitted_pairs
    }

    /// Number of pairs left to the sentinel fallback
    #[inline]
    #[must_use]
    pub fn pruned_pairs(&self) -> usize {
        self.pruned_pairs
    }

    /// Cost between `a[a_off..a_off + a_len]` and `b[b_off..b_off + b_len]`.
    ///
    /// Each side must be exactly one known phoneme; otherwise, or when the
    /// range is outside its buffer, the sentinel is returned.
    #[must_use]
    pub fn eval(
        &self,
        a: &[u8],
        a_off: usize,
        a_len: usize,
        b: &[u8],
        b_off: usize,
        b_len: usize,
    ) -> f64 {
        match (window(a, a_off, a_len), window(b, b_off, b_len)) {
            (Some(a), Some(b)) => self.lookup(a, b),
            _ => self.sentinel,
        }
    }

    /// Cost between two whole byte slices
    #[must_use]
    pub fn lookup(&self, a: &[u8], b: &[u8]) -> f64 {
        let Ok(i) = self.by_length.binary_search_by_key(&a.len(), |(len, _)| *len) else {
            return self.sentinel;
        };

        let mut node = &self.by_length[i].1;
        loop {
            match node {
                CostNode::Return(value) => return *value,
                CostNode::Byte {
                    operand,
                    depth,
                    arms,
                } => {
                    let bytes = match operand {
                        Operand::First => a,
                        Operand::Second => b,
                    };
                    let Some(&byte) = bytes.get(*depth) else {
                        return self.sentinel;
                    };
                    match arms.binary_search_by_key(&byte, |(b, _)| *b) {
                        Ok(i) => node = &arms[i].1,
                        Err(_) => return self.sentinel,
                    }
                }
                CostNode::Length { arms } => {
                    match arms.binary_search_by_key(&b.len(), |(len, _)| *len) {
                        Ok(i) => node = &arms[i].1,
                        Err(_) => return self.sentinel,
                    }
                }
            }
        }
    }
}

impl CostModel for CostProgram {
    #[inline]
    fn cost(&self, a: &Phoneme, b: &Phoneme) -> f64 {
        self.lookup(a.as_bytes(), b.as_bytes())
    }

    fn name(&self) -> &'static str {
        "compiled_dispatch"
    }
}

fn window(buf: &[u8], off: usize, len: usize) -> Option<&[u8]> {
    let end = off.checked_add(len)?;
    buf.get(off..end)
}

/// Lower an inventory's distance table into a cost lookup.
///
/// The inventory is partitioned by byte length and one trie is built per
/// length. Pairs whose distance equals `sentinel` are omitted, as are
/// branches left empty by that pruning.
pub fn lower_cost(inventory: &PhonemeInventory, sentinel: f64) -> Result<CostProgram> {
    let groups = inventory.by_length();
    let mut tries: BTreeMap<usize, ByteTrie> = BTreeMap::new();
    for (&len, ids) in &groups {
        let trie = ByteTrie::build(ids.iter().map(|&id| {
            let p = &inventory.phonemes()[id];
            (id, p.as_bytes())
        }))?;
        tries.insert(len, trie);
    }

    let mut lowering = CostLowering {
        inventory,
        tries: &tries,
        sentinel,
        emitted: 0,
        pruned: 0,
    };
    let by_length: Vec<(usize, CostNode)> = tries
        .iter()
        .filter_map(|(&len, trie)| {
            lowering
                .walk(trie, ByteTrie::ROOT, 0, Operand::First, None)
                .map(|body| (len, body))
        })
        .collect();

    tracing::debug!(
        lengths = by_length.len(),
        emitted = lowering.emitted,
        pruned = lowering.pruned,
        "lowered phonetic cost lookup"
    );

    Ok(CostProgram {
        sentinel,
        by_length,
        emitted_pairs: lowering.emitted,
        pruned_pairs: lowering.pruned,
    })
}

struct CostLowering<'a> {
    inventory: &'a PhonemeInventory,
    tries: &'a BTreeMap<usize, ByteTrie>,
    sentinel: f64,
    emitted: usize,
    pruned: usize,
}

impl CostLowering<'_> {
    /// Walk one operand's trie. `first` is the already-resolved first
    /// operand when walking the second. `None` means every pair below was
    /// pruned.
    fn walk(
        &mut self,
        trie: &ByteTrie,
        node: NodeId,
        depth: usize,
        operand: Operand,
        first: Option<usize>,
    ) -> Option<CostNode> {
        // Tries are per length, so a terminal is always a leaf at full depth
        if let Some(id) = trie.terminal(node) {
            return match (operand, first) {
                (Operand::First, _) => self.second_operand(id),
                (Operand::Second, Some(from)) => self.pair(from, id),
                (Operand::Second, None) => None,
            };
        }

        let arms: Vec<(u8, CostNode)> = trie
            .children(node)
            .filter_map(|(byte, child)| {
                self.walk(trie, child, depth + 1, operand, first)
                    .map(|sub| (byte, sub))
            })
            .collect();

        if arms.is_empty() {
            None
        } else {
            Some(CostNode::Byte {
                operand,
                depth,
                arms,
            })
        }
    }

    fn second_operand(&mut self, from: usize) -> Option<CostNode> {
        let tries = self.tries;
        let arms: Vec<(usize, CostNode)> = tries
            .iter()
            .filter_map(|(&len, trie)| {
                self.walk(trie, ByteTrie::ROOT, 0, Operand::Second, Some(from))
                    .map(|sub| (len, sub))
            })
            .collect();

        if arms.is_empty() {
            None
        } else {
            Some(CostNode::Length { arms })
        }
    }

    fn pair(&mut self, from: usize, to: usize) -> Option<CostNode> {
        let value = self.inventory.distance(from, to);
        if value == self.sentinel {
            self.pruned += 1;
            None
        } else {
            self.emitted += 1;
            Some(CostNode::Return(value))
        }
    }
}
