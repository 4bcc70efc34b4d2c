//! Byte trie over a phoneme inventory
//!
//! An arena of nodes keyed by byte value. Children are kept in a `BTreeMap`
//! so that every walk, and therefore every piece of generated code, visits
//! branches in ascending byte order and is reproducible run to run.

use crate::error::{display_bytes, PhoneticError, Result};
use std::collections::BTreeMap;

/// Index of a node inside a [`ByteTrie`]
pub type NodeId = usize;

#[derive(Debug, Clone, Default)]
struct TrieNode {
    children: BTreeMap<u8, NodeId>,
    /// Id of the phoneme whose bytes end exactly here
    terminal: Option<usize>,
}

/// Trie keyed by successive bytes of each phoneme.
///
/// Each terminal carries the caller-supplied id of the unique phoneme whose
/// byte path ends at that node. Inserting a second phoneme with the same
/// byte path is rejected with [`PhoneticError::DuplicateByteSequence`].
#[derive(Debug, Clone)]
pub struct ByteTrie {
    nodes: Vec<TrieNode>,
    terminals: usize,
}

impl Default for ByteTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteTrie {
    /// Id of the root node
    pub const ROOT: NodeId = 0;

    /// Create an empty trie holding only the root
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
            terminals: 0,
        }
    }

    /// Build a trie from `(id, bytes)` pairs.
    ///
    /// # Errors
    ///
    /// Fails on the first empty byte sequence or the first byte path that is
    /// already terminal for another id.
    ///
    /// # Example
    /// ```
    /// use ipadist::compiler::trie::ByteTrie;
    ///
    /// let trie = ByteTrie::build([(0, "a".as_bytes()), (1, "ab".as_bytes())]).unwrap();
    /// assert_eq!(trie.longest_match(b"abc"), Some((2, 1)));
    /// assert!(ByteTrie::build([(0, "a".as_bytes()), (1, "a".as_bytes())]).is_err());
    /// ```
    pub fn build<'a, I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, &'a [u8])>,
    {
        let mut trie = Self::new();
        for (id, bytes) in entries {
            trie.insert(id, bytes)?;
        }
        tracing::debug!(
            phonemes = trie.terminals,
            nodes = trie.nodes.len(),
            "built byte trie"
        );
        Ok(trie)
    }

    /// Insert one phoneme's byte path.
    pub fn insert(&mut self, id: usize, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Err(PhoneticError::EmptyPhoneme);
        }

        let mut node = Self::ROOT;
        for &byte in bytes {
            node = match self.nodes[node].children.get(&byte) {
                Some(&next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(TrieNode::default());
                    self.nodes[node].children.insert(byte, next);
                    next
                }
            };
        }

        match self.nodes[node].terminal {
            Some(existing) => Err(PhoneticError::DuplicateByteSequence {
                first: display_bytes(bytes),
                second: display_bytes(bytes),
                first_index: existing,
                second_index: id,
            }),
            None => {
                self.nodes[node].terminal = Some(id);
                self.terminals += 1;
                Ok(())
            }
        }
    }

    /// Number of phonemes stored
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.terminals
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terminals == 0
    }

    /// Number of nodes including the root
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Children of `node` in ascending byte order
    pub fn children(&self, node: NodeId) -> impl Iterator<Item = (u8, NodeId)> + '_ {
        self.nodes[node].children.iter().map(|(&b, &n)| (b, n))
    }

    #[inline]
    #[must_use]
    pub fn child(&self, node: NodeId, byte: u8) -> Option<NodeId> {
        self.nodes[node].children.get(&byte).copied()
    }

    /// Phoneme id ending at `node`, if any
    #[inline]
    #[must_use]
    pub fn terminal(&self, node: NodeId) -> Option<usize> {
        self.nodes[node].terminal
    }

    #[inline]
    #[must_use]
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.nodes[node].children.is_empty()
    }

    /// Id of the phoneme whose bytes are exactly `bytes`
    #[must_use]
    pub fn exact(&self, bytes: &[u8]) -> Option<usize> {
        let mut node = Self::ROOT;
        for &byte in bytes {
            node = self.child(node, byte)?;
        }
        self.terminal(node)
    }

    /// Longest phoneme that is a prefix of `bytes`, as `(byte_len, id)`.
    #[must_use]
    pub fn longest_match(&self, bytes: &[u8]) -> Option<(usize, usize)> {
        let mut node = Self::ROOT;
        let mut best = None;
        for (depth, &byte) in bytes.iter().enumerate() {
            match self.child(node, byte) {
                Some(next) => node = next,
                None => break,
            }
            if let Some(id) = self.terminal(node) {
                best = Some((depth + 1, id));
            }
        }
        best
    }

    /// Length of the longest byte path
    #[must_use]
    pub fn max_depth(&self) -> usize {
        fn depth(trie: &ByteTrie, node: NodeId) -> usize {
            trie.children(node)
                .map(|(_, child)| 1 + depth(trie, child))
                .max()
                .unwrap_or(0)
        }
        depth(self, Self::ROOT)
    }
}
