//! Dispatch compiler
//!
//! Turns a phoneme inventory into two pieces of straight-line branching
//! code: a boundary detector that finds the phoneme starting at a buffer
//! position, and a cost lookup that returns the distance between two
//! phonemes given as byte ranges. Both are built as in-memory programs
//! first ([`DetectorProgram`], [`CostProgram`]), which can be evaluated
//! directly or printed as C or Rust source.
//!
//! # Example
//!
//! ```rust
//! use ipadist::compiler::{CompileOptions, DispatchCompiler, Target};
//! use ipadist::inventory::PhonemeInventory;
//!
//! let inventory = PhonemeInventory::builder("toy")
//!     .phonemes(["a", "b", "ab"])
//!     .distance("a", "ab", 0.5)
//!     .symmetric()
//!     .build()
//!     .unwrap();
//!
//! let options = CompileOptions::default().with_target(Target::Rust).with_prefix("toy");
//! let compiled = DispatchCompiler::new(&inventory, options).compile().unwrap();
//!
//! assert_eq!(compiled.detector.eval(b"ab", 0, 2), 2);
//! assert_eq!(compiled.cost.lookup(b"a", b"ab"), 0.5);
//! assert_eq!(compiled.cost.lookup(b"a", b"b"), 1.0);
//! assert!(compiled.render().contains("pub fn toy_phoneme_len("));
//! ```

mod emit;
pub mod lower;
pub mod trie;

pub use lower::{CostNode, CostProgram, DetectNode, DetectorProgram, Operand};
pub use trie::ByteTrie;

use crate::error::{PhoneticError, Result};
use crate::inventory::PhonemeInventory;
use crate::SENTINEL_COST;
use emit::CodeWriter;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Output language for generated code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    #[default]
    C,
    Rust,
}

impl Target {
    /// Conventional file extension for this target
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Target::C => "c",
            Target::Rust => "rs",
        }
    }
}

/// Code generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileOptions {
    pub target: Target,
    /// Prefix of every generated function name
    pub prefix: String,
    /// Cost returned for pairs with no explicit arm
    pub sentinel: f64,
    /// One level of indentation
    pub indent: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            target: Target::C,
            prefix: "ipa".to_string(),
            sentinel: SENTINEL_COST,
            indent: "    ".to_string(),
        }
    }
}

impl CompileOptions {
    #[must_use]
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_sentinel(mut self, sentinel: f64) -> Self {
        self.sentinel = sentinel;
        self
    }

    #[must_use]
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    fn validate(&self) -> Result<()> {
        let identifier = self
            .prefix
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && self.prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !identifier {
            return Err(PhoneticError::InvalidPrefix(self.prefix.clone()));
        }
        if !self.sentinel.is_finite() {
            return Err(PhoneticError::InvalidSentinel(self.sentinel));
        }
        Ok(())
    }
}

/// Compiles one inventory with one set of options
#[derive(Debug, Clone)]
pub struct DispatchCompiler<'a> {
    inventory: &'a PhonemeInventory,
    options: CompileOptions,
}

impl<'a> DispatchCompiler<'a> {
    #[must_use]
    pub fn new(inventory: &'a PhonemeInventory, options: CompileOptions) -> Self {
        Self { inventory, options }
    }

    #[inline]
    #[must_use]
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Byte trie over the whole inventory, as validated when the inventory
    /// was built
    #[inline]
    #[must_use]
    pub fn trie(&self) -> &'a ByteTrie {
        self.inventory.trie()
    }

    /// Lower the inventory into both dispatch programs.
    ///
    /// # Errors
    ///
    /// [`PhoneticError::InvalidPrefix`] or [`PhoneticError::InvalidSentinel`]
    /// for unusable options.
    pub fn compile(&self) -> Result<CompiledDispatch> {
        self.options.validate()?;
        let trie = self.trie();
        let detector = lower::lower_detector(trie);
        let cost = lower::lower_cost(self.inventory, self.options.sentinel)?;
        tracing::debug!(
            inventory = self.inventory.name(),
            output = ?self.options.target,
            trie_nodes = trie.node_count(),
            "compiled dispatch"
        );
        Ok(CompiledDispatch {
            detector,
            cost,
            options: self.options.clone(),
            inventory: self.inventory.name().to_string(),
            phonemes: self.inventory.len(),
        })
    }

    /// Compile and write the full generated source to `out`
    pub fn compile_to<W: Write>(&self, out: &mut W) -> Result<CompiledDispatch> {
        let compiled = self.compile()?;
        compiled.write_to(out)?;
        Ok(compiled)
    }
}

/// Both programs for one inventory, ready to evaluate or print
#[derive(Debug, Clone)]
pub struct CompiledDispatch {
    pub detector: DetectorProgram,
    pub cost: CostProgram,
    options: CompileOptions,
    inventory: String,
    phonemes: usize,
}

impl CompiledDispatch {
    #[inline]
    #[must_use]
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Name of the generated boundary-detector function
    #[must_use]
    pub fn detector_name(&self) -> String {
        emit::detector_name(&self.options)
    }

    /// Name of the generated cost-lookup function
    #[must_use]
    pub fn lookup_name(&self) -> String {
        emit::lookup_name(&self.options)
    }

    /// Source of the boundary detector alone
    #[must_use]
    pub fn render_detector(&self) -> String {
        let mut w = CodeWriter::new(&self.options.indent);
        emit::emit_detector(&mut w, &self.detector, &self.options);
        w.finish()
    }

    /// Source of the cost lookup alone
    #[must_use]
    pub fn render_lookup(&self) -> String {
        let mut w = CodeWriter::new(&self.options.indent);
        emit::emit_lookup(&mut w, &self.cost, &self.options);
        w.finish()
    }

    /// One self-contained source file with both functions
    #[must_use]
    pub fn render(&self) -> String {
        let mut w = CodeWriter::new(&self.options.indent);
        emit::emit_preamble(&mut w, &self.options, &self.inventory, self.phonemes);
        w.blank();
        emit::emit_detector(&mut w, &self.detector, &self.options);
        w.blank();
        emit::emit_lookup(&mut w, &self.cost, &self.options);
        w.finish()
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<()> {
        let text = self.render();
        out.write_all(text.as_bytes())?;
        tracing::debug!(
            bytes = text.len(),
            output = ?self.options.target,
            "emitted dispatch source"
        );
        Ok(())
    }
}
