//! Source emission for dispatch programs
//!
//! Both backends print the same branch trees; they differ only in syntax.
//! Output is a pure function of the program and the options, so rebuilding
//! from an unchanged inventory yields byte-identical text.

use super::lower::{CostNode, CostProgram, DetectNode, DetectorProgram, Operand};
use super::{CompileOptions, Target};

// ============================================================================
// Writer
// ============================================================================

/// Line-oriented text buffer with explicit nesting levels
#[derive(Debug)]
pub(crate) struct CodeWriter {
    out: String,
    indent: String,
}

impl CodeWriter {
    pub(crate) fn new(indent: &str) -> Self {
        Self {
            out: String::new(),
            indent: indent.to_string(),
        }
    }

    pub(crate) fn line(&mut self, level: usize, text: &str) {
        if !text.is_empty() {
            for _ in 0..level {
                self.out.push_str(&self.indent);
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    pub(crate) fn blank(&mut self) {
        self.out.push('\n');
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }
}

/// Float literal accepted by both C and Rust
fn float_literal(value: f64) -> String {
    // `{:?}` always keeps a decimal point or exponent
    format!("{value:?}")
}

fn hex(byte: u8) -> String {
    format!("0x{byte:02x}")
}

// ============================================================================
// Names
// ============================================================================

pub(crate) fn detector_name(options: &CompileOptions) -> String {
    format!("{}_phoneme_len", options.prefix)
}

pub(crate) fn lookup_name(options: &CompileOptions) -> String {
    format!("{}_phoneme_cost", options.prefix)
}

fn body_name(options: &CompileOptions, len: usize) -> String {
    format!("{}_cost_len{len}", options.prefix)
}

// ============================================================================
// Entry points
// ============================================================================

/// Header comment and, for C, includes
pub(crate) fn emit_preamble(w: &mut CodeWriter, options: &CompileOptions, inventory: &str, phonemes: usize) {
    match options.target {
        Target::C => {
            w.line(0, &format!(
                "/* Generated from phoneme inventory \"{inventory}\" ({phonemes} phonemes). Do not edit. */"
            ));
            w.blank();
            w.line(0, "#include <stddef.h>");
        }
        Target::Rust => {
            w.line(0, &format!(
                "// @generated from phoneme inventory \"{inventory}\" ({phonemes} phonemes). Do not edit."
            ));
        }
    }
}

pub(crate) fn emit_detector(w: &mut CodeWriter, program: &DetectorProgram, options: &CompileOptions) {
    let name = detector_name(options);
    match options.target {
        Target::C => {
            w.line(0, &format!(
                "size_t {name}(const unsigned char *buf, size_t pos, size_t len)"
            ));
            w.line(0, "{");
            w.line(1, "if (pos >= len) {");
            w.line(2, "return 0;");
            w.line(1, "}");
            w.line(1, "const unsigned char *p = buf + pos;");
            w.line(1, "size_t rem = len - pos;");
            c_detect(w, 1, program.root());
            w.line(0, "}");
        }
        Target::Rust => {
            w.line(0, &format!(
                "pub fn {name}(buf: &[u8], pos: usize, len: usize) -> usize {{"
            ));
            w.line(1, "let len = len.min(buf.len());");
            w.line(1, "if pos >= len {");
            w.line(2, "return 0;");
            w.line(1, "}");
            w.line(1, "let p = &buf[pos..len];");
            rust_detect(w, 1, "", program.root(), "");
            w.line(0, "}");
        }
    }
}

pub(crate) fn emit_lookup(w: &mut CodeWriter, program: &CostProgram, options: &CompileOptions) {
    let sentinel = float_literal(program.sentinel());
    let name = lookup_name(options);
    match options.target {
        Target::C => {
            for (len, body) in program.bodies() {
                w.line(0, &format!(
                    "static double {}(const unsigned char *a, const unsigned char *b, size_t b_len)",
                    body_name(options, *len)
                ));
                w.line(0, "{");
                c_cost(w, 1, body);
                w.line(1, &format!("return {sentinel};"));
                w.line(0, "}");
                w.blank();
            }

            w.line(0, &format!(
                "double {name}(const unsigned char *a, size_t a_off, size_t a_len,"
            ));
            w.line(0, "              const unsigned char *b, size_t b_off, size_t b_len)");
            w.line(0, "{");
            w.line(1, "a += a_off;");
            w.line(1, "b += b_off;");
            w.line(1, "switch (a_len) {");
            for (len, _) in program.bodies() {
                w.line(1, &format!("case {len}:"));
                w.line(2, &format!("return {}(a, b, b_len);", body_name(options, *len)));
            }
            w.line(1, "default:");
            w.line(2, &format!("return {sentinel};"));
            w.line(1, "}");
            w.line(0, "}");
        }
        Target::Rust => {
            for (len, body) in program.bodies() {
                w.line(0, &format!(
                    "fn {}(a: &[u8], b: &[u8]) -> f64 {{",
                    body_name(options, *len)
                ));
                rust_cost(w, 1, "", body, "", &sentinel);
                w.line(0, "}");
                w.blank();
            }

            w.line(0, &format!(
                "pub fn {name}(a: &[u8], a_off: usize, a_len: usize, b: &[u8], b_off: usize, b_len: usize) -> f64 {{"
            ));
            w.line(1, "let a = match a_off.checked_add(a_len).and_then(|end| a.get(a_off..end)) {");
            w.line(2, "Some(a) => a,");
            w.line(2, &format!("None => return {sentinel},"));
            w.line(1, "};");
            w.line(1, "let b = match b_off.checked_add(b_len).and_then(|end| b.get(b_off..end)) {");
            w.line(2, "Some(b) => b,");
            w.line(2, &format!("None => return {sentinel},"));
            w.line(1, "};");
            w.line(1, "match a.len() {");
            for (len, _) in program.bodies() {
                w.line(2, &format!("{len} => {}(a, b),", body_name(options, *len)));
            }
            w.line(2, &format!("_ => {sentinel},"));
            w.line(1, "}");
            w.line(0, "}");
        }
    }
}

// ============================================================================
// C
// ============================================================================

fn c_detect(w: &mut CodeWriter, level: usize, node: &DetectNode) {
    match node {
        DetectNode::Accept(n) => w.line(level, &format!("return {n};")),
        DetectNode::Branch {
            depth,
            arms,
            fallback,
        } => {
            // rem >= 1 is already known at the root
            if *depth > 0 {
                w.line(level, &format!("if (rem <= {depth}) {{"));
                w.line(level + 1, &format!("return {fallback};"));
                w.line(level, "}");
            }
            w.line(level, &format!("switch (p[{depth}]) {{"));
            for (byte, sub) in arms {
                w.line(level, &format!("case {}:", hex(*byte)));
                c_detect(w, level + 1, sub);
            }
            w.line(level, "default:");
            w.line(level + 1, &format!("return {fallback};"));
            w.line(level, "}");
        }
    }
}

fn c_cost(w: &mut CodeWriter, level: usize, node: &CostNode) {
    match node {
        CostNode::Return(value) => w.line(level, &format!("return {};", float_literal(*value))),
        CostNode::Byte {
            operand,
            depth,
            arms,
        } => {
            let var = match operand {
                Operand::First => "a",
                Operand::Second => "b",
            };
            w.line(level, &format!("switch ({var}[{depth}]) {{"));
            for (byte, sub) in arms {
                w.line(level, &format!("case {}:", hex(*byte)));
                c_cost(w, level + 1, sub);
                if !matches!(sub, CostNode::Return(_)) {
                    w.line(level + 1, "break;");
                }
            }
            w.line(level, "}");
        }
        CostNode::Length { arms } => {
            w.line(level, "switch (b_len) {");
            for (len, sub) in arms {
                w.line(level, &format!("case {len}:"));
                c_cost(w, level + 1, sub);
                if !matches!(sub, CostNode::Return(_)) {
                    w.line(level + 1, "break;");
                }
            }
            w.line(level, "}");
        }
    }
}

// ============================================================================
// Rust
// ============================================================================

/// Print `node` as an expression; `head` starts its first line and `tail`
/// ends its last.
fn rust_detect(w: &mut CodeWriter, level: usize, head: &str, node: &DetectNode, tail: &str) {
    match node {
        DetectNode::Accept(n) => w.line(level, &format!("{head}{n}{tail}")),
        DetectNode::Branch {
            depth,
            arms,
            fallback,
        } => {
            w.line(level, &format!("{head}match p.get({depth}).copied() {{"));
            for (byte, sub) in arms {
                let arm = format!("Some({}) => ", hex(*byte));
                rust_detect(w, level + 1, &arm, sub, ",");
            }
            w.line(level + 1, &format!("_ => {fallback},"));
            w.line(level, &format!("}}{tail}"));
        }
    }
}

fn rust_cost(w: &mut CodeWriter, level: usize, head: &str, node: &CostNode, tail: &str, sentinel: &str) {
    match node {
        CostNode::Return(value) => {
            w.line(level, &format!("{head}{}{tail}", float_literal(*value)));
        }
        CostNode::Byte {
            operand,
            depth,
            arms,
        } => {
            let var = match operand {
                Operand::First => "a",
                Operand::Second => "b",
            };
            // Within a body both operand lengths are fixed, so indexing is in bounds
            w.line(level, &format!("{head}match {var}[{depth}] {{"));
            for (byte, sub) in arms {
                let arm = format!("{} => ", hex(*byte));
                rust_cost(w, level + 1, &arm, sub, ",", sentinel);
            }
            w.line(level + 1, &format!("_ => {sentinel},"));
            w.line(level, &format!("}}{tail}"));
        }
        CostNode::Length { arms } => {
            w.line(level, &format!("{head}match b.len() {{"));
            for (len, sub) in arms {
                let arm = format!("{len} => ");
                rust_cost(w, level + 1, &arm, sub, ",", sentinel);
            }
            w.line(level + 1, &format!("_ => {sentinel},"));
            w.line(level, &format!("}}{tail}"));
        }
    }
}
