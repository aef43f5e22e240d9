//! Parsed CDS source lines.
//!
//! One [`SyntaxNode`] per recognized line, produced by the compiler's second
//! pass and immutable afterwards. Every node keeps its originating line
//! number and raw text for diagnostics; macro nodes own their expanded child
//! operations exclusively.

use std::path::PathBuf;

/// One resolved machine instruction.
#[derive(Debug, Clone)]
pub struct Operation {
    pub line_number: usize,
    pub line_text: String,
    pub address: u32,
    pub mnemonic: String,
    pub word: u32,
}

/// A raw 32-bit literal placed at an address.
#[derive(Debug, Clone)]
pub struct HexCode {
    pub line_number: usize,
    pub line_text: String,
    pub address: u32,
    pub value: u32,
}

#[derive(Debug, Clone)]
pub enum SyntaxNode {
    /// `address $XXXXXXXX` — sets the current emission address.
    Address {
        line_number: usize,
        line_text: String,
        address: u32,
    },
    HexCode(HexCode),
    /// `name:` — zero-width address marker.
    Label {
        line_number: usize,
        line_text: String,
        address: u32,
        name: String,
    },
    Operation(Operation),
    /// An operation whose label operand resolved to a relative offset.
    OperationBranch {
        operation: Operation,
        label: String,
        label_address: u32,
        offset: i32,
    },
    /// An operation whose label operand resolved to an absolute target.
    OperationJump {
        operation: Operation,
        label: String,
        target_address: u32,
    },
    /// `setreg reg, $XXXXXXXX` — load-upper + add-immediate pair.
    SetReg {
        line_number: usize,
        line_text: String,
        address: u32,
        register: String,
        value: u32,
        operations: Vec<Operation>,
    },
    /// `string "text"` — NUL-terminated, word-aligned, little-endian packed.
    String {
        line_number: usize,
        line_text: String,
        address: u32,
        text: String,
        words: Vec<HexCode>,
    },
    /// `mem[0xOFF] reg OP operand` — read-modify-write expansion.
    Memory {
        line_number: usize,
        line_text: String,
        address: u32,
        offset: String,
        register: String,
        operator: String,
        operations: Vec<Operation>,
    },
    /// `include "path"` — another source spliced in after this file.
    Include {
        line_number: usize,
        line_text: String,
        path: PathBuf,
    },
    SingleLineComment {
        line_number: usize,
        line_text: String,
        text: String,
    },
    MultiLineComment {
        line_number: usize,
        line_text: String,
        text: String,
    },
}

impl SyntaxNode {
    pub fn kind_name(&self) -> &'static str {
        match self {
            SyntaxNode::Address { .. } => "Address",
            SyntaxNode::HexCode(_) => "HexCode",
            SyntaxNode::Label { .. } => "Label",
            SyntaxNode::Operation(_) => "Operation",
            SyntaxNode::OperationBranch { .. } => "OperationBranch",
            SyntaxNode::OperationJump { .. } => "OperationJump",
            SyntaxNode::SetReg { .. } => "SetReg",
            SyntaxNode::String { .. } => "String",
            SyntaxNode::Memory { .. } => "Memory",
            SyntaxNode::Include { .. } => "Include",
            SyntaxNode::SingleLineComment { .. } => "SingleLineComment",
            SyntaxNode::MultiLineComment { .. } => "MultiLineComment",
        }
    }

    pub fn line_number(&self) -> usize {
        match self {
            SyntaxNode::Address { line_number, .. }
            | SyntaxNode::Label { line_number, .. }
            | SyntaxNode::SetReg { line_number, .. }
            | SyntaxNode::String { line_number, .. }
            | SyntaxNode::Memory { line_number, .. }
            | SyntaxNode::Include { line_number, .. }
            | SyntaxNode::SingleLineComment { line_number, .. }
            | SyntaxNode::MultiLineComment { line_number, .. } => *line_number,
            SyntaxNode::HexCode(h) => h.line_number,
            SyntaxNode::Operation(op) => op.line_number,
            SyntaxNode::OperationBranch { operation, .. }
            | SyntaxNode::OperationJump { operation, .. } => operation.line_number,
        }
    }

    pub fn line_text(&self) -> &str {
        match self {
            SyntaxNode::Address { line_text, .. }
            | SyntaxNode::Label { line_text, .. }
            | SyntaxNode::SetReg { line_text, .. }
            | SyntaxNode::String { line_text, .. }
            | SyntaxNode::Memory { line_text, .. }
            | SyntaxNode::Include { line_text, .. }
            | SyntaxNode::SingleLineComment { line_text, .. }
            | SyntaxNode::MultiLineComment { line_text, .. } => line_text,
            SyntaxNode::HexCode(h) => &h.line_text,
            SyntaxNode::Operation(op) => &op.line_text,
            SyntaxNode::OperationBranch { operation, .. }
            | SyntaxNode::OperationJump { operation, .. } => &operation.line_text,
        }
    }

    /// The `(address, word)` pairs this node contributes to the cheat code,
    /// in emission order. Non-emitting nodes return nothing.
    pub fn emitted(&self) -> Vec<(u32, u32)> {
        match self {
            SyntaxNode::HexCode(h) => vec![(h.address, h.value)],
            SyntaxNode::Operation(op) => vec![(op.address, op.word)],
            SyntaxNode::OperationBranch { operation, .. }
            | SyntaxNode::OperationJump { operation, .. } => {
                vec![(operation.address, operation.word)]
            }
            SyntaxNode::SetReg { operations, .. } | SyntaxNode::Memory { operations, .. } => {
                operations.iter().map(|op| (op.address, op.word)).collect()
            }
            SyntaxNode::String { words, .. } => {
                words.iter().map(|w| (w.address, w.value)).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Render the cheat-code artifact: one `XXXXXXXX YYYYYYYY` line per emitted
/// word, uppercase hex, in source order.
pub fn render_cheat_code(nodes: &[SyntaxNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        for (address, word) in node.emitted() {
            out.push_str(&format!("{address:08X} {word:08X}\n"));
        }
    }
    out
}

/// Render the per-node debug trace: a header line per node plus one nested
/// `>>` line per expanded machine word.
pub fn render_debug_trace(nodes: &[SyntaxNode]) -> Vec<String> {
    let mut out = Vec::new();
    for node in nodes {
        out.push(format!(
            "[Line #{}]\t{:<25}\t[{}]",
            node.line_number(),
            node.kind_name(),
            node.line_text()
        ));
        for (address, word) in node.emitted() {
            out.push(format!(">>{address:08X} {word:08X}"));
        }
    }
    out
}
