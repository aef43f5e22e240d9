//! Two-pass, line-oriented CDS compiler.
//!
//! Pass 1 builds the label map by simulating each directive's emission size;
//! pass 2 re-scans with the same line classification order and emits resolved
//! syntax nodes, encoding instructions through the codec. Reference errors
//! abort the offending node only; diagnostics accumulate so one bad line does
//! not hide the rest.

use crate::catalog::{Catalog, Category};
use crate::encode::{EncodeError, Encoder};
use crate::log::Logger;
use crate::syntax::{HexCode, Operation, SyntaxNode};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Scratch register used by the memory macro expansion.
const SCRATCH: &str = "t9";

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("line {line}: unrecognized syntax '{text}'")]
    Unrecognized { line: usize, text: String },
    #[error("line {line}: unknown label '{label}'")]
    UnknownLabel { line: usize, label: String },
    #[error("line {line}: label operand on non-branch instruction '{mnemonic}'")]
    LabelOnPlainOperation { line: usize, mnemonic: String },
    #[error("line {line}: {source}")]
    Encode {
        line: usize,
        #[source]
        source: EncodeError,
    },
    #[error("line {line}: invalid register name '{register}'")]
    InvalidRegister { line: usize, register: String },
    #[error("line {line}: invalid operator '{operator}'")]
    InvalidOperator { line: usize, operator: String },
    #[error("line {line}: invalid offset '{offset}', expected a 0x-prefixed address")]
    InvalidOffset { line: usize, offset: String },
    #[error("line {line}: invalid operand '{operand}'")]
    InvalidOperand { line: usize, operand: String },
    #[error("line {line}: '{operator}' operand {operand} must be a power of two")]
    NonPowerOfTwo {
        line: usize,
        operator: String,
        operand: u32,
    },
    #[error("line {line}: included file not found: {path}")]
    IncludeNotFound { line: usize, path: PathBuf },
    #[error("include cycle detected at {path}")]
    IncludeCycle { path: PathBuf },
}

pub struct Parser<'a> {
    catalog: &'a Catalog,
    encoder: Encoder<'a>,
    logger: &'a mut dyn Logger,
    errors: Vec<CompileError>,
}

impl<'a> Parser<'a> {
    pub fn new(catalog: &'a Catalog, logger: &'a mut dyn Logger) -> Self {
        Self {
            catalog,
            encoder: Encoder::new(catalog),
            logger,
            errors: Vec::new(),
        }
    }

    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<CompileError> {
        std::mem::take(&mut self.errors)
    }

    /// Pass 1: label name (lowercased) to resolved address, first write wins.
    ///
    /// Unrecognized lines are warned about and do not advance the address
    /// counter; includes occupy no space in the including file because their
    /// nodes splice in after it.
    pub fn build_label_map(&mut self, source: &str) -> HashMap<String, u32> {
        let mut labels: HashMap<String, u32> = HashMap::new();
        let mut address: u32 = 0;
        let mut in_comment = false;

        for raw in source.lines() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if in_comment {
                if line.contains("*/") {
                    in_comment = false;
                }
                continue;
            }
            if line.starts_with("/*") {
                in_comment = !line.contains("*/");
                continue;
            }
            if line.starts_with("//") || parse_include(line).is_some() {
                continue;
            }
            if let Some(addr) = parse_address(line) {
                address = addr;
                continue;
            }
            if let Some((name, rest)) = parse_label(line) {
                let key = name.to_lowercase();
                if !labels.contains_key(&key) {
                    self.logger.debug(&format!(
                        "[First Pass] Found label '{key}' at address 0x{address:08X}"
                    ));
                    labels.insert(key, address);
                }
                let rest = rest.trim();
                if !rest.is_empty() {
                    match tail_emission_size(rest) {
                        Some(size) => address = address.wrapping_add(size),
                        None => self.logger.warning(&format!("Unrecognized line: {rest}")),
                    }
                }
                continue;
            }
            match emission_size(line) {
                Some(size) => address = address.wrapping_add(size),
                None => self.logger.warning(&format!("Unrecognized line: {line}")),
            }
        }
        labels
    }

    /// Pass 2: emit resolved syntax nodes, using the pass-1 label map for
    /// branch and jump operands. Relative includes resolve against
    /// `base_path`.
    pub fn parse(&mut self, source: &str, base_path: &Path) -> Vec<SyntaxNode> {
        let labels = self.build_label_map(source);
        let mut nodes: Vec<SyntaxNode> = Vec::new();
        let mut address: u32 = 0;
        let mut in_comment = false;
        let mut comment_buffer = String::new();
        let mut comment_start = 0usize;

        for (index, raw) in source.lines().enumerate() {
            let line_number = index + 1;
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(path) = parse_include(line) {
                let full = base_path.join(path);
                if full.exists() {
                    nodes.push(SyntaxNode::Include {
                        line_number,
                        line_text: line.to_string(),
                        path: full,
                    });
                } else {
                    self.logger
                        .error(&format!("Included file not found: {}", full.display()));
                    self.errors.push(CompileError::IncludeNotFound {
                        line: line_number,
                        path: full,
                    });
                }
                continue;
            }

            if in_comment {
                comment_buffer.push_str(line);
                comment_buffer.push('\n');
                if line.contains("*/") {
                    in_comment = false;
                    nodes.push(SyntaxNode::MultiLineComment {
                        line_number: comment_start,
                        line_text: comment_buffer.clone(),
                        text: comment_buffer.clone(),
                    });
                    comment_buffer.clear();
                }
                continue;
            }
            if line.starts_with("/*") {
                comment_start = line_number;
                comment_buffer.push_str(line);
                comment_buffer.push('\n');
                if line.contains("*/") {
                    nodes.push(SyntaxNode::MultiLineComment {
                        line_number: comment_start,
                        line_text: comment_buffer.clone(),
                        text: comment_buffer.clone(),
                    });
                    comment_buffer.clear();
                } else {
                    in_comment = true;
                }
                continue;
            }
            if let Some(text) = line.strip_prefix("//") {
                nodes.push(SyntaxNode::SingleLineComment {
                    line_number,
                    line_text: line.to_string(),
                    text: text.trim().to_string(),
                });
                continue;
            }

            if let Some(addr) = parse_address(line) {
                address = addr;
                nodes.push(SyntaxNode::Address {
                    line_number,
                    line_text: line.to_string(),
                    address,
                });
                continue;
            }
            if let Some(value) = parse_hexcode(line) {
                nodes.push(SyntaxNode::HexCode(HexCode {
                    line_number,
                    line_text: line.to_string(),
                    address,
                    value,
                }));
                address = address.wrapping_add(4);
                continue;
            }
            if let Some((offset, rest)) = parse_mem(line) {
                match self.expand_mem(line, line_number, address, &offset, &rest) {
                    Ok(node) => nodes.push(node),
                    Err(e) => self.report(e),
                }
                address = address.wrapping_add(4);
                continue;
            }
            if let Some((register, value)) = parse_setreg(line) {
                match self.expand_setreg(line, line_number, address, &register, value) {
                    Ok(node) => nodes.push(node),
                    Err(e) => self.report(e),
                }
                address = address.wrapping_add(8);
                continue;
            }
            if let Some((name, rest)) = parse_label(line) {
                nodes.push(SyntaxNode::Label {
                    line_number,
                    line_text: line.to_string(),
                    address,
                    name,
                });
                let rest = rest.trim().to_string();
                if !rest.is_empty() {
                    self.emit_tail(&rest, line_number, &labels, &mut address, &mut nodes);
                }
                continue;
            }
            self.emit_tail(line, line_number, &labels, &mut address, &mut nodes);
        }

        nodes
    }

    /// Classify the emitting directives that may also follow a label on the
    /// same line: string data or a generic operation.
    fn emit_tail(
        &mut self,
        line: &str,
        line_number: usize,
        labels: &HashMap<String, u32>,
        address: &mut u32,
        nodes: &mut Vec<SyntaxNode>,
    ) {
        if let Some(text) = parse_string(line) {
            let node = build_string(line, line_number, *address, &text);
            let size = padded_len(text.len());
            nodes.push(node);
            *address = address.wrapping_add(size);
            return;
        }
        if let Some((mnemonic, args)) = parse_operation(line) {
            if let Some(node) = self.emit_operation(line, line_number, *address, &mnemonic, &args, labels)
            {
                nodes.push(node);
            }
            *address = address.wrapping_add(4);
            return;
        }
        self.report(CompileError::Unrecognized {
            line: line_number,
            text: line.to_string(),
        });
    }

    /// Encode one operation line, resolving a `:label` operand through the
    /// label map for branch and jump instructions.
    fn emit_operation(
        &mut self,
        line: &str,
        line_number: usize,
        address: u32,
        mnemonic: &str,
        args: &str,
        labels: &HashMap<String, u32>,
    ) -> Option<SyntaxNode> {
        let label = operand_label(args);

        let Some(label) = label else {
            return match self.encoder.encode(mnemonic, args) {
                Ok(word) => Some(SyntaxNode::Operation(Operation {
                    line_number,
                    line_text: line.to_string(),
                    address,
                    mnemonic: mnemonic.to_lowercase(),
                    word,
                })),
                Err(source) => {
                    self.report(CompileError::Encode {
                        line: line_number,
                        source,
                    });
                    None
                }
            };
        };

        let Some(&label_address) = labels.get(&label.to_lowercase()) else {
            self.report(CompileError::UnknownLabel {
                line: line_number,
                label,
            });
            return None;
        };

        let category = self
            .catalog
            .find_instruction(mnemonic)
            .map(|def| def.category)
            .unwrap_or(Category::Other);

        match category {
            Category::Branch => {
                // Offset in instructions, relative to the delay-slot PC.
                let offset = ((i64::from(label_address) - (i64::from(address) + 4)) / 4) as i32;
                let resolved = args.replace(
                    &format!(":{label}"),
                    &format!("${:04X}", (offset as u32) & 0xFFFF),
                );
                match self.encoder.encode(mnemonic, &resolved) {
                    Ok(word) => {
                        self.logger.debug(&format!(
                            "[Resolved Branch @ Line:{line_number}] {address:08X} {word:08X}"
                        ));
                        Some(SyntaxNode::OperationBranch {
                            operation: Operation {
                                line_number,
                                line_text: line.to_string(),
                                address,
                                mnemonic: mnemonic.to_lowercase(),
                                word,
                            },
                            label,
                            label_address,
                            offset,
                        })
                    }
                    Err(source) => {
                        self.report(CompileError::Encode {
                            line: line_number,
                            source,
                        });
                        None
                    }
                }
            }
            Category::Jump => {
                let resolved =
                    args.replace(&format!(":{label}"), &format!("${label_address:08X}"));
                match self.encoder.encode(mnemonic, &resolved) {
                    Ok(word) => {
                        self.logger.debug(&format!(
                            "[Resolved Jump   @ Line:{line_number}] {address:08X} {word:08X}"
                        ));
                        Some(SyntaxNode::OperationJump {
                            operation: Operation {
                                line_number,
                                line_text: line.to_string(),
                                address,
                                mnemonic: mnemonic.to_lowercase(),
                                word,
                            },
                            label,
                            target_address: label_address,
                        })
                    }
                    Err(source) => {
                        self.report(CompileError::Encode {
                            line: line_number,
                            source,
                        });
                        None
                    }
                }
            }
            Category::Other => {
                self.report(CompileError::LabelOnPlainOperation {
                    line: line_number,
                    mnemonic: mnemonic.to_string(),
                });
                None
            }
        }
    }

    /// `setreg reg, $XXXXXXXX` expands to the 32-bit load idiom: load-upper
    /// with the high half, add-immediate-unsigned with the low half.
    fn expand_setreg(
        &mut self,
        line: &str,
        line_number: usize,
        address: u32,
        register: &str,
        value: u32,
    ) -> Result<SyntaxNode, CompileError> {
        if self.catalog.find_gpr(register).is_none() {
            return Err(CompileError::InvalidRegister {
                line: line_number,
                register: register.to_string(),
            });
        }
        let high = value >> 16;
        let low = value & 0xFFFF;
        let steps = [
            ("lui", format!("{register}, ${high:04X}")),
            ("addiu", format!("{register}, {register}, ${low:04X}")),
        ];
        let operations = self.encode_steps(line, line_number, address, 4, &steps)?;
        Ok(SyntaxNode::SetReg {
            line_number,
            line_text: line.to_string(),
            address,
            register: register.to_string(),
            value,
            operations,
        })
    }

    /// `mem[0xOFF] reg OP operand` expands to a read-modify-write sequence
    /// against `OFF(reg)` through the scratch register.
    fn expand_mem(
        &mut self,
        line: &str,
        line_number: usize,
        address: u32,
        offset: &str,
        rest: &str,
    ) -> Result<SyntaxNode, CompileError> {
        let (register, operator, operand_text) =
            split_mem_assignment(rest).ok_or_else(|| CompileError::InvalidOperator {
                line: line_number,
                operator: rest.to_string(),
            })?;
        if self.catalog.find_gpr(register).is_none() {
            return Err(CompileError::InvalidRegister {
                line: line_number,
                register: register.to_string(),
            });
        }
        let hex = offset
            .strip_prefix("0x")
            .or_else(|| offset.strip_prefix("0X"))
            .ok_or_else(|| CompileError::InvalidOffset {
                line: line_number,
                offset: offset.to_string(),
            })?;
        let offset_value =
            u32::from_str_radix(hex, 16).map_err(|_| CompileError::InvalidOffset {
                line: line_number,
                offset: offset.to_string(),
            })?;
        let operand = parse_mem_operand(operand_text).ok_or_else(|| CompileError::InvalidOperand {
            line: line_number,
            operand: operand_text.to_string(),
        })?;

        let cell = format!("${:04X}({register})", offset_value & 0xFFFF);
        let mut steps: Vec<(&str, String)> = Vec::new();
        if operator != "=" {
            steps.push(("lw", format!("{SCRATCH}, {cell}")));
        }
        match operator {
            "=" | "+=" | "-=" => {
                if operand > 0xFFFF {
                    return Err(CompileError::InvalidOperand {
                        line: line_number,
                        operand: operand_text.to_string(),
                    });
                }
                match operator {
                    "=" => steps.push(("addiu", format!("{SCRATCH}, zero, ${operand:04X}"))),
                    "+=" => steps.push(("addiu", format!("{SCRATCH}, {SCRATCH}, ${operand:04X}"))),
                    _ => {
                        let negated = (operand as i32).wrapping_neg() as u32 & 0xFFFF;
                        steps.push(("addiu", format!("{SCRATCH}, {SCRATCH}, ${negated:04X}")));
                    }
                }
            }
            "*=" | "/=" => {
                // Only power-of-two scaling has a single-instruction form.
                if !operand.is_power_of_two() {
                    return Err(CompileError::NonPowerOfTwo {
                        line: line_number,
                        operator: operator.to_string(),
                        operand,
                    });
                }
                let shift = operand.trailing_zeros();
                let mnemonic = if operator == "*=" { "sll" } else { "srl" };
                steps.push((mnemonic, format!("{SCRATCH}, {SCRATCH}, {shift}")));
            }
            _ => {
                return Err(CompileError::InvalidOperator {
                    line: line_number,
                    operator: operator.to_string(),
                });
            }
        }
        steps.push(("sw", format!("{SCRATCH}, {cell}")));

        // Child operations all carry the macro's base address; pass 1
        // accounts the whole macro as one word.
        let operations = self.encode_steps(line, line_number, address, 0, &steps)?;
        Ok(SyntaxNode::Memory {
            line_number,
            line_text: line.to_string(),
            address,
            offset: offset.to_string(),
            register: register.to_string(),
            operator: operator.to_string(),
            operations,
        })
    }

    fn encode_steps(
        &mut self,
        line: &str,
        line_number: usize,
        address: u32,
        stride: u32,
        steps: &[(&str, String)],
    ) -> Result<Vec<Operation>, CompileError> {
        let mut operations = Vec::with_capacity(steps.len());
        for (index, (mnemonic, args)) in steps.iter().enumerate() {
            let word = self
                .encoder
                .encode(mnemonic, args)
                .map_err(|source| CompileError::Encode {
                    line: line_number,
                    source,
                })?;
            operations.push(Operation {
                line_number,
                line_text: line.to_string(),
                address: address.wrapping_add(stride * index as u32),
                mnemonic: (*mnemonic).to_string(),
                word,
            });
        }
        Ok(operations)
    }

    fn report(&mut self, error: CompileError) {
        self.logger.error(&error.to_string());
        self.errors.push(error);
    }
}

/// Bytes a recognized emitting line occupies, for pass-1 accounting.
fn emission_size(line: &str) -> Option<u32> {
    if parse_hexcode(line).is_some() || parse_mem(line).is_some() {
        Some(4)
    } else if parse_setreg(line).is_some() {
        Some(8)
    } else {
        tail_emission_size(line)
    }
}

/// Pass-1 size of the directives that may follow a label on the same line;
/// must mirror the classification in `emit_tail`.
fn tail_emission_size(line: &str) -> Option<u32> {
    if let Some(text) = parse_string(line) {
        Some(padded_len(text.len()))
    } else if parse_operation(line).is_some() {
        Some(4)
    } else {
        None
    }
}

/// NUL-terminated string data, padded to a 4-byte boundary.
fn padded_len(text_len: usize) -> u32 {
    ((text_len + 1 + 3) / 4 * 4) as u32
}

fn build_string(line: &str, line_number: usize, address: u32, text: &str) -> SyntaxNode {
    let mut bytes = text.as_bytes().to_vec();
    bytes.push(0);
    while bytes.len() % 4 != 0 {
        bytes.push(0);
    }
    let words = bytes
        .chunks_exact(4)
        .enumerate()
        .map(|(i, chunk)| HexCode {
            line_number,
            line_text: line.to_string(),
            address: address.wrapping_add(4 * i as u32),
            value: u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]),
        })
        .collect();
    SyntaxNode::String {
        line_number,
        line_text: line.to_string(),
        address,
        text: text.to_string(),
        words,
    }
}

fn is_ident(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_mnemonic(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// Case-insensitive directive keyword; the next character must not continue
/// an identifier, so `address` does not match `addressing`.
fn keyword_rest<'s>(line: &'s str, keyword: &str) -> Option<&'s str> {
    if line.len() < keyword.len() || !line[..keyword.len()].eq_ignore_ascii_case(keyword) {
        return None;
    }
    let rest = &line[keyword.len()..];
    match rest.chars().next() {
        Some(c) if c.is_ascii_alphanumeric() || c == '_' => None,
        _ => Some(rest.trim_start()),
    }
}

/// `address $XXXXXXXX`
fn parse_address(line: &str) -> Option<u32> {
    let rest = keyword_rest(line, "address")?;
    u32::from_str_radix(rest.strip_prefix('$')?, 16).ok()
}

/// `hexcode $XXXXXXXX`
fn parse_hexcode(line: &str) -> Option<u32> {
    let rest = keyword_rest(line, "hexcode")?;
    u32::from_str_radix(rest.strip_prefix('$')?, 16).ok()
}

/// `setreg reg, $XXXXXXXX`
fn parse_setreg(line: &str) -> Option<(String, u32)> {
    let rest = keyword_rest(line, "setreg")?;
    let (register, value) = rest.split_once(',')?;
    let register = register.trim();
    if !is_ident(register) {
        return None;
    }
    let value = u32::from_str_radix(value.trim().strip_prefix('$')?, 16).ok()?;
    Some((register.to_string(), value))
}

/// `string "text"`
fn parse_string(line: &str) -> Option<String> {
    let rest = keyword_rest(line, "string")?;
    let inner = rest.strip_prefix('"')?.strip_suffix('"')?;
    Some(inner.to_string())
}

/// `include "path"`
fn parse_include(line: &str) -> Option<String> {
    let rest = keyword_rest(line, "include")?;
    let inner = rest.strip_prefix('"')?.strip_suffix('"')?;
    Some(inner.to_string())
}

/// `name:` with optional trailing content, returned for re-classification.
fn parse_label(line: &str) -> Option<(String, &str)> {
    let (name, rest) = line.split_once(':')?;
    let name = name.trim();
    if !is_ident(name) {
        return None;
    }
    Some((name.to_string(), rest))
}

/// `mem[0xOFF] <assignment>` — loose match; the assignment part is validated
/// during expansion so bad tokens get named diagnostics.
fn parse_mem(line: &str) -> Option<(String, String)> {
    let rest = keyword_rest(line, "mem")?;
    let inner = rest.strip_prefix('[')?;
    let (offset, assignment) = inner.split_once(']')?;
    Some((offset.trim().to_string(), assignment.trim().to_string()))
}

/// Split `reg OP operand` around the first assignment operator.
fn split_mem_assignment(rest: &str) -> Option<(&str, &str, &str)> {
    for op in ["+=", "-=", "*=", "/="] {
        if let Some(index) = rest.find(op) {
            let register = rest[..index].trim();
            let operand = rest[index + op.len()..].trim();
            if !register.is_empty() && !operand.is_empty() {
                return Some((register, op, operand));
            }
            return None;
        }
    }
    let index = rest.find('=')?;
    let register = rest[..index].trim();
    let operand = rest[index + 1..].trim();
    if !register.is_empty() && !operand.is_empty() {
        Some((register, "=", operand))
    } else {
        None
    }
}

/// Memory-macro operand: `0x`-prefixed hex or plain decimal.
fn parse_mem_operand(text: &str) -> Option<u32> {
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok()
    } else {
        text.parse::<u32>().ok()
    }
}

/// Generic operation line: mnemonic plus raw operand text (which may still
/// contain a `:label` operand).
fn parse_operation(line: &str) -> Option<(String, String)> {
    let mut split = line.splitn(2, char::is_whitespace);
    let mnemonic = split.next()?;
    if !is_mnemonic(mnemonic) {
        return None;
    }
    let args = split.next().unwrap_or("").trim();
    Some((mnemonic.to_string(), args.to_string()))
}

/// Extract a trailing `:label` operand, if any.
fn operand_label(args: &str) -> Option<String> {
    let index = args.find(':')?;
    let label = args[index + 1..].trim();
    if is_ident(label) {
        Some(label.to_string())
    } else {
        None
    }
}
