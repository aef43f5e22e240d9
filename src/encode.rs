use crate::catalog::{Catalog, InstructionDef, Slot};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("unknown mnemonic '{0}'")]
    UnknownMnemonic(String),
    #[error("unknown register '{0}'")]
    UnknownRegister(String),
    #[error("malformed immediate '{0}'")]
    BadImmediate(String),
    #[error("'{mnemonic}' expects {expected} operand(s), found {found}")]
    OperandCount {
        mnemonic: String,
        expected: usize,
        found: usize,
    },
    #[error("operand '{operand}' does not fit in the {bits}-bit field of '{mnemonic}'")]
    FieldOverflow {
        mnemonic: String,
        operand: String,
        bits: u32,
    },
}

/// Text-to-word half of the instruction codec.
///
/// Parses operand text against the instruction's declared slots and folds
/// each field into the catalog template at its declared bit positions.
pub struct Encoder<'a> {
    catalog: &'a Catalog,
}

impl<'a> Encoder<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Encode one instruction, e.g. `encode("addiu", "t0, t0, $0001")`.
    pub fn encode(&self, mnemonic: &str, operands: &str) -> Result<u32, EncodeError> {
        let def = self
            .catalog
            .find_instruction(mnemonic)
            .ok_or_else(|| EncodeError::UnknownMnemonic(mnemonic.to_string()))?;

        let parts: Vec<&str> = operands
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if parts.len() != def.syntax.len() {
            return Err(EncodeError::OperandCount {
                mnemonic: def.mnemonic.to_string(),
                expected: def.syntax.len(),
                found: parts.len(),
            });
        }

        let mut word = def.base_word();
        for (slot, part) in def.syntax.iter().zip(&parts) {
            match *slot {
                Slot::Gpr(letter) => {
                    let number = self.resolve_gpr(part)?;
                    word |= place(def, letter, i64::from(number), part)?;
                }
                Slot::Fpr(letter) => {
                    let reg = self
                        .catalog
                        .find_cop1(part)
                        .ok_or_else(|| EncodeError::UnknownRegister(part.to_string()))?;
                    word |= place(def, letter, i64::from(reg.number), part)?;
                }
                Slot::Cop0(letter) => {
                    let number = self.resolve_cop0(part)?;
                    word |= place(def, letter, i64::from(number), part)?;
                }
                Slot::Imm(letter) | Slot::Sa(letter) => {
                    let value = parse_immediate(part)?;
                    word |= place(def, letter, value, part)?;
                }
                Slot::Target(letter) => {
                    let address = parse_immediate(part)?;
                    // Word-aligned absolute address within the current
                    // 256 MB segment; the field stores address >> 2.
                    let field = ((address as u32) & 0x0FFF_FFFF) >> 2;
                    word |= place(def, letter, i64::from(field), part)?;
                }
                Slot::Mem { offset, base } => {
                    let (off_text, base_text) = split_mem_operand(part)?;
                    let off = parse_immediate(off_text)?;
                    word |= place(def, offset, off, off_text)?;
                    let number = self.resolve_gpr(base_text)?;
                    word |= place(def, base, i64::from(number), base_text)?;
                }
            }
        }
        Ok(word)
    }

    fn resolve_gpr(&self, text: &str) -> Result<u8, EncodeError> {
        if let Some(reg) = self.catalog.find_gpr(text) {
            return Ok(reg.number);
        }
        // Bare register numbers are accepted too.
        match text.parse::<u8>() {
            Ok(n) if n < 32 => Ok(n),
            _ => Err(EncodeError::UnknownRegister(text.to_string())),
        }
    }

    fn resolve_cop0(&self, text: &str) -> Result<u8, EncodeError> {
        if let Some(reg) = self.catalog.find_cop0(text) {
            return Ok(reg.number);
        }
        // The disassembler prints COP0 registers as `$<number>`.
        let digits = text.strip_prefix('$').unwrap_or(text);
        match digits.parse::<u8>() {
            Ok(n) if n < 32 => Ok(n),
            _ => Err(EncodeError::UnknownRegister(text.to_string())),
        }
    }
}

/// Place `value` into the template field named `letter`, rejecting values
/// that do not fit the field width.
fn place(def: &InstructionDef, letter: char, value: i64, text: &str) -> Result<u32, EncodeError> {
    let (shift, width) = def.field(letter).ok_or_else(|| EncodeError::FieldOverflow {
        mnemonic: def.mnemonic.to_string(),
        operand: text.to_string(),
        bits: 0,
    })?;
    let fits = if value < 0 {
        value >= -(1i64 << (width - 1))
    } else {
        value < (1i64 << width)
    };
    if !fits {
        return Err(EncodeError::FieldOverflow {
            mnemonic: def.mnemonic.to_string(),
            operand: text.to_string(),
            bits: width,
        });
    }
    let mask = if width == 32 { u32::MAX } else { (1u32 << width) - 1 };
    Ok(((value as u32) & mask) << shift)
}

/// `$`-prefixed hex, `0x`-prefixed hex, or plain decimal (optionally
/// negative).
fn parse_immediate(text: &str) -> Result<i64, EncodeError> {
    let t = text.trim();
    let bad = || EncodeError::BadImmediate(text.to_string());
    if let Some(hex) = t.strip_prefix('$') {
        i64::from_str_radix(hex, 16).map_err(|_| bad())
    } else if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).map_err(|_| bad())
    } else {
        t.parse::<i64>().map_err(|_| bad())
    }
}

/// Split an `offset(base)` memory operand.
fn split_mem_operand(text: &str) -> Result<(&str, &str), EncodeError> {
    let open = text
        .find('(')
        .ok_or_else(|| EncodeError::BadImmediate(text.to_string()))?;
    let inner = text[open + 1..]
        .strip_suffix(')')
        .ok_or_else(|| EncodeError::BadImmediate(text.to_string()))?;
    Ok((text[..open].trim(), inner.trim()))
}
