use serde::Serialize;

/// One architectural register: display name, 5-bit field encoding and the
/// plain register number.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Register {
    pub name: &'static str,
    pub description: &'static str,
    /// Bit pattern of the register's 5-bit operand field, e.g. `"01000"`.
    pub binary: &'static str,
    pub number: u8,
}

/// Instruction class the compiler cares about when resolving label operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    Branch,
    Jump,
    Other,
}

/// One operand slot of an instruction's assembly syntax.
///
/// The `char` names the placeholder letter in the binary template whose bits
/// the slot fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// General-purpose register name.
    Gpr(char),
    /// COP1 floating point register (`f0`..`f31`).
    Fpr(char),
    /// COP0 system-control register, by name or `$<number>`.
    Cop0(char),
    /// `$`-prefixed hex immediate.
    Imm(char),
    /// Shift amount, decimal.
    Sa(char),
    /// Absolute jump target, `$`-prefixed hex address (stored `>> 2`).
    Target(char),
    /// `offset(base)` memory operand.
    Mem { offset: char, base: char },
}

/// Catalog entry for one instruction: mnemonic, operand syntax and the
/// 32-char binary template.
///
/// Template characters are `0`/`1` for fixed bits; any letter marks a
/// placeholder field. Each distinct letter must occupy one contiguous run of
/// positions. The fixed bits double as the match mask, the letters as the
/// operand bit-fields, so the template is the single source of truth for the
/// encoding.
#[derive(Debug, Clone, Copy)]
pub struct InstructionDef {
    pub mnemonic: &'static str,
    pub syntax: &'static [Slot],
    pub template: &'static str,
    pub category: Category,
    pub description: &'static str,
}

impl InstructionDef {
    /// Locate a placeholder field: returns `(shift, width)` of the letter's
    /// run within the 32-bit word.
    pub fn field(&self, letter: char) -> Option<(u32, u32)> {
        let bytes = self.template.as_bytes();
        let start = bytes.iter().position(|&b| b == letter as u8)?;
        let width = bytes[start..]
            .iter()
            .take_while(|&&b| b == letter as u8)
            .count();
        Some(((32 - start - width) as u32, width as u32))
    }

    /// Placeholder fields in template order, one `(letter, bit_width)` per
    /// distinct letter.
    pub fn args(&self) -> Vec<(char, u32)> {
        let mut args = Vec::new();
        for b in self.template.bytes() {
            if b.is_ascii_alphabetic() && !args.iter().any(|&(c, _)| c == b as char) {
                let (_, width) = self.field(b as char).unwrap_or((0, 0));
                args.push((b as char, width));
            }
        }
        args
    }

    /// The template's fixed bits, with every placeholder position cleared.
    pub fn base_word(&self) -> u32 {
        self.template
            .bytes()
            .fold(0u32, |w, b| (w << 1) | u32::from(b == b'1'))
    }

    /// Mask of the fixed (non-placeholder) bit positions.
    pub fn mask(&self) -> u32 {
        self.template
            .bytes()
            .fold(0u32, |w, b| (w << 1) | u32::from(!b.is_ascii_alphabetic()))
    }
}

/// Immutable register and instruction tables for one ISA.
///
/// Constructed once and injected wherever lookups are needed; safe to share
/// across threads.
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    pub gprs: &'static [Register],
    pub cop0: &'static [Register],
    pub cop1: &'static [Register],
    pub instructions: &'static [InstructionDef],
}

impl Catalog {
    /// The MIPS R5900 Emotion Engine catalog.
    pub fn ee() -> Self {
        crate::isa::ee::catalog()
    }

    pub fn find_gpr(&self, name: &str) -> Option<&'static Register> {
        find_in(self.gprs, name)
    }

    pub fn find_cop0(&self, name: &str) -> Option<&'static Register> {
        find_in(self.cop0, name)
    }

    pub fn find_cop1(&self, name: &str) -> Option<&'static Register> {
        find_in(self.cop1, name)
    }

    /// Look a register up across all three sets.
    pub fn find_register(&self, name: &str) -> Option<&'static Register> {
        self.find_gpr(name)
            .or_else(|| self.find_cop0(name))
            .or_else(|| self.find_cop1(name))
    }

    pub fn find_instruction(&self, mnemonic: &str) -> Option<&'static InstructionDef> {
        self.instructions
            .iter()
            .find(|i| i.mnemonic.eq_ignore_ascii_case(mnemonic))
    }

    pub fn instructions_in_category(&self, category: Category) -> Vec<&'static InstructionDef> {
        self.instructions
            .iter()
            .filter(|i| i.category == category)
            .collect()
    }

    /// Display name of a general-purpose register number.
    pub fn gpr_name(&self, number: u32) -> &'static str {
        self.gprs
            .iter()
            .find(|r| u32::from(r.number) == number)
            .map(|r| r.name)
            .unwrap_or("?")
    }
}

fn find_in(set: &'static [Register], name: &str) -> Option<&'static Register> {
    set.iter().find(|r| r.name.eq_ignore_ascii_case(name))
}
