//! Cross-reference and pointer-flow analysis over a decoded word stream.
//!
//! Two passes. Pass A walks the raw words to find function entry points
//! (stream start, instructions following a call, stack-frame prologues) and
//! records branch/call cross-references. Pass B decodes each word into a
//! row, annotates known function targets, and tracks per-register value
//! provenance through `lui`/`ori`/`addiu` chains so `offset(base)` accesses
//! can resolve their effective address. The analysis is best-effort: a
//! register written by anything the tracker does not model loses its value,
//! and untracked bases are reported as unresolved rather than guessed.

use std::collections::{BTreeMap, HashMap};

use cds_rs::decode::decode;
use cds_rs::Catalog;
use serde::Serialize;

use crate::model::Image;

#[derive(Debug, Clone, Serialize)]
pub struct Function {
    pub entry: u32,
    pub name: String,
    pub calls: Vec<u32>,
    pub called_from: Vec<u32>,
}

/// One 4-byte-aligned disassembly row.
#[derive(Debug, Clone, Serialize)]
pub struct Row {
    pub addr: u32,
    /// Raw word bytes in memory (little-endian) order.
    pub bytes: [u8; 4],
    pub label: Option<String>,
    pub mnemonic: String,
    pub operands: String,
    pub comment: String,
    pub xrefs: Vec<u32>,
}

#[derive(Debug, Serialize)]
pub struct Disassembly {
    pub rows: Vec<Row>,
    pub functions: Vec<Function>,
}

#[derive(Debug, Clone)]
struct RegValue {
    value: u32,
    source: String,
}

/// State for one disassembly run; created fresh per invocation.
#[derive(Debug, Default)]
pub struct AnalysisContext {
    functions: BTreeMap<u32, Function>,
    xrefs: HashMap<u32, Vec<u32>>,
    registers: [Option<RegValue>; 32],
}

// Instruction word fields.
#[inline]
fn opcode(w: u32) -> u32 {
    (w >> 26) & 0x3F
}
#[inline]
fn rs(w: u32) -> usize {
    ((w >> 21) & 0x1F) as usize
}
#[inline]
fn rt(w: u32) -> usize {
    ((w >> 16) & 0x1F) as usize
}
#[inline]
fn rd(w: u32) -> usize {
    ((w >> 11) & 0x1F) as usize
}
#[inline]
fn funct(w: u32) -> u32 {
    w & 0x3F
}
#[inline]
fn simm(w: u32) -> i32 {
    (w & 0xFFFF) as u16 as i16 as i32
}

fn jump_target(w: u32, pc: u32) -> u32 {
    (pc & 0xF000_0000) | ((w & 0x03FF_FFFF) << 2)
}

fn branch_target(w: u32, pc: u32) -> u32 {
    pc.wrapping_add(4).wrapping_add((simm(w) as u32) << 2)
}

/// `addiu sp, sp, <negative>` — the stack-frame allocation idiom.
fn is_prologue(w: u32) -> bool {
    opcode(w) == 0x09 && rt(w) == 29 && rs(w) == 29 && simm(w) < 0
}

fn is_regimm_branch(w: u32) -> bool {
    opcode(w) == 0x01 && matches!((w >> 16) & 0x1F, 0x00..=0x03 | 0x10..=0x13)
}

/// Memory-access opcodes whose `offset(base)` operand the tracker resolves.
fn accesses_memory(op: u32) -> bool {
    matches!(
        op,
        0x1A | 0x1B | 0x1E | 0x1F | 0x20..=0x2E | 0x31 | 0x35 | 0x36 | 0x37 | 0x39 | 0x3D | 0x3E | 0x3F
    )
}

/// Loads that write a general-purpose register (COP1/COP2 loads do not).
fn is_gpr_load(op: u32) -> bool {
    matches!(op, 0x1A | 0x1B | 0x1E | 0x20..=0x27 | 0x37)
}

/// Access width in bytes, from the mnemonic.
fn access_size(mnemonic: &str) -> u32 {
    match mnemonic {
        "lb" | "lbu" | "sb" => 1,
        "lh" | "lhu" | "sh" => 2,
        "ld" | "ldl" | "ldr" | "sd" | "sdl" | "sdr" | "ldc1" | "sdc1" => 8,
        "lq" | "sq" | "lqc2" | "sqc2" => 16,
        _ => 4,
    }
}

/// Best-effort data kind for a resolved access target.
fn infer_data_kind(mnemonic: &str, target: u32) -> Option<&'static str> {
    if mnemonic.contains("c1") || mnemonic.ends_with(".s") {
        Some("float")
    } else if mnemonic.contains("c2") || matches!(mnemonic, "lq" | "sq") {
        Some("vector")
    } else if matches!(mnemonic, "lb" | "lbu" | "sb") {
        Some("byte/char")
    } else if target % 4 == 0 && target >= 0x0010_0000 {
        // Word-aligned and inside the usual EE code window.
        Some("code/function")
    } else {
        None
    }
}

/// Destination GPR of instructions the tracker does not model, used for
/// invalidation.
fn dest_gpr(w: u32) -> Option<usize> {
    match opcode(w) {
        0x00 => match funct(w) {
            0x08 => None, // jr
            _ => Some(rd(w)),
        },
        0x03 => Some(31),
        0x08..=0x0F | 0x18 | 0x19 => Some(rt(w)),
        0x1C => Some(rd(w)),
        0x10 | 0x11 | 0x12 if matches!(rs(w) as u32, 0x00 | 0x01 | 0x02) => Some(rt(w)),
        op if is_gpr_load(op) => Some(rt(w)),
        _ => None,
    }
}

impl AnalysisContext {
    fn add_xref(&mut self, source: u32, target: u32) {
        self.xrefs.entry(target).or_default().push(source);
    }

    fn register_function(&mut self, addr: u32) {
        self.functions.entry(addr).or_insert_with(|| Function {
            entry: addr,
            name: format!("func_{addr:08x}"),
            calls: Vec::new(),
            called_from: Vec::new(),
        });
    }

    /// Entry address of the function containing `addr`.
    fn containing_function(&self, addr: u32) -> Option<u32> {
        self.functions.range(..=addr).next_back().map(|(&a, _)| a)
    }

    fn add_call(&mut self, from: u32, to: u32) {
        let Some(caller) = self.containing_function(from) else {
            return;
        };
        if let Some(f) = self.functions.get_mut(&caller) {
            if !f.calls.contains(&to) {
                f.calls.push(to);
            }
        }
        if let Some(f) = self.functions.get_mut(&to) {
            if !f.called_from.contains(&from) {
                f.called_from.push(from);
            }
        }
    }

    /// Pass A: function discovery and cross-references.
    fn discover(&mut self, image: &Image) {
        let mut calls: Vec<(u32, u32)> = Vec::new();
        let mut prev_was_call = false;
        let mut first = true;

        for pc in image.word_addresses() {
            let Some(word) = image.read_word(pc) else {
                break;
            };
            if first || prev_was_call || is_prologue(word) {
                self.register_function(pc);
            }
            first = false;
            prev_was_call = opcode(word) == 0x03;

            match opcode(word) {
                0x03 => {
                    let target = jump_target(word, pc);
                    self.add_xref(pc, target);
                    self.register_function(target);
                    calls.push((pc, target));
                }
                0x04..=0x07 | 0x14..=0x17 => {
                    self.add_xref(pc, branch_target(word, pc));
                }
                0x01 if is_regimm_branch(word) => {
                    self.add_xref(pc, branch_target(word, pc));
                }
                _ => {}
            }
        }
        // Call edges attach once every entry point is known.
        for (from, to) in calls {
            self.add_call(from, to);
        }
    }

    /// Track register provenance through one instruction; returns an
    /// annotation when something resolves.
    fn track(&mut self, catalog: &Catalog, word: u32, mnemonic: &str) -> Option<String> {
        let op = opcode(word);
        let name = |r: usize| catalog.gpr_name(r as u32);

        // lui seeds a chain.
        if op == 0x0F {
            let imm = word & 0xFFFF;
            self.registers[rt(word)] = Some(RegValue {
                value: imm << 16,
                source: format!("lui ${imm:04X}"),
            });
            return None;
        }
        // addi/addiu/ori extend a tracked base.
        if matches!(op, 0x08 | 0x09 | 0x0D) {
            let target = rt(word);
            if target == 0 {
                return None;
            }
            match self.registers[rs(word)].clone() {
                Some(base) => {
                    let value = if op == 0x0D {
                        base.value | (word & 0xFFFF)
                    } else {
                        base.value.wrapping_add(simm(word) as u32)
                    };
                    self.registers[target] = Some(RegValue {
                        value,
                        source: format!("{} via {}", mnemonic, base.source),
                    });
                    return Some(format!("; {} = 0x{value:08X} (calculated addr)", name(target)));
                }
                None => {
                    self.registers[target] = None;
                    return None;
                }
            }
        }
        // addu/daddu combine two tracked values.
        if op == 0x00 && matches!(funct(word), 0x20 | 0x21 | 0x2C | 0x2D) {
            let dest = rd(word);
            if dest == 0 {
                return None;
            }
            match (
                self.registers[rs(word)].clone(),
                self.registers[rt(word)].clone(),
            ) {
                (Some(a), Some(b)) => {
                    let value = a.value.wrapping_add(b.value);
                    self.registers[dest] = Some(RegValue {
                        value,
                        source: format!("{mnemonic} of tracked pair"),
                    });
                    return Some(format!("; {} = 0x{value:08X} (calculated addr)", name(dest)));
                }
                _ => {
                    self.registers[dest] = None;
                    return None;
                }
            }
        }
        // Loads and stores resolve an effective address when the base is
        // tracked.
        if accesses_memory(op) {
            let base = rs(word);
            let note = match &self.registers[base] {
                Some(tracked) => {
                    let target = tracked.value.wrapping_add(simm(word) as u32);
                    let size = access_size(mnemonic);
                    let mut note = format!("; ptr [0x{target:08X}] ({size} bytes");
                    if let Some(kind) = infer_data_kind(mnemonic, target) {
                        note.push_str(", ");
                        note.push_str(kind);
                    }
                    if self.functions.contains_key(&target) {
                        note.push_str(", function");
                    }
                    note.push(')');
                    Some(note)
                }
                None => Some(format!("; ptr: {} (unresolved)", name(base))),
            };
            // A loaded register now holds memory contents the tracker
            // cannot see.
            if is_gpr_load(op) {
                self.registers[rt(word)] = None;
            }
            return note;
        }
        // Anything else that writes a register drops its tracked value.
        if let Some(dest) = dest_gpr(word) {
            self.registers[dest] = None;
        }
        None
    }
}

/// Decode + analyze a binary image into disassembly rows and a function
/// table.
pub fn disassemble(catalog: &Catalog, image: &Image) -> Disassembly {
    let mut ctx = AnalysisContext::default();
    ctx.discover(image);

    let mut rows = Vec::new();
    for pc in image.word_addresses() {
        let Some(word) = image.read_word(pc) else {
            break;
        };
        let decoded = decode(catalog, word, pc);

        let mut comments: Vec<String> = Vec::new();
        if !decoded.comment.is_empty() {
            comments.push(decoded.comment.clone());
        }
        if let Some(target) = decoded.target {
            if let Some(f) = ctx.functions.get(&target) {
                comments.push(format!("; {}", f.name));
            }
        }
        if let Some(note) = ctx.track(catalog, word, decoded.mnemonic) {
            comments.push(note);
        }
        let xrefs = ctx.xrefs.get(&pc).cloned().unwrap_or_default();
        if !xrefs.is_empty() {
            let list: Vec<String> = xrefs.iter().map(|x| format!("${x:08X}")).collect();
            comments.push(format!("; XREF: {}", list.join(", ")));
        }

        rows.push(Row {
            addr: pc,
            bytes: image.word_bytes(pc).unwrap_or_default(),
            label: ctx.functions.get(&pc).map(|f| f.name.clone()),
            mnemonic: decoded.mnemonic.to_string(),
            operands: decoded.operands,
            comment: comments.join(" "),
            xrefs,
        });
    }

    Disassembly {
        rows,
        functions: ctx.functions.into_values().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_of(words: &[u32], base: u32) -> Image {
        let mut bytes = Vec::new();
        for w in words {
            bytes.extend_from_slice(&w.to_le_bytes());
        }
        Image::new(base, bytes)
    }

    fn enc_jal(pc: u32, target: u32) -> u32 {
        assert_eq!(pc & 0xF000_0000, target & 0xF000_0000);
        (0x03 << 26) | ((target & 0x0FFF_FFFF) >> 2)
    }

    fn enc_i(op: u32, rs: u32, rt: u32, imm: u32) -> u32 {
        (op << 26) | (rs << 21) | (rt << 16) | (imm & 0xFFFF)
    }

    #[test]
    fn jal_registers_function_and_xref() {
        let base = 0x0010_0000;
        let target = 0x0010_000C;
        let words = [enc_jal(base, target), 0, 0, 0];
        let catalog = Catalog::ee();
        let dis = disassemble(&catalog, &image_of(&words, base));

        // Stream start, the instruction after the call, and the jal target
        // are all entries.
        let entries: Vec<u32> = dis.functions.iter().map(|f| f.entry).collect();
        assert!(entries.contains(&base));
        assert!(entries.contains(&(base + 4)));
        assert!(entries.contains(&target));

        let row = &dis.rows[3];
        assert_eq!(row.addr, target);
        assert_eq!(row.xrefs, vec![base]);
        assert!(row.comment.contains("XREF"));

        let caller = dis.functions.iter().find(|f| f.entry == base).unwrap();
        assert_eq!(caller.calls, vec![target]);
        let callee = dis.functions.iter().find(|f| f.entry == target).unwrap();
        assert_eq!(callee.called_from, vec![base]);
    }

    #[test]
    fn stack_prologue_starts_function() {
        let base = 0x0010_0000;
        // addiu sp, sp, -0x20 at the third word
        let prologue = enc_i(0x09, 29, 29, (-0x20i32 as u32) & 0xFFFF);
        let words = [0, 0, prologue, 0];
        let catalog = Catalog::ee();
        let dis = disassemble(&catalog, &image_of(&words, base));
        assert!(dis.functions.iter().any(|f| f.entry == base + 8));
    }

    #[test]
    fn lui_ori_chain_resolves_load_address() {
        let base = 0x0020_0000;
        let words = [
            enc_i(0x0F, 0, 8, 0x0010),  // lui t0, $0010
            enc_i(0x0D, 8, 8, 0x1000),  // ori t0, t0, $1000
            enc_i(0x23, 8, 9, 0x0004),  // lw t1, $0004(t0)
        ];
        let catalog = Catalog::ee();
        let dis = disassemble(&catalog, &image_of(&words, base));
        assert!(dis.rows[1].comment.contains("t0 = 0x00101000"));
        assert!(dis.rows[2].comment.contains("ptr [0x00101004] (4 bytes"));
    }

    #[test]
    fn unmodeled_write_invalidates_tracked_value() {
        let base = 0x0020_0000;
        let sllv = (8 << 21) | (8 << 16) | (8 << 11) | 0x04; // sllv t0, t0, t0
        let words = [
            enc_i(0x0F, 0, 8, 0x0010), // lui t0, $0010
            sllv,
            enc_i(0x23, 8, 9, 0x0000), // lw t1, $0000(t0)
        ];
        let catalog = Catalog::ee();
        let dis = disassemble(&catalog, &image_of(&words, base));
        assert!(dis.rows[2].comment.contains("(unresolved)"));
    }

    #[test]
    fn nop_word_has_no_xrefs() {
        let catalog = Catalog::ee();
        let dis = disassemble(&catalog, &image_of(&[0], 0));
        assert_eq!(dis.rows[0].mnemonic, "nop");
        assert_eq!(dis.rows[0].operands, "");
        assert!(dis.rows[0].xrefs.is_empty());
    }
}
