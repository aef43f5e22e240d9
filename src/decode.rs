//! Word-to-text half of the instruction codec.
//!
//! Decoding is a fixed dispatch over the primary 6-bit opcode with nested
//! dispatch on secondary fields: `funct` for SPECIAL, `rt` for REGIMM and
//! coprocessor branch conditions, `funct` plus sub-format for MMI, and the
//! macro-instruction tables for COP2/VU0. Field extraction is written out
//! per case; the layouts are too irregular to drive from one generic
//! template, so the catalog stays authoritative for encoding while the
//! decoder mirrors the same opcode assignments.
//!
//! Decoding never fails: an unrecognized word becomes the `unknown`
//! sentinel so disassembly can walk arbitrary data.

use crate::catalog::Catalog;
use bitflags::bitflags;
use serde::Serialize;

bitflags! {
    /// VU0 per-lane destination mask (bits 24..21 of the macro encodings).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
    pub struct DestMask: u32 {
        const X = 0b1000;
        const Y = 0b0100;
        const Z = 0b0010;
        const W = 0b0001;
    }
}

impl DestMask {
    /// `.xyz`-style operand suffix; the full mask renders as empty.
    fn suffix(self) -> String {
        if self == DestMask::all() || self.is_empty() {
            return String::new();
        }
        let mut s = String::from(".");
        if self.contains(DestMask::X) {
            s.push('x');
        }
        if self.contains(DestMask::Y) {
            s.push('y');
        }
        if self.contains(DestMask::Z) {
            s.push('z');
        }
        if self.contains(DestMask::W) {
            s.push('w');
        }
        s
    }
}

/// One decoded instruction.
#[derive(Debug, Clone, Serialize)]
pub struct Decoded {
    pub mnemonic: &'static str,
    pub operands: String,
    pub comment: String,
    /// Resolved branch/jump/call target, when the instruction has one.
    pub target: Option<u32>,
}

impl Decoded {
    fn op(mnemonic: &'static str) -> Self {
        Self::args(mnemonic, String::new())
    }

    fn args(mnemonic: &'static str, operands: String) -> Self {
        Self {
            mnemonic,
            operands,
            comment: String::new(),
            target: None,
        }
    }

    fn noted(mnemonic: &'static str, operands: String, comment: &str) -> Self {
        Self {
            mnemonic,
            operands,
            comment: comment.to_string(),
            target: None,
        }
    }

    fn to_target(mnemonic: &'static str, operands: String, target: u32) -> Self {
        Self {
            mnemonic,
            operands,
            comment: String::new(),
            target: Some(target),
        }
    }
}

#[inline]
fn sext16(imm: u32) -> i32 {
    imm as u16 as i16 as i32
}

fn fmt_imm(imm: u32) -> String {
    format!("${:04X}", imm & 0xFFFF)
}

fn fmt_addr(addr: u32) -> String {
    format!("${addr:08X}")
}

/// Branch operand: absolute target plus signed instruction-count
/// displacement from the next instruction.
fn fmt_branch(pc: u32, simm: i32) -> (String, u32) {
    let target = pc.wrapping_add(4).wrapping_add((simm as u32) << 2);
    let arrow = if simm >= 0 { '▼' } else { '▲' };
    let sign = if simm >= 0 { "+" } else { "" };
    (format!("{} ({sign}{simm}{arrow})", fmt_addr(target)), target)
}

/// Decode one 32-bit word fetched from `pc`.
pub fn decode(catalog: &Catalog, word: u32, pc: u32) -> Decoded {
    if word == 0 {
        return Decoded::noted("nop", String::new(), "; no operation");
    }
    let opcode = (word >> 26) & 0x3F;
    let decoded = match opcode {
        0x00 => special(catalog, word),
        0x01 => regimm(catalog, word, pc),
        0x02 | 0x03 => {
            let target = (pc & 0xF000_0000) | ((word & 0x03FF_FFFF) << 2);
            Some(if opcode == 0x02 {
                Decoded::to_target("j", fmt_addr(target), target)
            } else {
                let mut d = Decoded::to_target("jal", fmt_addr(target), target);
                d.comment = "; call function".to_string();
                d
            })
        }
        0x04..=0x07 | 0x14..=0x17 => branches(catalog, word, pc, opcode),
        0x08..=0x0F | 0x18 | 0x19 => immediates(catalog, word, opcode),
        0x1C => mmi(catalog, word),
        0x10 => cop0(catalog, word, pc),
        0x11 => cop1(catalog, word, pc),
        0x12 => cop2(catalog, word, pc),
        _ => loads_stores(catalog, word, opcode),
    };
    decoded.unwrap_or_else(|| {
        Decoded::noted(
            "unknown",
            String::new(),
            &format!("; unrecognized instruction word {word:#010X}"),
        )
    })
}

fn special(catalog: &Catalog, word: u32) -> Option<Decoded> {
    let rs = (word >> 21) & 0x1F;
    let rt = (word >> 16) & 0x1F;
    let rd = (word >> 11) & 0x1F;
    let sa = (word >> 6) & 0x1F;
    let funct = word & 0x3F;
    let code = (word >> 6) & 0xFFFFF;
    let reg = |r: u32| catalog.gpr_name(r);

    let rdst = |m: &'static str| Decoded::args(m, format!("{}, {}, {}", reg(rd), reg(rs), reg(rt)));
    let shift = |m: &'static str| Decoded::args(m, format!("{}, {}, {}", reg(rd), reg(rt), sa));
    let shiftv = |m: &'static str| Decoded::args(m, format!("{}, {}, {}", reg(rd), reg(rt), reg(rs)));
    // EE multiply forms write rd as well; rd == 0 prints the classic 2-op form.
    let mult3 = |m: &'static str| {
        if rd == 0 {
            Decoded::args(m, format!("{}, {}", reg(rs), reg(rt)))
        } else {
            Decoded::args(m, format!("{}, {}, {}", reg(rd), reg(rs), reg(rt)))
        }
    };
    let divpair = |m: &'static str| Decoded::args(m, format!("{}, {}", reg(rs), reg(rt)));

    Some(match funct {
        0x00 => {
            if sa == 0 {
                Decoded::op("nop")
            } else {
                shift("sll")
            }
        }
        0x02 => shift("srl"),
        0x03 => shift("sra"),
        0x04 => shiftv("sllv"),
        0x06 => shiftv("srlv"),
        0x07 => shiftv("srav"),
        0x08 => {
            let comment = if rs == 31 { "; return from function" } else { "" };
            Decoded::noted("jr", reg(rs).to_string(), comment)
        }
        0x09 => {
            let operands = if rd == 31 {
                reg(rs).to_string()
            } else {
                format!("{}, {}", reg(rd), reg(rs))
            };
            Decoded::noted("jalr", operands, "; call via register")
        }
        0x0A => rdst("movz"),
        0x0B => rdst("movn"),
        0x0C => {
            let operands = if code > 0 { code.to_string() } else { String::new() };
            Decoded::noted("syscall", operands, "; system call")
        }
        0x0D => {
            let operands = if code > 0 { code.to_string() } else { String::new() };
            Decoded::noted("break", operands, "; breakpoint")
        }
        0x0F => {
            let operands = if sa > 0 { sa.to_string() } else { String::new() };
            Decoded::args("sync", operands)
        }
        0x10 => Decoded::noted("mfhi", reg(rd).to_string(), "; move from HI"),
        0x11 => Decoded::noted("mthi", reg(rs).to_string(), "; move to HI"),
        0x12 => Decoded::noted("mflo", reg(rd).to_string(), "; move from LO"),
        0x13 => Decoded::noted("mtlo", reg(rs).to_string(), "; move to LO"),
        0x14 => shiftv("dsllv"),
        0x16 => shiftv("dsrlv"),
        0x17 => shiftv("dsrav"),
        0x18 => mult3("mult"),
        0x19 => mult3("multu"),
        0x1A => divpair("div"),
        0x1B => divpair("divu"),
        0x1C => mult3("dmult"),
        0x1D => mult3("dmultu"),
        0x1E => divpair("ddiv"),
        0x1F => divpair("ddivu"),
        0x20 => rdst("add"),
        0x21 => rdst("addu"),
        0x22 => rdst("sub"),
        0x23 => rdst("subu"),
        0x24 => rdst("and"),
        0x25 => rdst("or"),
        0x26 => rdst("xor"),
        0x27 => rdst("nor"),
        0x28 => Decoded::args("mfsa", reg(rd).to_string()),
        0x29 => Decoded::args("mtsa", reg(rs).to_string()),
        0x2A => rdst("slt"),
        0x2B => rdst("sltu"),
        0x2C => rdst("dadd"),
        0x2D => rdst("daddu"),
        0x2E => rdst("dsub"),
        0x2F => rdst("dsubu"),
        0x30 => divpair("tge"),
        0x31 => divpair("tgeu"),
        0x32 => divpair("tlt"),
        0x33 => divpair("tltu"),
        0x34 => divpair("teq"),
        0x36 => divpair("tne"),
        0x38 => shift("dsll"),
        0x3A => shift("dsrl"),
        0x3B => shift("dsra"),
        0x3C => shift("dsll32"),
        0x3E => shift("dsrl32"),
        0x3F => shift("dsra32"),
        _ => return None,
    })
}

fn regimm(catalog: &Catalog, word: u32, pc: u32) -> Option<Decoded> {
    let rs = (word >> 21) & 0x1F;
    let rt = (word >> 16) & 0x1F;
    let simm = sext16(word & 0xFFFF);
    let reg = |r: u32| catalog.gpr_name(r);

    let branch = |m: &'static str| {
        let (text, target) = fmt_branch(pc, simm);
        Decoded::to_target(m, format!("{}, {}", reg(rs), text), target)
    };
    let trap = |m: &'static str| Decoded::args(m, format!("{}, {}", reg(rs), fmt_imm(word)));

    Some(match rt {
        0x00 => branch("bltz"),
        0x01 => branch("bgez"),
        0x02 => branch("bltzl"),
        0x03 => branch("bgezl"),
        0x08 => trap("tgei"),
        0x09 => trap("tgeiu"),
        0x0A => trap("tlti"),
        0x0B => trap("tltiu"),
        0x0C => trap("teqi"),
        0x0E => trap("tnei"),
        0x10 => branch("bltzal"),
        0x11 => branch("bgezal"),
        0x12 => branch("bltzall"),
        0x13 => branch("bgezall"),
        0x18 => trap("mtsab"),
        0x19 => trap("mtsah"),
        _ => return None,
    })
}

fn branches(catalog: &Catalog, word: u32, pc: u32, opcode: u32) -> Option<Decoded> {
    let rs = (word >> 21) & 0x1F;
    let rt = (word >> 16) & 0x1F;
    let simm = sext16(word & 0xFFFF);
    let reg = |r: u32| catalog.gpr_name(r);
    let (text, target) = fmt_branch(pc, simm);

    let two = |m: &'static str| {
        Decoded::to_target(m, format!("{}, {}, {}", reg(rs), reg(rt), text), target)
    };
    let one = |m: &'static str| Decoded::to_target(m, format!("{}, {}", reg(rs), text), target);

    Some(match opcode {
        0x04 => two("beq"),
        0x05 => two("bne"),
        0x06 => one("blez"),
        0x07 => one("bgtz"),
        0x14 => two("beql"),
        0x15 => two("bnel"),
        0x16 => one("blezl"),
        0x17 => one("bgtzl"),
        _ => return None,
    })
}

fn immediates(catalog: &Catalog, word: u32, opcode: u32) -> Option<Decoded> {
    let rs = (word >> 21) & 0x1F;
    let rt = (word >> 16) & 0x1F;
    let imm = word & 0xFFFF;
    let reg = |r: u32| catalog.gpr_name(r);
    let tsi = |m: &'static str| {
        Decoded::args(m, format!("{}, {}, {}", reg(rt), reg(rs), fmt_imm(imm)))
    };

    Some(match opcode {
        0x08 => tsi("addi"),
        0x09 => tsi("addiu"),
        0x0A => tsi("slti"),
        0x0B => tsi("sltiu"),
        0x0C => tsi("andi"),
        0x0D => tsi("ori"),
        0x0E => tsi("xori"),
        0x0F => Decoded::args("lui", format!("{}, {}", reg(rt), fmt_imm(imm))),
        0x18 => tsi("daddi"),
        0x19 => tsi("daddiu"),
        _ => return None,
    })
}

fn loads_stores(catalog: &Catalog, word: u32, opcode: u32) -> Option<Decoded> {
    let rs = (word >> 21) & 0x1F;
    let rt = (word >> 16) & 0x1F;
    let imm = word & 0xFFFF;
    let reg = |r: u32| catalog.gpr_name(r);
    let mem = |m: &'static str| {
        Decoded::args(m, format!("{}, {}({})", reg(rt), fmt_imm(imm), reg(rs)))
    };
    // COP1/COP2 loads and stores target f-registers.
    let fmem = |m: &'static str| Decoded::args(m, format!("f{rt}, {}({})", fmt_imm(imm), reg(rs)));
    // cache/pref carry the raw operation number in the rt field.
    let hint = |m: &'static str| Decoded::args(m, format!("{rt}, {}({})", fmt_imm(imm), reg(rs)));

    Some(match opcode {
        0x1A => mem("ldl"),
        0x1B => mem("ldr"),
        0x1E => mem("lq"),
        0x1F => mem("sq"),
        0x20 => mem("lb"),
        0x21 => mem("lh"),
        0x22 => mem("lwl"),
        0x23 => mem("lw"),
        0x24 => mem("lbu"),
        0x25 => mem("lhu"),
        0x26 => mem("lwr"),
        0x27 => mem("lwu"),
        0x28 => mem("sb"),
        0x29 => mem("sh"),
        0x2A => mem("swl"),
        0x2B => mem("sw"),
        0x2C => mem("sdl"),
        0x2D => mem("sdr"),
        0x2E => mem("swr"),
        0x2F => hint("cache"),
        0x31 => fmem("lwc1"),
        0x33 => hint("pref"),
        0x35 => fmem("ldc1"),
        0x36 => fmem("lqc2"),
        0x37 => mem("ld"),
        0x39 => fmem("swc1"),
        0x3D => fmem("sdc1"),
        0x3E => fmem("sqc2"),
        0x3F => mem("sd"),
        _ => return None,
    })
}

/// MMI extension (opcode 0x1C): packed-integer SIMD plus the second
/// multiply/divide pipeline. Sub-format index is bits 10..6.
fn mmi(catalog: &Catalog, word: u32) -> Option<Decoded> {
    let rs = (word >> 21) & 0x1F;
    let rt = (word >> 16) & 0x1F;
    let rd = (word >> 11) & 0x1F;
    let sa = (word >> 6) & 0x1F;
    let funct = word & 0x3F;
    let fmt = (word >> 6) & 0x1F;
    let reg = |r: u32| catalog.gpr_name(r);

    let rdst = |m: &'static str| Decoded::args(m, format!("{}, {}, {}", reg(rd), reg(rs), reg(rt)));
    let rdts = |m: &'static str| Decoded::args(m, format!("{}, {}, {}", reg(rd), reg(rt), reg(rs)));
    let rdt = |m: &'static str| Decoded::args(m, format!("{}, {}", reg(rd), reg(rt)));
    let pair = |m: &'static str| Decoded::args(m, format!("{}, {}", reg(rs), reg(rt)));
    let shift = |m: &'static str| Decoded::args(m, format!("{}, {}, {}", reg(rd), reg(rt), sa));
    let mult3 = |m: &'static str| {
        if rd == 0 {
            Decoded::args(m, format!("{}, {}", reg(rs), reg(rt)))
        } else {
            Decoded::args(m, format!("{}, {}, {}", reg(rd), reg(rs), reg(rt)))
        }
    };

    Some(match funct {
        0x00 => mult3("madd"),
        0x01 => mult3("maddu"),
        0x04 => Decoded::args("plzcw", format!("{}, {}", reg(rd), reg(rs))),
        // MMI0
        0x08 => match fmt {
            0x00 => rdst("paddw"),
            0x01 => rdst("psubw"),
            0x02 => rdst("pcgtw"),
            0x03 => rdst("pmaxw"),
            0x04 => rdst("paddh"),
            0x05 => rdst("psubh"),
            0x06 => rdst("pcgth"),
            0x07 => rdst("pmaxh"),
            0x08 => rdst("paddb"),
            0x09 => rdst("psubb"),
            0x0A => rdst("pcgtb"),
            0x10 => rdst("paddsw"),
            0x11 => rdst("psubsw"),
            0x12 => rdst("pextlw"),
            0x13 => rdst("ppacw"),
            0x14 => rdst("paddsh"),
            0x15 => rdst("psubsh"),
            0x16 => rdst("pextlh"),
            0x17 => rdst("ppach"),
            0x18 => rdst("paddsb"),
            0x19 => rdst("psubsb"),
            0x1A => rdst("pextlb"),
            0x1B => rdst("ppacb"),
            0x1E => rdt("pext5"),
            0x1F => rdt("ppac5"),
            _ => return None,
        },
        // MMI2
        0x09 => match fmt {
            0x00 => rdst("pmaddw"),
            0x02 => rdts("psllvw"),
            0x03 => rdts("psrlvw"),
            0x04 => rdst("pmsubw"),
            0x08 => Decoded::args("pmfhi", reg(rd).to_string()),
            0x09 => Decoded::args("pmflo", reg(rd).to_string()),
            0x0A => rdst("pinth"),
            0x0C => rdst("pmultw"),
            0x0D => pair("pdivw"),
            0x0E => rdst("pcpyld"),
            0x10 => rdst("pmaddh"),
            0x11 => rdst("phmadh"),
            0x12 => rdst("pand"),
            0x13 => rdst("pxor"),
            0x14 => rdst("pmsubh"),
            0x15 => rdst("phmsbh"),
            0x1A => rdt("pexeh"),
            0x1B => rdt("prevh"),
            0x1C => rdst("pmulth"),
            0x1D => pair("pdivbw"),
            0x1E => rdt("pexew"),
            0x1F => rdt("prot3w"),
            _ => return None,
        },
        0x10 => Decoded::args("mfhi1", reg(rd).to_string()),
        0x11 => Decoded::args("mthi1", reg(rs).to_string()),
        0x12 => Decoded::args("mflo1", reg(rd).to_string()),
        0x13 => Decoded::args("mtlo1", reg(rs).to_string()),
        0x18 => mult3("mult1"),
        0x19 => mult3("multu1"),
        0x1A => pair("div1"),
        0x1B => pair("divu1"),
        0x20 => mult3("madd1"),
        0x21 => mult3("maddu1"),
        // MMI1
        0x28 => match fmt {
            0x01 => rdt("pabsw"),
            0x02 => rdst("pceqw"),
            0x03 => rdst("pminw"),
            0x04 => rdst("padsbh"),
            0x05 => rdt("pabsh"),
            0x06 => rdst("pceqh"),
            0x07 => rdst("pminh"),
            0x0A => rdst("pceqb"),
            0x10 => rdst("padduw"),
            0x11 => rdst("psubuw"),
            0x12 => rdst("pextuw"),
            0x14 => rdst("padduh"),
            0x15 => rdst("psubuh"),
            0x16 => rdst("pextuh"),
            0x18 => rdst("paddub"),
            0x19 => rdst("psubub"),
            0x1A => rdst("pextub"),
            0x1B => rdst("qfsrv"),
            _ => return None,
        },
        // MMI3
        0x29 => match fmt {
            0x00 => rdst("pmadduw"),
            0x02 => rdts("psravw"),
            0x08 => Decoded::args("pmthi", reg(rs).to_string()),
            0x09 => Decoded::args("pmtlo", reg(rs).to_string()),
            0x0A => rdst("pinteh"),
            0x0C => rdst("pmultuw"),
            0x0D => pair("pdivuw"),
            0x0E => rdst("pcpyud"),
            0x12 => rdst("por"),
            0x13 => rdst("pnor"),
            0x1A => rdt("pexch"),
            0x1B => rdt("pcpyh"),
            0x1E => rdt("pexcw"),
            _ => return None,
        },
        // PMFHL/PMTHL formats live in the sa field.
        0x30 => match fmt {
            0x00 => Decoded::args("pmfhl.lw", reg(rd).to_string()),
            0x01 => Decoded::args("pmfhl.uw", reg(rd).to_string()),
            0x02 => Decoded::args("pmfhl.slw", reg(rd).to_string()),
            0x03 => Decoded::args("pmfhl.lh", reg(rd).to_string()),
            0x04 => Decoded::args("pmfhl.sh", reg(rd).to_string()),
            _ => return None,
        },
        0x31 => {
            if fmt == 0x00 {
                Decoded::args("pmthl.lw", reg(rs).to_string())
            } else {
                return None;
            }
        }
        0x34 => shift("psllh"),
        0x36 => shift("psrlh"),
        0x37 => shift("psrah"),
        0x3C => shift("psllw"),
        0x3E => shift("psrlw"),
        0x3F => shift("psraw"),
        _ => return None,
    })
}

fn cop0(catalog: &Catalog, word: u32, pc: u32) -> Option<Decoded> {
    let rs = (word >> 21) & 0x1F;
    let rt = (word >> 16) & 0x1F;
    let rd = (word >> 11) & 0x1F;
    let funct = word & 0x3F;
    let simm = sext16(word & 0xFFFF);
    let reg = |r: u32| catalog.gpr_name(r);

    match rs {
        0x00 => Some(Decoded::args("mfc0", format!("{}, ${rd}", reg(rt)))),
        0x04 => Some(Decoded::args("mtc0", format!("{}, ${rd}", reg(rt)))),
        0x08 => {
            let (text, target) = fmt_branch(pc, simm);
            let mnemonic = match rt {
                0x00 => "bc0f",
                0x01 => "bc0t",
                0x02 => "bc0fl",
                0x03 => "bc0tl",
                _ => return None,
            };
            Some(Decoded::to_target(mnemonic, text, target))
        }
        0x10 => {
            let mnemonic = match funct {
                0x01 => "tlbr",
                0x02 => "tlbwi",
                0x06 => "tlbwr",
                0x08 => "tlbp",
                0x18 => "eret",
                0x38 => "ei",
                0x39 => "di",
                _ => return None,
            };
            Some(Decoded::op(mnemonic))
        }
        _ => None,
    }
}

fn cop1(catalog: &Catalog, word: u32, pc: u32) -> Option<Decoded> {
    let rs = (word >> 21) & 0x1F;
    let rt = (word >> 16) & 0x1F;
    let rd = (word >> 11) & 0x1F;
    let sa = (word >> 6) & 0x1F;
    let funct = word & 0x3F;
    let simm = sext16(word & 0xFFFF);
    let reg = |r: u32| catalog.gpr_name(r);

    match rs {
        0x00 => Some(Decoded::args("mfc1", format!("{}, f{rd}", reg(rt)))),
        0x02 => Some(Decoded::args("cfc1", format!("{}, f{rd}", reg(rt)))),
        0x04 => Some(Decoded::args("mtc1", format!("{}, f{rd}", reg(rt)))),
        0x06 => Some(Decoded::args("ctc1", format!("{}, f{rd}", reg(rt)))),
        0x08 => {
            let (text, target) = fmt_branch(pc, simm);
            let mnemonic = match rt {
                0x00 => "bc1f",
                0x01 => "bc1t",
                0x02 => "bc1fl",
                0x03 => "bc1tl",
                _ => return None,
            };
            Some(Decoded::to_target(mnemonic, text, target))
        }
        // S format: fd in sa, fs in rd, ft in rt.
        0x10 => {
            let three = |m: &'static str| Decoded::args(m, format!("f{sa}, f{rd}, f{rt}"));
            let two = |m: &'static str| Decoded::args(m, format!("f{sa}, f{rd}"));
            let acc = |m: &'static str| Decoded::args(m, format!("f{rd}, f{rt}"));
            Some(match funct {
                0x00 => three("add.s"),
                0x01 => three("sub.s"),
                0x02 => three("mul.s"),
                0x03 => three("div.s"),
                0x04 => Decoded::args("sqrt.s", format!("f{sa}, f{rt}")),
                0x05 => two("abs.s"),
                0x06 => two("mov.s"),
                0x07 => two("neg.s"),
                0x16 => three("rsqrt.s"),
                0x18 => acc("adda.s"),
                0x19 => acc("suba.s"),
                0x1A => acc("mula.s"),
                0x1C => three("madd.s"),
                0x1D => three("msub.s"),
                0x1E => acc("madda.s"),
                0x1F => acc("msuba.s"),
                0x24 => two("cvt.w.s"),
                0x28 => three("max.s"),
                0x29 => three("min.s"),
                0x30 => acc("c.f.s"),
                0x32 => acc("c.eq.s"),
                0x34 => acc("c.lt.s"),
                0x36 => acc("c.le.s"),
                _ => return None,
            })
        }
        // W format.
        0x14 => {
            if funct == 0x20 {
                Some(Decoded::args("cvt.s.w", format!("f{sa}, f{rd}")))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// COP2 / VU0 macro instructions.
///
/// `rs >= 0x10` selects the macro tables; special1 dispatches on `funct`,
/// special2 on `(fd << 2) | funct[1:0]`. Broadcast variants carry the lane
/// in the low two funct bits, dest masks in bits 24..21.
fn cop2(catalog: &Catalog, word: u32, pc: u32) -> Option<Decoded> {
    let rs = (word >> 21) & 0x1F;
    let rt = (word >> 16) & 0x1F;
    let rd = (word >> 11) & 0x1F;
    let simm = sext16(word & 0xFFFF);
    let reg = |r: u32| catalog.gpr_name(r);

    match rs {
        0x01 => return Some(Decoded::args("qmfc2", format!("{}, vf{rd}", reg(rt)))),
        0x02 => return Some(Decoded::args("cfc2", format!("{}, vi{rd}", reg(rt)))),
        0x05 => return Some(Decoded::args("qmtc2", format!("{}, vf{rd}", reg(rt)))),
        0x06 => return Some(Decoded::args("ctc2", format!("{}, vi{rd}", reg(rt)))),
        0x08 => {
            let (text, target) = fmt_branch(pc, simm);
            let mnemonic = match rt {
                0x00 => "bc2f",
                0x01 => "bc2t",
                0x02 => "bc2fl",
                0x03 => "bc2tl",
                _ => return None,
            };
            return Some(Decoded::to_target(mnemonic, text, target));
        }
        _ if rs < 0x10 => return None,
        _ => {}
    }

    let funct = word & 0x3F;
    let dest = DestMask::from_bits_truncate((word >> 21) & 0xF);
    let ft = (word >> 16) & 0x1F;
    let fs = (word >> 11) & 0x1F;
    let fd = (word >> 6) & 0x1F;
    let bc = ["x", "y", "z", "w"][(funct & 0x3) as usize];
    let d = dest.suffix();

    // Broadcast groups: fd.dest, fs, ft<lane>; lane in funct[1:0].
    const VADD_BC: [&str; 4] = ["vaddx", "vaddy", "vaddz", "vaddw"];
    const VSUB_BC: [&str; 4] = ["vsubx", "vsuby", "vsubz", "vsubw"];
    const VMADD_BC: [&str; 4] = ["vmaddx", "vmaddy", "vmaddz", "vmaddw"];
    const VMSUB_BC: [&str; 4] = ["vmsubx", "vmsuby", "vmsubz", "vmsubw"];
    const VMAX_BC: [&str; 4] = ["vmaxx", "vmaxy", "vmaxz", "vmaxw"];
    const VMINI_BC: [&str; 4] = ["vminix", "vminiy", "vminiz", "vminiw"];
    const VMUL_BC: [&str; 4] = ["vmulx", "vmuly", "vmulz", "vmulw"];

    let bc3 = |names: [&'static str; 4]| {
        Decoded::args(
            names[(funct & 0x3) as usize],
            format!("vf{fd}{d}, vf{fs}, vf{ft}.{bc}"),
        )
    };
    let fdst = |m: &'static str| Decoded::args(m, format!("vf{fd}{d}, vf{fs}, vf{ft}"));
    let fq = |m: &'static str| Decoded::args(m, format!("vf{fd}{d}, vf{fs}, Q"));
    let fi = |m: &'static str| Decoded::args(m, format!("vf{fd}{d}, vf{fs}, I"));
    let int3 = |m: &'static str| Decoded::args(m, format!("vi{fd}, vi{fs}, vi{ft}"));

    if funct < 0x3C {
        return Some(match funct {
            0x00..=0x03 => bc3(VADD_BC),
            0x04..=0x07 => bc3(VSUB_BC),
            0x08..=0x0B => bc3(VMADD_BC),
            0x0C..=0x0F => bc3(VMSUB_BC),
            0x10..=0x13 => bc3(VMAX_BC),
            0x14..=0x17 => bc3(VMINI_BC),
            0x18..=0x1B => bc3(VMUL_BC),
            0x1C => fq("vmulq"),
            0x1D => fi("vmaxi"),
            0x1E => fi("vmuli"),
            0x1F => fi("vminii"),
            0x20 => fq("vaddq"),
            0x21 => fq("vmaddq"),
            0x22 => fi("vaddi"),
            0x23 => fi("vmaddi"),
            0x24 => fq("vsubq"),
            0x25 => fq("vmsubq"),
            0x26 => fi("vsubi"),
            0x27 => fi("vmsubi"),
            0x28 => fdst("vadd"),
            0x29 => fdst("vmadd"),
            0x2A => fdst("vmul"),
            0x2B => fdst("vmax"),
            0x2C => fdst("vsub"),
            0x2D => fdst("vmsub"),
            0x2E => Decoded::args("vopmsub", format!("vf{fd}, vf{fs}, vf{ft}")),
            0x2F => fdst("vmini"),
            0x30 => int3("viadd"),
            0x31 => int3("visub"),
            0x32 => {
                // imm5 lives in the fd field, sign extended.
                let imm5 = ((fd as i32) << 27) >> 27;
                Decoded::args("viaddi", format!("vi{ft}, vi{fs}, {imm5}"))
            }
            0x34 => int3("viand"),
            0x35 => int3("vior"),
            0x38 => {
                let imm15 = (word >> 6) & 0x7FFF;
                Decoded::args("vcallms", fmt_addr(imm15 * 8))
            }
            0x39 => Decoded::args("vcallmsr", "vi27".to_string()),
            _ => return None,
        });
    }

    // Special2: sub-op from the fd field plus the low two funct bits.
    let sub = (fd << 2) | (funct & 0x3);
    let fsf = ["x", "y", "z", "w"][((word >> 21) & 0x3) as usize];
    let ftf = ["x", "y", "z", "w"][((word >> 23) & 0x3) as usize];

    const VADDA_BC: [&str; 4] = ["vaddax", "vadday", "vaddaz", "vaddaw"];
    const VSUBA_BC: [&str; 4] = ["vsubax", "vsubay", "vsubaz", "vsubaw"];
    const VMADDA_BC: [&str; 4] = ["vmaddax", "vmadday", "vmaddaz", "vmaddaw"];
    const VMSUBA_BC: [&str; 4] = ["vmsubax", "vmsubay", "vmsubaz", "vmsubaw"];
    const VMULA_BC: [&str; 4] = ["vmulax", "vmulay", "vmulaz", "vmulaw"];

    let abc3 = |names: [&'static str; 4]| {
        Decoded::args(
            names[(sub & 0x3) as usize],
            format!("ACC{d}, vf{fs}, vf{ft}.{bc}"),
        )
    };
    let acc3 = |m: &'static str| Decoded::args(m, format!("ACC{d}, vf{fs}, vf{ft}"));
    let accq = |m: &'static str| Decoded::args(m, format!("ACC{d}, vf{fs}, Q"));
    let acci = |m: &'static str| Decoded::args(m, format!("ACC{d}, vf{fs}, I"));
    let cvt = |m: &'static str| Decoded::args(m, format!("vf{ft}{d}, vf{fs}"));

    Some(match sub {
        0x00..=0x03 => abc3(VADDA_BC),
        0x04..=0x07 => abc3(VSUBA_BC),
        0x08..=0x0B => abc3(VMADDA_BC),
        0x0C..=0x0F => abc3(VMSUBA_BC),
        0x10 => cvt("vitof0"),
        0x11 => cvt("vitof4"),
        0x12 => cvt("vitof12"),
        0x13 => cvt("vitof15"),
        0x14 => cvt("vftoi0"),
        0x15 => cvt("vftoi4"),
        0x16 => cvt("vftoi12"),
        0x17 => cvt("vftoi15"),
        0x18..=0x1B => abc3(VMULA_BC),
        0x1C => accq("vmulaq"),
        0x1D => cvt("vabs"),
        0x1E => acci("vmulai"),
        0x1F => Decoded::args("vclipw", format!("vf{fs}.xyz, vf{ft}.w")),
        0x20 => accq("vaddaq"),
        0x21 => accq("vmaddaq"),
        0x22 => acci("vaddai"),
        0x23 => acci("vmaddai"),
        0x24 => accq("vsubaq"),
        0x25 => accq("vmsubaq"),
        0x26 => acci("vsubai"),
        0x27 => acci("vmsubai"),
        0x28 => acc3("vadda"),
        0x29 => acc3("vmadda"),
        0x2A => acc3("vmula"),
        0x2C => acc3("vsuba"),
        0x2D => acc3("vmsuba"),
        0x2E => Decoded::args("vopmula", format!("ACC, vf{fs}, vf{ft}")),
        0x2F => Decoded::op("vnop"),
        0x30 => Decoded::args("vmove", format!("vf{ft}{d}, vf{fs}")),
        0x31 => Decoded::args("vmr32", format!("vf{ft}{d}, vf{fs}")),
        0x34 => Decoded::args("vlqi", format!("vf{ft}{d}, (vi{fs}++)")),
        0x35 => Decoded::args("vsqi", format!("vf{fs}{d}, (vi{ft}++)")),
        0x36 => Decoded::args("vlqd", format!("vf{ft}{d}, (--vi{fs})")),
        0x37 => Decoded::args("vsqd", format!("vf{fs}{d}, (--vi{ft})")),
        0x38 => Decoded::args("vdiv", format!("Q, vf{fs}.{fsf}, vf{ft}.{ftf}")),
        0x39 => Decoded::args("vsqrt", format!("Q, vf{ft}.{ftf}")),
        0x3A => Decoded::args("vrsqrt", format!("Q, vf{fs}.{fsf}, vf{ft}.{ftf}")),
        0x3B => Decoded::op("vwaitq"),
        0x3C => Decoded::args("vmtir", format!("vi{ft}, vf{fs}.{fsf}")),
        0x3D => Decoded::args("vmfir", format!("vf{ft}{d}, vi{fs}")),
        0x3E => Decoded::args("vilwr", format!("vi{ft}{d}, (vi{fs})")),
        0x3F => Decoded::args("viswr", format!("vi{ft}{d}, (vi{fs})")),
        0x40 => Decoded::args("vrnext", format!("vf{ft}{d}, R")),
        0x41 => Decoded::args("vrget", format!("vf{ft}{d}, R")),
        0x42 => Decoded::args("vrinit", format!("R, vf{fs}.{fsf}")),
        0x43 => Decoded::args("vrxor", format!("R, vf{fs}.{fsf}")),
        _ => return None,
    })
}
