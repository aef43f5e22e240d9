//! MIPS R5900 (Emotion Engine) catalog data: register sets and the
//! instruction templates reachable through CDS syntax.
//!
//! Template strings are 32 characters, `0`/`1` for fixed bits, letters for
//! operand fields: `s` = rs, `t` = rt, `d` = rd, `a` = sa, `i` = 16-bit
//! immediate/offset, `j` = 26-bit jump target.

use crate::catalog::Category::{Branch, Jump, Other};
use crate::catalog::{Catalog, Category, InstructionDef, Register, Slot};

/// The R5900 catalog.
pub fn catalog() -> Catalog {
    Catalog {
        gprs: GPRS,
        cop0: COP0_REGS,
        cop1: COP1_REGS,
        instructions: INSTRUCTIONS,
    }
}

const fn r(
    name: &'static str,
    description: &'static str,
    binary: &'static str,
    number: u8,
) -> Register {
    Register {
        name,
        description,
        binary,
        number,
    }
}

pub const GPRS: &[Register] = &[
    r("zero", "Hardwired zero", "00000", 0),
    r("at", "Assembler temporary", "00001", 1),
    r("v0", "Function result 0", "00010", 2),
    r("v1", "Function result 1", "00011", 3),
    r("a0", "Argument 0", "00100", 4),
    r("a1", "Argument 1", "00101", 5),
    r("a2", "Argument 2", "00110", 6),
    r("a3", "Argument 3", "00111", 7),
    r("t0", "Temporary 0", "01000", 8),
    r("t1", "Temporary 1", "01001", 9),
    r("t2", "Temporary 2", "01010", 10),
    r("t3", "Temporary 3", "01011", 11),
    r("t4", "Temporary 4", "01100", 12),
    r("t5", "Temporary 5", "01101", 13),
    r("t6", "Temporary 6", "01110", 14),
    r("t7", "Temporary 7", "01111", 15),
    r("s0", "Saved 0", "10000", 16),
    r("s1", "Saved 1", "10001", 17),
    r("s2", "Saved 2", "10010", 18),
    r("s3", "Saved 3", "10011", 19),
    r("s4", "Saved 4", "10100", 20),
    r("s5", "Saved 5", "10101", 21),
    r("s6", "Saved 6", "10110", 22),
    r("s7", "Saved 7", "10111", 23),
    r("t8", "Temporary 8", "11000", 24),
    r("t9", "Temporary 9", "11001", 25),
    r("k0", "Kernel 0", "11010", 26),
    r("k1", "Kernel 1", "11011", 27),
    r("gp", "Global pointer", "11100", 28),
    r("sp", "Stack pointer", "11101", 29),
    r("fp", "Frame pointer", "11110", 30),
    r("ra", "Return address", "11111", 31),
];

pub const COP0_REGS: &[Register] = &[
    r("index", "TLB index", "00000", 0),
    r("random", "TLB random index", "00001", 1),
    r("entrylo0", "TLB entry low 0", "00010", 2),
    r("entrylo1", "TLB entry low 1", "00011", 3),
    r("context", "TLB context", "00100", 4),
    r("pagemask", "TLB page mask", "00101", 5),
    r("wired", "Wired TLB entries", "00110", 6),
    r("badvaddr", "Bad virtual address", "01000", 8),
    r("count", "Timer count", "01001", 9),
    r("entryhi", "TLB entry high", "01010", 10),
    r("compare", "Timer compare", "01011", 11),
    r("status", "Processor status", "01100", 12),
    r("cause", "Exception cause", "01101", 13),
    r("epc", "Exception PC", "01110", 14),
    r("prid", "Processor revision id", "01111", 15),
    r("config", "Configuration", "10000", 16),
    r("badpaddr", "Bad physical address", "10111", 23),
    r("debug", "Debug", "11000", 24),
    r("perf", "Performance counter", "11001", 25),
    r("taglo", "Cache tag low", "11100", 28),
    r("taghi", "Cache tag high", "11101", 29),
    r("errorepc", "Error exception PC", "11110", 30),
];

pub const COP1_REGS: &[Register] = &[
    r("f0", "FPU register 0", "00000", 0),
    r("f1", "FPU register 1", "00001", 1),
    r("f2", "FPU register 2", "00010", 2),
    r("f3", "FPU register 3", "00011", 3),
    r("f4", "FPU register 4", "00100", 4),
    r("f5", "FPU register 5", "00101", 5),
    r("f6", "FPU register 6", "00110", 6),
    r("f7", "FPU register 7", "00111", 7),
    r("f8", "FPU register 8", "01000", 8),
    r("f9", "FPU register 9", "01001", 9),
    r("f10", "FPU register 10", "01010", 10),
    r("f11", "FPU register 11", "01011", 11),
    r("f12", "FPU register 12", "01100", 12),
    r("f13", "FPU register 13", "01101", 13),
    r("f14", "FPU register 14", "01110", 14),
    r("f15", "FPU register 15", "01111", 15),
    r("f16", "FPU register 16", "10000", 16),
    r("f17", "FPU register 17", "10001", 17),
    r("f18", "FPU register 18", "10010", 18),
    r("f19", "FPU register 19", "10011", 19),
    r("f20", "FPU register 20", "10100", 20),
    r("f21", "FPU register 21", "10101", 21),
    r("f22", "FPU register 22", "10110", 22),
    r("f23", "FPU register 23", "10111", 23),
    r("f24", "FPU register 24", "11000", 24),
    r("f25", "FPU register 25", "11001", 25),
    r("f26", "FPU register 26", "11010", 26),
    r("f27", "FPU register 27", "11011", 27),
    r("f28", "FPU register 28", "11100", 28),
    r("f29", "FPU register 29", "11101", 29),
    r("f30", "FPU register 30", "11110", 30),
    r("f31", "FPU register 31", "11111", 31),
];

// Common operand-syntax shapes.
const NONE: &[Slot] = &[];
const RD: &[Slot] = &[Slot::Gpr('d')];
const RS: &[Slot] = &[Slot::Gpr('s')];
const RST: &[Slot] = &[Slot::Gpr('s'), Slot::Gpr('t')];
const RDST: &[Slot] = &[Slot::Gpr('d'), Slot::Gpr('s'), Slot::Gpr('t')];
const RDTS: &[Slot] = &[Slot::Gpr('d'), Slot::Gpr('t'), Slot::Gpr('s')];
const RDTA: &[Slot] = &[Slot::Gpr('d'), Slot::Gpr('t'), Slot::Sa('a')];
const RSI: &[Slot] = &[Slot::Gpr('s'), Slot::Imm('i')];
const RTI: &[Slot] = &[Slot::Gpr('t'), Slot::Imm('i')];
const RSTI: &[Slot] = &[Slot::Gpr('s'), Slot::Gpr('t'), Slot::Imm('i')];
const RTSI: &[Slot] = &[Slot::Gpr('t'), Slot::Gpr('s'), Slot::Imm('i')];
const TMEM: &[Slot] = &[Slot::Gpr('t'), Slot::Mem { offset: 'i', base: 's' }];
const FMEM: &[Slot] = &[Slot::Fpr('t'), Slot::Mem { offset: 'i', base: 's' }];
const TGT: &[Slot] = &[Slot::Target('j')];
const IMM: &[Slot] = &[Slot::Imm('i')];
const GT_C0D: &[Slot] = &[Slot::Gpr('t'), Slot::Cop0('d')];
const GT_FD: &[Slot] = &[Slot::Gpr('t'), Slot::Fpr('d')];
const FADT: &[Slot] = &[Slot::Fpr('a'), Slot::Fpr('d'), Slot::Fpr('t')];
const FAD: &[Slot] = &[Slot::Fpr('a'), Slot::Fpr('d')];
const FAT: &[Slot] = &[Slot::Fpr('a'), Slot::Fpr('t')];
const FDT: &[Slot] = &[Slot::Fpr('d'), Slot::Fpr('t')];

const fn def(
    mnemonic: &'static str,
    syntax: &'static [Slot],
    template: &'static str,
    category: Category,
    description: &'static str,
) -> InstructionDef {
    InstructionDef {
        mnemonic,
        syntax,
        template,
        category,
        description,
    }
}

#[rustfmt::skip]
pub const INSTRUCTIONS: &[InstructionDef] = &[
    // SPECIAL: shifts
    def("nop",     NONE, "00000000000000000000000000000000", Other, "No operation"),
    def("sll",     RDTA, "00000000000tttttdddddaaaaa000000", Other, "Shift word left logical"),
    def("srl",     RDTA, "00000000000tttttdddddaaaaa000010", Other, "Shift word right logical"),
    def("sra",     RDTA, "00000000000tttttdddddaaaaa000011", Other, "Shift word right arithmetic"),
    def("sllv",    RDTS, "000000ssssstttttddddd00000000100", Other, "Shift word left logical variable"),
    def("srlv",    RDTS, "000000ssssstttttddddd00000000110", Other, "Shift word right logical variable"),
    def("srav",    RDTS, "000000ssssstttttddddd00000000111", Other, "Shift word right arithmetic variable"),
    def("dsllv",   RDTS, "000000ssssstttttddddd00000010100", Other, "Shift doubleword left logical variable"),
    def("dsrlv",   RDTS, "000000ssssstttttddddd00000010110", Other, "Shift doubleword right logical variable"),
    def("dsrav",   RDTS, "000000ssssstttttddddd00000010111", Other, "Shift doubleword right arithmetic variable"),
    def("dsll",    RDTA, "00000000000tttttdddddaaaaa111000", Other, "Shift doubleword left logical"),
    def("dsrl",    RDTA, "00000000000tttttdddddaaaaa111010", Other, "Shift doubleword right logical"),
    def("dsra",    RDTA, "00000000000tttttdddddaaaaa111011", Other, "Shift doubleword right arithmetic"),
    def("dsll32",  RDTA, "00000000000tttttdddddaaaaa111100", Other, "Shift doubleword left logical plus 32"),
    def("dsrl32",  RDTA, "00000000000tttttdddddaaaaa111110", Other, "Shift doubleword right logical plus 32"),
    def("dsra32",  RDTA, "00000000000tttttdddddaaaaa111111", Other, "Shift doubleword right arithmetic plus 32"),
    // SPECIAL: register jumps
    def("jr",      RS,   "000000sssss000000000000000001000", Other, "Jump register"),
    def("jalr",    RS,   "000000sssss000001111100000001001", Other, "Jump and link register"),
    // SPECIAL: conditional moves, system
    def("movz",    RDST, "000000ssssstttttddddd00000001010", Other, "Move conditional on zero"),
    def("movn",    RDST, "000000ssssstttttddddd00000001011", Other, "Move conditional on not zero"),
    def("syscall", NONE, "00000000000000000000000000001100", Other, "System call"),
    def("break",   NONE, "00000000000000000000000000001101", Other, "Breakpoint"),
    def("sync",    NONE, "00000000000000000000000000001111", Other, "Synchronize shared memory"),
    // SPECIAL: HI/LO moves, multiply/divide
    def("mfhi",    RD,   "0000000000000000ddddd00000010000", Other, "Move from HI"),
    def("mthi",    RS,   "000000sssss000000000000000010001", Other, "Move to HI"),
    def("mflo",    RD,   "0000000000000000ddddd00000010010", Other, "Move from LO"),
    def("mtlo",    RS,   "000000sssss000000000000000010011", Other, "Move to LO"),
    def("mult",    RST,  "000000sssssttttt0000000000011000", Other, "Multiply word"),
    def("multu",   RST,  "000000sssssttttt0000000000011001", Other, "Multiply word unsigned"),
    def("div",     RST,  "000000sssssttttt0000000000011010", Other, "Divide word"),
    def("divu",    RST,  "000000sssssttttt0000000000011011", Other, "Divide word unsigned"),
    // SPECIAL: ALU
    def("add",     RDST, "000000ssssstttttddddd00000100000", Other, "Add word"),
    def("addu",    RDST, "000000ssssstttttddddd00000100001", Other, "Add word unsigned"),
    def("sub",     RDST, "000000ssssstttttddddd00000100010", Other, "Subtract word"),
    def("subu",    RDST, "000000ssssstttttddddd00000100011", Other, "Subtract word unsigned"),
    def("and",     RDST, "000000ssssstttttddddd00000100100", Other, "And"),
    def("or",      RDST, "000000ssssstttttddddd00000100101", Other, "Or"),
    def("xor",     RDST, "000000ssssstttttddddd00000100110", Other, "Exclusive or"),
    def("nor",     RDST, "000000ssssstttttddddd00000100111", Other, "Not or"),
    def("mfsa",    RD,   "0000000000000000ddddd00000101000", Other, "Move from shift amount register"),
    def("mtsa",    RS,   "000000sssss000000000000000101001", Other, "Move to shift amount register"),
    def("slt",     RDST, "000000ssssstttttddddd00000101010", Other, "Set on less than"),
    def("sltu",    RDST, "000000ssssstttttddddd00000101011", Other, "Set on less than unsigned"),
    def("dadd",    RDST, "000000ssssstttttddddd00000101100", Other, "Add doubleword"),
    def("daddu",   RDST, "000000ssssstttttddddd00000101101", Other, "Add doubleword unsigned"),
    def("dsub",    RDST, "000000ssssstttttddddd00000101110", Other, "Subtract doubleword"),
    def("dsubu",   RDST, "000000ssssstttttddddd00000101111", Other, "Subtract doubleword unsigned"),
    def("teq",     RST,  "000000sssssttttt0000000000110100", Other, "Trap if equal"),
    // REGIMM branches
    def("bltz",    RSI,  "000001sssss00000iiiiiiiiiiiiiiii", Branch, "Branch on less than zero"),
    def("bgez",    RSI,  "000001sssss00001iiiiiiiiiiiiiiii", Branch, "Branch on greater than or equal to zero"),
    def("bltzl",   RSI,  "000001sssss00010iiiiiiiiiiiiiiii", Branch, "Branch on less than zero likely"),
    def("bgezl",   RSI,  "000001sssss00011iiiiiiiiiiiiiiii", Branch, "Branch on greater than or equal to zero likely"),
    def("bltzal",  RSI,  "000001sssss10000iiiiiiiiiiiiiiii", Branch, "Branch on less than zero and link"),
    def("bgezal",  RSI,  "000001sssss10001iiiiiiiiiiiiiiii", Branch, "Branch on greater than or equal to zero and link"),
    def("mtsab",   RSI,  "000001sssss11000iiiiiiiiiiiiiiii", Other, "Move byte shift amount to SA"),
    def("mtsah",   RSI,  "000001sssss11001iiiiiiiiiiiiiiii", Other, "Move halfword shift amount to SA"),
    // Jumps
    def("j",       TGT,  "000010jjjjjjjjjjjjjjjjjjjjjjjjjj", Jump, "Jump"),
    def("jal",     TGT,  "000011jjjjjjjjjjjjjjjjjjjjjjjjjj", Jump, "Jump and link"),
    // Branches
    def("beq",     RSTI, "000100ssssstttttiiiiiiiiiiiiiiii", Branch, "Branch on equal"),
    def("bne",     RSTI, "000101ssssstttttiiiiiiiiiiiiiiii", Branch, "Branch on not equal"),
    def("blez",    RSI,  "000110sssss00000iiiiiiiiiiiiiiii", Branch, "Branch on less than or equal to zero"),
    def("bgtz",    RSI,  "000111sssss00000iiiiiiiiiiiiiiii", Branch, "Branch on greater than zero"),
    def("beql",    RSTI, "010100ssssstttttiiiiiiiiiiiiiiii", Branch, "Branch on equal likely"),
    def("bnel",    RSTI, "010101ssssstttttiiiiiiiiiiiiiiii", Branch, "Branch on not equal likely"),
    def("blezl",   RSI,  "010110sssss00000iiiiiiiiiiiiiiii", Branch, "Branch on less than or equal to zero likely"),
    def("bgtzl",   RSI,  "010111sssss00000iiiiiiiiiiiiiiii", Branch, "Branch on greater than zero likely"),
    // Immediate arithmetic/logical
    def("addi",    RTSI, "001000ssssstttttiiiiiiiiiiiiiiii", Other, "Add immediate word"),
    def("addiu",   RTSI, "001001ssssstttttiiiiiiiiiiiiiiii", Other, "Add immediate unsigned word"),
    def("slti",    RTSI, "001010ssssstttttiiiiiiiiiiiiiiii", Other, "Set on less than immediate"),
    def("sltiu",   RTSI, "001011ssssstttttiiiiiiiiiiiiiiii", Other, "Set on less than immediate unsigned"),
    def("andi",    RTSI, "001100ssssstttttiiiiiiiiiiiiiiii", Other, "And immediate"),
    def("ori",     RTSI, "001101ssssstttttiiiiiiiiiiiiiiii", Other, "Or immediate"),
    def("xori",    RTSI, "001110ssssstttttiiiiiiiiiiiiiiii", Other, "Exclusive or immediate"),
    def("lui",     RTI,  "00111100000tttttiiiiiiiiiiiiiiii", Other, "Load upper immediate"),
    def("daddi",   RTSI, "011000ssssstttttiiiiiiiiiiiiiiii", Other, "Add immediate doubleword"),
    def("daddiu",  RTSI, "011001ssssstttttiiiiiiiiiiiiiiii", Other, "Add immediate doubleword unsigned"),
    // Loads and stores, byte through quadword
    def("ldl",     TMEM, "011010ssssstttttiiiiiiiiiiiiiiii", Other, "Load doubleword left"),
    def("ldr",     TMEM, "011011ssssstttttiiiiiiiiiiiiiiii", Other, "Load doubleword right"),
    def("lq",      TMEM, "011110ssssstttttiiiiiiiiiiiiiiii", Other, "Load quadword"),
    def("sq",      TMEM, "011111ssssstttttiiiiiiiiiiiiiiii", Other, "Store quadword"),
    def("lb",      TMEM, "100000ssssstttttiiiiiiiiiiiiiiii", Other, "Load byte"),
    def("lh",      TMEM, "100001ssssstttttiiiiiiiiiiiiiiii", Other, "Load halfword"),
    def("lwl",     TMEM, "100010ssssstttttiiiiiiiiiiiiiiii", Other, "Load word left"),
    def("lw",      TMEM, "100011ssssstttttiiiiiiiiiiiiiiii", Other, "Load word"),
    def("lbu",     TMEM, "100100ssssstttttiiiiiiiiiiiiiiii", Other, "Load byte unsigned"),
    def("lhu",     TMEM, "100101ssssstttttiiiiiiiiiiiiiiii", Other, "Load halfword unsigned"),
    def("lwr",     TMEM, "100110ssssstttttiiiiiiiiiiiiiiii", Other, "Load word right"),
    def("lwu",     TMEM, "100111ssssstttttiiiiiiiiiiiiiiii", Other, "Load word unsigned"),
    def("sb",      TMEM, "101000ssssstttttiiiiiiiiiiiiiiii", Other, "Store byte"),
    def("sh",      TMEM, "101001ssssstttttiiiiiiiiiiiiiiii", Other, "Store halfword"),
    def("swl",     TMEM, "101010ssssstttttiiiiiiiiiiiiiiii", Other, "Store word left"),
    def("sw",      TMEM, "101011ssssstttttiiiiiiiiiiiiiiii", Other, "Store word"),
    def("sdl",     TMEM, "101100ssssstttttiiiiiiiiiiiiiiii", Other, "Store doubleword left"),
    def("sdr",     TMEM, "101101ssssstttttiiiiiiiiiiiiiiii", Other, "Store doubleword right"),
    def("swr",     TMEM, "101110ssssstttttiiiiiiiiiiiiiiii", Other, "Store word right"),
    def("ld",      TMEM, "110111ssssstttttiiiiiiiiiiiiiiii", Other, "Load doubleword"),
    def("sd",      TMEM, "111111ssssstttttiiiiiiiiiiiiiiii", Other, "Store doubleword"),
    def("lwc1",    FMEM, "110001ssssstttttiiiiiiiiiiiiiiii", Other, "Load word to COP1"),
    def("swc1",    FMEM, "111001ssssstttttiiiiiiiiiiiiiiii", Other, "Store word from COP1"),
    def("lqc2",    FMEM, "110110ssssstttttiiiiiiiiiiiiiiii", Other, "Load quadword to COP2"),
    def("sqc2",    FMEM, "111110ssssstttttiiiiiiiiiiiiiiii", Other, "Store quadword from COP2"),
    // COP0 system control
    def("mfc0",    GT_C0D, "01000000000tttttddddd00000000000", Other, "Move from COP0"),
    def("mtc0",    GT_C0D, "01000000100tttttddddd00000000000", Other, "Move to COP0"),
    def("bc0f",    IMM,  "0100000100000000iiiiiiiiiiiiiiii", Branch, "Branch on COP0 false"),
    def("bc0t",    IMM,  "0100000100000001iiiiiiiiiiiiiiii", Branch, "Branch on COP0 true"),
    def("bc0fl",   IMM,  "0100000100000010iiiiiiiiiiiiiiii", Branch, "Branch on COP0 false likely"),
    def("bc0tl",   IMM,  "0100000100000011iiiiiiiiiiiiiiii", Branch, "Branch on COP0 true likely"),
    def("tlbr",    NONE, "01000010000000000000000000000001", Other, "Read indexed TLB entry"),
    def("tlbwi",   NONE, "01000010000000000000000000000010", Other, "Write indexed TLB entry"),
    def("tlbwr",   NONE, "01000010000000000000000000000110", Other, "Write random TLB entry"),
    def("tlbp",    NONE, "01000010000000000000000000001000", Other, "Probe TLB for matching entry"),
    def("eret",    NONE, "01000010000000000000000000011000", Other, "Exception return"),
    def("ei",      NONE, "01000010000000000000000000111000", Other, "Enable interrupts"),
    def("di",      NONE, "01000010000000000000000000111001", Other, "Disable interrupts"),
    // COP1 floating point
    def("mfc1",    GT_FD, "01000100000tttttddddd00000000000", Other, "Move from COP1"),
    def("cfc1",    GT_FD, "01000100010tttttddddd00000000000", Other, "Move control from COP1"),
    def("mtc1",    GT_FD, "01000100100tttttddddd00000000000", Other, "Move to COP1"),
    def("ctc1",    GT_FD, "01000100110tttttddddd00000000000", Other, "Move control to COP1"),
    def("bc1f",    IMM,  "0100010100000000iiiiiiiiiiiiiiii", Branch, "Branch on COP1 false"),
    def("bc1t",    IMM,  "0100010100000001iiiiiiiiiiiiiiii", Branch, "Branch on COP1 true"),
    def("bc1fl",   IMM,  "0100010100000010iiiiiiiiiiiiiiii", Branch, "Branch on COP1 false likely"),
    def("bc1tl",   IMM,  "0100010100000011iiiiiiiiiiiiiiii", Branch, "Branch on COP1 true likely"),
    def("add.s",   FADT, "01000110000tttttdddddaaaaa000000", Other, "Floating point add"),
    def("sub.s",   FADT, "01000110000tttttdddddaaaaa000001", Other, "Floating point subtract"),
    def("mul.s",   FADT, "01000110000tttttdddddaaaaa000010", Other, "Floating point multiply"),
    def("div.s",   FADT, "01000110000tttttdddddaaaaa000011", Other, "Floating point divide"),
    def("sqrt.s",  FAT,  "01000110000ttttt00000aaaaa000100", Other, "Floating point square root"),
    def("abs.s",   FAD,  "0100011000000000dddddaaaaa000101", Other, "Floating point absolute value"),
    def("mov.s",   FAD,  "0100011000000000dddddaaaaa000110", Other, "Floating point move"),
    def("neg.s",   FAD,  "0100011000000000dddddaaaaa000111", Other, "Floating point negate"),
    def("cvt.w.s", FAD,  "0100011000000000dddddaaaaa100100", Other, "Convert single to word fixed point"),
    def("cvt.s.w", FAD,  "0100011010000000dddddaaaaa100000", Other, "Convert word fixed point to single"),
    def("c.f.s",   FDT,  "01000110000tttttddddd00000110000", Other, "Floating point compare, false"),
    def("c.eq.s",  FDT,  "01000110000tttttddddd00000110010", Other, "Floating point compare, equal"),
    def("c.lt.s",  FDT,  "01000110000tttttddddd00000110100", Other, "Floating point compare, less than"),
    def("c.le.s",  FDT,  "01000110000tttttddddd00000110110", Other, "Floating point compare, less or equal"),
];
