use cds_rs::decode::decode;
use cds_rs::encode::{EncodeError, Encoder};
use cds_rs::Catalog;

fn catalog() -> Catalog {
    Catalog::ee()
}

#[test]
fn encodes_basic_forms() {
    let catalog = catalog();
    let enc = Encoder::new(&catalog);

    assert_eq!(enc.encode("addiu", "t0, t0, $0001").unwrap(), 0x2508_0001);
    assert_eq!(enc.encode("lui", "t0, $0010").unwrap(), 0x3C08_0010);
    assert_eq!(enc.encode("lw", "t9, $0010(t0)").unwrap(), 0x8D19_0010);
    assert_eq!(enc.encode("sw", "t9, $0010(t0)").unwrap(), 0xAD19_0010);
    assert_eq!(enc.encode("jr", "ra").unwrap(), 0x03E0_0008);
    assert_eq!(enc.encode("sll", "t0, t0, 2").unwrap(), 0x0008_4080);
    assert_eq!(enc.encode("j", "$00100000").unwrap(), 0x0804_0000);
    assert_eq!(enc.encode("nop", "").unwrap(), 0x0000_0000);
}

#[test]
fn encoding_is_case_insensitive() {
    let catalog = catalog();
    let enc = Encoder::new(&catalog);
    assert_eq!(
        enc.encode("ADDIU", "T0, t0, $0001").unwrap(),
        enc.encode("addiu", "t0, t0, $0001").unwrap()
    );
}

#[test]
fn encode_errors_are_distinct() {
    let catalog = catalog();
    let enc = Encoder::new(&catalog);

    assert!(matches!(
        enc.encode("frobnicate", "t0"),
        Err(EncodeError::UnknownMnemonic(_))
    ));
    assert!(matches!(
        enc.encode("addiu", "q9, t0, $0001"),
        Err(EncodeError::UnknownRegister(_))
    ));
    assert!(matches!(
        enc.encode("addiu", "t0, t0, pizza"),
        Err(EncodeError::BadImmediate(_))
    ));
    assert!(matches!(
        enc.encode("addiu", "t0"),
        Err(EncodeError::OperandCount { .. })
    ));
    assert!(matches!(
        enc.encode("sll", "t0, t0, 99"),
        Err(EncodeError::FieldOverflow { .. })
    ));
}

#[test]
fn round_trips_through_the_codec() {
    let catalog = catalog();
    let enc = Encoder::new(&catalog);

    // Canonical operand text survives encode -> decode unchanged.
    let cases = [
        ("addiu", "t0, t0, $0001"),
        ("addu", "v0, a0, a1"),
        ("and", "t0, t1, t2"),
        ("lui", "t0, $0010"),
        ("ori", "t0, t0, $1000"),
        ("lw", "t9, $0010(t0)"),
        ("sw", "t9, $0010(t0)"),
        ("lq", "t1, $0000(a0)"),
        ("sd", "s0, $FFF0(sp)"),
        ("sll", "t0, t0, 2"),
        ("dsra32", "t0, t1, 4"),
        ("mult", "t0, t1"),
        ("div", "t0, t1"),
        ("mfhi", "v0"),
        ("jr", "ra"),
        ("slt", "v0, a0, a1"),
        ("lwc1", "f12, $0004(a0)"),
        ("add.s", "f0, f1, f2"),
        ("mov.s", "f4, f5"),
        ("mfc0", "t0, $12"),
        ("mfc1", "t0, f3"),
    ];
    for (mnemonic, operands) in cases {
        let word = enc.encode(mnemonic, operands).unwrap();
        let decoded = decode(&catalog, word, 0x0010_0000);
        assert_eq!(decoded.mnemonic, mnemonic, "word {word:#010X}");
        assert_eq!(decoded.operands, operands, "word {word:#010X}");
    }
}

#[test]
fn decodes_branches_with_target_and_displacement() {
    let catalog = catalog();
    let enc = Encoder::new(&catalog);

    let word = enc.encode("beq", "t0, t1, $0004").unwrap();
    let decoded = decode(&catalog, word, 0x0010_0000);
    assert_eq!(decoded.mnemonic, "beq");
    assert_eq!(decoded.operands, "t0, t1, $00100014 (+4▼)");
    assert_eq!(decoded.target, Some(0x0010_0014));

    let back = enc.encode("bne", "t0, zero, $FFFE").unwrap();
    let decoded = decode(&catalog, back, 0x0010_0004);
    assert_eq!(decoded.operands, "t0, zero, $00100000 (-2▲)");
    assert_eq!(decoded.target, Some(0x0010_0000));
}

#[test]
fn decodes_jal_with_absolute_target() {
    let catalog = catalog();
    let word = 0x0C00_0000 | (0x0010_0010 >> 2);
    let decoded = decode(&catalog, word, 0x0010_0000);
    assert_eq!(decoded.mnemonic, "jal");
    assert_eq!(decoded.operands, "$00100010");
    assert_eq!(decoded.target, Some(0x0010_0010));
    assert!(decoded.comment.contains("call"));
}

#[test]
fn zero_word_is_nop() {
    let catalog = catalog();
    let decoded = decode(&catalog, 0, 0);
    assert_eq!(decoded.mnemonic, "nop");
    assert_eq!(decoded.operands, "");
    assert_eq!(decoded.target, None);
}

#[test]
fn unknown_words_decode_to_the_sentinel() {
    let catalog = catalog();
    // Opcode 0x13 is unassigned on the EE.
    let decoded = decode(&catalog, 0x4C00_0000, 0);
    assert_eq!(decoded.mnemonic, "unknown");
    assert!(decoded.comment.contains("unrecognized"));
    // SPECIAL funct 0x05 is a hole too.
    let decoded = decode(&catalog, 0x0000_0005, 0);
    assert_eq!(decoded.mnemonic, "unknown");
}

#[test]
fn decodes_mmi_packed_ops() {
    let catalog = catalog();
    // paddw t0, t1, t2: MMI funct 0x08, sub-format 0.
    let word = (0x1C << 26) | (9 << 21) | (10 << 16) | (8 << 11) | 0x08;
    let decoded = decode(&catalog, word, 0);
    assert_eq!(decoded.mnemonic, "paddw");
    assert_eq!(decoded.operands, "t0, t1, t2");

    // por t0, t1, t2: MMI3 sub-format 0x12.
    let word = (0x1C << 26) | (9 << 21) | (10 << 16) | (8 << 11) | (0x12 << 6) | 0x29;
    let decoded = decode(&catalog, word, 0);
    assert_eq!(decoded.mnemonic, "por");
    assert_eq!(decoded.operands, "t0, t1, t2");

    // psllh t0, t1, 3: plain MMI shift.
    let word = (0x1C << 26) | (9 << 16) | (8 << 11) | (3 << 6) | 0x34;
    let decoded = decode(&catalog, word, 0);
    assert_eq!(decoded.mnemonic, "psllh");
    assert_eq!(decoded.operands, "t0, t1, 3");
}

#[test]
fn decodes_vu0_macro_forms() {
    let catalog = catalog();

    // vadd vf1, vf2, vf3 with a full destination mask.
    let word = (0x12 << 26) | (0x1F << 21) | (3 << 16) | (2 << 11) | (1 << 6) | 0x28;
    let decoded = decode(&catalog, word, 0);
    assert_eq!(decoded.mnemonic, "vadd");
    assert_eq!(decoded.operands, "vf1, vf2, vf3");

    // vaddx with a partial mask keeps the lane suffixes.
    let word = (0x12 << 26) | (0x18 << 21) | (3 << 16) | (2 << 11) | (1 << 6) | 0x00;
    let decoded = decode(&catalog, word, 0);
    assert_eq!(decoded.mnemonic, "vaddx");
    assert_eq!(decoded.operands, "vf1.x, vf2, vf3.x");

    // qmfc2 moves between the units.
    let word = (0x12 << 26) | (0x01 << 21) | (8 << 16) | (5 << 11);
    let decoded = decode(&catalog, word, 0);
    assert_eq!(decoded.mnemonic, "qmfc2");
    assert_eq!(decoded.operands, "t0, vf5");
}

#[test]
fn decodes_cop0_and_cop1_moves() {
    let catalog = catalog();

    let word = (0x10 << 26) | (8 << 16) | (12 << 11);
    let decoded = decode(&catalog, word, 0);
    assert_eq!(decoded.mnemonic, "mfc0");
    assert_eq!(decoded.operands, "t0, $12");

    let word = (0x11 << 26) | (0x04 << 21) | (8 << 16) | (3 << 11);
    let decoded = decode(&catalog, word, 0);
    assert_eq!(decoded.mnemonic, "mtc1");
    assert_eq!(decoded.operands, "t0, f3");

    let word = (0x10 << 26) | (0x10 << 21) | 0x18;
    let decoded = decode(&catalog, word, 0);
    assert_eq!(decoded.mnemonic, "eret");
}
