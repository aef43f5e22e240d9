use cds_rs::parser::CompileError;
use cds_rs::syntax::SyntaxNode;
use cds_rs::{compile, Catalog, CdsSource, MemoryLog};
use pretty_assertions::assert_eq;

fn compile_text(text: &str) -> cds_rs::Compilation {
    let catalog = Catalog::ee();
    let mut log = MemoryLog::new();
    compile(&catalog, &mut log, &CdsSource::new("main.cds", text))
}

#[test]
fn setreg_expands_to_lui_plus_addiu() {
    let compilation = compile_text("address $00100000\nsetreg t0, $00345678");
    assert!(compilation.is_ok(), "{:?}", compilation.errors);
    let operations = compilation
        .nodes
        .iter()
        .find_map(|n| match n {
            SyntaxNode::SetReg { operations, .. } => Some(operations),
            _ => None,
        })
        .unwrap();
    assert_eq!(operations.len(), 2);
    assert_eq!(operations[0].mnemonic, "lui");
    assert_eq!(operations[0].word, 0x3C08_0034);
    assert_eq!(operations[0].address, 0x0010_0000);
    assert_eq!(operations[1].mnemonic, "addiu");
    assert_eq!(operations[1].word, 0x2508_5678);
    assert_eq!(operations[1].address, 0x0010_0004);
}

#[test]
fn setreg_rejects_unknown_registers() {
    let compilation = compile_text("setreg q9, $00345678");
    assert!(matches!(
        compilation.errors[0],
        CompileError::InvalidRegister { .. }
    ));
}

#[test]
fn string_emits_nul_terminated_word_aligned_data() {
    let compilation = compile_text("address $00100000\nstring \"ABC\"");
    assert!(compilation.is_ok(), "{:?}", compilation.errors);
    // "ABC" + NUL fills exactly one word, packed little-endian.
    assert_eq!(compilation.cheat_code(), "00100000 00434241\n");
}

#[test]
fn string_word_count_matches_padded_length() {
    for (text, expected_words) in [("A", 1), ("ABC", 1), ("ABCD", 2), ("ABCDEFG", 2), ("ABCDEFGH", 3)]
    {
        let source = format!("address $00100000\nstring \"{text}\"");
        let compilation = compile_text(&source);
        let words = compilation
            .nodes
            .iter()
            .find_map(|n| match n {
                SyntaxNode::String { words, .. } => Some(words.len()),
                _ => None,
            })
            .unwrap();
        assert_eq!(words, expected_words, "for {text:?}");
    }
}

#[test]
fn string_round_trips_back_to_text() {
    let original = "level select";
    let source = format!("address $00100000\nstring \"{original}\"");
    let compilation = compile_text(&source);
    let mut bytes = Vec::new();
    for (_, word) in compilation
        .nodes
        .iter()
        .flat_map(|n| n.emitted())
    {
        bytes.extend_from_slice(&word.to_le_bytes());
    }
    let end = bytes.iter().position(|&b| b == 0).unwrap();
    assert_eq!(&bytes[..end], original.as_bytes());
}

#[test]
fn string_advances_the_address_by_its_padded_size() {
    let compilation = compile_text("address $00100000\nstring \"ABCDE\"\nhexcode $00000001");
    // 5 chars + NUL pads to 8 bytes.
    let last = compilation.cheat_code();
    assert!(last.lines().last().unwrap().starts_with("00100008"));
}

#[test]
fn mem_assignment_emits_exactly_two_instructions() {
    let compilation = compile_text("address $00100000\nmem[0x0010] t0 = 0x5");
    assert!(compilation.is_ok(), "{:?}", compilation.errors);
    let operations = compilation
        .nodes
        .iter()
        .find_map(|n| match n {
            SyntaxNode::Memory { operations, .. } => Some(operations),
            _ => None,
        })
        .unwrap();
    assert_eq!(operations.len(), 2);
    // addiu t9, zero, $0005 then sw t9, $0010(t0)
    assert_eq!(operations[0].word, 0x2419_0005);
    assert_eq!(operations[1].word, 0xAD19_0010);
}

#[test]
fn compound_mem_operators_emit_exactly_three_instructions() {
    for (operator, middle) in [
        ("+=", 0x2739_0004u32), // addiu t9, t9, $0004
        ("-=", 0x2739_FFFC),    // addiu t9, t9, $FFFC
        ("*=", 0x0019_C880),    // sll t9, t9, 2
        ("/=", 0x0019_C882),    // srl t9, t9, 2
    ] {
        let source = format!("address $00100000\nmem[0x0010] t0 {operator} 4");
        let compilation = compile_text(&source);
        assert!(compilation.is_ok(), "{operator}: {:?}", compilation.errors);
        let operations = compilation
            .nodes
            .iter()
            .find_map(|n| match n {
                SyntaxNode::Memory { operations, .. } => Some(operations),
                _ => None,
            })
            .unwrap();
        assert_eq!(operations.len(), 3, "for {operator}");
        assert_eq!(operations[0].word, 0x8D19_0010, "load for {operator}");
        assert_eq!(operations[1].word, middle, "compute for {operator}");
        assert_eq!(operations[2].word, 0xAD19_0010, "store for {operator}");
    }
}

#[test]
fn mem_scaling_requires_a_power_of_two() {
    let compilation = compile_text("mem[0x0010] t0 *= 3");
    assert!(matches!(
        compilation.errors[0],
        CompileError::NonPowerOfTwo { .. }
    ));
}

#[test]
fn mem_diagnostics_name_the_offending_token() {
    let compilation = compile_text("mem[0x0010] q9 = 1");
    assert!(matches!(
        &compilation.errors[0],
        CompileError::InvalidRegister { register, .. } if register == "q9"
    ));

    let compilation = compile_text("mem[64] t0 = 1");
    assert!(matches!(
        &compilation.errors[0],
        CompileError::InvalidOffset { offset, .. } if offset == "64"
    ));

    let compilation = compile_text("mem[0x0010] t0 = banana");
    assert!(matches!(
        &compilation.errors[0],
        CompileError::InvalidOperand { operand, .. } if operand == "banana"
    ));
}

#[test]
fn mem_children_share_the_macro_address() {
    let compilation = compile_text("address $00100000\nmem[0x0010] t0 += 0x2\nhexcode $00000001");
    let operations = compilation
        .nodes
        .iter()
        .find_map(|n| match n {
            SyntaxNode::Memory { operations, .. } => Some(operations),
            _ => None,
        })
        .unwrap();
    assert!(operations.iter().all(|op| op.address == 0x0010_0000));
    // Pass accounting treats the macro as one word.
    assert!(compilation
        .cheat_code()
        .lines()
        .last()
        .unwrap()
        .starts_with("00100004"));
}
