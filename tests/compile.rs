use cds_rs::{compile, Catalog, CdsSource, MemoryLog, Parser};
use pretty_assertions::assert_eq;

fn compile_text(text: &str) -> (cds_rs::Compilation, MemoryLog) {
    let catalog = Catalog::ee();
    let mut log = MemoryLog::new();
    let compilation = compile(&catalog, &mut log, &CdsSource::new("main.cds", text));
    (compilation, log)
}

#[test]
fn address_and_hexcode_produce_one_cheat_line() {
    let (compilation, _) = compile_text("address $00100000\nhexcode $DEADBEEF");
    assert!(compilation.is_ok());
    assert_eq!(compilation.cheat_code(), "00100000 DEADBEEF\n");
}

#[test]
fn compiling_twice_is_byte_identical() {
    let source = "address $00100000\nsetreg t0, $00345678\naddiu t0, t0, $0001\nhexcode $0BADF00D\nstring \"hello\"";
    let (first, _) = compile_text(source);
    let (second, _) = compile_text(source);
    assert_eq!(first.cheat_code(), second.cheat_code());
}

#[test]
fn emission_addresses_ascend_in_source_order() {
    let (compilation, _) = compile_text(
        "address $00100000\nhexcode $00000001\naddiu t0, t0, $0001\nhexcode $00000002",
    );
    assert!(compilation.is_ok());
    let cheat_code = compilation.cheat_code();
    let lines: Vec<&str> = cheat_code.lines().map(|l| &l[..8]).collect();
    assert_eq!(lines, vec!["00100000", "00100004", "00100008"]);
}

#[test]
fn unrecognized_lines_warn_and_do_not_advance() {
    let (compilation, log) = compile_text("address $00100000\n$$$ what is this\nhexcode $00000001");
    // Pass 1 warns; pass 2 records a hard error; the address counter is
    // untouched either way.
    assert!(log
        .messages()
        .iter()
        .any(|m| m.starts_with("[WARNING]") && m.contains("Unrecognized")));
    assert_eq!(compilation.errors.len(), 1);
    assert_eq!(compilation.cheat_code(), "00100000 00000001\n");
}

#[test]
fn label_map_is_first_write_wins() {
    let catalog = Catalog::ee();
    let mut log = MemoryLog::new();
    let mut parser = Parser::new(&catalog, &mut log);
    let labels = parser.build_label_map(
        "address $00100000\ndup:\nhexcode $00000001\naddress $00200000\ndup:\nhexcode $00000002",
    );
    assert_eq!(labels["dup"], 0x0010_0000);
}

#[test]
fn label_keys_are_lowercased() {
    let catalog = Catalog::ee();
    let mut log = MemoryLog::new();
    let mut parser = Parser::new(&catalog, &mut log);
    let labels = parser.build_label_map("address $00100000\nLoop:\n");
    assert_eq!(labels["loop"], 0x0010_0000);
}

#[test]
fn pass1_and_pass2_agree_without_labels() {
    // The same source walked by both passes lands every word where pass 1
    // predicted it.
    let source = "address $00100000\nhexcode $00000001\nsetreg a0, $00222210\nstring \"abcdef\"\nmem[0x0010] t0 += 0x2\nlast:\nhexcode $00000099";
    let catalog = Catalog::ee();
    let mut log = MemoryLog::new();
    let mut parser = Parser::new(&catalog, &mut log);
    let labels = parser.build_label_map(source);
    // hexcode +4, setreg +8, string "abcdef" pads to 8, mem +4.
    assert_eq!(labels["last"], 0x0010_0000 + 4 + 8 + 8 + 4);

    let (compilation, _) = compile_text(source);
    let cheat = compilation.cheat_code();
    let final_line = cheat.lines().last().unwrap();
    assert!(final_line.starts_with(&format!("{:08X}", labels["last"])));
}

#[test]
fn directives_are_case_insensitive() {
    let (compilation, _) = compile_text("ADDRESS $00100000\nHEXCODE $00000001\nADDIU T0, T0, $0001");
    assert!(compilation.is_ok());
    assert_eq!(
        compilation.cheat_code(),
        "00100000 00000001\n00100004 25080001\n"
    );
}

#[test]
fn comments_are_tracked_but_emit_nothing() {
    let (compilation, _) = compile_text(
        "// leading note\n/* multi\nline\ncomment */\naddress $00100000\nhexcode $00000001",
    );
    assert!(compilation.is_ok());
    assert_eq!(compilation.cheat_code(), "00100000 00000001\n");
    let kinds: Vec<&str> = compilation.nodes.iter().map(|n| n.kind_name()).collect();
    assert_eq!(
        kinds,
        vec!["SingleLineComment", "MultiLineComment", "Address", "HexCode"]
    );
}

#[test]
fn debug_trace_lists_nodes_and_expanded_words() {
    let (compilation, _) = compile_text("address $00100000\nsetreg t0, $00345678");
    let trace = compilation.debug_trace();
    assert!(trace[0].starts_with("[Line #1]\tAddress"));
    assert!(trace[1].starts_with("[Line #2]\tSetReg"));
    assert_eq!(trace[2], ">>00100000 3C080034");
    assert_eq!(trace[3], ">>00100004 25085678");
}
