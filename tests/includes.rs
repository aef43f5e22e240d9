use cds_rs::parser::CompileError;
use cds_rs::{compile, Catalog, CdsSource, MemoryLog};
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cds_include_{tag}_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn run(path: &PathBuf) -> cds_rs::Compilation {
    let catalog = Catalog::ee();
    let mut log = MemoryLog::new();
    let source = CdsSource::from_file(path).unwrap();
    compile(&catalog, &mut log, &source)
}

#[test]
fn included_nodes_splice_after_the_including_file() {
    let dir = temp_dir("splice");
    let inc = dir.join("inc.cds");
    let main = dir.join("main.cds");
    std::fs::write(&inc, "address $00200000\nhexcode $00000002").unwrap();
    std::fs::write(
        &main,
        "include \"inc.cds\"\naddress $00100000\nhexcode $00000001",
    )
    .unwrap();

    let compilation = run(&main);
    assert!(compilation.is_ok(), "{:?}", compilation.errors);
    // The include splices in after the main file's own nodes even though
    // the directive appears first.
    assert_eq!(
        compilation.cheat_code(),
        "00100000 00000001\n00200000 00000002\n"
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_include_is_a_compile_error() {
    let dir = temp_dir("missing");
    let main = dir.join("main.cds");
    std::fs::write(&main, "include \"nope.cds\"\nhexcode $00000001").unwrap();

    let compilation = run(&main);
    assert_eq!(compilation.errors.len(), 1);
    assert!(matches!(
        compilation.errors[0],
        CompileError::IncludeNotFound { .. }
    ));
    // The rest of the file still compiles.
    assert_eq!(compilation.cheat_code(), "00000000 00000001\n");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn cyclic_includes_fail_instead_of_recursing() {
    let dir = temp_dir("cycle");
    let a = dir.join("a.cds");
    let b = dir.join("b.cds");
    std::fs::write(&a, "include \"b.cds\"\nhexcode $0000000A").unwrap();
    std::fs::write(&b, "include \"a.cds\"\nhexcode $0000000B").unwrap();

    let compilation = run(&a);
    assert!(compilation
        .errors
        .iter()
        .any(|e| matches!(e, CompileError::IncludeCycle { .. })));
    // Both files' own words still emit once each.
    assert_eq!(
        compilation.cheat_code(),
        "00000000 0000000A\n00000000 0000000B\n"
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn nested_includes_compile_with_their_own_label_maps() {
    let dir = temp_dir("nested");
    let inner = dir.join("inner.cds");
    let outer = dir.join("outer.cds");
    std::fs::write(
        &inner,
        "address $00300000\nlp: addiu t0, t0, 1\nbne t0, zero, :lp",
    )
    .unwrap();
    std::fs::write(
        &outer,
        "address $00100000\nlp:\nhexcode $00000001\ninclude \"inner.cds\"",
    )
    .unwrap();

    let compilation = run(&outer);
    assert!(compilation.is_ok(), "{:?}", compilation.errors);
    // The inner file's branch binds to its own `lp`, not the outer one.
    assert_eq!(
        compilation.cheat_code(),
        "00100000 00000001\n00300000 25080001\n00300004 1500FFFE\n"
    );

    let _ = std::fs::remove_dir_all(&dir);
}
