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
fn backward_branch_resolves_to_negative_offset() {
    let compilation =
        compile_text("address $00100000\nlp: addiu t0, t0, 1\nbne t0, zero, :lp");
    assert!(compilation.is_ok(), "{:?}", compilation.errors);

    let branch = compilation
        .nodes
        .iter()
        .find_map(|n| match n {
            SyntaxNode::OperationBranch {
                operation,
                label,
                label_address,
                offset,
            } => Some((operation, label.clone(), *label_address, *offset)),
            _ => None,
        })
        .expect("branch node");
    let (operation, label, label_address, offset) = branch;

    assert_eq!(label, "lp");
    assert_eq!(label_address, 0x0010_0000);
    assert_eq!(offset, -2);
    // Branch offset law: label address == branch address + 4 + offset * 4.
    assert_eq!(
        label_address,
        operation
            .address
            .wrapping_add(4)
            .wrapping_add((offset as u32) << 2)
    );
    // bne t0, zero, $FFFE
    assert_eq!(operation.word, 0x1500_FFFE);
    assert_eq!(
        compilation.cheat_code(),
        "00100000 25080001\n00100004 1500FFFE\n"
    );
}

#[test]
fn forward_branch_resolves_to_positive_offset() {
    let compilation = compile_text(
        "address $00100000\nbeq zero, zero, :done\nnop\nnop\ndone:\nhexcode $00000000",
    );
    assert!(compilation.is_ok(), "{:?}", compilation.errors);
    let offset = compilation
        .nodes
        .iter()
        .find_map(|n| match n {
            SyntaxNode::OperationBranch { offset, .. } => Some(*offset),
            _ => None,
        })
        .unwrap();
    // done: sits 3 words past the branch, 2 past the delay-slot PC.
    assert_eq!(offset, 2);
}

#[test]
fn jump_resolves_to_absolute_label_address() {
    let compilation = compile_text("address $00100000\nstart:\nnop\nj :start");
    assert!(compilation.is_ok(), "{:?}", compilation.errors);
    let (word, target) = compilation
        .nodes
        .iter()
        .find_map(|n| match n {
            SyntaxNode::OperationJump {
                operation,
                target_address,
                ..
            } => Some((operation.word, *target_address)),
            _ => None,
        })
        .unwrap();
    assert_eq!(target, 0x0010_0000);
    assert_eq!(word, (0x02 << 26) | (0x0010_0000 >> 2));
}

#[test]
fn jal_to_label_encodes_a_call() {
    let compilation = compile_text("address $00100000\nfn_entry:\nnop\njal :fn_entry");
    assert!(compilation.is_ok(), "{:?}", compilation.errors);
    let word = compilation
        .nodes
        .iter()
        .find_map(|n| match n {
            SyntaxNode::OperationJump { operation, .. } => Some(operation.word),
            _ => None,
        })
        .unwrap();
    assert_eq!(word, (0x03 << 26) | (0x0010_0000 >> 2));
}

#[test]
fn unknown_label_is_an_error_not_a_zero_offset() {
    let compilation = compile_text("address $00100000\nbne t0, zero, :nowhere");
    assert_eq!(compilation.errors.len(), 1);
    assert!(matches!(
        compilation.errors[0],
        CompileError::UnknownLabel { .. }
    ));
    // The bad branch emits nothing.
    assert_eq!(compilation.cheat_code(), "");
}

#[test]
fn label_operand_on_plain_operation_is_rejected() {
    let compilation = compile_text("address $00100000\nlp:\naddiu t0, t0, :lp");
    assert_eq!(compilation.errors.len(), 1);
    assert!(matches!(
        compilation.errors[0],
        CompileError::LabelOnPlainOperation { .. }
    ));
}
