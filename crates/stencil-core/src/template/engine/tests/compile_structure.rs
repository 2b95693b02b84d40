//! Tests for the shape of compiled operation lists

use super::*;
use crate::template::expr::{PathStep, VarExpr};

fn ops(source: &str) -> Vec<Operation> {
    Template::compile("test.tmpl", source)
        .unwrap()
        .operations()
        .cloned()
        .collect()
}

fn var(text: &str) -> VarExpr {
    VarExpr::parse(text).unwrap()
}

#[test]
fn test_if_else_jump_targets() {
    assert_eq!(
        ops("{%if a%}X{%else%}Y{%endif%}"),
        vec![
            Operation::BeginIf {
                cond: var("a"),
                slot: 0,
                else_at: Some(2),
                end_at: 4,
            },
            Operation::EmitLiteral("X".to_string()),
            Operation::Else { slot: 0, end_at: 4 },
            Operation::EmitLiteral("Y".to_string()),
            Operation::EndIf { slot: 0 },
        ]
    );
}

#[test]
fn test_for_jump_targets() {
    assert_eq!(
        ops("{%for x items%}{$x}{%endfor%}"),
        vec![
            Operation::BeginFor {
                item: "x".to_string(),
                collection: var("items"),
                slot: 0,
                end_at: 2,
            },
            Operation::EmitVar(var("x")),
            Operation::EndFor { slot: 0, body_at: 1 },
        ]
    );
}

#[test]
fn test_sibling_constructs_share_slot() {
    let template = Template::compile("test.tmpl", "{%if a}1{%endif}{%if b}2{%endif}").unwrap();
    let slots: Vec<Slot> = template
        .operations()
        .filter_map(|op| match op {
            Operation::BeginIf { slot, .. } => Some(*slot),
            _ => None,
        })
        .collect();
    assert_eq!(slots, vec![0, 0]);
    assert_eq!(template.slot_count(), 1);
}

#[test]
fn test_nested_constructs_use_distinct_slots() {
    let template =
        Template::compile("test.tmpl", "{%if a}{%for x xs}{%if x}y{%endif}{%endfor}{%endif}")
            .unwrap();
    let slots: Vec<Slot> = template
        .operations()
        .filter_map(|op| match op {
            Operation::BeginIf { slot, .. } | Operation::BeginFor { slot, .. } => Some(*slot),
            _ => None,
        })
        .collect();
    assert_eq!(slots, vec![0, 1, 2]);
    assert_eq!(template.slot_count(), 3);
}

#[test]
fn test_adjacent_literals_are_merged() {
    assert_eq!(
        ops("a{# comment }b{}c{{}d"),
        vec![Operation::EmitLiteral("abc{d".to_string())]
    );
}

#[test]
fn test_literal_spanning_lines_is_merged() {
    assert_eq!(
        ops("line one\nline two\n"),
        vec![Operation::EmitLiteral("line one\nline two\n".to_string())]
    );
}

#[test]
fn test_instruction_lines() {
    let template = Template::compile("test.tmpl", "a\n{$b}\n\n{%call f%}\n").unwrap();
    let lines: Vec<(usize, bool)> = template
        .instrs()
        .iter()
        .map(|instr| (instr.line, matches!(instr.op, Operation::EmitLiteral(_))))
        .collect();
    assert_eq!(
        lines,
        vec![(1, true), (2, false), (2, true), (4, false), (4, true)]
    );
}

#[test]
fn test_call_arguments() {
    assert_eq!(
        ops("{%call link, href=page.url, label=page.title|upper%}"),
        vec![Operation::Call {
            name: "link".to_string(),
            args: vec![
                ("href".to_string(), var("page.url")),
                ("label".to_string(), var("page.title|upper")),
            ],
        }]
    );
}

#[test]
fn test_quoted_key_with_pipe() {
    assert_eq!(ops("{$m['a|b']|upper}"), vec![Operation::EmitVar(var("m['a|b']|upper"))]);
    let expr = var("m['a|b']|upper");
    assert_eq!(expr.steps, vec![PathStep::Key("a|b".to_string())]);
    assert_eq!(expr.modifiers, vec!["upper"]);
}

#[test]
fn test_call_argument_with_quoted_comma() {
    assert_eq!(
        ops("{%call f, k=m['a,b'], j=n%}"),
        vec![Operation::Call {
            name: "f".to_string(),
            args: vec![
                ("k".to_string(), var("m['a,b']")),
                ("j".to_string(), var("n")),
            ],
        }]
    );
}

#[test]
fn test_block_ranges() {
    let template =
        Template::compile("test.tmpl", "<{%block head%}H{%endblock%}|{%block body%}B{%endblock body%}>")
            .unwrap();
    assert_eq!(template.block_names().collect::<Vec<_>>(), vec!["body", "head"]);
    assert!(template.has_block("head"));
    assert_eq!(template.block_ranges()["head"], 2..3);
    assert_eq!(template.block_ranges()["body"], 6..7);
}

#[test]
fn test_empty_source_compiles_to_nothing() {
    assert!(ops("").is_empty());
}
