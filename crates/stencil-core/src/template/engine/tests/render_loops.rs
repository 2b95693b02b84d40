//! Loop rendering tests for template engine

use super::helpers::{nested_context, render_ok, simple_context};
use super::*;
use crate::template::Value;
use toml::toml;

fn items(values: Vec<i64>) -> TemplateContext {
    let mut context = TemplateContext::new();
    context.insert("items", values);
    context
}

#[test]
fn test_render_for_loop() {
    assert_eq!(render_ok("{%for x items%}{$x}{%endfor%}", &items(vec![1, 2, 3])), "123");
}

#[test]
fn test_render_empty_loop() {
    assert_eq!(render_ok("[{%for x items%}{$x}{%endfor%}]", &items(vec![])), "[]");
}

#[test]
fn test_render_loop_index() {
    assert_eq!(
        render_ok("{%for x items%}{$x_idx}:{$x} {%endfor%}", &items(vec![10, 20, 30])),
        "0:10 1:20 2:30 "
    );
}

#[test]
fn test_render_loop_over_tables() {
    let context = nested_context();
    let template = "{%for author paper.authors%}\n- {$author.name} <{$author.email}>\n{%endfor%}\n";
    assert_eq!(
        render_ok(template, &context),
        "\n- John Doe <john@example.com>\n\n- Jane Smith <jane@example.com>\n\n"
    );
}

#[test]
fn test_render_nested_loops() {
    let context = TemplateContext::from_toml(toml! {
        [[papers]]
        title = "Paper 1"
        [[papers.authors]]
        name = "Alice"
        [[papers.authors]]
        name = "Bob"

        [[papers]]
        title = "Paper 2"
        [[papers.authors]]
        name = "Charlie"
    });
    let template = "{%for paper papers%}{$paper.title}:{%for a paper.authors%} {$a.name}({$paper_idx}.{$a_idx}){%endfor%};{%endfor%}";
    assert_eq!(
        render_ok(template, &context),
        "Paper 1: Alice(0.0) Bob(0.1);Paper 2: Charlie(1.0);"
    );
}

#[test]
fn test_loop_variables_removed_after_loop() {
    let template = "{%for x items%}{%endfor%}{%if x%}leak{%else%}clean{%endif%}{%if x_idx%}leak{%endif%}";
    assert_eq!(render_ok(template, &items(vec![1, 2])), "clean");
}

#[test]
fn test_loop_restores_shadowed_binding() {
    let mut context = items(vec![1, 2]);
    context.insert("x", "outer");
    assert_eq!(
        render_ok("{%for x items%}{$x}{%endfor%}-{$x}", &context),
        "12-outer"
    );
}

#[test]
fn test_inner_loop_with_same_name_restores_outer_item() {
    let mut context = TemplateContext::new();
    context.insert("rows", vec![vec![1, 2], vec![3]]);
    context.insert("cols", vec!["a", "b"]);
    let template = "{%for x rows%}{%for x cols%}{$x}{%endfor%}{$x_idx};{%endfor%}";
    assert_eq!(render_ok(template, &context), "ab0;ab1;");
}

#[test]
fn test_loop_with_conditionals_inside() {
    let mut context = TemplateContext::new();
    context.insert(
        "flags",
        vec![Value::Bool(true), Value::Bool(false), Value::Bool(true)],
    );
    let template = "{%for f flags%}{%if f%}Y{%else%}N{%endif%}{%endfor%}";
    assert_eq!(render_ok(template, &context), "YNY");
}

#[test]
fn test_sibling_loops_are_independent() {
    let mut context = items(vec![1, 2]);
    context.insert("other", vec!["a"]);
    assert_eq!(
        render_ok("{%for x items%}{$x}{%endfor%}{%for y other%}{$y}{%endfor%}", &context),
        "12a"
    );
}

#[test]
fn test_loop_items_with_modifiers() {
    let mut context = simple_context();
    context.insert("list", vec![vec!["a"], vec!["b", "c"]]);
    assert_eq!(
        render_ok("{%for l list%}{$l|length}{$name|lower}{%endfor%}", &context),
        "1bob2bob"
    );
}
