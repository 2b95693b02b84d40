//! Line scanner tests

use crate::template::engine::scan::{source_lines, LineScanner, Section, Unterminated};

fn sections(line: &str) -> Vec<Section<'_>> {
    LineScanner::new(line)
        .collect::<Result<Vec<_>, _>>()
        .expect("line should scan")
}

#[test]
fn test_plain_text_is_single_section() {
    assert_eq!(
        sections("Hello world\n"),
        vec![Section::Text("Hello world\n")]
    );
}

#[test]
fn test_directive_kinds() {
    assert_eq!(
        sections("a{$name}b{# note }c{%if x}d{{}e{ }f"),
        vec![
            Section::Text("a"),
            Section::Variable("name"),
            Section::Text("b"),
            Section::Comment,
            Section::Text("c"),
            Section::Action("if x"),
            Section::Text("d"),
            Section::Literal("{"),
            Section::Text("e"),
            Section::Noop,
            Section::Text("f"),
        ]
    );
}

#[test]
fn test_action_trailing_percent_is_stripped() {
    assert_eq!(sections("{%if flag%}"), vec![Section::Action("if flag")]);
    assert_eq!(sections("{% endif %}"), vec![Section::Action("endif")]);
}

#[test]
fn test_unknown_prefix_is_noop() {
    assert_eq!(sections("{hello}"), vec![Section::Noop]);
}

#[test]
fn test_close_brace_outside_directive_is_text() {
    assert_eq!(sections("a } b"), vec![Section::Text("a } b")]);
}

#[test]
fn test_unterminated_reports_column() {
    let result: Vec<_> = LineScanner::new("ab{$name").collect();
    assert_eq!(
        result,
        vec![Ok(Section::Text("ab")), Err(Unterminated { column: 2 })]
    );
}

#[test]
fn test_scanner_nested_open_and_error_stop() {
    // the first `}` closes the outer `{`; contents starting with `{` are a literal brace
    let mut scanner = LineScanner::new("{ {$x}");
    assert_eq!(scanner.next(), Some(Ok(Section::Literal("{"))));
    assert_eq!(scanner.next(), None);

    let mut scanner = LineScanner::new("{$x");
    assert!(matches!(scanner.next(), Some(Err(_))));
    assert_eq!(scanner.next(), None);
}

#[test]
fn test_source_lines_keep_terminators() {
    let lines: Vec<_> = source_lines("a\nb\r\nc").collect();
    assert_eq!(lines, vec![(1, "a\n"), (2, "b\r\n"), (3, "c")]);
}
