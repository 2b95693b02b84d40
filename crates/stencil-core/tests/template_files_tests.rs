//! Template file loading and layout tests
//!
//! These tests exercise the public API the way a host application uses it:
//! templates on disk, a layout with child block overrides, and data files.

use std::fs;
use std::sync::Arc;

use stencil_core::config::Settings;
use stencil_core::data::load_data_file;
use stencil_core::template::{BlockRegistry, Template, TemplateEngine, TemplateError};
use tempfile::TempDir;

#[test]
fn test_from_file_names_template_after_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("hello.tmpl");
    fs::write(&path, "Hello {$name}!\n").unwrap();

    let template = Template::from_file(&path).unwrap();
    assert_eq!(template.name(), path.display().to_string());
    assert_eq!(template.op_count(), 3);
}

#[test]
fn test_from_file_missing_is_io_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("absent.tmpl");

    match Template::from_file(&path) {
        Err(TemplateError::Io { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected io error, got {:?}", other),
    }
}

#[test]
fn test_from_file_compile_error_names_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.tmpl");
    fs::write(&path, "ok\n{%if x%}\nnever closed\n").unwrap();

    match Template::from_file(&path) {
        Err(TemplateError::Compile(err)) => {
            assert_eq!(err.template, path.display().to_string());
            assert_eq!(err.line, 2);
        }
        other => panic!("expected compile error, got {:?}", other),
    }
}

#[test]
fn test_layout_with_child_overrides_from_files() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("layout.tmpl"),
        "<html>\n<head><title>{%block title%}Untitled{%endblock%}</title></head>\n\
         <body>\n{%block content%}\nnothing here\n{%endblock%}\n</body>\n</html>\n",
    )
    .unwrap();
    fs::write(
        temp.path().join("page.tmpl"),
        "{%block title%}{$page.title}{%endblock%}\n\
         {%block content%}\n{%for p page.paragraphs%}<p>{$p}</p>\n{%endfor%}\n{%endblock%}\n",
    )
    .unwrap();
    fs::write(
        temp.path().join("page.json"),
        r#"{"page": {"title": "About", "paragraphs": ["One", "Two"]}}"#,
    )
    .unwrap();

    let layout = Template::from_file(&temp.path().join("layout.tmpl")).unwrap();
    let page = Arc::new(Template::from_file(&temp.path().join("page.tmpl")).unwrap());
    let context = load_data_file(&temp.path().join("page.json")).unwrap();

    let mut blocks = BlockRegistry::new();
    blocks.extend_from_template(&page);

    let engine = TemplateEngine::with_builtins();
    let output = engine.render_with_blocks(&layout, &context, &blocks).unwrap();
    assert_eq!(
        output,
        "<html>\n<head><title>About</title></head>\n<body>\n\n<p>One</p>\n<p>Two</p>\n\n\n</body>\n</html>\n"
    );
}

#[test]
fn test_settings_resolve_and_render() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("templates")).unwrap();
    fs::write(
        temp.path().join("stencil.toml"),
        "[templates]\nroot = \"templates\"\n\n[vars]\nsite = \"Example\"\n",
    )
    .unwrap();
    fs::write(
        temp.path().join("templates").join("footer.tmpl"),
        "(c) {$site|upper}",
    )
    .unwrap();

    let settings = Settings::discover(temp.path()).unwrap();
    let template = Template::from_file(&settings.template_path("footer")).unwrap();
    let context = settings.base_context().unwrap();

    let output = template
        .render(&context, &settings.modifiers(), &Default::default(), None)
        .unwrap();
    assert_eq!(output, "(c) EXAMPLE");
}
