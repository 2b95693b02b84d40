//! Shared test helpers for template engine tests

use crate::template::engine::{Template, TemplateEngine};
use crate::template::error::{CompileError, RenderError};
use crate::template::TemplateContext;
use toml::toml;

/// Create a simple test context with basic scalar values
pub(super) fn simple_context() -> TemplateContext {
    TemplateContext::from_toml(toml! {
        name = "Bob"
        title = "My Title"
        count = 42
        price = 9.99
        enabled = true
        date = 2026-01-15
        empty = ""
        zero = 0
        nothing = []
    })
}

/// Create a nested test context with lists and tables
pub(super) fn nested_context() -> TemplateContext {
    TemplateContext::from_toml(toml! {
        [paper]
        title = "Research Paper"
        language = "en"

        [[paper.authors]]
        name = "John Doe"
        email = "john@example.com"

        [[paper.authors]]
        name = "Jane Smith"
        email = "jane@example.com"
    })
}

/// Compile and render with the built-in modifiers
pub(super) fn render_ok(source: &str, context: &TemplateContext) -> String {
    let engine = TemplateEngine::with_builtins();
    let template = Template::compile("test.tmpl", source).expect("template should compile");
    engine
        .render(&template, context)
        .expect("template should render")
}

/// Compile, render, and return the render error
pub(super) fn render_err(source: &str, context: &TemplateContext) -> RenderError {
    let engine = TemplateEngine::with_builtins();
    let template = Template::compile("test.tmpl", source).expect("template should compile");
    engine
        .render(&template, context)
        .expect_err("render should fail")
}

/// Compile and return the compile error
pub(super) fn compile_err(source: &str) -> CompileError {
    Template::compile("test.tmpl", source).expect_err("compile should fail")
}
