//! Template module - brace-directive template engine
//!
//! Templates are compiled once into a flat operation list and rendered
//! against a [`TemplateContext`] with explicitly supplied registries.
//!
//! ## Syntax
//!
//! Directives are `{...}` sections that must open and close on one line.
//! The first character inside the braces selects the directive:
//!
//! - `{$name}`, `{$paper.authors[0].name|upper}`: variable output with modifiers
//! - `{%if flag}` / `{%else}` / `{%endif}`: conditionals
//! - `{%for item items}` ... `{%endfor}`: loops, binding `item` and `item_idx`
//! - `{%block body}` ... `{%endblock}`: named regions that can be overridden
//! - `{%call name, key=expr}`: host callables
//! - `{# comment}`: dropped
//! - `{{}`: a literal `{`
//!
//! Action directives may also be written with a closing `%`, as in `{%if flag%}`.

pub mod builtins;
pub mod context;
pub mod engine;
pub mod error;
pub mod expr;
pub mod registry;
pub mod value;

pub use context::TemplateContext;
pub use engine::{compile, render, Operation, Output, Template, TemplateEngine};
pub use error::{CompileError, CompileErrorKind, RenderError, RenderErrorKind, TemplateError};
pub use expr::{PathStep, VarExpr};
pub use registry::{
    BlockOverride, BlockRegistry, CallArgs, Callable, CallableRegistry, Modifier, ModifierRegistry,
};
pub use value::Value;
