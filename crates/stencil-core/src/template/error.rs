//! Template error types

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Classification of compile-time failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileErrorKind {
    /// `{` without a closing `}` on the same line
    UnterminatedDirective,
    /// `{%keyword ...}` with an unknown keyword
    UnknownDirectiveKeyword,
    /// End marker without a matching opener, or an opener never closed
    MismatchedBlockNesting,
    /// Malformed `if`/`for`/`call`/`block` arguments or variable expression
    MalformedDirectiveSyntax,
    /// The same block name defined twice in one template
    DuplicateBlock,
}

impl CompileErrorKind {
    /// Stable identifier used in messages
    pub fn code(self) -> &'static str {
        match self {
            CompileErrorKind::UnterminatedDirective => "UNTERMINATED_DIRECTIVE",
            CompileErrorKind::UnknownDirectiveKeyword => "UNKNOWN_DIRECTIVE_KEYWORD",
            CompileErrorKind::MismatchedBlockNesting => "MISMATCHED_BLOCK_NESTING",
            CompileErrorKind::MalformedDirectiveSyntax => "MALFORMED_DIRECTIVE_SYNTAX",
            CompileErrorKind::DuplicateBlock => "DUPLICATE_BLOCK",
        }
    }
}

impl fmt::Display for CompileErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Template compilation error
///
/// Compilation either produces a whole [`Template`](super::Template) or one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {template}:{line}: {message}")]
pub struct CompileError {
    /// Name the template was compiled under
    pub template: String,
    /// 1-based source line
    pub line: usize,
    pub kind: CompileErrorKind,
    pub message: String,
}

impl CompileError {
    pub(crate) fn new(
        template: &str,
        line: usize,
        kind: CompileErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            template: template.to_string(),
            line,
            kind,
            message: message.into(),
        }
    }
}

/// Classification of render-time failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderErrorKind {
    /// Root name not bound in the namespace
    UndefinedVariable { name: String },
    /// A path step did not apply to the value reached so far
    UnresolvablePathStep { path: String, step: String },
    /// Modifier name not present in the modifier registry
    UnknownModifier { name: String },
    /// Callable name not present in the callable registry
    UnknownCallable { name: String },
    /// A registered modifier returned an error
    ModifierFailed { name: String, message: String },
    /// A registered callable returned an error
    CallableFailed { name: String, message: String },
    /// `for` over something that is not a list
    NotIterable { expr: String, found: &'static str },
    /// List or map used where text is expected
    NotRenderable { expr: String, found: &'static str },
}

impl fmt::Display for RenderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderErrorKind::UndefinedVariable { name } => {
                write!(f, "UNDEFINED_VARIABLE: '{}' is not defined", name)
            }
            RenderErrorKind::UnresolvablePathStep { path, step } => {
                write!(f, "UNRESOLVABLE_PATH_STEP: cannot resolve '{}' in '{}'", step, path)
            }
            RenderErrorKind::UnknownModifier { name } => {
                write!(f, "UNKNOWN_MODIFIER: modifier '{}' is not registered", name)
            }
            RenderErrorKind::UnknownCallable { name } => {
                write!(f, "UNKNOWN_CALLABLE: callable '{}' is not registered", name)
            }
            RenderErrorKind::ModifierFailed { name, message } => {
                write!(f, "MODIFIER_FAILED: '{}': {}", name, message)
            }
            RenderErrorKind::CallableFailed { name, message } => {
                write!(f, "CALLABLE_FAILED: '{}': {}", name, message)
            }
            RenderErrorKind::NotIterable { expr, found } => {
                write!(f, "NOT_ITERABLE: '{}' is a {}, expected a list", expr, found)
            }
            RenderErrorKind::NotRenderable { expr, found } => {
                write!(
                    f,
                    "NOT_RENDERABLE: '{}' is a {} and has no text form. Use nested keys or {{%for%}}",
                    expr, found
                )
            }
        }
    }
}

/// Template rendering error
///
/// A failed render produces no output at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} (template '{template}', line {line}, op {op_index})")]
pub struct RenderError {
    /// Template whose operation failed (an override body reports its own template)
    pub template: String,
    /// Index of the failing operation in that template
    pub op_index: usize,
    /// Source line of the failing operation
    pub line: usize,
    pub kind: RenderErrorKind,
}

/// Any failure while loading, compiling or rendering a template
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("TEMPLATE_READ_ERROR: failed to read '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
