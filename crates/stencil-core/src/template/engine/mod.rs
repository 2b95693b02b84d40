//! Template engine implementation
//!
//! Compilation and rendering are separate steps: a [`Template`] is compiled
//! once and can then be rendered any number of times, from any thread.

mod compiler;
mod ops;
mod runtime;
mod scan;

use std::collections::BTreeMap;
use std::ops::Range;
use std::path::Path;

use crate::template::context::TemplateContext;
use crate::template::error::{CompileError, RenderError, TemplateError};
use crate::template::registry::{BlockRegistry, CallableRegistry, ModifierRegistry};

use compiler::{compile_source, Program};
use runtime::{execute, RenderEnv};

pub use ops::{Instr, Operation, Slot};
pub use runtime::Output;

/// Name given to templates compiled from inline strings
const INLINE_TEMPLATE_NAME: &str = "<inline>";

/// A compiled template
///
/// Immutable after compilation; safe to share between threads and render
/// concurrently.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    program: Program,
}

impl Template {
    /// Compile `source` under `name` (used in error messages)
    ///
    /// # Errors
    ///
    /// Returns the first compile error; no partial template is produced.
    pub fn compile(name: &str, source: &str) -> Result<Self, CompileError> {
        let program = compile_source(name, source)?;
        Ok(Self {
            name: name.to_string(),
            program,
        })
    }

    /// Read and compile a template file
    ///
    /// The template is named after the path.
    pub fn from_file(path: &Path) -> Result<Self, TemplateError> {
        let source = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::compile(&path.display().to_string(), &source)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of compiled operations
    pub fn op_count(&self) -> usize {
        self.program.instrs.len()
    }

    /// Compiled operations with their source lines
    pub fn instrs(&self) -> &[Instr] {
        &self.program.instrs
    }

    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.program.instrs.iter().map(|instr| &instr.op)
    }

    /// Names of the blocks this template defines, sorted
    pub fn block_names(&self) -> impl Iterator<Item = &str> {
        self.program.blocks.keys().map(String::as_str)
    }

    pub fn has_block(&self, name: &str) -> bool {
        self.program.blocks.contains_key(name)
    }

    pub(crate) fn block_ranges(&self) -> &BTreeMap<String, Range<usize>> {
        &self.program.blocks
    }

    pub(crate) fn slot_count(&self) -> usize {
        self.program.slot_count
    }

    /// Render with explicit registries
    ///
    /// # Errors
    ///
    /// Returns the first render error; no partial output is returned.
    pub fn render(
        &self,
        context: &TemplateContext,
        modifiers: &ModifierRegistry,
        callables: &CallableRegistry,
        blocks: Option<&BlockRegistry>,
    ) -> Result<String, RenderError> {
        execute(
            self,
            RenderEnv {
                globals: context,
                modifiers,
                callables,
                blocks,
            },
        )
    }
}

/// Template engine owning the modifier and callable registries
#[derive(Debug, Clone, Default)]
pub struct TemplateEngine {
    modifiers: ModifierRegistry,
    callables: CallableRegistry,
}

impl TemplateEngine {
    /// Create an engine with empty registries
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with the built-in modifiers registered
    pub fn with_builtins() -> Self {
        Self {
            modifiers: ModifierRegistry::with_builtins(),
            callables: CallableRegistry::new(),
        }
    }

    pub fn modifiers(&self) -> &ModifierRegistry {
        &self.modifiers
    }

    pub fn modifiers_mut(&mut self) -> &mut ModifierRegistry {
        &mut self.modifiers
    }

    pub fn callables(&self) -> &CallableRegistry {
        &self.callables
    }

    pub fn callables_mut(&mut self) -> &mut CallableRegistry {
        &mut self.callables
    }

    /// Compile a template
    pub fn compile(&self, name: &str, source: &str) -> Result<Template, CompileError> {
        Template::compile(name, source)
    }

    /// Render a compiled template with the given context
    pub fn render(
        &self,
        template: &Template,
        context: &TemplateContext,
    ) -> Result<String, RenderError> {
        template.render(context, &self.modifiers, &self.callables, None)
    }

    /// Render a compiled template with block overrides
    pub fn render_with_blocks(
        &self,
        template: &Template,
        context: &TemplateContext,
        blocks: &BlockRegistry,
    ) -> Result<String, RenderError> {
        template.render(context, &self.modifiers, &self.callables, Some(blocks))
    }

    /// Compile and render template source in one step
    pub fn render_str(
        &self,
        source: &str,
        context: &TemplateContext,
    ) -> Result<String, TemplateError> {
        let template = Template::compile(INLINE_TEMPLATE_NAME, source)?;
        Ok(self.render(&template, context)?)
    }
}

/// Convenience function to compile a template
pub fn compile(name: &str, source: &str) -> Result<Template, CompileError> {
    Template::compile(name, source)
}

/// Convenience function to render a compiled template
pub fn render(
    template: &Template,
    context: &TemplateContext,
    modifiers: &ModifierRegistry,
    callables: &CallableRegistry,
    blocks: Option<&BlockRegistry>,
) -> Result<String, RenderError> {
    template.render(context, modifiers, callables, blocks)
}

#[cfg(test)]
mod tests;
