//! Host-supplied registries: modifiers, callables and block overrides
//!
//! Registries are plain values handed to each render. They are never global,
//! so differently configured renders can run side by side.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use crate::template::engine::{compile, Output, Template};
use crate::template::error::CompileError;
use crate::template::value::Value;

/// Named arguments passed to a callable
pub type CallArgs = BTreeMap<String, Value>;

/// Single-argument transform applied with `{$value|name}`
pub trait Modifier: Send + Sync {
    fn apply(&self, value: Value) -> anyhow::Result<Value>;
}

impl<F> Modifier for F
where
    F: Fn(Value) -> anyhow::Result<Value> + Send + Sync,
{
    fn apply(&self, value: Value) -> anyhow::Result<Value> {
        self(value)
    }
}

/// Host function invoked with `{%call name, key=expr}`
///
/// A callable may append to the output; any other result is ignored.
pub trait Callable: Send + Sync {
    fn call(&self, args: &CallArgs, out: &mut Output) -> anyhow::Result<()>;
}

impl<F> Callable for F
where
    F: Fn(&CallArgs, &mut Output) -> anyhow::Result<()> + Send + Sync,
{
    fn call(&self, args: &CallArgs, out: &mut Output) -> anyhow::Result<()> {
        self(args, out)
    }
}

/// Modifier name → implementation
#[derive(Clone, Default)]
pub struct ModifierRegistry {
    modifiers: HashMap<String, Arc<dyn Modifier>>,
}

impl ModifierRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in modifiers
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::template::builtins::register_modifiers(&mut registry);
        registry
    }

    /// Register (or replace) a modifier function
    pub fn register<F>(&mut self, name: impl Into<String>, modifier: F) -> &mut Self
    where
        F: Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.insert(name, modifier)
    }

    /// Register (or replace) any [`Modifier`] implementation
    pub fn insert(&mut self, name: impl Into<String>, modifier: impl Modifier + 'static) -> &mut Self {
        self.modifiers.insert(name.into(), Arc::new(modifier));
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn Modifier> {
        self.modifiers.get(name).map(|m| m.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modifiers.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.modifiers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for ModifierRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModifierRegistry")
            .field("names", &self.names())
            .finish()
    }
}

/// Callable name → implementation
#[derive(Clone, Default)]
pub struct CallableRegistry {
    callables: HashMap<String, Arc<dyn Callable>>,
}

impl CallableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a callable function
    pub fn register<F>(&mut self, name: impl Into<String>, callable: F) -> &mut Self
    where
        F: Fn(&CallArgs, &mut Output) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.insert(name, callable)
    }

    /// Register (or replace) any [`Callable`] implementation
    pub fn insert(&mut self, name: impl Into<String>, callable: impl Callable + 'static) -> &mut Self {
        self.callables.insert(name.into(), Arc::new(callable));
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn Callable> {
        self.callables.get(name).map(|c| c.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.callables.contains_key(name)
    }
}

impl fmt::Debug for CallableRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.callables.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("CallableRegistry")
            .field("names", &names)
            .finish()
    }
}

/// Replacement body for a named block
///
/// The body is a range of operations inside a compiled template, so a
/// child template's own block definitions can be used directly.
#[derive(Debug, Clone)]
pub struct BlockOverride {
    template: Arc<Template>,
    body: Range<usize>,
}

impl BlockOverride {
    /// Use a whole template as the body
    pub fn whole(template: Arc<Template>) -> Self {
        let body = 0..template.op_count();
        Self { template, body }
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub(crate) fn body(&self) -> Range<usize> {
        self.body.clone()
    }
}

/// Block name → override body
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    overrides: HashMap<String, BlockOverride>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `source` and register it as the override for `name`
    ///
    /// # Errors
    ///
    /// Returns the compile error of `source`; the registry is left unchanged.
    pub fn insert_source(&mut self, name: &str, source: &str) -> Result<(), CompileError> {
        let template = compile(&format!("block:{}", name), source)?;
        self.insert(name, BlockOverride::whole(Arc::new(template)));
        Ok(())
    }

    pub fn insert(&mut self, name: impl Into<String>, body: BlockOverride) {
        self.overrides.insert(name.into(), body);
    }

    /// Register every block `template` defines as an override
    ///
    /// This is how a child template extends a layout: compile both, register
    /// the child's blocks, then render the layout.
    pub fn extend_from_template(&mut self, template: &Arc<Template>) {
        for (name, body) in template.block_ranges() {
            self.overrides.insert(
                name.clone(),
                BlockOverride {
                    template: Arc::clone(template),
                    body: body.clone(),
                },
            );
        }
    }

    pub fn get(&self, name: &str) -> Option<&BlockOverride> {
        self.overrides.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.overrides.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}
