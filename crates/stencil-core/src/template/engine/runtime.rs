//! Executor for compiled templates
//!
//! Walks an operation list with a single instruction pointer. Jump targets
//! were resolved by the compiler; the executor only keeps per-construct state
//! in scratch slots, one arena per executed operation list.

use std::collections::HashMap;
use std::ops::Range;

use crate::template::context::TemplateContext;
use crate::template::error::{RenderError, RenderErrorKind};
use crate::template::expr::{PathStep, VarExpr};
use crate::template::registry::{BlockRegistry, CallArgs, CallableRegistry, ModifierRegistry};
use crate::template::value::Value;

use super::ops::{Operation, Slot};
use super::Template;

/// Append-only output buffer for one render
#[derive(Debug, Default)]
pub struct Output {
    buf: String,
}

impl Output {
    pub fn push_str(&mut self, text: &str) {
        self.buf.push_str(text);
    }

    pub fn push(&mut self, c: char) {
        self.buf.push(c);
    }

    /// Text written so far
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn into_string(self) -> String {
        self.buf
    }
}

/// Loop progress kept in a scratch slot
#[derive(Debug)]
struct LoopState {
    item: String,
    index_name: String,
    items: Vec<Value>,
    index: usize,
    /// Bindings shadowed by the loop variables, restored at loop exit
    saved_item: Option<Value>,
    saved_index: Option<Value>,
}

#[derive(Debug)]
enum SlotState {
    /// Whether the if-branch was taken
    If(bool),
    For(LoopState),
}

/// Registries and globals a render reads from
pub(crate) struct RenderEnv<'r> {
    pub globals: &'r TemplateContext,
    pub modifiers: &'r ModifierRegistry,
    pub callables: &'r CallableRegistry,
    pub blocks: Option<&'r BlockRegistry>,
}

/// Render `template` to a string
pub(crate) fn execute(template: &Template, env: RenderEnv<'_>) -> Result<String, RenderError> {
    let mut executor = Executor {
        env,
        locals: HashMap::new(),
        active_overrides: Vec::new(),
        output: Output::default(),
    };
    executor.run(template, 0..template.op_count())?;

    let output = executor.output.into_string();
    tracing::debug!(
        template = template.name(),
        bytes = output.len(),
        "rendered template"
    );
    Ok(output)
}

fn fail(template: &Template, ip: usize, kind: RenderErrorKind) -> RenderError {
    RenderError {
        template: template.name().to_string(),
        op_index: ip,
        line: template.instrs().get(ip).map_or(0, |instr| instr.line),
        kind,
    }
}

struct Executor<'r> {
    env: RenderEnv<'r>,
    /// Loop bindings; shadow globals
    locals: HashMap<String, Value>,
    /// Blocks whose override body is currently executing
    active_overrides: Vec<String>,
    output: Output,
}

impl<'r> Executor<'r> {
    /// Execute `range` of `template`'s operations
    fn run(&mut self, template: &Template, range: Range<usize>) -> Result<(), RenderError> {
        let mut slots: Vec<Option<SlotState>> = (0..template.slot_count()).map(|_| None).collect();
        let mut ip = range.start;
        while ip < range.end {
            ip = self.step(template, ip, &mut slots)?;
        }
        Ok(())
    }

    /// Execute one operation and return the next instruction pointer
    fn step(
        &mut self,
        template: &Template,
        ip: usize,
        slots: &mut [Option<SlotState>],
    ) -> Result<usize, RenderError> {
        let here = |kind| fail(template, ip, kind);

        match &template.instrs()[ip].op {
            Operation::EmitLiteral(text) => {
                self.output.push_str(text);
                Ok(ip + 1)
            }
            Operation::EmitVar(expr) => {
                let value = self.resolve(expr).map_err(here)?;
                let text = stringify(&value, expr).map_err(here)?;
                self.output.push_str(&text);
                Ok(ip + 1)
            }
            Operation::BeginIf {
                cond,
                slot,
                else_at,
                end_at,
            } => {
                let taken = self.resolve_condition(cond).map_err(here)?.is_truthy();
                slots[*slot] = Some(SlotState::If(taken));
                Ok(match (taken, else_at) {
                    (true, _) => ip + 1,
                    (false, Some(else_at)) => else_at + 1,
                    (false, None) => *end_at,
                })
            }
            Operation::Else { slot, end_at } => match slots[*slot] {
                Some(SlotState::If(true)) => Ok(*end_at),
                _ => Ok(ip + 1),
            },
            Operation::EndIf { slot } => {
                slots[*slot] = None;
                Ok(ip + 1)
            }
            Operation::BeginFor {
                item,
                collection,
                slot,
                end_at,
            } => {
                let items = match self.resolve(collection).map_err(here)? {
                    Value::List(items) => items,
                    other => {
                        return Err(here(RenderErrorKind::NotIterable {
                            expr: collection.to_string(),
                            found: other.kind(),
                        }))
                    }
                };
                if items.is_empty() {
                    slots[*slot] = None;
                    return Ok(end_at + 1);
                }

                let index_name = format!("{}_idx", item);
                let saved_item = self.locals.insert(item.clone(), items[0].clone());
                let saved_index = self.locals.insert(index_name.clone(), Value::Int(0));
                slots[*slot] = Some(SlotState::For(LoopState {
                    item: item.clone(),
                    index_name,
                    items,
                    index: 0,
                    saved_item,
                    saved_index,
                }));
                Ok(ip + 1)
            }
            Operation::EndFor { slot, body_at } => Ok(self.advance_loop(slots, *slot, *body_at, ip)),
            Operation::BeginBlock { name, end_at } => {
                let Some(body) = self.override_for(name) else {
                    return Ok(ip + 1);
                };
                tracing::trace!(block = %name, source = body.template().name(), "using block override");
                self.active_overrides.push(name.clone());
                self.run(body.template(), body.body())?;
                self.active_overrides.pop();
                Ok(end_at + 1)
            }
            Operation::EndBlock => Ok(ip + 1),
            Operation::Call { name, args } => {
                let callables = self.env.callables;
                let callable = callables.get(name).ok_or_else(|| {
                    here(RenderErrorKind::UnknownCallable { name: name.clone() })
                })?;

                let mut resolved = CallArgs::new();
                for (key, expr) in args {
                    resolved.insert(key.clone(), self.resolve(expr).map_err(here)?);
                }

                callable.call(&resolved, &mut self.output).map_err(|e| {
                    here(RenderErrorKind::CallableFailed {
                        name: name.clone(),
                        message: format!("{:#}", e),
                    })
                })?;
                Ok(ip + 1)
            }
        }
    }

    /// Move a loop to its next item, or tear it down after the last one
    fn advance_loop(
        &mut self,
        slots: &mut [Option<SlotState>],
        slot: Slot,
        body_at: usize,
        ip: usize,
    ) -> usize {
        let Some(SlotState::For(state)) = slots[slot].as_mut() else {
            return ip + 1;
        };

        state.index += 1;
        if let Some(next) = state.items.get(state.index) {
            self.locals.insert(state.item.clone(), next.clone());
            self.locals
                .insert(state.index_name.clone(), Value::from(state.index));
            return body_at;
        }

        if let Some(SlotState::For(state)) = slots[slot].take() {
            self.restore(state.item, state.saved_item);
            self.restore(state.index_name, state.saved_index);
        }
        ip + 1
    }

    fn restore(&mut self, name: String, saved: Option<Value>) {
        match saved {
            Some(value) => {
                self.locals.insert(name, value);
            }
            None => {
                self.locals.remove(&name);
            }
        }
    }

    /// Override body for `name`, unless that override is already executing
    fn override_for(&self, name: &str) -> Option<&'r crate::template::registry::BlockOverride> {
        if self.active_overrides.iter().any(|active| active == name) {
            return None;
        }
        self.env.blocks.and_then(|blocks| blocks.get(name))
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        self.locals
            .get(name)
            .or_else(|| self.env.globals.get(name))
            .filter(|value| !matches!(value, Value::Undefined))
    }

    /// Resolve an expression: root, path steps, then modifiers
    fn resolve(&self, expr: &VarExpr) -> Result<Value, RenderErrorKind> {
        let root = self
            .lookup(&expr.root)
            .ok_or_else(|| RenderErrorKind::UndefinedVariable {
                name: expr.root.clone(),
            })?;
        let value = walk_path(root, expr)?.clone();
        self.apply_modifiers(value, expr)
    }

    /// Like [`Self::resolve`], but an unbound root is `Undefined` (falsy)
    ///
    /// The modifier names must still be registered.
    fn resolve_condition(&self, expr: &VarExpr) -> Result<Value, RenderErrorKind> {
        if self.lookup(&expr.root).is_some() {
            return self.resolve(expr);
        }
        if let Some(name) = expr
            .modifiers
            .iter()
            .find(|name| !self.env.modifiers.contains(name))
        {
            return Err(RenderErrorKind::UnknownModifier { name: name.clone() });
        }
        Ok(Value::Undefined)
    }

    fn apply_modifiers(&self, mut value: Value, expr: &VarExpr) -> Result<Value, RenderErrorKind> {
        for name in &expr.modifiers {
            let modifier =
                self.env
                    .modifiers
                    .get(name)
                    .ok_or_else(|| RenderErrorKind::UnknownModifier {
                        name: name.clone(),
                    })?;
            value = modifier
                .apply(value)
                .map_err(|e| RenderErrorKind::ModifierFailed {
                    name: name.clone(),
                    message: format!("{:#}", e),
                })?;
        }
        Ok(value)
    }
}

/// Apply each path step of `expr` starting from `root`
fn walk_path<'v>(root: &'v Value, expr: &VarExpr) -> Result<&'v Value, RenderErrorKind> {
    let mut current = root;
    for step in &expr.steps {
        let next = match (step, current) {
            (PathStep::Key(key), Value::Map(map)) => map.get(key),
            (PathStep::Index(index), Value::List(items)) => items.get(*index),
            (PathStep::Index(index), Value::Map(map)) => map.get(&index.to_string()),
            _ => None,
        };
        current = next.ok_or_else(|| RenderErrorKind::UnresolvablePathStep {
            path: expr.path(),
            step: step.to_string(),
        })?;
    }
    Ok(current)
}

/// Canonical text for emitted values
fn stringify(value: &Value, expr: &VarExpr) -> Result<String, RenderErrorKind> {
    if let Some(text) = value.to_text() {
        return Ok(text);
    }
    match value {
        Value::Undefined => Err(RenderErrorKind::UndefinedVariable { name: expr.path() }),
        other => Err(RenderErrorKind::NotRenderable {
            expr: expr.to_string(),
            found: other.kind(),
        }),
    }
}
