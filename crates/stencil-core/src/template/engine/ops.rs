//! Compiled operations
//!
//! A template compiles to a flat `Vec<Instr>`. Structured constructs are
//! Begin/End pairs whose jump targets are resolved by the compiler, so the
//! executor never searches for a matching end marker.

use crate::template::expr::VarExpr;

/// Index of a scratch slot; equal to the nesting depth of the construct
pub type Slot = usize;

/// A single executable operation
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Append text verbatim
    EmitLiteral(String),

    /// Resolve, stringify and append
    EmitVar(VarExpr),

    /// Evaluate `cond` into `slot`; when falsy jump to `else_at + 1` or `end_at`
    BeginIf {
        cond: VarExpr,
        slot: Slot,
        else_at: Option<usize>,
        end_at: usize,
    },

    /// Reached only after the if-branch ran; jumps to `end_at`
    Else { slot: Slot, end_at: usize },

    /// Frees `slot`
    EndIf { slot: Slot },

    /// Resolve `collection` into `slot` and bind `item` / `item_idx`
    BeginFor {
        item: String,
        collection: VarExpr,
        slot: Slot,
        end_at: usize,
    },

    /// Advance the loop in `slot`; jumps back to `body_at` while items remain
    EndFor { slot: Slot, body_at: usize },

    /// Named overridable region ending at `end_at`
    BeginBlock { name: String, end_at: usize },

    /// End marker of a block region
    EndBlock,

    /// Invoke a host callable with named arguments
    Call {
        name: String,
        args: Vec<(String, VarExpr)>,
    },
}

/// An operation with its source line
#[derive(Debug, Clone, PartialEq)]
pub struct Instr {
    pub op: Operation,
    pub line: usize,
}
