//! Directive compiler
//!
//! Turns scanned sections into a flat operation list. Nesting is tracked with
//! a block stack; the stack depth at which a construct opens is its scratch
//! slot, so siblings reuse a slot and nested constructs never share one.

use std::collections::BTreeMap;
use std::ops::Range;

use crate::template::error::{CompileError, CompileErrorKind};
use crate::template::expr::{is_identifier, split_outside_brackets, VarExpr};

use super::ops::{Instr, Operation, Slot};
use super::scan::{source_lines, LineScanner, Section};

/// Output of a successful compilation
#[derive(Debug, Clone, Default)]
pub(crate) struct Program {
    pub instrs: Vec<Instr>,
    /// Block name → body range (exclusive of the Begin/End markers)
    pub blocks: BTreeMap<String, Range<usize>>,
    /// Number of scratch slots a render needs
    pub slot_count: usize,
}

/// Construct kinds on the block stack
#[derive(Debug)]
enum FrameKind {
    If { else_at: Option<usize> },
    For,
    Block { name: String },
}

impl FrameKind {
    fn keyword(&self) -> &'static str {
        match self {
            FrameKind::If { .. } => "if",
            FrameKind::For => "for",
            FrameKind::Block { .. } => "block",
        }
    }
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    /// Index of the Begin operation
    begin_at: usize,
    /// Line of the opening directive
    line: usize,
}

/// Compile template source into a [`Program`]
pub(crate) fn compile_source(template: &str, source: &str) -> Result<Program, CompileError> {
    let mut compiler = Compiler::new(template);

    for (line_no, line) in source_lines(source) {
        compiler.line = line_no;
        for section in LineScanner::new(line) {
            let section = section.map_err(|unterminated| {
                compiler.error(
                    CompileErrorKind::UnterminatedDirective,
                    format!(
                        "'{{' at column {} has no closing '}}' on the same line",
                        unterminated.column + 1
                    ),
                )
            })?;
            compiler.handle_section(section)?;
        }
    }

    compiler.finish()
}

struct Compiler<'a> {
    template: &'a str,
    line: usize,
    program: Program,
    stack: Vec<Frame>,
}

impl<'a> Compiler<'a> {
    fn new(template: &'a str) -> Self {
        Self {
            template,
            line: 0,
            program: Program::default(),
            stack: Vec::new(),
        }
    }

    fn error(&self, kind: CompileErrorKind, message: impl Into<String>) -> CompileError {
        CompileError::new(self.template, self.line, kind, message)
    }

    fn malformed(&self, message: impl Into<String>) -> CompileError {
        self.error(CompileErrorKind::MalformedDirectiveSyntax, message)
    }

    fn mismatched(&self, message: impl Into<String>) -> CompileError {
        self.error(CompileErrorKind::MismatchedBlockNesting, message)
    }

    /// Index the next emitted operation will get
    fn next_index(&self) -> usize {
        self.program.instrs.len()
    }

    fn emit(&mut self, op: Operation) -> usize {
        let index = self.next_index();
        self.program.instrs.push(Instr {
            op,
            line: self.line,
        });
        index
    }

    /// Append literal text, merging with a directly preceding literal
    fn emit_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Instr {
            op: Operation::EmitLiteral(previous),
            ..
        }) = self.program.instrs.last_mut()
        {
            previous.push_str(text);
            return;
        }
        self.emit(Operation::EmitLiteral(text.to_string()));
    }

    fn parse_expr(&self, text: &str) -> Result<VarExpr, CompileError> {
        VarExpr::parse(text).map_err(|e| self.malformed(e.to_string()))
    }

    /// Push a frame; returns the slot for the construct
    fn open(&mut self, kind: FrameKind, begin_at: usize) -> Slot {
        let slot = self.stack.len();
        self.stack.push(Frame {
            kind,
            begin_at,
            line: self.line,
        });
        self.program.slot_count = self.program.slot_count.max(self.stack.len());
        slot
    }

    fn handle_section(&mut self, section: Section<'_>) -> Result<(), CompileError> {
        match section {
            Section::Text(text) => self.emit_text(text),
            Section::Literal(text) => self.emit_text(text),
            Section::Comment | Section::Noop => {}
            Section::Variable(expr) => {
                let expr = self.parse_expr(expr)?;
                self.emit(Operation::EmitVar(expr));
            }
            Section::Action(action) => self.handle_action(action)?,
        }
        Ok(())
    }

    fn handle_action(&mut self, action: &str) -> Result<(), CompileError> {
        let (keyword, remainder) = match action.split_once(char::is_whitespace) {
            Some((keyword, remainder)) => (keyword, remainder.trim()),
            None => (action, ""),
        };

        match keyword {
            "if" => self.handle_if(remainder),
            "else" => self.handle_else(remainder),
            "endif" => self.handle_endif(remainder),
            "for" => self.handle_for(remainder),
            "endfor" => self.handle_endfor(remainder),
            "block" => self.handle_block(remainder),
            "endblock" => self.handle_endblock(remainder),
            "call" => self.handle_call(remainder),
            "" => Err(self.error(
                CompileErrorKind::UnknownDirectiveKeyword,
                "empty action directive",
            )),
            other => Err(self.error(
                CompileErrorKind::UnknownDirectiveKeyword,
                format!("unknown directive keyword '{}'", other),
            )),
        }
    }

    /// Reject trailing arguments on bare keywords such as `else`
    fn expect_no_args(&self, keyword: &str, remainder: &str) -> Result<(), CompileError> {
        if remainder.is_empty() {
            Ok(())
        } else {
            Err(self.malformed(format!(
                "'{}' takes no arguments, found '{}'",
                keyword, remainder
            )))
        }
    }

    /// Pop the innermost frame, requiring it to be of `keyword`'s kind
    fn close(&mut self, keyword: &str, end_keyword: &str) -> Result<Frame, CompileError> {
        match self.stack.last() {
            Some(frame) if frame.kind.keyword() == keyword => {}
            Some(frame) => {
                return Err(self.mismatched(format!(
                    "'{}' does not match open '{}' from line {}",
                    end_keyword,
                    frame.kind.keyword(),
                    frame.line
                )))
            }
            None => {
                return Err(self.mismatched(format!(
                    "'{}' without matching '{}'",
                    end_keyword, keyword
                )))
            }
        }
        self.stack
            .pop()
            .ok_or_else(|| self.mismatched(format!("'{}' without matching '{}'", end_keyword, keyword)))
    }

    fn handle_if(&mut self, remainder: &str) -> Result<(), CompileError> {
        if remainder.is_empty() {
            return Err(self.malformed("'if' requires a condition"));
        }
        let cond = self.parse_expr(remainder)?;
        let begin_at = self.next_index();
        let slot = self.open(FrameKind::If { else_at: None }, begin_at);
        self.emit(Operation::BeginIf {
            cond,
            slot,
            else_at: None,
            end_at: 0,
        });
        Ok(())
    }

    fn handle_else(&mut self, remainder: &str) -> Result<(), CompileError> {
        self.expect_no_args("else", remainder)?;
        let else_index = self.next_index();
        let slot = self.stack.len().saturating_sub(1);

        match self.stack.last_mut() {
            Some(Frame {
                kind: FrameKind::If { else_at },
                line,
                ..
            }) => {
                if else_at.is_some() {
                    let opened = *line;
                    return Err(self.mismatched(format!(
                        "second 'else' for 'if' from line {}",
                        opened
                    )));
                }
                *else_at = Some(else_index);
            }
            Some(frame) => {
                let message = format!(
                    "'else' inside '{}' from line {}",
                    frame.kind.keyword(),
                    frame.line
                );
                return Err(self.mismatched(message));
            }
            None => return Err(self.mismatched("'else' without matching 'if'")),
        }

        self.emit(Operation::Else { slot, end_at: 0 });
        Ok(())
    }

    fn handle_endif(&mut self, remainder: &str) -> Result<(), CompileError> {
        self.expect_no_args("endif", remainder)?;
        let frame = self.close("if", "endif")?;
        let slot = self.stack.len();
        let end_at = self.emit(Operation::EndIf { slot });

        let else_index = match frame.kind {
            FrameKind::If { else_at } => else_at,
            _ => None,
        };
        if let Operation::BeginIf {
            else_at,
            end_at: target,
            ..
        } = &mut self.program.instrs[frame.begin_at].op
        {
            *else_at = else_index;
            *target = end_at;
        }
        if let Some(index) = else_index {
            if let Operation::Else { end_at: target, .. } = &mut self.program.instrs[index].op {
                *target = end_at;
            }
        }
        Ok(())
    }

    fn handle_for(&mut self, remainder: &str) -> Result<(), CompileError> {
        let (item, collection) = remainder
            .split_once(char::is_whitespace)
            .map(|(item, collection)| (item, collection.trim()))
            .ok_or_else(|| self.malformed("'for' requires an item name and a collection"))?;
        if !is_identifier(item) {
            return Err(self.malformed(format!("'{}' is not a valid loop variable name", item)));
        }
        if collection.is_empty() {
            return Err(self.malformed("'for' requires a collection"));
        }
        let collection = self.parse_expr(collection)?;

        let begin_at = self.next_index();
        let slot = self.open(FrameKind::For, begin_at);
        self.emit(Operation::BeginFor {
            item: item.to_string(),
            collection,
            slot,
            end_at: 0,
        });
        Ok(())
    }

    fn handle_endfor(&mut self, remainder: &str) -> Result<(), CompileError> {
        self.expect_no_args("endfor", remainder)?;
        let frame = self.close("for", "endfor")?;
        let slot = self.stack.len();
        let end_at = self.emit(Operation::EndFor {
            slot,
            body_at: frame.begin_at + 1,
        });
        if let Operation::BeginFor { end_at: target, .. } = &mut self.program.instrs[frame.begin_at].op
        {
            *target = end_at;
        }
        Ok(())
    }

    fn handle_block(&mut self, remainder: &str) -> Result<(), CompileError> {
        if remainder.is_empty() {
            return Err(self.malformed("'block' requires a name"));
        }
        if !is_identifier(remainder) {
            return Err(self.malformed(format!("'{}' is not a valid block name", remainder)));
        }
        if self.program.blocks.contains_key(remainder) || self.block_is_open(remainder) {
            return Err(self.error(
                CompileErrorKind::DuplicateBlock,
                format!("block '{}' is already defined", remainder),
            ));
        }

        let begin_at = self.next_index();
        self.open(
            FrameKind::Block {
                name: remainder.to_string(),
            },
            begin_at,
        );
        self.emit(Operation::BeginBlock {
            name: remainder.to_string(),
            end_at: 0,
        });
        Ok(())
    }

    fn block_is_open(&self, name: &str) -> bool {
        self.stack
            .iter()
            .any(|frame| matches!(&frame.kind, FrameKind::Block { name: open } if open == name))
    }

    fn handle_endblock(&mut self, remainder: &str) -> Result<(), CompileError> {
        if let Some(Frame {
            kind: FrameKind::Block { name },
            ..
        }) = self.stack.last()
        {
            if !remainder.is_empty() && remainder != name {
                return Err(self.mismatched(format!(
                    "'endblock {}' does not match open block '{}'",
                    remainder, name
                )));
            }
        }

        let frame = self.close("block", "endblock")?;
        let end_at = self.emit(Operation::EndBlock);
        if let Operation::BeginBlock { end_at: target, .. } =
            &mut self.program.instrs[frame.begin_at].op
        {
            *target = end_at;
        }
        if let FrameKind::Block { name } = frame.kind {
            self.program.blocks.insert(name, frame.begin_at + 1..end_at);
        }
        Ok(())
    }

    fn handle_call(&mut self, remainder: &str) -> Result<(), CompileError> {
        let mut parts = split_outside_brackets(remainder, ',').into_iter();
        let name = parts.next().unwrap_or("").trim();
        if name.is_empty() {
            return Err(self.malformed("'call' requires a callable name"));
        }
        if !is_identifier(name) {
            return Err(self.malformed(format!("'{}' is not a valid callable name", name)));
        }

        let mut args: Vec<(String, VarExpr)> = Vec::new();
        for param in parts {
            let (key, expr) = param
                .split_once('=')
                .ok_or_else(|| self.malformed(format!("expected key=expr, found '{}'", param.trim())))?;
            let key = key.trim();
            if !is_identifier(key) {
                return Err(self.malformed(format!("'{}' is not a valid argument name", key)));
            }
            if args.iter().any(|(existing, _)| existing == key) {
                return Err(self.malformed(format!("argument '{}' given twice", key)));
            }
            let expr = self.parse_expr(expr)?;
            args.push((key.to_string(), expr));
        }

        self.emit(Operation::Call {
            name: name.to_string(),
            args,
        });
        Ok(())
    }

    fn finish(mut self) -> Result<Program, CompileError> {
        if let Some(frame) = self.stack.last() {
            self.line = frame.line;
            return Err(self.mismatched(format!(
                "'{}' is never closed",
                frame.kind.keyword()
            )));
        }

        tracing::debug!(
            template = self.template,
            ops = self.program.instrs.len(),
            blocks = self.program.blocks.len(),
            "compiled template"
        );
        Ok(self.program)
    }
}
