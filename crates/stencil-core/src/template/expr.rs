//! Variable expressions: `root.path[0]['key']|modifier|modifier`
//!
//! Expressions are parsed once at compile time into a [`VarExpr`] and
//! interpreted directly at render time.

use std::fmt;
use thiserror::Error;

/// A single access step applied after the root lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    /// `.name`, `['name']` or `["name"]`
    Key(String),
    /// `.0` or `[0]`
    Index(usize),
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Key(key) if is_identifier(key) => write!(f, ".{}", key),
            PathStep::Key(key) if key.contains('\'') => write!(f, "[\"{}\"]", key),
            PathStep::Key(key) => write!(f, "['{}']", key),
            PathStep::Index(index) => write!(f, "[{}]", index),
        }
    }
}

/// Parsed variable expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarExpr {
    pub root: String,
    pub steps: Vec<PathStep>,
    pub modifiers: Vec<String>,
}

/// Invalid expression text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid expression '{expr}': {reason}")]
pub struct ExprSyntaxError {
    pub expr: String,
    pub reason: String,
}

impl VarExpr {
    /// Parse an expression such as `paper.authors[0].name|upper`
    ///
    /// # Errors
    ///
    /// Returns an error for an empty path, a root that is not an identifier,
    /// malformed steps, or empty/invalid modifier names.
    pub fn parse(text: &str) -> Result<Self, ExprSyntaxError> {
        let fail = |reason: &str| ExprSyntaxError {
            expr: text.trim().to_string(),
            reason: reason.to_string(),
        };

        let mut segments = split_outside_brackets(text, '|').into_iter();
        let path = segments.next().unwrap_or("").trim();
        if path.is_empty() {
            return Err(fail("missing variable name"));
        }

        let (root, steps) = parse_path(path).map_err(|reason| fail(&reason))?;

        let mut modifiers = Vec::new();
        for segment in segments {
            let name = segment.trim();
            if name.is_empty() {
                return Err(fail("empty modifier name"));
            }
            if !is_identifier(name) {
                return Err(fail(&format!("invalid modifier name '{}'", name)));
            }
            modifiers.push(name.to_string());
        }

        Ok(Self {
            root,
            steps,
            modifiers,
        })
    }

    /// Path text without modifiers, e.g. `paper.authors[0]`
    pub fn path(&self) -> String {
        let mut path = self.root.clone();
        for step in &self.steps {
            path.push_str(&step.to_string());
        }
        path
    }
}

impl fmt::Display for VarExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())?;
        for modifier in &self.modifiers {
            write!(f, "|{}", modifier)?;
        }
        Ok(())
    }
}

/// Check for `[A-Za-z_][A-Za-z0-9_]*`
pub(crate) fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Split `text` on `separator`, ignoring separators inside `[...]` steps
/// and their quoted keys
pub(crate) fn split_outside_brackets(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '\'' | '"' if depth > 0 => quote = Some(c),
                '[' => depth += 1,
                ']' => depth = depth.saturating_sub(1),
                c if c == separator && depth == 0 => {
                    parts.push(&text[start..i]);
                    start = i + c.len_utf8();
                }
                _ => {}
            },
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Byte offset of the `]` closing a bracket step; quoted text is skipped
fn closing_bracket(text: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' => quote = Some(c),
            None if c == ']' => return Some(i),
            None => {}
        }
    }
    None
}

/// Split a path into root and steps
fn parse_path(path: &str) -> Result<(String, Vec<PathStep>), String> {
    let root_end = path.find(['.', '[']).unwrap_or(path.len());
    let root = &path[..root_end];
    if !is_identifier(root) {
        return Err(format!("'{}' is not a valid variable name", root));
    }

    let mut steps = Vec::new();
    let mut rest = &path[root_end..];
    while !rest.is_empty() {
        if let Some(after_dot) = rest.strip_prefix('.') {
            let end = after_dot.find(['.', '[']).unwrap_or(after_dot.len());
            steps.push(parse_dotted_step(&after_dot[..end])?);
            rest = &after_dot[end..];
        } else if let Some(after_bracket) = rest.strip_prefix('[') {
            let close =
                closing_bracket(after_bracket).ok_or_else(|| "unclosed '['".to_string())?;
            steps.push(parse_bracket_step(after_bracket[..close].trim())?);
            rest = &after_bracket[close + 1..];
        } else {
            return Err(format!("unexpected text '{}'", rest));
        }
    }

    Ok((root.to_string(), steps))
}

fn parse_dotted_step(step: &str) -> Result<PathStep, String> {
    if step.is_empty() {
        return Err("empty path step".to_string());
    }
    if step.bytes().all(|b| b.is_ascii_digit()) {
        return parse_index(step);
    }
    if !is_identifier(step) {
        return Err(format!("invalid path step '{}'", step));
    }
    Ok(PathStep::Key(step.to_string()))
}

fn parse_bracket_step(inner: &str) -> Result<PathStep, String> {
    if inner.is_empty() {
        return Err("empty '[]' step".to_string());
    }
    for quote in ['\'', '"'] {
        if let Some(body) = inner.strip_prefix(quote) {
            let key = body
                .strip_suffix(quote)
                .ok_or_else(|| format!("unterminated quoted key {}", inner))?;
            return Ok(PathStep::Key(key.to_string()));
        }
    }
    if inner.bytes().all(|b| b.is_ascii_digit()) {
        return parse_index(inner);
    }
    Err(format!("invalid index '{}'", inner))
}

fn parse_index(digits: &str) -> Result<PathStep, String> {
    digits
        .parse::<usize>()
        .map(PathStep::Index)
        .map_err(|_| format!("index '{}' out of range", digits))
}
