//! Line scanner for template source
//!
//! Splits one source line into literal text runs and `{...}` sections.
//! A section never spans lines, so the scanner only ever looks at the
//! current line.

/// One piece of a scanned line
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Section<'a> {
    /// Literal text outside braces, emitted verbatim
    Text(&'a str),
    /// `{# ...}`
    Comment,
    /// `{$expr}`: expression text after `$`
    Variable(&'a str),
    /// `{%keyword rest}` or `{%keyword rest%}`: text after `%`, trailing `%` removed
    Action(&'a str),
    /// `{{}` or `{}}`: an escaped brace
    Literal(&'static str),
    /// `{}` or unknown prefix
    Noop,
}

/// `{` with no `}` later on the same line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Unterminated {
    /// Byte offset of the `{` within the line
    pub column: usize,
}

/// Iterate `(line_number, line)` pairs, keeping line terminators in the text
pub(crate) fn source_lines(source: &str) -> impl Iterator<Item = (usize, &str)> {
    source
        .split_inclusive('\n')
        .enumerate()
        .map(|(index, line)| (index + 1, line))
}

/// Iterator over the sections of a single line
///
/// Scanning is forward-only: each byte is examined at most twice (once
/// while searching for `{`, once while searching for the matching `}`).
pub(crate) struct LineScanner<'a> {
    line: &'a str,
    pos: usize,
    failed: bool,
}

impl<'a> LineScanner<'a> {
    pub fn new(line: &'a str) -> Self {
        Self {
            line,
            pos: 0,
            failed: false,
        }
    }

    /// Classify the text between `{` and `}`
    fn classify(contents: &'a str) -> Section<'a> {
        let contents = contents.trim();
        let mut chars = contents.chars();
        match chars.next() {
            Some('#') => Section::Comment,
            Some('$') => Section::Variable(chars.as_str()),
            Some('%') => {
                let action = chars.as_str();
                let action = action.strip_suffix('%').unwrap_or(action);
                Section::Action(action.trim())
            }
            Some('{') => Section::Literal("{"),
            Some('}') => Section::Literal("}"),
            _ => Section::Noop,
        }
    }
}

impl<'a> Iterator for LineScanner<'a> {
    type Item = Result<Section<'a>, Unterminated>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.line.len() {
            return None;
        }

        let rest = &self.line[self.pos..];
        match rest.find('{') {
            // Text run before the next section
            Some(open) if open > 0 => {
                self.pos += open;
                Some(Ok(Section::Text(&rest[..open])))
            }
            Some(_) => {
                let inner = &rest[1..];
                match inner.find('}') {
                    Some(close) => {
                        self.pos += 1 + close + 1;
                        Some(Ok(Self::classify(&inner[..close])))
                    }
                    None => {
                        self.failed = true;
                        Some(Err(Unterminated { column: self.pos }))
                    }
                }
            }
            None => {
                self.pos = self.line.len();
                Some(Ok(Section::Text(rest)))
            }
        }
    }
}
