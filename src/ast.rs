//! AST infrastructure types
//!
//! Metadata types shared by the parser and the analyses built on top of it:
//! - `Span` for tracking source code locations

/// Span representing a location in source code
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub col: usize,
}

impl Span {
    pub fn from_pest_span(span: pest::Span) -> Self {
        let (line, col) = span.start_pos().line_col();
        Self {
            start: span.start(),
            end: span.end(),
            line,
            col,
        }
    }

    /// Span pointing at a line/column pair without byte offsets.
    ///
    /// Used when an error is located by logical statement rather than by a
    /// position inside a single parsed fragment.
    pub fn at_line_col(line: usize, col: usize) -> Self {
        Self {
            start: 0,
            end: 0,
            line,
            col,
        }
    }
}
