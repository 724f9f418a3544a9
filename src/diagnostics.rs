//! Translation diagnostics
//!
//! Translation never fails; anything it could not rewrite unambiguously is
//! reported here instead and left for the interpreter to reject.

use serde::{Deserialize, Serialize};

use crate::segment::Span;

/// Diagnostic severity level
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Hint,
}

/// Diagnostic codes for categorizing issues
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// Opening parenthesis never closed before end of input
    UnbalancedParens,
    /// Nested discovery stopped at the configured depth
    DepthLimitReached,
    /// Quote opened and never closed
    UnterminatedLiteral,
}

/// Source location span
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl SourceSpan {
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Create a span from byte offsets (requires source text for line/col calculation)
    pub fn from_byte_offset(source: &str, start: usize, end: usize) -> Self {
        let (start_line, start_col) = byte_to_line_col(source, start);
        let (end_line, end_col) = byte_to_line_col(source, end);
        Self::new(start_line, start_col, end_line, end_col)
    }
}

/// Convert byte offset to line and column
fn byte_to_line_col(source: &str, offset: usize) -> (u32, u32) {
    let mut line = 1u32;
    let mut col = 1u32;

    for (i, c) in source.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}

/// A diagnostic message with severity and byte range into the input
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn warning(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            span,
        }
    }

    pub fn hint(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Hint,
            code,
            message: message.into(),
            span,
        }
    }

    /// Same diagnostic with its span moved `by` bytes to the right
    pub fn shifted(mut self, by: usize) -> Self {
        self.span = self.span.offset(by);
        self
    }

    /// Line/column location of this diagnostic in `source`
    pub fn location(&self, source: &str) -> SourceSpan {
        SourceSpan::from_byte_offset(source, self.span.start, self.span.end)
    }

    /// Format as `line:col: message`
    pub fn render(&self, source: &str) -> String {
        let loc = self.location(source);
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Hint => "hint",
        };
        format!("{}:{}: {}: {}", loc.start_line, loc.start_col, level, self.message)
    }
}
