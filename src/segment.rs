//! Quote-aware segment splitter
//!
//! Splits console input into an ordered sequence of code and literal
//! segments. A literal is a quoted token, delimiters included; everything
//! between literals is code. Concatenating the segment texts in order always
//! reproduces the input exactly.
//!
//! ```text
//! foo('a', bar("b"))  →  [foo(] ['a'] [, bar(] ["b"] [))]
//!                         code   lit   code     lit   code
//! ```

use nom::{
    bytes::complete::{escaped, is_not},
    character::complete::{anychar, char},
    combinator::{opt, recognize},
    sequence::tuple,
    IResult,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// Types
// ============================================================================

/// Byte range into the text a segment or call was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Shift a span found in a substring back into the coordinates of the
    /// enclosing text
    pub fn offset(self, by: usize) -> Self {
        Self::new(self.start + by, self.end + by)
    }
}

/// How backslashes inside quoted literals are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscapePolicy {
    /// A backslash escapes the following character; an escaped quote never
    /// closes the literal
    #[default]
    Backslash,
    /// No escapes: the first matching quote closes the literal
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Code,
    Literal { quote: char },
    /// Opening quote without a matching close; runs to end of input
    UnterminatedLiteral { quote: char },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub span: Span,
    pub kind: SegmentKind,
}

impl<'a> Segment<'a> {
    pub fn is_literal(&self) -> bool {
        !matches!(self.kind, SegmentKind::Code)
    }

    pub fn is_code(&self) -> bool {
        matches!(self.kind, SegmentKind::Code)
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Split `text` into code and literal segments
pub fn split_segments(text: &str, escapes: EscapePolicy) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let start = text.len() - rest.len();

        let (next, matched, kind) = match code_run(rest) {
            Ok((next, run)) => (next, run, SegmentKind::Code),
            Err(_) => {
                // code_run only fails in front of a quote
                let Some(quote) = rest.chars().next() else {
                    break;
                };
                match quoted_literal(rest, quote, escapes) {
                    Ok((next, literal)) => (next, literal, SegmentKind::Literal { quote }),
                    Err(_) => ("", rest, SegmentKind::UnterminatedLiteral { quote }),
                }
            }
        };

        segments.push(Segment {
            text: matched,
            span: Span::new(start, start + matched.len()),
            kind,
        });
        rest = next;
    }

    tracing::trace!(count = segments.len(), "split input into segments");
    segments
}

// ============================================================================
// Internal Parsers
// ============================================================================

fn code_run(input: &str) -> IResult<&str, &str> {
    is_not("'\"")(input)
}

fn quoted_literal(input: &str, quote: char, escapes: EscapePolicy) -> IResult<&str, &str> {
    let (plain, with_escape) = if quote == '\'' {
        ("'", "\\'")
    } else {
        ("\"", "\\\"")
    };

    match escapes {
        EscapePolicy::Backslash => recognize(tuple((
            char(quote),
            opt(escaped(is_not(with_escape), '\\', anychar)),
            char(quote),
        )))(input),
        EscapePolicy::None => recognize(tuple((char(quote), opt(is_not(plain)), char(quote))))(input),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn texts<'a>(segments: &[Segment<'a>]) -> Vec<&'a str> {
        segments.iter().map(|s| s.text).collect()
    }

    #[test]
    fn test_code_only() {
        let segments = split_segments("foo(1, 2)", EscapePolicy::Backslash);
        assert_eq!(segments.len(), 1);
        assert!(segments[0].is_code());
        assert_eq!(segments[0].span, Span::new(0, 9));
    }

    #[test]
    fn test_empty_input() {
        assert!(split_segments("", EscapePolicy::Backslash).is_empty());
    }

    #[test]
    fn test_mixed_quotes() {
        let segments = split_segments(r#"foo('a', bar("b"))"#, EscapePolicy::Backslash);
        assert_eq!(texts(&segments), vec!["foo(", "'a'", ", bar(", "\"b\"", "))"]);
        assert_eq!(segments[1].kind, SegmentKind::Literal { quote: '\'' });
        assert_eq!(segments[3].kind, SegmentKind::Literal { quote: '"' });
    }

    #[test]
    fn test_other_quote_inside_literal_is_content() {
        let segments = split_segments(r#"say("it's")"#, EscapePolicy::Backslash);
        assert_eq!(texts(&segments), vec!["say(", "\"it's\"", ")"]);
    }

    #[test]
    fn test_adjacent_literals() {
        let segments = split_segments("'a''b'", EscapePolicy::Backslash);
        assert_eq!(texts(&segments), vec!["'a'", "'b'"]);
        assert!(segments.iter().all(|s| s.is_literal()));
    }

    #[test]
    fn test_empty_literal() {
        let segments = split_segments("f('')", EscapePolicy::Backslash);
        assert_eq!(texts(&segments), vec!["f(", "''", ")"]);
    }

    #[test]
    fn test_escaped_quote_stays_inside_literal() {
        let segments = split_segments(r"f('it\'s', x)", EscapePolicy::Backslash);
        assert_eq!(texts(&segments), vec!["f(", r"'it\'s'", ", x)"]);
    }

    #[test]
    fn test_escaped_backslash_before_close() {
        let segments = split_segments(r"f('a\\')", EscapePolicy::Backslash);
        assert_eq!(texts(&segments), vec!["f(", r"'a\\'", ")"]);
    }

    #[test]
    fn test_no_escape_policy_closes_on_first_quote() {
        let segments = split_segments(r"f('it\'s')", EscapePolicy::None);
        assert_eq!(texts(&segments), vec!["f(", r"'it\'", "s", "')"]);
        assert_eq!(segments[3].kind, SegmentKind::UnterminatedLiteral { quote: '\'' });
    }

    #[test]
    fn test_unterminated_literal_runs_to_end() {
        let segments = split_segments("f('abc(", EscapePolicy::Backslash);
        assert_eq!(texts(&segments), vec!["f(", "'abc("]);
        assert_eq!(segments[1].kind, SegmentKind::UnterminatedLiteral { quote: '\'' });
        assert!(segments[1].is_literal());
    }

    #[test]
    fn test_spans_are_contiguous() {
        let input = "a('x') + \"y\" - b()";
        let segments = split_segments(input, EscapePolicy::Backslash);
        let mut cursor = 0;
        for seg in &segments {
            assert_eq!(seg.span.start, cursor);
            assert_eq!(&input[seg.span.start..seg.span.end], seg.text);
            cursor = seg.span.end;
        }
        assert_eq!(cursor, input.len());
    }

    #[test]
    fn test_multibyte_content() {
        let input = "grüße('héllo', wörld())";
        let segments = split_segments(input, EscapePolicy::Backslash);
        assert_eq!(texts(&segments).concat(), input);
        assert_eq!(segments[1].text, "'héllo'");
    }
}
