//! Call expression discovery
//!
//! Finds every `name(...)` call in console input using only bracket balance
//! and quote awareness; there is no grammar. Each level of the input is split
//! into code and literal segments and scanned in two ways:
//!
//! - calls fully contained in one code segment are collected by a left to
//!   right scan ("simple" calls)
//! - calls whose argument list contains a literal are tracked across
//!   segments by counting the excess of unmatched `(`, recovering the call's
//!   name by walking backward from the end of the segment that opened it, and
//!   closing it in the code segment where the excess is paid back
//!
//! Nested calls are discovered by scanning the argument text of every call
//! found. The ranges still to scan live on an explicit work-list, so input
//! nesting depth never grows the native stack.
//!
//! ```
//! use console_translate::calls::find_calls;
//!
//! let calls = find_calls("outer('a', inner()) + other()");
//! let found: Vec<&str> = calls.iter().map(|c| c.text).collect();
//! assert_eq!(found, vec!["outer('a', inner())", "other()", "inner()"]);
//! ```

use std::collections::VecDeque;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace, warn};

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::segment::{split_segments, EscapePolicy, SegmentKind, Span};

// =============================================================================
// NAME EXTRACTION
// =============================================================================

/// Characters that can never be part of a call name
const NAME_TERMINATORS: &[char] = &[
    ',', '.', '-', '+', '\'', '"', '#', '*', '=', '<', '>', '/', '%', '&', '|', '^', '~', '!',
    ':', ';', '[', ']', '{', '}', '@', '\\',
];

/// `name(` occurrences in code text; names stop at the same characters as
/// in call discovery
static COMMAND_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    let terminators: String = NAME_TERMINATORS
        .iter()
        .map(|ch| regex::escape(ch.encode_utf8(&mut [0; 4])))
        .collect();
    Regex::new(&format!(r"[^()\s{terminators}]*\(")).unwrap()
});

pub fn is_name_terminator(ch: char) -> bool {
    ch.is_whitespace() || NAME_TERMINATORS.contains(&ch)
}

/// Name of a call expression: everything before its first `(`
///
/// No validation; a string without `(` is returned whole.
pub fn command_name(call: &str) -> &str {
    match call.find('(') {
        Some(pos) => &call[..pos],
        None => call,
    }
}

/// Names of every `name(` occurrence outside quoted literals, in order
///
/// Unlike [`find_calls`] this does not require the call to be closed, which
/// makes it suitable for highlighting text that is still being typed.
pub fn command_names(text: &str) -> Vec<&str> {
    split_segments(text, EscapePolicy::default())
        .into_iter()
        .filter(|seg| seg.is_code())
        .flat_map(|seg| COMMAND_NAME_RE.find_iter(seg.text))
        .map(|m| m.as_str().trim_end_matches('('))
        .filter(|name| !name.is_empty())
        .collect()
}

// =============================================================================
// TYPES
// =============================================================================

/// A balanced `name(...)` occurrence in the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallExpr<'a> {
    /// Exact text from the start of the name through the balancing `)`
    pub text: &'a str,
    pub span: Span,
    /// Byte offset of the `(` that follows the name
    pub open_paren: usize,
    /// 0 for top-level calls, +1 per enclosing call
    pub depth: usize,
}

impl<'a> CallExpr<'a> {
    pub fn name(&self) -> &'a str {
        command_name(self.text)
    }

    /// Argument text between the outer parentheses
    pub fn arguments(&self) -> &'a str {
        let open = self.open_paren - self.span.start;
        &self.text[open + 1..self.text.len() - 1]
    }
}

/// Bounds on nested discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Deepest nesting level whose argument text is still scanned
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self { max_depth: 256 }
    }
}

/// Every call found in one input plus anything worth reporting
#[derive(Debug, Clone, Default)]
pub struct Discovery<'a> {
    /// Ordered by depth, then left to right
    pub calls: Vec<CallExpr<'a>>,
    pub diagnostics: Vec<Diagnostic>,
}

// =============================================================================
// FINDER
// =============================================================================

/// Find every call in `text` with default settings
pub fn find_calls(text: &str) -> Vec<CallExpr<'_>> {
    CallFinder::default().find(text).calls
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CallFinder {
    pub escapes: EscapePolicy,
    pub limits: Limits,
}

impl CallFinder {
    pub fn new(escapes: EscapePolicy, limits: Limits) -> Self {
        Self { escapes, limits }
    }

    pub fn find<'a>(&self, text: &'a str) -> Discovery<'a> {
        let mut calls = Vec::new();
        let mut diagnostics = Vec::new();
        let mut depth_limited = false;

        let mut work: VecDeque<(Span, usize)> = VecDeque::new();
        work.push_back((Span::new(0, text.len()), 0));

        while let Some((range, depth)) = work.pop_front() {
            let level = scan_level(&text[range.start..range.end], self.escapes);
            diagnostics.extend(level.diagnostics.into_iter().map(|d| d.shifted(range.start)));

            for group in level.groups {
                let span = group.span.offset(range.start);
                let open = group.open + range.start;

                if span.start < open {
                    calls.push(CallExpr {
                        text: &text[span.start..span.end],
                        span,
                        open_paren: open,
                        depth,
                    });
                } else {
                    trace!(at = open, "skipping parenthesis group without a name");
                }

                let arguments = Span::new(open + 1, span.end - 1);
                if !text[arguments.start..arguments.end].contains('(') {
                    continue;
                }
                if depth < self.limits.max_depth {
                    work.push_back((arguments, depth + 1));
                } else if !depth_limited {
                    warn!(
                        max_depth = self.limits.max_depth,
                        "nesting limit reached, deeper calls are left untouched"
                    );
                    diagnostics.push(Diagnostic::warning(
                        DiagnosticCode::DepthLimitReached,
                        format!(
                            "calls nested deeper than {} levels are not rewritten",
                            self.limits.max_depth
                        ),
                        arguments,
                    ));
                    depth_limited = true;
                }
            }
        }

        calls.sort_by_key(|c| (c.depth, c.span.start));
        diagnostics.sort_by_key(|d| d.span);
        diagnostics.dedup();
        debug!(calls = calls.len(), diagnostics = diagnostics.len(), "call discovery finished");

        Discovery { calls, diagnostics }
    }
}

// =============================================================================
// SINGLE LEVEL SCAN
// =============================================================================

/// A balanced parenthesis group with whatever name precedes it; offsets are
/// relative to the scanned text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Group {
    span: Span,
    open: usize,
}

#[derive(Debug, Default)]
struct LevelScan {
    groups: Vec<Group>,
    diagnostics: Vec<Diagnostic>,
}

/// Call carried across segment boundaries
#[derive(Debug, Clone, Copy)]
struct Pending {
    start: usize,
    open: usize,
}

fn scan_level(text: &str, escapes: EscapePolicy) -> LevelScan {
    let mut scan = LevelScan::default();
    let mut excess = 0usize;
    let mut pending: Option<Pending> = None;

    for seg in split_segments(text, escapes) {
        if let SegmentKind::UnterminatedLiteral { quote } = seg.kind {
            scan.diagnostics.push(Diagnostic::hint(
                DiagnosticCode::UnterminatedLiteral,
                format!("literal opened with {quote} is never closed"),
                seg.span,
            ));
        }
        // Literal text is either argument content of the pending call or inert
        if seg.is_literal() {
            continue;
        }

        let base = seg.span.start;
        let code = seg.text;
        let mut top_from = 0;

        if excess > 0 {
            match close_carried(code, excess) {
                Some(close) => {
                    if let Some(p) = pending.take() {
                        scan.groups.push(Group {
                            span: Span::new(p.start, base + close + 1),
                            open: p.open,
                        });
                    }
                    top_from = close + 1;
                }
                None => {
                    // Whole segment is argument text of the pending call
                    excess = unmatched_opens(code, excess);
                    continue;
                }
            }
        }

        let top = &code[top_from..];
        let top_base = base + top_from;

        scan.groups
            .extend(simple_calls(top).into_iter().map(|g| Group {
                span: g.span.offset(top_base),
                open: g.open + top_base,
            }));

        excess = unmatched_opens(top, 0);
        if excess > 0 {
            let (start, open) = recover_call_prefix(top, excess);
            pending = Some(Pending {
                start: top_base + start,
                open: top_base + open,
            });
        }
    }

    if let Some(p) = pending {
        scan.diagnostics.push(Diagnostic::warning(
            DiagnosticCode::UnbalancedParens,
            format!("call `{}` is never closed", &text[p.start..=p.open]),
            Span::new(p.start, text.len()),
        ));
    }

    scan.groups.sort_by_key(|g| g.span.start);
    scan
}

/// Calls entirely contained in one code segment
fn simple_calls(code: &str) -> Vec<Group> {
    enum State {
        Idle,
        Name { start: usize },
        Args { start: usize, open: usize, balance: i64 },
    }

    let mut groups = Vec::new();
    let mut state = State::Idle;

    for (i, ch) in code.char_indices() {
        state = match state {
            State::Args { start, open, balance } => match ch {
                '(' => State::Args { start, open, balance: balance - 1 },
                ')' if balance == 0 => {
                    groups.push(Group {
                        span: Span::new(start, i + 1),
                        open,
                    });
                    State::Idle
                }
                ')' => State::Args { start, open, balance: balance + 1 },
                _ => State::Args { start, open, balance },
            },
            State::Idle | State::Name { .. } if ch == ')' || is_name_terminator(ch) => State::Idle,
            State::Name { start } if ch == '(' => State::Args { start, open: i, balance: 0 },
            State::Idle if ch == '(' => State::Args { start: i, open: i, balance: 0 },
            State::Idle => State::Name { start: i },
            name @ State::Name { .. } => name,
        };
    }

    groups
}

/// Position of the `)` that pays back `excess` open parentheses carried into
/// this segment
fn close_carried(code: &str, excess: usize) -> Option<usize> {
    let mut balance = 0i64;
    for (i, ch) in code.char_indices() {
        match ch {
            '(' => balance -= 1,
            ')' => {
                balance += 1;
                if balance == excess as i64 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Unmatched `(` at the end of `code`, starting from `carried`
///
/// Stray `)` with nothing open are ignored.
fn unmatched_opens(code: &str, carried: usize) -> usize {
    code.chars().fold(carried, |depth, ch| match ch {
        '(' => depth + 1,
        ')' => depth.saturating_sub(1),
        _ => depth,
    })
}

/// Walk backward from the end of `code` to the outermost unclosed `(` and
/// the name in front of it; returns `(name_start, open_paren)`
fn recover_call_prefix(code: &str, excess: usize) -> (usize, usize) {
    let mut balance = 0i64;
    let mut open = None;

    for (i, ch) in code.char_indices().rev() {
        match open {
            None => {
                match ch {
                    ')' => balance -= 1,
                    '(' => balance += 1,
                    _ => {}
                }
                if balance == excess as i64 {
                    open = Some(i);
                }
            }
            Some(open) => {
                if ch == '(' || ch == ')' || is_name_terminator(ch) {
                    return (i + ch.len_utf8(), open);
                }
            }
        }
    }

    match open {
        Some(open) => (0, open),
        // Not reachable while `excess` comes from unmatched_opens
        None => (code.len(), code.len()),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn found(text: &str) -> Vec<&str> {
        find_calls(text).iter().map(|c| c.text).collect()
    }

    #[test]
    fn test_command_name() {
        assert_eq!(command_name("Command(100, 'hello')"), "Command");
        assert_eq!(command_name("foo()"), "foo");
        assert_eq!(command_name("no_parens"), "no_parens");
        assert_eq!(command_name("(grouped)"), "");
    }

    #[test]
    fn test_single_call() {
        assert_eq!(found("foo()"), vec!["foo()"]);
        assert_eq!(found("foo(1, 2)"), vec!["foo(1, 2)"]);
    }

    #[test]
    fn test_name_stops_at_terminators() {
        assert_eq!(found("x = foo(1)"), vec!["foo(1)"]);
        assert_eq!(found("a+b(2)"), vec!["b(2)"]);
        assert_eq!(found("obj.method()"), vec!["method()"]);
        assert_eq!(found("items[get(0)]"), vec!["get(0)"]);
        assert_eq!(found("first()\nsecond()"), vec!["first()", "second()"]);
    }

    #[test]
    fn test_multiple_top_level_calls() {
        assert_eq!(found("This() and That()"), vec!["This()", "That()"]);
    }

    #[test]
    fn test_nested_calls() {
        assert_eq!(
            found("This(This()) and That()"),
            vec!["This(This())", "That()", "This()"]
        );
        let calls = find_calls("a(b(c()))");
        let depths: Vec<(&str, usize)> = calls.iter().map(|c| (c.name(), c.depth)).collect();
        assert_eq!(depths, vec![("a", 0), ("b", 1), ("c", 2)]);
    }

    #[test]
    fn test_literal_content_is_not_code() {
        assert_eq!(found("foo('bar(1)')"), vec!["foo('bar(1)')"]);
        assert_eq!(found("'bar(1)'"), Vec::<&str>::new());
    }

    #[test]
    fn test_call_spanning_literals() {
        assert_eq!(
            found("This(This('hallo')) and That('not()')"),
            vec!["This(This('hallo'))", "That('not()')", "This('hallo')"]
        );
        assert_eq!(found("foo('a', bar('b'))"), vec!["foo('a', bar('b'))", "bar('b')"]);
    }

    #[test]
    fn test_consecutive_spanning_calls() {
        assert_eq!(
            found("foo('a') + bar('b')"),
            vec!["foo('a')", "bar('b')"]
        );
        assert_eq!(
            found("foo('a', x) + mid(y) + baz('c')"),
            vec!["foo('a', x)", "mid(y)", "baz('c')"]
        );
    }

    #[test]
    fn test_spanning_call_with_simple_call_before_literal() {
        assert_eq!(found("foo(bar(), 'x')"), vec!["foo(bar(), 'x')", "bar()"]);
    }

    #[test]
    fn test_grouping_parens_are_not_calls() {
        assert_eq!(found("(1 + 2) * 3"), Vec::<&str>::new());
        assert_eq!(found("(foo())"), vec!["foo()"]);
        assert_eq!(found("x = ('a', f())"), vec!["f()"]);
    }

    #[test]
    fn test_curried_call_uses_first_name() {
        let calls = find_calls("f(a)('x')");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].text, "f(a)");
    }

    #[test]
    fn test_unclosed_call_is_not_emitted() {
        let discovery = CallFinder::default().find("foo(");
        assert!(discovery.calls.is_empty());
        assert_eq!(discovery.diagnostics.len(), 1);
        assert_eq!(discovery.diagnostics[0].code, DiagnosticCode::UnbalancedParens);
    }

    #[test]
    fn test_calls_inside_unclosed_call_are_left_alone() {
        assert_eq!(found("foo(bar()"), Vec::<&str>::new());
        assert_eq!(found("foo(bar(), 'x'"), Vec::<&str>::new());
        assert_eq!(found("a(1) b(c(2)"), vec!["a(1)"]);

        let discovery = CallFinder::default().find("a(1) b(c(2)");
        assert_eq!(discovery.diagnostics.len(), 1);
        assert_eq!(discovery.diagnostics[0].code, DiagnosticCode::UnbalancedParens);
        assert_eq!(discovery.diagnostics[0].span, Span::new(5, 11));
    }

    #[test]
    fn test_stray_closing_paren() {
        assert_eq!(found(") foo('a')"), vec!["foo('a')"]);
        assert_eq!(found("x) y(1)"), vec!["y(1)"]);
    }

    #[test]
    fn test_span_and_open_paren_offsets() {
        let input = "x = foo('a', bar())";
        let calls = find_calls(input);
        assert_eq!(calls[0].span, Span::new(4, input.len()));
        assert_eq!(calls[0].open_paren, 7);
        assert_eq!(calls[0].arguments(), "'a', bar()");
        assert_eq!(calls[1].text, "bar()");
        assert_eq!(&input[calls[1].span.start..calls[1].span.end], "bar()");
        assert_eq!(calls[1].open_paren, 16);
    }

    #[test]
    fn test_duplicate_call_text_found_twice() {
        let calls = find_calls("foo() + foo()");
        assert_eq!(calls.len(), 2);
        assert_ne!(calls[0].span, calls[1].span);
    }

    #[test]
    fn test_depth_limit() {
        let finder = CallFinder::new(EscapePolicy::default(), Limits { max_depth: 1 });
        let discovery = finder.find("a(b(c(d())))");
        let names: Vec<&str> = discovery.calls.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(discovery.diagnostics.len(), 1);
        assert_eq!(discovery.diagnostics[0].code, DiagnosticCode::DepthLimitReached);
    }

    #[test]
    fn test_deep_nesting_does_not_overflow() {
        let depth = 1_000;
        let input = format!("{}{}", "f(".repeat(depth), ")".repeat(depth));
        let finder = CallFinder::new(EscapePolicy::default(), Limits { max_depth: depth });
        let discovery = finder.find(&input);
        assert_eq!(discovery.calls.len(), depth);
        assert!(discovery.diagnostics.is_empty());
    }

    #[test]
    fn test_unterminated_literal_reported() {
        let discovery = CallFinder::default().find("say('hi)");
        assert!(discovery.calls.is_empty());
        assert!(discovery
            .diagnostics
            .iter()
            .any(|d| d.code == DiagnosticCode::UnterminatedLiteral));
    }

    #[test]
    fn test_command_names() {
        assert_eq!(command_names("Command() and Test()"), vec!["Command", "Test"]);
        assert_eq!(command_names("foo('bar(') + baz("), vec!["foo", "baz"]);
        assert_eq!(command_names("(1 + 2)"), Vec::<&str>::new());
    }

    #[test]
    fn test_command_names_agree_with_discovery() {
        for text in ["x=foo()", "a<b(1)", "items[get(0)]", "@deco(x)", "!neg(1)"] {
            let discovered: Vec<&str> = find_calls(text).iter().map(|c| c.name()).collect();
            assert_eq!(command_names(text), discovered, "input {text}");
        }
        assert_eq!(command_names("x=foo()"), vec!["foo"]);
    }
}
