//! Translation driver
//!
//! Rewrites console input so that every call to a user command receives the
//! console context as its first argument:
//!
//! ```text
//! foo()               →  foo(ctx,)
//! foo(1, 2)           →  foo(ctx,1, 2)
//! outer(inner())      →  outer(ctx,inner(ctx,))
//! print(greet('x'))   →  print(greet(ctx,'x'))
//! ```
//!
//! Key properties:
//! - PURE: no I/O, no shared state, safe to call from any thread
//! - Every non-builtin call at every nesting depth gets exactly one injection
//! - Edits are collected as byte offsets during discovery and applied in a
//!   single pass over the original text, so identical call text appearing
//!   twice is rewritten at both sites independently
//! - NOT idempotent: translating translated text injects a second argument

use std::collections::BTreeSet;

use tracing::debug;

use crate::builtins::BuiltinTable;
use crate::calls::{CallFinder, Limits};
use crate::config::types::TranslateConfig;
use crate::diagnostics::Diagnostic;
use crate::env_vars::translate_env_vars;
use crate::segment::EscapePolicy;

// =============================================================================
// PUBLIC API
// =============================================================================

/// Translate `input` with the default builtin table and settings
pub fn translate(input: &str, first_parameter: &str) -> String {
    Translator::default().translate(input, first_parameter)
}

/// Result of a translation with everything that was decided along the way
#[derive(Debug, Clone, Default)]
pub struct Translation {
    pub text: String,
    /// Text the calls were discovered in: the input itself, or the input
    /// after `$name` translation when that is enabled
    pub source: String,
    /// Names of the calls that received the context argument, in discovery order
    pub rewritten: Vec<String>,
    /// Names of builtin calls left untouched
    pub skipped_builtins: Vec<String>,
    /// Spans refer to `source`
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Default)]
pub struct Translator {
    builtins: BuiltinTable,
    finder: CallFinder,
    /// Dictionary name for `$name` translation; `None` leaves `$name` alone
    env_container: Option<String>,
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &TranslateConfig) -> Self {
        Self {
            builtins: config.builtin_table(),
            finder: CallFinder::new(config.escapes, config.limits()),
            env_container: config
                .env_vars
                .enabled
                .then(|| config.env_vars.container.clone()),
        }
    }

    pub fn with_builtins(mut self, builtins: BuiltinTable) -> Self {
        self.builtins = builtins;
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.finder.limits = limits;
        self
    }

    pub fn with_escapes(mut self, escapes: EscapePolicy) -> Self {
        self.finder.escapes = escapes;
        self
    }

    pub fn with_env_vars(mut self, container: impl Into<String>) -> Self {
        self.env_container = Some(container.into());
        self
    }

    pub fn builtins(&self) -> &BuiltinTable {
        &self.builtins
    }

    pub fn translate(&self, input: &str, first_parameter: &str) -> String {
        self.translate_with_report(input, first_parameter).text
    }

    pub fn translate_with_report(&self, input: &str, first_parameter: &str) -> Translation {
        let env_translated;
        let source = match &self.env_container {
            Some(container) => {
                env_translated = translate_env_vars(input, container, self.finder.escapes);
                env_translated.as_str()
            }
            None => input,
        };

        let discovery = self.finder.find(source);

        let mut rewritten = Vec::new();
        let mut skipped_builtins = Vec::new();
        let mut insert_at = BTreeSet::new();

        for call in &discovery.calls {
            let name = call.name();
            if self.builtins.is_builtin(name) {
                skipped_builtins.push(name.to_string());
                continue;
            }
            if insert_at.insert(call.open_paren + 1) {
                rewritten.push(name.to_string());
            }
        }

        let text = inject(source, &insert_at, first_parameter);

        debug!(
            rewritten = rewritten.len(),
            builtins = skipped_builtins.len(),
            "translated console input"
        );

        Translation {
            text,
            source: source.to_string(),
            rewritten,
            skipped_builtins,
            diagnostics: discovery.diagnostics,
        }
    }
}

// =============================================================================
// PATCHING
// =============================================================================

/// Insert `first_parameter,` at every offset in one pass over `source`
fn inject(source: &str, offsets: &BTreeSet<usize>, first_parameter: &str) -> String {
    let mut out = String::with_capacity(source.len() + offsets.len() * (first_parameter.len() + 1));
    let mut cursor = 0;
    for &at in offsets {
        out.push_str(&source[cursor..at]);
        out.push_str(first_parameter);
        out.push(',');
        cursor = at;
    }
    out.push_str(&source[cursor..]);
    out
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_simple_injection() {
        assert_eq!(translate("foo()", "ctx"), "foo(ctx,)");
        assert_eq!(translate("foo(1,2)", "ctx"), "foo(ctx,1,2)");
    }

    #[test]
    fn test_builtin_untouched() {
        assert_eq!(translate("print(1,2)", "ctx"), "print(1,2)");
        assert_eq!(translate("len('abc')", "ctx"), "len('abc')");
    }

    #[test]
    fn test_nested_through_builtin() {
        assert_eq!(translate("print(status())", "self"), "print(status(self,))");
        assert_eq!(
            translate("print(len(items('a')))", "self"),
            "print(len(items(self,'a')))"
        );
    }

    #[test]
    fn test_duplicate_call_text() {
        assert_eq!(translate("foo() + foo()", "c"), "foo(c,) + foo(c,)");
        assert_eq!(translate("foo(foo())", "c"), "foo(c,foo(c,))");
    }

    #[test]
    fn test_text_without_calls() {
        assert_eq!(translate("x = 1 + 2", "ctx"), "x = 1 + 2");
        assert_eq!(translate("", "ctx"), "");
    }

    #[test]
    fn test_report() {
        let report = Translator::new().translate_with_report("print(a(), b('x'))", "ctx");
        assert_eq!(report.text, "print(a(ctx,), b(ctx,'x'))");
        assert_eq!(report.rewritten, vec!["a", "b"]);
        assert_eq!(report.skipped_builtins, vec!["print"]);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_custom_builtins() {
        let translator = Translator::new().with_builtins(BuiltinTable::from_names(["help"]));
        assert_eq!(translator.translate("help(print())", "c"), "help(print(c,))");
    }

    #[test]
    fn test_env_vars_before_calls() {
        let translator = Translator::new().with_env_vars("EnV");
        assert_eq!(
            translator.translate("show($name, '$raw')", "self"),
            "show(self,EnV['$name'], '$raw')"
        );
    }

    #[test]
    fn test_env_var_next_to_backslash_keeps_call_rewritten() {
        let translator = Translator::new().with_env_vars("EnV");
        let report = translator.translate_with_report("f($a\\)", "ctx");
        assert_eq!(report.text, "f(ctx,EnV['$a']\\)");
        assert_eq!(report.rewritten, vec!["f"]);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_diagnostics_locate_in_env_translated_source() {
        let translator = Translator::new().with_env_vars("EnV");
        let report = translator.translate_with_report("$v f(", "ctx");
        assert_eq!(report.source, "EnV['$v'] f(");
        assert_eq!(report.text, "EnV['$v'] f(");
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(
            report.diagnostics[0].render(&report.source),
            "1:11: warning: call `f(` is never closed"
        );

        let plain = Translator::new().translate_with_report("x f(", "ctx");
        assert_eq!(plain.source, "x f(");
    }

    #[test]
    fn test_from_config() {
        let config = TranslateConfig::from_yaml_str(
            "builtins: {names: [help]}\nenv_vars: {enabled: true, container: vars}",
        )
        .unwrap();
        let translator = Translator::from_config(&config);
        assert_eq!(translator.translate("help(go($x))", "self"), "help(go(self,vars['$x']))");
    }

    #[test]
    fn test_inject_offsets() {
        let offsets: BTreeSet<usize> = [2, 5].into_iter().collect();
        assert_eq!(inject("a(b(c", &offsets, "X"), "a(X,b(cX,");
    }
}
