//! Environment variable translation
//!
//! Console variables are written with a `$` prefix and live in a dictionary
//! in the interpreter's namespace. References outside quoted literals are
//! turned into lookups in that dictionary:
//!
//! ```text
//! $Hallo = $No and '$Hallo'  →  EnV['$Hallo'] = EnV['$No'] and '$Hallo'
//! ```
//!
//! Disabled unless enabled in [`EnvVarConfig`](crate::EnvVarConfig).

use std::sync::LazyLock;

use regex::Regex;

use crate::segment::{split_segments, EscapePolicy, Span};

/// Default name of the variable dictionary in the interpreter namespace
pub const DEFAULT_CONTAINER: &str = "EnV";

static ENV_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\$[^'".,()\-+\s=;:\\]+"#).unwrap());

/// A `$name` reference outside any literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvVarRef<'a> {
    /// The reference including its `$`
    pub name: &'a str,
    pub span: Span,
}

/// Every variable reference outside quoted literals, left to right
pub fn find_env_vars(text: &str, escapes: EscapePolicy) -> Vec<EnvVarRef<'_>> {
    split_segments(text, escapes)
        .into_iter()
        .filter(|seg| seg.is_code())
        .flat_map(|seg| {
            ENV_VAR_RE.find_iter(seg.text).map(move |m| EnvVarRef {
                name: m.as_str(),
                span: Span::new(m.start(), m.end()).offset(seg.span.start),
            })
        })
        .collect()
}

/// Replace every `$name` outside literals with `container['$name']`
pub fn translate_env_vars(text: &str, container: &str, escapes: EscapePolicy) -> String {
    let refs = find_env_vars(text, escapes);
    if refs.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() + refs.len() * (container.len() + 4));
    let mut cursor = 0;
    for var in &refs {
        out.push_str(&text[cursor..var.span.start]);
        out.push_str(container);
        out.push_str("['");
        out.push_str(var.name);
        out.push_str("']");
        cursor = var.span.end;
    }
    out.push_str(&text[cursor..]);

    tracing::debug!(count = refs.len(), "translated environment variable references");
    out
}
