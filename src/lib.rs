//! console-translate: context injection for interactive console expressions
//!
//! A console user types expressions in the host scripting language. Before
//! the text is handed to the interpreter, every call to a user-defined command
//! is rewritten so it receives one extra leading argument (the executing
//! console context). Calls to interpreter builtins and anything inside quoted
//! literals are left untouched.
//!
//! This crate contains the pure rewriting logic with NO interpreter or UI
//! dependencies:
//! - Quote-aware segment splitter (nom-based)
//! - Bracket-balance call finder with nested discovery
//! - Builtin exclusion table
//! - Translation driver with single-pass offset patching
//! - Optional `$name` environment variable translation
//! - Command registry and help rendering
//! - YAML configuration types and loader
//!
//! ```
//! use console_translate::translate;
//!
//! assert_eq!(translate("outer(inner())", "ctx"), "outer(ctx,inner(ctx,))");
//! assert_eq!(translate("print(greet('x'))", "ctx"), "print(greet(ctx,'x'))");
//! ```
//!
//! Translation is NOT idempotent: translating already-translated text injects
//! the context argument a second time.

pub mod builtins;
pub mod calls;
pub mod commands;
pub mod config;
pub mod diagnostics;
pub mod env_vars;
pub mod error;
pub mod segment;
pub mod translate;

// Re-export commonly used types
pub use builtins::BuiltinTable;
pub use calls::{command_name, command_names, find_calls, CallExpr, CallFinder, Discovery, Limits};
pub use commands::{Command, CommandRegistry, CommandSpec, HelpTarget};
pub use config::loader::ConfigLoader;
pub use config::types::*;
pub use diagnostics::{Diagnostic, DiagnosticCode, Severity, SourceSpan};
pub use error::TranslateError;
pub use segment::{split_segments, EscapePolicy, Segment, SegmentKind, Span};
pub use translate::{translate, Translation, Translator};
