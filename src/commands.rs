//! Command registry and help
//!
//! The execution layer registers the user commands it exposes so the console
//! can list them and show their documentation. A help request names its
//! target either by string or by handle; the two are separate variants rather
//! than a value whose type is inspected at runtime.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::builtins::BuiltinTable;
use crate::calls::CallExpr;
use crate::error::{TranslateError, TranslateResult};

/// A console command as seen by the help system
pub trait Command: Send + Sync {
    fn name(&self) -> &str;

    fn doc(&self) -> Option<&str> {
        None
    }
}

/// Plain name + documentation command description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: String,
    pub doc: Option<String>,
}

impl CommandSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

impl Command for CommandSpec {
    fn name(&self) -> &str {
        &self.name
    }

    fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }
}

/// What a help request is about
#[derive(Clone)]
pub enum HelpTarget {
    /// List every registered command
    All,
    ByName(String),
    ByReference(Arc<dyn Command>),
}

impl fmt::Debug for HelpTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "All"),
            Self::ByName(name) => f.debug_tuple("ByName").field(name).finish(),
            Self::ByReference(cmd) => f.debug_tuple("ByReference").field(&cmd.name()).finish(),
        }
    }
}

impl From<&str> for HelpTarget {
    fn from(name: &str) -> Self {
        if name.is_empty() {
            Self::All
        } else {
            Self::ByName(name.to_string())
        }
    }
}

#[derive(Default, Clone)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Arc<dyn Command>>,
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.commands.keys()).finish()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command, replacing any earlier one with the same name
    pub fn register(&mut self, command: impl Command + 'static) {
        self.commands
            .insert(command.name().to_string(), Arc::new(command));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Command>> {
        self.commands.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Help text for `target`
    pub fn help(&self, target: &HelpTarget) -> TranslateResult<String> {
        match target {
            HelpTarget::All => {
                let mut out = String::from("The following commands are available\n\n");
                for name in self.names() {
                    out.push_str(name);
                    out.push('\n');
                }
                Ok(out)
            }
            HelpTarget::ByName(name) => self
                .get(name)
                .map(|cmd| render_doc(cmd.as_ref()))
                .ok_or_else(|| TranslateError::UnknownCommand(name.clone())),
            HelpTarget::ByReference(cmd) => Ok(render_doc(cmd.as_ref())),
        }
    }

    /// Calls that are neither builtins nor registered commands
    ///
    /// These are still rewritten by the translator; the interpreter will
    /// report them when it runs the text.
    pub fn unknown_calls<'a>(
        &self,
        calls: &[CallExpr<'a>],
        builtins: &BuiltinTable,
    ) -> Vec<CallExpr<'a>> {
        calls
            .iter()
            .filter(|c| !builtins.is_builtin(c.name()) && !self.contains(c.name()))
            .copied()
            .collect()
    }
}

fn render_doc(cmd: &dyn Command) -> String {
    format!("\n\n{}\n\n{}", cmd.name(), cmd.doc().unwrap_or("None"))
}
