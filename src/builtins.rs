//! Builtin exclusion table
//!
//! Calls whose name is in the table are interpreter builtins and never get
//! the context argument. Lookup is exact and case-sensitive. The table is an
//! ordinary value handed to the [`Translator`](crate::Translator), so callers
//! can swap or extend it.

use std::collections::BTreeSet;

/// Builtin function names of the host interpreter
pub const DEFAULT_BUILTINS: &[&str] = &[
    "abs", "all", "any", "ascii", "bin", "bool", "bytearray", "bytes", "callable", "char",
    "classmethod", "compile", "complex", "delattr", "dict", "dir", "divmod", "enumerate", "eval",
    "exec", "filter", "float", "format", "frozenset", "getattr", "globals", "hasattr", "hash",
    "hex", "id", "input", "int", "isinstance", "issubclass", "iter", "len", "list", "locals",
    "map", "max", "memoryview", "min", "next", "object", "oct", "open", "ord", "pow", "print",
    "property", "range", "repr", "reversed", "round", "set", "setattr", "slice", "sorted",
    "staticmethod", "str", "sum", "super", "tuple", "type", "vars", "zip",
];

/// Immutable set of reserved call names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinTable {
    names: BTreeSet<String>,
}

impl Default for BuiltinTable {
    fn default() -> Self {
        Self::from_names(DEFAULT_BUILTINS.iter().copied())
    }
}

impl BuiltinTable {
    /// Table containing exactly `names`
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Empty table: every call is rewritten
    pub fn empty() -> Self {
        Self {
            names: BTreeSet::new(),
        }
    }

    /// Copy of this table with additional names
    pub fn with_extra<I, S>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names = self.names.clone();
        names.extend(extra.into_iter().map(Into::into));
        Self { names }
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
