//! Configuration types
//!
//! ```yaml
//! first_parameter: console
//! escapes: backslash
//! max_depth: 64
//! builtins:
//!   replace: false
//!   names: [help, clear]
//! env_vars:
//!   enabled: true
//!   container: EnV
//! ```

use serde::{Deserialize, Serialize};

use crate::builtins::BuiltinTable;
use crate::calls::{is_name_terminator, Limits};
use crate::env_vars::DEFAULT_CONTAINER;
use crate::error::{TranslateError, TranslateResult};
use crate::segment::EscapePolicy;

/// Context argument used when the configuration names none
pub const DEFAULT_FIRST_PARAMETER: &str = "self";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateConfig {
    /// Expression injected as the first argument of every command call
    pub first_parameter: String,
    pub escapes: EscapePolicy,
    pub max_depth: usize,
    pub builtins: BuiltinsConfig,
    pub env_vars: EnvVarConfig,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            first_parameter: DEFAULT_FIRST_PARAMETER.to_string(),
            escapes: EscapePolicy::default(),
            max_depth: Limits::default().max_depth,
            builtins: BuiltinsConfig::default(),
            env_vars: EnvVarConfig::default(),
        }
    }
}

/// Names exempt from context injection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuiltinsConfig {
    /// Use `names` instead of the default table rather than in addition to it
    pub replace: bool,
    pub names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvVarConfig {
    pub enabled: bool,
    /// Dictionary that `$name` references are looked up in
    pub container: String,
}

impl Default for EnvVarConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            container: DEFAULT_CONTAINER.to_string(),
        }
    }
}

impl TranslateConfig {
    /// Parse and validate YAML configuration text
    pub fn from_yaml_str(content: &str) -> TranslateResult<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TranslateResult<()> {
        if self.first_parameter.trim().is_empty() {
            return Err(TranslateError::InvalidConfig(
                "first_parameter must not be empty".to_string(),
            ));
        }
        if self.first_parameter.contains([',', '(', ')']) {
            return Err(TranslateError::InvalidConfig(format!(
                "first_parameter '{}' must be a single expression",
                self.first_parameter
            )));
        }
        if let Some(bad) = self
            .builtins
            .names
            .iter()
            .find(|n| n.is_empty() || n.contains(['(', ')']) || n.chars().any(is_name_terminator))
        {
            return Err(TranslateError::InvalidConfig(format!(
                "'{}' is not a valid builtin name",
                bad
            )));
        }
        if self.env_vars.enabled && self.env_vars.container.trim().is_empty() {
            return Err(TranslateError::InvalidConfig(
                "env_vars.container must not be empty when env_vars are enabled".to_string(),
            ));
        }
        Ok(())
    }

    pub fn builtin_table(&self) -> BuiltinTable {
        if self.builtins.replace {
            BuiltinTable::from_names(self.builtins.names.iter().cloned())
        } else {
            BuiltinTable::default().with_extra(self.builtins.names.iter().cloned())
        }
    }

    pub fn limits(&self) -> Limits {
        Limits {
            max_depth: self.max_depth,
        }
    }
}
