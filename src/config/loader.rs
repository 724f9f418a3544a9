//! Configuration loader
//!
//! Finds and loads the YAML translator configuration.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use super::types::TranslateConfig;

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "CONSOLE_TRANSLATE_CONFIG";

/// Configuration file looked for in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "console-translate.yaml";

pub struct ConfigLoader {
    path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Loader that always yields the default configuration
    pub fn defaults() -> Self {
        Self { path: None }
    }

    /// Create loader from CONSOLE_TRANSLATE_CONFIG or the working directory
    ///
    /// Path resolution order:
    /// 1. CONSOLE_TRANSLATE_CONFIG environment variable (explicit override)
    /// 2. `console-translate.yaml` in the working directory
    /// 3. Built-in defaults
    pub fn from_env() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Self::new(path);
            }
        }

        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::new(DEFAULT_CONFIG_FILE);
        }

        Self::defaults()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Load and validate the configuration
    pub fn load(&self) -> Result<TranslateConfig> {
        let Some(path) = &self.path else {
            info!("No translator configuration file, using defaults");
            return Ok(TranslateConfig::default());
        };

        info!("Loading translator configuration from {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config = TranslateConfig::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        info!(
            "Loaded configuration: first parameter '{}', {} extra builtins, env vars {}",
            config.first_parameter,
            config.builtins.names.len(),
            if config.env_vars.enabled { "on" } else { "off" }
        );

        Ok(config)
    }
}
