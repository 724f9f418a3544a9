//! Error types
//!
//! Translation itself never fails (see [`crate::diagnostics`]); these cover
//! the surrounding registry and configuration layers.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("the command '{0}' does not exist")]
    UnknownCommand(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),
}

pub type TranslateResult<T> = Result<T, TranslateError>;
