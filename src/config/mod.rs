//! Translator configuration
//!
//! YAML configuration types and the loader that finds them.

pub mod loader;
pub mod types;
