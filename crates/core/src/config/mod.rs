//! Configuration loading and validation.
//!
//! The root [`Config`] gathers the per-component config types. Values come
//! from a TOML file overlaid with `SQUISH_`-prefixed environment variables,
//! where `__` separates nesting levels (`SQUISH_LIMITS__MAX_FILES_PER_DAY=20`).

mod loader;
mod types;
mod validate;

pub use loader::{load_config, load_config_from_str, load_config_or_default};
pub use types::*;
pub use validate::validate_config;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
