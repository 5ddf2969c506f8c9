use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;
use tracing::warn;

use super::{types::Config, ConfigError};

const ENV_PREFIX: &str = "SQUISH_";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Like [`load_config`], but a missing file means built-in defaults
/// (still overridable from the environment).
pub fn load_config_or_default(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        return load_config(path);
    }

    warn!(
        "Config file {} not found, using defaults",
        path.display()
    );
    Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
