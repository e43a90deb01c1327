use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::{Path, PathBuf};

use super::{types::Config, ConfigError};

/// Environment variable prefix; nested keys use `__` (e.g. `MAGNETIZE_SEARCH__ROWS`).
pub const ENV_PREFIX: &str = "MAGNETIZE_";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    extract(base().merge(Toml::file(path)))
}

/// Load the explicit `path`, or the default location when it exists, or
/// fall back to defaults. Environment overrides apply in every case.
pub fn load_config_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = path {
        return load_config(path);
    }

    match default_config_path() {
        Some(default) if default.exists() => load_config(&default),
        _ => extract(base()),
    }
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// `$XDG_CONFIG_HOME/magnetize/config.toml`, or `~/.config/magnetize/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("magnetize").join("config.toml"))
}

fn base() -> Figment {
    Figment::from(Serialized::defaults(Config::default()))
}

fn extract(figment: Figment) -> Result<Config, ConfigError> {
    figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}
