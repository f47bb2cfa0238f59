//! TOML configuration file parsing.
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::ConfigError;

/// Deserialize the TOML file at `path` into `T`.
///
/// Unknown keys are ignored by the target types; missing keys fall back to
/// their defaults.
///
/// # Errors
///
/// Returns [`ConfigError::NotFound`] if the file does not exist,
/// [`ConfigError::Io`] if it cannot be read and [`ConfigError::Parse`] if it
/// is not valid TOML for `T`.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config(&content).map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

/// Deserialize TOML text into `T`, rendering parser diagnostics as a string.
///
/// # Errors
///
/// Returns the parser diagnostic if `content` is not valid TOML for `T`.
pub fn parse_config<T: DeserializeOwned>(content: &str) -> Result<T, String> {
    toml::from_str(content).map_err(|e| e.to_string().trim_end().to_string())
}
