//! Visual Studio Code configuration.
use serde::Deserialize;

/// Default name of the editor package in the Chocolatey repository.
pub const DEFAULT_PACKAGE: &str = "vscode";

/// Default location of the settings file inside the cloned repository.
pub const DEFAULT_SETTINGS_SOURCE: &str = "Pixie/Apps/Visual Studio Code/settings.json";

/// `[vscode]` section: the editor package, its extensions and settings file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Package name installed right after git.
    pub package: String,
    /// Extension identifiers (e.g. `rust-lang.rust-analyzer`).
    pub extensions: Vec<String>,
    /// Settings file path relative to the cloned repository.
    pub settings_source: String,
    /// Destination of the settings file; may reference environment variables.
    /// Empty skips the settings copy.
    pub settings_path: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            package: DEFAULT_PACKAGE.to_string(),
            extensions: Vec::new(),
            settings_source: DEFAULT_SETTINGS_SOURCE.to_string(),
            settings_path: String::new(),
        }
    }
}
