pub mod apps;
pub mod git;
pub mod loader;
pub mod validation;
pub mod vscode;

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ConfigError;

/// Default asset folder, both inside the clone and under Documents.
pub const DEFAULT_ASSETS_DIR: &str = "Wallpapers";

/// The whole provisioning configuration, loaded once per run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote configuration repository; empty disables the fetch.
    pub repo_url: String,
    /// Directory names created under Documents, in order.
    pub dirs: Vec<String>,
    /// Chocolatey package names, in install order.
    pub packages: Vec<String>,
    /// Restart without asking once the pipeline succeeds.
    pub unattended: bool,
    /// Asset tree copied out of the clone.
    pub assets: AssetsConfig,
    /// Chocolatey install flags.
    pub chocolatey: ChocolateyConfig,
    /// Git package and global identity.
    pub git: git::GitIdentity,
    /// Editor package, extensions and settings file.
    pub vscode: vscode::EditorConfig,
    /// Application file mappings, processed alphabetically by name.
    pub apps: BTreeMap<String, apps::AppEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repo_url: String::new(),
            dirs: Vec::new(),
            packages: Vec::new(),
            unattended: false,
            assets: AssetsConfig::default(),
            chocolatey: ChocolateyConfig::default(),
            git: git::GitIdentity::default(),
            vscode: vscode::EditorConfig::default(),
            apps: BTreeMap::new(),
        }
    }
}

/// `[assets]` section: the tree copied from the clone into Documents.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory inside the cloned repository.
    pub source: String,
    /// Directory relative to Documents.
    pub destination: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_ASSETS_DIR.to_string(),
            destination: DEFAULT_ASSETS_DIR.to_string(),
        }
    }
}

/// `[chocolatey]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChocolateyConfig {
    /// Pass `--ignore-checksums` to every install.
    pub ignore_checksums: bool,
}

impl Default for ChocolateyConfig {
    fn default() -> Self {
        Self {
            ignore_checksums: true,
        }
    }
}

impl Config {
    /// Load the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable or not valid TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let path = dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        loader::load_config(&path)
    }

    /// Configured packages in order, minus the git and editor packages which
    /// are always installed first.
    #[must_use]
    pub fn remaining_packages(&self) -> Vec<&str> {
        self.packages
            .iter()
            .map(String::as_str)
            .filter(|name| {
                !name.eq_ignore_ascii_case(&self.git.package)
                    && !name.eq_ignore_ascii_case(&self.vscode.package)
            })
            .collect()
    }
}

#[cfg(test)]
pub mod test_helpers {
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Write `content` to `pixie.toml` inside a fresh temporary directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory or file cannot be created.
    #[allow(clippy::expect_used)]
    pub fn write_temp_toml(content: &str) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("pixie.toml");
        std::fs::write(&path, content).expect("write temp config");
        (dir, path)
    }
}
