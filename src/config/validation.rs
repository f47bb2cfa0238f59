//! Configuration validation.
//!
//! Validators never fail loading; they return warnings that `install` logs
//! and `check` reports.
use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path};

use super::Config;
use super::apps::AppEntry;
use super::git::GitIdentity;
use super::vscode::EditorConfig;

/// A validation warning detected in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// Configuration section (e.g. "packages", "apps.Alacritty").
    pub source: String,
    /// The specific item that triggered the warning.
    pub item: String,
    /// Human-readable warning message.
    pub message: String,
}

impl ValidationWarning {
    /// Create a warning for `item` in configuration section `source`.
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        item: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            item: item.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.item.is_empty() {
            write!(f, "[{}] {}", self.source, self.message)
        } else {
            write!(f, "[{}] {}: {}", self.source, self.item, self.message)
        }
    }
}

/// Trait for configuration validators.
pub trait ConfigValidator {
    /// Validate the configuration and return any warnings found.
    fn validate(&self) -> Vec<ValidationWarning>;

    /// Return the configuration section this validator covers.
    fn name(&self) -> &'static str;
}

/// Whether `path` is absolute or climbs out of its base with `..`.
fn escapes_base(path: &str) -> bool {
    let p = Path::new(path);
    p.is_absolute()
        || path.starts_with('/')
        || path.starts_with('\\')
        || path.get(1..2) == Some(":")
        || p.components().any(|c| matches!(c, Component::ParentDir))
        || path.split(['/', '\\']).any(|part| part == "..")
}

/// Validator for the package list.
#[derive(Debug)]
pub struct PackageValidator<'a> {
    packages: &'a [String],
}

impl<'a> PackageValidator<'a> {
    #[must_use]
    pub const fn new(packages: &'a [String]) -> Self {
        Self { packages }
    }
}

impl ConfigValidator for PackageValidator<'_> {
    fn validate(&self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();

        for package in self.packages {
            if package.trim().is_empty() {
                warnings.push(ValidationWarning::new(
                    self.name(),
                    package,
                    "package name is empty",
                ));
                continue;
            }
            if !seen.insert(package.to_ascii_lowercase()) {
                warnings.push(ValidationWarning::new(
                    self.name(),
                    package,
                    "package is listed more than once",
                ));
            }
        }

        warnings
    }

    fn name(&self) -> &'static str {
        "packages"
    }
}

/// Validator for the directories created under Documents.
#[derive(Debug)]
pub struct DirectoryValidator<'a> {
    dirs: &'a [String],
}

impl<'a> DirectoryValidator<'a> {
    #[must_use]
    pub const fn new(dirs: &'a [String]) -> Self {
        Self { dirs }
    }
}

impl ConfigValidator for DirectoryValidator<'_> {
    fn validate(&self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        for dir in self.dirs {
            if dir.trim().is_empty() {
                warnings.push(ValidationWarning::new(
                    self.name(),
                    dir,
                    "directory name is empty",
                ));
            } else if escapes_base(dir) {
                warnings.push(ValidationWarning::new(
                    self.name(),
                    dir,
                    "directory should be relative to the Documents folder",
                ));
            }
        }

        warnings
    }

    fn name(&self) -> &'static str {
        "dirs"
    }
}

/// Validator for the repository URL.
#[derive(Debug)]
pub struct RepositoryValidator<'a> {
    url: &'a str,
}

impl<'a> RepositoryValidator<'a> {
    #[must_use]
    pub const fn new(url: &'a str) -> Self {
        Self { url }
    }
}

impl ConfigValidator for RepositoryValidator<'_> {
    fn validate(&self) -> Vec<ValidationWarning> {
        if self.url.trim().is_empty() {
            vec![ValidationWarning::new(
                self.name(),
                "",
                "no repository URL configured; assets and application files will be skipped",
            )]
        } else {
            Vec::new()
        }
    }

    fn name(&self) -> &'static str {
        "repo_url"
    }
}

/// Validator for the git identity.
#[derive(Debug)]
pub struct GitIdentityValidator<'a> {
    identity: &'a GitIdentity,
}

impl<'a> GitIdentityValidator<'a> {
    #[must_use]
    pub const fn new(identity: &'a GitIdentity) -> Self {
        Self { identity }
    }
}

impl ConfigValidator for GitIdentityValidator<'_> {
    fn validate(&self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let name = self.identity.user_name.trim();
        let email = self.identity.user_email.trim();

        if name.is_empty() != email.is_empty() {
            let missing = if name.is_empty() { "user_name" } else { "user_email" };
            warnings.push(ValidationWarning::new(
                self.name(),
                missing,
                "only half of the git identity is configured",
            ));
        }

        if !email.is_empty() && !email.contains('@') {
            warnings.push(ValidationWarning::new(
                self.name(),
                email,
                "email address should contain '@'",
            ));
        }

        warnings
    }

    fn name(&self) -> &'static str {
        "git"
    }
}

/// Validator for the editor section.
#[derive(Debug)]
pub struct EditorValidator<'a> {
    editor: &'a EditorConfig,
}

impl<'a> EditorValidator<'a> {
    #[must_use]
    pub const fn new(editor: &'a EditorConfig) -> Self {
        Self { editor }
    }
}

impl ConfigValidator for EditorValidator<'_> {
    fn validate(&self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        for extension in &self.editor.extensions {
            if extension.trim().is_empty() {
                warnings.push(ValidationWarning::new(
                    self.name(),
                    extension,
                    "extension ID is empty",
                ));
            }
        }

        if !self.editor.extensions.is_empty() && self.editor.settings_path.trim().is_empty() {
            warnings.push(ValidationWarning::new(
                self.name(),
                "settings_path",
                "extensions are configured but no settings path is set; settings will not be copied",
            ));
        }

        warnings
    }

    fn name(&self) -> &'static str {
        "vscode"
    }
}

/// Validator for application file mappings.
#[derive(Debug)]
pub struct AppValidator<'a> {
    apps: &'a std::collections::BTreeMap<String, AppEntry>,
}

impl<'a> AppValidator<'a> {
    #[must_use]
    pub const fn new(apps: &'a std::collections::BTreeMap<String, AppEntry>) -> Self {
        Self { apps }
    }
}

impl ConfigValidator for AppValidator<'_> {
    fn validate(&self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        for (name, app) in self.apps {
            let source = format!("apps.{name}");

            if app.source.trim().is_empty() {
                warnings.push(ValidationWarning::new(&source, "source", "source is empty"));
            } else if escapes_base(&app.source) {
                warnings.push(ValidationWarning::new(
                    &source,
                    &app.source,
                    "source should be relative to the repository root",
                ));
            }

            if app.destination.trim().is_empty() {
                warnings.push(ValidationWarning::new(
                    &source,
                    "destination",
                    "destination is empty",
                ));
            }
        }

        warnings
    }

    fn name(&self) -> &'static str {
        "apps"
    }
}

/// Validate all configuration and return collected warnings.
#[must_use]
pub fn validate_all(config: &Config) -> Vec<ValidationWarning> {
    let validators: Vec<Box<dyn ConfigValidator + '_>> = vec![
        Box::new(RepositoryValidator::new(&config.repo_url)),
        Box::new(DirectoryValidator::new(&config.dirs)),
        Box::new(PackageValidator::new(&config.packages)),
        Box::new(GitIdentityValidator::new(&config.git)),
        Box::new(EditorValidator::new(&config.vscode)),
        Box::new(AppValidator::new(&config.apps)),
    ];

    validators.iter().flat_map(|v| v.validate()).collect()
}
