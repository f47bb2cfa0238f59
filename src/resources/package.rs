//! Chocolatey package installation resource.
use std::path::Path;

use crate::environment::ProcessEnv;
use crate::error::ResourceError;
use crate::exec::Executor;

/// Phrases Chocolatey prints when a package ends up installed.
const SUCCESS_PHRASES: &[&str] = &["has been installed", "has been upgraded", "already installed"];

/// How confidently an install can be reported as successful.
///
/// The exit status decides success or failure; this only reflects whether
/// the output also confirmed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Chocolatey printed one of its success phrases.
    Confirmed,
    /// Exit status was zero but no success phrase was found.
    Ambiguous,
}

/// What a successful `choco install` reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Whether the output confirmed the install.
    pub outcome: InstallOutcome,
    /// Combined stdout and stderr.
    pub output: String,
}

/// A Chocolatey package installed with `choco install`.
///
/// Chocolatey is idempotent on its own, so there is no separate state query:
/// installing an already present package reports `already installed`.
#[derive(Debug)]
pub struct ChocolateyPackage<'a> {
    /// Package name.
    pub name: String,
    /// Pass `--ignore-checksums`.
    pub ignore_checksums: bool,
    choco: &'a Path,
    executor: &'a dyn Executor,
    env: &'a ProcessEnv,
}

impl<'a> ChocolateyPackage<'a> {
    /// Create a package resource installed through the `choco` at `choco`.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        choco: &'a Path,
        executor: &'a dyn Executor,
        env: &'a ProcessEnv,
    ) -> Self {
        Self {
            name: name.into(),
            ignore_checksums: true,
            choco,
            executor,
            env,
        }
    }

    /// Builder: toggle `--ignore-checksums`.
    #[must_use]
    pub fn ignore_checksums(mut self, ignore: bool) -> Self {
        self.ignore_checksums = ignore;
        self
    }

    /// Arguments passed to `choco`.
    #[must_use]
    pub fn install_args(&self) -> Vec<&str> {
        let mut args = vec!["install", self.name.as_str(), "-y", "--no-progress"];
        if self.ignore_checksums {
            args.push("--ignore-checksums");
        }
        args
    }

    /// Install the package.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::PackageInstall`] if `choco` cannot be run or
    /// exits non-zero.
    pub fn install(&self) -> Result<InstallReport, ResourceError> {
        let env = self
            .env
            .clone()
            .with_var("ChocolateyIgnoreRebootDetected", "true");
        let program = self.choco.to_string_lossy();
        let result = self
            .executor
            .run(&program, &self.install_args(), &env)
            .map_err(|e| ResourceError::PackageInstall {
                package: self.name.clone(),
                source: e.into(),
            })?;
        let output = result.combined();
        Ok(InstallReport {
            outcome: classify_output(&output),
            output,
        })
    }
}

/// Look for a Chocolatey success phrase in `output`.
#[must_use]
pub fn classify_output(output: &str) -> InstallOutcome {
    let lower = output.to_lowercase();
    if SUCCESS_PHRASES.iter().any(|phrase| lower.contains(phrase)) {
        InstallOutcome::Confirmed
    } else {
        InstallOutcome::Ambiguous
    }
}
