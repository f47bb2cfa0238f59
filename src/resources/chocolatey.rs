//! Chocolatey detection and first-time bootstrap.
use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::environment::ProcessEnv;
use crate::exec::Executor;

/// Install location used when `ChocolateyInstall` is not set.
pub const DEFAULT_INSTALL_DIR: &str = r"C:\ProgramData\chocolatey";

/// The official Chocolatey install one-liner.
pub const BOOTSTRAP_SCRIPT: &str = "Set-ExecutionPolicy Bypass -Scope Process -Force; \
[System.Net.ServicePointManager]::SecurityProtocol = \
[System.Net.ServicePointManager]::SecurityProtocol -bor 3072; \
iex ((New-Object System.Net.WebClient).DownloadString('https://community.chocolatey.org/install.ps1'))";

/// Chocolatey's install directory according to `env`.
#[must_use]
pub fn install_dir(env: &ProcessEnv) -> PathBuf {
    env.get("ChocolateyInstall")
        .filter(|dir| !dir.trim().is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_INSTALL_DIR), PathBuf::from)
}

/// Directory holding `choco.exe` and the package shims.
#[must_use]
pub fn bin_dir(env: &ProcessEnv) -> PathBuf {
    install_dir(env).join("bin")
}

/// The package manager itself, present or not.
#[derive(Debug)]
pub struct ChocolateyBootstrap<'a> {
    executor: &'a dyn Executor,
    env: &'a ProcessEnv,
}

impl<'a> ChocolateyBootstrap<'a> {
    /// Create a bootstrap resource that runs commands with `env`.
    #[must_use]
    pub const fn new(executor: &'a dyn Executor, env: &'a ProcessEnv) -> Self {
        Self { executor, env }
    }

    /// Whether `choco` resolves on the threaded `PATH`.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.executor.which("choco", self.env).is_some()
    }

    /// The `choco` executable: the one on `PATH`, or `choco.exe` in the
    /// install directory right after a bootstrap.
    #[must_use]
    pub fn executable(&self) -> PathBuf {
        self.executor
            .which("choco", self.env)
            .unwrap_or_else(|| bin_dir(self.env).join("choco.exe"))
    }

    /// Run the official install script through PowerShell.
    ///
    /// # Errors
    ///
    /// Returns an error if PowerShell cannot be started or the script exits
    /// non-zero.
    pub fn bootstrap(&self) -> Result<String> {
        let result = self
            .executor
            .run(
                "powershell",
                &[
                    "-NoProfile",
                    "-InputFormat",
                    "None",
                    "-ExecutionPolicy",
                    "Bypass",
                    "-Command",
                    BOOTSTRAP_SCRIPT,
                ],
                self.env,
            )
            .context("Chocolatey install script failed")?;
        Ok(result.combined())
    }

    /// Query the installed version with `choco --version`.
    ///
    /// # Errors
    ///
    /// Returns an error if `choco` cannot be run or exits non-zero.
    pub fn version(&self) -> Result<String> {
        let choco = self.executable();
        let result = self
            .executor
            .run(&choco.to_string_lossy(), &["--version"], self.env)
            .context("verifying Chocolatey installation")?;
        Ok(result.stdout.trim().to_string())
    }
}
