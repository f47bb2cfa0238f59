//! Visual Studio Code extension resource.
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::Result;

use super::{ResourceState, resolve_program};
use crate::environment::ProcessEnv;
use crate::error::ResourceError;
use crate::exec::{ExecResult, Executor};

/// Install locations checked when `code` is not yet on `PATH`.
const CODE_FALLBACKS: &[(&str, &str, &str)] = &[
    ("ProgramFiles", r"C:\Program Files", r"Microsoft VS Code\bin\code.cmd"),
    ("ProgramFiles(x86)", r"C:\Program Files (x86)", r"Microsoft VS Code\bin\code.cmd"),
    ("LOCALAPPDATA", "", r"Programs\Microsoft VS Code\bin\code.cmd"),
];

/// Locate the editor command line.
///
/// # Errors
///
/// Returns [`ResourceError::ExecutableNotFound`] if `code` is neither on
/// `PATH` nor in a standard install location.
pub fn find_code(executor: &dyn Executor, env: &ProcessEnv) -> Result<PathBuf, ResourceError> {
    resolve_program(executor, env, "code", CODE_FALLBACKS)
}

/// A VS Code extension resource that can be checked and installed.
#[derive(Debug)]
pub struct VsCodeExtensionResource<'a> {
    /// Extension identifier (e.g. "rust-lang.rust-analyzer").
    pub id: String,
    code: &'a Path,
    executor: &'a dyn Executor,
    env: &'a ProcessEnv,
}

impl<'a> VsCodeExtensionResource<'a> {
    /// Create a new extension resource installed through `code`.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        code: &'a Path,
        executor: &'a dyn Executor,
        env: &'a ProcessEnv,
    ) -> Self {
        Self {
            id: id.into(),
            code,
            executor,
            env,
        }
    }

    /// Determine the resource state from a pre-fetched set of installed
    /// extension IDs (see [`installed_extensions`]).
    #[must_use]
    pub fn state_from_installed(&self, installed: &HashSet<String>) -> ResourceState {
        if installed.contains(&self.id.to_lowercase()) {
            ResourceState::Correct
        } else {
            ResourceState::Missing
        }
    }

    /// Install the extension and return the editor's combined output.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::ExtensionInstall`] if the editor cannot be
    /// run or exits non-zero.
    pub fn install(&self) -> Result<String, ResourceError> {
        run_code(
            self.code,
            &["--install-extension", &self.id, "--force"],
            self.executor,
            self.env,
        )
        .and_then(|result| {
            if result.success {
                Ok(result.combined())
            } else {
                anyhow::bail!(
                    "exit {}: {}",
                    result.code.unwrap_or(-1),
                    result.combined()
                )
            }
        })
        .map_err(|e| ResourceError::ExtensionInstall {
            extension: self.id.clone(),
            source: e.into(),
        })
    }
}

/// Query the full set of installed extension IDs in a single command.
///
/// Returns a `HashSet` of **lower-cased** extension IDs; empty when the
/// editor reports an error.
///
/// # Errors
///
/// Returns an error if the editor cannot be run at all.
pub fn installed_extensions(
    code: &Path,
    executor: &dyn Executor,
    env: &ProcessEnv,
) -> Result<HashSet<String>> {
    let result = run_code(code, &["--list-extensions"], executor, env)?;
    let mut set = HashSet::new();
    if result.success {
        for line in result.stdout.lines() {
            let id = line.trim().to_lowercase();
            if !id.is_empty() {
                set.insert(id);
            }
        }
    }
    Ok(set)
}

/// Run the editor CLI.  `.cmd` and `.bat` shims need `cmd /C`.
fn run_code(
    code: &Path,
    args: &[&str],
    executor: &dyn Executor,
    env: &ProcessEnv,
) -> Result<ExecResult> {
    let program = code.to_string_lossy();
    let is_shim = code
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("cmd") || ext.eq_ignore_ascii_case("bat"));

    if is_shim {
        let mut full_args = vec!["/C", &*program];
        full_args.extend(args);
        executor.run_unchecked("cmd", &full_args, env)
    } else {
        executor.run_unchecked(&program, args, env)
    }
}
