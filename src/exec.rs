//! External process execution behind an injectable [`Executor`] trait.
use std::path::PathBuf;
use std::process::{Command, Output};

use anyhow::{Context as _, Result, bail};

use crate::environment::ProcessEnv;

/// Result of a command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, when the process exited normally.
    pub code: Option<i32>,
}

impl ExecResult {
    /// Standard output followed by standard error, trimmed.
    #[must_use]
    pub fn combined(&self) -> String {
        let stdout = self.stdout.trim();
        let stderr = self.stderr.trim();
        match (stdout.is_empty(), stderr.is_empty()) {
            (_, true) => stdout.to_string(),
            (true, false) => stderr.to_string(),
            (false, false) => format!("{stdout}\n{stderr}"),
        }
    }
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Runs external programs with an explicit environment overlay.
///
/// Every call receives the [`ProcessEnv`] the pipeline has accumulated so
/// far, so executables installed by earlier steps are found without
/// touching the process-wide environment.
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run a program and fail if it exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned or exits with a
    /// non-zero status; the message carries the exit code and output.
    fn run(&self, program: &str, args: &[&str], env: &ProcessEnv) -> Result<ExecResult>;

    /// Run a program and return its result whatever the exit status.
    ///
    /// # Errors
    ///
    /// Returns an error only if the program cannot be spawned.
    fn run_unchecked(&self, program: &str, args: &[&str], env: &ProcessEnv)
    -> Result<ExecResult>;

    /// Resolve `program` against the `PATH` of `env`.
    fn which(&self, program: &str, env: &ProcessEnv) -> Option<PathBuf>;
}

/// [`Executor`] that spawns real processes.  No timeout is applied.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl SystemExecutor {
    fn command(program: &str, args: &[&str], env: &ProcessEnv) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(args);
        for (key, value) in env.overrides() {
            cmd.env(key, value);
        }
        cmd
    }
}

/// Execute a command and return the result, bailing on non-zero exit.
fn execute_checked(mut cmd: Command, label: &str) -> Result<ExecResult> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to execute: {label}"))?;
    let result = ExecResult::from(output);
    if !result.success {
        bail!(
            "{label} failed (exit {}): {}",
            result.code.unwrap_or(-1),
            result.combined()
        );
    }
    Ok(result)
}

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str], env: &ProcessEnv) -> Result<ExecResult> {
        execute_checked(Self::command(program, args, env), program)
    }

    fn run_unchecked(
        &self,
        program: &str,
        args: &[&str],
        env: &ProcessEnv,
    ) -> Result<ExecResult> {
        let output = Self::command(program, args, env)
            .output()
            .with_context(|| format!("failed to execute: {program}"))?;
        Ok(ExecResult::from(output))
    }

    fn which(&self, program: &str, env: &ProcessEnv) -> Option<PathBuf> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        which::which_in(program, env.get("PATH"), cwd).ok()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn echo_var(env: &ProcessEnv) -> Result<ExecResult> {
        #[cfg(windows)]
        {
            SystemExecutor.run("cmd", &["/C", "echo", "%PIXIE_EXEC_TEST%"], env)
        }
        #[cfg(not(windows))]
        {
            SystemExecutor.run("sh", &["-c", "echo $PIXIE_EXEC_TEST"], env)
        }
    }

    #[test]
    fn run_applies_environment_overlay() {
        let env = ProcessEnv::new().with_var("PIXIE_EXEC_TEST", "from-overlay");
        let result = echo_var(&env).unwrap();
        assert!(result.success);
        assert_eq!(result.stdout.trim(), "from-overlay");
    }

    #[test]
    fn run_failure_reports_exit_code() {
        #[cfg(windows)]
        let result = SystemExecutor.run("cmd", &["/C", "exit", "3"], &ProcessEnv::new());
        #[cfg(not(windows))]
        let result = SystemExecutor.run("sh", &["-c", "exit 3"], &ProcessEnv::new());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("exit 3"), "unexpected error: {err}");
    }

    #[test]
    fn run_unchecked_failure() {
        #[cfg(windows)]
        let result = SystemExecutor
            .run_unchecked("cmd", &["/C", "exit", "1"], &ProcessEnv::new())
            .unwrap();
        #[cfg(not(windows))]
        let result = SystemExecutor
            .run_unchecked("false", &[], &ProcessEnv::new())
            .unwrap();
        assert!(!result.success, "non-zero exit should set success=false");
    }

    #[test]
    fn run_missing_program_is_error() {
        let result = SystemExecutor.run_unchecked(
            "this-program-does-not-exist-12345",
            &[],
            &ProcessEnv::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn which_uses_overlay_path() {
        let dir = tempfile::tempdir().unwrap();
        let env = ProcessEnv::new().with_var("PATH", dir.path().to_string_lossy());
        assert!(SystemExecutor.which("this-program-does-not-exist-12345", &env).is_none());

        #[cfg(windows)]
        assert!(SystemExecutor.which("cmd", &ProcessEnv::new()).is_some());
        #[cfg(not(windows))]
        assert!(SystemExecutor.which("sh", &ProcessEnv::new()).is_some());
    }

    #[test]
    fn combined_joins_streams() {
        let result = ExecResult {
            stdout: "out\n".to_string(),
            stderr: " err ".to_string(),
            success: true,
            code: Some(0),
        };
        assert_eq!(result.combined(), "out\nerr");

        let only_err = ExecResult {
            stdout: String::new(),
            stderr: "err".to_string(),
            success: false,
            code: Some(1),
        };
        assert_eq!(only_err.combined(), "err");
    }
}
