//! Global git configuration entries.
use std::path::{Path, PathBuf};

use anyhow::Result;

use super::{ResourceState, resolve_program};
use crate::environment::ProcessEnv;
use crate::error::ResourceError;
use crate::exec::Executor;

/// Install locations checked when `git` is not yet on `PATH`.
const GIT_FALLBACKS: &[(&str, &str, &str)] = &[
    ("ProgramFiles", r"C:\Program Files", r"Git\cmd\git.exe"),
    ("ProgramFiles(x86)", r"C:\Program Files (x86)", r"Git\cmd\git.exe"),
];

/// Locate the git executable.
///
/// # Errors
///
/// Returns [`ResourceError::ExecutableNotFound`] if git is neither on `PATH`
/// nor in a standard install location.
pub fn find_git(executor: &dyn Executor, env: &ProcessEnv) -> Result<PathBuf, ResourceError> {
    resolve_program(executor, env, "git", GIT_FALLBACKS)
}

/// A global git config entry resource that can be checked and applied.
#[derive(Debug)]
pub struct GitConfigResource<'a> {
    /// Config key (e.g., "user.name").
    pub key: String,
    /// Desired value.
    pub desired_value: String,
    git: &'a Path,
    executor: &'a dyn Executor,
    env: &'a ProcessEnv,
}

impl<'a> GitConfigResource<'a> {
    /// Create a new git config resource run through the `git` at `git`.
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        desired_value: impl Into<String>,
        git: &'a Path,
        executor: &'a dyn Executor,
        env: &'a ProcessEnv,
    ) -> Self {
        Self {
            key: key.into(),
            desired_value: desired_value.into(),
            git,
            executor,
            env,
        }
    }

    fn program(&self) -> std::borrow::Cow<'_, str> {
        self.git.to_string_lossy()
    }

    /// `key = value`, for log lines.
    #[must_use]
    pub fn description(&self) -> String {
        format!("{} = {}", self.key, self.desired_value)
    }

    /// Write the desired value and return git's combined output.
    ///
    /// # Errors
    ///
    /// Returns an error if git cannot be run or exits non-zero.
    pub fn set(&self) -> Result<String> {
        let result = self.executor.run(
            &self.program(),
            &["config", "--global", &self.key, &self.desired_value],
            self.env,
        )?;
        Ok(result.combined())
    }

    /// Compare the global value with the desired one.
    ///
    /// # Errors
    ///
    /// Returns an error if git cannot be spawned.
    pub fn current_state(&self) -> Result<ResourceState> {
        let result = self.executor.run_unchecked(
            &self.program(),
            &["config", "--global", "--get", &self.key],
            self.env,
        )?;
        let current = result.stdout.trim().to_string();

        if !result.success || current.is_empty() {
            Ok(ResourceState::Missing)
        } else if current == self.desired_value {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect { current })
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::MockExecutor;

    fn resource<'a>(
        executor: &'a MockExecutor,
        env: &'a ProcessEnv,
        git: &'a Path,
    ) -> GitConfigResource<'a> {
        GitConfigResource::new("user.name", "Jane Doe", git, executor, env)
    }

    #[test]
    fn description_format() {
        let executor = MockExecutor::ok("");
        let env = ProcessEnv::new();
        let git = PathBuf::from("git");
        assert_eq!(
            resource(&executor, &env, &git).description(),
            "user.name = Jane Doe"
        );
    }

    #[test]
    fn current_state_correct_when_value_matches() {
        let executor = MockExecutor::ok("Jane Doe\n");
        let env = ProcessEnv::new();
        let git = PathBuf::from("git");
        assert_eq!(
            resource(&executor, &env, &git).current_state().unwrap(),
            ResourceState::Correct
        );
        assert_eq!(executor.calls(), vec!["git config --global --get user.name"]);
    }

    #[test]
    fn current_state_missing_when_command_fails() {
        let executor = MockExecutor::fail();
        let env = ProcessEnv::new();
        let git = PathBuf::from("git");
        assert_eq!(
            resource(&executor, &env, &git).current_state().unwrap(),
            ResourceState::Missing
        );
    }

    #[test]
    fn current_state_incorrect_when_value_differs() {
        let executor = MockExecutor::ok("Someone Else\n");
        let env = ProcessEnv::new();
        let git = PathBuf::from("git");
        let state = resource(&executor, &env, &git).current_state().unwrap();
        assert!(
            matches!(state, ResourceState::Incorrect { ref current } if current == "Someone Else"),
            "expected Incorrect, got {state:?}"
        );
    }

    #[test]
    fn set_runs_resolved_git() {
        let executor = MockExecutor::ok("");
        let env = ProcessEnv::new();
        let git = PathBuf::from("/opt/git/bin/git");
        resource(&executor, &env, &git).set().unwrap();
        assert_eq!(
            executor.calls(),
            vec!["/opt/git/bin/git config --global user.name Jane Doe"]
        );
    }

    #[test]
    fn set_failure_propagates() {
        let executor = MockExecutor::fail();
        let env = ProcessEnv::new();
        let git = PathBuf::from("git");
        assert!(resource(&executor, &env, &git).set().is_err());
    }

    #[test]
    fn find_git_on_path() {
        let executor = MockExecutor::ok("").with_which(true);
        assert_eq!(
            find_git(&executor, &ProcessEnv::new()).unwrap(),
            PathBuf::from("git")
        );
    }

    #[test]
    fn find_git_in_program_files() {
        let dir = tempfile::tempdir().unwrap();
        let git = dir.path().join(r"Git\cmd\git.exe");
        std::fs::create_dir_all(git.parent().unwrap()).unwrap();
        std::fs::write(&git, "").unwrap();

        let executor = MockExecutor::ok("");
        let env = ProcessEnv::new().with_var("ProgramFiles", dir.path().to_string_lossy());
        assert_eq!(find_git(&executor, &env).unwrap(), git);
    }
}
