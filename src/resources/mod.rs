//! Idempotent resource primitives (check + apply pattern).
pub mod chocolatey;
pub mod fs;
pub mod git_config;
pub mod package;
pub mod vscode_extension;

use std::path::PathBuf;

use anyhow::Result;

use crate::environment::ProcessEnv;
use crate::error::ResourceError;
use crate::exec::Executor;

/// Minimal interface for resources that can be described and applied.
///
/// Resources whose state is determined via a single external bulk query (e.g.
/// editor extensions) or that have no cheap state query at all (packages,
/// where the package manager itself is idempotent) implement only this
/// trait.  Resources that can determine their own state implement the
/// richer [`Resource`] super-trait.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Apply the resource change.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be applied due to I/O failures,
    /// a failing external command, invalid paths, or other system errors.
    fn apply(&self) -> Result<ResourceChange>;
}

/// State of a resource (file, git setting, extension, etc.).
///
/// # Examples
///
/// ```
/// use pixie::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let correct = ResourceState::Correct;
/// let wrong = ResourceState::Incorrect { current: "Jane Doe".into() };
///
/// assert_ne!(missing, correct);
/// assert_eq!(correct, ResourceState::Correct);
/// assert_ne!(wrong, ResourceState::Missing);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Resource does not exist or is not present.
    Missing,
    /// Resource exists and matches the desired state.
    Correct,
    /// Resource exists but does not match the desired state.
    Incorrect {
        /// The current value of the resource.
        current: String,
    },
    /// Resource can never be applied (e.g. the destination is a directory).
    Invalid {
        /// Reason why the resource cannot be applied.
        reason: String,
    },
}

/// Result of applying a resource change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was created or updated.
    Applied,
    /// Resource was already correct (no change needed).
    AlreadyCorrect,
}

/// Unified interface for resources that can be checked and applied.
///
/// ```ignore
/// match resource.current_state()? {
///     ResourceState::Missing | ResourceState::Incorrect { .. } => resource.apply()?,
///     _ => ResourceChange::AlreadyCorrect,
/// }
/// ```
pub trait Resource: Applicable {
    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource state cannot be determined.
    fn current_state(&self) -> Result<ResourceState>;
}

/// Check a resource and apply it only when it is missing or wrong.
///
/// # Errors
///
/// Propagates state-check and apply errors.  An [`Invalid`] state is an
/// error ([`ResourceError::InvalidTarget`]): nothing is applied.
///
/// [`Invalid`]: ResourceState::Invalid
pub fn converge(resource: &dyn Resource) -> Result<ResourceChange> {
    match resource.current_state()? {
        ResourceState::Correct => Ok(ResourceChange::AlreadyCorrect),
        ResourceState::Invalid { reason } => Err(ResourceError::InvalidTarget {
            resource: resource.description(),
            reason,
        }
        .into()),
        ResourceState::Missing | ResourceState::Incorrect { .. } => resource.apply(),
    }
}

/// Resolve `program` on the `PATH` of `env`, falling back to well-known
/// install locations.
///
/// Each fallback is a `(variable, default, relative path)` triple: the base
/// directory is read from `env` and defaults to `default` when unset.
///
/// # Errors
///
/// Returns [`ResourceError::ExecutableNotFound`] when nothing matches.
pub fn resolve_program(
    executor: &dyn Executor,
    env: &ProcessEnv,
    program: &str,
    fallbacks: &[(&str, &str, &str)],
) -> Result<PathBuf, ResourceError> {
    if let Some(path) = executor.which(program, env) {
        return Ok(path);
    }
    fallbacks
        .iter()
        .filter_map(|(var, default, relative)| {
            let base = env
                .get(var)
                .filter(|v| !v.is_empty())
                .or_else(|| (!default.is_empty()).then(|| (*default).to_string()))?;
            Some(PathBuf::from(base).join(relative))
        })
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| ResourceError::ExecutableNotFound(program.to_string()))
}
