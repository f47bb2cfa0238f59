//! Domain-specific error types for the provisioning engine.
//!
//! Internal modules return [`anyhow::Error`] enriched with step context, and
//! produce the typed errors below where a caller (or a test) needs to tell
//! failures apart.  The pipeline orchestrator turns a fatal step failure into
//! a [`StepError`] which names the step that aborted the run.
//!
//! # Error hierarchy
//!
//! ```text
//! StepError                    fatal pipeline abort, names the step
//! ConfigError                  configuration file I/O and parsing
//! PlatformError                wrong OS, missing administrative rights
//! ResourceError                packages, extensions, copies, expansion
//! ```

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// How the orchestrator treats a failure of a pipeline step.
///
/// # Examples
///
/// ```
/// use pixie::error::Severity;
///
/// assert!(Severity::Fatal.is_fatal());
/// assert!(!Severity::Soft.is_fatal());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Abort the whole run after cleanup.
    Fatal,
    /// Log the failure and continue with the next step.
    Soft,
}

impl Severity {
    /// Returns `true` for [`Severity::Fatal`].
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        matches!(self, Self::Fatal)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fatal => write!(f, "fatal"),
            Self::Soft => write!(f, "soft"),
        }
    }
}

/// A fatal failure of a named pipeline step.
#[derive(Error, Debug)]
#[error("{step} failed: {message}")]
pub struct StepError {
    /// Name of the step that failed.
    pub step: String,
    /// Rendered cause chain.
    pub message: String,
    /// Underlying error.
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl StepError {
    /// Wrap `source` as the failure of `step`.
    #[must_use]
    pub fn new(step: impl Into<String>, source: anyhow::Error) -> Self {
        Self {
            step: step.into(),
            message: format!("{source:#}"),
            source: source.into(),
        }
    }
}

/// Errors that arise from loading the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The configuration file could not be read.
    #[error("failed to read configuration file {}: {source}", .path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for the expected schema.
    #[error("invalid configuration in {}: {message}", .path.display())]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },
}

/// Errors that arise from platform preconditions.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PlatformError {
    /// The requested operation is not supported on the current platform.
    #[error("this operation is only supported on Windows (running on {platform})")]
    Unsupported {
        /// Name of the platform the process is running on.
        platform: String,
    },

    /// The process lacks administrative rights.
    #[error("administrator privileges are required; re-run from an elevated prompt")]
    NotElevated,
}

/// Errors that arise from resource operations.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// A path expected to be a regular file is something else.
    #[error("{} is not a regular file", .0.display())]
    NotRegularFile(PathBuf),

    /// A source file or directory does not exist.
    #[error("source not found: {}", .0.display())]
    SourceMissing(PathBuf),

    /// An executable could not be resolved on PATH or at a known location.
    #[error("{0} executable not found")]
    ExecutableNotFound(String),

    /// A package installation failed.
    #[error("failed to install package '{package}'")]
    PackageInstall {
        /// Name of the package that could not be installed.
        package: String,
        /// Underlying error from the package manager.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An editor extension installation failed.
    #[error("failed to install extension '{extension}'")]
    ExtensionInstall {
        /// Identifier of the extension.
        extension: String,
        /// Underlying error from the editor CLI.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The target of a resource is in a state no apply can fix, such as a
    /// directory where a file should be written.
    #[error("cannot apply {resource}: {reason}")]
    InvalidTarget {
        /// Description of the resource.
        resource: String,
        /// Why the target is unusable.
        reason: String,
    },

    /// A path referenced an environment variable that is not set.
    #[error("cannot expand '{input}': environment variable {var} is not set")]
    UnknownVariable {
        /// The path as written in the configuration.
        input: String,
        /// The variable that could not be resolved.
        var: String,
    },
}
