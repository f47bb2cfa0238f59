//! Operating system detection, privilege checks and well-known folders.
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};

use crate::environment::ProcessEnv;
use crate::error::PlatformError;
use crate::exec::Executor;

/// Detected operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    /// Microsoft Windows.
    Windows,
    /// Linux.
    Linux,
    /// macOS.
    MacOs,
    /// Any other operating system.
    Other,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Windows => write!(f, "windows"),
            Self::Linux => write!(f, "linux"),
            Self::MacOs => write!(f, "macos"),
            Self::Other => write!(f, "{}", std::env::consts::OS),
        }
    }
}

/// Platform information for the current system.
#[derive(Debug, Clone)]
pub struct Platform {
    /// Operating system the process runs on.
    pub os: Os,
}

impl Platform {
    /// Detect the current platform.
    #[must_use]
    pub const fn detect() -> Self {
        let os = if cfg!(target_os = "windows") {
            Os::Windows
        } else if cfg!(target_os = "linux") {
            Os::Linux
        } else if cfg!(target_os = "macos") {
            Os::MacOs
        } else {
            Os::Other
        };
        Self { os }
    }

    /// Create a platform with an explicit OS.
    #[must_use]
    pub const fn new(os: Os) -> Self {
        Self { os }
    }

    /// Whether this is Windows.
    #[must_use]
    pub fn is_windows(&self) -> bool {
        self.os == Os::Windows
    }

    /// Fail unless running on Windows.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Unsupported`] on any other OS.
    pub fn require_windows(&self) -> Result<(), PlatformError> {
        if self.is_windows() {
            Ok(())
        } else {
            Err(PlatformError::Unsupported {
                platform: self.os.to_string(),
            })
        }
    }
}

/// Whether the process holds administrative rights.
///
/// `net session` only succeeds for members of the local Administrators group
/// running elevated.
#[must_use]
pub fn is_elevated(executor: &dyn Executor, env: &ProcessEnv) -> bool {
    executor
        .run_unchecked("net", &["session"], env)
        .is_ok_and(|result| result.success)
}

/// The user's documents folder, or `override_dir` when given.
///
/// # Errors
///
/// Returns an error if neither `USERPROFILE` nor `HOME` is set.
pub fn documents_dir(override_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = override_dir {
        return Ok(dir.to_path_buf());
    }
    let home = std::env::var("USERPROFILE")
        .or_else(|_| std::env::var("HOME"))
        .map_err(|_| anyhow!("neither USERPROFILE nor HOME environment variable is set"))?;
    Ok(PathBuf::from(home).join("Documents"))
}
