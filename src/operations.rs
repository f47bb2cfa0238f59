//! Filesystem operation abstractions for dependency injection.
//!
//! Provides the [`FileSystemOps`] trait so that the startup-folder cleanup
//! can be unit-tested without touching real auto-start folders.  Production
//! code uses [`SystemFileSystemOps`]; tests use `MockFileSystemOps`.

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Abstraction over the directory listings and removals used by tasks.
pub trait FileSystemOps: Send + Sync + std::fmt::Debug {
    /// Returns the immediate child paths inside `path`, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` cannot be opened or read as a directory.
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Remove the file, link or directory (with its contents) at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails.
    fn remove(&self, path: &Path) -> std::io::Result<()>;
}

/// Production [`FileSystemOps`] implementation that delegates to [`std::fs`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemFileSystemOps;

impl FileSystemOps for SystemFileSystemOps {
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = std::fs::read_dir(path)?
            .map(|e| e.map(|entry| entry.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();
        Ok(entries)
    }

    fn remove(&self, path: &Path) -> std::io::Result<()> {
        let meta = std::fs::symlink_metadata(path)?;
        if meta.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        }
    }
}

/// Mock [`FileSystemOps`] for unit tests.
///
/// Configure directory listings and paths whose removal should fail, then
/// inspect [`removed`](Self::removed) afterwards.
///
/// ```ignore
/// let fs = MockFileSystemOps::new()
///     .with_dir_entries("/startup", vec![PathBuf::from("/startup/app.lnk")])
///     .with_failing_remove("/startup/locked.lnk");
/// ```
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockFileSystemOps {
    dirs: std::collections::HashMap<PathBuf, Vec<PathBuf>>,
    failing_removals: Vec<PathBuf>,
    removed: std::sync::Mutex<Vec<PathBuf>>,
}

#[cfg(test)]
impl MockFileSystemOps {
    /// Create an empty mock with nothing configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entries returned by [`FileSystemOps::read_dir`] for `dir`.
    #[must_use]
    pub fn with_dir_entries(mut self, dir: impl Into<PathBuf>, entries: Vec<PathBuf>) -> Self {
        self.dirs.insert(dir.into(), entries);
        self
    }

    /// Make [`FileSystemOps::remove`] fail for `path`.
    #[must_use]
    pub fn with_failing_remove(mut self, path: impl Into<PathBuf>) -> Self {
        self.failing_removals.push(path.into());
        self
    }

    /// Paths removed so far, in order.
    #[must_use]
    pub fn removed(&self) -> Vec<PathBuf> {
        self.removed
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
impl FileSystemOps for MockFileSystemOps {
    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        self.dirs
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("mock: no entries configured for {}", path.display()))
    }

    fn remove(&self, path: &Path) -> std::io::Result<()> {
        if self.failing_removals.iter().any(|p| p == path) {
            return Err(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        }
        self.removed
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(path.to_path_buf());
        Ok(())
    }
}
