//! Cloning the remote configuration repository.
use std::path::Path;

use anyhow::{Context as _, Result};
use tempfile::TempDir;

/// Prefix of the temporary directory holding the clone.
pub const CLONE_DIR_PREFIX: &str = "configs";

/// Clones a remote repository into a local directory.
#[cfg_attr(test, mockall::automock)]
pub trait RepoCloner: Send + Sync {
    /// Clone `url` into the existing, empty directory `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be fetched.
    fn clone_into(&self, url: &str, dest: &Path) -> Result<()>;
}

/// [`RepoCloner`] backed by libgit2.  No progress output is produced.
#[derive(Debug, Default, Clone, Copy)]
pub struct Git2Cloner;

impl RepoCloner for Git2Cloner {
    fn clone_into(&self, url: &str, dest: &Path) -> Result<()> {
        git2::build::RepoBuilder::new()
            .clone(url, dest)
            .with_context(|| format!("cloning {url}"))?;
        Ok(())
    }
}

/// Clone `url` into a fresh temporary directory.
///
/// The directory is removed when the returned [`TempDir`] is dropped.  On
/// failure it is removed before the error is returned.
///
/// # Errors
///
/// Returns an error if the temporary directory cannot be created or the
/// clone fails.
pub fn clone_to_temp(cloner: &dyn RepoCloner, url: &str) -> Result<TempDir> {
    let dir = tempfile::Builder::new()
        .prefix(CLONE_DIR_PREFIX)
        .tempdir()
        .context("creating temporary clone directory")?;
    cloner.clone_into(url, dir.path())?;
    Ok(dir)
}
