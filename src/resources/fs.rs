//! File copy resources and the recursive tree copy.
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use sha2::{Digest, Sha256};

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::ResourceError;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Lowercase hex SHA-256 digest of the file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn file_digest(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let digest = Sha256::digest(&bytes);
    let mut hex = String::with_capacity(64);
    for b in &digest {
        write!(hex, "{b:02x}").unwrap_or(());
    }
    Ok(hex)
}

/// Recursively copy the tree at `src` into `dst`, preserving relative paths.
///
/// Entries are visited in name order and symlinks are followed.  The first
/// failure aborts the copy; files copied before it stay in place.  Every
/// copied destination file is passed to `on_file`.  Returns the number of
/// files copied.
///
/// # Errors
///
/// Returns an error if `src` is missing, an entry is neither a directory nor
/// a regular file, or any read, create or copy fails.
pub fn copy_tree(src: &Path, dst: &Path, on_file: &mut dyn FnMut(&Path)) -> Result<usize> {
    if !src.is_dir() {
        return Err(ResourceError::SourceMissing(src.to_path_buf()).into());
    }
    std::fs::create_dir_all(dst)
        .with_context(|| format!("creating directory {}", dst.display()))?;

    let mut entries = std::fs::read_dir(src)
        .with_context(|| format!("reading directory {}", src.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<PathBuf>>>()
        .with_context(|| format!("reading entry in {}", src.display()))?;
    entries.sort();

    let mut copied = 0;
    for src_path in entries {
        let Some(name) = src_path.file_name() else {
            continue;
        };
        let dst_path = dst.join(name);
        let meta = std::fs::metadata(&src_path)
            .with_context(|| format!("stat {}", src_path.display()))?;

        if meta.is_dir() {
            copied += copy_tree(&src_path, &dst_path, on_file)?;
        } else if meta.is_file() {
            std::fs::copy(&src_path, &dst_path).with_context(|| {
                format!("copying {} to {}", src_path.display(), dst_path.display())
            })?;
            on_file(&dst_path);
            copied += 1;
        } else {
            return Err(ResourceError::NotRegularFile(src_path).into());
        }
    }
    Ok(copied)
}

/// A single file copied from the cloned repository to its destination.
#[derive(Debug, Clone)]
pub struct FileCopyResource {
    /// File to copy.
    pub source: PathBuf,
    /// Where it should end up.
    pub destination: PathBuf,
}

impl FileCopyResource {
    /// Create a new file copy resource.
    #[must_use]
    pub const fn new(source: PathBuf, destination: PathBuf) -> Self {
        Self {
            source,
            destination,
        }
    }

    fn check_source(&self) -> Result<(), ResourceError> {
        if !self.source.exists() {
            return Err(ResourceError::SourceMissing(self.source.clone()));
        }
        if !self.source.is_file() {
            return Err(ResourceError::NotRegularFile(self.source.clone()));
        }
        Ok(())
    }
}

impl Applicable for FileCopyResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.source.display(), self.destination.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        self.check_source()?;
        ensure_parent_dir(&self.destination)?;
        std::fs::copy(&self.source, &self.destination).with_context(|| {
            format!(
                "copying {} to {}",
                self.source.display(),
                self.destination.display()
            )
        })?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for FileCopyResource {
    fn current_state(&self) -> Result<ResourceState> {
        self.check_source()?;
        if !self.destination.exists() {
            return Ok(ResourceState::Missing);
        }
        if self.destination.is_dir() {
            return Ok(ResourceState::Invalid {
                reason: format!("{} is a directory", self.destination.display()),
            });
        }
        if file_digest(&self.source)? == file_digest(&self.destination)? {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: "content differs".to_string(),
            })
        }
    }
}
