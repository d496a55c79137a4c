//! The source/replica root pair

use std::path::{Path, PathBuf};

use mirror_fs::io;

use crate::{Error, Result};

/// The pair of trees a synchronizer mirrors between.
///
/// Passed explicitly to each [`Synchronizer`](crate::Synchronizer), so any
/// number of independent pairs can be synchronized in one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRoots {
    /// Tree that is read and never modified
    pub source: PathBuf,
    /// Tree that is made to match the source
    pub replica: PathBuf,
}

impl SyncRoots {
    pub fn new(source: impl Into<PathBuf>, replica: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            replica: replica.into(),
        }
    }

    /// Check that the source root exists and is a directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceMissing`] or [`Error::SourceNotDirectory`].
    pub fn validate_source(&self) -> Result<()> {
        if !self.source.exists() {
            return Err(Error::SourceMissing {
                path: self.source.clone(),
            });
        }
        if !self.source.is_dir() {
            return Err(Error::SourceNotDirectory {
                path: self.source.clone(),
            });
        }
        Ok(())
    }

    /// Check that neither root lies inside the other.
    ///
    /// The replica need not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OverlappingRoots`], or an I/O error if the source
    /// cannot be resolved.
    pub fn validate_disjoint(&self) -> Result<()> {
        let source = dunce::canonicalize(&self.source)
            .map_err(|e| mirror_fs::Error::io(&self.source, e))?;
        let replica = canonicalize_lenient(&self.replica);
        if replica.starts_with(&source) || source.starts_with(&replica) {
            return Err(Error::OverlappingRoots {
                source_root: self.source.clone(),
                replica: self.replica.clone(),
            });
        }
        Ok(())
    }

    /// Create the replica root if it is absent.
    ///
    /// Returns `true` if the directory had to be created.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReplicaNotDirectory`] if something other than a
    /// directory occupies the replica path, or an I/O error if it cannot be
    /// created.
    pub fn ensure_replica(&self) -> Result<bool> {
        if self.replica.is_dir() {
            return Ok(false);
        }
        if self.replica.exists() {
            return Err(Error::ReplicaNotDirectory {
                path: self.replica.clone(),
            });
        }
        io::create_dir(&self.replica)?;
        Ok(true)
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn replica(&self) -> &Path {
        &self.replica
    }
}

/// Canonicalize the longest existing prefix of `path` and re-append the rest.
fn canonicalize_lenient(path: &Path) -> PathBuf {
    let mut missing = Vec::new();
    let mut existing = path;
    loop {
        if let Ok(resolved) = dunce::canonicalize(existing) {
            return missing.iter().rev().fold(resolved, |acc, name| acc.join(name));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                existing = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}
