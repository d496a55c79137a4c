//! Directory tree enumeration
//!
//! Everything here reads the filesystem fresh on every call. Nothing is
//! cached between passes.

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::WalkDir;

use crate::{Error, RelativePath, Result};

/// Attributes of an existing regular file consumed by change detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileState {
    /// Absolute (native) location of the file
    pub path: PathBuf,
    /// Size in bytes
    pub len: u64,
    /// Last modification time
    pub modified: SystemTime,
}

impl FileState {
    /// Read the state of a file that is expected to exist.
    pub fn read(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path).map_err(|e| Error::io(path, e))?;
        Self::from_metadata(path, &metadata)
    }

    fn from_metadata(path: &Path, metadata: &fs::Metadata) -> Result<Self> {
        let modified = metadata.modified().map_err(|e| Error::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            len: metadata.len(),
            modified,
        })
    }
}

/// Look up a regular file.
///
/// Returns `Ok(None)` when nothing exists at `path` or when the entry is not a
/// regular file (a directory, for instance).
pub fn file_state(path: &Path) -> Result<Option<FileState>> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => FileState::from_metadata(path, &metadata).map(Some),
        Ok(_) => Ok(None),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Whether a regular file (or a link to one) exists at `path`.
pub fn is_file(path: &Path) -> bool {
    path.is_file()
}

/// Whether `path` itself is a symbolic link, whatever it points to.
pub fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

/// Whether a directory exists at `path`. Links are not followed.
pub fn is_dir(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

/// List every non-directory entry under `root`, at all depths, as paths
/// relative to `root`.
///
/// Symbolic links are reported as entries but never followed. Any error
/// while walking (an unreadable subdirectory, a vanished entry) fails the
/// whole listing.
pub fn list_files(root: &Path) -> Result<Vec<RelativePath>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry = entry.map_err(|e| Error::Walk {
            root: root.to_path_buf(),
            message: e.to_string(),
        })?;

        if entry.file_type().is_dir() {
            continue;
        }

        files.push(RelativePath::from_root(root, entry.path())?);
    }

    tracing::debug!(root = %root.display(), count = files.len(), "Listed files");
    Ok(files)
}

/// List the names of the immediate subdirectories of `dir`.
///
/// Names are returned exactly as the platform reports them. Links to
/// directories are not included. Order is whatever the platform's directory
/// listing yields.
pub fn list_subdirs(dir: &Path) -> Result<Vec<OsString>> {
    let mut names = Vec::new();

    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| Error::io(entry.path(), e))?;
        if file_type.is_dir() {
            names.push(entry.file_name());
        }
    }

    Ok(names)
}
