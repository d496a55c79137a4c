//! Mutating filesystem operations used by a synchronization pass
//!
//! Each operation is a single filesystem call (plus parent creation for
//! copies); nothing is staged through temporary files.

use std::fs;
use std::path::Path;

use filetime::FileTime;

use crate::{Error, Result};

/// Copy `source` over `destination`, creating missing parent directories.
///
/// The destination is overwritten if present, and its modification time is
/// set to the source's so that an unchanged source compares as in sync on
/// the next pass. Returns the number of bytes copied.
pub fn copy_file(source: &Path, destination: &Path) -> Result<u64> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let metadata = fs::metadata(source).map_err(|e| Error::io(source, e))?;
    let bytes = fs::copy(source, destination).map_err(|e| Error::io(source, e))?;

    let mtime = FileTime::from_last_modification_time(&metadata);
    filetime::set_file_mtime(destination, mtime).map_err(|e| Error::io(destination, e))?;

    Ok(bytes)
}

/// Delete a single file.
pub fn remove_file(path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(|e| Error::io(path, e))
}

/// Delete a directory and everything below it.
pub fn remove_dir_all(path: &Path) -> Result<()> {
    fs::remove_dir_all(path).map_err(|e| Error::io(path, e))
}

/// Create a directory, including any missing parents.
pub fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| Error::io(path, e))
}
