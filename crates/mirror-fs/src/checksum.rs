//! SHA-256 checksum utilities
//!
//! Checksums use a single canonical format (`sha256:<hex>`). They back the
//! opt-in content comparison strategy; the default comparison never reads
//! file content.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::path::Path;

use crate::{Error, Result};

/// Prefix for all checksums produced by this module
const PREFIX: &str = "sha256:";

/// Compute the SHA-256 checksum of a file's contents.
///
/// The file is streamed rather than read into memory at once.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn compute_file_checksum(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher).map_err(|e| Error::io(path, e))?;
    Ok(format!("{}{:x}", PREFIX, hasher.finalize()))
}
