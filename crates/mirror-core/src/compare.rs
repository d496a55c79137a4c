//! Change detection strategies
//!
//! A [`ChangeDetector`] decides whether a replica file that already exists
//! must be overwritten from the source. It is consulted only when both files
//! exist; a missing replica file is always copied. The traversal in
//! [`crate::sync`] does not depend on which strategy is in use.

use std::fmt;
use std::str::FromStr;

use mirror_fs::{FileState, checksum};
use serde::Deserialize;

use crate::Error;

/// Decides whether an existing replica file is out of date.
pub trait ChangeDetector: Send + Sync + fmt::Debug {
    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Whether `replica` must be overwritten with `source`.
    fn needs_copy(&self, source: &FileState, replica: &FileState) -> mirror_fs::Result<bool>;
}

/// Copy only when the source was modified strictly after the replica.
///
/// Equal timestamps count as in sync, so content edits that keep the
/// timestamp are not detected.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timestamp;

impl ChangeDetector for Timestamp {
    fn name(&self) -> &'static str {
        "timestamp"
    }

    fn needs_copy(&self, source: &FileState, replica: &FileState) -> mirror_fs::Result<bool> {
        Ok(source.modified > replica.modified)
    }
}

/// Copy when the sizes differ or the source is newer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeAndTimestamp;

impl ChangeDetector for SizeAndTimestamp {
    fn name(&self) -> &'static str {
        "size-timestamp"
    }

    fn needs_copy(&self, source: &FileState, replica: &FileState) -> mirror_fs::Result<bool> {
        Ok(source.len != replica.len || source.modified > replica.modified)
    }
}

/// Copy when the SHA-256 checksums of the two files differ.
///
/// Reads both files in full on every comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentHash;

impl ChangeDetector for ContentHash {
    fn name(&self) -> &'static str {
        "checksum"
    }

    fn needs_copy(&self, source: &FileState, replica: &FileState) -> mirror_fs::Result<bool> {
        if source.len != replica.len {
            return Ok(true);
        }
        let source_sum = checksum::compute_file_checksum(&source.path)?;
        let replica_sum = checksum::compute_file_checksum(&replica.path)?;
        Ok(source_sum != replica_sum)
    }
}

/// Selectable change detection strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompareMode {
    /// Modification time only
    #[default]
    Timestamp,
    /// Size, then modification time
    SizeTimestamp,
    /// Full content checksum
    Checksum,
}

impl CompareMode {
    /// All modes, in documentation order.
    pub const ALL: [CompareMode; 3] = [Self::Timestamp, Self::SizeTimestamp, Self::Checksum];

    /// Get the string representation of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timestamp => "timestamp",
            Self::SizeTimestamp => "size-timestamp",
            Self::Checksum => "checksum",
        }
    }

    /// Build the detector implementing this mode.
    pub fn detector(self) -> Box<dyn ChangeDetector> {
        match self {
            Self::Timestamp => Box::new(Timestamp),
            Self::SizeTimestamp => Box::new(SizeAndTimestamp),
            Self::Checksum => Box::new(ContentHash),
        }
    }
}

impl fmt::Display for CompareMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CompareMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "timestamp" | "mtime" => Ok(Self::Timestamp),
            "size-timestamp" | "size" => Ok(Self::SizeTimestamp),
            "checksum" | "hash" | "content" => Ok(Self::Checksum),
            other => Err(Error::config(format!(
                "unknown compare mode '{}' (expected one of: timestamp, size-timestamp, checksum)",
                other
            ))),
        }
    }
}
