//! Error types for mirror-core

use std::path::PathBuf;

/// Result type for mirror-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mirror-core operations
///
/// None of these escape a synchronization pass; they surface from startup
/// validation, configuration resolution and the scheduler.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Source root does not exist
    #[error("Source folder does not exist: {path}")]
    SourceMissing { path: PathBuf },

    /// Source root exists but is not a directory
    #[error("Source folder is not a directory: {path}")]
    SourceNotDirectory { path: PathBuf },

    /// Replica root exists but is not a directory
    #[error("Replica folder is not a directory: {path}")]
    ReplicaNotDirectory { path: PathBuf },

    /// One root lies inside the other
    #[error("Source and replica folders overlap: {source_root} and {replica}")]
    OverlappingRoots { source_root: PathBuf, replica: PathBuf },

    /// Configuration is incomplete or invalid
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// The scheduler thread ended abnormally
    #[error("Scheduler error: {message}")]
    Scheduler { message: String },

    /// Filesystem error from mirror-fs
    #[error(transparent)]
    Fs(#[from] mirror_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
