//! Filesystem primitives for the folder mirror
//!
//! Provides relative-path identity, tree enumeration and the small set of
//! I/O operations a synchronization pass is allowed to perform.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod path;
pub mod tree;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use path::RelativePath;
pub use tree::FileState;
