//! Synchronization configuration
//!
//! - **roots**: the explicit source/replica pair a synchronizer works on
//! - **resolver**: layering of config-file values and command-line values
//!   into a complete [`RunConfig`]

mod resolver;
mod roots;

pub use resolver::{RunConfig, SyncConfig};
pub use roots::SyncRoots;
