//! One-way synchronization of a replica tree from a source tree
//!
//! A pass runs four stages:
//! - **file update**: copy source files missing from, or newer than, the replica
//! - **file deletion**: remove replica files absent from the source
//! - **directory deletion**: remove replica directories absent from the source
//! - **directory creation**: create source directories missing from the
//!   replica, then descend into every source directory
//!
//! Per-item failures are reported and skipped. Failures to enumerate a root
//! abort the pass; the next pass starts from scratch.

mod engine;
mod report;

pub use engine::{SyncOptions, Synchronizer};
pub use report::{PassReport, PassStatus};
