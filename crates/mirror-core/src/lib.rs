//! One-way directory synchronization engine
//!
//! This crate makes a replica tree mirror a source tree:
//!
//! - **Synchronizer**: runs passes that copy new and stale files, delete
//!   files and directories absent from the source, and create missing
//!   directories, isolating per-item failures
//! - **Change detection**: pluggable strategies deciding when an existing
//!   replica file is stale (timestamp by default)
//! - **Events**: every action and error is reported to an [`EventSink`]
//! - **Scheduler**: repeats passes on a fixed interval, never overlapping
//!
//! # Architecture
//!
//! ```text
//!          mirror-cli
//!              |
//!         mirror-core
//!              |
//!          mirror-fs
//! ```
//!
//! # Example
//!
//! ```no_run
//! use mirror_core::{SyncRoots, Synchronizer};
//!
//! let sync = Synchronizer::new(SyncRoots::new("/data/source", "/data/replica"));
//! sync.prepare()?;
//! let report = sync.run_pass();
//! println!("{} files copied", report.copied());
//! # Ok::<(), mirror_core::Error>(())
//! ```

pub mod compare;
pub mod config;
pub mod error;
pub mod event;
pub mod schedule;
pub mod sync;

pub use compare::{ChangeDetector, CompareMode, ContentHash, SizeAndTimestamp, Timestamp};
pub use config::{RunConfig, SyncConfig, SyncRoots};
pub use error::{Error, Result};
pub use event::{
    EventSink, ItemFailure, LogEvent, MemorySink, Stage, SyncAction, SyncEvent, TracingSink,
};
pub use schedule::{Scheduler, SchedulerHandle, SchedulerStats};
pub use sync::{PassReport, PassStatus, SyncOptions, Synchronizer};
