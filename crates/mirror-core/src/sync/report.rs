//! Outcome of a single pass

use std::time::Duration;

use chrono::{DateTime, Local};

use crate::event::{ItemFailure, SyncAction};

/// How a pass ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassStatus {
    /// Every stage ran; individual items may still have failed
    Completed,
    /// An enumeration failed and the rest of the pass was abandoned
    Aborted { message: String },
    /// Another pass was in progress, so nothing was done
    Skipped,
}

/// Report from a single synchronization pass
#[derive(Debug, Clone)]
pub struct PassReport {
    pub status: PassStatus,
    /// Actions taken (or planned, in a dry run), in the order performed
    pub actions: Vec<SyncAction>,
    /// Per-item failures, in the order encountered
    pub errors: Vec<ItemFailure>,
    pub started_at: DateTime<Local>,
    pub elapsed: Duration,
}

impl PassReport {
    pub(crate) fn skipped() -> Self {
        Self {
            status: PassStatus::Skipped,
            actions: Vec::new(),
            errors: Vec::new(),
            started_at: Local::now(),
            elapsed: Duration::ZERO,
        }
    }

    /// Completed with no per-item failures.
    pub fn is_clean(&self) -> bool {
        self.status == PassStatus::Completed && self.errors.is_empty()
    }

    /// Completed without changing anything.
    pub fn is_noop(&self) -> bool {
        self.is_clean() && self.actions.is_empty()
    }

    pub fn copied(&self) -> usize {
        self.count(|a| matches!(a, SyncAction::CopiedFile { .. }))
    }

    pub fn deleted_files(&self) -> usize {
        self.count(|a| matches!(a, SyncAction::DeletedFile { .. }))
    }

    pub fn created_dirs(&self) -> usize {
        self.count(|a| matches!(a, SyncAction::CreatedDirectory { .. }))
    }

    pub fn deleted_dirs(&self) -> usize {
        self.count(|a| matches!(a, SyncAction::DeletedDirectory { .. }))
    }

    fn count(&self, predicate: impl Fn(&SyncAction) -> bool) -> usize {
        self.actions.iter().filter(|a| predicate(a)).count()
    }
}
