//! Synchronization events and the sinks that receive them
//!
//! Every mutating action and every error of a pass is reported to an
//! [`EventSink`] as a [`SyncEvent`]. The event's `Display` output is the log
//! message; a [`LogEvent`] pairs that message with a local timestamp.

use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Local};
use mirror_fs::RelativePath;

/// Timestamp layout used in log lines.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The step during which a per-item failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    CopyFile,
    DeleteFile,
    DeleteDirectory,
    CreateDirectory,
    SyncDirectory,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CopyFile => "copying file",
            Self::DeleteFile => "deleting file",
            Self::DeleteDirectory => "deleting directory",
            Self::CreateDirectory => "creating directory",
            Self::SyncDirectory => "synchronizing directory",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A mutation applied to the replica (or planned, in a dry run).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SyncAction {
    /// A file was copied; `updated` is true when it replaced an older copy
    CopiedFile { path: RelativePath, updated: bool },
    /// A file absent from the source was removed
    DeletedFile { path: RelativePath },
    /// A directory present only in the source was created
    CreatedDirectory { path: RelativePath },
    /// A directory absent from the source was removed with its subtree
    DeletedDirectory { path: RelativePath },
}

impl SyncAction {
    pub fn path(&self) -> &RelativePath {
        match self {
            Self::CopiedFile { path, .. }
            | Self::DeletedFile { path }
            | Self::CreatedDirectory { path }
            | Self::DeletedDirectory { path } => path,
        }
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CopiedFile { path, updated: false } => write!(f, "Copied: {}", path),
            Self::CopiedFile { path, updated: true } => write!(f, "Updated: {}", path),
            Self::DeletedFile { path } => write!(f, "Deleted file: {}", path),
            Self::CreatedDirectory { path } => write!(f, "Created directory: {}", path),
            Self::DeletedDirectory { path } => write!(f, "Deleted directory: {}", path),
        }
    }
}

/// A recoverable failure affecting a single file or directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub stage: Stage,
    pub path: RelativePath,
    pub message: String,
}

impl fmt::Display for ItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error {} {}: {}", self.stage, self.path, self.message)
    }
}

/// Structured log event emitted by the synchronizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The replica root did not exist and was created
    ReplicaCreated { path: PathBuf },
    /// A mutation was applied, or planned when `dry_run` is set
    Action { action: SyncAction, dry_run: bool },
    /// One item failed; the pass continued
    ItemFailed(ItemFailure),
    /// The pass could not continue
    PassAborted { message: String },
    /// A pass was requested while another was still running
    PassSkipped,
}

impl SyncEvent {
    /// Whether this event reports a failure.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::ItemFailed(_) | Self::PassAborted { .. })
    }
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReplicaCreated { path } => {
                write!(f, "Replica folder created: {}", path.display())
            }
            Self::Action { action, dry_run: false } => write!(f, "{}", action),
            Self::Action { action, dry_run: true } => write!(f, "[dry-run] {}", action),
            Self::ItemFailed(failure) => write!(f, "{}", failure),
            Self::PassAborted { message } => write!(f, "Synchronization aborted: {}", message),
            Self::PassSkipped => write!(f, "Previous pass still running; skipping this tick"),
        }
    }
}

/// A rendered log line: `<local-timestamp> : <message>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEvent {
    pub timestamp: DateTime<Local>,
    pub message: String,
}

impl LogEvent {
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            message: message.into(),
        }
    }
}

impl From<&SyncEvent> for LogEvent {
    fn from(event: &SyncEvent) -> Self {
        Self::now(event.to_string())
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.timestamp.format(TIMESTAMP_FORMAT), self.message)
    }
}

/// Receiver of synchronization events.
///
/// Implementations must not fail; a sink that cannot record an event drops
/// it.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &SyncEvent);
}

/// Forwards events to `tracing`.
///
/// Actions are logged at `INFO`, failures at `ERROR` and skipped passes at
/// `WARN`. Whichever subscriber is installed decides where they end up.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &SyncEvent) {
        match event {
            SyncEvent::ItemFailed(failure) => {
                tracing::error!(stage = %failure.stage, path = %failure.path, "{}", event)
            }
            SyncEvent::PassAborted { .. } => tracing::error!("{}", event),
            SyncEvent::PassSkipped => tracing::warn!("{}", event),
            SyncEvent::Action { action, .. } => tracing::info!(path = %action.path(), "{}", event),
            SyncEvent::ReplicaCreated { .. } => tracing::info!("{}", event),
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<(SyncEvent, LogEvent)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events, oldest first.
    pub fn events(&self) -> Vec<SyncEvent> {
        self.lock().iter().map(|(event, _)| event.clone()).collect()
    }

    /// Snapshot of the recorded log lines, oldest first.
    pub fn log_events(&self) -> Vec<LogEvent> {
        self.lock().iter().map(|(_, line)| line.clone()).collect()
    }

    /// Messages of the recorded events, without timestamps.
    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(|(_, line)| line.message.clone()).collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(SyncEvent, LogEvent)>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &SyncEvent) {
        self.lock().push((event.clone(), LogEvent::from(event)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn action_messages() {
        let copied = SyncEvent::Action {
            action: SyncAction::CopiedFile {
                path: RelativePath::new("docs/a.txt"),
                updated: false,
            },
            dry_run: false,
        };
        let planned = SyncEvent::Action {
            action: SyncAction::DeletedDirectory {
                path: RelativePath::new("old"),
            },
            dry_run: true,
        };

        insta::assert_snapshot!(copied.to_string(), @"Copied: docs/a.txt");
        insta::assert_snapshot!(planned.to_string(), @"[dry-run] Deleted directory: old");
    }

    #[test]
    fn failure_message_names_stage_and_path() {
        let event = SyncEvent::ItemFailed(ItemFailure {
            stage: Stage::CopyFile,
            path: RelativePath::new("locked.db"),
            message: "Permission denied".into(),
        });

        assert!(event.is_error());
        insta::assert_snapshot!(event.to_string(), @"Error copying file locked.db: Permission denied");
    }

    #[test]
    fn log_event_layout() {
        let line = LogEvent {
            timestamp: Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap(),
            message: "Deleted file: b.txt".into(),
        };

        assert_eq!(line.to_string(), "2024-03-09 07:05:01 : Deleted file: b.txt");
    }

    #[test]
    fn memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.emit(&SyncEvent::PassSkipped);
        sink.emit(&SyncEvent::PassAborted {
            message: "boom".into(),
        });

        assert_eq!(
            sink.messages(),
            vec![
                "Previous pass still running; skipping this tick".to_string(),
                "Synchronization aborted: boom".to_string(),
            ]
        );
        assert_eq!(sink.log_events().len(), 2);

        sink.clear();
        assert!(sink.events().is_empty());
    }
}
