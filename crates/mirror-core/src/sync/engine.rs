//! Synchronizer implementation

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chrono::Local;
use mirror_fs::{FileState, RelativePath, io, tree};

use super::report::{PassReport, PassStatus};
use crate::compare::{ChangeDetector, CompareMode};
use crate::config::SyncRoots;
use crate::event::{EventSink, ItemFailure, Stage, SyncAction, SyncEvent, TracingSink};
use crate::Result;

/// Options for a synchronizer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// If true, report what a pass would do without modifying the replica.
    /// Event messages are prefixed with "[dry-run]".
    pub dry_run: bool,
    /// Strategy deciding whether an existing replica file is stale
    pub compare: CompareMode,
}

/// Mirrors one source tree onto one replica tree.
///
/// A synchronizer is cheap to share behind an `Arc`. Only one pass runs at a
/// time per synchronizer: a [`run_pass`](Self::run_pass) call made while
/// another is in progress returns a [`PassStatus::Skipped`] report.
pub struct Synchronizer {
    roots: SyncRoots,
    options: SyncOptions,
    detector: Box<dyn ChangeDetector>,
    sink: Arc<dyn EventSink>,
    in_progress: AtomicBool,
}

impl Synchronizer {
    /// Create a synchronizer with default options that logs through `tracing`.
    pub fn new(roots: SyncRoots) -> Self {
        let options = SyncOptions::default();
        Self {
            roots,
            detector: options.compare.detector(),
            options,
            sink: Arc::new(TracingSink),
            in_progress: AtomicBool::new(false),
        }
    }

    /// Replace the options; the change detector follows `options.compare`.
    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.detector = options.compare.detector();
        self.options = options;
        self
    }

    /// Use a custom change detector instead of one of the built-in modes.
    pub fn with_detector(mut self, detector: Box<dyn ChangeDetector>) -> Self {
        self.detector = detector;
        self
    }

    /// Send events to `sink` instead of `tracing`.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn roots(&self) -> &SyncRoots {
        &self.roots
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Startup checks: the source must exist; the replica is created if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is missing or not a directory, the
    /// roots overlap, or the replica cannot be created. These are fatal for startup.
    pub fn prepare(&self) -> Result<()> {
        self.roots.validate_source()?;
        self.roots.validate_disjoint()?;
        if self.options.dry_run {
            return Ok(());
        }
        if self.roots.ensure_replica()? {
            self.sink.emit(&SyncEvent::ReplicaCreated {
                path: self.roots.replica.clone(),
            });
        }
        Ok(())
    }

    /// Run one synchronization pass.
    ///
    /// Never fails: per-item errors are emitted and collected in the report,
    /// and an error that prevents the pass from continuing ends it with
    /// [`PassStatus::Aborted`].
    pub fn run_pass(&self) -> PassReport {
        let Some(_guard) = PassGuard::acquire(&self.in_progress) else {
            self.sink.emit(&SyncEvent::PassSkipped);
            return PassReport::skipped();
        };

        let started_at = Local::now();
        let clock = Instant::now();
        tracing::debug!(
            source = %self.roots.source.display(),
            replica = %self.roots.replica.display(),
            compare = self.detector.name(),
            dry_run = self.options.dry_run,
            "Starting pass"
        );

        let mut pass = Pass::new(self);
        let status = match pass.execute() {
            Ok(()) => PassStatus::Completed,
            Err(e) => {
                let message = e.to_string();
                self.sink.emit(&SyncEvent::PassAborted {
                    message: message.clone(),
                });
                PassStatus::Aborted { message }
            }
        };

        let report = PassReport {
            status,
            actions: pass.actions,
            errors: pass.errors,
            started_at,
            elapsed: clock.elapsed(),
        };
        tracing::debug!(
            status = ?report.status,
            actions = report.actions.len(),
            errors = report.errors.len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Finished pass"
        );
        report
    }
}

impl std::fmt::Debug for Synchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synchronizer")
            .field("roots", &self.roots)
            .field("options", &self.options)
            .field("detector", &self.detector)
            .finish_non_exhaustive()
    }
}

/// Single-slot "pass in progress" flag, released on drop.
struct PassGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> PassGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// State of one pass in flight.
struct Pass<'a> {
    sync: &'a Synchronizer,
    actions: Vec<SyncAction>,
    errors: Vec<ItemFailure>,
}

impl<'a> Pass<'a> {
    fn new(sync: &'a Synchronizer) -> Self {
        Self {
            sync,
            actions: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn source(&self) -> &'a Path {
        &self.sync.roots.source
    }

    fn replica(&self) -> &'a Path {
        &self.sync.roots.replica
    }

    fn dry_run(&self) -> bool {
        self.sync.options.dry_run
    }

    fn execute(&mut self) -> mirror_fs::Result<()> {
        if !self.dry_run() && !self.replica().is_dir() {
            io::create_dir(self.replica())?;
            self.sync.sink.emit(&SyncEvent::ReplicaCreated {
                path: self.replica().to_path_buf(),
            });
        }

        self.update_files()?;
        self.delete_files()?;
        self.sync_directories()
    }

    /// Stage 1: copy every source file that is missing from, or stale in,
    /// the replica.
    fn update_files(&mut self) -> mirror_fs::Result<()> {
        let files = tree::list_files(self.source())?;

        for path in files {
            if let Err(e) = self.update_file(&path) {
                self.fail(Stage::CopyFile, path, e);
            }
        }
        Ok(())
    }

    fn update_file(&mut self, path: &RelativePath) -> mirror_fs::Result<()> {
        let source = path.under(self.source());
        let replica = path.under(self.replica());

        let source_state = FileState::read(&source)?;
        let updated = match self.replica_link(path) {
            // Links are replaced, never written through.
            Some(link) => {
                if !self.dry_run() {
                    io::remove_file(&link.under(self.replica()))?;
                }
                link == *path
            }
            None => match tree::file_state(&replica)? {
                None => false,
                Some(replica_state) => {
                    if !self.sync.detector.needs_copy(&source_state, &replica_state)? {
                        return Ok(());
                    }
                    true
                }
            },
        };

        if !self.dry_run() {
            io::copy_file(&source, &replica)?;
        }
        self.record(SyncAction::CopiedFile {
            path: path.clone(),
            updated,
        });
        Ok(())
    }

    /// The outermost symbolic link at or above `path` inside the replica.
    fn replica_link(&self, path: &RelativePath) -> Option<RelativePath> {
        let mut outermost = None;
        let mut current = Some(path.clone());
        while let Some(candidate) = current.filter(|p| !p.is_root()) {
            if tree::is_symlink(&candidate.under(self.replica())) {
                outermost = Some(candidate.clone());
            }
            current = candidate.parent();
        }
        outermost
    }

    /// Stage 2: remove replica files that have no source counterpart.
    fn delete_files(&mut self) -> mirror_fs::Result<()> {
        let files = if self.dry_run() && !self.replica().is_dir() {
            Vec::new()
        } else {
            tree::list_files(self.replica())?
        };

        for path in files {
            if tree::is_file(&path.under(self.source())) {
                continue;
            }
            let result = if self.dry_run() {
                Ok(())
            } else {
                io::remove_file(&path.under(self.replica()))
            };
            match result {
                Ok(()) => self.record(SyncAction::DeletedFile { path }),
                Err(e) => self.fail(Stage::DeleteFile, path, e),
            }
        }
        Ok(())
    }

    /// Stages 3 and 4: reconcile the directory structure depth-first, parent
    /// before children.
    ///
    /// Uses an explicit work list so tree depth is not limited by the call
    /// stack. A failure at the root aborts the pass; a failure below it
    /// skips that subtree only.
    fn sync_directories(&mut self) -> mirror_fs::Result<()> {
        let root = RelativePath::root();
        let mut pending: Vec<RelativePath> =
            self.reconcile_level(&root)?.into_iter().rev().collect();

        while let Some(dir) = pending.pop() {
            match self.reconcile_level(&dir) {
                Ok(children) => pending.extend(children.into_iter().rev()),
                Err(e) => self.fail(Stage::SyncDirectory, dir, e),
            }
        }
        Ok(())
    }

    /// Reconcile the immediate subdirectories of `dir` and return the source
    /// subdirectories to descend into.
    fn reconcile_level(&mut self, dir: &RelativePath) -> mirror_fs::Result<Vec<RelativePath>> {
        let source_dir = dir.under(self.source());
        let replica_dir = dir.under(self.replica());

        let source_subdirs = tree::list_subdirs(&source_dir)?;
        // The replica root may itself be a link; entries below it may not.
        let replica_exists = if dir.is_root() {
            replica_dir.is_dir()
        } else {
            tree::is_dir(&replica_dir)
        };
        let replica_subdirs = if self.dry_run() && !replica_exists {
            Vec::new()
        } else {
            tree::list_subdirs(&replica_dir)?
        };

        for name in replica_subdirs {
            let path = dir.join(&name);
            if tree::is_dir(&path.under(self.source())) {
                continue;
            }
            let result = if self.dry_run() {
                Ok(())
            } else {
                io::remove_dir_all(&path.under(self.replica()))
            };
            match result {
                Ok(()) => self.record(SyncAction::DeletedDirectory { path }),
                Err(e) => self.fail(Stage::DeleteDirectory, path, e),
            }
        }

        let mut descend = Vec::with_capacity(source_subdirs.len());
        for name in source_subdirs {
            let path = dir.join(&name);
            let target = path.under(self.replica());
            if !tree::is_dir(&target) {
                let result = if self.dry_run() {
                    Ok(())
                } else if tree::is_symlink(&target) {
                    io::remove_file(&target).and_then(|()| io::create_dir(&target))
                } else {
                    io::create_dir(&target)
                };
                if let Err(e) = result {
                    self.fail(Stage::CreateDirectory, path, e);
                    continue;
                }
                self.record(SyncAction::CreatedDirectory { path: path.clone() });
            }
            descend.push(path);
        }
        Ok(descend)
    }

    fn record(&mut self, action: SyncAction) {
        self.sync.sink.emit(&SyncEvent::Action {
            action: action.clone(),
            dry_run: self.dry_run(),
        });
        self.actions.push(action);
    }

    fn fail(&mut self, stage: Stage, path: RelativePath, error: mirror_fs::Error) {
        let failure = ItemFailure {
            stage,
            path,
            message: error.to_string(),
        };
        self.sync.sink.emit(&SyncEvent::ItemFailed(failure.clone()));
        self.errors.push(failure);
    }
}
