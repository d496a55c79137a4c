//! Fixed-interval pass scheduling
//!
//! The scheduler runs a pass immediately and then once per interval on a
//! background thread. Stop requests are observed only between passes. A
//! pass that overruns the interval causes the missed ticks to be skipped,
//! never queued.

use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::sync::{PassStatus, Synchronizer};
use crate::{Error, Result};

/// Runs passes of one synchronizer on a fixed cadence.
#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
    interval: Duration,
}

/// Control handle for a running scheduler.
#[derive(Debug)]
pub struct SchedulerHandle {
    stop: Sender<()>,
    thread: JoinHandle<SchedulerStats>,
}

/// What a scheduler did before it stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Passes started (including skipped ones)
    pub passes: u64,
    /// Passes that ended with [`PassStatus::Aborted`]
    pub aborted: u64,
    /// Ticks dropped because a pass overran the interval
    pub missed_ticks: u64,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start running passes on a background thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn(self, synchronizer: Arc<Synchronizer>) -> Result<SchedulerHandle> {
        let (stop, stop_rx) = mpsc::channel();
        let interval = self.interval;

        let thread = thread::Builder::new()
            .name("mirror-scheduler".into())
            .spawn(move || run_loop(interval, &synchronizer, &stop_rx))?;

        tracing::debug!(interval_secs = interval.as_secs_f64(), "Scheduler started");
        Ok(SchedulerHandle { stop, thread })
    }
}

impl SchedulerHandle {
    /// Ask the scheduler to stop after the pass in progress, if any.
    pub fn stop(&self) {
        // A send error means the loop already ended.
        let _ = self.stop.send(());
    }

    /// Wait for the scheduler thread to finish.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Scheduler`] if the thread panicked.
    pub fn join(self) -> Result<SchedulerStats> {
        self.thread.join().map_err(|_| Error::Scheduler {
            message: "scheduler thread panicked".into(),
        })
    }

    /// Stop and wait.
    pub fn shutdown(self) -> Result<SchedulerStats> {
        self.stop();
        self.join()
    }
}

fn run_loop(
    interval: Duration,
    synchronizer: &Synchronizer,
    stop: &mpsc::Receiver<()>,
) -> SchedulerStats {
    let mut stats = SchedulerStats::default();
    let mut next_tick = Instant::now();

    loop {
        let report = synchronizer.run_pass();
        stats.passes += 1;
        if matches!(report.status, PassStatus::Aborted { .. }) {
            stats.aborted += 1;
        }

        next_tick += interval;
        let now = Instant::now();
        let mut missed = 0;
        while next_tick <= now {
            next_tick += interval;
            missed += 1;
        }
        if missed > 0 {
            stats.missed_ticks += missed;
            tracing::warn!(missed, "Pass overran the sync interval; skipping missed ticks");
        }

        match stop.recv_timeout(next_tick.saturating_duration_since(Instant::now())) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
    }

    tracing::debug!(passes = stats.passes, "Scheduler stopped");
    stats
}
