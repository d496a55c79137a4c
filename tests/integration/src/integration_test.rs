//! End-to-end tests across the mirror crates
//!
//! These exercise the full flow: config file -> resolved run config ->
//! synchronizer -> scheduler, observing the replica and the emitted events
//! while the source changes between passes.

use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use mirror_core::{
    ChangeDetector, CompareMode, MemorySink, PassStatus, Scheduler, SyncAction, SyncConfig,
    SyncEvent, SyncRoots, Synchronizer,
};
use mirror_fs::FileState;
use mirror_test_utils::MirrorFixture;
use pretty_assertions::assert_eq;

/// Poll `check` until it holds or five seconds pass.
fn eventually(what: &str, mut check: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !check() {
        assert!(Instant::now() < deadline, "timed out waiting for {}", what);
        thread::sleep(Duration::from_millis(10));
    }
}

fn synchronizer(fx: &MirrorFixture, sink: &Arc<MemorySink>) -> Synchronizer {
    Synchronizer::new(SyncRoots::new(fx.source(), fx.replica())).with_sink(sink.clone())
}

#[test]
fn json_config_drives_a_checksum_pass() {
    let fx = MirrorFixture::new();
    fx.write_source("a.txt", "new!");
    fx.write_replica("a.txt", "old!");
    fx.set_source_mtime("a.txt", 1_000);
    fx.set_replica_mtime("a.txt", 1_000);

    let config_path = fx.root().join("mirror.json");
    let json = serde_json::json!({
        "source": fx.source(),
        "replica": fx.replica(),
        "interval_secs": 1,
        "log_file": fx.root().join("mirror.log"),
        "compare": "checksum",
    });
    fs::write(&config_path, json.to_string()).unwrap();

    let run = SyncConfig::load(&config_path).unwrap().resolve().unwrap();
    assert_eq!(run.options.compare, CompareMode::Checksum);
    assert_eq!(run.interval, Duration::from_secs(1));

    let sink = Arc::new(MemorySink::new());
    let sync = Synchronizer::new(run.roots)
        .with_options(run.options)
        .with_sink(sink.clone());
    sync.prepare().unwrap();
    let report = sync.run_pass();

    assert!(report.is_clean());
    assert_eq!(report.copied(), 1);
    assert_eq!(fx.read_replica("a.txt"), "new!");
    assert_eq!(sink.messages(), vec!["Updated: a.txt".to_string()]);
}

#[test]
fn scheduler_follows_source_changes() {
    let fx = MirrorFixture::without_replica();
    fx.write_source("a.txt", "alpha");
    fx.write_source("dir/b.txt", "beta");

    let sink = Arc::new(MemorySink::new());
    let sync = Arc::new(synchronizer(&fx, &sink));
    sync.prepare().unwrap();

    let handle = Scheduler::new(Duration::from_millis(20))
        .spawn(sync.clone())
        .unwrap();

    eventually("initial copy", || fx.replica().join("dir/b.txt").exists());

    fs::remove_file(fx.source().join("a.txt")).unwrap();
    fx.write_source("c.txt", "gamma");
    eventually("deletion and new file", || {
        !fx.replica().join("a.txt").exists() && fx.replica().join("c.txt").exists()
    });

    fs::remove_dir_all(fx.source().join("dir")).unwrap();
    eventually("directory removal", || !fx.replica().join("dir").exists());

    let stats = handle.shutdown().unwrap();
    assert!(stats.passes >= 3, "{:?}", stats);
    // Settle anything written while a pass was mid-walk.
    assert!(sync.run_pass().is_clean());
    fx.assert_mirrored();

    let messages = sink.messages();
    assert!(messages.iter().any(|m| m.starts_with("Replica folder created: ")));
    for expected in [
        "Copied: a.txt",
        "Copied: dir/b.txt",
        "Deleted file: a.txt",
        "Copied: c.txt",
        "Deleted directory: dir",
    ] {
        assert!(
            messages.iter().any(|m| m == expected),
            "missing {:?} in {:#?}",
            expected,
            messages
        );
    }
}

#[test]
fn scheduler_survives_source_disappearing() {
    let fx = MirrorFixture::new();
    fx.write_source("a.txt", "alpha");

    let sink = Arc::new(MemorySink::new());
    let sync = Arc::new(synchronizer(&fx, &sink));
    let handle = Scheduler::new(Duration::from_millis(10))
        .spawn(sync.clone())
        .unwrap();
    eventually("initial copy", || fx.replica().join("a.txt").exists());

    let parked = fx.root().join("parked");
    fs::rename(fx.source(), &parked).unwrap();
    eventually("an aborted pass", || {
        sink.events()
            .iter()
            .any(|e| matches!(e, SyncEvent::PassAborted { .. }))
    });
    // The replica is left alone while the source is missing.
    assert_eq!(fx.read_replica("a.txt"), "alpha");

    fs::rename(&parked, fx.source()).unwrap();
    fx.write_source("b.txt", "beta");
    eventually("recovery", || fx.replica().join("b.txt").exists());

    let stats = handle.shutdown().unwrap();
    assert!(stats.aborted >= 1);
    assert!(stats.passes > stats.aborted);
    sync.run_pass();
    fx.assert_mirrored();
}

#[test]
fn independent_root_pairs_run_side_by_side() {
    let first = MirrorFixture::new();
    let second = MirrorFixture::new();
    first.write_source("only-first.txt", "1");
    second.write_source("only-second.txt", "2");

    let sink = Arc::new(MemorySink::new());
    let handles = [&first, &second].map(|fx| {
        Scheduler::new(Duration::from_millis(15))
            .spawn(Arc::new(synchronizer(fx, &sink)))
            .unwrap()
    });

    eventually("both pairs copied", || {
        first.replica().join("only-first.txt").exists()
            && second.replica().join("only-second.txt").exists()
    });
    for handle in handles {
        handle.shutdown().unwrap();
    }

    first.assert_mirrored();
    second.assert_mirrored();
    first.assert_replica_missing("only-second.txt");
    second.assert_replica_missing("only-first.txt");
}

/// Detector that parks inside its first comparison until released.
#[derive(Debug)]
struct Gate {
    entered: Arc<Barrier>,
    release: Arc<Barrier>,
    used: AtomicBool,
}

impl ChangeDetector for Gate {
    fn name(&self) -> &'static str {
        "gate"
    }

    fn needs_copy(&self, source: &FileState, replica: &FileState) -> mirror_fs::Result<bool> {
        if !self.used.swap(true, Ordering::SeqCst) {
            self.entered.wait();
            self.release.wait();
        }
        Ok(source.modified > replica.modified)
    }
}

#[test]
fn overlapping_pass_is_skipped() {
    let fx = MirrorFixture::new();
    fx.write_source("a.txt", "new");
    fx.write_replica("a.txt", "old");
    fx.set_source_mtime("a.txt", 2_000);
    fx.set_replica_mtime("a.txt", 1_000);

    let entered = Arc::new(Barrier::new(2));
    let release = Arc::new(Barrier::new(2));
    let gate = Gate {
        entered: entered.clone(),
        release: release.clone(),
        used: AtomicBool::new(false),
    };
    let sink = Arc::new(MemorySink::new());
    let sync = Arc::new(synchronizer(&fx, &sink).with_detector(Box::new(gate)));

    let running = {
        let sync = sync.clone();
        thread::spawn(move || sync.run_pass())
    };
    entered.wait();

    let overlapping = sync.run_pass();
    release.wait();
    let first = running.join().unwrap();

    assert_eq!(overlapping.status, PassStatus::Skipped);
    assert!(overlapping.actions.is_empty());
    assert_eq!(first.status, PassStatus::Completed);
    assert!(matches!(
        first.actions.as_slice(),
        [SyncAction::CopiedFile { updated: true, .. }]
    ));
    assert!(sink.events().contains(&SyncEvent::PassSkipped));
    assert_eq!(fx.read_replica("a.txt"), "new");
}
