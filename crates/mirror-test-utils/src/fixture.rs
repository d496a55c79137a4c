//! [`MirrorFixture`] builder for synchronization test scenarios.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use filetime::FileTime;
use tempfile::TempDir;

/// One entry of a tree snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Dir,
    File(Vec<u8>),
}

/// A temporary directory holding a `source/` tree and a `replica/` tree.
///
/// Both directories exist after [`MirrorFixture::new`]; use
/// [`MirrorFixture::without_replica`] to test replica creation.
///
/// # Example
///
/// ```rust,no_run
/// use mirror_test_utils::MirrorFixture;
///
/// let fx = MirrorFixture::new();
/// fx.write_source("docs/a.txt", "hello");
/// fx.set_source_mtime("docs/a.txt", 1_000);
/// fx.assert_replica_missing("docs/a.txt");
/// ```
pub struct MirrorFixture {
    temp_dir: TempDir,
}

impl Default for MirrorFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl MirrorFixture {
    /// Create empty `source/` and `replica/` directories.
    pub fn new() -> Self {
        let fixture = Self::without_replica();
        fs::create_dir_all(fixture.replica()).unwrap();
        fixture
    }

    /// Create an empty `source/` directory and no replica.
    pub fn without_replica() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("source")).unwrap();
        Self { temp_dir }
    }

    /// Root of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn source(&self) -> PathBuf {
        self.root().join("source")
    }

    pub fn replica(&self) -> PathBuf {
        self.root().join("replica")
    }

    /// Write a source file, creating parent directories.
    pub fn write_source(&self, rel: &str, content: impl AsRef<[u8]>) {
        write(&self.source().join(rel), content.as_ref());
    }

    /// Write a replica file, creating parent directories.
    pub fn write_replica(&self, rel: &str, content: impl AsRef<[u8]>) {
        write(&self.replica().join(rel), content.as_ref());
    }

    pub fn mkdir_source(&self, rel: &str) {
        fs::create_dir_all(self.source().join(rel)).unwrap();
    }

    pub fn mkdir_replica(&self, rel: &str) {
        fs::create_dir_all(self.replica().join(rel)).unwrap();
    }

    /// Pin a source file's modification time to `secs` after the epoch.
    pub fn set_source_mtime(&self, rel: &str, secs: i64) {
        set_mtime(&self.source().join(rel), secs);
    }

    /// Pin a replica file's modification time to `secs` after the epoch.
    pub fn set_replica_mtime(&self, rel: &str, secs: i64) {
        set_mtime(&self.replica().join(rel), secs);
    }

    /// Read a replica file as UTF-8.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read_replica(&self, rel: &str) -> String {
        let path = self.replica().join(rel);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Could not read replica file {}: {}", path.display(), e))
    }

    /// Modification time of a replica file, in seconds after the epoch.
    pub fn replica_mtime(&self, rel: &str) -> i64 {
        let metadata = fs::metadata(self.replica().join(rel)).unwrap();
        FileTime::from_last_modification_time(&metadata).unix_seconds()
    }

    /// Assert that `rel` exists under the replica.
    pub fn assert_replica_exists(&self, rel: &str) {
        let path = self.replica().join(rel);
        assert!(path.exists(), "Expected replica entry to exist: {}", path.display());
    }

    /// Assert that `rel` does **not** exist under the replica.
    pub fn assert_replica_missing(&self, rel: &str) {
        let path = self.replica().join(rel);
        assert!(
            !path.exists(),
            "Expected replica entry NOT to exist: {}",
            path.display()
        );
    }

    /// Assert that the replica holds exactly the source's paths and content.
    pub fn assert_mirrored(&self) {
        let source = snapshot(&self.source());
        let replica = snapshot(&self.replica());
        assert_eq!(
            source.keys().collect::<Vec<_>>(),
            replica.keys().collect::<Vec<_>>(),
            "replica paths differ from source paths"
        );
        for (path, entry) in &source {
            assert_eq!(
                Some(entry),
                replica.get(path),
                "replica entry differs from source at {}",
                path
            );
        }
    }
}

/// Every path under `root`, relative and `/`-separated, with file contents.
pub fn snapshot(root: &Path) -> BTreeMap<String, Entry> {
    let mut entries = BTreeMap::new();
    collect(root, root, &mut entries);
    entries
}

fn collect(root: &Path, dir: &Path, entries: &mut BTreeMap<String, Entry>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        let rel = path
            .strip_prefix(root)
            .unwrap()
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        if path.is_dir() {
            entries.insert(rel, Entry::Dir);
            collect(root, &path, entries);
        } else {
            entries.insert(rel, Entry::File(fs::read(&path).unwrap()));
        }
    }
}

fn write(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn set_mtime(path: &Path, secs: i64) {
    filetime::set_file_mtime(path, FileTime::from_unix_time(secs, 0))
        .unwrap_or_else(|e| panic!("Could not set mtime on {}: {}", path.display(), e));
}
