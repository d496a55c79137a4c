//! Relative path identity shared by the source and replica trees

use std::ffi::{OsStr, OsString};
use std::path::{Component, Path, PathBuf};

use crate::{Error, Result};

/// A location relative to a tree root, held as its native name segments.
///
/// The same `RelativePath` names "the same entry" in the source tree and in
/// the replica tree. It is resolved against a root only at I/O boundaries
/// via [`RelativePath::under`]. The empty path denotes the root itself.
///
/// Segments keep the platform's exact bytes, so names that are not valid
/// UTF-8 still resolve to the same entry. Only [`Display`](std::fmt::Display)
/// is lossy, joining segments with forward slashes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RelativePath {
    segments: Vec<OsString>,
}

impl RelativePath {
    /// The relative path of a tree root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Create a relative path from any path-like input.
    ///
    /// Backslashes in UTF-8 input become forward slashes, and empty, `.` and
    /// leading `/` segments are dropped.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let segments = match path.to_str() {
            Some(text) => text
                .split(['/', '\\'])
                .filter(|segment| !segment.is_empty() && *segment != ".")
                .map(OsString::from)
                .collect(),
            None => path
                .components()
                .filter_map(|component| match component {
                    Component::Normal(name) => Some(name.to_os_string()),
                    _ => None,
                })
                .collect(),
        };
        Self { segments }
    }

    /// Compute the path of `path` relative to `root`.
    pub fn from_root(root: &Path, path: &Path) -> Result<Self> {
        let stripped = path.strip_prefix(root).map_err(|_| Error::OutsideRoot {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        })?;

        let mut segments = Vec::new();
        for component in stripped.components() {
            match component {
                Component::Normal(name) => segments.push(name.to_os_string()),
                Component::CurDir => {}
                _ => {
                    return Err(Error::OutsideRoot {
                        path: path.to_path_buf(),
                        root: root.to_path_buf(),
                    });
                }
            }
        }

        Ok(Self { segments })
    }

    /// Whether this is the root of its tree.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Resolve this path against a tree root, producing a native path.
    pub fn under(&self, root: &Path) -> PathBuf {
        let mut native = root.to_path_buf();
        native.extend(&self.segments);
        native
    }

    /// Append a single entry name, taken verbatim.
    pub fn join(&self, name: impl AsRef<OsStr>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.as_ref().to_os_string());
        Self { segments }
    }

    /// Get the parent directory, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.segments.split_last()?;
        Some(Self {
            segments: parent.to_vec(),
        })
    }
}

impl std::fmt::Display for RelativePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.segments.is_empty() {
            return write!(f, ".");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{}", segment.to_string_lossy())?;
        }
        Ok(())
    }
}

impl From<&str> for RelativePath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RelativePath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_normalizes_separators_and_dots() {
        assert_eq!(RelativePath::new("a\\b/./c/").to_string(), "a/b/c");
        assert_eq!(RelativePath::new("/a//b").to_string(), "a/b");
    }

    #[test]
    fn root_displays_as_dot() {
        assert!(RelativePath::root().is_root());
        assert_eq!(RelativePath::root().to_string(), ".");
    }

    #[test]
    fn from_root_strips_prefix() {
        let root = Path::new("/data/source");
        let rel = RelativePath::from_root(root, &root.join("docs").join("a.txt")).unwrap();
        assert_eq!(rel, RelativePath::new("docs/a.txt"));
    }

    #[test]
    fn from_root_rejects_foreign_path() {
        let result = RelativePath::from_root(Path::new("/data/source"), Path::new("/etc/passwd"));
        assert!(matches!(result, Err(Error::OutsideRoot { .. })));
    }

    #[test]
    fn under_resolves_against_any_root() {
        let rel = RelativePath::new("sub/file.txt");
        assert_eq!(
            rel.under(Path::new("/replica")),
            Path::new("/replica").join("sub").join("file.txt")
        );
        assert_eq!(RelativePath::root().under(Path::new("/replica")), Path::new("/replica"));
    }

    #[test]
    fn parent_walks_up_to_root() {
        let rel = RelativePath::new("a/b");
        let parent = rel.parent().unwrap();
        assert_eq!(parent, RelativePath::new("a"));
        assert!(parent.parent().unwrap().is_root());
        assert!(RelativePath::root().parent().is_none());
    }

    #[test]
    fn join_from_root_has_no_leading_separator() {
        assert_eq!(RelativePath::root().join("x").to_string(), "x");
        assert_eq!(RelativePath::new("x").join("y"), RelativePath::new("x/y"));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_segments_are_kept_verbatim() {
        use std::os::unix::ffi::OsStrExt;

        let name = OsStr::from_bytes(b"d\xff");
        let rel = RelativePath::root().join(name).join("f.txt");
        let native = rel.under(Path::new("/replica"));

        assert_eq!(native, Path::new("/replica").join(name).join("f.txt"));
        assert_eq!(RelativePath::from_root(Path::new("/replica"), &native).unwrap(), rel);
        assert_eq!(rel.to_string(), "d\u{FFFD}/f.txt");
    }
}
