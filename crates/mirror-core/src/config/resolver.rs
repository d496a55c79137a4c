//! Configuration layering
//!
//! A [`SyncConfig`] is a partial configuration as found in a config file or
//! on the command line. Layers are combined with [`SyncConfig::overlay`],
//! later layers overriding earlier ones, and the result is checked for
//! completeness by [`SyncConfig::resolve`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use mirror_fs::ConfigStore;
use serde::Deserialize;

use super::roots::SyncRoots;
use crate::compare::CompareMode;
use crate::sync::SyncOptions;
use crate::{Error, Result};

/// A partial run configuration.
///
/// Every field is optional so that a config file may supply some values and
/// the command line the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Source tree root
    pub source: Option<PathBuf>,
    /// Replica tree root
    pub replica: Option<PathBuf>,
    /// Seconds between the start of consecutive passes
    pub interval_secs: Option<u64>,
    /// Append-only log file
    pub log_file: Option<PathBuf>,
    /// Change detection strategy
    pub compare: Option<CompareMode>,
    /// Plan actions without touching the replica
    pub dry_run: Option<bool>,
}

/// A complete, validated run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub roots: SyncRoots,
    pub interval: Duration,
    pub log_file: PathBuf,
    pub options: SyncOptions,
}

impl SyncConfig {
    /// Load a partial configuration from a TOML, JSON or YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        tracing::debug!(?path, "Loading config file");
        Ok(ConfigStore::new().load(path)?)
    }

    /// Combine two layers; values present in `higher` win.
    pub fn overlay(self, higher: SyncConfig) -> SyncConfig {
        SyncConfig {
            source: higher.source.or(self.source),
            replica: higher.replica.or(self.replica),
            interval_secs: higher.interval_secs.or(self.interval_secs),
            log_file: higher.log_file.or(self.log_file),
            compare: higher.compare.or(self.compare),
            dry_run: higher.dry_run.or(self.dry_run),
        }
    }

    /// Check that every required value is present and valid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first missing or invalid value.
    pub fn resolve(self) -> Result<RunConfig> {
        let source = self.source.ok_or_else(|| Error::config("source folder is required"))?;
        let replica = self
            .replica
            .ok_or_else(|| Error::config("replica folder is required"))?;
        let interval_secs = self
            .interval_secs
            .ok_or_else(|| Error::config("sync interval is required"))?;
        if interval_secs == 0 {
            return Err(Error::config("sync interval must be a positive number of seconds"));
        }
        let log_file = self.log_file.ok_or_else(|| Error::config("log file path is required"))?;

        Ok(RunConfig {
            roots: SyncRoots::new(source, replica),
            interval: Duration::from_secs(interval_secs),
            log_file,
            options: SyncOptions {
                dry_run: self.dry_run.unwrap_or(false),
                compare: self.compare.unwrap_or_default(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn complete() -> SyncConfig {
        SyncConfig {
            source: Some("src".into()),
            replica: Some("dst".into()),
            interval_secs: Some(30),
            log_file: Some("sync.log".into()),
            compare: None,
            dry_run: None,
        }
    }

    #[test]
    fn resolve_applies_defaults() {
        let run = complete().resolve().unwrap();

        assert_eq!(run.roots, SyncRoots::new("src", "dst"));
        assert_eq!(run.interval, Duration::from_secs(30));
        assert_eq!(run.options, SyncOptions::default());
    }

    #[test]
    fn resolve_rejects_zero_interval() {
        let config = SyncConfig {
            interval_secs: Some(0),
            ..complete()
        };

        let err = config.resolve().unwrap_err();
        assert!(err.to_string().contains("positive"), "got: {}", err);
    }

    #[test]
    fn resolve_reports_missing_replica() {
        let config = SyncConfig {
            replica: None,
            ..complete()
        };

        let err = config.resolve().unwrap_err();
        assert!(err.to_string().contains("replica"), "got: {}", err);
    }

    #[test]
    fn overlay_prefers_higher_layer() {
        let file = SyncConfig {
            compare: Some(CompareMode::Checksum),
            ..complete()
        };
        let cli = SyncConfig {
            interval_secs: Some(5),
            ..SyncConfig::default()
        };

        let merged = file.overlay(cli);

        assert_eq!(merged.interval_secs, Some(5));
        assert_eq!(merged.source, Some(PathBuf::from("src")));
        assert_eq!(merged.compare, Some(CompareMode::Checksum));
    }

    #[test]
    fn load_toml_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mirror.toml");
        fs::write(
            &path,
            "source = \"/data/in\"\nreplica = \"/data/out\"\ninterval_secs = 10\ncompare = \"size-timestamp\"\n",
        )
        .unwrap();

        let config = SyncConfig::load(&path).unwrap();

        assert_eq!(config.source, Some(PathBuf::from("/data/in")));
        assert_eq!(config.interval_secs, Some(10));
        assert_eq!(config.compare, Some(CompareMode::SizeTimestamp));
        assert_eq!(config.log_file, None);
    }

    #[test]
    fn load_rejects_unknown_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mirror.toml");
        fs::write(&path, "sauce = \"/data/in\"\n").unwrap();

        assert!(SyncConfig::load(&path).is_err());
    }
}
