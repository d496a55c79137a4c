//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::Parser;
use mirror_core::{CompareMode, SyncConfig};

/// Folder mirror - keep a replica folder identical to a source folder
///
/// Runs a synchronization pass immediately and then every INTERVAL seconds
/// until Enter is pressed.
///
/// Examples:
///   mirror ./data /backup/data 30 ./mirror.log
///   mirror --config mirror.toml
///   mirror ./data /backup/data 30 ./mirror.log --once --dry-run
#[derive(Parser, Debug)]
#[command(name = "mirror")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Folder to mirror from (never modified)
    pub source: Option<PathBuf>,

    /// Folder made identical to the source (created if missing)
    pub replica: Option<PathBuf>,

    /// Seconds between the start of consecutive passes
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Append-only log file
    pub log_file: Option<PathBuf>,

    /// TOML, JSON or YAML file providing any of the above; arguments win
    #[arg(short, long, env = "MIRROR_CONFIG")]
    pub config: Option<PathBuf>,

    /// How to decide that an existing replica file is stale
    /// (timestamp, size-timestamp, checksum)
    #[arg(long, value_name = "MODE")]
    pub compare: Option<CompareMode>,

    /// Log what would change without touching the replica
    #[arg(long)]
    pub dry_run: bool,

    /// Run a single pass and exit
    #[arg(long)]
    pub once: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// The configuration layer given on the command line.
    pub fn to_config(&self) -> SyncConfig {
        SyncConfig {
            source: self.source.clone(),
            replica: self.replica.clone(),
            interval_secs: self.interval,
            log_file: self.log_file.clone(),
            compare: self.compare,
            dry_run: self.dry_run.then_some(true),
        }
    }
}
