//! Folder Mirror CLI
//!
//! Keeps a replica folder identical to a source folder, one pass per
//! interval, until the operator presses Enter.

mod cli;
mod error;
mod interactive;
mod logging;

use std::io;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use mirror_core::{PassStatus, RunConfig, Scheduler, SyncConfig, Synchronizer};

use cli::Cli;
use error::Result;
use interactive::ExitSignal;

/// Exit code when a `--once` pass was aborted.
const EXIT_ABORTED: i32 = 2;

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    let base = match &cli.config {
        Some(path) => SyncConfig::load(path)?,
        None => SyncConfig::default(),
    };
    let RunConfig {
        roots,
        interval,
        log_file,
        options,
    } = base.overlay(cli.to_config()).resolve()?;

    // Checked before logging starts so a bad source never creates a log file.
    roots.validate_source()?;
    roots.validate_disjoint()?;

    logging::init(&log_file, cli.verbose)?;
    tracing::debug!(
        source = %roots.source.display(),
        replica = %roots.replica.display(),
        interval_secs = interval.as_secs(),
        compare = %options.compare,
        dry_run = options.dry_run,
        "Configuration resolved"
    );

    let synchronizer = Arc::new(Synchronizer::new(roots).with_options(options));
    synchronizer.prepare()?;

    if cli.once {
        let report = synchronizer.run_pass();
        return Ok(match report.status {
            PassStatus::Aborted { .. } => EXIT_ABORTED,
            PassStatus::Completed | PassStatus::Skipped => 0,
        });
    }

    let handle = Scheduler::new(interval).spawn(synchronizer)?;
    println!("{}", "Press [Enter] to exit".cyan());

    let stats = match interactive::wait_for_exit(io::stdin().lock()) {
        ExitSignal::Requested => handle.shutdown()?,
        ExitSignal::InputClosed => {
            tracing::debug!("Standard input closed; running until terminated");
            handle.join()?
        }
    };
    tracing::debug!(
        passes = stats.passes,
        aborted = stats.aborted,
        missed_ticks = stats.missed_ticks,
        "Stopped"
    );

    Ok(0)
}
