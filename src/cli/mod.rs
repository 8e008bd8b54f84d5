//! Command-line interface for the Liftoff launcher.
//!
//! Each command is implemented as a separate module with its own argument
//! structure and execution logic:
//!
//! - `run` - Update every component, then launch the application
//! - `update` - Download pending updates without launching
//! - `launch` - Launch immediately, skipping the update check
//! - `check` - Report installed vs. latest versions without downloading
//!
//! # Global Options
//!
//! All commands support these global options:
//! - `--verbose` - Enable debug output
//! - `--quiet` - Suppress all output except errors
//! - `--no-progress` - Disable progress bars
//! - `--root` - Override the install root directory
//! - `--config` - Path to a custom launcher manifest
//!
//! # Example
//!
//! ```bash
//! # Normal startup: update, then launch
//! liftoff run
//!
//! # Scripted update with plain output
//! liftoff --quiet --no-progress update
//!
//! # Start without updating, passing arguments through
//! liftoff launch -- --windowed --profile test
//! ```

mod check;
pub mod common;
mod launch;
mod run;
mod update;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Main CLI structure for the launcher.
///
/// Handles global flags and delegates to subcommands. Global options are
/// available to every subcommand.
#[derive(Parser)]
#[command(
    name = "liftoff",
    about = "Self-updating application launcher",
    version,
    long_about = "Liftoff keeps an installed application current against a remote update \
                  service and starts it once every component is up to date."
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output for debugging.
    ///
    /// Equivalent to setting `RUST_LOG=debug`. Mutually exclusive with
    /// `--quiet`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable progress bars for automation-friendly output.
    #[arg(long, global = true)]
    no_progress: bool,

    /// Install root directory.
    ///
    /// Defaults to the directory holding the launcher executable. Can also
    /// be set through the `LIFTOFF_ROOT` environment variable.
    #[arg(long, global = true, env = "LIFTOFF_ROOT")]
    root: Option<PathBuf>,

    /// Path to the launcher manifest.
    ///
    /// Defaults to `liftoff.toml` in the install root, falling back to the
    /// per-user configuration directory.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Update every component, then launch the application.
    ///
    /// The launcher component is updated first, then the application.
    /// The application only starts when both updates succeeded; a failed
    /// update leaves all persisted state untouched so the next run resumes
    /// where this one stopped.
    Run(run::RunCommand),

    /// Download pending updates without launching.
    Update(update::UpdateCommand),

    /// Launch the application immediately, skipping the update check.
    Launch(launch::LaunchCommand),

    /// Report installed and latest versions without downloading anything.
    Check(check::CheckCommand),
}

impl Cli {
    /// Execute the parsed command.
    pub async fn execute(self) -> Result<()> {
        init_tracing(self.verbose, self.quiet);

        let opts = common::GlobalOpts {
            root: self.root,
            config: self.config,
            quiet: self.quiet,
            no_progress: self.no_progress,
        };

        match self.command {
            Commands::Run(cmd) => cmd.execute(&opts).await,
            Commands::Update(cmd) => cmd.execute(&opts).await,
            Commands::Launch(cmd) => cmd.execute(&opts),
            Commands::Check(cmd) => cmd.execute(&opts).await,
        }
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default_filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .ok();
}
