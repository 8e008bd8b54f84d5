//! Shared plumbing for CLI commands.

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;
use tracing::debug;

use crate::config::LauncherConfig;
use crate::core::LiftoffError;
use crate::launcher;
use crate::remote::HttpUpdateService;
use crate::updater::{Outcome, ProgressSink, Updater};
use crate::utils::fs::format_bytes;
use crate::utils::progress::TransferBar;

/// Global flags shared by every subcommand.
pub struct GlobalOpts {
    /// Install root override (`--root` / `LIFTOFF_ROOT`).
    pub root: Option<PathBuf>,
    /// Manifest path override (`--config`).
    pub config: Option<PathBuf>,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Disable progress bars.
    pub no_progress: bool,
}

/// One of the two managed components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Component {
    /// The launcher's own files, installed at the root.
    Launcher,
    /// The application's files, installed under the configured app dir.
    App,
}

/// Resolved launcher environment: install root plus manifest.
pub struct LauncherEnv {
    /// The directory the launcher manages.
    pub root: PathBuf,
    /// The loaded manifest.
    pub config: LauncherConfig,
}

impl LauncherEnv {
    /// Which remote project a component maps to.
    #[must_use]
    pub fn project_name(&self, component: Component) -> &str {
        match component {
            Component::Launcher => &self.config.remote.launcher_project,
            Component::App => &self.config.remote.app_project,
        }
    }

    /// Build the updater for a component. The launcher component targets
    /// the install root itself; the application targets its subdirectory.
    #[must_use]
    pub fn updater_for(&self, component: Component) -> Updater<HttpUpdateService> {
        let service =
            HttpUpdateService::new(&self.config.remote.endpoint, self.project_name(component));
        let target = match component {
            Component::Launcher => self.root.clone(),
            Component::App => self.root.join(&self.config.app.dir),
        };
        Updater::new(service, target)
    }
}

/// Resolve the install root and load the manifest.
pub fn load_env(opts: &GlobalOpts) -> Result<LauncherEnv> {
    let root = launcher::install_root(opts.root.as_deref())?;
    debug!("install root: {}", root.display());
    let config = LauncherConfig::find(&root, opts.config.as_deref())?;
    Ok(LauncherEnv {
        root,
        config,
    })
}

/// Progress sink rendering a transfer bar for one update run.
///
/// The bar is created lazily on the first completed file, when the total
/// byte count becomes known.
pub struct BarSink {
    enabled: bool,
    bar: Option<TransferBar>,
}

impl BarSink {
    /// Create a sink; `enabled = false` swallows all events.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            bar: None,
        }
    }

    /// Clear the bar from the terminal.
    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

impl ProgressSink for BarSink {
    fn file_completed(&mut self, path: &str, bytes_done: u64, bytes_total: u64) {
        let enabled = self.enabled;
        let bar = self.bar.get_or_insert_with(|| TransferBar::new(bytes_total, enabled));
        bar.set_message(path.to_string());
        bar.set_position(bytes_done);
    }
}

/// Run one component's update and report the outcome on stdout.
pub async fn run_update(
    env: &LauncherEnv,
    component: Component,
    opts: &GlobalOpts,
) -> Result<Outcome> {
    let updater = env.updater_for(component);
    let name = env.project_name(component).to_string();

    if !opts.quiet {
        println!("Checking for updates to {name}...");
    }

    let mut sink = BarSink::new(!opts.quiet && !opts.no_progress);
    let result = updater.run(&mut sink).await;
    sink.finish();

    match &result {
        Ok(Outcome::UpToDate {
            version,
        }) => {
            if !opts.quiet {
                println!("{name} is up to date ({version})");
            }
        }
        Ok(Outcome::Updated {
            from,
            to,
            files,
            bytes,
        }) => {
            if !opts.quiet {
                println!(
                    "{} {name} updated {from} -> {to} ({files} file(s), {})",
                    "✓".green(),
                    format_bytes(*bytes)
                );
            }
        }
        Err(_) => {}
    }

    result.map_err(|err| attach_support_hint(err, env.config.support_site.as_deref()))
}

/// Point users at the support site for failures that are not plain
/// connectivity problems.
fn attach_support_hint(err: anyhow::Error, site: Option<&str>) -> anyhow::Error {
    let transport =
        err.downcast_ref::<LiftoffError>().is_some_and(LiftoffError::is_transport);

    match site {
        Some(site) if !transport => {
            err.context(format!("An unexpected error occurred. Please report this at {site}"))
        }
        _ => err,
    }
}
