//! Update everything, then launch.
//!
//! This is the normal startup path. The launcher component updates first
//! (into the install root), then the application (into its subdirectory),
//! and only when both runs finish cleanly is the application started. A
//! failed launcher update does not stop the application update from being
//! attempted, but any failure blocks the launch.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tracing::warn;

use super::common::{self, Component, GlobalOpts};
use crate::launcher;
use crate::updater::Outcome;

/// Command to update every component and then launch the application.
#[derive(Args)]
pub struct RunCommand {
    /// Extra arguments appended to the application's configured ones.
    ///
    /// Everything after `--` is passed through verbatim.
    #[arg(last = true)]
    args: Vec<String>,
}

impl RunCommand {
    /// Execute the update-then-launch chain.
    ///
    /// The two update outcomes are threaded explicitly into the launch
    /// decision: the application starts if and only if both component
    /// updates returned successfully. On failure the first error is
    /// returned after both components had their chance to update.
    pub async fn execute(self, opts: &GlobalOpts) -> Result<()> {
        let env = common::load_env(opts)?;

        let launcher_result = common::run_update(&env, Component::Launcher, opts).await;

        if let Ok(Outcome::Updated {
            ..
        }) = &launcher_result
        {
            if !opts.quiet {
                println!(
                    "{}",
                    "The launcher itself was updated; restart it to pick up the new version."
                        .yellow()
                );
            }
        }
        if launcher_result.is_err() {
            warn!("launcher update failed; the application will not be started");
        }

        let app_result = common::run_update(&env, Component::App, opts).await;

        match (launcher_result, app_result) {
            (Ok(_), Ok(_)) => launcher::launch(&env.config, &env.root, &self.args),
            (launcher_result, app_result) => launcher_result.and(app_result).map(|_| ()),
        }
    }
}
