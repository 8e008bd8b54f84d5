//! Report installed and latest versions without downloading.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::common::{self, Component, GlobalOpts};
use crate::remote::UpdateService;

/// Command to show the update status of every component.
///
/// Queries the server for the latest version of each component and compares
/// it with the local state, including any resumable download progress.
/// Performs zero downloads and writes nothing.
#[derive(Args)]
pub struct CheckCommand {}

impl CheckCommand {
    /// Execute the status check.
    pub async fn execute(self, opts: &GlobalOpts) -> Result<()> {
        let env = common::load_env(opts)?;

        for component in [Component::Launcher, Component::App] {
            let updater = env.updater_for(component);
            let name = env.project_name(component);

            let installed = updater.installed_version()?;
            let latest = updater.service().latest_version().await?;

            if installed >= latest {
                println!("{name}: {installed} {}", "(up to date)".green());
                continue;
            }

            let pending = updater.pending_progress();
            let resumable = pending.target_version == latest
                && !pending.downloaded_files.is_empty();

            if resumable {
                println!(
                    "{name}: {installed} installed, {latest} {} ({} file(s) already fetched)",
                    "available".yellow(),
                    pending.downloaded_files.len()
                );
            } else {
                println!("{name}: {installed} installed, {latest} {}", "available".yellow());
            }
        }

        Ok(())
    }
}
