//! Download pending updates without launching.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::common::{self, Component, GlobalOpts};
use crate::updater::Outcome;

/// Command to bring components up to date without starting the application.
///
/// # Examples
///
/// Update everything:
/// ```bash
/// liftoff update
/// ```
///
/// Update a single component:
/// ```bash
/// liftoff update --component app
/// ```
#[derive(Args)]
pub struct UpdateCommand {
    /// Update only one component instead of all of them.
    #[arg(long, value_enum)]
    component: Option<Component>,
}

impl UpdateCommand {
    /// Execute the update command.
    ///
    /// Components update in a fixed order, launcher first. The first
    /// failure aborts; rerunning resumes from the last completed file.
    pub async fn execute(self, opts: &GlobalOpts) -> Result<()> {
        let env = common::load_env(opts)?;

        let components = match self.component {
            Some(component) => vec![component],
            None => vec![Component::Launcher, Component::App],
        };

        let mut restart_required = false;
        for component in components {
            let outcome = common::run_update(&env, component, opts).await?;
            if component == Component::Launcher
                && matches!(
                    outcome,
                    Outcome::Updated {
                        ..
                    }
                )
            {
                restart_required = true;
            }
        }

        if restart_required && !opts.quiet {
            println!(
                "{}",
                "The launcher itself was updated; restart it to pick up the new version.".yellow()
            );
        }

        Ok(())
    }
}
