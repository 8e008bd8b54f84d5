//! Launch immediately, skipping the update check.

use anyhow::Result;
use clap::Args;

use super::common::{self, GlobalOpts};
use crate::launcher;

/// Command to start the application without checking for updates.
///
/// # Examples
///
/// ```bash
/// liftoff launch
/// liftoff launch -- --windowed
/// ```
#[derive(Args)]
pub struct LaunchCommand {
    /// Extra arguments appended to the application's configured ones.
    #[arg(last = true)]
    args: Vec<String>,
}

impl LaunchCommand {
    /// Resolve the environment and spawn the application.
    pub fn execute(self, opts: &GlobalOpts) -> Result<()> {
        let env = common::load_env(opts)?;
        launcher::launch(&env.config, &env.root, &self.args)
    }
}
