//! Install-root resolution and process launching.
//!
//! Both concerns are deliberately thin seams around the operating system so
//! the update protocol itself stays platform-agnostic: the updater receives
//! a resolved directory and never asks where it came from, and launching is
//! a single spawn with no knowledge of the update state.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

use crate::config::LauncherConfig;
use crate::core::LiftoffError;

/// Environment variable overriding the install root.
pub const ROOT_ENV: &str = "LIFTOFF_ROOT";

/// Resolve the directory the launcher manages.
///
/// Priority: an explicit override (the `--root` flag), the `LIFTOFF_ROOT`
/// environment variable, the directory holding the running executable, and
/// finally the current working directory.
pub fn install_root(override_root: Option<&Path>) -> Result<PathBuf> {
    if let Some(root) = override_root {
        return Ok(root.to_path_buf());
    }

    if let Ok(root) = std::env::var(ROOT_ENV) {
        debug!("install root from {ROOT_ENV}: {root}");
        return Ok(PathBuf::from(root));
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            return Ok(parent.to_path_buf());
        }
    }

    std::env::current_dir().context("Could not determine the install directory")
}

/// Full path of the application executable under `root`.
#[must_use]
pub fn executable_path(config: &LauncherConfig, root: &Path) -> PathBuf {
    root.join(&config.app.dir).join(&config.app.executable)
}

/// Start the configured application, detached from the launcher.
///
/// Configured arguments come first, then `extra_args` from the command
/// line. The child runs with the application directory as its working
/// directory; the launcher does not wait for it.
pub fn launch(config: &LauncherConfig, root: &Path, extra_args: &[String]) -> Result<()> {
    let exe = executable_path(config, root);

    if !exe.exists() {
        return Err(LiftoffError::LaunchFailed {
            executable: exe.display().to_string(),
            reason: "executable not found".to_string(),
        }
        .into());
    }

    info!("launching {}", exe.display());

    let mut command = Command::new(&exe);
    command.current_dir(root.join(&config.app.dir));
    command.args(&config.app.args);
    command.args(extra_args);

    command.spawn().map_err(|e| LiftoffError::LaunchFailed {
        executable: exe.display().to_string(),
        reason: e.to_string(),
    })?;

    Ok(())
}
