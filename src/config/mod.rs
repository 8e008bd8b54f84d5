//! The launcher manifest (liftoff.toml).
//!
//! The manifest is read-only configuration shipped next to the launcher
//! binary. It names the update endpoint, the two managed projects (the
//! launcher itself and the application), and the executable to start once
//! everything is current.
//!
//! # File Format
//!
//! ```toml
//! support_site = "https://forum.example.com"
//!
//! [remote]
//! endpoint = "https://updates.example.com/projects"
//! launcher_project = "launcher"
//! app_project = "game"
//!
//! [app]
//! dir = "game"
//! executable = "game-bin"
//! args = ["--windowed"]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::LiftoffError;

/// File name of the launcher manifest.
pub const CONFIG_FILE: &str = "liftoff.toml";

/// Read-only launcher configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// Update service settings.
    pub remote: RemoteConfig,
    /// What to launch and how.
    pub app: AppConfig,
    /// Where users should report unexpected errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_site: Option<String>,
}

/// Update service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the update service, e.g.
    /// `https://updates.example.com/projects`.
    pub endpoint: String,
    /// Project name covering the launcher's own files.
    #[serde(default = "default_launcher_project")]
    pub launcher_project: String,
    /// Project name covering the application's files.
    pub app_project: String,
}

/// The application the launcher starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory under the install root holding the application. This is
    /// also the target directory for the application project's updates.
    pub dir: String,
    /// Executable file name inside [`AppConfig::dir`].
    pub executable: String,
    /// Arguments passed on every launch.
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_launcher_project() -> String {
    "launcher".to_string()
}

impl LauncherConfig {
    /// Load the manifest from an explicit path.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(LiftoffError::ConfigNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Cannot read launcher manifest: {}", path.display()))?;

        toml::from_str(&content).map_err(|e| {
            LiftoffError::ConfigParseError {
                file: path.display().to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Locate and load the manifest.
    ///
    /// An explicit path wins. Otherwise the install root is searched first,
    /// then the per-user configuration directory (`~/.config/liftoff` on
    /// Linux).
    pub fn find(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let local = root.join(CONFIG_FILE);
        if local.exists() {
            return Self::load(&local);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user = config_dir.join("liftoff").join(CONFIG_FILE);
            if user.exists() {
                return Self::load(&user);
            }
        }

        Err(LiftoffError::ConfigNotFound {
            path: local.display().to_string(),
        }
        .into())
    }
}
