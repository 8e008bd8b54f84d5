//! Liftoff - a self-updating application launcher
//!
//! Liftoff keeps an installed application current against a remote update
//! service and starts it once every component is up to date. Updates are
//! incremental: the server reports which files changed between the installed
//! revision and the latest one, and only those files are fetched.
//!
//! # Architecture Overview
//!
//! Each managed component (the launcher itself and the application it starts)
//! lives in its own target directory holding two small state files:
//! - `version.json` records the installed revision and is only rewritten
//!   after an update completes in full
//! - `update-progress.json` records which files of an in-flight update have
//!   already landed, so an interrupted download resumes where it stopped
//!
//! The update run itself is a strictly sequential chain: check the latest
//! revision, fetch the change listing, download each file one at a time, and
//! commit the new version marker last. There is no parallel download and no
//! automatic retry; a failed run leaves both state files exactly as the last
//! completed file left them.
//!
//! # Core Modules
//!
//! - [`cli`] - Command-line interface (`run`, `update`, `launch`, `check`)
//! - [`config`] - The `liftoff.toml` launcher manifest
//! - [`core`] - Error taxonomy and user-facing error reporting
//! - [`remote`] - Update service contract and its HTTP implementation
//! - [`state`] - Version and progress records persisted per target directory
//! - [`updater`] - The resumable update orchestrator
//! - [`launcher`] - Install-root resolution and process launching
//! - [`utils`] - Atomic file writes, path normalization, progress bars
//! - [`version`] - Revision identifiers handed out by the update service
//!
//! # Manifest Format (liftoff.toml)
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
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Update everything, then start the application
//! liftoff run
//!
//! # Only download pending updates
//! liftoff update
//!
//! # Start without checking for updates
//! liftoff launch
//!
//! # Show installed and latest versions
//! liftoff check
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod launcher;
pub mod remote;
pub mod state;
pub mod updater;
pub mod utils;
pub mod version;
