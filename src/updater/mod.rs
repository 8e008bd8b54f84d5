//! The resumable update orchestrator.
//!
//! One [`Updater`] run moves a target directory from its installed version
//! to the server's latest, in a strictly sequential chain:
//!
//! 1. Compare the installed version against the server's latest; if the
//!    local side is current (or ahead), stop without touching anything.
//! 2. Fetch the cumulative change set for the jump.
//! 3. Load the progress record and retarget it if it was tracking a version
//!    that is no longer the latest.
//! 4. Download every file not already recorded as complete, one at a time.
//!    Each file's destination is deleted first so leftovers from a crashed
//!    run can never merge with a fresh download, and the progress record is
//!    persisted immediately after each file lands.
//! 5. Commit: write the version record, then delete the progress record.
//!    The order matters. A crash between the two writes leaves a stale
//!    progress file next to an already-current version record, which the
//!    next run ignores (version check short-circuits) or discards (the
//!    reconciliation rule, if the server moved on again).
//!
//! Any network failure aborts the run and leaves both records at their
//! last-persisted state. There is no automatic retry; rerunning the
//! orchestrator resumes from the last completed file. Downloaded byte
//! counts are never validated against the sizes the server reported, and
//! no checksums are consulted; sizes drive progress display only.
//!
//! A single updater process is assumed per target directory. Concurrent
//! runs would interleave progress-record writes; no file locking guards
//! against that.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::remote::UpdateService;
use crate::state::{PROGRESS_FILE, ProgressRecord, VERSION_FILE, VersionRecord};
use crate::utils::fs::ensure_dir;
use crate::utils::platform::sanitize_entry;
use crate::version::Version;

#[cfg(test)]
mod tests;

/// How a completed update run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The installed version already matches (or is ahead of) the server.
    /// Nothing was downloaded and no record was written.
    UpToDate {
        /// The installed version.
        version: Version,
    },
    /// The target directory now fully holds `to`.
    Updated {
        /// Version installed before the run.
        from: Version,
        /// Version installed after the run.
        to: Version,
        /// Files downloaded by this run (resumed files are not counted).
        files: usize,
        /// Bytes downloaded by this run, per the server's reported sizes.
        bytes: u64,
    },
}

/// Receives one event per fully downloaded file.
///
/// `bytes_done` and `bytes_total` cover the files this run still had to
/// fetch; there is no mid-file granularity.
pub trait ProgressSink {
    /// Called after `path` has been downloaded and recorded.
    fn file_completed(&mut self, path: &str, bytes_done: u64, bytes_total: u64);
}

/// Sink for quiet mode and tests.
pub struct Discard;

impl ProgressSink for Discard {
    fn file_completed(&mut self, _path: &str, _bytes_done: u64, _bytes_total: u64) {}
}

/// Drives the resumable update of one target directory against one project
/// on the update service.
pub struct Updater<S> {
    service: S,
    target_dir: PathBuf,
}

impl<S: UpdateService> Updater<S> {
    /// Bind `service` to `target_dir`. The directory is created lazily,
    /// only once an update actually has files to place there.
    pub fn new(service: S, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            service,
            target_dir: target_dir.into(),
        }
    }

    /// The directory this updater manages.
    #[must_use]
    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// The update service this updater talks to.
    #[must_use]
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Path of the installed-version marker.
    #[must_use]
    pub fn version_file(&self) -> PathBuf {
        self.target_dir.join(VERSION_FILE)
    }

    /// Path of the in-flight progress record.
    #[must_use]
    pub fn progress_file(&self) -> PathBuf {
        self.target_dir.join(PROGRESS_FILE)
    }

    /// Currently installed version, with corruption collapsed to
    /// "nothing installed".
    pub fn installed_version(&self) -> Result<Version> {
        Ok(VersionRecord::load_or_default(&self.version_file())?.version)
    }

    /// The progress record currently on disk, if any update is in flight.
    #[must_use]
    pub fn pending_progress(&self) -> ProgressRecord {
        ProgressRecord::load(&self.progress_file())
    }

    /// Run one update to completion.
    ///
    /// Returns [`Outcome::UpToDate`] without side effects when there is
    /// nothing to do. On any error the version record and progress record
    /// are left at their last-persisted state; rerunning resumes from
    /// there.
    pub async fn run(&self, progress: &mut dyn ProgressSink) -> Result<Outcome> {
        let local = self.installed_version()?;
        let latest = self.service.latest_version().await?;
        debug!("local version: {local}, latest version: {latest}");

        if local >= latest {
            info!("{} is up to date ({local})", self.target_dir.display());
            return Ok(Outcome::UpToDate {
                version: local,
            });
        }

        info!("updating {} from {local} to {latest}", self.target_dir.display());
        let changes = self.service.changes(local, latest).await?;

        ensure_dir(&self.target_dir)?;

        let progress_path = self.progress_file();
        let mut record = ProgressRecord::load(&progress_path);
        record.reconcile(latest);

        let changes_left: Vec<(&str, u64)> =
            changes.iter().filter(|(path, _)| !record.is_downloaded(path)).collect();
        let bytes_total: u64 = changes_left.iter().map(|(_, size)| size).sum();

        debug!(
            "{} of {} files still to download ({bytes_total} bytes)",
            changes_left.len(),
            changes.len()
        );

        let mut bytes_done = 0u64;
        let mut files_done = 0usize;

        for (path, size) in changes_left {
            let dest = self.target_dir.join(sanitize_entry(path)?);

            // A leftover from a crashed run must not merge with the fresh
            // download through append or truncate ambiguity.
            if dest.exists() {
                fs::remove_file(&dest)
                    .with_context(|| format!("Failed to remove stale file {}", dest.display()))?;
            }

            self.service.download(path, &dest, latest).await?;

            bytes_done += size;
            files_done += 1;
            progress.file_completed(path, bytes_done, bytes_total);

            record.mark_downloaded(path);
            record.save(&progress_path)?;
        }

        // Commit order is load-bearing: the version marker goes first, the
        // progress record is deleted second.
        VersionRecord::new(latest).save(&self.version_file())?;
        ProgressRecord::clear(&progress_path)?;

        info!("finished updating {} to {latest} ({files_done} files)", self.target_dir.display());

        Ok(Outcome::Updated {
            from: local,
            to: latest,
            files: files_done,
            bytes: bytes_done,
        })
    }
}
