//! Persisted update state for one target directory.
//!
//! Two small JSON records drive the resumable update protocol:
//!
//! - [`VersionRecord`] is the durable "installed version" marker. It is
//!   rewritten only after every file of an update is on disk, so a target
//!   directory is always either fully on one version or carrying an
//!   explicit in-progress record.
//! - [`ProgressRecord`] tracks an in-flight update: the version being
//!   fetched and which files have already landed. It is persisted after
//!   every single file, so an interrupted run loses at most one file's
//!   worth of work. Absence of the file means no update is in progress.
//!
//! Both records treat unreadable content leniently. A corrupt progress file
//! is the same as no progress file; a corrupt version record is reported as
//! [`LiftoffError::StateCorruption`] and callers substitute the default,
//! which at worst causes a full refetch.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::core::LiftoffError;
use crate::utils::fs::atomic_write;
use crate::version::Version;

/// Name of the installed-version marker inside a target directory.
pub const VERSION_FILE: &str = "version.json";

/// Name of the in-flight progress record inside a target directory.
pub const PROGRESS_FILE: &str = "update-progress.json";

/// The durable installed-version marker for one target directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// The fully installed revision; [`Version::NONE`] on first install.
    pub version: Version,
    /// When the last successful update committed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl VersionRecord {
    /// Create a record for a freshly committed version, stamped with the
    /// current time.
    #[must_use]
    pub fn new(version: Version) -> Self {
        Self {
            version,
            updated_at: Some(Utc::now()),
        }
    }

    /// Load the record from disk.
    ///
    /// An absent or empty file yields the default record. A file that exists
    /// but does not parse is reported as [`LiftoffError::StateCorruption`];
    /// see [`VersionRecord::load_or_default`] for the recovering variant.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Cannot read version record: {}", path.display()))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_json::from_str(&content).map_err(|e| {
            LiftoffError::StateCorruption {
                file: path.display().to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Load the record, substituting the default when the file is corrupt.
    ///
    /// Corruption is logged and recovered; genuine IO failures (permissions,
    /// unreadable directories) still propagate.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(record) => Ok(record),
            Err(err) => match err.downcast_ref::<LiftoffError>() {
                Some(LiftoffError::StateCorruption {
                    file, ..
                }) => {
                    warn!("version record {file} is unreadable, treating as not installed");
                    Ok(Self::default())
                }
                _ => Err(err),
            },
        }
    }

    /// Persist the record atomically (write-to-temp-then-rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize version record")?;
        atomic_write(path, content.as_bytes())
            .with_context(|| format!("Cannot write version record: {}", path.display()))
    }
}

/// The in-flight download record for one target directory.
///
/// `downloaded_files` holds server-relative paths exactly as the change
/// listing reported them (separator included), in completion order. Every
/// entry is a file that finished downloading; paths are appended strictly
/// after their download succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    /// The version this download is working toward.
    pub target_version: Version,
    /// Server-relative paths already fully downloaded.
    #[serde(default)]
    pub downloaded_files: Vec<String>,
}

impl ProgressRecord {
    /// Start tracking a download toward `target`.
    #[must_use]
    pub fn new(target: Version) -> Self {
        Self {
            target_version: target,
            downloaded_files: Vec::new(),
        }
    }

    /// Load the record from disk.
    ///
    /// Absent, empty, and unparseable files all yield a fresh record. A
    /// corrupt progress file must never block future updates; it only costs
    /// refetching files that were already complete.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };

        if content.trim().is_empty() {
            return Self::default();
        }

        match serde_json::from_str(&content) {
            Ok(record) => record,
            Err(err) => {
                warn!("ignoring unparseable progress record {}: {err}", path.display());
                Self::default()
            }
        }
    }

    /// Persist the record atomically. Called after every completed file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize progress record")?;
        atomic_write(path, content.as_bytes())
            .with_context(|| format!("Cannot write progress record: {}", path.display()))
    }

    /// Retarget the record at the server's latest version.
    ///
    /// If the record was tracking a different version, all prior progress is
    /// discarded: files listed for the old version cannot be trusted to
    /// match the new one even when paths coincide. Returns `true` when
    /// progress was thrown away.
    pub fn reconcile(&mut self, latest: Version) -> bool {
        if self.target_version == latest {
            return false;
        }

        let discarded = !self.downloaded_files.is_empty();
        if discarded {
            warn!(
                "download progress was for {}, but the latest version is {}; starting over",
                self.target_version, latest
            );
        }

        self.target_version = latest;
        self.downloaded_files.clear();
        discarded
    }

    /// Whether `path` has already been fully downloaded.
    #[must_use]
    pub fn is_downloaded(&self, path: &str) -> bool {
        self.downloaded_files.iter().any(|p| p == path)
    }

    /// Record `path` as fully downloaded.
    pub fn mark_downloaded(&mut self, path: &str) {
        if !self.is_downloaded(path) {
            self.downloaded_files.push(path.to_string());
        }
    }

    /// Remove the on-disk record; absence means "no update in progress".
    pub fn clear(path: &Path) -> Result<()> {
        if path.exists() {
            fs::remove_file(path)
                .with_context(|| format!("Cannot remove progress record: {}", path.display()))?;
        }
        Ok(())
    }
}
