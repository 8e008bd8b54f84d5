//! The update service boundary.
//!
//! The orchestrator only needs three operations from the server: the latest
//! published revision, the set of files that changed between two revisions,
//! and a way to fetch one file. [`UpdateService`] captures that contract;
//! [`HttpUpdateService`] is the production transport. Tests substitute
//! in-memory implementations.
//!
//! The server is trusted on two points it does not prove: the change listing
//! for a `(from, to)` pair is deterministic, and the reported sizes match
//! what a download actually transfers. Sizes feed progress display only;
//! downloaded byte counts are never validated against them.

pub mod http;

pub use http::HttpUpdateService;

use anyhow::Result;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::version::Version;

/// Every file that must be (re)downloaded to move between two versions.
///
/// Maps server-relative paths to the size in bytes the server will transfer.
/// Keys are unique; iteration follows the server's listing order, which is
/// stable within one run so progress reporting stays monotonic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet(IndexMap<String, u64>);

impl ChangeSet {
    /// Create an empty change set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace one entry.
    pub fn insert(&mut self, path: impl Into<String>, size: u64) {
        self.0.insert(path.into(), size);
    }

    /// Number of files in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `path` is part of the set.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    /// Entries in the server's listing order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(path, size)| (path.as_str(), *size))
    }

    /// Sum of all entry sizes.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.0.values().sum()
    }
}

impl FromIterator<(String, u64)> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The remote update service for one project.
///
/// Implementations perform real network IO; every method is a suspension
/// point and may fail with [`crate::core::LiftoffError::Network`].
#[async_trait]
pub trait UpdateService: Send + Sync {
    /// Newest revision the server offers for this project.
    async fn latest_version(&self) -> Result<Version>;

    /// The cumulative change set for moving from `from` to `to`.
    ///
    /// The server returns the full set for the jump, not per-revision
    /// deltas across intermediate versions.
    async fn changes(&self, from: Version, to: Version) -> Result<ChangeSet>;

    /// Fetch one file of `version` into `dest`, overwriting it.
    async fn download(&self, relative_path: &str, dest: &Path, version: Version) -> Result<()>;
}
