//! Platform path handling for change-set entries.
//!
//! The update server reports relative paths with whatever separator the
//! release tooling used, historically backslashes. Entries are normalized to
//! the platform separator before they touch the filesystem, and validated so
//! a hostile or misconfigured server cannot write outside the install
//! directory.

use crate::core::LiftoffError;
use anyhow::Result;
use std::path::{Component, Path, PathBuf};

/// Rewrites a change-set entry to use the platform's path separator.
#[must_use]
pub fn normalize_separators(raw: &str) -> String {
    if cfg!(windows) {
        raw.replace('/', "\\")
    } else {
        raw.replace('\\', "/")
    }
}

/// Normalizes and validates one change-set entry.
///
/// Rejects absolute paths and any `..` component; the result is always safe
/// to join onto the install directory.
pub fn sanitize_entry(raw: &str) -> Result<PathBuf> {
    let normalized = normalize_separators(raw);
    let path = Path::new(&normalized);

    let unsafe_entry = || LiftoffError::UnsafePath {
        path: raw.to_string(),
    };

    if path.is_absolute() || normalized.is_empty() {
        return Err(unsafe_entry().into());
    }

    for component in path.components() {
        match component {
            Component::Normal(_) => {}
            _ => return Err(unsafe_entry().into()),
        }
    }

    Ok(path.to_path_buf())
}
