//! Revision identifiers handed out by the update service.
//!
//! The update protocol only ever compares two revisions for ordering, so a
//! revision is a plain monotonically increasing number rather than a full
//! semantic version. The server serializes it as a bare integer both in the
//! wire protocol and in the on-disk state files.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// A revision number for one managed project.
///
/// Revisions are totally ordered; "is the server ahead of us" is the entire
/// version check. [`Version::NONE`] marks a target directory where nothing
/// has been installed yet, and compares below every published revision.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(pub u64);

impl Version {
    /// The "nothing installed" marker.
    pub const NONE: Self = Self(0);

    /// Numeric value of the revision, as used on the wire.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<u64> for Version {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for Version {
    type Err = ParseIntError;

    /// Accepts both the bare wire form (`"5"`) and the display form (`"v5"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim();
        let digits = digits.strip_prefix('v').unwrap_or(digits);
        digits.parse().map(Self)
    }
}
