//! Canonical release state of a series.

use serde::{Deserialize, Serialize};

/// Release state of a [`Work`](super::Work), independent of how a host spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReleaseStatus {
    /// Not released yet, or the remote value was not recognized.
    #[default]
    Unreleased,
    /// New chapters are still being published.
    Continuing,
    /// The series has ended.
    Completed,
    /// Publication is paused.
    OnHiatus,
    /// Publication was stopped for good.
    Cancelled,
}

impl ReleaseStatus {
    /// Maps a remote status string to a release state.
    ///
    /// Matching is case-insensitive. Any value outside the known set maps to
    /// [`ReleaseStatus::Unreleased`]; this never fails.
    #[must_use]
    pub fn from_remote(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "ongoing" => Self::Continuing,
            "completed" => Self::Completed,
            "hiatus" => Self::OnHiatus,
            "cancelled" => Self::Cancelled,
            _ => Self::Unreleased,
        }
    }

    /// Returns the stable string label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unreleased => "unreleased",
            Self::Continuing => "continuing",
            Self::Completed => "completed",
            Self::OnHiatus => "on-hiatus",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ReleaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
