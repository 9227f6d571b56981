//! Canonical chapter record and chapter ordering.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a chapter on the remote API.
///
/// Depending on the protocol generation that produced it, the value may be a
/// slug or a numeric id. Callers should only hand it back to the connector.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChapterLocator(String);

impl ChapterLocator {
    /// Wraps a remote chapter reference.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw value for request building.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChapterLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single chapter of a [`Work`](super::Work).
///
/// Chapters order by volume, then chapter number, both compared numerically
/// when they parse as numbers ("9" sorts before "10").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chapter {
    /// Identifier of the owning work.
    pub work_id: String,
    /// Chapter title.
    pub title: String,
    /// Volume label, usually the season index.
    pub volume: String,
    /// Chapter number; not guaranteed to be integral.
    pub number: String,
    /// Opaque remote reference used to fetch the chapter's pages.
    pub locator: ChapterLocator,
}

impl Chapter {
    /// Creates a chapter record.
    #[must_use]
    pub fn new(
        work_id: impl Into<String>,
        title: impl Into<String>,
        volume: impl Into<String>,
        number: impl Into<String>,
        locator: ChapterLocator,
    ) -> Self {
        Self {
            work_id: work_id.into(),
            title: title.into(),
            volume: volume.into(),
            number: number.into(),
            locator,
        }
    }
}

impl Ord for Chapter {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_numeric_aware(&self.volume, &other.volume)
            .then_with(|| compare_numeric_aware(&self.number, &other.number))
            .then_with(|| self.locator.cmp(&other.locator))
            .then_with(|| self.title.cmp(&other.title))
            .then_with(|| self.work_id.cmp(&other.work_id))
    }
}

impl PartialOrd for Chapter {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compares two labels numerically when both parse as numbers.
///
/// Numeric labels sort before non-numeric ones; two non-numeric labels compare
/// lexically. Numerically equal labels ("1" and "1.0") fall back to a lexical
/// comparison so the result stays consistent with string equality.
#[must_use]
pub fn compare_numeric_aware(lhs: &str, rhs: &str) -> Ordering {
    match (parse_label(lhs), parse_label(rhs)) {
        (Some(a), Some(b)) => a.total_cmp(&b).then_with(|| lhs.cmp(rhs)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => lhs.cmp(rhs),
    }
}

fn parse_label(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}
