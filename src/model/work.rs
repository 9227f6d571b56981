//! Canonical series record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ReleaseStatus;

/// Cover image reference: the remote URL and, when caching succeeded, the
/// local name the cache writer stored it under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverImage {
    /// Absolute remote URL of the cover.
    pub remote_url: String,
    /// Name assigned by the cache writer, if the cover was cached.
    pub cache_name: Option<String>,
}

/// A series as seen by callers, independent of the remote schema generation.
///
/// `id` is the host's series slug and resolves the same work again through
/// [`HeanConnector::resolve_by_slug`](crate::HeanConnector::resolve_by_slug).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Work {
    /// Stable slug, unique per host.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Author names in remote order.
    pub authors: Vec<String>,
    /// Plain-text description (markup stripped, entities decoded).
    pub description: String,
    /// Alternate titles keyed by index.
    pub alt_titles: BTreeMap<String, String>,
    /// Tag names in remote order, without duplicates.
    pub tags: Vec<String>,
    /// Cover image, when the host provides one.
    pub cover: Option<CoverImage>,
    /// Release year, when present and numeric.
    pub year: Option<i32>,
    /// Canonical release state.
    pub status: ReleaseStatus,
    /// Public website URL of the series.
    pub website_url: String,
}

impl Work {
    /// Returns the cover URL, if any.
    #[must_use]
    pub fn cover_url(&self) -> Option<&str> {
        self.cover.as_ref().map(|cover| cover.remote_url.as_str())
    }

    /// Returns the alternate title string, if the host supplied one.
    #[must_use]
    pub fn primary_alt_title(&self) -> Option<&str> {
        self.alt_titles
            .values()
            .map(String::as_str)
            .find(|title| !title.is_empty())
    }
}
