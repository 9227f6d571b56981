//! Chapter page list resolution.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::HeanConnector;
use super::comic_info::write_comic_info;
use super::records::ChapterPagesRecord;
use crate::host::HostConfig;
use crate::model::{Chapter, ProgressToken, Work};
use crate::transport::RequestPurpose;

/// Page list of a readable chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterPages {
    /// Absolute image URLs in reading order; the chapter thumbnail, when the
    /// host provides one, comes first.
    pub urls: Vec<String>,
    /// Path of the ComicInfo.xml descriptor, if it could be written.
    pub comic_info: Option<PathBuf>,
}

/// Result of [`HeanConnector::fetch_images`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageListOutcome {
    /// The chapter is readable.
    Pages(ChapterPages),
    /// No page list could be obtained.
    NoContent,
    /// The chapter is behind a paywall.
    PaymentRequired,
    /// Cancellation was requested before any request was made.
    Cancelled,
}

impl PageListOutcome {
    /// HTTP-style status code of the outcome (200, 204, 402 or 408).
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Pages(_) => 200,
            Self::NoContent => 204,
            Self::PaymentRequired => 402,
            Self::Cancelled => 408,
        }
    }

    /// Returns the page list for readable chapters.
    #[must_use]
    pub fn pages(&self) -> Option<&ChapterPages> {
        match self {
            Self::Pages(pages) => Some(pages),
            _ => None,
        }
    }

    /// Short label for logs and CLI output.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pages(_) => "pages",
            Self::NoContent => "no-content",
            Self::PaymentRequired => "payment-required",
            Self::Cancelled => "cancelled",
        }
    }
}

impl HeanConnector {
    /// Resolves the page images of `chapter` and writes its ComicInfo
    /// descriptor.
    ///
    /// `work` supplies descriptor metadata; the request itself only uses the
    /// chapter's work id and locator. Every outcome other than
    /// [`PageListOutcome::Pages`] marks `token` cancelled.
    #[instrument(
        skip(self, work, chapter, token),
        fields(connector = %self.name, work_id = %chapter.work_id, locator = %chapter.locator)
    )]
    pub async fn fetch_images(
        &self,
        work: &Work,
        chapter: &Chapter,
        token: Option<&ProgressToken>,
    ) -> PageListOutcome {
        let give_up = |outcome: PageListOutcome| {
            if let Some(token) = token {
                token.cancel();
            }
            outcome
        };

        if token.is_some_and(ProgressToken::is_cancellation_requested) {
            info!("Cancellation requested; skipping chapter");
            return give_up(PageListOutcome::Cancelled);
        }

        let url = self
            .host
            .chapter_by_slug_url(&chapter.work_id, chapter.locator.as_str());
        let record: ChapterPagesRecord = match self.fetch_json(&url, RequestPurpose::ChapterInfo).await {
            Ok(record) => record,
            Err(failure) => {
                warn!(%failure, "Chapter request failed");
                return give_up(PageListOutcome::NoContent);
            }
        };

        if record.paywall == Some(true) {
            info!("Chapter is behind a paywall");
            return give_up(PageListOutcome::PaymentRequired);
        }

        let Some(urls) = page_urls(&record, &self.host) else {
            warn!("Chapter response has no image list");
            return give_up(PageListOutcome::NoContent);
        };

        let comic_info = match write_comic_info(work, chapter, urls.len()) {
            Ok(path) => Some(path),
            Err(error) => {
                warn!(error = %error, "ComicInfo descriptor could not be written");
                None
            }
        };

        debug!(pages = urls.len(), "Resolved chapter pages");
        PageListOutcome::Pages(ChapterPages { urls, comic_info })
    }
}

/// Extracts the absolute page URLs from a chapter response.
///
/// Reads the top-level `data` array, falling back to
/// `chapter.chapter_data.images`; returns `None` when neither is an array.
/// Non-string entries are skipped and `chapter_thumbnail` is prepended.
pub(crate) fn page_urls(record: &ChapterPagesRecord, host: &HostConfig) -> Option<Vec<String>> {
    let nested = record
        .chapter
        .as_ref()
        .and_then(|chapter| chapter.chapter_data.as_ref())
        .and_then(|data| data.images.as_ref());
    let images = record
        .data
        .as_ref()
        .and_then(Value::as_array)
        .or_else(|| nested.and_then(Value::as_array))?;

    let thumbnail = record
        .chapter_thumbnail
        .as_deref()
        .filter(|thumbnail| !thumbnail.trim().is_empty());
    let urls = thumbnail
        .into_iter()
        .chain(images.iter().filter_map(Value::as_str))
        .map(|url| host.absolutize(url))
        .collect();
    Some(urls)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn host() -> HostConfig {
        HostConfig::new("https://api.example.com").unwrap()
    }

    fn record(json: Value) -> ChapterPagesRecord {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_relative_data_urls_are_absolutized() {
        let urls = page_urls(&record(serde_json::json!({"data": ["a.jpg", "b.jpg"]})), &host()).unwrap();
        assert_eq!(
            urls,
            vec!["https://api.example.com/a.jpg", "https://api.example.com/b.jpg"]
        );
    }

    #[test]
    fn test_absolute_and_protocol_relative_urls() {
        let urls = page_urls(
            &record(serde_json::json!({"data": ["https://cdn.example.org/1.webp", "//cdn.example.org/2.webp"]})),
            &host(),
        )
        .unwrap();
        assert_eq!(
            urls,
            vec!["https://cdn.example.org/1.webp", "https://cdn.example.org/2.webp"]
        );
    }

    #[test]
    fn test_nested_images_fallback() {
        let urls = page_urls(
            &record(serde_json::json!({"chapter": {"chapter_data": {"images": ["x.png"]}}})),
            &host(),
        )
        .unwrap();
        assert_eq!(urls, vec!["https://api.example.com/x.png"]);
    }

    #[test]
    fn test_non_array_data_falls_through_to_nested() {
        let urls = page_urls(
            &record(serde_json::json!({"data": "oops", "chapter": {"chapter_data": {"images": ["x.png"]}}})),
            &host(),
        )
        .unwrap();
        assert_eq!(urls.len(), 1);
    }

    #[test]
    fn test_thumbnail_is_prepended() {
        let urls = page_urls(
            &record(serde_json::json!({"chapter_thumbnail": "thumb.jpg", "data": ["a.jpg", 5, null]})),
            &host(),
        )
        .unwrap();
        assert_eq!(
            urls,
            vec!["https://api.example.com/thumb.jpg", "https://api.example.com/a.jpg"]
        );
    }

    #[test]
    fn test_missing_image_list() {
        assert!(page_urls(&record(serde_json::json!({})), &host()).is_none());
        assert!(page_urls(&record(serde_json::json!({"chapter": {}})), &host()).is_none());
    }

    #[test]
    fn test_outcome_status_codes() {
        let pages = PageListOutcome::Pages(ChapterPages {
            urls: Vec::new(),
            comic_info: None,
        });
        assert_eq!(pages.status_code(), 200);
        assert!(pages.pages().is_some());
        assert_eq!(PageListOutcome::NoContent.status_code(), 204);
        assert_eq!(PageListOutcome::PaymentRequired.status_code(), 402);
        assert_eq!(PageListOutcome::Cancelled.status_code(), 408);
        assert!(PageListOutcome::Cancelled.pages().is_none());
        assert_eq!(PageListOutcome::PaymentRequired.as_str(), "payment-required");
    }
}
