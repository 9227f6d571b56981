//! Chapter enumeration across both HeanCMS protocol generations.
//!
//! Generation 1 embeds the chapter tree in the series record
//! (`seasons[].chapters[]`). Generation 2 publishes a flat chapter index per
//! numeric series id and needs one detail request per chapter. A host speaks
//! exactly one of them, so generation 2 is only attempted when generation 1
//! yields nothing, and results of the two are never mixed.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::records::{
    ChapterDetailRecord, ChapterIndexEntry, ChapterIndexPage, SeasonRecord, SeriesRecord, is_paid,
};
use super::{ConnectorError, FetchFailure, HeanConnector};
use crate::model::{Chapter, ChapterLocator, Work};
use crate::transport::RequestPurpose;

/// A free generation-2 index entry awaiting its detail request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingChapter {
    /// Numeric chapter id used for the detail request.
    pub id: i64,
    /// Title used when the detail record has none.
    pub fallback_title: Option<String>,
}

/// Why generation-2 enumeration was abandoned.
#[derive(Debug, Error)]
enum IndexFailure {
    #[error("series request failed: {0}")]
    Series(FetchFailure),

    #[error("series record has no numeric id")]
    MissingSeriesId,

    #[error("chapter index request failed: {0}")]
    Index(FetchFailure),

    #[error("chapter {chapter_id} request failed: {failure}")]
    Detail {
        chapter_id: i64,
        failure: FetchFailure,
    },

    #[error(transparent)]
    Record(#[from] ConnectorError),
}

impl HeanConnector {
    /// Lists the free chapters of `work` in ascending order.
    ///
    /// Never fails: any request or decoding failure yields an empty list and
    /// is logged.
    #[instrument(skip(self, work), fields(connector = %self.name, work_id = %work.id))]
    pub async fn list_chapters(&self, work: &Work) -> Vec<Chapter> {
        let chapters = self.list_season_chapters(&work.id).await;
        if !chapters.is_empty() {
            let chapters = finalize(chapters);
            info!(count = chapters.len(), generation = 1, "Listed chapters");
            return chapters;
        }

        debug!("No season chapters; trying chapter index");
        match self.list_indexed_chapters(&work.id).await {
            Ok(chapters) => {
                let chapters = finalize(chapters);
                info!(count = chapters.len(), generation = 2, "Listed chapters");
                chapters
            }
            Err(failure) => {
                warn!(%failure, "Chapter index enumeration failed; returning no chapters");
                Vec::new()
            }
        }
    }

    /// Generation 1: chapters embedded in the series record. A failed series
    /// request counts as an empty season tree.
    async fn list_season_chapters(&self, work_id: &str) -> Vec<Chapter> {
        match self.fetch_series_record(work_id).await {
            Ok(record) => {
                chapters_from_seasons(work_id, record.seasons.as_deref().unwrap_or_default())
            }
            Err(failure) => {
                warn!(%failure, "Series request for season chapters failed");
                Vec::new()
            }
        }
    }

    /// Generation 2: series record for the numeric id, chapter index by that
    /// id, then one detail request per free entry, strictly in index order.
    async fn list_indexed_chapters(&self, work_id: &str) -> Result<Vec<Chapter>, IndexFailure> {
        let record = self
            .fetch_series_record(work_id)
            .await
            .map_err(IndexFailure::Series)?;
        let series_id = numeric_series_id(&record)?;

        let page: ChapterIndexPage = self
            .fetch_json(
                &self.host.chapter_index_url(series_id),
                RequestPurpose::ChapterInfo,
            )
            .await
            .map_err(IndexFailure::Index)?;
        let pending = index_entries_to_fetch(&page)?;
        debug!(series_id, free = pending.len(), "Fetching chapter details");

        let mut chapters = Vec::with_capacity(pending.len());
        for entry in &pending {
            let detail: ChapterDetailRecord = self
                .fetch_json(
                    &self.host.chapter_by_id_url(entry.id),
                    RequestPurpose::ChapterInfo,
                )
                .await
                .map_err(|failure| IndexFailure::Detail {
                    chapter_id: entry.id,
                    failure,
                })?;
            chapters.push(chapter_from_detail(work_id, entry, &detail)?);
        }
        Ok(chapters)
    }
}

fn numeric_series_id(record: &SeriesRecord) -> Result<i64, IndexFailure> {
    record
        .id
        .as_ref()
        .and_then(|id| id.as_i64())
        .ok_or(IndexFailure::MissingSeriesId)
}

// ==================== Generation 1 ====================

/// Builds chapters from the season tree of a series record.
///
/// Paid entries are excluded. Null seasons, seasons without an index and
/// entries lacking a slug or index are skipped.
pub(crate) fn chapters_from_seasons(work_id: &str, seasons: &[Option<SeasonRecord>]) -> Vec<Chapter> {
    let mut chapters = Vec::new();
    for season in seasons.iter().flatten() {
        let Some(entries) = season.chapters.as_deref() else {
            continue;
        };
        let Some(volume) = season.index.as_ref().map(|index| index.to_label()) else {
            debug!(entries = entries.len(), "Skipping season without index");
            continue;
        };

        for entry in entries.iter().flatten() {
            if is_paid(entry.price.as_ref()) {
                continue;
            }
            let slug = entry.chapter_slug.as_deref().filter(|slug| !slug.is_empty());
            let (Some(slug), Some(number)) = (slug, entry.index.as_ref()) else {
                debug!(%volume, "Skipping chapter without slug or index");
                continue;
            };
            let title = entry
                .chapter_title
                .as_deref()
                .or(entry.chapter_name.as_deref())
                .unwrap_or_default();
            chapters.push(Chapter::new(
                work_id,
                title,
                volume.clone(),
                number.to_label(),
                ChapterLocator::new(slug),
            ));
        }
    }
    chapters
}

// ==================== Generation 2 ====================

/// Selects the free entries of a chapter index page, in index order.
///
/// # Errors
///
/// Returns [`ConnectorError::MalformedRecord`] when the page has no `data`
/// array or a free entry has no numeric id.
pub(crate) fn index_entries_to_fetch(
    page: &ChapterIndexPage,
) -> Result<Vec<PendingChapter>, ConnectorError> {
    let entries = page
        .data
        .as_deref()
        .ok_or_else(|| ConnectorError::malformed_record("chapter index", "missing data array"))?;

    entries
        .iter()
        .flatten()
        .filter(|entry| !is_paid(entry.price.as_ref()))
        .map(pending_chapter)
        .collect()
}

fn pending_chapter(entry: &ChapterIndexEntry) -> Result<PendingChapter, ConnectorError> {
    let id = entry
        .id
        .as_ref()
        .and_then(|id| id.as_i64())
        .ok_or_else(|| ConnectorError::malformed_record("chapter index", "entry without numeric id"))?;
    Ok(PendingChapter {
        id,
        fallback_title: entry.chapter_name.clone(),
    })
}

/// Builds a chapter from its detail record.
///
/// # Errors
///
/// Returns [`ConnectorError::MissingField`] when the slug, the chapter index
/// or the season index is absent.
pub(crate) fn chapter_from_detail(
    work_id: &str,
    pending: &PendingChapter,
    detail: &ChapterDetailRecord,
) -> Result<Chapter, ConnectorError> {
    let slug = detail
        .chapter_slug
        .as_deref()
        .filter(|slug| !slug.is_empty())
        .ok_or_else(|| ConnectorError::missing_field("chapter_slug"))?;
    let number = detail
        .index
        .as_ref()
        .ok_or_else(|| ConnectorError::missing_field("index"))?;
    let volume = detail
        .season
        .as_ref()
        .and_then(|season| season.index.as_ref())
        .ok_or_else(|| ConnectorError::missing_field("season.index"))?;
    let title = detail
        .chapter_title
        .as_deref()
        .or(pending.fallback_title.as_deref())
        .unwrap_or_default();

    Ok(Chapter::new(
        work_id,
        title,
        volume.to_label(),
        number.to_label(),
        ChapterLocator::new(slug),
    ))
}

// ==================== Shared ====================

/// Drops repeated locators (first occurrence wins), then sorts.
fn finalize(chapters: Vec<Chapter>) -> Vec<Chapter> {
    let mut seen = HashSet::with_capacity(chapters.len());
    let mut unique: Vec<Chapter> = chapters
        .into_iter()
        .filter(|chapter| seen.insert(chapter.locator.clone()))
        .collect();
    unique.sort();
    unique
}
