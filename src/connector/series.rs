//! Series search, lookup and mapping into [`Work`] records.

use std::collections::BTreeMap;

use scraper::Html;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::records::{SearchResponse, SeriesRecord};
use super::{ConnectorError, FetchFailure, HeanConnector};
use crate::host::HostConfig;
use crate::model::{CoverImage, ReleaseStatus, Work};
use crate::transport::RequestPurpose;

/// Separator between author names in the remote `author` field.
const AUTHOR_SEPARATOR: &str = " & ";

/// Key under which the whole alternate-title string is stored; the remote
/// schema carries no per-title index.
const ALT_TITLE_KEY: &str = "0";

impl HeanConnector {
    /// Searches the host for `query` and resolves every hit to a full [`Work`].
    ///
    /// Never fails: transport and decoding problems yield an empty list, and
    /// hits that cannot be resolved are dropped. Causes are logged.
    #[instrument(skip(self), fields(connector = %self.name))]
    pub async fn find_by_title(&self, query: &str) -> Vec<Work> {
        let url = self.host.search_url(query);
        let response = match self
            .fetch_json::<SearchResponse>(&url, RequestPurpose::SeriesInfo)
            .await
        {
            Ok(response) => response,
            Err(failure) => {
                warn!(%failure, "Search request failed; returning no results");
                return Vec::new();
            }
        };

        let Some(hits) = response.data else {
            warn!("Search response has no data array; returning no results");
            return Vec::new();
        };

        let mut works = Vec::with_capacity(hits.len());
        for hit in hits.into_iter().flatten() {
            let Some(slug) = hit.series_slug.filter(|slug| !slug.is_empty()) else {
                debug!("Skipping search hit without series_slug");
                continue;
            };
            // The search projection is partial, so every hit is re-resolved.
            match self.resolve_by_slug(&slug).await {
                Ok(Some(work)) => works.push(work),
                Ok(None) => debug!(%slug, "Search hit could not be resolved; dropping"),
                Err(error) => warn!(%slug, error = %error, "Search hit could not be mapped; dropping"),
            }
        }

        info!(results = works.len(), "Search complete");
        works
    }

    /// Resolves a series by slug.
    ///
    /// Returns `Ok(None)` when the request fails or the body cannot be decoded.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::MissingField`] when the series record lacks a
    /// field required to build a [`Work`].
    #[instrument(skip(self), fields(connector = %self.name))]
    pub async fn resolve_by_slug(&self, slug: &str) -> Result<Option<Work>, ConnectorError> {
        let record = match self.fetch_series_record(slug).await {
            Ok(record) => record,
            Err(failure) => {
                warn!(%failure, "Series lookup failed");
                return Ok(None);
            }
        };

        let work = map_series(&record, &self.host)?;
        Ok(Some(self.finish_work(work).await))
    }

    /// Resolves a series from its public or API URL.
    ///
    /// Returns `Ok(None)` without any request when the host's url prefix does
    /// not occur in `url`.
    ///
    /// # Errors
    ///
    /// Same as [`resolve_by_slug`](Self::resolve_by_slug).
    #[instrument(skip(self), fields(connector = %self.name))]
    pub async fn resolve_by_url(&self, url: &str) -> Result<Option<Work>, ConnectorError> {
        let Some(slug) = self.host.slug_from_url(url) else {
            debug!(url_prefix = self.host.url_prefix(), "URL does not contain the series prefix");
            return Ok(None);
        };
        debug!(%slug, "Extracted slug from URL");
        self.resolve_by_slug(slug).await
    }

    /// Fetches the raw series record for `slug`.
    pub(super) async fn fetch_series_record(
        &self,
        slug: &str,
    ) -> Result<SeriesRecord, FetchFailure> {
        let url = self.host.series_url(slug);
        self.fetch_json::<SeriesRecord>(&url, RequestPurpose::SeriesInfo)
            .await
    }

    /// Caches the cover and hands the work to the cache writer.
    async fn finish_work(&self, mut work: Work) -> Work {
        if let Some(cover) = work.cover.as_mut() {
            cover.cache_name = self
                .cache
                .cache_cover_image(&cover.remote_url, &work.id, RequestPurpose::CoverImage)
                .await;
            if cover.cache_name.is_none() {
                debug!(work_id = %work.id, "Cover was not cached");
            }
        }
        self.cache.add_work(&work);
        work
    }
}

/// Maps a series JSON value into a [`Work`] without any I/O.
///
/// The cover, if any, is returned without a cache name.
///
/// # Errors
///
/// Returns [`ConnectorError::MalformedRecord`] when the value does not have
/// the series record shape and [`ConnectorError::MissingField`] when a
/// required field is absent.
pub fn map_series_json(value: &Value, host: &HostConfig) -> Result<Work, ConnectorError> {
    let record = SeriesRecord::deserialize_value(value)?;
    map_series(&record, host)
}

impl SeriesRecord {
    fn deserialize_value(value: &Value) -> Result<Self, ConnectorError> {
        serde::Deserialize::deserialize(value)
            .map_err(|error: serde_json::Error| {
                ConnectorError::malformed_record("series", &error.to_string())
            })
    }
}

/// Maps a decoded series record into a [`Work`].
pub(crate) fn map_series(record: &SeriesRecord, host: &HostConfig) -> Result<Work, ConnectorError> {
    let title = required(record.title.as_deref(), "title")?;
    let id = required(record.series_slug.as_deref(), "series_slug")?;
    let author = required(record.author.as_deref(), "author")?;
    let description_html = required(record.description.as_deref(), "description")?;
    let alternative_names = required(record.alternative_names.as_deref(), "alternative_names")?;
    let tags = record
        .tags
        .as_ref()
        .ok_or_else(|| ConnectorError::missing_field("tags"))?;
    let status = required(record.status.as_deref(), "status")?;

    let mut tag_names: Vec<String> = Vec::with_capacity(tags.len());
    for name in tags.iter().flatten().filter_map(|tag| tag.name.as_deref()) {
        if !tag_names.iter().any(|existing| existing == name) {
            tag_names.push(name.to_string());
        }
    }

    let cover = record
        .thumbnail
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(|url| CoverImage {
            remote_url: host.absolutize(url),
            cache_name: None,
        });

    let year = record
        .release_year
        .as_ref()
        .and_then(|year| year.as_i64())
        .and_then(|year| i32::try_from(year).ok());

    let mut alt_titles = BTreeMap::new();
    alt_titles.insert(ALT_TITLE_KEY.to_string(), alternative_names.to_string());

    Ok(Work {
        id: id.to_string(),
        title: title.to_string(),
        authors: author.split(AUTHOR_SEPARATOR).map(str::to_string).collect(),
        description: html_to_text(description_html),
        alt_titles,
        tags: tag_names,
        cover,
        year,
        status: ReleaseStatus::from_remote(status),
        website_url: host.website_url(id),
    })
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, ConnectorError> {
    value.ok_or_else(|| ConnectorError::missing_field(field))
}

/// Strips markup from an HTML fragment, keeping visible text in reading
/// order with entities decoded exactly once, so escaped entities in the
/// source stay escaped in the text.
fn html_to_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text: String = fragment.root_element().text().collect();
    text.trim().to_string()
}
