//! Raw HeanCMS response records.
//!
//! Every field is optional so one decoder serves both protocol generations;
//! required-ness is decided by the code consuming the record. Numeric fields
//! are accepted as numbers or strings since hosts disagree on the encoding.

use serde::Deserialize;
use serde_json::Value;

// ==================== Shared ====================

/// A JSON scalar that may be encoded as a string or a number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum Scalar {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Renders the value as a label ("5", "5.5", "extra").
    pub(crate) fn to_label(&self) -> String {
        match self {
            Self::Integer(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Text(value) => value.trim().to_string(),
        }
    }

    /// Returns the value as an integer when it is integral.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Float(value) if value.fract() == 0.0 && value.is_finite() => Some(*value as i64),
            Self::Float(_) => None,
            Self::Text(value) => value.trim().parse().ok(),
        }
    }

    /// Returns true for values greater than zero.
    pub(crate) fn is_positive(&self) -> bool {
        match self {
            Self::Integer(value) => *value > 0,
            Self::Float(value) => *value > 0.0,
            Self::Text(value) => value.trim().parse::<f64>().is_ok_and(|value| value > 0.0),
        }
    }
}

/// Returns true when a `price` field marks the entry as monetized.
pub(crate) fn is_paid(price: Option<&Scalar>) -> bool {
    price.is_some_and(Scalar::is_positive)
}

// ==================== Series ====================

/// Search response: `{ "data": [ {partial series}, ... ] }`.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    pub data: Option<Vec<Option<SearchHit>>>,
}

/// Partial series projection returned by the search endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchHit {
    pub series_slug: Option<String>,
}

/// Full series record from `/series/{slug}`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SeriesRecord {
    /// Numeric series id used by the generation-2 chapter index.
    pub id: Option<Scalar>,
    pub title: Option<String>,
    pub series_slug: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub alternative_names: Option<String>,
    pub tags: Option<Vec<Option<TagRecord>>>,
    pub thumbnail: Option<String>,
    pub release_year: Option<Scalar>,
    pub status: Option<String>,
    /// Generation-1 chapter tree; absent or empty on generation-2 hosts.
    pub seasons: Option<Vec<Option<SeasonRecord>>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TagRecord {
    pub name: Option<String>,
}

// ==================== Generation 1 ====================

#[derive(Debug, Deserialize)]
pub(crate) struct SeasonRecord {
    pub index: Option<Scalar>,
    pub chapters: Option<Vec<Option<SeasonChapter>>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SeasonChapter {
    pub index: Option<Scalar>,
    pub chapter_slug: Option<String>,
    pub chapter_title: Option<String>,
    pub chapter_name: Option<String>,
    pub price: Option<Scalar>,
}

// ==================== Generation 2 ====================

/// Chapter index page from `/chapter/query?series_id=...`.
#[derive(Debug, Deserialize)]
pub(crate) struct ChapterIndexPage {
    pub data: Option<Vec<Option<ChapterIndexEntry>>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChapterIndexEntry {
    pub id: Option<Scalar>,
    pub chapter_name: Option<String>,
    pub price: Option<Scalar>,
}

/// Chapter record from `/chapter/{id}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ChapterDetailRecord {
    pub chapter_slug: Option<String>,
    pub chapter_title: Option<String>,
    pub index: Option<Scalar>,
    pub season: Option<SeasonRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SeasonRef {
    pub index: Option<Scalar>,
}

// ==================== Chapter pages ====================

/// Chapter page response from `/chapter/{series}/{chapter}`.
///
/// Generation 1 puts the image list in `data`; generation 2 nests it under
/// `chapter.chapter_data.images`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ChapterPagesRecord {
    pub paywall: Option<bool>,
    pub data: Option<Value>,
    pub chapter: Option<NestedChapter>,
    pub chapter_thumbnail: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct NestedChapter {
    pub chapter_data: Option<NestedChapterData>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct NestedChapterData {
    pub images: Option<Value>,
}
