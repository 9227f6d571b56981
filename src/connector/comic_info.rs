//! ComicInfo.xml descriptor generation for fetched chapters.
//!
//! The descriptor is handed to the packaging step through a temporary file;
//! only its path leaves the connector.

use std::io::{BufWriter, Write};
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, instrument};

use crate::model::{Chapter, Work};

/// Errors produced while writing a descriptor.
#[derive(Debug, Error)]
pub enum ComicInfoError {
    /// I/O error creating or writing the temporary file.
    #[error("I/O error writing ComicInfo descriptor: {0}")]
    Io(#[from] std::io::Error),
    /// The temporary file could not be detached from its cleanup guard.
    #[error("ComicInfo descriptor could not be kept: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Renders the ComicInfo.xml document for `chapter` of `work`.
#[must_use]
pub fn build_comic_info(work: &Work, chapter: &Chapter, page_count: usize) -> String {
    let mut lines = vec![
        r#"<?xml version="1.0" encoding="utf-8"?>"#.to_string(),
        r#"<ComicInfo xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:xsd="http://www.w3.org/2001/XMLSchema">"#.to_string(),
        element("Series", &work.title),
    ];
    if !chapter.title.is_empty() {
        lines.push(element("Title", &chapter.title));
    }
    lines.push(element("Volume", &chapter.volume));
    lines.push(element("Number", &chapter.number));
    if !work.authors.is_empty() {
        lines.push(element("Writer", &work.authors.join(", ")));
    }
    if !work.description.is_empty() {
        lines.push(element("Summary", &work.description));
    }
    if let Some(year) = work.year {
        lines.push(element("Year", &year.to_string()));
    }
    if !work.tags.is_empty() {
        lines.push(element("Tags", &work.tags.join(",")));
    }
    lines.push(element("Web", &work.website_url));
    lines.push(element("PageCount", &page_count.to_string()));
    lines.push("</ComicInfo>".to_string());
    lines.join("\n")
}

/// Writes the descriptor to a fresh file in the system temp directory and
/// returns its path. The file outlives the call; the consumer removes it.
///
/// # Errors
///
/// Returns [`ComicInfoError`] when the file cannot be created, written or kept.
#[instrument(skip(work, chapter), fields(work_id = %work.id, locator = %chapter.locator))]
pub(crate) fn write_comic_info(
    work: &Work,
    chapter: &Chapter,
    page_count: usize,
) -> Result<PathBuf, ComicInfoError> {
    let document = build_comic_info(work, chapter, page_count);
    let file = tempfile::Builder::new()
        .prefix("ComicInfo-")
        .suffix(".xml")
        .tempfile()?;
    {
        let mut writer = BufWriter::new(file.as_file());
        writer.write_all(document.as_bytes())?;
        writer.flush()?;
    }
    let (_, path) = file.keep()?;
    debug!(path = %path.display(), "ComicInfo descriptor written");
    Ok(path)
}

fn element(name: &str, value: &str) -> String {
    format!("  <{name}>{}</{name}>", xml_escape(value))
}

/// Escapes the five XML special characters.
fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
