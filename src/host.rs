//! Host configuration and the request URL contract shared by every host.
//!
//! A concrete host is just a [`HostConfig`]: the API hostname plus the path
//! prefix used in public series URLs. All URL building goes through here so
//! the endpoint shapes stay in one place.

use url::Url;

use crate::connector::ConnectorError;

/// Public series URL prefix used when a host does not override it.
pub const DEFAULT_URL_PREFIX: &str = "/series/";

/// Page size requested from the chapter index. The index has no reliable
/// pagination contract, so one oversized page is requested instead.
pub const CHAPTER_INDEX_PAGE_SIZE: u32 = 9999;

/// API hostname of Temple Scan.
pub const TEMPLE_SCAN_HOSTNAME: &str = "https://api.templescan.net";

/// Connection details of one HeanCMS host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    hostname: String,
    base_url: Url,
    url_prefix: String,
}

impl HostConfig {
    /// Creates a host config for an API hostname such as
    /// `https://api.example.com`.
    ///
    /// A trailing `/` is removed.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectorError::InvalidHostname`] when the hostname is not an
    /// absolute `http`/`https` URL with a host.
    pub fn new(hostname: impl Into<String>) -> Result<Self, ConnectorError> {
        let hostname = hostname.into().trim().trim_end_matches('/').to_string();
        let base_url = Url::parse(&hostname)
            .map_err(|error| ConnectorError::invalid_hostname(&hostname, &error.to_string()))?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConnectorError::invalid_hostname(
                &hostname,
                &format!("scheme '{}' is not supported", base_url.scheme()),
            ));
        }
        if base_url.host_str().is_none_or(str::is_empty) {
            return Err(ConnectorError::invalid_hostname(&hostname, "URL has no host"));
        }

        Ok(Self {
            hostname,
            base_url,
            url_prefix: DEFAULT_URL_PREFIX.to_string(),
        })
    }

    /// Overrides the public series URL prefix (default `/series/`).
    #[must_use]
    pub fn with_url_prefix(mut self, url_prefix: impl Into<String>) -> Self {
        self.url_prefix = url_prefix.into();
        self
    }

    /// Host config for Temple Scan.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the signature matches [`HostConfig::new`].
    pub fn temple_scan() -> Result<Self, ConnectorError> {
        Self::new(TEMPLE_SCAN_HOSTNAME)
    }

    /// API hostname without trailing slash.
    #[must_use]
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Public series URL prefix.
    #[must_use]
    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// `{hostname}/query?query_string={term}`
    #[must_use]
    pub fn search_url(&self, term: &str) -> String {
        format!(
            "{}/query?query_string={}",
            self.hostname,
            urlencoding::encode(term)
        )
    }

    /// `{hostname}/series/{slug}`
    #[must_use]
    pub fn series_url(&self, slug: &str) -> String {
        format!("{}/series/{slug}", self.hostname)
    }

    /// `{hostname}/chapter/query?series_id={id}&perPage=9999&page=1`
    #[must_use]
    pub fn chapter_index_url(&self, series_id: i64) -> String {
        format!(
            "{}/chapter/query?series_id={series_id}&perPage={CHAPTER_INDEX_PAGE_SIZE}&page=1",
            self.hostname
        )
    }

    /// `{hostname}/chapter/{series_slug}/{chapter_slug}`
    #[must_use]
    pub fn chapter_by_slug_url(&self, series_slug: &str, chapter_slug: &str) -> String {
        format!("{}/chapter/{series_slug}/{chapter_slug}", self.hostname)
    }

    /// `{hostname}/chapter/{chapter_id}`
    #[must_use]
    pub fn chapter_by_id_url(&self, chapter_id: i64) -> String {
        format!("{}/chapter/{chapter_id}", self.hostname)
    }

    /// Public website URL of a series: the API hostname without its leading
    /// `api.` label, then the url prefix, then the identifier.
    #[must_use]
    pub fn website_url(&self, identifier: &str) -> String {
        format!(
            "{}{}{identifier}",
            strip_api_subdomain(&self.hostname),
            self.url_prefix
        )
    }

    /// Extracts the series slug from a public or API series URL.
    ///
    /// Returns `None` when the url prefix does not occur in `url` or nothing
    /// follows it.
    #[must_use]
    pub fn slug_from_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        let start = url.find(self.url_prefix.as_str())? + self.url_prefix.len();
        let rest = &url[start..];
        let end = rest.find(['?', '#']).unwrap_or(rest.len());
        let slug = rest[..end].trim_end_matches('/');
        (!slug.is_empty()).then_some(slug)
    }

    /// Resolves an image reference against the API hostname.
    ///
    /// Absolute URLs are returned unchanged, protocol-relative `//host/...`
    /// becomes `https://host/...`, anything else is joined onto the hostname.
    #[must_use]
    pub fn absolutize(&self, value: &str) -> String {
        absolutize_url(value, &self.base_url).unwrap_or_else(|| value.to_string())
    }
}

/// Resolves a possibly relative URL string against a base URL.
///
/// Returns the value as-is if it already starts with `http://` or `https://`;
/// normalizes `//...` to `https:...`; otherwise joins with `base_url`.
#[must_use]
pub fn absolutize_url(value: &str, base_url: &Url) -> Option<String> {
    let value = value.trim();
    if value.starts_with("http://") || value.starts_with("https://") {
        return Some(value.to_string());
    }
    if value.starts_with("//") {
        return Some(format!("https:{value}"));
    }
    base_url.join(value).ok().map(|url| url.to_string())
}

fn strip_api_subdomain(hostname: &str) -> String {
    match hostname.split_once("://") {
        Some((scheme, rest)) => match rest.strip_prefix("api.") {
            Some(stripped) => format!("{scheme}://{stripped}"),
            None => hostname.to_string(),
        },
        None => hostname.trim_start_matches("api.").to_string(),
    }
}
