//! HeanCMS connector: series search and lookup, dual-generation chapter
//! listing and chapter page resolution.
//!
//! One [`HeanConnector`] serves any HeanCMS host; the host is selected by the
//! injected [`HostConfig`]. Every public operation issues its requests one
//! after another and degrades transport or decoding failures to an empty or
//! absent result, logging the cause.
//!
//! # Architecture
//!
//! - [`series`] - search, lookup by slug or URL, and series → [`Work`] mapping
//! - [`chapters`] - generation-1 / generation-2 chapter enumeration
//! - [`pages`] - chapter page lists and the ComicInfo descriptor handoff
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use hean_core::{HeanConnector, HostConfig, NoCache, ReqwestTransport};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let connector = HeanConnector::new(
//!     HostConfig::temple_scan()?,
//!     Arc::new(ReqwestTransport::new()?),
//!     Arc::new(NoCache),
//! );
//! for work in connector.find_by_title("Solo").await {
//!     let chapters = connector.list_chapters(&work).await;
//!     println!("{} ({} chapters)", work.title, chapters.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod chapters;
mod comic_info;
mod error;
pub mod pages;
mod records;
pub mod series;

pub use comic_info::{ComicInfoError, build_comic_info};
pub use error::ConnectorError;
pub use pages::{ChapterPages, PageListOutcome};
pub use series::map_series_json;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::cache::CacheWriter;
use crate::host::HostConfig;
use crate::transport::{RequestPurpose, Transport, TransportError};

/// Connector label used in logs when none is given.
const DEFAULT_CONNECTOR_NAME: &str = "heancms";

/// Adapter for one HeanCMS host.
pub struct HeanConnector {
    name: String,
    host: HostConfig,
    transport: Arc<dyn Transport>,
    cache: Arc<dyn CacheWriter>,
}

impl HeanConnector {
    /// Creates a connector for `host` using the given collaborators.
    #[must_use]
    pub fn new(
        host: HostConfig,
        transport: Arc<dyn Transport>,
        cache: Arc<dyn CacheWriter>,
    ) -> Self {
        Self {
            name: DEFAULT_CONNECTOR_NAME.to_string(),
            host,
            transport,
            cache,
        }
    }

    /// Sets the label used in logs (e.g. "TempleScan").
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Connector label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Host this connector talks to.
    #[must_use]
    pub fn host(&self) -> &HostConfig {
        &self.host
    }

    /// GETs `url` and decodes the JSON body.
    async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        purpose: RequestPurpose,
    ) -> Result<T, FetchFailure> {
        debug!(connector = %self.name, %url, purpose = purpose.as_str(), "Requesting");
        let response = self
            .transport
            .fetch(url, purpose)
            .await
            .map_err(FetchFailure::Transport)?;
        if !response.is_success() {
            return Err(FetchFailure::Status(response.status));
        }
        response
            .json::<T>()
            .map_err(|error| FetchFailure::Decode(error.to_string()))
    }
}

impl std::fmt::Debug for HeanConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeanConnector")
            .field("name", &self.name)
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

/// Why a request produced no usable record. Only ever logged.
#[derive(Debug)]
enum FetchFailure {
    Transport(TransportError),
    Status(u16),
    Decode(String),
}

impl std::fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(error) => write!(f, "transport failure: {error}"),
            Self::Status(status) => write!(f, "HTTP status {status}"),
            Self::Decode(reason) => write!(f, "undecodable body: {reason}"),
        }
    }
}
