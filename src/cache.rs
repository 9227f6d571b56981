//! Cache-writer port and the two implementations shipped with the crate.
//!
//! The connector never keeps state between calls. After mapping a series it
//! hands the cover URL and the finished [`Work`] to a [`CacheWriter`]; what
//! happens next is up to the implementation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::model::Work;
use crate::transport::{RequestPurpose, Transport};

/// Port for the external cache collaborator. Both calls are fire-and-forget
/// from the connector's point of view.
#[async_trait]
pub trait CacheWriter: Send + Sync {
    /// Stores the cover at `remote_url` for `work_id` and returns the local
    /// name, or `None` when caching failed or is disabled.
    async fn cache_cover_image(
        &self,
        remote_url: &str,
        work_id: &str,
        purpose: RequestPurpose,
    ) -> Option<String>;

    /// Records a freshly mapped work.
    fn add_work(&self, work: &Work);
}

/// Cache writer that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

#[async_trait]
impl CacheWriter for NoCache {
    async fn cache_cover_image(
        &self,
        _remote_url: &str,
        _work_id: &str,
        _purpose: RequestPurpose,
    ) -> Option<String> {
        None
    }

    fn add_work(&self, _work: &Work) {}
}

/// Cache writer that downloads covers into a directory and remembers the
/// last mapped work per identifier.
///
/// Covers are stored as `{work_id}_{file name}`.
pub struct DirectoryCache {
    dir: PathBuf,
    transport: Arc<dyn Transport>,
    works: RwLock<HashMap<String, Work>>,
}

impl DirectoryCache {
    /// Creates a cache rooted at `dir`, fetching covers through `transport`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, transport: Arc<dyn Transport>) -> Self {
        Self {
            dir: dir.into(),
            transport,
            works: RwLock::new(HashMap::new()),
        }
    }

    /// Cache directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the cached work with `id`, if one was added.
    #[must_use]
    pub fn work(&self, id: &str) -> Option<Work> {
        self.works
            .read()
            .ok()
            .and_then(|works| works.get(id).cloned())
    }

    /// Number of cached works.
    #[must_use]
    pub fn len(&self) -> usize {
        self.works.read().map(|works| works.len()).unwrap_or_default()
    }

    /// Returns true when no work was cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for DirectoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryCache")
            .field("dir", &self.dir)
            .field("works", &self.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CacheWriter for DirectoryCache {
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn cache_cover_image(
        &self,
        remote_url: &str,
        work_id: &str,
        purpose: RequestPurpose,
    ) -> Option<String> {
        let response = match self.transport.fetch(remote_url, purpose).await {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                warn!(status = response.status, "Cover request was not successful");
                return None;
            }
            Err(error) => {
                warn!(error = %error, "Cover request failed");
                return None;
            }
        };

        let name = cover_file_name(remote_url, work_id);
        if let Err(error) = tokio::fs::create_dir_all(&self.dir).await {
            warn!(error = %error, "Cover cache directory could not be created");
            return None;
        }
        let path = self.dir.join(&name);
        if let Err(error) = tokio::fs::write(&path, &response.body).await {
            warn!(error = %error, path = %path.display(), "Cover could not be written");
            return None;
        }

        debug!(path = %path.display(), "Cover cached");
        Some(name)
    }

    fn add_work(&self, work: &Work) {
        if let Ok(mut works) = self.works.write() {
            works.insert(work.id.clone(), work.clone());
        }
    }
}

/// Builds `{work_id}_{last path segment}` with path separators removed.
fn cover_file_name(remote_url: &str, work_id: &str) -> String {
    let segment = Url::parse(remote_url)
        .ok()
        .and_then(|url| {
            url.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|segment| !segment.is_empty())
        .unwrap_or_else(|| "cover".to_string());
    sanitize(&format!("{work_id}_{segment}"))
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}
