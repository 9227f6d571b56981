//! Shared User-Agent string for connector HTTP traffic.
//!
//! Single source for the UA format so series, chapter and cover requests
//! identify themselves the same way on every host.

/// Repository URL from the package manifest; empty when unset.
const REPOSITORY_URL: &str = env!("CARGO_PKG_REPOSITORY");

/// Default User-Agent for connector requests (one format for every host).
#[must_use]
pub(crate) fn default_connector_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    if REPOSITORY_URL.is_empty() {
        format!("hean/{version} (series-connector)")
    } else {
        format!("hean/{version} (series-connector; +{REPOSITORY_URL})")
    }
}
