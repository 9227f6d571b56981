//! HeanCMS Connector Library
//!
//! This library adapts catalog hosts running the HeanCMS API (Temple Scan and
//! its siblings) to a canonical model of works, chapters and page lists.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`model`] - Canonical [`Work`], [`Chapter`], [`ReleaseStatus`] and the
//!   [`ProgressToken`] cancellation handle
//! - [`host`] - Per-host configuration and the URL shape contract
//! - [`transport`] - HTTP port and the reqwest-backed default
//! - [`cache`] - Cover/work cache port with directory and no-op writers
//! - [`connector`] - Series search and lookup, chapter listing across both
//!   protocol generations, and page list resolution

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod connector;
pub mod host;
pub mod model;
pub mod transport;
mod user_agent;

// Re-export commonly used types
pub use cache::{CacheWriter, DirectoryCache, NoCache};
pub use connector::{
    ChapterPages, ComicInfoError, ConnectorError, HeanConnector, PageListOutcome,
    build_comic_info, map_series_json,
};
pub use host::{DEFAULT_URL_PREFIX, HostConfig, TEMPLE_SCAN_HOSTNAME};
pub use model::{Chapter, ChapterLocator, CoverImage, ProgressToken, ReleaseStatus, Work};
pub use transport::{RawResponse, RequestPurpose, ReqwestTransport, Transport, TransportError};
