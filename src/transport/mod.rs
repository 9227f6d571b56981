//! Transport port used by the connector to talk to a host.
//!
//! The connector only needs one operation: GET a URL and get back a status
//! code and the raw body. [`ReqwestTransport`] is the default implementation;
//! tests and embedders can supply their own.
//!
//! # Example
//!
//! ```no_run
//! use hean_core::transport::{ReqwestTransport, RequestPurpose, Transport};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = ReqwestTransport::new()?;
//! let response = transport
//!     .fetch("https://api.templescan.net/series/solo", RequestPurpose::SeriesInfo)
//!     .await?;
//! println!("status {}", response.status);
//! # Ok(())
//! # }
//! ```

mod error;
mod http_client;

pub use error::TransportError;
pub use http_client::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS, ReqwestTransport,
};

use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Why a request is made. Transports may use it for their own policy
/// (per-purpose rate limits, logging); it never changes parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestPurpose {
    /// Series search and series records.
    SeriesInfo,
    /// Chapter indexes and chapter details.
    ChapterInfo,
    /// Series cover images.
    CoverImage,
    /// Chapter page images.
    PageImage,
}

impl RequestPurpose {
    /// Returns the stable string label for logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SeriesInfo => "series-info",
            Self::ChapterInfo => "chapter-info",
            Self::CoverImage => "cover-image",
            Self::PageImage => "page-image",
        }
    }
}

/// Status code and body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Creates a response from its parts.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx status codes.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Port for issuing GET requests against a host.
///
/// Implementations own timeouts and retry policy; the connector issues one
/// request at a time and never retries.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues a GET request for `url`.
    ///
    /// Non-2xx statuses are returned as responses, not errors.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no status code could be obtained
    /// (connection refused, timeout, unreadable body).
    async fn fetch(&self, url: &str, purpose: RequestPurpose)
    -> Result<RawResponse, TransportError>;
}
