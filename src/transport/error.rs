//! Error types for transport operations.
//!
//! Follows the What/Why/Fix message pattern used across the project.

use thiserror::Error;

/// Errors raised by a [`Transport`](super::Transport) before a status code is
/// available.
///
/// HTTP error statuses are not errors at this layer; they are returned in
/// [`RawResponse`](super::RawResponse) for the connector to interpret.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The request could not be sent or the body could not be read.
    #[error("request to '{url}' failed: {reason}\n  Suggestion: {suggestion}")]
    RequestFailed {
        /// The URL that was requested
        url: String,
        /// Why the request failed
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// The HTTP client could not be constructed.
    #[error("HTTP client construction failed: {reason}\n  Suggestion: {suggestion}")]
    ClientBuild {
        /// Why construction failed
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },
}

impl TransportError {
    /// Creates a `RequestFailed` error.
    #[must_use]
    pub fn request_failed(url: &str, reason: &str) -> Self {
        Self::RequestFailed {
            url: url.to_string(),
            reason: reason.to_string(),
            suggestion: "Check your network connection and the configured hostname".to_string(),
        }
    }

    /// Creates a `ClientBuild` error.
    #[must_use]
    pub fn client_build(reason: &str) -> Self {
        Self::ClientBuild {
            reason: reason.to_string(),
            suggestion: "Check proxy environment variables and TLS configuration".to_string(),
        }
    }
}
