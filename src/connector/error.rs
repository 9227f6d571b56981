//! Error types for connector operations.
//!
//! Read paths degrade to empty or absent results; only the conditions below
//! are surfaced to callers.

use thiserror::Error;

use crate::transport::TransportError;

/// Errors that can occur while building or using a connector.
#[derive(Debug, Clone, Error)]
pub enum ConnectorError {
    /// A series record lacks a field required to build a work
    #[error("series record is missing required field '{field}'\n  Suggestion: {suggestion}")]
    MissingField {
        /// Name of the missing remote field
        field: &'static str,
        /// How to fix the issue
        suggestion: String,
    },

    /// A record could not be decoded into the expected shape
    #[error("malformed {record} record: {reason}\n  Suggestion: {suggestion}")]
    MalformedRecord {
        /// Kind of record being decoded
        record: &'static str,
        /// Decoder message
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// The configured API hostname is unusable
    #[error("invalid hostname '{hostname}': {reason}\n  Suggestion: {suggestion}")]
    InvalidHostname {
        /// The hostname that failed validation
        hostname: String,
        /// Why the hostname is invalid
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// The transport could not be set up
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ConnectorError {
    /// Creates a `MissingField` error.
    #[must_use]
    pub fn missing_field(field: &'static str) -> Self {
        Self::MissingField {
            field,
            suggestion: "The host may use an unsupported API version".to_string(),
        }
    }

    /// Creates a `MalformedRecord` error.
    #[must_use]
    pub fn malformed_record(record: &'static str, reason: &str) -> Self {
        Self::MalformedRecord {
            record,
            reason: reason.to_string(),
            suggestion: "Check that the input is a HeanCMS API response".to_string(),
        }
    }

    /// Creates an `InvalidHostname` error.
    #[must_use]
    pub fn invalid_hostname(hostname: &str, reason: &str) -> Self {
        Self::InvalidHostname {
            hostname: hostname.to_string(),
            reason: reason.to_string(),
            suggestion: "Use an absolute API URL such as https://api.example.com".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message() {
        let err = ConnectorError::missing_field("title");
        let msg = err.to_string();
        assert!(msg.contains("'title'"), "should name the field");
        assert!(msg.contains("Suggestion"), "should have suggestion");
    }

    #[test]
    fn test_malformed_record_message() {
        let err = ConnectorError::malformed_record("series", "invalid type: integer");
        let msg = err.to_string();
        assert!(msg.contains("malformed series record"), "should name the record");
        assert!(msg.contains("invalid type"), "should contain reason");
    }

    #[test]
    fn test_invalid_hostname_message() {
        let err = ConnectorError::invalid_hostname("api.example.com", "relative URL without a base");
        let msg = err.to_string();
        assert!(msg.contains("api.example.com"), "should contain hostname");
        assert!(msg.contains("relative URL"), "should contain reason");
        assert!(msg.contains("https://"), "suggestion should show a full URL");
    }

    #[test]
    fn test_transport_error_is_transparent() {
        let err: ConnectorError = TransportError::client_build("no TLS backend").into();
        assert!(err.to_string().contains("no TLS backend"));
    }
}
