//! Error types for resource discovery.

use thiserror::Error;

use crate::registry::ConfigError;

/// Errors that can occur while resolving a dataset's resources.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Network-level error reaching the discovery endpoint.
    #[error("network error querying {url}: {source}")]
    Network {
        /// The discovery URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The discovery endpoint returned an error status.
    #[error("discovery endpoint returned HTTP {status} for {url}")]
    HttpStatus {
        /// The discovery URL that failed.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body could not be decoded as a discovery document.
    #[error("undecodable discovery response from {url}: {source}")]
    InvalidBody {
        /// The discovery URL that failed.
        url: String,
        /// The underlying decode error.
        #[source]
        source: reqwest::Error,
    },

    /// The descriptor reaching the resolver was malformed.
    #[error(transparent)]
    Descriptor(#[from] ConfigError),
}

impl DiscoveryError {
    /// Creates a network error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an invalid body error.
    pub fn invalid_body(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::InvalidBody {
            url: url.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_display() {
        let error = DiscoveryError::http_status("https://www.data.gouv.fr/api/1/datasets/x/", 503);
        let msg = error.to_string();
        assert!(msg.contains("503"), "Expected '503' in: {msg}");
        assert!(msg.contains("datasets/x"), "Expected URL in: {msg}");
    }

    #[test]
    fn test_descriptor_error_passthrough() {
        let error: DiscoveryError = ConfigError::MissingFilter {
            name: "rpps".to_string(),
        }
        .into();
        assert!(error.to_string().contains("rpps"));
    }
}
