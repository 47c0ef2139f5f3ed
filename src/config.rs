//! Runtime configuration for the fetch pipeline.
//!
//! Values come from defaults, optionally overridden by environment variables
//! and CLI flags. The core never reads the environment itself: `main`
//! materializes a [`FetchConfig`] once and passes it down, which keeps the
//! orchestrator testable without environment mutation.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;

use crate::download::{CONNECT_TIMEOUT_SECS, REQUEST_TIMEOUT_SECS, RetryPolicy, USER_AGENT};

/// Environment variable overriding the discovery API base URL.
pub const ENV_API_BASE: &str = "DATAGOUV_API_BASE";

/// Environment variable overriding the storage root directory.
pub const ENV_STORAGE_ROOT: &str = "DATA_RAW_DIR";

/// Environment variable overriding the request timeout in seconds.
pub const ENV_TIMEOUT: &str = "DOWNLOAD_TIMEOUT_SECONDS";

/// Default discovery API base.
pub const DEFAULT_API_BASE: &str = "https://www.data.gouv.fr/api/1";

/// Default storage root, relative to the working directory.
pub const DEFAULT_STORAGE_ROOT: &str = "data/raw";

/// Configuration consumed by the orchestrator, resolver, and fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Discovery API base URL.
    pub api_base: String,
    /// Root directory holding one subdirectory per dataset.
    pub storage_root: PathBuf,
    /// Overall per-request timeout.
    pub request_timeout: Duration,
    /// Connect timeout, shorter than the request timeout.
    pub connect_timeout: Duration,
    /// Retry tuning for the fetcher.
    pub retry: RetryPolicy,
    /// Whether to render per-file progress bars.
    pub progress: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            storage_root: PathBuf::from(DEFAULT_STORAGE_ROOT),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
            progress: true,
        }
    }
}

impl FetchConfig {
    /// Loads configuration from the environment on top of defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(value) = env::var(ENV_API_BASE)
            && !value.is_empty()
        {
            config.api_base = value;
        }
        if let Ok(value) = env::var(ENV_STORAGE_ROOT)
            && !value.is_empty()
        {
            config.storage_root = PathBuf::from(value);
        }
        if let Ok(value) = env::var(ENV_TIMEOUT)
            && let Ok(secs) = value.parse::<u64>()
        {
            config.request_timeout = Duration::from_secs(secs);
        }

        config
    }

    /// Builds the shared HTTP client used by both the resolver and fetcher.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`reqwest::Error`] if the TLS backend fails to
    /// initialize.
    pub fn http_client(&self) -> Result<Client, reqwest::Error> {
        Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = FetchConfig::default();
        assert_eq!(config.api_base, "https://www.data.gouv.fr/api/1");
        assert_eq!(config.storage_root, PathBuf::from("data/raw"));
        assert_eq!(config.request_timeout, Duration::from_secs(600));
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert!(config.progress);
    }

    #[test]
    fn test_http_client_builds() {
        let config = FetchConfig::default();
        assert!(config.http_client().is_ok());
    }
}
