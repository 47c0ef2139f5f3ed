//! Resource resolution: turning a dataset descriptor into the concrete list
//! of (URL, filename) pairs to fetch.
//!
//! Two strategies, matching [`crate::registry::SourceKind`]:
//! - API discovery: one GET against the data.gouv.fr dataset endpoint,
//!   followed by filter dispatch to keep only the dataset's own files among
//!   the many resources a dataset page exposes.
//! - Direct URLs: the descriptor's URL list, returned verbatim.
//!
//! Filenames are derived deterministically from the URL (or resource title)
//! so that repeated runs land on the same destination paths.

mod error;
mod filename;
mod filter;

pub use error::DiscoveryError;
pub use filename::{FALLBACK_FILENAME, derive_filename, sanitize_filename};
pub use filter::ResourceFilter;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::registry::{ConfigError, DatasetDescriptor, SourceKind};

/// One candidate remote file surfaced by the discovery endpoint.
///
/// Transient: filtered and mapped into [`ResolvedFile`]s, never persisted.
#[derive(Debug, Clone)]
pub struct RemoteResource {
    /// Resource title as shown on data.gouv.fr.
    pub title: String,
    /// Download URL.
    pub url: String,
    /// Declared format tag ("csv", "txt", ...).
    pub format: String,
}

/// Wire shape of a discovery resource. Absent or null fields collapse to
/// empty strings rather than failing deserialization.
#[derive(Debug, Deserialize)]
struct RawResource {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    format: Option<String>,
}

impl From<RawResource> for RemoteResource {
    fn from(raw: RawResource) -> Self {
        Self {
            title: raw.title.unwrap_or_default(),
            url: raw.url.unwrap_or_default(),
            format: raw.format.unwrap_or_default(),
        }
    }
}

/// Discovery endpoint response. A missing `resources` key means zero
/// resources, not an error.
#[derive(Debug, Deserialize)]
struct DiscoveryResponse {
    #[serde(default)]
    resources: Vec<RawResource>,
}

/// A resolved candidate: where to fetch from and what to store it as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    /// Download URL.
    pub url: String,
    /// Derived filename within the dataset's storage directory.
    pub filename: String,
    /// Title of the discovery resource, when one was available.
    pub source_title: Option<String>,
}

/// Resolves dataset descriptors into download candidates.
#[derive(Debug, Clone)]
pub struct ResourceResolver {
    client: Client,
    api_base: String,
}

impl ResourceResolver {
    /// Creates a resolver over a shared HTTP client and discovery API base.
    #[must_use]
    pub fn new(client: Client, api_base: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
        }
    }

    /// Produces the list of (url, filename) candidates for a dataset.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] if the descriptor is malformed, the
    /// discovery call fails, or the response body cannot be decoded.
    #[instrument(skip(self, descriptor), fields(dataset = %descriptor.name))]
    pub async fn resolve(
        &self,
        descriptor: &DatasetDescriptor,
    ) -> Result<Vec<ResolvedFile>, DiscoveryError> {
        descriptor.validate()?;

        match descriptor.kind {
            SourceKind::ApiDiscovery => {
                // validate() guarantees both are present.
                let (Some(dataset_id), Some(filter)) = (descriptor.dataset_id, descriptor.filter)
                else {
                    return Err(ConfigError::MissingDatasetId {
                        name: descriptor.name.to_string(),
                    }
                    .into());
                };

                let resources = self.discover(dataset_id).await?;
                let total = resources.len();

                let matched: Vec<ResolvedFile> = resources
                    .into_iter()
                    .filter(|resource| filter.matches(resource))
                    .map(|resource| {
                        let filename = derive_filename(&resource.url, Some(&resource.title));
                        let source_title = (!resource.title.is_empty()).then_some(resource.title);
                        ResolvedFile {
                            url: resource.url,
                            filename,
                            source_title,
                        }
                    })
                    .collect();

                info!(total, matched = matched.len(), "filtered discovery resources");
                Ok(matched)
            }
            SourceKind::DirectUrl => Ok(descriptor
                .direct_urls
                .iter()
                .map(|url| ResolvedFile {
                    url: url.clone(),
                    filename: derive_filename(url, None),
                    source_title: None,
                })
                .collect()),
        }
    }

    /// Fetches the resource list for a dataset from the discovery endpoint.
    async fn discover(&self, dataset_id: &str) -> Result<Vec<RemoteResource>, DiscoveryError> {
        let url = format!(
            "{}/datasets/{}/",
            self.api_base.trim_end_matches('/'),
            dataset_id
        );
        debug!(%url, "querying discovery endpoint");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| DiscoveryError::network(url.clone(), source))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DiscoveryError::http_status(url, status.as_u16()));
        }

        let body: DiscoveryResponse = response
            .json()
            .await
            .map_err(|source| DiscoveryError::invalid_body(url, source))?;

        Ok(body.resources.into_iter().map(RemoteResource::from).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn direct_descriptor(urls: Vec<String>) -> DatasetDescriptor {
        DatasetDescriptor {
            name: "direct",
            description: "direct",
            kind: SourceKind::DirectUrl,
            encoding: "utf-8",
            separator: ",",
            file_format: "csv",
            dataset_id: None,
            direct_urls: urls,
            filter: None,
            notes: "",
        }
    }

    #[tokio::test]
    async fn test_resolve_direct_urls_verbatim() {
        let resolver = ResourceResolver::new(Client::new(), "https://unused.example");
        let descriptor = direct_descriptor(vec![
            "https://example.com/data/a.csv".to_string(),
            "https://example.com/data/b.csv".to_string(),
        ]);

        let resolved = resolver.resolve(&descriptor).await.unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].url, "https://example.com/data/a.csv");
        assert_eq!(resolved[0].filename, "a.csv");
        assert_eq!(resolved[0].source_title, None);
        assert_eq!(resolved[1].filename, "b.csv");
    }

    #[tokio::test]
    async fn test_resolve_rejects_invalid_descriptor() {
        let resolver = ResourceResolver::new(Client::new(), "https://unused.example");
        let mut descriptor = direct_descriptor(Vec::new());
        descriptor.kind = SourceKind::ApiDiscovery;

        let result = resolver.resolve(&descriptor).await;
        assert!(matches!(result, Err(DiscoveryError::Descriptor(_))));
    }

    #[test]
    fn test_raw_resource_null_fields_become_empty() {
        let raw: RawResource =
            serde_json::from_str(r#"{"title": null, "url": "https://x/file.csv"}"#).unwrap();
        let resource = RemoteResource::from(raw);
        assert_eq!(resource.title, "");
        assert_eq!(resource.url, "https://x/file.csv");
        assert_eq!(resource.format, "");
    }

    #[test]
    fn test_discovery_response_missing_resources_key() {
        let body: DiscoveryResponse = serde_json::from_str("{}").unwrap();
        assert!(body.resources.is_empty());
    }
}
