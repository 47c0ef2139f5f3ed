//! Download orchestration across datasets.
//!
//! The orchestrator walks the configured datasets sequentially. For each one
//! it resolves the candidate files, skips what is already on disk and
//! current, fetches the rest, and persists the dataset's metadata document.
//! One dataset's failure never aborts the others: failures are converted to
//! [`DatasetOutcome::Failed`] entries and the run continues.
//!
//! # Per-dataset state machine
//!
//! pending -> discovering -> fetching (0..N files) -> persisting ->
//! completed | failed. The designated stub dataset short-circuits straight
//! to completed with a placeholder artifact.

mod metadata;

pub use metadata::{DatasetMetadata, METADATA_FILE};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::{error, info, instrument, warn};

use crate::config::FetchConfig;
use crate::download::{DownloadError, FileRecord, HttpClient};
use crate::registry::{ConfigError, DatasetDescriptor, builtin_datasets};
use crate::resolver::{DiscoveryError, ResourceResolver};

/// Placeholder artifact written for the stub dataset.
const STUB_README: &str = "\
# data.ansm — Pharmacovigilance Data

This dataset is available at https://data.ansm.sante.fr/ as a visualization
platform. There is no bulk CSV download.

## Available data (via the platform)
- Adverse effect declarations (BNPV)
- Medication errors
- Stock shortage reports (Trustmed)
- Data available since 2014, updated annually (A-1)

## Future work
- Consider web scraping or API reverse-engineering in a future sprint
- The underlying Open Medic and BDPM data are already covered by other downloads
";

/// Errors from a single dataset pass.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Resource discovery failed.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// A file download failed after retry exhaustion.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// The dataset descriptor was malformed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// File system error outside a download (directories, stub artifact).
    #[error("IO error at {path}: {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The metadata document could not be encoded or decoded.
    #[error("metadata error at {path}: {source}")]
    Metadata {
        /// Path of the metadata document.
        path: PathBuf,
        /// The underlying serialization error.
        #[source]
        source: serde_json::Error,
    },
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn metadata(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Metadata {
            path: path.into(),
            source,
        }
    }
}

/// Outcome of one dataset in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetOutcome {
    /// The pass finished; `files` counts the records now in metadata,
    /// including files skipped as already current.
    Completed {
        /// Number of file records in the dataset's metadata.
        files: usize,
    },
    /// Stub dataset: placeholder artifact written, nothing downloaded.
    Stub,
    /// The pass failed; sibling datasets were unaffected.
    Failed {
        /// Rendered cause, for reporting.
        error: String,
    },
}

/// Coordinates resolver and fetcher across all configured datasets.
#[derive(Debug)]
pub struct Orchestrator {
    config: FetchConfig,
    datasets: Vec<DatasetDescriptor>,
    resolver: ResourceResolver,
    fetcher: HttpClient,
}

impl Orchestrator {
    /// Builds an orchestrator over the built-in dataset registry.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new(config: FetchConfig) -> Self {
        let client = config
            .http_client()
            .expect("failed to build HTTP client with static configuration");
        Self::with_datasets(config, client, builtin_datasets())
    }

    /// Builds an orchestrator over an explicit dataset list and HTTP client.
    #[must_use]
    pub fn with_datasets(
        config: FetchConfig,
        client: reqwest::Client,
        datasets: Vec<DatasetDescriptor>,
    ) -> Self {
        let resolver = ResourceResolver::new(client.clone(), config.api_base.clone());
        let fetcher = HttpClient::new(client, config.retry.clone(), config.progress);
        Self {
            config,
            datasets,
            resolver,
            fetcher,
        }
    }

    /// Runs the pipeline for `selected` dataset names, or all when `None`.
    ///
    /// Never fails as a whole: per-dataset failures are logged and recorded
    /// as [`DatasetOutcome::Failed`]. Unknown names are warned and skipped.
    #[instrument(skip(self, selected))]
    pub async fn run(&self, selected: Option<&[String]>) -> BTreeMap<String, DatasetOutcome> {
        let targets: Vec<&DatasetDescriptor> = match selected {
            None => self.datasets.iter().collect(),
            Some(names) => {
                let mut targets = Vec::new();
                for name in names {
                    match self.datasets.iter().find(|d| d.name == name.as_str()) {
                        Some(descriptor) => targets.push(descriptor),
                        None => warn!(dataset = %name, "unknown dataset, skipping"),
                    }
                }
                targets
            }
        };

        let mut results = BTreeMap::new();
        for descriptor in targets {
            info!(
                dataset = descriptor.name,
                description = descriptor.description,
                "starting dataset"
            );

            let outcome = if descriptor.is_stub() {
                match self.write_stub(descriptor).await {
                    Ok(()) => DatasetOutcome::Stub,
                    Err(err) => {
                        error!(dataset = descriptor.name, error = %err, "stub creation failed");
                        DatasetOutcome::Failed {
                            error: err.to_string(),
                        }
                    }
                }
            } else {
                match self.download_dataset(descriptor).await {
                    Ok(files) => {
                        info!(dataset = descriptor.name, files, "dataset complete");
                        DatasetOutcome::Completed { files }
                    }
                    Err(err) => {
                        error!(dataset = descriptor.name, error = %err, "dataset failed");
                        DatasetOutcome::Failed {
                            error: err.to_string(),
                        }
                    }
                }
            };
            results.insert(descriptor.name.to_string(), outcome);
        }

        results
    }

    /// Runs one dataset pass: resolve candidates, skip current files, fetch
    /// the rest, persist metadata.
    ///
    /// A file-level failure aborts the remaining files of this dataset, but
    /// the metadata accumulated so far is still persisted before the error
    /// surfaces, so partial progress survives across runs.
    #[instrument(skip(self, descriptor), fields(dataset = %descriptor.name))]
    async fn download_dataset(&self, descriptor: &DatasetDescriptor) -> Result<usize, PipelineError> {
        descriptor.validate()?;

        let dataset_dir = self.config.storage_root.join(descriptor.name);
        fs::create_dir_all(&dataset_dir)
            .await
            .map_err(|source| PipelineError::io(&dataset_dir, source))?;

        let mut metadata = DatasetMetadata::load(&dataset_dir, descriptor.name).await?;

        let candidates = self.resolver.resolve(descriptor).await?;
        info!(candidates = candidates.len(), "resolved candidates");

        let mut first_failure: Option<DownloadError> = None;
        let mut fetched = 0usize;

        for candidate in candidates {
            let dest = dataset_dir.join(&candidate.filename);

            if should_skip(&dest, metadata.files.get(&candidate.filename)) {
                info!(file = %candidate.filename, "already downloaded, skipping");
                continue;
            }

            info!(file = %candidate.filename, url = %candidate.url, "downloading");
            match self.fetcher.fetch(&candidate.url, &dest).await {
                Ok(mut record) => {
                    record.source_title = candidate.source_title;
                    metadata.files.insert(candidate.filename, record);
                    fetched += 1;
                }
                Err(err) => {
                    first_failure = Some(err);
                    break;
                }
            }
        }

        metadata.apply_descriptor(descriptor);
        metadata.save(&dataset_dir).await?;
        info!(fetched, total = metadata.files.len(), "pass persisted");

        match first_failure {
            Some(err) => Err(err.into()),
            None => Ok(metadata.files.len()),
        }
    }

    /// Writes the fixed placeholder artifact for the stub dataset.
    async fn write_stub(&self, descriptor: &DatasetDescriptor) -> Result<(), PipelineError> {
        let dataset_dir = self.config.storage_root.join(descriptor.name);
        fs::create_dir_all(&dataset_dir)
            .await
            .map_err(|source| PipelineError::io(&dataset_dir, source))?;

        let readme = dataset_dir.join("README.md");
        fs::write(&readme, STUB_README)
            .await
            .map_err(|source| PipelineError::io(&readme, source))?;

        info!(path = %readme.display(), "created stub artifact");
        Ok(())
    }
}

/// Skip check: the destination exists, a prior record exists, and the
/// on-disk size matches the recorded size. The contents are not re-hashed;
/// size drift is the only corruption signal checked here.
fn should_skip(dest: &Path, record: Option<&FileRecord>) -> bool {
    let Some(record) = record else {
        return false;
    };
    let Ok(meta) = std::fs::metadata(dest) else {
        return false;
    };
    meta.is_file() && meta.len() == record.size_bytes
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn record_with_size(size_bytes: u64) -> FileRecord {
        FileRecord {
            url: "https://example.com/file.csv".to_string(),
            size_bytes,
            sha256: "ab".repeat(32),
            downloaded_at: Utc::now(),
            source_title: None,
        }
    }

    #[test]
    fn test_should_skip_nonexistent_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("absent.csv");
        assert!(!should_skip(&dest, Some(&record_with_size(5))));
    }

    #[test]
    fn test_should_skip_without_record() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("present.csv");
        std::fs::write(&dest, "hello").unwrap();
        assert!(!should_skip(&dest, None));
    }

    #[test]
    fn test_should_skip_matching_size() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("present.csv");
        std::fs::write(&dest, "hello").unwrap();
        assert!(should_skip(&dest, Some(&record_with_size(5))));
    }

    #[test]
    fn test_should_skip_size_drift_forces_redownload() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("present.csv");
        std::fs::write(&dest, "hello").unwrap();
        assert!(!should_skip(&dest, Some(&record_with_size(999_999))));
    }
}
