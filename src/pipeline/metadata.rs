//! Per-dataset metadata persistence.
//!
//! One `_metadata.json` per dataset directory records every downloaded file
//! with its provenance, the dataset's text encoding and separator for
//! downstream loaders, and the time of the last pass. The document is the
//! skip check's source of truth, so it is written atomically: a half-written
//! metadata file would poison every later run.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use super::PipelineError;
use crate::download::FileRecord;
use crate::registry::DatasetDescriptor;

/// Name of the metadata document inside each dataset directory.
pub const METADATA_FILE: &str = "_metadata.json";

/// Persisted state of one dataset: which files are on disk and how they got
/// there.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    /// Dataset name, mirroring the directory name.
    pub dataset: String,
    /// Filename to provenance record, sorted for stable output.
    #[serde(default)]
    pub files: BTreeMap<String, FileRecord>,
    /// Text encoding of the raw files.
    #[serde(default)]
    pub encoding: String,
    /// Field separator of the raw files.
    #[serde(default)]
    pub separator: String,
    /// Free-text operator notes.
    #[serde(default)]
    pub notes: String,
    /// When the last pass finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl DatasetMetadata {
    /// Fresh empty shell for a dataset.
    #[must_use]
    pub fn empty(dataset: &str) -> Self {
        Self {
            dataset: dataset.to_string(),
            ..Self::default()
        }
    }

    /// Loads the metadata document from `dataset_dir`, or an empty shell when
    /// the file is missing or empty.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if the file exists but cannot be read or
    /// decoded.
    pub async fn load(dataset_dir: &Path, dataset: &str) -> Result<Self, PipelineError> {
        let path = dataset_dir.join(METADATA_FILE);

        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::empty(dataset));
            }
            Err(error) => return Err(PipelineError::io(path, error)),
        };

        if raw.trim().is_empty() {
            return Ok(Self::empty(dataset));
        }

        serde_json::from_str(&raw).map_err(|source| PipelineError::metadata(path, source))
    }

    /// Copies the descriptor fields the metadata mirrors for downstream
    /// loaders.
    pub fn apply_descriptor(&mut self, descriptor: &DatasetDescriptor) {
        self.encoding = descriptor.encoding.to_string();
        self.separator = descriptor.separator.to_string();
        self.notes = descriptor.notes.to_string();
    }

    /// Persists the document atomically (temp file + rename), stamping
    /// `last_updated`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if serialization or the write fails.
    pub async fn save(&mut self, dataset_dir: &Path) -> Result<(), PipelineError> {
        self.last_updated = Some(Utc::now());

        let path = dataset_dir.join(METADATA_FILE);
        let tmp = path.with_extension("json.tmp");

        let body = serde_json::to_string_pretty(self)
            .map_err(|source| PipelineError::metadata(path.clone(), source))?;
        fs::write(&tmp, body)
            .await
            .map_err(|source| PipelineError::io(tmp.clone(), source))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|source| PipelineError::io(path.clone(), source))?;

        debug!(path = %path.display(), files = self.files.len(), "metadata saved");
        Ok(())
    }
}
