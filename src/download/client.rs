//! HTTP client for streaming downloads with atomic placement.
//!
//! The client streams response bodies to a `.part` file beside the
//! destination and renames it into place only after the full body arrives,
//! so a partially-written file is never visible at the final path. After the
//! rename it hashes the finished file and returns a [`FileRecord`] with the
//! provenance the orchestrator persists.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::constants::PART_SUFFIX;
use super::error::DownloadError;
use super::hash::sha256_file;
use super::retry::RetryPolicy;

/// Integrity metadata recorded for one downloaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Source URL the file was fetched from.
    pub url: String,
    /// Final size on disk.
    pub size_bytes: u64,
    /// Hex SHA-256 digest of the file contents.
    pub sha256: String,
    /// When the download finished.
    pub downloaded_at: DateTime<Utc>,
    /// Title of the discovery resource, when one was available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_title: Option<String>,
}

/// HTTP client for streaming file downloads.
///
/// Wraps a shared [`reqwest::Client`] (connection pooling across datasets)
/// with the retry policy and progress settings for this run.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    retry: RetryPolicy,
    progress: bool,
}

impl HttpClient {
    /// Creates a fetcher over a shared HTTP client.
    #[must_use]
    pub fn new(client: Client, retry: RetryPolicy, progress: bool) -> Self {
        Self {
            client,
            retry,
            progress,
        }
    }

    /// Downloads `url` to `dest`, retrying failures with backoff.
    ///
    /// # Errors
    ///
    /// Returns the last [`DownloadError`] once the retry budget is exhausted.
    #[instrument(skip(self, dest), fields(dest = %dest.display()))]
    pub async fn fetch(&self, url: &str, dest: &Path) -> Result<FileRecord, DownloadError> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            debug!(attempt, "attempting download");

            match self.fetch_once(url, dest).await {
                Ok(record) => return Ok(record),
                Err(error) => match self.retry.backoff(attempt) {
                    Some(delay) => {
                        warn!(
                            attempt,
                            max_attempts = self.retry.max_attempts(),
                            delay_secs = delay.as_secs_f64(),
                            error = %error,
                            "retrying download"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    None => {
                        warn!(attempts = attempt, error = %error, "download failed after all attempts");
                        return Err(error);
                    }
                },
            }
        }
    }

    /// One download attempt: stream to the temp path, rename, hash.
    async fn fetch_once(&self, url: &str, dest: &Path) -> Result<FileRecord, DownloadError> {
        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| DownloadError::io(parent, source))?;
        }

        let part_path = part_path_for(dest);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| DownloadError::from_reqwest(url, source))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }

        let total = response.content_length().unwrap_or(0);
        let progress = self.progress_bar(total, dest);

        let streamed = stream_to_file(response, url, &part_path, &progress).await;
        progress.finish_and_clear();

        if let Err(error) = streamed {
            // Never leave stale partial bytes behind for the next attempt.
            if let Err(cleanup) = fs::remove_file(&part_path).await
                && cleanup.kind() != std::io::ErrorKind::NotFound
            {
                warn!(path = %part_path.display(), error = %cleanup, "failed to remove partial file");
            }
            return Err(error);
        }

        // Atomic rename: the final path only ever sees complete content.
        fs::rename(&part_path, dest)
            .await
            .map_err(|source| DownloadError::io(dest, source))?;

        let sha256 = sha256_file(dest).await?;
        let size_bytes = fs::metadata(dest)
            .await
            .map_err(|source| DownloadError::io(dest, source))?
            .len();

        info!(
            path = %dest.display(),
            bytes = size_bytes,
            sha256_prefix = &sha256[..12],
            "download complete"
        );

        Ok(FileRecord {
            url: url.to_string(),
            size_bytes,
            sha256,
            downloaded_at: Utc::now(),
            source_title: None,
        })
    }

    /// Byte progress bar when the content length is known, hidden otherwise.
    fn progress_bar(&self, total: u64, dest: &Path) -> ProgressBar {
        if !self.progress || total == 0 {
            return ProgressBar::hidden();
        }

        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::with_template(
                "{msg} {bytes}/{total_bytes} [{bar:30}] {bytes_per_sec} {eta}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.set_message(
            dest.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );
        bar
    }
}

/// Streams the response body into `path` in bounded-memory chunks.
async fn stream_to_file(
    response: reqwest::Response,
    url: &str,
    path: &Path,
    progress: &ProgressBar,
) -> Result<u64, DownloadError> {
    let file = File::create(path)
        .await
        .map_err(|source| DownloadError::io(path, source))?;
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|source| DownloadError::from_reqwest(url, source))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|source| DownloadError::io(path, source))?;
        written += chunk.len() as u64;
        progress.inc(chunk.len() as u64);
    }

    writer
        .flush()
        .await
        .map_err(|source| DownloadError::io(path, source))?;

    Ok(written)
}

/// Temp path beside the destination (`file.csv` -> `file.csv.part`).
fn part_path_for(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(PART_SUFFIX);
    PathBuf::from(name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_part_path_keeps_full_filename() {
        let part = part_path_for(Path::new("/data/raw/bdpm/CIS_bdpm.txt"));
        assert_eq!(part, PathBuf::from("/data/raw/bdpm/CIS_bdpm.txt.part"));
    }

    #[test]
    fn test_file_record_serialization_omits_missing_title() {
        let record = FileRecord {
            url: "https://example.com/file.csv".to_string(),
            size_bytes: 42,
            sha256: "ab".repeat(32),
            downloaded_at: Utc::now(),
            source_title: None,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("source_title"));

        let with_title = FileRecord {
            source_title: Some("Extraction 2024".to_string()),
            ..record
        };
        let json = serde_json::to_string(&with_title).unwrap();
        assert!(json.contains("source_title"));
    }

    #[test]
    fn test_file_record_roundtrip() {
        let record = FileRecord {
            url: "https://example.com/file.csv".to_string(),
            size_bytes: 42,
            sha256: "cd".repeat(32),
            downloaded_at: Utc::now(),
            source_title: Some("title".to_string()),
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: FileRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
