//! Streaming SHA-256 hashing of finished downloads.

use std::path::Path;

use sha2::{Digest, Sha256};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use super::constants::HASH_BLOCK_SIZE;
use super::error::DownloadError;

/// Computes the SHA-256 hex digest of a file, reading fixed-size blocks so
/// large downloads are never loaded whole into memory.
///
/// # Errors
///
/// Returns [`DownloadError::Io`] if the file cannot be opened or read.
pub async fn sha256_file(path: &Path) -> Result<String, DownloadError> {
    let mut file = File::open(path)
        .await
        .map_err(|source| DownloadError::io(path, source))?;

    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; HASH_BLOCK_SIZE];
    loop {
        let read = file
            .read(&mut buf)
            .await
            .map_err(|source| DownloadError::io(path, source))?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}
