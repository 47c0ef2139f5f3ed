//! Streaming HTTP fetcher for large open-data files.
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for multi-hundred-MB extractions)
//! - Atomic placement: stream to `<dest>.part`, rename on full success
//! - SHA-256 provenance hashing of the finished file
//! - Retry with exponential backoff on any failure
//! - Configurable timeouts (30s connect, 10min request by default)

mod client;
mod constants;
mod error;
mod hash;
mod retry;

pub use client::{FileRecord, HttpClient};
pub use constants::{CONNECT_TIMEOUT_SECS, PART_SUFFIX, REQUEST_TIMEOUT_SECS, USER_AGENT};
pub use error::DownloadError;
pub use hash::sha256_file;
pub use retry::{DEFAULT_MAX_ATTEMPTS, RetryPolicy};
