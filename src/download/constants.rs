//! Constants for the download module (timeouts, buffers, naming).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default overall request timeout (10 minutes). Some extractions are
/// hundreds of megabytes served by slow government mirrors.
pub const REQUEST_TIMEOUT_SECS: u64 = 600;

/// Block size used when hashing a finished download.
pub const HASH_BLOCK_SIZE: usize = 64 * 1024;

/// Suffix appended to the destination path while a download is in flight.
pub const PART_SUFFIX: &str = ".part";

/// User-Agent sent with every request.
pub const USER_AGENT: &str = "sante-dl/0.1 (open-data-fetch; +https://github.com)";
