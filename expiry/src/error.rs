use std::io;
use std::path::PathBuf;
use std::time::Duration;

use expiry_core::HostError;
use thiserror::Error;

/// Invalid option combination, reported when the configuration is built.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// No root directory to look assets up in.
    #[error("at least one root directory is required")]
    NoRoots,
    /// A configured CDN host is malformed.
    #[error("invalid host: {0}")]
    Host(#[from] HostError),
    /// `max-age` or `Expires` is requested with a zero duration.
    #[error("duration must be positive when max-age or expires is enabled")]
    ZeroDuration,
    /// `now + duration` cannot be written as an HTTP date.
    #[error("duration {0:?} reaches past the last date HTTP can express")]
    DurationTooLarge(Duration),
    /// The literal `Cache-Control` value cannot be sent as a header.
    #[error("cache-control value `{0}` contains characters not allowed in a header")]
    CacheControl(String),
    /// The debug endpoint path does not start with `/`.
    #[error("debug path `{0}` must start with `/`")]
    DebugPath(String),
}

/// Errors raised while fingerprinting or warming the cache.
///
/// A missing asset file is not an error: it is memoized as an identity
/// mapping. Everything here is unexpected and is not memoized, so the next
/// access retries.
#[derive(Debug, Error)]
pub enum ExpiryError {
    /// The fingerprint function failed for a reason other than a missing file.
    #[error("failed to fingerprint {path}: {source}")]
    Fingerprint {
        /// File being fingerprinted.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The modification time of a fingerprinted file could not be read.
    #[error("failed to read metadata of {path}: {source}")]
    Metadata {
        /// File whose metadata was requested.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Walking a root directory failed.
    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}
