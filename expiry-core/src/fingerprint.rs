//! Content fingerprints for asset files.
//!
//! A [`Fingerprint`] turns a file path into a short identifier that changes
//! whenever the file content changes. The cache store only relies on two
//! outcomes being distinguishable: the file does not exist
//! ([`FingerprintError::NotFound`], memoized by the store) and every other
//! I/O failure ([`FingerprintError::Io`], propagated to the caller).
//!
//! Implementations:
//!
//! | Type | Identifier |
//! |------|------------|
//! | [`Md5Fingerprint`] | hex MD5 of the file content (default) |
//! | [`Sha256Fingerprint`] | hex SHA-256, optionally truncated |
//! | [`ManifestFingerprint`] | value looked up in a build manifest |
//! | any `Fn(&Path) -> Result<String, FingerprintError>` | whatever the closure returns |

use std::collections::HashMap;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use md5::{Digest, Md5};
use sha2::Sha256;
use thiserror::Error;

/// Failure to fingerprint a file.
#[derive(Debug, Error)]
pub enum FingerprintError {
    /// The path does not name a regular, existing file.
    #[error("asset file not found")]
    NotFound,
    /// Any other filesystem failure.
    #[error(transparent)]
    Io(io::Error),
}

impl From<io::Error> for FingerprintError {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => FingerprintError::NotFound,
            _ => FingerprintError::Io(error),
        }
    }
}

/// Computes a stable identifier for the file at a path.
///
/// Implementations must be pure functions of the file content: the same
/// bytes always produce the same fingerprint, in every process.
pub trait Fingerprint: Send + Sync {
    /// Returns the fingerprint of the file at `path`.
    fn fingerprint(&self, path: &Path) -> Result<String, FingerprintError>;
}

impl<F> Fingerprint for F
where
    F: Fn(&Path) -> Result<String, FingerprintError> + Send + Sync,
{
    fn fingerprint(&self, path: &Path) -> Result<String, FingerprintError> {
        self(path)
    }
}

/// Opens `path` for reading, treating anything but a regular file as missing.
fn open_regular(path: &Path) -> Result<File, FingerprintError> {
    let metadata = fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(FingerprintError::NotFound);
    }
    Ok(File::open(path)?)
}

/// Hex-encoded MD5 digest of the file content.
#[derive(Debug, Clone, Copy, Default)]
pub struct Md5Fingerprint;

impl Fingerprint for Md5Fingerprint {
    fn fingerprint(&self, path: &Path) -> Result<String, FingerprintError> {
        let mut file = open_regular(path)?;
        let mut hasher = Md5::new();
        io::copy(&mut file, &mut hasher)?;
        Ok(hex::encode(hasher.finalize()))
    }
}

/// Hex-encoded SHA-256 digest of the file content.
///
/// The digest can be truncated to keep URLs short; 16 hex characters are
/// plenty to tell deployments apart.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Fingerprint {
    length: Option<usize>,
}

impl Sha256Fingerprint {
    /// Full 64 character digest.
    pub fn new() -> Self {
        Self { length: None }
    }

    /// Digest truncated to the first `length` hex characters.
    pub fn truncated(length: usize) -> Self {
        Self {
            length: Some(length),
        }
    }
}

impl Fingerprint for Sha256Fingerprint {
    fn fingerprint(&self, path: &Path) -> Result<String, FingerprintError> {
        let mut file = open_regular(path)?;
        let mut hasher = Sha256::new();
        io::copy(&mut file, &mut hasher)?;
        let mut digest = hex::encode(hasher.finalize());
        if let Some(length) = self.length {
            digest.truncate(length);
        }
        Ok(digest)
    }
}

/// Failure to load a build manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest file could not be read.
    #[error("failed to read manifest: {0}")]
    Io(#[from] io::Error),
    /// The manifest is not a JSON object of strings.
    #[error("failed to parse manifest: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fingerprints taken from a build manifest instead of the file content.
///
/// The manifest is a JSON object mapping paths relative to `root` (with `/`
/// separators) to their fingerprints, as emitted by most asset bundlers:
///
/// ```json
/// { "css/main.css": "4f2a9c", "js/app.js": "77e0d1" }
/// ```
///
/// Files missing from the manifest are reported as
/// [`FingerprintError::NotFound`].
#[derive(Debug, Clone)]
pub struct ManifestFingerprint {
    root: PathBuf,
    entries: HashMap<String, String>,
}

impl ManifestFingerprint {
    /// Builds a manifest fingerprint from already loaded entries.
    pub fn new(root: impl Into<PathBuf>, entries: HashMap<String, String>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(path, fingerprint)| (path.trim_start_matches('/').to_owned(), fingerprint))
            .collect();
        Self {
            root: root.into(),
            entries,
        }
    }

    /// Parses manifest JSON.
    pub fn from_json(root: impl Into<PathBuf>, json: &str) -> Result<Self, ManifestError> {
        let entries: HashMap<String, String> = serde_json::from_str(json)?;
        Ok(Self::new(root, entries))
    }

    /// Reads and parses a manifest file.
    pub fn from_file(
        root: impl Into<PathBuf>,
        manifest: impl AsRef<Path>,
    ) -> Result<Self, ManifestError> {
        let json = fs::read_to_string(manifest)?;
        Self::from_json(root, &json)
    }

    fn key(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let segments = relative
            .components()
            .map(|component| component.as_os_str().to_str())
            .collect::<Option<Vec<_>>>()?;
        Some(segments.join("/"))
    }
}

impl Fingerprint for ManifestFingerprint {
    fn fingerprint(&self, path: &Path) -> Result<String, FingerprintError> {
        self.key(path)
            .and_then(|key| self.entries.get(&key))
            .cloned()
            .ok_or(FingerprintError::NotFound)
    }
}
