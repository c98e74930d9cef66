use std::path::{Path, PathBuf};
use std::sync::Arc;

use expiry::{Fingerprint, ManifestFingerprint, Md5Fingerprint, Sha256Fingerprint};
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Fingerprint function selection.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(tag = "type")]
pub enum FingerprintConfig {
    /// Hex MD5 of the file content.
    #[default]
    Md5,
    /// Hex SHA-256 of the file content, optionally truncated.
    Sha256 {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        length: Option<usize>,
    },
    /// Fingerprints read from a JSON manifest. Manifest keys are relative to
    /// the first configured directory.
    Manifest { path: PathBuf },
}

impl FingerprintConfig {
    pub fn into_fingerprint(self, root: &Path) -> Result<Arc<dyn Fingerprint>, ConfigurationError> {
        let fingerprint: Arc<dyn Fingerprint> = match self {
            FingerprintConfig::Md5 => Arc::new(Md5Fingerprint),
            FingerprintConfig::Sha256 { length: None } => Arc::new(Sha256Fingerprint::new()),
            FingerprintConfig::Sha256 {
                length: Some(length),
            } => Arc::new(Sha256Fingerprint::truncated(length)),
            FingerprintConfig::Manifest { path } => {
                Arc::new(ManifestFingerprint::from_file(root, path)?)
            }
        };
        Ok(fingerprint)
    }
}
