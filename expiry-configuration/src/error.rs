use expiry::ConfigError;
use expiry_core::ManifestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_saphyr::Error),
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to load fingerprint manifest: {0}")]
    Manifest(#[from] ManifestError),
    #[error("a load filter requires `at: startup`")]
    LazyFilter,
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}
