use std::path::PathBuf;
use std::time::Duration;

use expiry::config::{DEFAULT_DEBUG_PATH, DEFAULT_DURATION, DEFAULT_ROOT};
use expiry::{Conditional, ExpiryConfig, Location, Unconditional};
use serde::{Deserialize, Serialize};

use crate::cache_control::CacheControlConfig;
use crate::error::ConfigurationError;
use crate::fingerprint::FingerprintConfig;
use crate::load::LoadCache;

/// A single value or a list of values.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// Asset lifetime, either in seconds or as a human readable duration
/// (`1year`, `30days`).
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Lifetime {
    Seconds(u64),
    Human(#[serde(with = "humantime_serde")] Duration),
}

impl Default for Lifetime {
    fn default() -> Self {
        Lifetime::Seconds(DEFAULT_DURATION.as_secs())
    }
}

impl From<Lifetime> for Duration {
    fn from(lifetime: Lifetime) -> Self {
        match lifetime {
            Lifetime::Seconds(seconds) => Duration::from_secs(seconds),
            Lifetime::Human(duration) => duration,
        }
    }
}

/// Expiry options as found in a configuration file.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigExpiry {
    pub unconditional: Unconditional,
    pub conditional: Conditional,
    pub duration: Lifetime,
    pub cache_control: CacheControlConfig,
    pub dir: OneOrMany<PathBuf>,
    pub fingerprint: FingerprintConfig,
    pub location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<OneOrMany<String>>,
    pub load_cache: LoadCache,
    pub prefer_production_path: bool,
    pub debug: bool,
    pub debug_path: String,
}

impl Default for ConfigExpiry {
    fn default() -> Self {
        Self {
            unconditional: Unconditional::default(),
            conditional: Conditional::default(),
            duration: Lifetime::default(),
            cache_control: CacheControlConfig::default(),
            dir: OneOrMany::One(PathBuf::from(DEFAULT_ROOT)),
            fingerprint: FingerprintConfig::default(),
            location: Location::default(),
            host: None,
            load_cache: LoadCache::default(),
            prefer_production_path: false,
            debug: false,
            debug_path: DEFAULT_DEBUG_PATH.to_owned(),
        }
    }
}

impl ConfigExpiry {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigurationError> {
        Ok(serde_saphyr::from_str(yaml)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Resolves the file options into a validated [`ExpiryConfig`].
    ///
    /// A manifest fingerprint is loaded here, relative to the first directory.
    pub fn into_config(self) -> Result<ExpiryConfig, ConfigurationError> {
        let roots = self.dir.into_vec();
        let fingerprint = match roots.first() {
            Some(root) => self.fingerprint.into_fingerprint(root)?,
            None => return Err(expiry::ConfigError::NoRoots.into()),
        };

        let mut builder = ExpiryConfig::builder()
            .unconditional(self.unconditional)
            .conditional(self.conditional)
            .duration(self.duration.into())
            .cache_control(self.cache_control.into_cache_control())
            .roots(roots)
            .shared_fingerprint(fingerprint)
            .location(self.location)
            .loading(self.load_cache.into_loading()?)
            .prefer_production_path(self.prefer_production_path)
            .debug(self.debug)
            .debug_path(self.debug_path);

        builder = match self.host {
            Some(OneOrMany::One(host)) => builder.host(host),
            Some(OneOrMany::Many(hosts)) => builder.hosts(hosts),
            None => builder,
        };

        Ok(builder.build()?)
    }
}
