use std::path::Path;

use expiry::{CacheLoading, file_filter};
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// When the cache store gets filled.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    #[default]
    Startup,
    #[serde(alias = "furl")]
    Lazy,
}

/// Startup loading restricted by file extension.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct LoadFilter {
    pub at: LoadMode,
    /// Only files with one of these extensions are warmed. Empty means all.
    pub include: Vec<String>,
    /// Files with one of these extensions are never warmed.
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum LoadCache {
    Mode(LoadMode),
    Filtered(LoadFilter),
}

impl Default for LoadCache {
    fn default() -> Self {
        LoadCache::Mode(LoadMode::Startup)
    }
}

impl From<LoadMode> for CacheLoading {
    fn from(mode: LoadMode) -> Self {
        match mode {
            LoadMode::Startup => CacheLoading::Startup,
            LoadMode::Lazy => CacheLoading::Lazy,
        }
    }
}

impl LoadCache {
    pub fn into_loading(self) -> Result<CacheLoading, ConfigurationError> {
        match self {
            LoadCache::Mode(mode) => Ok(mode.into()),
            LoadCache::Filtered(filter)
                if filter.include.is_empty() && filter.exclude.is_empty() =>
            {
                Ok(filter.at.into())
            }
            LoadCache::Filtered(LoadFilter {
                at: LoadMode::Lazy, ..
            }) => Err(ConfigurationError::LazyFilter),
            LoadCache::Filtered(filter) => {
                let include = normalize(filter.include);
                let exclude = normalize(filter.exclude);
                Ok(CacheLoading::StartupFiltered(file_filter(move |path, _| {
                    let extension = extension(path);
                    let included = include.is_empty()
                        || extension.as_ref().is_some_and(|ext| include.contains(ext));
                    let excluded = extension.as_ref().is_some_and(|ext| exclude.contains(ext));
                    included && !excluded
                })))
            }
        }
    }
}

fn normalize(extensions: Vec<String>) -> Vec<String> {
    extensions
        .into_iter()
        .map(|ext| ext.trim_start_matches('.').to_ascii_lowercase())
        .collect()
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}
