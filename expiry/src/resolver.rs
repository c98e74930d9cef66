//! The [`Expiry`] handle applications hold on to.
//!
//! It owns the resolved configuration and the cache store. Construction warms
//! the store according to [`CacheLoading`].

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::ExpiryConfig;
use crate::error::ExpiryError;
use crate::policy::CacheLoading;
use crate::store::{CacheSnapshot, CacheStore};
use crate::warm::{FileFilter, WarmReport, walk};

/// Entry point tying the configuration to its cache store.
///
/// `Expiry` is cheap to clone; clones share the same store. Hand one to
/// template helpers (through [`resolve`](Self::resolve) or
/// [`furl`](Self::furl)) and one to the HTTP middleware.
///
/// ```no_run
/// use expiry::{Expiry, ExpiryConfig};
///
/// let expiry = Expiry::new(ExpiryConfig::builder().root("public").build()?)?;
/// let url = expiry.resolve("/css/main.css")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct Expiry {
    config: Arc<ExpiryConfig>,
    store: Arc<CacheStore>,
}

impl Expiry {
    /// Creates the store and, for startup loading, fingerprints every file
    /// under the configured roots before returning.
    pub fn new(config: ExpiryConfig) -> Result<Self, ExpiryError> {
        let store = Arc::new(CacheStore::new(&config));
        let expiry = Self {
            config: Arc::new(config),
            store,
        };

        if expiry.is_enabled() && !matches!(expiry.config.loading, CacheLoading::Lazy) {
            expiry.warm()?;
        }
        Ok(expiry)
    }

    /// The resolved configuration.
    pub fn config(&self) -> &ExpiryConfig {
        &self.config
    }

    /// The shared cache store.
    pub fn store(&self) -> &Arc<CacheStore> {
        &self.store
    }

    /// Whether asset URLs get fingerprinted at all.
    pub fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    /// Returns the fingerprinted URL of `asset`.
    ///
    /// Unknown assets come back unchanged. With fingerprinting disabled the
    /// input is returned as is and nothing is cached.
    pub fn resolve(&self, asset: &str) -> Result<String, ExpiryError> {
        self.resolve_with(asset, None)
    }

    /// Like [`resolve`](Self::resolve), fingerprinting `production` instead
    /// of `asset` when the configuration prefers production paths.
    pub fn resolve_with(
        &self,
        asset: &str,
        production: Option<&str>,
    ) -> Result<String, ExpiryError> {
        let asset = match production {
            Some(production) if self.config.prefer_production_path => production,
            _ => asset,
        };
        if !self.is_enabled() {
            return Ok(asset.to_owned());
        }
        self.store.fingerprint_and_cache(asset)
    }

    /// Returns an infallible resolver for template engines.
    ///
    /// Errors are logged and the unfingerprinted asset is returned, so a
    /// broken file never breaks page rendering.
    pub fn furl(&self) -> impl Fn(&str) -> String + Clone + Send + Sync + 'static {
        let expiry = self.clone();
        move |asset: &str| match expiry.resolve(asset) {
            Ok(url) => url,
            Err(error) => {
                warn!(asset, %error, "failed to fingerprint asset");
                asset.to_owned()
            }
        }
    }

    /// Fingerprints every file under the configured roots, applying the
    /// startup filter if one is configured. Roots that do not exist are
    /// skipped.
    pub fn warm(&self) -> Result<WarmReport, ExpiryError> {
        let filter: Option<&FileFilter> = match &self.config.loading {
            CacheLoading::StartupFiltered(filter) => Some(filter),
            _ => None,
        };

        let mut report = WarmReport::default();
        for root in self.store.roots() {
            if !root.is_dir() {
                warn!(root = %root.display(), "asset root is not a directory, skipping warm");
                continue;
            }
            report += self.store.warm(root, walk(root), filter)?;
        }
        debug!(
            scanned = report.scanned,
            cached = report.cached,
            skipped = report.skipped,
            "asset cache warmed"
        );
        Ok(report)
    }

    /// Empties the cache store.
    pub fn clear_cache(&self) {
        self.store.clear();
    }

    /// Copies the cache contents.
    pub fn snapshot(&self) -> CacheSnapshot {
        self.store.snapshot()
    }
}
