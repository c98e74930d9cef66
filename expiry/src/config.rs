//! Expiry configuration and its builder.
//!
//! All options are resolved once, when [`ExpiryConfigBuilder::build`] runs.
//! Invalid combinations (no roots, malformed hosts, unsendable header values)
//! fail there instead of at request time.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use expiry_core::{Fingerprint, HostSelector, Location, Md5Fingerprint};

use crate::error::ConfigError;
use crate::policy::{CacheControl, CacheLoading, Conditional, Unconditional};

/// One year (365.24 days), the default lifetime of fingerprinted assets.
pub const DEFAULT_DURATION: Duration = Duration::from_secs(31_556_900);

/// Seconds from the epoch to 9999-12-31T23:59:59Z, the last instant an HTTP
/// date can express.
const LATEST_HTTP_DATE_SECS: u64 = 253_402_300_799;

/// Last instant an HTTP date header can carry.
pub fn latest_http_date() -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(LATEST_HTTP_DATE_SECS)
}

/// Clamps `time` into the range HTTP dates can express.
pub fn clamp_http_date(time: SystemTime) -> SystemTime {
    time.clamp(UNIX_EPOCH, latest_http_date())
}

/// Default route of the debug endpoint.
pub const DEFAULT_DEBUG_PATH: &str = "/expiry";

/// Default root directory for assets.
pub const DEFAULT_ROOT: &str = "public";

/// Resolved Expiry configuration.
///
/// Build one with [`ExpiryConfig::builder`]. [`Default`] yields the
/// production profile; [`ExpiryConfig::development`] yields a builder with
/// caching turned off.
#[derive(Clone)]
pub struct ExpiryConfig {
    /// `max-age` / `Expires` policy.
    pub unconditional: Unconditional,
    /// `ETag` / `Last-Modified` policy.
    pub conditional: Conditional,
    /// Lifetime used for `max-age` and `Expires`.
    pub duration: Duration,
    /// Base `Cache-Control` value.
    pub cache_control: CacheControl,
    /// Directories assets are looked up in, in order.
    pub roots: Vec<PathBuf>,
    /// Function that fingerprints asset files.
    pub fingerprint: Arc<dyn Fingerprint>,
    /// Where fingerprints go in the URL.
    pub location: Location,
    /// CDN hosts put in front of fingerprinted URLs.
    pub hosts: HostSelector,
    /// When the cache store is filled.
    pub loading: CacheLoading,
    /// Fingerprint the production variant of an asset when one is given.
    pub prefer_production_path: bool,
    /// Serve the cache contents as JSON on [`debug_path`](Self::debug_path).
    pub debug: bool,
    /// Route of the debug endpoint.
    pub debug_path: String,
}

impl std::fmt::Debug for ExpiryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiryConfig")
            .field("unconditional", &self.unconditional)
            .field("conditional", &self.conditional)
            .field("duration", &self.duration)
            .field("cache_control", &self.cache_control)
            .field("roots", &self.roots)
            .field("fingerprint", &"...")
            .field("location", &self.location)
            .field("hosts", &self.hosts)
            .field("loading", &self.loading)
            .field("prefer_production_path", &self.prefer_production_path)
            .field("debug", &self.debug)
            .field("debug_path", &self.debug_path)
            .finish()
    }
}

impl Default for ExpiryConfig {
    fn default() -> Self {
        Self {
            unconditional: Unconditional::default(),
            conditional: Conditional::default(),
            duration: DEFAULT_DURATION,
            cache_control: CacheControl::default(),
            roots: vec![PathBuf::from(DEFAULT_ROOT)],
            fingerprint: Arc::new(Md5Fingerprint),
            location: Location::default(),
            hosts: HostSelector::default(),
            loading: CacheLoading::default(),
            prefer_production_path: false,
            debug: false,
            debug_path: DEFAULT_DEBUG_PATH.to_owned(),
        }
    }
}

impl ExpiryConfig {
    /// Creates a builder starting from the production defaults.
    pub fn builder() -> ExpiryConfigBuilder {
        ExpiryConfigBuilder::new()
    }

    /// Creates a builder with both header policies off and lazy loading,
    /// which leaves asset URLs untouched.
    pub fn development() -> ExpiryConfigBuilder {
        ExpiryConfigBuilder::new()
            .unconditional(Unconditional::None)
            .conditional(Conditional::None)
            .loading(CacheLoading::Lazy)
    }

    /// Fingerprinting is on unless both header policies are `none`.
    pub fn is_enabled(&self) -> bool {
        self.unconditional != Unconditional::None || self.conditional != Conditional::None
    }
}

#[derive(Debug, Clone, Default)]
enum HostSpec {
    #[default]
    None,
    Single(String),
    Many(Vec<String>),
}

/// Builder for [`ExpiryConfig`].
pub struct ExpiryConfigBuilder {
    config: ExpiryConfig,
    roots: Option<Vec<PathBuf>>,
    hosts: HostSpec,
}

impl ExpiryConfigBuilder {
    /// Creates a builder with the production defaults.
    pub fn new() -> Self {
        Self {
            config: ExpiryConfig::default(),
            roots: None,
            hosts: HostSpec::None,
        }
    }

    /// Sets the `max-age` / `Expires` policy.
    pub fn unconditional(mut self, unconditional: Unconditional) -> Self {
        self.config.unconditional = unconditional;
        self
    }

    /// Sets the `ETag` / `Last-Modified` policy.
    pub fn conditional(mut self, conditional: Conditional) -> Self {
        self.config.conditional = conditional;
        self
    }

    /// Sets the asset lifetime.
    pub fn duration(mut self, duration: Duration) -> Self {
        self.config.duration = duration;
        self
    }

    /// Sets the base `Cache-Control` value.
    pub fn cache_control(mut self, cache_control: CacheControl) -> Self {
        self.config.cache_control = cache_control;
        self
    }

    /// Adds a root directory. The first call replaces the default root.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.get_or_insert_with(Vec::new).push(root.into());
        self
    }

    /// Replaces all root directories.
    pub fn roots<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.roots = Some(roots.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the fingerprint function.
    pub fn fingerprint<F>(mut self, fingerprint: F) -> Self
    where
        F: Fingerprint + 'static,
    {
        self.config.fingerprint = Arc::new(fingerprint);
        self
    }

    /// Sets an already shared fingerprint function.
    pub fn shared_fingerprint(mut self, fingerprint: Arc<dyn Fingerprint>) -> Self {
        self.config.fingerprint = fingerprint;
        self
    }

    /// Sets the fingerprint placement.
    pub fn location(mut self, location: Location) -> Self {
        self.config.location = location;
        self
    }

    /// Serves every fingerprinted URL from one host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.hosts = HostSpec::Single(host.into());
        self
    }

    /// Spreads fingerprinted URLs over several hosts.
    pub fn hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hosts = HostSpec::Many(hosts.into_iter().map(Into::into).collect());
        self
    }

    /// Sets when the cache is filled.
    pub fn loading(mut self, loading: CacheLoading) -> Self {
        self.config.loading = loading;
        self
    }

    /// Prefers the production variant of an asset when both are given.
    pub fn prefer_production_path(mut self, prefer: bool) -> Self {
        self.config.prefer_production_path = prefer;
        self
    }

    /// Enables the debug endpoint.
    pub fn debug(mut self, debug: bool) -> Self {
        self.config.debug = debug;
        self
    }

    /// Sets the route of the debug endpoint.
    pub fn debug_path(mut self, path: impl Into<String>) -> Self {
        self.config.debug_path = path.into();
        self
    }

    /// Validates the options and resolves defaults.
    pub fn build(self) -> Result<ExpiryConfig, ConfigError> {
        let mut config = self.config;

        if let Some(roots) = self.roots {
            config.roots = roots;
        }
        if config.roots.is_empty() {
            return Err(ConfigError::NoRoots);
        }

        if config.duration.is_zero() && config.unconditional != Unconditional::None {
            return Err(ConfigError::ZeroDuration);
        }
        if SystemTime::now()
            .checked_add(config.duration)
            .is_none_or(|expires| expires > latest_http_date())
        {
            return Err(ConfigError::DurationTooLarge(config.duration));
        }

        config.hosts = match self.hosts {
            HostSpec::None => HostSelector::None,
            HostSpec::Single(host) => HostSelector::single(&host)?,
            HostSpec::Many(hosts) => HostSelector::sharded(hosts)?,
        };

        if let CacheControl::Literal(value) = &config.cache_control
            && !is_header_safe(value)
        {
            return Err(ConfigError::CacheControl(value.clone()));
        }

        if !config.debug_path.starts_with('/') {
            return Err(ConfigError::DebugPath(config.debug_path));
        }

        Ok(config)
    }
}

impl Default for ExpiryConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Visible ASCII, space and tab: what `http::HeaderValue` accepts without
/// falling back to opaque bytes.
fn is_header_safe(value: &str) -> bool {
    value
        .bytes()
        .all(|byte| byte == b'\t' || (0x20..0x7f).contains(&byte))
}
