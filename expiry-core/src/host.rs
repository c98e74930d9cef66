//! CDN host selection for fingerprinted URLs.

use thiserror::Error;

use crate::url::AssetUrl;

/// Invalid host configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostError {
    /// A host list was configured but contains no hosts.
    #[error("host list is empty")]
    EmptyList,
    /// A host string is empty.
    #[error("host is empty")]
    Empty,
    /// A host string contains whitespace.
    #[error("host `{0}` contains whitespace")]
    Whitespace(String),
    /// A host string carries a query or a fragment.
    #[error("host `{0}` must not contain a query or a fragment")]
    QueryOrFragment(String),
}

/// Normalizes a configured host.
///
/// A bare host becomes protocol-relative (`cdn.acme.com` becomes
/// `//cdn.acme.com`); hosts that already contain `://` or start with `//`
/// keep their form. Trailing slashes are trimmed so that joining a host with
/// a root-relative path never yields `//` in the middle of the URL.
pub fn normalize_host(host: &str) -> Result<String, HostError> {
    if host.is_empty() {
        return Err(HostError::Empty);
    }
    if host.chars().any(char::is_whitespace) {
        return Err(HostError::Whitespace(host.to_owned()));
    }
    if host.contains(['?', '#']) {
        return Err(HostError::QueryOrFragment(host.to_owned()));
    }

    let normalized = if host.contains("://") || host.starts_with("//") {
        host.to_owned()
    } else {
        format!("//{host}")
    };
    let trimmed = normalized.trim_end_matches('/');
    if trimmed.is_empty() || trimmed.ends_with(':') {
        return Err(HostError::Empty);
    }
    Ok(trimmed.to_owned())
}

/// Chooses the host a fingerprinted URL is served from.
///
/// The selector is a pure function of the asset path, so every process and
/// every replica picks the same host for the same asset. That keeps a shared
/// CDN from caching one asset under several hostnames.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HostSelector {
    /// URLs are left without a host.
    #[default]
    None,
    /// Every URL is served from one host.
    Single(String),
    /// URLs are spread over several hosts by a checksum of the asset path.
    Sharded(Vec<String>),
}

impl HostSelector {
    /// Builds a selector for one host.
    pub fn single(host: &str) -> Result<Self, HostError> {
        normalize_host(host).map(HostSelector::Single)
    }

    /// Builds a selector for a list of hosts. A one-element list behaves
    /// exactly like [`HostSelector::single`].
    pub fn sharded<I, S>(hosts: I) -> Result<Self, HostError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut hosts = hosts
            .into_iter()
            .map(|host| normalize_host(host.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        match hosts.len() {
            0 => Err(HostError::EmptyList),
            1 => Ok(HostSelector::Single(hosts.remove(0))),
            _ => Ok(HostSelector::Sharded(hosts)),
        }
    }

    /// Returns the host for `asset_path`, or `None` when no host is configured.
    ///
    /// With several hosts the index is the sum of the UTF-16 code units of the
    /// path modulo the number of hosts.
    pub fn select(&self, asset_path: &str) -> Option<&str> {
        match self {
            HostSelector::None => None,
            HostSelector::Single(host) => Some(host),
            HostSelector::Sharded(hosts) => {
                let sum: u64 = asset_path.encode_utf16().map(u64::from).sum();
                let idx = (sum % hosts.len() as u64) as usize;
                hosts.get(idx).map(String::as_str)
            }
        }
    }

    /// Puts the selected host in front of `url`.
    ///
    /// URLs that already carry an explicit origin are returned untouched.
    pub fn apply(&self, url: AssetUrl, asset_path: &str) -> AssetUrl {
        if url.has_origin() {
            return url;
        }
        match self.select(asset_path) {
            Some(host) => url.with_origin(host),
            None => url,
        }
    }
}
