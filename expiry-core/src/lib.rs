#![warn(missing_docs)]
//! # expiry-core
//!
//! Leaf building blocks of the Expiry static asset fingerprinting engine.
//!
//! This crate knows nothing about caches or HTTP servers. It provides the
//! three pure pieces the cache store is assembled from:
//!
//! - **Compute** a stable identifier for a file ([`Fingerprint`])
//! - **Place** that identifier inside an asset URL ([`Location`])
//! - **Shard** fingerprinted URLs across CDN hosts ([`HostSelector`])
//!
//! [`AssetUrl`] is the small URL model shared by all three: it keeps an
//! explicit origin, the path, the query and the fragment apart so each
//! placement can rewrite one part without disturbing the others.
//!
//! ## Example
//!
//! ```
//! use expiry_core::{AssetUrl, HostSelector, Location};
//!
//! let url = AssetUrl::parse("/css/main.css?theme=dark");
//! let fingerprinted = Location::Postfile.apply(&url, "abc123");
//! assert_eq!(fingerprinted.to_string(), "/css/main-abc123.css?theme=dark");
//!
//! let hosts = HostSelector::single("cdn.example.com").unwrap();
//! let served = hosts.apply(fingerprinted, url.path());
//! assert_eq!(served.to_string(), "//cdn.example.com/css/main-abc123.css?theme=dark");
//! ```

pub mod fingerprint;
pub mod host;
pub mod location;
pub mod url;

pub use fingerprint::{
    Fingerprint, FingerprintError, ManifestError, ManifestFingerprint, Md5Fingerprint,
    Sha256Fingerprint,
};
pub use host::{HostError, HostSelector, normalize_host};
pub use location::Location;
pub use url::AssetUrl;
