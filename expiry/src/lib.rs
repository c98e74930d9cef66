#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]
//! Content-fingerprinted static asset URLs.
//!
//! Expiry rewrites asset references such as `/css/main.css` into URLs that
//! carry a fingerprint of the file content (`/css/5d41...-main.css`). Those
//! URLs can be cached forever by browsers and CDNs: a new deployment with a
//! changed file produces a new URL.
//!
//! The HTTP half lives in `expiry-http` (header policy) and `expiry-tower`
//! (middleware). This crate holds the engine both halves share:
//!
//! - [`ExpiryConfig`] resolves options once and validates them.
//! - [`CacheStore`](store::CacheStore) keeps the forward and reverse tables
//!   and runs the population algorithm.
//! - [`Expiry`] is the handle applications keep around; it warms the store
//!   at startup and resolves asset URLs for templates.

/// Configuration and its builder.
pub mod config;

/// Error types.
///
/// [`ConfigError`] is returned when a configuration is built; [`ExpiryError`]
/// when fingerprinting or warming fails unexpectedly.
pub mod error;

/// Header policy axes and cache loading modes.
pub mod policy;

/// The application facing handle.
mod resolver;

/// Forward and reverse tables plus the population algorithm.
pub mod store;

/// Directory walking for the startup warm.
pub mod warm;

pub use config::{ExpiryConfig, ExpiryConfigBuilder};
pub use error::{ConfigError, ExpiryError};
pub use policy::{CacheControl, CacheLoading, Conditional, Unconditional};
pub use resolver::Expiry;
pub use store::{CacheSnapshot, CacheStore, HeaderInfo};
pub use warm::{FileFilter, WarmReport, file_filter};

pub use expiry_core::{
    AssetUrl, Fingerprint, FingerprintError, HostSelector, Location, ManifestFingerprint,
    Md5Fingerprint, Sha256Fingerprint,
};
