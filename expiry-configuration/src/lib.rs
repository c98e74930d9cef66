//! File based configuration for Expiry.
//!
//! [`ConfigExpiry`] mirrors [`ExpiryConfig`](expiry::ExpiryConfig) in a form
//! that deserializes from YAML or JSON. Every field is optional and falls back
//! to the production defaults.
//!
//! ```yaml
//! dir: [public, assets]
//! duration: 1year
//! cache_control: cookieless
//! location: postfile
//! host: [cdn1.acme.com, cdn2.acme.com]
//! fingerprint:
//!   type: Sha256
//!   length: 12
//! load_cache:
//!   at: startup
//!   exclude: [map, md]
//! ```

mod cache_control;
mod config;
mod error;
mod fingerprint;
mod load;

pub use cache_control::CacheControlConfig;
pub use config::{ConfigExpiry, Lifetime, OneOrMany};
pub use error::ConfigurationError;
pub use fingerprint::FingerprintConfig;
pub use load::{LoadCache, LoadFilter, LoadMode};
