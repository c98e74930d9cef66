//! Tower middleware serving fingerprinted asset URLs.
//!
//! [`ExpiryLayer`] sits in front of a static file service. Requests for a URL
//! produced by [`Expiry::resolve`](expiry::Expiry::resolve) are rewritten to
//! the unfingerprinted path before they reach the file service, and the
//! response gets far-future cache headers. Conditional requests whose
//! validators still match are answered with `304 Not Modified` directly.
//! Every other request passes through untouched.
//!
//! ```ignore
//! use expiry::{Expiry, ExpiryConfig};
//! use expiry_tower::ExpiryLayer;
//! use tower::ServiceBuilder;
//! use tower_http::services::ServeDir;
//!
//! let expiry = Expiry::new(ExpiryConfig::builder().root("public").build()?)?;
//! let service = ServiceBuilder::new()
//!     .layer(ExpiryLayer::new(&expiry))
//!     .service(ServeDir::new("public"));
//! ```
//!
//! Handlers behind the layer can read the URI the client requested from the
//! [`OriginalUri`] request extension.
//!
//! When debugging is enabled in the configuration, `GET` on the debug path
//! (`/expiry` by default) returns the cache contents as JSON.

#![warn(missing_docs)]

/// Response future of [`ExpiryService`].
pub mod future;
/// Tower layer.
pub mod layer;
/// Tower service.
pub mod service;

pub use expiry_http::{ExpiryBody, OriginalUri};
pub use future::ExpiryFuture;
pub use layer::ExpiryLayer;
pub use service::ExpiryService;
