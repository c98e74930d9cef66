use std::sync::Arc;

use expiry::Expiry;
use expiry_http::HeaderPolicy;
use tower::Layer;

use crate::service::ExpiryService;

/// Wraps a static file service with fingerprint rewriting and cache headers.
#[derive(Clone, Debug)]
pub struct ExpiryLayer {
    expiry: Expiry,
    policy: Arc<HeaderPolicy>,
}

impl ExpiryLayer {
    /// Creates a layer sharing the cache store of `expiry`.
    pub fn new(expiry: &Expiry) -> Self {
        Self {
            expiry: expiry.clone(),
            policy: Arc::new(HeaderPolicy::new(expiry.config())),
        }
    }
}

impl<S> Layer<S> for ExpiryLayer {
    type Service = ExpiryService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ExpiryService::new(inner, self.expiry.clone(), Arc::clone(&self.policy))
    }
}
