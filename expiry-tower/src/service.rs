use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::SystemTime;

use expiry::Expiry;
use expiry_http::{
    ExpiryBody, HeaderPolicy, OriginalUri, is_fresh, not_modified, rewrite_uri, snapshot_response,
};
use http::{Method, Request, Response};
use http_body::Body as HttpBody;
use tower::Service;
use tracing::{debug, trace, warn};

use crate::future::ExpiryFuture;

/// Service produced by [`ExpiryLayer`](crate::ExpiryLayer).
pub struct ExpiryService<S> {
    inner: S,
    expiry: Expiry,
    policy: Arc<HeaderPolicy>,
}

impl<S> ExpiryService<S> {
    /// Wraps `inner`.
    pub fn new(inner: S, expiry: Expiry, policy: Arc<HeaderPolicy>) -> Self {
        ExpiryService {
            inner,
            expiry,
            policy,
        }
    }

    /// The wrapped service.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    fn is_debug_request<B>(&self, req: &Request<B>) -> bool {
        let config = self.expiry.config();
        config.debug
            && req.uri().path() == config.debug_path
            && (req.method() == Method::GET || req.method() == Method::HEAD)
    }
}

impl<S> Clone for ExpiryService<S>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            expiry: self.expiry.clone(),
            policy: Arc::clone(&self.policy),
        }
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for ExpiryService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    ResBody: HttpBody,
{
    type Response = Response<ExpiryBody<ResBody>>;
    type Error = S::Error;
    type Future = ExpiryFuture<S::Future, ResBody, S::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        if self.is_debug_request(&req) {
            debug!(path = req.uri().path(), "serving cache snapshot");
            let head = req.method() == Method::HEAD;
            return ExpiryFuture::respond(snapshot_response(&self.expiry.snapshot(), head));
        }

        let store = self.expiry.store();
        let info = req
            .uri()
            .path_and_query()
            .and_then(|path_and_query| store.header_info(path_and_query.as_str()));
        let Some(info) = info else {
            trace!(uri = %req.uri(), "not a fingerprinted asset");
            return ExpiryFuture::upstream(self.inner.call(req), None);
        };

        let headers = self.policy.headers(&info, req.headers(), SystemTime::now());
        if is_fresh(req.method(), req.headers(), &headers) {
            debug!(uri = %req.uri(), etag = %info.etag, "asset not modified");
            return ExpiryFuture::respond(not_modified(headers));
        }

        match rewrite_uri(req.uri(), &info.asset_path) {
            Ok(uri) => {
                debug!(uri = %req.uri(), asset = %uri, "serving fingerprinted asset");
                let original = std::mem::replace(req.uri_mut(), uri);
                req.extensions_mut().insert(OriginalUri(original));
            }
            Err(error) => {
                warn!(
                    uri = %req.uri(),
                    asset = %info.asset_path,
                    %error,
                    "cannot rewrite request"
                );
            }
        }
        ExpiryFuture::upstream(self.inner.call(req), Some(headers))
    }
}
