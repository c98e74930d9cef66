//! Cache headers for fingerprinted assets.

use std::time::{Duration, SystemTime};

use expiry::config::{clamp_http_date, latest_http_date};
use expiry::{CacheControl, Conditional, ExpiryConfig, HeaderInfo, Unconditional};
use http::header::{
    AUTHORIZATION, CACHE_CONTROL, COOKIE, ETAG, EXPIRES, HeaderName, LAST_MODIFIED,
};
use http::{HeaderMap, HeaderValue};
use tracing::warn;

/// Computes the headers sent with every fingerprinted asset.
///
/// Built once from an [`ExpiryConfig`] and shared by all requests.
#[derive(Debug, Clone)]
pub struct HeaderPolicy {
    unconditional: Unconditional,
    conditional: Conditional,
    duration: Duration,
    cache_control: CacheControl,
}

impl HeaderPolicy {
    pub fn new(config: &ExpiryConfig) -> Self {
        Self {
            unconditional: config.unconditional,
            conditional: config.conditional,
            duration: config.duration,
            cache_control: config.cache_control.clone(),
        }
    }

    /// Headers for a request that matched `info`, as of `now`.
    ///
    /// `request` is only inspected for `Cookie` and `Authorization`, which
    /// turn a cookie-sensitive `Cache-Control` private.
    pub fn headers(&self, info: &HeaderInfo, request: &HeaderMap, now: SystemTime) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Some(cache_control) = self.cache_control_value(request) {
            insert(&mut headers, CACHE_CONTROL, cache_control);
        }
        if self.unconditional.expires() {
            let expires = now
                .checked_add(self.duration)
                .map_or_else(latest_http_date, clamp_http_date);
            insert(&mut headers, EXPIRES, httpdate::fmt_http_date(expires));
        }
        if self.conditional.etag() {
            insert(&mut headers, ETAG, format!("\"{}\"", info.etag));
        }
        if self.conditional.last_modified() {
            insert(&mut headers, LAST_MODIFIED, info.last_modified.to_string());
        }
        headers
    }

    fn cache_control_value(&self, request: &HeaderMap) -> Option<String> {
        let has_credentials = request.contains_key(COOKIE) || request.contains_key(AUTHORIZATION);
        let base = self.cache_control.base(has_credentials);
        let max_age = self
            .unconditional
            .max_age()
            .then(|| format!("max-age={}", self.duration.as_secs()));

        match (base, max_age) {
            (Some(base), Some(max_age)) => Some(format!("{base}, {max_age}")),
            (Some(base), None) => Some(base.to_owned()),
            (None, max_age) => max_age,
        }
    }
}

fn insert(headers: &mut HeaderMap, name: HeaderName, value: String) {
    match HeaderValue::try_from(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(error) => warn!(header = %name, %error, "skipping invalid header value"),
    }
}
