//! Conditional request evaluation.
//!
//! Decides whether a client's cached copy is still valid given the validators
//! the middleware is about to send. A fresh request is answered with
//! `304 Not Modified` instead of reaching the file server.

use http::header::{CACHE_CONTROL, ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use http::{HeaderMap, HeaderValue, Method};

/// Returns `true` when `request` can be answered with `304 Not Modified`.
///
/// `response` holds the validators (`ETag`, `Last-Modified`) that would be
/// sent with a full response. Only `GET` and `HEAD` are ever fresh.
pub fn is_fresh(method: &Method, request: &HeaderMap, response: &HeaderMap) -> bool {
    if method != Method::GET && method != Method::HEAD {
        return false;
    }

    let if_none_match = request.get(IF_NONE_MATCH);
    let if_modified_since = request.get(IF_MODIFIED_SINCE);
    if if_none_match.is_none() && if_modified_since.is_none() {
        return false;
    }

    if request
        .get_all(CACHE_CONTROL)
        .iter()
        .any(|value| has_token(value, "no-cache"))
    {
        return false;
    }

    if let Some(if_none_match) = if_none_match
        && !etag_matches(if_none_match, response.get(ETAG))
    {
        return false;
    }

    if let Some(if_modified_since) = if_modified_since
        && !not_modified_since(if_modified_since, response.get(LAST_MODIFIED))
    {
        return false;
    }

    true
}

fn has_token(value: &HeaderValue, token: &str) -> bool {
    value.to_str().is_ok_and(|value| {
        value
            .split(',')
            .any(|directive| directive.trim().eq_ignore_ascii_case(token))
    })
}

fn etag_matches(if_none_match: &HeaderValue, etag: Option<&HeaderValue>) -> bool {
    let Ok(if_none_match) = if_none_match.to_str() else {
        return false;
    };
    if if_none_match.trim() == "*" {
        return true;
    }
    let Some(etag) = etag.and_then(|etag| etag.to_str().ok()) else {
        return false;
    };
    let etag = strip_weak(etag.trim());
    if_none_match
        .split(',')
        .map(|tag| strip_weak(tag.trim()))
        .any(|tag| tag == etag)
}

fn strip_weak(tag: &str) -> &str {
    tag.strip_prefix("W/").unwrap_or(tag)
}

fn not_modified_since(
    if_modified_since: &HeaderValue,
    last_modified: Option<&HeaderValue>,
) -> bool {
    let parse = |value: &HeaderValue| {
        value
            .to_str()
            .ok()
            .and_then(|value| httpdate::parse_http_date(value).ok())
    };
    match (parse(if_modified_since), last_modified.and_then(parse)) {
        (Some(since), Some(modified)) => modified <= since,
        _ => false,
    }
}
