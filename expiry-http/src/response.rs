use bytes::Bytes;
use expiry::CacheSnapshot;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, Response, StatusCode};
use tracing::warn;

use crate::body::ExpiryBody;

/// `304 Not Modified` carrying the cache headers of the asset.
pub fn not_modified<B>(headers: HeaderMap) -> Response<ExpiryBody<B>> {
    let mut response = Response::new(ExpiryBody::empty());
    *response.status_mut() = StatusCode::NOT_MODIFIED;
    *response.headers_mut() = headers;
    response
}

/// JSON rendering of the cache contents. `HEAD` requests get the headers
/// only.
pub fn snapshot_response<B>(snapshot: &CacheSnapshot, head: bool) -> Response<ExpiryBody<B>> {
    let json = match serde_json::to_vec_pretty(snapshot) {
        Ok(json) => json,
        Err(error) => {
            warn!(%error, "failed to serialize cache snapshot");
            let mut response = Response::new(ExpiryBody::empty());
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            return response;
        }
    };

    let body = if head {
        ExpiryBody::empty()
    } else {
        ExpiryBody::complete(Bytes::from(json))
    };
    let mut response = Response::new(body);
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
