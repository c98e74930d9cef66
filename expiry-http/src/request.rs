use http::uri::{PathAndQuery, Uri};

/// URI of a request before it was rewritten to the unfingerprinted asset.
///
/// Inserted into the request extensions, so handlers behind the middleware
/// can still see what the client asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalUri(pub Uri);

/// Replaces the path and query of `uri`, keeping scheme and authority.
pub fn rewrite_uri(uri: &Uri, path_and_query: &str) -> Result<Uri, http::Error> {
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query)?);
    Ok(Uri::from_parts(parts)?)
}
