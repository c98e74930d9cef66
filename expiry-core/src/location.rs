//! Fingerprint placement strategies.

use serde::{Deserialize, Serialize};

use crate::url::AssetUrl;

/// Query parameter used by [`Location::Query`].
pub const VERSION_PARAM: &str = "v";

/// Where the fingerprint is embedded in an asset URL.
///
/// | Location | `/css/main.css` with fingerprint `H` |
/// |----------|--------------------------------------|
/// | [`Prefile`](Location::Prefile) | `/css/H-main.css` |
/// | [`Postfile`](Location::Postfile) | `/css/main-H.css` |
/// | [`Query`](Location::Query) | `/css/main.css?v=H` |
/// | [`Path`](Location::Path) | `/H/css/main.css` |
///
/// Every placement keeps the origin, the fragment and all query parameters
/// of the input. `Query` only touches the `v` parameter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// Prefix the file name with `<fingerprint>-`.
    #[default]
    Prefile,
    /// Insert `-<fingerprint>` before the file extension.
    Postfile,
    /// Set the `v` query parameter to the fingerprint.
    Query,
    /// Prepend a `/<fingerprint>` path segment.
    Path,
}

impl Location {
    /// Returns a new URL with `fingerprint` placed according to `self`.
    pub fn apply(self, url: &AssetUrl, fingerprint: &str) -> AssetUrl {
        match self {
            Location::Prefile => {
                let (dir, file) = split_file(url.path());
                url.with_path(format!("{dir}{fingerprint}-{file}"))
            }
            Location::Postfile => {
                let (dir, file) = split_file(url.path());
                let (stem, extension) = split_extension(file);
                url.with_path(format!("{dir}{stem}-{fingerprint}{extension}"))
            }
            Location::Query => url.with_query_param(VERSION_PARAM, fingerprint),
            Location::Path => {
                let path = url.path();
                if path.starts_with('/') {
                    url.with_path(format!("/{fingerprint}{path}"))
                } else {
                    url.with_path(format!("/{fingerprint}/{path}"))
                }
            }
        }
    }

    /// Name used in configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            Location::Prefile => "prefile",
            Location::Postfile => "postfile",
            Location::Query => "query",
            Location::Path => "path",
        }
    }
}

/// Splits a path into the directory part (with its trailing `/`) and the
/// file name.
fn split_file(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(idx) => path.split_at(idx + 1),
        None => ("", path),
    }
}

/// Splits a file name into stem and extension (with its leading `.`).
/// A leading dot does not start an extension.
fn split_extension(file: &str) -> (&str, &str) {
    match file.rfind('.') {
        Some(idx) if idx > 0 => file.split_at(idx),
        _ => (file, ""),
    }
}
