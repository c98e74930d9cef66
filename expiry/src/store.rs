//! The two lookup tables and the algorithm that fills them.
//!
//! The forward table maps an asset reference as written by application code
//! (`/css/main.css`) to its fingerprinted URL (`/css/3f2a-main.css`). The
//! reverse table maps the request path of that URL back to the data the
//! middleware needs: the fingerprint used as `ETag`, the file modification
//! time and the original path the file server knows about.
//!
//! Both tables are only ever written by [`CacheStore::fingerprint_and_cache`]
//! and emptied by [`CacheStore::clear`]. Publication goes reverse first, then
//! forward, under the read side of a lock whose write side is taken by
//! `clear`. A reader that finds a forward entry can therefore always find the
//! matching reverse entry, unless the whole store was cleared in between.

use std::collections::BTreeMap;
use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use expiry_core::{AssetUrl, Fingerprint, FingerprintError, HostSelector, Location};
use httpdate::HttpDate;
use serde::{Serialize, Serializer};
use tracing::{debug, trace, warn};

use crate::config::{ExpiryConfig, clamp_http_date};
use crate::error::ExpiryError;
use crate::warm::{FileFilter, WarmReport};

/// What the middleware needs to answer a request for a fingerprinted URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderInfo {
    /// Fingerprint of the file, sent (quoted) as `ETag`.
    pub etag: String,
    /// Modification time of the file, sent as `Last-Modified`.
    #[serde(serialize_with = "serialize_http_date")]
    pub last_modified: HttpDate,
    /// Path and query of the unfingerprinted asset. Requests are rewritten to
    /// it before reaching the file server.
    pub asset_path: String,
}

fn serialize_http_date<S>(date: &HttpDate, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(date)
}

/// Point-in-time copy of both tables, for the debug endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CacheSnapshot {
    /// When the copy was taken.
    pub captured_at: DateTime<Utc>,
    /// Asset reference to fingerprinted URL.
    pub forward: BTreeMap<String, String>,
    /// Fingerprinted request path to header data.
    pub reverse: BTreeMap<String, HeaderInfo>,
}

/// Process-wide asset cache.
///
/// Owns the forward and reverse tables together with everything the
/// population algorithm needs: the root directories, the fingerprint
/// function, the placement and the host selector.
pub struct CacheStore {
    roots: Vec<PathBuf>,
    fingerprint: Arc<dyn Fingerprint>,
    location: Location,
    hosts: HostSelector,
    forward: DashMap<String, String>,
    reverse: DashMap<String, HeaderInfo>,
    publication: RwLock<()>,
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("roots", &self.roots)
            .field("location", &self.location)
            .field("hosts", &self.hosts)
            .field("forward", &self.forward.len())
            .field("reverse", &self.reverse.len())
            .finish()
    }
}

impl CacheStore {
    /// Creates an empty store using the lookup options of `config`.
    pub fn new(config: &ExpiryConfig) -> Self {
        Self {
            roots: config.roots.clone(),
            fingerprint: Arc::clone(&config.fingerprint),
            location: config.location,
            hosts: config.hosts.clone(),
            forward: DashMap::new(),
            reverse: DashMap::new(),
            publication: RwLock::new(()),
        }
    }

    /// Root directories assets are looked up in.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Cached fingerprinted URL for an asset reference.
    pub fn forward(&self, asset: &str) -> Option<String> {
        self.forward.get(asset).map(|entry| entry.value().clone())
    }

    /// Header data for a request path (`path?query`).
    pub fn header_info(&self, path_and_query: &str) -> Option<HeaderInfo> {
        self.reverse
            .get(path_and_query)
            .map(|entry| entry.value().clone())
    }

    /// Whether an asset reference has a forward entry.
    pub fn contains(&self, asset: &str) -> bool {
        self.forward.contains_key(asset)
    }

    /// Number of forward entries, misses included.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Returns `true` if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Returns the fingerprinted URL for `asset`, computing and caching it on
    /// first use.
    ///
    /// The asset path is looked up under every root in order. When no root
    /// contains the file, `asset` itself is cached and returned, and no
    /// reverse entry is created. Errors other than a missing file are
    /// returned without caching anything.
    pub fn fingerprint_and_cache(&self, asset: &str) -> Result<String, ExpiryError> {
        if let Some(cached) = self.forward(asset) {
            trace!(asset, "forward cache hit");
            return Ok(cached);
        }

        let url = AssetUrl::parse(asset);
        let Some((file, fingerprint)) = self.locate(url.path())? else {
            debug!(asset, "asset not found under any root");
            return Ok(self.publish(asset, asset.to_owned(), None));
        };

        let modified = fs::metadata(&file)
            .and_then(|metadata| metadata.modified())
            .map_err(|source| ExpiryError::Metadata {
                path: file.clone(),
                source,
            })?;

        let placed = self.location.apply(&url, &fingerprint);
        let fingerprinted = self.hosts.apply(placed, url.path());
        let info = HeaderInfo {
            etag: fingerprint,
            last_modified: HttpDate::from(clamp_http_date(modified)),
            asset_path: url.path_and_query(),
        };

        debug!(
            asset,
            fingerprinted = %fingerprinted,
            file = %file.display(),
            "asset fingerprinted"
        );
        Ok(self.publish(
            asset,
            fingerprinted.to_string(),
            Some((fingerprinted.path_and_query(), info)),
        ))
    }

    /// Finds the first root holding the file and fingerprints it.
    fn locate(&self, path: &str) -> Result<Option<(PathBuf, String)>, ExpiryError> {
        let Some(relative) = relative_file_path(path) else {
            return Ok(None);
        };

        for root in &self.roots {
            let candidate = root.join(&relative);
            match self.fingerprint.fingerprint(&candidate) {
                Ok(fingerprint) => return Ok(Some((candidate, fingerprint))),
                Err(FingerprintError::NotFound) => {
                    trace!(candidate = %candidate.display(), "not under this root");
                }
                Err(FingerprintError::Io(source)) => {
                    return Err(ExpiryError::Fingerprint {
                        path: candidate,
                        source,
                    });
                }
            }
        }
        Ok(None)
    }

    /// Publishes a forward entry together with its reverse entry.
    ///
    /// When another caller already published `asset`, its value wins and
    /// `reverse` is dropped.
    fn publish(
        &self,
        asset: &str,
        fingerprinted: String,
        reverse: Option<(String, HeaderInfo)>,
    ) -> String {
        let _publication = self
            .publication
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        match self.forward.entry(asset.to_owned()) {
            Entry::Occupied(existing) => existing.get().clone(),
            Entry::Vacant(vacant) => {
                if let Some((key, info)) = reverse {
                    self.reverse.insert(key, info);
                }
                vacant.insert(fingerprinted.clone());
                fingerprinted
            }
        }
    }

    /// Fingerprints every regular file yielded by `files` that is not cached
    /// yet.
    ///
    /// `files` yields paths below `root` with their metadata, usually from
    /// [`walk`](crate::warm::walk). Each file is cached under its
    /// root-relative asset path (`/css/main.css`). `filter` may skip files.
    pub fn warm<I, E>(
        &self,
        root: &Path,
        files: I,
        filter: Option<&FileFilter>,
    ) -> Result<WarmReport, ExpiryError>
    where
        I: IntoIterator<Item = Result<(PathBuf, Metadata), E>>,
        ExpiryError: From<E>,
    {
        let mut report = WarmReport::default();

        for file in files {
            let (path, metadata) = file?;
            report.scanned += 1;

            if !metadata.is_file() || filter.is_some_and(|filter| !filter(&path, &metadata)) {
                report.skipped += 1;
                continue;
            }
            let Some(asset) = asset_path(root, &path) else {
                warn!(path = %path.display(), root = %root.display(), "cannot map file to an asset path");
                report.skipped += 1;
                continue;
            };
            if self.contains(&asset) {
                report.skipped += 1;
                continue;
            }

            self.fingerprint_and_cache(&asset)?;
            report.cached += 1;
        }

        debug!(
            root = %root.display(),
            scanned = report.scanned,
            cached = report.cached,
            skipped = report.skipped,
            "warm finished"
        );
        Ok(report)
    }

    /// Removes every entry from both tables.
    pub fn clear(&self) {
        let _publication = self
            .publication
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        self.forward.clear();
        self.reverse.clear();
        debug!("asset cache cleared");
    }

    /// Copies both tables. Concurrent population keeps running; only
    /// [`clear`](Self::clear) waits for the copy to finish.
    pub fn snapshot(&self) -> CacheSnapshot {
        let _publication = self
            .publication
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        CacheSnapshot {
            captured_at: Utc::now(),
            forward: self
                .forward
                .iter()
                .map(|entry| (entry.key().clone(), entry.value().clone()))
                .collect(),
            reverse: self
                .reverse
                .iter()
                .map(|entry| (entry.key().clone(), entry.value().clone()))
                .collect(),
        }
    }
}

/// Maps a URL path onto a relative filesystem path.
///
/// The path is percent-decoded. `None` for paths that would leave the root
/// (`..`) or that name no file at all.
fn relative_file_path(path: &str) -> Option<PathBuf> {
    let decoded = urlencoding::decode(path).ok()?;
    let mut relative = PathBuf::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            segment if segment.contains('\\') || segment.contains('\0') => return None,
            segment => relative.push(segment),
        }
    }
    (!relative.as_os_str().is_empty()).then_some(relative)
}

/// Root-relative asset path of a file, `/`-separated with a leading `/`.
///
/// Segments are percent-encoded, so the path decodes back to the file through
/// [`relative_file_path`] and can appear in a request line.
fn asset_path(root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?;
    let mut asset = String::new();
    for component in relative.components() {
        asset.push('/');
        asset.push_str(&urlencoding::encode(component.as_os_str().to_str()?));
    }
    (!asset.is_empty()).then_some(asset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_file_path_strips_separators() {
        assert_eq!(
            relative_file_path("/css//main.css"),
            Some(PathBuf::from("css").join("main.css"))
        );
        assert_eq!(
            relative_file_path("/./main.css"),
            Some(PathBuf::from("main.css"))
        );
    }

    #[test]
    fn test_relative_file_path_decodes() {
        assert_eq!(
            relative_file_path("/my%20file.css"),
            Some(PathBuf::from("my file.css"))
        );
    }

    #[test]
    fn test_relative_file_path_rejects_traversal() {
        assert_eq!(relative_file_path("/../etc/passwd"), None);
        assert_eq!(relative_file_path("/css/%2E%2E/secret"), None);
        assert_eq!(relative_file_path("/"), None);
    }

    #[test]
    fn test_asset_path_of_nested_file() {
        let root = Path::new("/srv/public");
        assert_eq!(
            asset_path(root, &root.join("css").join("main.css")),
            Some("/css/main.css".to_owned())
        );
        assert_eq!(asset_path(root, Path::new("/elsewhere/main.css")), None);
    }

    #[test]
    fn test_asset_path_is_percent_encoded() {
        let root = Path::new("/srv/public");
        let spaced = asset_path(root, &root.join("my file.css")).unwrap();
        assert_eq!(spaced, "/my%20file.css");
        assert_eq!(relative_file_path(&spaced), Some(PathBuf::from("my file.css")));

        let percent = asset_path(root, &root.join("a%41.css")).unwrap();
        assert_eq!(percent, "/a%2541.css");
        assert_eq!(relative_file_path(&percent), Some(PathBuf::from("a%41.css")));
    }
}
