//! Startup warm: walking root directories ahead of traffic.

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;

/// Decides whether a file found during warm gets fingerprinted.
pub type FileFilter = Arc<dyn Fn(&Path, &Metadata) -> bool + Send + Sync>;

/// Wraps a closure into a [`FileFilter`].
pub fn file_filter<F>(filter: F) -> FileFilter
where
    F: Fn(&Path, &Metadata) -> bool + Send + Sync + 'static,
{
    Arc::new(filter)
}

/// Outcome of warming one or more roots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarmReport {
    /// Entries yielded by the walker.
    pub scanned: usize,
    /// Files newly fingerprinted.
    pub cached: usize,
    /// Directories, filtered files and files already cached.
    pub skipped: usize,
}

impl std::ops::AddAssign for WarmReport {
    fn add_assign(&mut self, other: Self) {
        self.scanned += other.scanned;
        self.cached += other.cached;
        self.skipped += other.skipped;
    }
}

/// Lists every regular file below `root` with its metadata.
///
/// Symbolic links are not followed. The order is unspecified.
pub fn walk(root: &Path) -> impl Iterator<Item = Result<(PathBuf, Metadata), walkdir::Error>> {
    WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_file() => {
                Some(entry.metadata().map(|metadata| (entry.into_path(), metadata)))
            }
            Ok(_) => None,
            Err(error) => Some(Err(error)),
        })
}
