use serde::{Deserialize, Serialize};

/// Headers that let clients reuse a response without asking the server.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Unconditional {
    /// Neither `max-age` nor `Expires`.
    None,
    /// `Cache-Control: max-age=<duration>`.
    MaxAge,
    /// `Expires: <now + duration>`.
    Expires,
    /// Both `max-age` and `Expires`.
    #[default]
    Both,
}

impl Unconditional {
    /// Whether `max-age` goes into `Cache-Control`.
    pub fn max_age(self) -> bool {
        matches!(self, Unconditional::MaxAge | Unconditional::Both)
    }

    /// Whether an `Expires` header is emitted.
    pub fn expires(self) -> bool {
        matches!(self, Unconditional::Expires | Unconditional::Both)
    }
}

/// Validators that let clients revalidate with a conditional request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Conditional {
    /// Neither `ETag` nor `Last-Modified`.
    None,
    /// `ETag: "<fingerprint>"`.
    Etag,
    /// `Last-Modified: <file mtime>`.
    LastModified,
    /// Both `ETag` and `Last-Modified`.
    #[default]
    Both,
}

impl Conditional {
    /// Whether an `ETag` header is emitted.
    pub fn etag(self) -> bool {
        matches!(self, Conditional::Etag | Conditional::Both)
    }

    /// Whether a `Last-Modified` header is emitted.
    pub fn last_modified(self) -> bool {
        matches!(self, Conditional::LastModified | Conditional::Both)
    }
}

/// Base value of the `Cache-Control` header, before `max-age` is appended.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub enum CacheControl {
    /// No base directive.
    Disabled,
    /// A fixed directive such as `public, immutable`.
    Literal(String),
    /// `private` for requests carrying a `Cookie` or `Authorization` header,
    /// `public` otherwise.
    #[default]
    CookieSensitive,
}

/// `Cache-Control` token for responses that may live in shared caches.
pub const PUBLIC: &str = "public";
/// `Cache-Control` token for responses that may only live in the browser cache.
pub const PRIVATE: &str = "private";

impl CacheControl {
    /// Resolves the base directive for a request.
    ///
    /// `has_credentials` tells whether the request carries a cookie or an
    /// authorization header.
    pub fn base(&self, has_credentials: bool) -> Option<&str> {
        match self {
            CacheControl::Disabled => None,
            CacheControl::Literal(value) if value.is_empty() => None,
            CacheControl::Literal(value) => Some(value),
            CacheControl::CookieSensitive if has_credentials => Some(PRIVATE),
            CacheControl::CookieSensitive => Some(PUBLIC),
        }
    }
}

/// When the cache store gets filled.
#[derive(Clone, Default)]
pub enum CacheLoading {
    /// Walk every root at construction time.
    #[default]
    Startup,
    /// Fill on the first `resolve` of each asset.
    Lazy,
    /// Walk every root at construction time, skipping files the filter
    /// rejects. Skipped files are still filled lazily on first use.
    StartupFiltered(crate::warm::FileFilter),
}

impl std::fmt::Debug for CacheLoading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheLoading::Startup => f.write_str("Startup"),
            CacheLoading::Lazy => f.write_str("Lazy"),
            CacheLoading::StartupFiltered(_) => f.write_str("StartupFiltered(..)"),
        }
    }
}
