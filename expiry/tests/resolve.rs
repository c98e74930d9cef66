use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use expiry::{
    CacheLoading, Conditional, Expiry, ExpiryConfig, ExpiryError, FingerprintError, Location,
    Md5Fingerprint, Unconditional,
};
use expiry_core::Fingerprint;
use tempfile::TempDir;

const HELLO_MD5: &str = "5d41402abc4b2a76b9719d911017c592";

fn fixture() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("css")).unwrap();
    fs::create_dir_all(dir.path().join("js")).unwrap();
    fs::write(dir.path().join("css/main.css"), "hello").unwrap();
    fs::write(dir.path().join("js/app.js"), "console.log(1)").unwrap();
    fs::write(dir.path().join("js/app.min.js"), "hello").unwrap();
    dir
}

/// Md5 fingerprint that counts how often it touches the filesystem.
#[derive(Clone, Default)]
struct Counting {
    calls: Arc<AtomicUsize>,
}

impl Counting {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Fingerprint for Counting {
    fn fingerprint(&self, path: &Path) -> Result<String, FingerprintError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Md5Fingerprint.fingerprint(path)
    }
}

fn lazy(root: &Path) -> expiry::ExpiryConfigBuilder {
    ExpiryConfig::builder()
        .root(root)
        .loading(CacheLoading::Lazy)
}

#[test]
fn test_resolve_prefile_by_default() {
    let dir = fixture();
    let expiry = Expiry::new(lazy(dir.path()).build().unwrap()).unwrap();

    let url = expiry.resolve("/css/main.css").unwrap();
    assert_eq!(url, format!("/css/{HELLO_MD5}-main.css"));

    let info = expiry.store().header_info(&url).unwrap();
    assert_eq!(info.etag, HELLO_MD5);
    assert_eq!(info.asset_path, "/css/main.css");
}

#[test]
fn test_second_resolve_does_not_touch_filesystem() {
    let dir = fixture();
    let counting = Counting::default();
    let config = lazy(dir.path())
        .fingerprint(counting.clone())
        .build()
        .unwrap();
    let expiry = Expiry::new(config).unwrap();

    let first = expiry.resolve("/css/main.css").unwrap();
    let second = expiry.resolve("/css/main.css").unwrap();
    assert_eq!(first, second);
    assert_eq!(counting.calls(), 1);
}

#[test]
fn test_missing_asset_is_memoized_unchanged() {
    let dir = fixture();
    let counting = Counting::default();
    let config = lazy(dir.path())
        .fingerprint(counting.clone())
        .build()
        .unwrap();
    let expiry = Expiry::new(config).unwrap();

    assert_eq!(expiry.resolve("/nope.css").unwrap(), "/nope.css");
    assert_eq!(expiry.resolve("/nope.css").unwrap(), "/nope.css");
    assert_eq!(counting.calls(), 1);
    assert!(expiry.store().header_info("/nope.css").is_none());
}

#[test]
fn test_directory_is_not_an_asset() {
    let dir = fixture();
    let expiry = Expiry::new(lazy(dir.path()).build().unwrap()).unwrap();
    assert_eq!(expiry.resolve("/css").unwrap(), "/css");
}

#[test]
fn test_clear_cache_recomputes() {
    let dir = fixture();
    let counting = Counting::default();
    let config = lazy(dir.path())
        .fingerprint(counting.clone())
        .build()
        .unwrap();
    let expiry = Expiry::new(config).unwrap();

    let before = expiry.resolve("/css/main.css").unwrap();
    expiry.clear_cache();
    assert!(expiry.store().is_empty());
    assert!(expiry.store().header_info(&before).is_none());

    fs::write(dir.path().join("css/main.css"), "changed").unwrap();
    let after = expiry.resolve("/css/main.css").unwrap();
    assert_ne!(before, after);
    assert_eq!(counting.calls(), 2);
}

#[test]
fn test_placements() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("a")).unwrap();
    fs::write(dir.path().join("a/b.css"), "x").unwrap();
    let fixed = |_: &Path| -> Result<String, FingerprintError> { Ok("H".to_owned()) };

    let cases = [
        (Location::Prefile, "/a/H-b.css"),
        (Location::Postfile, "/a/b-H.css"),
        (Location::Query, "/a/b.css?v=H"),
        (Location::Path, "/H/a/b.css"),
    ];
    for (location, expected) in cases {
        let config = lazy(dir.path())
            .fingerprint(fixed)
            .location(location)
            .build()
            .unwrap();
        let expiry = Expiry::new(config).unwrap();
        let url = expiry.resolve("/a/b.css").unwrap();
        assert_eq!(url, expected, "{location:?}");
        assert_eq!(
            expiry.store().header_info(expected).unwrap().asset_path,
            "/a/b.css"
        );
    }
}

#[test]
fn test_query_survives_and_reverse_keeps_it() {
    let dir = fixture();
    let expiry = Expiry::new(lazy(dir.path()).build().unwrap()).unwrap();

    let url = expiry.resolve("/css/main.css?theme=dark").unwrap();
    assert_eq!(url, format!("/css/{HELLO_MD5}-main.css?theme=dark"));
    assert_eq!(
        expiry.store().header_info(&url).unwrap().asset_path,
        "/css/main.css?theme=dark"
    );
}

#[test]
fn test_single_host_prefixes_url_but_not_reverse_key() {
    let dir = fixture();
    let config = lazy(dir.path()).host("cdn.acme.com").build().unwrap();
    let expiry = Expiry::new(config).unwrap();

    let url = expiry.resolve("/css/main.css").unwrap();
    assert_eq!(url, format!("//cdn.acme.com/css/{HELLO_MD5}-main.css"));
    assert!(
        expiry
            .store()
            .header_info(&format!("/css/{HELLO_MD5}-main.css"))
            .is_some()
    );
}

#[test]
fn test_explicit_host_is_preserved() {
    let dir = fixture();
    let config = lazy(dir.path()).host("cdn.acme.com").build().unwrap();
    let expiry = Expiry::new(config).unwrap();

    let url = expiry.resolve("https://static.other.com/css/main.css").unwrap();
    assert_eq!(
        url,
        format!("https://static.other.com/css/{HELLO_MD5}-main.css")
    );
}

#[test]
fn test_sharded_hosts_are_stable() {
    let dir = fixture();
    let build = || {
        Expiry::new(
            lazy(dir.path())
                .hosts(["//a.com", "//b.com"])
                .build()
                .unwrap(),
        )
        .unwrap()
    };
    let first = build();
    let second = build();

    for asset in ["/css/main.css", "/js/app.js"] {
        let url = first.resolve(asset).unwrap();
        assert!(url.starts_with("//a.com/") || url.starts_with("//b.com/"));
        assert_eq!(url, second.resolve(asset).unwrap());
        first.clear_cache();
        assert_eq!(url, first.resolve(asset).unwrap());
    }
}

#[test]
fn test_production_path_preferred() {
    let dir = fixture();
    let config = lazy(dir.path())
        .prefer_production_path(true)
        .build()
        .unwrap();
    let expiry = Expiry::new(config).unwrap();

    let url = expiry
        .resolve_with("/js/app.js", Some("/js/app.min.js"))
        .unwrap();
    assert_eq!(url, format!("/js/{HELLO_MD5}-app.min.js"));
}

#[test]
fn test_production_path_ignored_unless_preferred() {
    let dir = fixture();
    let expiry = Expiry::new(lazy(dir.path()).build().unwrap()).unwrap();

    let url = expiry
        .resolve_with("/css/main.css", Some("/js/app.min.js"))
        .unwrap();
    assert_eq!(url, format!("/css/{HELLO_MD5}-main.css"));
}

#[test]
fn test_disabled_returns_input() {
    let dir = fixture();
    let counting = Counting::default();
    let config = ExpiryConfig::development()
        .root(dir.path())
        .fingerprint(counting.clone())
        .build()
        .unwrap();
    let expiry = Expiry::new(config).unwrap();

    assert!(!expiry.is_enabled());
    assert_eq!(expiry.resolve("/css/main.css").unwrap(), "/css/main.css");
    assert_eq!(counting.calls(), 0);
    assert!(expiry.store().is_empty());
}

#[test]
fn test_one_policy_axis_keeps_fingerprinting_on() {
    let dir = fixture();
    let config = lazy(dir.path())
        .unconditional(Unconditional::None)
        .conditional(Conditional::Etag)
        .build()
        .unwrap();
    let expiry = Expiry::new(config).unwrap();
    assert_ne!(expiry.resolve("/css/main.css").unwrap(), "/css/main.css");
}

#[test]
fn test_roots_are_searched_in_order() {
    let first = tempfile::tempdir().unwrap();
    let second = fixture();
    fs::write(first.path().join("only-first.css"), "hello").unwrap();

    let config = ExpiryConfig::builder()
        .roots([first.path(), second.path()])
        .loading(CacheLoading::Lazy)
        .build()
        .unwrap();
    let expiry = Expiry::new(config).unwrap();

    assert_eq!(
        expiry.resolve("/only-first.css").unwrap(),
        format!("/{HELLO_MD5}-only-first.css")
    );
    assert_eq!(
        expiry.resolve("/css/main.css").unwrap(),
        format!("/css/{HELLO_MD5}-main.css")
    );
}

#[test]
fn test_traversal_never_resolves() {
    let dir = fixture();
    let expiry = Expiry::new(lazy(&dir.path().join("css")).build().unwrap()).unwrap();
    assert_eq!(expiry.resolve("/../js/app.js").unwrap(), "/../js/app.js");
}

#[test]
fn test_io_errors_are_not_memoized() {
    let dir = fixture();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let failing = move |_: &Path| -> Result<String, FingerprintError> {
        counter.fetch_add(1, Ordering::SeqCst);
        Err(FingerprintError::Io(std::io::Error::other("disk on fire")))
    };
    let config = lazy(dir.path()).fingerprint(failing).build().unwrap();
    let expiry = Expiry::new(config).unwrap();

    let error = expiry.resolve("/css/main.css").unwrap_err();
    assert!(matches!(error, ExpiryError::Fingerprint { .. }));
    assert!(expiry.resolve("/css/main.css").is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(expiry.store().is_empty());

    let furl = expiry.furl();
    assert_eq!(furl("/css/main.css"), "/css/main.css");
}

#[test]
fn test_concurrent_resolves_agree() {
    let dir = fixture();
    let expiry = Expiry::new(lazy(dir.path()).build().unwrap()).unwrap();

    let urls: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| expiry.resolve("/css/main.css").unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(urls.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(expiry.store().len(), 1);
    assert!(expiry.store().header_info(&urls[0]).is_some());
}

#[test]
fn test_snapshot_serializes_both_tables() {
    let dir = fixture();
    let expiry = Expiry::new(lazy(dir.path()).build().unwrap()).unwrap();
    let url = expiry.resolve("/css/main.css").unwrap();

    let json = serde_json::to_value(expiry.snapshot()).unwrap();
    assert_eq!(json["forward"]["/css/main.css"], url.as_str());
    assert_eq!(json["reverse"][url.as_str()]["etag"], HELLO_MD5);
    assert!(
        json["reverse"][url.as_str()]["last_modified"]
            .as_str()
            .unwrap()
            .ends_with("GMT")
    );
    assert!(json["captured_at"].is_string());
}
