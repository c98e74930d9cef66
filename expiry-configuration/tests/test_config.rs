use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use expiry::{CacheControl, CacheLoading, Conditional, HostSelector, Location, Unconditional};
use expiry_configuration::{
    CacheControlConfig, ConfigExpiry, ConfigurationError, FingerprintConfig, Lifetime, LoadCache,
    LoadFilter, LoadMode, OneOrMany,
};
use pretty_assertions::assert_eq;

#[test]
fn test_empty_yaml_is_production_default() {
    let config: ConfigExpiry = serde_saphyr::from_str("{}").expect("failed to deserialize");
    assert_eq!(config, ConfigExpiry::default());

    let resolved = config.into_config().unwrap();
    assert_eq!(resolved.unconditional, Unconditional::Both);
    assert_eq!(resolved.conditional, Conditional::Both);
    assert_eq!(resolved.duration, Duration::from_secs(31_556_900));
    assert_eq!(resolved.cache_control, CacheControl::CookieSensitive);
    assert_eq!(resolved.roots, vec![PathBuf::from("public")]);
    assert_eq!(resolved.debug_path, "/expiry");
}

#[test]
fn test_full_yaml() {
    let yaml = r#"
unconditional: max-age
conditional: last-modified
duration: 30days
cache_control: "public, immutable"
dir: [public, assets]
fingerprint:
  type: Sha256
  length: 12
location: postfile
host: [cdn1.acme.com, "//cdn2.acme.com"]
load_cache:
  at: startup
  exclude: [map]
prefer_production_path: true
debug: true
debug_path: /_assets
"#;

    let config = ConfigExpiry::from_yaml(yaml).expect("failed to deserialize");
    assert_eq!(config.unconditional, Unconditional::MaxAge);
    assert_eq!(config.conditional, Conditional::LastModified);
    assert_eq!(
        config.duration,
        Lifetime::Human(Duration::from_secs(30 * 86_400))
    );
    assert_eq!(
        config.cache_control,
        CacheControlConfig::Value("public, immutable".into())
    );
    assert_eq!(
        config.dir,
        OneOrMany::Many(vec![PathBuf::from("public"), PathBuf::from("assets")])
    );
    assert_eq!(
        config.fingerprint,
        FingerprintConfig::Sha256 { length: Some(12) }
    );
    assert_eq!(
        config.load_cache,
        LoadCache::Filtered(LoadFilter {
            at: LoadMode::Startup,
            include: vec![],
            exclude: vec!["map".into()],
        })
    );

    let resolved = config.into_config().unwrap();
    assert_eq!(resolved.location, Location::Postfile);
    assert_eq!(
        resolved.hosts,
        HostSelector::Sharded(vec!["//cdn1.acme.com".into(), "//cdn2.acme.com".into()])
    );
    assert_eq!(
        resolved.cache_control,
        CacheControl::Literal("public, immutable".into())
    );
    assert!(matches!(resolved.loading, CacheLoading::StartupFiltered(_)));
    assert!(resolved.prefer_production_path);
    assert!(resolved.debug);
    assert_eq!(resolved.debug_path, "/_assets");
}

#[test]
fn test_cache_control_modes() {
    let cases = [
        ("cache_control: false", CacheControl::Disabled),
        ("cache_control: true", CacheControl::CookieSensitive),
        ("cache_control: cookieless", CacheControl::CookieSensitive),
        ("cache_control: cookie-sensitive", CacheControl::CookieSensitive),
        ("cache_control: public", CacheControl::Literal("public".into())),
    ];
    for (yaml, expected) in cases {
        let config = ConfigExpiry::from_yaml(yaml).unwrap().into_config().unwrap();
        assert_eq!(config.cache_control, expected, "{yaml}");
    }
}

#[test]
fn test_duration_in_seconds_and_single_values() {
    let json = r#"{
        "duration": 600,
        "dir": "static",
        "host": "cdn.acme.com",
        "load_cache": "furl"
    }"#;

    let config = ConfigExpiry::from_json(json).unwrap();
    assert_eq!(config.duration, Lifetime::Seconds(600));
    assert_eq!(config.load_cache, LoadCache::Mode(LoadMode::Lazy));

    let resolved = config.into_config().unwrap();
    assert_eq!(resolved.duration, Duration::from_secs(600));
    assert_eq!(resolved.roots, vec![PathBuf::from("static")]);
    assert_eq!(
        resolved.hosts,
        HostSelector::Single("//cdn.acme.com".into())
    );
    assert!(matches!(resolved.loading, CacheLoading::Lazy));
}

#[test]
fn test_unknown_field_is_rejected() {
    let result = ConfigExpiry::from_yaml("max_age: 10");
    assert!(matches!(result, Err(ConfigurationError::Yaml(_))));
}

#[test]
fn test_invalid_host_is_reported() {
    let result = ConfigExpiry::from_yaml("host: \"cdn .acme.com\"")
        .unwrap()
        .into_config();
    assert!(matches!(result, Err(ConfigurationError::Invalid(_))));
}

#[test]
fn test_empty_dir_list_is_reported() {
    let result = ConfigExpiry::from_yaml("dir: []").unwrap().into_config();
    assert!(matches!(result, Err(ConfigurationError::Invalid(_))));
}

#[test]
fn test_manifest_fingerprint() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.css"), "body {}").unwrap();
    let manifest = dir.path().join("manifest.json");
    fs::write(&manifest, r#"{ "main.css": "f00d" }"#).unwrap();

    let config = ConfigExpiry {
        dir: OneOrMany::One(dir.path().to_path_buf()),
        fingerprint: FingerprintConfig::Manifest { path: manifest },
        load_cache: LoadCache::Mode(LoadMode::Lazy),
        ..ConfigExpiry::default()
    };
    let expiry = expiry::Expiry::new(config.into_config().unwrap()).unwrap();
    assert_eq!(expiry.resolve("/main.css").unwrap(), "/f00d-main.css");
}

#[test]
fn test_missing_manifest_is_reported() {
    let config = ConfigExpiry {
        fingerprint: FingerprintConfig::Manifest {
            path: PathBuf::from("/definitely/not/here.json"),
        },
        ..ConfigExpiry::default()
    };
    assert!(matches!(
        config.into_config(),
        Err(ConfigurationError::Manifest(_))
    ));
}

#[test]
fn test_yaml_roundtrip() {
    let config = ConfigExpiry {
        location: Location::Query,
        host: Some(OneOrMany::One("cdn.acme.com".into())),
        ..ConfigExpiry::default()
    };
    let yaml = serde_saphyr::to_string(&config).expect("failed to serialize");
    let deserialized: ConfigExpiry = serde_saphyr::from_str(&yaml).expect("failed to deserialize");
    assert_eq!(config, deserialized);
}
