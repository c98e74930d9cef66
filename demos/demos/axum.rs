//! Axum Integration Example
//!
//! Serves a small static site whose asset URLs carry content fingerprints.
//!
//! Features shown:
//! - Configuration loaded from YAML
//! - Fingerprinted URLs rendered into HTML through `furl`
//! - `ExpiryLayer` in front of `tower_http::services::ServeDir`
//! - Debug endpoint listing the cache contents
//!
//! Run:
//!   cargo run -p expiry-demos --example axum
//!
//! Try it:
//!   curl -v http://localhost:3000/                     # HTML with fingerprinted links
//!   curl -v http://localhost:3000/css/<hash>-site.css  # Far-future cache headers
//!   curl -v -H 'If-None-Match: "<hash>"' http://localhost:3000/css/<hash>-site.css  # 304
//!   curl -v http://localhost:3000/css/site.css         # Plain file, no cache headers
//!   curl http://localhost:3000/expiry                  # Cache contents as JSON

use std::fs;
use std::path::Path;

use axum::{Router, extract::State, response::Html, routing::get};
use expiry::Expiry;
use expiry_configuration::{ConfigExpiry, OneOrMany};
use expiry_tower::ExpiryLayer;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;

const CONFIG: &str = r#"
duration: 1year
cache_control: cookieless
location: prefile
load_cache:
  at: startup
  exclude: [map]
debug: true
"#;

fn write_site(root: &Path) -> std::io::Result<()> {
    fs::create_dir_all(root.join("css"))?;
    fs::create_dir_all(root.join("js"))?;
    fs::write(root.join("css/site.css"), "body { font-family: sans-serif; }\n")?;
    fs::write(root.join("js/app.js"), "console.log('hello');\n")?;
    fs::write(root.join("js/app.min.js"), "console.log('hello')")?;
    fs::write(root.join("js/app.js.map"), "{}")?;
    Ok(())
}

async fn index(State(expiry): State<Expiry>) -> Html<String> {
    let furl = expiry.furl();
    let script = expiry
        .resolve_with("/js/app.js", Some("/js/app.min.js"))
        .unwrap_or_else(|_| "/js/app.js".to_owned());
    Html(format!(
        "<!doctype html>\n\
         <link rel=\"stylesheet\" href=\"{}\">\n\
         <script src=\"{}\"></script>\n\
         <p>Hello from a fingerprinted page.</p>\n",
        furl("/css/site.css"),
        script,
    ))
}

#[tokio::main]
async fn main() {
    let subscriber = tracing_subscriber::fmt()
        .pretty()
        .with_env_filter("debug,expiry=trace,expiry_tower=trace")
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let site = tempfile::tempdir().expect("Failed to create site directory");
    write_site(site.path()).expect("Failed to write site");

    let mut config = ConfigExpiry::from_yaml(CONFIG).expect("Invalid configuration");
    config.dir = OneOrMany::One(site.path().to_path_buf());
    config.prefer_production_path = true;

    let expiry = Expiry::new(config.into_config().expect("Invalid configuration"))
        .expect("Failed to warm asset cache");
    tracing::info!(assets = expiry.store().len(), "asset cache warmed");

    let assets = ServiceBuilder::new()
        .layer(ExpiryLayer::new(&expiry))
        .service(ServeDir::new(site.path()));

    let app = Router::new()
        .route("/", get(index))
        .fallback_service(assets)
        .with_state(expiry);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000")
        .await
        .expect("Failed to bind to port 3000");
    tracing::info!("Listening on http://{}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Server error");
}
