use expiry::CacheControl;
use serde::{Deserialize, Serialize};

const COOKIELESS: &str = "cookieless";
const COOKIE_SENSITIVE: &str = "cookie-sensitive";

/// `Cache-Control` base as written in a configuration file.
///
/// `false` disables the base directive, `true`, `cookieless` and
/// `cookie-sensitive` pick `public` or `private` per request, and any other
/// string is sent as is.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CacheControlConfig {
    Enabled(bool),
    Value(String),
}

impl Default for CacheControlConfig {
    fn default() -> Self {
        CacheControlConfig::Value(COOKIELESS.to_owned())
    }
}

impl CacheControlConfig {
    pub fn into_cache_control(self) -> CacheControl {
        match self {
            CacheControlConfig::Enabled(false) => CacheControl::Disabled,
            CacheControlConfig::Enabled(true) => CacheControl::CookieSensitive,
            CacheControlConfig::Value(value)
                if value == COOKIELESS || value == COOKIE_SENSITIVE =>
            {
                CacheControl::CookieSensitive
            }
            CacheControlConfig::Value(value) => CacheControl::Literal(value),
        }
    }
}
