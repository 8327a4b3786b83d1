use std::env;

use tracing::Level;

pub const DEFAULT_BASE_URL: &str = "https://fakestoreapi.com";

#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub base_url: String,
    pub log_path: Option<String>,
    pub log_level: Level,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            base_url: String::from(DEFAULT_BASE_URL),
            log_path: None,
            log_level: Level::INFO,
        }
    }
}

impl CatalogConfig {
    /// Reads `CATALOG_BASE_URL`, `LOG_PATH` and `LOG_LEVEL`. All optional.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = CatalogConfig::default();

        let base_url = lookup("CATALOG_BASE_URL")
            .filter(|url| !url.is_empty())
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);

        let log_level = lookup("LOG_LEVEL")
            .and_then(|level| level.parse::<Level>().ok())
            .unwrap_or(defaults.log_level);

        CatalogConfig {
            base_url: base_url,
            log_path: lookup("LOG_PATH").filter(|path| !path.is_empty()),
            log_level: log_level,
        }
    }
}
