//! Client configuration: upstream endpoints, credential, timeouts and cache sizing.

use crate::cache::{DEFAULT_CAPACITY, DEFAULT_TTL, MAX_TTL};
use crate::error::{FoodError, Result};
use std::time::Duration;

pub const DEFAULT_BRANDED_URL: &str = "https://world.openfoodfacts.org/api/v2";
pub const DEFAULT_GENERIC_URL: &str = "https://api.nal.usda.gov/fdc/v1";
pub const LOOKUP_TIMEOUT: Duration = Duration::from_secs(15);
pub const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_PAGE_SIZE: u32 = 25;

#[derive(Debug, Clone)]
pub struct Config {
    /// Branded-goods provider; serves both barcode lookups and search
    pub branded_base_url: String,
    /// Generic-foods provider; search only
    pub generic_base_url: String,
    /// Generic-foods credential. Without one that provider is skipped.
    pub generic_api_key: Option<String>,
    pub lookup_timeout: Duration,
    /// Applied to each provider call independently
    pub search_timeout: Duration,
    pub cache_ttl: Duration,
    pub cache_capacity: u64,
    /// Results requested from each provider per page
    pub page_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            branded_base_url: DEFAULT_BRANDED_URL.to_string(),
            generic_base_url: DEFAULT_GENERIC_URL.to_string(),
            generic_api_key: None,
            lookup_timeout: LOOKUP_TIMEOUT,
            search_timeout: SEARCH_TIMEOUT,
            cache_ttl: DEFAULT_TTL,
            cache_capacity: DEFAULT_CAPACITY,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Defaults overlaid with `FORAGE_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = var("FORAGE_BRANDED_URL") {
            config.branded_base_url = url;
        }
        if let Some(url) = var("FORAGE_GENERIC_URL") {
            config.generic_base_url = url;
        }
        config = config.with_api_key(var("FORAGE_USDA_API_KEY").or_else(|| var("USDA_API_KEY")));

        let secs = |key: &str, default: Duration| match var(key) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) => Duration::from_secs(secs),
                Err(_) => {
                    tracing::warn!("Ignoring {key}={raw:?}: expected whole seconds");
                    default
                }
            },
            None => default,
        };
        config.lookup_timeout = secs("FORAGE_LOOKUP_TIMEOUT_SECS", config.lookup_timeout);
        config.search_timeout = secs("FORAGE_SEARCH_TIMEOUT_SECS", config.search_timeout);
        config.cache_ttl = secs("FORAGE_CACHE_TTL_SECS", config.cache_ttl);
        if config.cache_ttl > MAX_TTL {
            tracing::warn!(
                "Ignoring FORAGE_CACHE_TTL_SECS={}: longer than {}s",
                config.cache_ttl.as_secs(),
                MAX_TTL.as_secs()
            );
            config.cache_ttl = DEFAULT_TTL;
        }

        config
    }

    /// Set the generic-foods credential; blank keys count as absent
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        self.generic_api_key = key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        self
    }

    /// Check both base URLs parse as absolute http(s) URLs and the sizes are usable
    pub fn validate(&self) -> Result<()> {
        for url in [&self.branded_base_url, &self.generic_base_url] {
            let parsed = reqwest::Url::parse(url)
                .map_err(|e| FoodError::InvalidConfig(format!("{url}: {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
                return Err(FoodError::InvalidConfig(format!(
                    "{url}: expected an http(s) base URL"
                )));
            }
        }
        if self.page_size == 0 {
            return Err(FoodError::InvalidConfig("page size must be positive".into()));
        }
        if self.cache_ttl > MAX_TTL {
            return Err(FoodError::InvalidConfig(format!(
                "cache TTL of {}s exceeds the {}s maximum",
                self.cache_ttl.as_secs(),
                MAX_TTL.as_secs()
            )));
        }
        Ok(())
    }
}
