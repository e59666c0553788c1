use anyhow::{ensure, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::domains::toilets::{AggregationConfig, PaginationConfig};

/// Application configuration loaded from environment variables
#[derive(Clone)]
pub struct Config {
    pub port: u16,
    /// Seoul Open Data Plaza key. Part of every upstream URL; never logged.
    pub seoul_key: String,
    pub seoul_api_base: String,
    pub page_size: u32,
    pub max_pages: u32,
    pub page_delay: Duration,
    pub cache_ttl: Duration,
    pub upstream_timeout: Duration,
    pub static_dir: String,
}

fn var_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} must be a valid number")),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let config = Self {
            port: var_or("PORT", 3000)?,
            seoul_key: env::var("SEOUL_KEY").context("SEOUL_KEY must be set")?,
            seoul_api_base: env::var("SEOUL_API_BASE")
                .unwrap_or_else(|_| seoul_openapi::DEFAULT_BASE_URL.to_string()),
            page_size: var_or("PAGE_SIZE", 1000)?,
            max_pages: var_or("MAX_PAGES", 20)?,
            page_delay: Duration::from_millis(var_or("PAGE_DELAY_MS", 120)?),
            cache_ttl: Duration::from_secs(var_or("CACHE_TTL_SECS", 60 * 60)?),
            upstream_timeout: Duration::from_secs(var_or("UPSTREAM_TIMEOUT_SECS", 30)?),
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "public".to_string()),
        };

        ensure!(!config.seoul_key.trim().is_empty(), "SEOUL_KEY must not be empty");
        ensure!(config.page_size >= 1, "PAGE_SIZE must be at least 1");
        ensure!(config.max_pages >= 1, "MAX_PAGES must be at least 1");

        Ok(config)
    }

    pub fn aggregation(&self) -> AggregationConfig {
        AggregationConfig {
            pagination: PaginationConfig {
                page_size: self.page_size,
                max_pages: self.max_pages,
                page_delay: self.page_delay,
            },
            cache_ttl: self.cache_ttl,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("seoul_key", &"[REDACTED]")
            .field("seoul_api_base", &self.seoul_api_base)
            .field("page_size", &self.page_size)
            .field("max_pages", &self.max_pages)
            .field("page_delay", &self.page_delay)
            .field("cache_ttl", &self.cache_ttl)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("static_dir", &self.static_dir)
            .finish()
    }
}
