//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `ELITESHOP_API_BASE_URL` - Catalog/auth API root (default: <https://fakestoreapi.com>)
//! - `ELITESHOP_SESSION_FILE` - Session snapshot file (default: `.eliteshop/user.json`)
//! - `ELITESHOP_CATALOG_CACHE_TTL_SECS` - Product list cache lifetime (default: 300)
//! - `ELITESHOP_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "https://fakestoreapi.com";
const DEFAULT_SESSION_FILE: &str = ".eliteshop/user.json";
const DEFAULT_CATALOG_CACHE_TTL_SECS: &str = "300";
const DEFAULT_HTTP_TIMEOUT_SECS: &str = "10";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct ShopConfig {
    /// Remote catalog and auth API configuration
    pub api: ApiConfig,
    /// Where the session snapshot is persisted
    pub session_file: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
}

/// Remote API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// API root, always ending in `/`
    pub base_url: Url,
    /// Lifetime of the cached product list
    pub catalog_cache_ttl: Duration,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ShopConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            api: ApiConfig::from_env()?,
            session_file: PathBuf::from(get_env_or_default(
                "ELITESHOP_SESSION_FILE",
                DEFAULT_SESSION_FILE,
            )),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }
}

impl ApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(get_optional_env)
    }

    /// Build from `lookup`, falling back to the defaults for unset keys.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Self {
            base_url: parse_base_url(
                "ELITESHOP_API_BASE_URL",
                &value("ELITESHOP_API_BASE_URL", DEFAULT_API_BASE_URL),
            )?,
            catalog_cache_ttl: parse_secs(
                "ELITESHOP_CATALOG_CACHE_TTL_SECS",
                &value(
                    "ELITESHOP_CATALOG_CACHE_TTL_SECS",
                    DEFAULT_CATALOG_CACHE_TTL_SECS,
                ),
            )?,
            timeout: parse_secs(
                "ELITESHOP_HTTP_TIMEOUT_SECS",
                &value("ELITESHOP_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS),
            )?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an http(s) base URL, normalizing it to end in `/` so joins append.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let normalized = if value.ends_with('/') {
        value.to_string()
    } else {
        format!("{value}/")
    };
    let url = Url::parse(&normalized)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// Parse a whole number of seconds.
fn parse_secs(key: &str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_url_appends_slash() {
        let url = parse_base_url("K", "https://fakestoreapi.com").unwrap();
        assert_eq!(url.as_str(), "https://fakestoreapi.com/");
        assert_eq!(
            url.join("products").unwrap().as_str(),
            "https://fakestoreapi.com/products"
        );
    }

    #[test]
    fn test_parse_base_url_keeps_path_prefix() {
        let url = parse_base_url("K", "http://localhost:8080/api/v1").unwrap();
        assert_eq!(
            url.join("auth/login").unwrap().as_str(),
            "http://localhost:8080/api/v1/auth/login"
        );
    }

    #[test]
    fn test_parse_base_url_rejects_other_schemes() {
        let err = parse_base_url("ELITESHOP_API_BASE_URL", "ftp://example.com").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "ELITESHOP_API_BASE_URL"));
    }

    #[test]
    fn test_parse_base_url_rejects_garbage() {
        assert!(parse_base_url("K", "not a url").is_err());
    }

    #[test]
    fn test_parse_secs() {
        assert_eq!(parse_secs("K", " 30 ").unwrap(), Duration::from_secs(30));
        assert!(parse_secs("K", "-1").is_err());
        assert!(parse_secs("K", "soon").is_err());
    }

    #[test]
    fn test_api_config_defaults() {
        let config = ApiConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.base_url.as_str(), "https://fakestoreapi.com/");
        assert_eq!(config.catalog_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_api_config_overrides() {
        let config = ApiConfig::from_lookup(|key| match key {
            "ELITESHOP_API_BASE_URL" => Some("http://localhost:3000".to_string()),
            "ELITESHOP_HTTP_TIMEOUT_SECS" => Some("2".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:3000/");
        assert_eq!(config.catalog_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_api_config_reports_bad_key() {
        let err = ApiConfig::from_lookup(|key| {
            (key == "ELITESHOP_CATALOG_CACHE_TTL_SECS").then(|| "forever".to_string())
        })
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnvVar(ref k, _) if k == "ELITESHOP_CATALOG_CACHE_TTL_SECS"
        ));
    }
}
