//! Cart store configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CART_API_URL` - Base URL of the catalog API (e.g., `http://localhost:3333`)
//!
//! ## Optional
//! - `CART_API_TOKEN` - Bearer token sent with catalog requests
//! - `CART_API_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `CART_PRODUCT_CACHE_TTL_SECS` - Product details cache TTL (default: 300)
//! - `CART_STORAGE_DIR` - Directory holding the persisted cart (default: `.cart`)
//! - `CART_STORAGE_KEY` - Key the cart is stored under (default: `cart`)

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart store configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Catalog API configuration
    pub api: CatalogApiConfig,
    /// Local persistence configuration
    pub storage: StorageConfig,
}

/// Catalog API configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct CatalogApiConfig {
    /// Base URL; `stock/{id}` and `products/{id}` are appended
    pub base_url: Url,
    /// Optional bearer token
    pub token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
    /// How long product details stay cached
    pub product_cache_ttl: Duration,
}

impl std::fmt::Debug for CatalogApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("product_cache_ttl", &self.product_cache_ttl)
            .finish()
    }
}

impl CatalogApiConfig {
    /// Configuration with default timeouts and no token.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            product_cache_ttl: Duration::from_secs(DEFAULT_PRODUCT_CACHE_TTL_SECS),
        }
    }
}

/// Local persistence configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Directory for `FileStorage`
    pub dir: PathBuf,
    /// Key the serialized cart is stored under
    pub key: String,
}

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PRODUCT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_STORAGE_DIR: &str = ".cart";
const DEFAULT_STORAGE_KEY: &str = "cart";

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let base_url = env.required("CART_API_URL")?;
        let base_url = Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("CART_API_URL".to_string(), e.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "CART_API_URL".to_string(),
                format!("unsupported scheme {}", base_url.scheme()),
            ));
        }

        let api = CatalogApiConfig {
            base_url,
            token: env
                .optional("CART_API_TOKEN")
                .filter(|token| !token.is_empty())
                .map(SecretString::from),
            timeout: Duration::from_secs(env.secs("CART_API_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?),
            product_cache_ttl: Duration::from_secs(env.secs(
                "CART_PRODUCT_CACHE_TTL_SECS",
                DEFAULT_PRODUCT_CACHE_TTL_SECS,
            )?),
        };

        let storage = StorageConfig {
            dir: PathBuf::from(env.or_default("CART_STORAGE_DIR", DEFAULT_STORAGE_DIR)),
            key: env.or_default("CART_STORAGE_KEY", DEFAULT_STORAGE_KEY),
        };

        Ok(Self { api, storage })
    }
}

struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn secs(&self, key: &str, default: u64) -> Result<u64, ConfigError> {
        self.optional(key).map_or(Ok(default), |value| {
            value
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<CartConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        CartConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("CART_API_URL", "http://localhost:3333")]).unwrap();
        assert_eq!(config.api.base_url.as_str(), "http://localhost:3333/");
        assert!(config.api.token.is_none());
        assert_eq!(config.api.timeout, Duration::from_secs(10));
        assert_eq!(config.api.product_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.storage.dir, PathBuf::from(".cart"));
        assert_eq!(config.storage.key, "cart");
    }

    #[test]
    fn test_missing_api_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "CART_API_URL"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("CART_API_URL", "not a url")]),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            load(&[("CART_API_URL", "ftp://catalog")]),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            load(&[
                ("CART_API_URL", "http://localhost"),
                ("CART_API_TIMEOUT_SECS", "soon")
            ]),
            Err(ConfigError::InvalidEnvVar(ref v, _)) if v == "CART_API_TIMEOUT_SECS"
        ));
    }

    #[test]
    fn test_overrides_and_token_redaction() {
        let config = load(&[
            ("CART_API_URL", "https://catalog.example.com/api"),
            ("CART_API_TOKEN", "tok_123"),
            ("CART_API_TIMEOUT_SECS", "3"),
            ("CART_STORAGE_DIR", "/var/lib/cart"),
            ("CART_STORAGE_KEY", "@shop:cart"),
        ])
        .unwrap();

        assert_eq!(config.api.token.as_ref().unwrap().expose_secret(), "tok_123");
        assert_eq!(config.api.timeout, Duration::from_secs(3));
        assert_eq!(config.storage.key, "@shop:cart");

        let debug = format!("{:?}", config.api);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("tok_123"));
    }
}
