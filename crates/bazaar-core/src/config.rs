//! Application configuration management.
//!
//! Two layers live here:
//! - `Config`: the persisted user configuration at
//!   `~/.config/bazaar/config.json` (API URL override, gateway key, last
//!   login email, token storage backend)
//! - `ClientConfig`: the resolved settings the HTTP client is built with
//!
//! Environment variables (`VITE_API_URL`, `VITE_RAZORPAY_KEY_ID`,
//! `VITE_DEV_MODE`) take precedence over the config file.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "bazaar";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Origin used when neither the environment nor the config file set one
pub const DEFAULT_API_ORIGIN: &str = "http://localhost:5000";

/// Path prefix of every API route
pub const API_PREFIX: &str = "/api/v1";

/// Overrides the API origin
pub const API_URL_ENV: &str = "VITE_API_URL";

/// Public key id for the hosted checkout widget
pub const RAZORPAY_KEY_ENV: &str = "VITE_RAZORPAY_KEY_ID";

/// Enables debug output in the shell
pub const DEV_MODE_ENV: &str = "VITE_DEV_MODE";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// `session.json` in the cache directory
    #[default]
    File,
    /// OS keychain
    Keyring,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub razorpay_key_id: Option<String>,
    pub last_email: Option<String>,
    #[serde(default)]
    pub token_storage: StorageBackend,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Client settings with `VITE_API_URL` taking precedence over `api_url`.
    pub fn client_config(&self) -> ClientConfig {
        let env_url = env_value(API_URL_ENV);
        ClientConfig::new(resolve_base_url(env_url.as_deref(), self.api_url.as_deref()))
    }

    pub fn razorpay_key_id(&self) -> Option<String> {
        env_value(RAZORPAY_KEY_ENV).or_else(|| self.razorpay_key_id.clone())
    }

    pub fn dev_mode() -> bool {
        env_value(DEV_MODE_ENV)
            .map(|v| is_truthy(&v))
            .unwrap_or(false)
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Pick the first non-empty origin and make sure it ends in `/api/v1`.
pub fn resolve_base_url(override_url: Option<&str>, configured: Option<&str>) -> String {
    let origin = [override_url, configured]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .unwrap_or(DEFAULT_API_ORIGIN)
        .trim_end_matches('/');

    if origin.ends_with(API_PREFIX) {
        origin.to_string()
    } else {
        format!("{}{}", origin, API_PREFIX)
    }
}

/// Settings the HTTP client core is built with.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Origin plus `/api/v1`, without trailing slash
    pub base_url: String,
    /// Merged into every request; per-request headers win
    pub default_headers: HeaderMap,
    /// Send cookies on cross-origin requests
    pub with_credentials: bool,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_headers,
            with_credentials: true,
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Absolute URL for `path`. Absolute paths are passed through.
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(resolve_base_url(None, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_base_url_precedence() {
        assert_eq!(resolve_base_url(None, None), "http://localhost:5000/api/v1");
        assert_eq!(
            resolve_base_url(Some("https://api.shop.example"), Some("http://other")),
            "https://api.shop.example/api/v1"
        );
        assert_eq!(
            resolve_base_url(Some("  "), Some("http://staging:8080/")),
            "http://staging:8080/api/v1"
        );
    }

    #[test]
    fn test_resolve_base_url_keeps_existing_prefix() {
        assert_eq!(
            resolve_base_url(Some("https://api.shop.example/api/v1/"), None),
            "https://api.shop.example/api/v1"
        );
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let config = ClientConfig::new("http://localhost:5000/api/v1/");
        assert_eq!(config.endpoint("/products"), "http://localhost:5000/api/v1/products");
        assert_eq!(config.endpoint("cart/add"), "http://localhost:5000/api/v1/cart/add");
        assert_eq!(
            config.endpoint("https://cdn.example/upload"),
            "https://cdn.example/upload"
        );
    }

    #[test]
    fn test_default_headers_and_credentials() {
        let config = ClientConfig::default();
        assert_eq!(config.default_headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert!(config.with_credentials);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_config_parses_storage_backend() {
        let config: Config = serde_json::from_str(r#"{"token_storage":"keyring"}"#).unwrap();
        assert_eq!(config.token_storage, StorageBackend::Keyring);

        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.token_storage, StorageBackend::File);
    }

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy("true"));
        assert!(is_truthy(" 1 "));
        assert!(!is_truthy("false"));
        assert!(!is_truthy(""));
    }
}
