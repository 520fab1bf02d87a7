//! CLI configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use storefront_core::endpoints::Endpoints;
use storefront_core::storage::DEFAULT_KEY_PREFIX;
use storefront_observability::LoggingConfig;

/// Environment variable overriding `api.base_url`.
pub const API_URL_ENV: &str = "STOREFRONT_API_URL";

/// Config file names looked up from the working directory upwards.
pub const CONFIG_NAMES: [&str; 3] = ["storefront.toml", ".storefront.toml", "storefront.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// Backend API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Where cart and checkout snapshots are kept.
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StorefrontConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        Self::parse(path, &content)
    }

    /// Parse `content` as JSON or TOML depending on the extension of `path`.
    pub fn parse(path: &str, content: &str) -> Result<Self> {
        if path.ends_with(".json") {
            serde_json::from_str(content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Apply environment overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            self.apply_api_url(url);
        }
        self
    }

    fn apply_api_url(&mut self, url: String) {
        if !url.trim().is_empty() {
            self.api.base_url = url.trim().to_string();
        }
    }
}

/// `[api]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Origin the endpoint paths are joined to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// CSRF token to send before the API has handed one out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,

    /// Endpoint path overrides.
    #[serde(default)]
    pub endpoints: Endpoints,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            csrf_token: None,
            endpoints: Endpoints::default(),
        }
    }
}

/// `[storage]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Snapshot directory, relative to the working directory unless absolute.
    #[serde(default = "default_storage_dir")]
    pub dir: String,

    /// Namespace of snapshot keys.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
}

fn default_storage_dir() -> String {
    ".storefront".to_string()
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            key_prefix: default_key_prefix(),
        }
    }
}

/// Generate a default storefront.toml config file.
pub fn generate_default_config(base_url: &str) -> String {
    format!(
        r#"# Storefront CLI configuration

[api]
base_url = "{base_url}"
timeout_secs = 10
# csrf_token = ""

# Endpoint paths default to /api/v1/...; override any of them here.
[api.endpoints]
# cart_check = "/api/v1/cart/check/"
# shipping_cost = "/api/v1/shipping/cost/"

[storage]
dir = ".storefront"
key_prefix = "{prefix}"

[logging]
level = "warn"
format = "human"
"#,
        base_url = base_url,
        prefix = DEFAULT_KEY_PREFIX,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_observability::LogFormat;

    #[test]
    fn test_generated_config_parses() {
        let config =
            StorefrontConfig::parse("storefront.toml", &generate_default_config("https://shop.example"))
                .unwrap();
        assert_eq!(config.api.base_url, "https://shop.example");
        assert_eq!(config.api.endpoints, Endpoints::default());
        assert_eq!(config.storage, StorageConfig::default());
        assert_eq!(config.logging.format, LogFormat::Human);
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = StorefrontConfig::parse(
            "storefront.toml",
            r#"
[api.endpoints]
cart_check = "/v2/cart/check/"

[storage]
key_prefix = "shop"
"#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.endpoints.cart_check, "/v2/cart/check/");
        assert_eq!(config.api.endpoints.home, "/api/v1/home/");
        assert_eq!(config.storage.dir, ".storefront");
        assert_eq!(config.storage.key_prefix, "shop");
    }

    #[test]
    fn test_json_config() {
        let config = StorefrontConfig::parse(
            "storefront.json",
            r#"{"api": {"base_url": "https://api.example", "timeout_secs": 3}}"#,
        )
        .unwrap();
        assert_eq!(config.api.timeout_secs, 3);
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        assert!(StorefrontConfig::parse("storefront.toml", "[api\nbase_url =").is_err());
    }

    #[test]
    fn test_api_url_override() {
        let mut config = StorefrontConfig::default();
        config.apply_api_url("   ".to_string());
        assert_eq!(config.api.base_url, "http://localhost:8000");
        config.apply_api_url(" https://staging.example ".to_string());
        assert_eq!(config.api.base_url, "https://staging.example");
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut config = StorefrontConfig::default();
        config.api.csrf_token = Some("token".into());
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(StorefrontConfig::parse("storefront.toml", &text).unwrap(), config);
    }
}
