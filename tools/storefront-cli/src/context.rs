//! CLI execution context.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context as _, Result};
use storefront_cache::Cache;
use storefront_core::checkout::Checkout;
use storefront_core::storage::StorageKeys;
use storefront_data::{CsrfToken, FetchClient, HttpTransport};
use storefront_observability::StructuredLogger;

use crate::config::{StorefrontConfig, CONFIG_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: StorefrontConfig,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config = if let Some(path) = config_path {
            StorefrontConfig::load(path)?
        } else {
            Self::find_config(&cwd).unwrap_or_default()
        };

        Ok(Self {
            config: config.with_env_overrides(),
            output,
            cwd,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<StorefrontConfig> {
        let mut current = start.to_path_buf();
        loop {
            for name in CONFIG_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = StorefrontConfig::load(config_path.to_str()?) {
                        return Some(config);
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }

    /// Snapshot storage on disk.
    pub fn cache(&self) -> Result<Cache> {
        let dir = self.resolve_path(&self.config.storage.dir);
        Cache::open_dir(&dir)
            .with_context(|| format!("Failed to open storage directory: {}", dir.display()))
    }

    pub fn storage_keys(&self) -> StorageKeys {
        StorageKeys::with_prefix(&self.config.storage.key_prefix)
    }

    /// Checkout state restored from storage.
    pub fn checkout(&self) -> Result<Checkout> {
        Ok(Checkout::restore_with_keys(self.cache()?, self.storage_keys()))
    }

    /// HTTP client for the configured API.
    pub fn client(&self) -> Result<FetchClient> {
        let api = &self.config.api;
        let transport = HttpTransport::new(Duration::from_secs(api.timeout_secs))
            .context("Failed to create HTTP client")?;
        let csrf = match &api.csrf_token {
            Some(token) => CsrfToken::with_token(token.clone()),
            None => CsrfToken::new(),
        };
        Ok(FetchClient::new(transport)
            .with_base_url(api.base_url.clone())
            .with_csrf(csrf))
    }

    /// Session logger for a command, tagged with the route it works on.
    pub fn logger(&self, route: &str) -> StructuredLogger {
        StructuredLogger::new("cli")
            .with_route(route)
            .with_min_level(self.config.logging.level)
            .with_format(self.config.logging.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::cart::LineItem;
    use storefront_core::money::Money;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("storefront-cli-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn context(cwd: PathBuf) -> Context {
        Context {
            config: StorefrontConfig::default(),
            output: Output::new(false, true),
            cwd,
        }
    }

    #[test]
    fn test_find_config_walks_up() {
        let root = temp_dir("find");
        std::fs::write(
            root.join("storefront.toml"),
            "[storage]\nkey_prefix = \"found\"\n",
        )
        .unwrap();
        let nested = root.join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let config = Context::find_config(&nested).unwrap();
        assert_eq!(config.storage.key_prefix, "found");
        std::fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn test_resolve_path() {
        let ctx = context(PathBuf::from("/work"));
        assert_eq!(ctx.resolve_path("data"), PathBuf::from("/work/data"));
        assert_eq!(ctx.resolve_path("/var/data"), PathBuf::from("/var/data"));
    }

    #[test]
    fn test_checkout_persists_between_commands() {
        let root = temp_dir("checkout");
        let ctx = context(root.clone());

        let mut checkout = ctx.checkout().unwrap();
        checkout
            .add_item(LineItem::new("RING-1", "gold-ring", Money::new(1500)))
            .unwrap();

        let restored = ctx.checkout().unwrap();
        assert_eq!(restored.lines().len(), 1);
        assert_eq!(restored.lines()[0].sku, "RING-1");
        std::fs::remove_dir_all(root).unwrap();
    }
}
