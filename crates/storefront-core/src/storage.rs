//! Storage keys for aggregator snapshots.

use serde::de::DeserializeOwned;
use storefront_cache::{cache_key, Cache};

/// Namespace every snapshot key starts with.
pub const DEFAULT_KEY_PREFIX: &str = "storefront";

/// Keys the cart and checkout snapshots live under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub cart: String,
    pub shipping_details: String,
    pub payment_details: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_KEY_PREFIX)
    }
}

impl StorageKeys {
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            cart: cache_key!(prefix, "cart"),
            shipping_details: cache_key!(prefix, "shipping-details"),
            payment_details: cache_key!(prefix, "payment-details"),
        }
    }
}

/// Read a snapshot, treating unreadable data as absent.
pub(crate) fn load_snapshot<T: DeserializeOwned>(cache: &Cache, key: &str) -> Option<T> {
    match cache.get(key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring unreadable snapshot");
            None
        }
    }
}
