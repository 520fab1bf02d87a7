//! Durable client-side storage for the storefront.
//!
//! Provides a small, typed API for keeping JSON snapshots of aggregator state
//! (cart lines, shipping details, payment details) under fixed keys.
//!
//! # Example
//!
//! ```rust
//! use storefront_cache::{cache_key, Cache};
//!
//! let cache = Cache::in_memory();
//! let key = cache_key!("storefront", "cart");
//!
//! cache.set(&key, &vec!["SKU-1", "SKU-2"]).unwrap();
//! let skus: Option<Vec<String>> = cache.get(&key).unwrap();
//! assert_eq!(skus.unwrap().len(), 2);
//! ```

mod backend;
mod error;
mod kv;

pub use backend::{FileBackend, KvBackend, MemoryBackend};
pub use error::CacheError;
pub use kv::Cache;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{cache_key, Cache, CacheError, KvBackend};
}
