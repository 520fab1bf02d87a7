//! Mini cart shown in the header dropdown.

use storefront_cache::Cache;

use crate::cart::{LineItem, DEFAULT_CURRENCY_SYMBOL};
use crate::error::CommerceError;
use crate::money::Money;
use crate::storage::{load_snapshot, StorageKeys};

/// A shopping cart that keeps every added line, newest first.
///
/// Unlike the checkout cart it does not collapse repeated items. Each change
/// is written through to storage.
#[derive(Debug, Clone)]
pub struct Cart {
    items: Vec<LineItem>,
    cache: Cache,
    key: String,
}

impl Cart {
    /// Create an empty cart persisting to `cache`.
    pub fn new(cache: Cache) -> Self {
        Self::with_key(cache, StorageKeys::default().cart)
    }

    pub fn with_key(cache: Cache, key: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            cache,
            key: key.into(),
        }
    }

    /// Load the cart snapshot from `cache`, starting empty if there is none.
    pub fn restore(cache: Cache) -> Self {
        Self::restore_with_key(cache, StorageKeys::default().cart)
    }

    /// [`Cart::restore`] from a custom storage key.
    pub fn restore_with_key(cache: Cache, key: impl Into<String>) -> Self {
        let mut cart = Self::with_key(cache, key);
        cart.items = load_snapshot(&cart.cache, &cart.key).unwrap_or_default();
        cart
    }

    fn save(&self) {
        self.cache.store(&self.key, &self.items);
    }

    /// Insert `item` at the front.
    pub fn add_item(&mut self, item: LineItem) -> Result<(), CommerceError> {
        item.validate()?;
        tracing::debug!(sku = %item.sku, "cart add");
        self.items.insert(0, item);
        self.save();
        Ok(())
    }

    /// Remove the line at `index`. Out of range is a no-op.
    pub fn remove_item(&mut self, index: usize) -> Option<LineItem> {
        if index >= self.items.len() {
            return None;
        }
        let removed = self.items.remove(index);
        self.save();
        Some(removed)
    }

    pub fn is_item_exists(&self, slug: &str) -> bool {
        self.items.iter().any(|i| i.item_slug == slug)
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn items_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of line prices, ignoring quantities.
    pub fn total_amount(&self) -> Money {
        Money::sum(self.items.iter().map(|i| &i.price_amount))
    }

    /// Sum of line prices prefixed with the first line's currency symbol.
    ///
    /// Whole totals print without decimals (`$15`), an empty cart is `$0`.
    pub fn total_price(&self) -> String {
        match self.items.first() {
            Some(first) => format!(
                "{}{}",
                first.currency_symbol,
                self.total_amount().fixed(false)
            ),
            None => format!("{}0", DEFAULT_CURRENCY_SYMBOL),
        }
    }
}
