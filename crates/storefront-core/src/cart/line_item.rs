//! Cart line items.

use serde::{Deserialize, Serialize};

use crate::error::CommerceError;
use crate::ids::{ItemSlug, Sku};
use crate::money::Money;

/// Default currency symbol when the API has not said otherwise.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "$";

/// A product item in the cart.
///
/// Stored as a camelCase JSON snapshot (`itemSlug`, `priceAmount`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub sku: Sku,
    pub item_slug: ItemSlug,
    pub price_amount: Money,
    #[serde(default = "default_symbol")]
    pub currency_symbol: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default = "default_quantity")]
    pub limit_per_order: i64,
    #[serde(default)]
    pub thumbnail: String,
}

fn default_symbol() -> String {
    DEFAULT_CURRENCY_SYMBOL.to_string()
}

fn default_quantity() -> i64 {
    1
}

impl LineItem {
    /// A single unit of `sku` at `price_amount`.
    pub fn new(sku: impl Into<Sku>, item_slug: impl Into<ItemSlug>, price_amount: Money) -> Self {
        Self {
            sku: sku.into(),
            item_slug: item_slug.into(),
            price_amount,
            currency_symbol: default_symbol(),
            quantity: 1,
            limit_per_order: 1,
            thumbnail: String::new(),
        }
    }

    pub fn with_currency_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.currency_symbol = symbol.into();
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_limit_per_order(mut self, limit: i64) -> Self {
        self.limit_per_order = limit;
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = thumbnail.into();
        self
    }

    /// Price times quantity.
    pub fn subtotal(&self) -> Money {
        self.price_amount * self.quantity
    }

    /// Check the quantity is at least one.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.quantity < 1 {
            return Err(CommerceError::InvalidQuantity(self.quantity));
        }
        Ok(())
    }
}
