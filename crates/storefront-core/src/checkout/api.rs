//! Wire types exchanged with the checkout endpoints.

use serde::{Deserialize, Serialize};

use crate::cart::DEFAULT_CURRENCY_SYMBOL;
use crate::ids::{ItemSlug, Sku};
use crate::money::Money;

fn default_symbol() -> String {
    DEFAULT_CURRENCY_SYMBOL.to_string()
}

/// Current catalog data for an item in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledItem {
    pub sku: Sku,
    pub slug: ItemSlug,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default = "default_symbol")]
    pub price_currency_symbol: String,
    #[serde(default)]
    pub list_price_amount: Money,
    /// Deal price; absent, null, empty or zero means no deal.
    #[serde(default)]
    pub deal_price_amount: Option<Money>,
    #[serde(default = "default_limit")]
    pub limit_per_order: i64,
}

fn default_limit() -> i64 {
    1
}

impl ReconciledItem {
    /// The price the customer pays: the deal price if there is one.
    pub fn effective_price(&self) -> Money {
        match self.deal_price_amount {
            Some(deal) if !deal.is_zero() => deal,
            _ => self.list_price_amount,
        }
    }
}

/// One line of a cart check request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartCheckItem {
    pub sku: Sku,
    pub quantity: i64,
}

/// Body of the cart check request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartCheckRequest {
    pub coupon: String,
    pub items: Vec<CartCheckItem>,
}

/// Authoritative cart totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartCheckResponse {
    #[serde(default)]
    pub coupon_title: Option<String>,
    #[serde(default = "default_symbol")]
    pub price_currency_symbol: String,
    #[serde(default)]
    pub total_discount_amount: Money,
    #[serde(default)]
    pub total_price_amount: Money,
}

/// Address tuple the shipping cost is computed from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub country_iso_code: String,
    pub region: String,
    pub city: String,
    pub postal_code: String,
}

impl ShippingAddress {
    pub fn is_complete(&self) -> bool {
        !self.country_iso_code.is_empty()
            && !self.region.is_empty()
            && !self.city.is_empty()
            && !self.postal_code.is_empty()
    }
}

/// Body of the shipping cost request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingCostRequest {
    pub shipping_method: String,
    pub shipping_address: ShippingAddress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingCostResponse {
    #[serde(default = "default_symbol")]
    pub price_currency_symbol: String,
    #[serde(default)]
    pub shipping_cost_amount: Money,
}

/// A `{label, value}` pair for select inputs (countries, shipping methods).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    pub value: String,
}

impl Choice {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A payment method offered at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub label: String,
    pub value: String,
    #[serde(default)]
    pub is_card: bool,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub icon_color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_price_prefers_deal() {
        let item: ReconciledItem = serde_json::from_str(
            r#"{"sku": "A", "slug": "a", "list_price_amount": "20.00",
                "deal_price_amount": "15.50", "limit_per_order": 3}"#,
        )
        .unwrap();
        assert_eq!(item.effective_price(), Money::new(1550));
    }

    #[test]
    fn test_effective_price_falls_back_to_list() {
        for deal in [r#"null"#, r#""""#, r#"0"#, r#""0.00""#] {
            let raw = format!(
                r#"{{"sku": "A", "slug": "a", "list_price_amount": 20, "deal_price_amount": {}}}"#,
                deal
            );
            let item: ReconciledItem = serde_json::from_str(&raw).unwrap();
            assert_eq!(item.effective_price(), Money::new(2000), "deal = {}", deal);
        }
    }

    #[test]
    fn test_cart_check_request_shape() {
        let request = CartCheckRequest {
            coupon: "SPRING".to_string(),
            items: vec![CartCheckItem {
                sku: Sku::new("A"),
                quantity: 2,
            }],
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"coupon": "SPRING", "items": [{"sku": "A", "quantity": 2}]})
        );
    }

    #[test]
    fn test_address_completeness() {
        let mut address = ShippingAddress {
            country_iso_code: "US".into(),
            region: "CA".into(),
            city: "Oakland".into(),
            postal_code: String::new(),
        };
        assert!(!address.is_complete());
        address.postal_code = "94601".into();
        assert!(address.is_complete());
    }
}
