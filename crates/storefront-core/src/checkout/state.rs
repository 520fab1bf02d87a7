//! The checkout aggregator.

use std::collections::BTreeMap;

use storefront_cache::Cache;
use storefront_data::{FetchClient, FetchError};

use crate::cart::{LineItem, DEFAULT_CURRENCY_SYMBOL};
use crate::checkout::api::{
    CartCheckItem, CartCheckRequest, CartCheckResponse, Choice, PaymentMethod, ReconciledItem,
    ShippingAddress, ShippingCostRequest, ShippingCostResponse,
};
use crate::checkout::details::{PaymentDetails, PaymentField, ShippingDetails, ShippingField};
use crate::error::CommerceError;
use crate::ids::Sku;
use crate::money::Money;
use crate::price::FixedPrice;
use crate::storage::{load_snapshot, StorageKeys};
use crate::ticket::{Ticket, TicketBook};

/// Network actions the checkout issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RequestKind {
    Reconcile,
    CartCheck,
    Countries,
    ShippingMethods,
    ShippingCost,
    PaymentMethods,
}

/// Results of the last cart check.
#[derive(Debug, Clone, PartialEq)]
pub struct CartApiState {
    pub coupon_title: String,
    pub currency_symbol: String,
    pub total_discount: Money,
    /// Authoritative total including discounts; zero when unknown.
    pub total_price: Money,
    pub error_msg: String,
}

impl Default for CartApiState {
    fn default() -> Self {
        Self {
            coupon_title: String::new(),
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            total_discount: Money::ZERO,
            total_price: Money::ZERO,
            error_msg: String::new(),
        }
    }
}

/// Results of the last shipping cost request.
#[derive(Debug, Clone, PartialEq)]
pub struct ShippingApiState {
    pub currency_symbol: String,
    pub cost: Money,
    pub error_msg: String,
}

impl Default for ShippingApiState {
    fn default() -> Self {
        Self {
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            cost: Money::ZERO,
            error_msg: String::new(),
        }
    }
}

/// Totals derived from the cart and the API results.
///
/// Recomputed after every mutation and tagged with the state version it was
/// computed from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CheckoutTotals {
    pub version: u64,
    pub items_quantity: BTreeMap<Sku, i64>,
    pub total_quantity: i64,
    /// Sum of prices, quantities ignored.
    pub total_price: Money,
    /// Sum of price times quantity.
    pub total_quantity_price: Money,
    pub total_with_discount: Money,
    pub grand_total: Money,
    pub items_count: usize,
    pub sku_string: String,
}

impl CheckoutTotals {
    fn compute(
        version: u64,
        lines: &[LineItem],
        cart_api: &CartApiState,
        shipping_api: &ShippingApiState,
    ) -> Self {
        let items_quantity: BTreeMap<Sku, i64> = lines
            .iter()
            .map(|line| (line.sku.clone(), line.quantity))
            .collect();
        let total_quantity = items_quantity.values().sum();
        let total_price = Money::sum(lines.iter().map(|line| &line.price_amount));
        let total_quantity_price = lines
            .iter()
            .fold(Money::ZERO, |acc, line| acc + line.subtotal());
        let total_with_discount = if cart_api.total_price.is_zero() {
            total_quantity_price
        } else {
            cart_api.total_price
        };

        Self {
            version,
            items_quantity,
            total_quantity,
            total_price,
            total_quantity_price,
            total_with_discount,
            grand_total: total_with_discount + shipping_api.cost,
            items_count: lines.len(),
            sku_string: lines
                .iter()
                .map(|line| line.sku.as_str())
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

/// Checkout state: cart lines, server-side totals, shipping and payment.
///
/// One instance per session. Mutations write through to the injected
/// [`Cache`]; network actions record failures in state instead of returning
/// them.
#[derive(Debug)]
pub struct Checkout {
    lines: Vec<LineItem>,
    cart_api: CartApiState,
    shipping_api: ShippingApiState,
    shipping_details: ShippingDetails,
    payment_details: PaymentDetails,
    countries: Vec<Choice>,
    shipping_methods: Vec<Choice>,
    payment_methods: Vec<PaymentMethod>,
    tickets: TicketBook<RequestKind>,
    version: u64,
    totals: CheckoutTotals,
    cache: Cache,
    keys: StorageKeys,
}

impl Checkout {
    pub fn new(cache: Cache) -> Self {
        Self::with_keys(cache, StorageKeys::default())
    }

    pub fn with_keys(cache: Cache, keys: StorageKeys) -> Self {
        Self {
            lines: Vec::new(),
            cart_api: CartApiState::default(),
            shipping_api: ShippingApiState::default(),
            shipping_details: ShippingDetails::default(),
            payment_details: PaymentDetails::default(),
            countries: Vec::new(),
            shipping_methods: Vec::new(),
            payment_methods: Vec::new(),
            tickets: TicketBook::new(),
            version: 0,
            totals: CheckoutTotals::default(),
            cache,
            keys,
        }
    }

    /// Reload cart, shipping and payment snapshots from storage.
    pub fn restore(cache: Cache) -> Self {
        Self::restore_with_keys(cache, StorageKeys::default())
    }

    pub fn restore_with_keys(cache: Cache, keys: StorageKeys) -> Self {
        let mut checkout = Self::with_keys(cache, keys);
        checkout.lines = load_snapshot(&checkout.cache, &checkout.keys.cart).unwrap_or_default();
        checkout.shipping_details =
            load_snapshot(&checkout.cache, &checkout.keys.shipping_details).unwrap_or_default();
        checkout.payment_details =
            load_snapshot(&checkout.cache, &checkout.keys.payment_details).unwrap_or_default();
        checkout.refresh();
        tracing::debug!(lines = checkout.lines.len(), "checkout restored");
        checkout
    }

    fn refresh(&mut self) {
        self.version += 1;
        self.totals =
            CheckoutTotals::compute(self.version, &self.lines, &self.cart_api, &self.shipping_api);
    }

    fn save_cart(&self) {
        self.cache.store(&self.keys.cart, &self.lines);
    }

    // Cart lines

    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    /// Put `item` at the front, replacing any line with the same sku.
    pub fn add_item(&mut self, item: LineItem) -> Result<(), CommerceError> {
        item.validate()?;
        self.lines.retain(|line| line.sku != item.sku);
        tracing::debug!(sku = %item.sku, quantity = item.quantity, "checkout add");
        self.lines.insert(0, item);
        self.save_cart();
        self.refresh();
        Ok(())
    }

    /// Remove the line at `index`. Out of range is a no-op.
    pub fn remove_item(&mut self, index: usize) -> Option<LineItem> {
        if index >= self.lines.len() {
            return None;
        }
        let removed = self.lines.remove(index);
        self.save_cart();
        self.refresh();
        Some(removed)
    }

    /// Set the quantity of the line with `sku` and persist.
    pub fn update_item_quantity(&mut self, sku: &str, quantity: i64) -> Result<(), CommerceError> {
        if quantity < 1 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        let line = self
            .lines
            .iter_mut()
            .find(|line| line.sku == sku)
            .ok_or_else(|| CommerceError::ItemNotInCart(sku.to_string()))?;
        if quantity > line.limit_per_order {
            return Err(CommerceError::QuantityExceedsLimit(quantity, line.limit_per_order));
        }
        line.quantity = quantity;
        self.save_cart();
        self.refresh();
        Ok(())
    }

    pub fn is_item_exists(&self, slug: &str) -> bool {
        self.lines.iter().any(|line| line.item_slug == slug)
    }

    /// Price times quantity, always with two decimals.
    pub fn item_subtotal(price: Money, quantity: i64) -> FixedPrice {
        (price * quantity).fixed(true)
    }

    // Derived totals

    pub fn totals(&self) -> &CheckoutTotals {
        &self.totals
    }

    /// Incremented by every state change.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn cart_items_quantity(&self) -> &BTreeMap<Sku, i64> {
        &self.totals.items_quantity
    }

    pub fn cart_total_quantity(&self) -> i64 {
        self.totals.total_quantity
    }

    pub fn cart_total_price_amount(&self) -> Money {
        self.totals.total_price
    }

    pub fn cart_total_quantity_price_amount(&self) -> Money {
        self.totals.total_quantity_price
    }

    /// The server total when the last cart check returned one, else the local total.
    pub fn cart_total_with_discount(&self) -> Money {
        self.totals.total_with_discount
    }

    pub fn grand_total(&self) -> Money {
        self.totals.grand_total
    }

    pub fn items_count(&self) -> usize {
        self.totals.items_count
    }

    /// Comma-joined skus in cart order.
    pub fn cart_items_sku_string(&self) -> &str {
        &self.totals.sku_string
    }

    pub fn cart_api(&self) -> &CartApiState {
        &self.cart_api
    }

    pub fn shipping_api(&self) -> &ShippingApiState {
        &self.shipping_api
    }

    // Requests

    /// Take a ticket for a request of `kind`.
    pub fn begin(&mut self, kind: RequestKind) -> Ticket {
        self.tickets.begin(kind)
    }

    /// Whether any request is in flight.
    pub fn is_loading(&self) -> bool {
        self.tickets.is_loading()
    }

    fn finish(&mut self, kind: RequestKind, ticket: Ticket) -> bool {
        self.tickets.finish(kind, ticket)
    }

    /// Take a reconcile ticket, or `None` when the cart is empty.
    pub fn begin_reconcile(&mut self) -> Option<Ticket> {
        if self.lines.is_empty() {
            return None;
        }
        Some(self.begin(RequestKind::Reconcile))
    }

    /// Merge fresh catalog data into the cart.
    ///
    /// Lines missing from `result` are dropped; a quantity over the new limit
    /// goes back to 1. On error the cart is left as it was. Returns whether
    /// the cart was updated.
    pub fn apply_reconcile(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<ReconciledItem>, FetchError>,
    ) -> bool {
        if !self.finish(RequestKind::Reconcile, ticket) {
            return false;
        }
        let mut records = match result {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "failed to refresh cart items");
                return false;
            }
        };

        let before = self.lines.len();
        let mut updated = Vec::with_capacity(before);
        for mut line in self.lines.drain(..) {
            let Some(pos) = records.iter().position(|r| r.sku == line.sku) else {
                continue;
            };
            let record = records.swap_remove(pos);
            line.price_amount = record.effective_price();
            line.item_slug = record.slug;
            line.limit_per_order = record.limit_per_order;
            line.thumbnail = record.thumbnail.unwrap_or_default();
            line.currency_symbol = record.price_currency_symbol;
            if line.quantity > line.limit_per_order {
                line.quantity = 1;
            }
            updated.push(line);
        }
        self.lines = updated;
        tracing::debug!(before, after = self.lines.len(), "cart reconciled");

        self.save_cart();
        self.refresh();
        true
    }

    /// Refresh cart lines from `endpoint?items_sku=...`.
    pub async fn reconcile(&mut self, client: &FetchClient, endpoint: &str) -> bool {
        let Some(ticket) = self.begin_reconcile() else {
            return false;
        };
        let result = client
            .get(endpoint)
            .query("items_sku", self.cart_items_sku_string())
            .fetch_json::<Vec<ReconciledItem>>()
            .await;
        self.apply_reconcile(ticket, result)
    }

    /// Body for a cart check with `coupon`.
    pub fn cart_check_request(&self, coupon: &str) -> CartCheckRequest {
        CartCheckRequest {
            coupon: coupon.to_string(),
            items: self
                .lines
                .iter()
                .map(|line| CartCheckItem {
                    sku: line.sku.clone(),
                    quantity: line.quantity,
                })
                .collect(),
        }
    }

    pub fn apply_cart_check(
        &mut self,
        ticket: Ticket,
        result: Result<CartCheckResponse, FetchError>,
    ) -> bool {
        if !self.finish(RequestKind::CartCheck, ticket) {
            return false;
        }
        match result {
            Ok(response) => {
                self.cart_api = CartApiState {
                    coupon_title: response.coupon_title.unwrap_or_default(),
                    currency_symbol: response.price_currency_symbol,
                    total_discount: response.total_discount_amount,
                    total_price: response.total_price_amount,
                    error_msg: String::new(),
                };
            }
            Err(e) => {
                tracing::warn!(error = %e, "cart check failed");
                self.cart_api.error_msg = error_message(&e);
            }
        }
        self.refresh();
        true
    }

    /// POST the cart and `coupon` to the cart check endpoint.
    pub async fn cart_check(&mut self, client: &FetchClient, endpoint: &str, coupon: &str) -> bool {
        let ticket = self.begin(RequestKind::CartCheck);
        let body = self.cart_check_request(coupon);
        let result = post_json(client, endpoint, &body).await;
        self.apply_cart_check(ticket, result)
    }

    pub fn reset_cart_api_state(&mut self) {
        self.cart_api = CartApiState::default();
        self.refresh();
    }

    // Shipping

    pub fn shipping_details(&self) -> &ShippingDetails {
        &self.shipping_details
    }

    /// Set a shipping form field by its key and persist.
    pub fn set_shipping_detail(&mut self, key: &str, value: &str) -> Result<(), CommerceError> {
        if key.is_empty() {
            return Err(CommerceError::ValidationError("empty field name".to_string()));
        }
        let field: ShippingField = key.parse()?;
        self.set_shipping_field(field, value);
        Ok(())
    }

    pub fn set_shipping_field(&mut self, field: ShippingField, value: impl Into<String>) {
        self.shipping_details.set(field, value);
        self.cache
            .store(&self.keys.shipping_details, &self.shipping_details);
        self.refresh();
    }

    pub fn shipping_address(&self) -> ShippingAddress {
        self.shipping_details.address()
    }

    pub fn is_shipping_info_set(&self) -> bool {
        self.shipping_details.is_info_set()
    }

    pub fn is_shipping_details_set(&self) -> bool {
        self.shipping_details.is_complete()
    }

    pub fn countries(&self) -> &[Choice] {
        &self.countries
    }

    pub fn shipping_methods(&self) -> &[Choice] {
        &self.shipping_methods
    }

    pub fn apply_countries(&mut self, ticket: Ticket, result: Result<Vec<Choice>, FetchError>) -> bool {
        if !self.finish(RequestKind::Countries, ticket) {
            return false;
        }
        self.countries = list_or_empty(result, "countries");
        self.refresh();
        true
    }

    pub async fn load_countries(&mut self, client: &FetchClient, endpoint: &str) -> bool {
        let ticket = self.begin(RequestKind::Countries);
        let result = client.get(endpoint).fetch_json().await;
        self.apply_countries(ticket, result)
    }

    pub fn apply_shipping_methods(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<Choice>, FetchError>,
    ) -> bool {
        if !self.finish(RequestKind::ShippingMethods, ticket) {
            return false;
        }
        self.shipping_methods = list_or_empty(result, "shipping methods");
        self.refresh();
        true
    }

    pub async fn load_shipping_methods(&mut self, client: &FetchClient, endpoint: &str) -> bool {
        let ticket = self.begin(RequestKind::ShippingMethods);
        let result = client.get(endpoint).fetch_json().await;
        self.apply_shipping_methods(ticket, result)
    }

    pub fn shipping_cost_request(&self) -> ShippingCostRequest {
        ShippingCostRequest {
            shipping_method: self.shipping_details.shipping_method.clone(),
            shipping_address: self.shipping_address(),
        }
    }

    pub fn apply_shipping_cost(
        &mut self,
        ticket: Ticket,
        result: Result<ShippingCostResponse, FetchError>,
    ) -> bool {
        if !self.finish(RequestKind::ShippingCost, ticket) {
            return false;
        }
        match result {
            Ok(response) => {
                self.shipping_api = ShippingApiState {
                    currency_symbol: response.price_currency_symbol,
                    cost: response.shipping_cost_amount,
                    error_msg: String::new(),
                };
            }
            Err(e) => {
                tracing::warn!(error = %e, "shipping cost request failed");
                self.shipping_api.error_msg = error_message(&e);
            }
        }
        self.refresh();
        true
    }

    /// POST the chosen method and address to the shipping cost endpoint.
    pub async fn shipping_cost(&mut self, client: &FetchClient, endpoint: &str) -> bool {
        let ticket = self.begin(RequestKind::ShippingCost);
        let body = self.shipping_cost_request();
        let result = post_json(client, endpoint, &body).await;
        self.apply_shipping_cost(ticket, result)
    }

    pub fn reset_shipping_api_state(&mut self) {
        self.shipping_api = ShippingApiState::default();
        self.refresh();
    }

    // Payment

    pub fn payment_details(&self) -> &PaymentDetails {
        &self.payment_details
    }

    pub fn payment_methods(&self) -> &[PaymentMethod] {
        &self.payment_methods
    }

    /// Set a payment form field by its key and persist.
    pub fn set_payment_detail(&mut self, key: &str, value: &str) -> Result<(), CommerceError> {
        if key.is_empty() {
            return Err(CommerceError::ValidationError("empty field name".to_string()));
        }
        let field: PaymentField = key.parse()?;
        self.set_payment_field(field, value);
        Ok(())
    }

    pub fn set_payment_field(&mut self, field: PaymentField, value: impl Into<String>) {
        self.payment_details.set(field, value);
        self.cache
            .store(&self.keys.payment_details, &self.payment_details);
        self.refresh();
    }

    pub fn apply_payment_methods(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<PaymentMethod>, FetchError>,
    ) -> bool {
        if !self.finish(RequestKind::PaymentMethods, ticket) {
            return false;
        }
        self.payment_methods = list_or_empty(result, "payment methods");
        self.refresh();
        true
    }

    pub async fn load_payment_methods(&mut self, client: &FetchClient, endpoint: &str) -> bool {
        let ticket = self.begin(RequestKind::PaymentMethods);
        let result = client.get(endpoint).fetch_json().await;
        self.apply_payment_methods(ticket, result)
    }

    /// Whether the payment method with `value` takes a card. Unknown is `false`.
    pub fn is_payment_card(&self, value: &str) -> bool {
        self.payment_methods
            .iter()
            .find(|method| method.value == value)
            .is_some_and(|method| method.is_card)
    }

    pub fn is_payment_details_set(&self) -> bool {
        let method = &self.payment_details.payment_method;
        if method.is_empty() {
            return false;
        }
        !self.is_payment_card(method) || self.payment_details.has_card()
    }
}

async fn post_json<B, T>(client: &FetchClient, endpoint: &str, body: &B) -> Result<T, FetchError>
where
    B: serde::Serialize,
    T: serde::de::DeserializeOwned,
{
    client.post(endpoint).json(body)?.fetch_json().await
}

fn error_message(e: &FetchError) -> String {
    e.server_message()
        .map(str::to_string)
        .unwrap_or_else(|| e.to_string())
}

fn list_or_empty<T>(result: Result<Vec<T>, FetchError>, what: &str) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load {}", what);
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    use serde_json::json;
    use storefront_data::{Method, Response, ScriptedTransport};

    const CART_CHECK: &str = "/api/v1/cart/check/";

    fn line(sku: &str, cents: i64, quantity: i64, limit: i64) -> LineItem {
        LineItem::new(sku, format!("{}-slug", sku.to_lowercase()), Money::new(cents))
            .with_quantity(quantity)
            .with_limit_per_order(limit)
    }

    fn error_response(status: u16, message: &str) -> Response {
        Response::new(
            status,
            HashMap::new(),
            json!({ "message": message }).to_string().into_bytes(),
        )
    }

    #[test]
    fn test_add_item_replaces_same_sku() {
        let mut checkout = Checkout::new(Cache::in_memory());
        checkout.add_item(line("A", 1000, 1, 5)).unwrap();
        checkout.add_item(line("B", 500, 1, 5)).unwrap();
        checkout.add_item(line("A", 1000, 3, 5)).unwrap();

        assert_eq!(checkout.items_count(), 2);
        assert_eq!(checkout.lines()[0].sku, "A");
        assert_eq!(checkout.lines()[0].quantity, 3);
        assert_eq!(checkout.cart_items_sku_string(), "A,B");
    }

    #[test]
    fn test_totals() {
        let mut checkout = Checkout::new(Cache::in_memory());
        checkout.add_item(line("A", 1000, 2, 5)).unwrap();
        checkout.add_item(line("B", 550, 1, 5)).unwrap();

        assert_eq!(checkout.cart_total_quantity(), 3);
        assert_eq!(checkout.cart_items_quantity()[&Sku::new("A")], 2);
        assert_eq!(checkout.cart_total_price_amount(), Money::new(1550));
        assert_eq!(checkout.cart_total_quantity_price_amount(), Money::new(2550));
        assert_eq!(checkout.cart_total_with_discount(), Money::new(2550));
        assert_eq!(checkout.grand_total(), Money::new(2550));
        assert_eq!(checkout.cart_total_quantity_price_amount().fixed(true).to_string(), "25.50");
    }

    #[test]
    fn test_version_tracks_mutations() {
        let mut checkout = Checkout::new(Cache::in_memory());
        let v0 = checkout.version();
        checkout.add_item(line("A", 1000, 1, 5)).unwrap();
        assert!(checkout.version() > v0);
        assert_eq!(checkout.totals().version, checkout.version());
    }

    #[test]
    fn test_update_item_quantity() {
        let cache = Cache::in_memory();
        let mut checkout = Checkout::new(cache.clone());
        checkout.add_item(line("A", 1000, 1, 3)).unwrap();

        checkout.update_item_quantity("A", 3).unwrap();
        assert_eq!(checkout.cart_total_quantity(), 3);
        assert_eq!(
            checkout.update_item_quantity("A", 4),
            Err(CommerceError::QuantityExceedsLimit(4, 3))
        );
        assert_eq!(checkout.update_item_quantity("A", 0), Err(CommerceError::InvalidQuantity(0)));
        assert_eq!(
            checkout.update_item_quantity("Z", 1),
            Err(CommerceError::ItemNotInCart("Z".to_string()))
        );

        // persisted
        assert_eq!(Checkout::restore(cache).lines()[0].quantity, 3);
    }

    #[test]
    fn test_item_subtotal() {
        assert_eq!(Checkout::item_subtotal(Money::new(1999), 3).to_string(), "59.97");
        assert_eq!(Checkout::item_subtotal(Money::new(1000), 1).to_string(), "10.00");
    }

    #[tokio::test]
    async fn test_reconcile_drops_unknown_and_resets_over_limit() {
        let transport = Arc::new(ScriptedTransport::new().on_json(
            Method::Get,
            CART_CHECK,
            &json!([
                {
                    "sku": "A", "slug": "ring-gold", "thumbnail": "a.png",
                    "price_currency_symbol": "$", "list_price_amount": "20.00",
                    "deal_price_amount": "15.00", "limit_per_order": 2
                }
            ]),
        ));
        let client = FetchClient::from_shared(transport.clone());
        let mut checkout = Checkout::new(Cache::in_memory());
        checkout.add_item(line("B", 500, 1, 5)).unwrap();
        checkout.add_item(line("A", 1000, 4, 5)).unwrap();

        assert!(checkout.reconcile(&client, CART_CHECK).await);

        assert_eq!(checkout.items_count(), 1);
        let a = &checkout.lines()[0];
        assert_eq!(a.quantity, 1);
        assert_eq!(a.limit_per_order, 2);
        assert_eq!(a.price_amount, Money::new(1500));
        assert_eq!(a.item_slug, "ring-gold");
        assert_eq!(a.thumbnail, "a.png");
        assert!(!checkout.is_loading());

        let request = &transport.requests()[0];
        assert!(request.url.ends_with("?items_sku=A%2CB"), "{}", request.url);
    }

    #[tokio::test]
    async fn test_reconcile_failure_keeps_cart() {
        let transport = ScriptedTransport::new().on(
            Method::Get,
            CART_CHECK,
            error_response(500, "Server error"),
        );
        let client = FetchClient::new(transport);
        let mut checkout = Checkout::new(Cache::in_memory());
        checkout.add_item(line("A", 1000, 2, 5)).unwrap();
        let before = checkout.lines().to_vec();

        assert!(!checkout.reconcile(&client, CART_CHECK).await);
        assert_eq!(checkout.lines(), before.as_slice());
        assert!(!checkout.is_loading());
    }

    #[tokio::test]
    async fn test_reconcile_empty_cart_sends_nothing() {
        let transport = Arc::new(ScriptedTransport::new());
        let client = FetchClient::from_shared(transport.clone());
        let mut checkout = Checkout::new(Cache::in_memory());

        assert!(!checkout.reconcile(&client, CART_CHECK).await);
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_stale_reconcile_is_ignored() {
        let mut checkout = Checkout::new(Cache::in_memory());
        checkout.add_item(line("A", 1000, 1, 5)).unwrap();

        let slow = checkout.begin_reconcile().unwrap();
        let fast = checkout.begin_reconcile().unwrap();
        assert!(checkout.is_loading());

        let fresh = vec![ReconciledItem {
            sku: Sku::new("A"),
            slug: "a-slug".into(),
            thumbnail: None,
            price_currency_symbol: "$".to_string(),
            list_price_amount: Money::new(1200),
            deal_price_amount: None,
            limit_per_order: 5,
        }];
        assert!(checkout.apply_reconcile(fast, Ok(fresh)));
        // the older response would empty the cart
        assert!(!checkout.apply_reconcile(slow, Ok(vec![])));

        assert_eq!(checkout.items_count(), 1);
        assert_eq!(checkout.lines()[0].price_amount, Money::new(1200));
        assert!(!checkout.is_loading());
    }

    #[tokio::test]
    async fn test_cart_check_success_and_failure() {
        let transport = ScriptedTransport::new()
            .on_json(
                Method::Post,
                CART_CHECK,
                &json!({
                    "coupon_title": "Spring sale",
                    "price_currency_symbol": "$",
                    "total_discount_amount": "5.00",
                    "total_price_amount": "15.00"
                }),
            )
            .on(Method::Post, CART_CHECK, error_response(400, "Coupon expired"));
        let client = FetchClient::new(transport);
        let mut checkout = Checkout::new(Cache::in_memory());
        checkout.add_item(line("A", 1000, 2, 5)).unwrap();

        checkout.cart_check(&client, CART_CHECK, "SPRING").await;
        assert_eq!(checkout.cart_api().coupon_title, "Spring sale");
        assert_eq!(checkout.cart_total_with_discount(), Money::new(1500));
        assert!(checkout.cart_api().error_msg.is_empty());

        checkout.cart_check(&client, CART_CHECK, "OLD").await;
        assert_eq!(checkout.cart_api().error_msg, "Coupon expired");

        checkout.reset_cart_api_state();
        assert_eq!(checkout.cart_api(), &CartApiState::default());
        assert_eq!(checkout.cart_total_with_discount(), Money::new(2000));
    }

    #[tokio::test]
    async fn test_shipping_cost_feeds_grand_total() {
        let endpoint = "/api/v1/shipping/cost/";
        let transport = Arc::new(ScriptedTransport::new().on_json(
            Method::Post,
            endpoint,
            &json!({"price_currency_symbol": "$", "shipping_cost_amount": 4.5}),
        ));
        let client = FetchClient::from_shared(transport.clone());
        let mut checkout = Checkout::new(Cache::in_memory());
        checkout.add_item(line("A", 1000, 1, 5)).unwrap();
        checkout.set_shipping_detail("country", "US").unwrap();
        checkout.set_shipping_detail("shippingMethod", "standard").unwrap();

        checkout.shipping_cost(&client, endpoint).await;
        assert_eq!(checkout.grand_total(), Money::new(1450));

        let body = transport.requests()[0].json_body().unwrap();
        assert_eq!(body["shipping_method"], "standard");
        assert_eq!(body["shipping_address"]["country_iso_code"], "US");

        checkout.reset_shipping_api_state();
        assert_eq!(checkout.grand_total(), Money::new(1000));
    }

    #[tokio::test]
    async fn test_load_lists_and_payment_card() {
        let transport = ScriptedTransport::new()
            .on_json(
                Method::Get,
                "/api/v1/payment/methods/",
                &json!([
                    {"label": "Card", "value": "card", "is_card": true, "icon": "credit-card", "icon_color": "#000"},
                    {"label": "Cash", "value": "cash", "is_card": false, "icon": null, "icon_color": null}
                ]),
            )
            .on(
                Method::Get,
                "/api/v1/shipping/countries/",
                error_response(503, "Unavailable"),
            );
        let client = FetchClient::new(transport);
        let mut checkout = Checkout::new(Cache::in_memory());

        checkout.load_payment_methods(&client, "/api/v1/payment/methods/").await;
        checkout.load_countries(&client, "/api/v1/shipping/countries/").await;
        assert_eq!(checkout.payment_methods().len(), 2);
        assert!(checkout.countries().is_empty());

        assert!(checkout.is_payment_card("card"));
        assert!(!checkout.is_payment_card("cash"));
        assert!(!checkout.is_payment_card("bitcoin"));

        checkout.set_payment_detail("paymentMethod", "card").unwrap();
        assert!(!checkout.is_payment_details_set());
        for (key, value) in [
            ("cardNumber", "4242424242424242"),
            ("cardHolder", "Ada Lovelace"),
            ("cardExpiry", "12/30"),
            ("cardCvc", "123"),
        ] {
            checkout.set_payment_detail(key, value).unwrap();
        }
        assert!(checkout.is_payment_details_set());

        checkout.set_payment_detail("paymentMethod", "cash").unwrap();
        assert!(checkout.is_payment_details_set());
    }

    #[test]
    fn test_detail_keys_validated() {
        let mut checkout = Checkout::new(Cache::in_memory());
        assert!(matches!(
            checkout.set_shipping_detail("", "x"),
            Err(CommerceError::ValidationError(_))
        ));
        assert_eq!(
            checkout.set_payment_detail("iban", "x"),
            Err(CommerceError::UnknownField("iban".to_string()))
        );
    }

    #[test]
    fn test_restore_round_trip() {
        let cache = Cache::in_memory();
        let mut checkout = Checkout::new(cache.clone());
        checkout.add_item(line("A", 1000, 2, 5)).unwrap();
        checkout.add_item(line("B", 250, 1, 1)).unwrap();
        checkout.set_shipping_detail("city", "Oakland").unwrap();
        checkout.set_payment_detail("paymentMethod", "cash").unwrap();

        let restored = Checkout::restore(cache);
        assert_eq!(restored.lines(), checkout.lines());
        assert_eq!(restored.shipping_details(), checkout.shipping_details());
        assert_eq!(restored.payment_details(), checkout.payment_details());
        assert_eq!(restored.grand_total(), checkout.grand_total());
    }

    #[test]
    fn test_restore_ignores_corrupt_snapshot() {
        let cache = Cache::in_memory();
        let keys = StorageKeys::default();
        cache.set(&keys.cart, &json!({"not": "a list"})).unwrap();
        cache.set(&keys.shipping_details, &json!({"city": "Oakland"})).unwrap();

        let restored = Checkout::restore(cache);
        assert!(restored.lines().is_empty());
        assert_eq!(restored.shipping_details().city, "Oakland");
    }
}
