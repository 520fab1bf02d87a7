//! Product page state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use storefront_data::{FetchClient, FetchError};

use crate::catalog::options::{
    derive_options, derive_selected_options, DerivedOptions, OptionSet, VariantRecord,
};
use crate::routing::{ResolvedRoute, RouteLocation};
use crate::ticket::{Ticket, Tickets};

/// The variant currently shown on the product page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectedItem {
    /// Attribute name to the values this variant exposes.
    #[serde(default)]
    pub attributes: BTreeMap<String, Vec<String>>,
    /// Remaining item fields (sku, prices, images, ...).
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl SelectedItem {
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.fields.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.fields.is_empty()
    }
}

/// Body of the product details endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductDetails {
    #[serde(default)]
    pub selected_product_item: SelectedItem,
    #[serde(default)]
    pub related_product_items: Vec<VariantRecord>,
    #[serde(default)]
    pub available_attributes_combination: serde_json::Value,
}

/// Body of the product item endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductItemDetails {
    #[serde(default)]
    pub selected_product_item: SelectedItem,
}

/// Product page state: selected variant and the options derived from its siblings.
#[derive(Debug, Clone, Default)]
pub struct ProductStore {
    selected: SelectedItem,
    combination: serde_json::Value,
    derived: DerivedOptions,
    selected_options: OptionSet,
    tickets: Tickets,
    item_tickets: Tickets,
}

impl ProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_item(&self) -> &SelectedItem {
        &self.selected
    }

    /// Available attribute combinations as sent by the server.
    pub fn combination(&self) -> &serde_json::Value {
        &self.combination
    }

    pub fn derived(&self) -> &DerivedOptions {
        &self.derived
    }

    pub fn options(&self) -> &OptionSet {
        &self.derived.options
    }

    pub fn selected_options(&self) -> &OptionSet {
        &self.selected_options
    }

    pub fn is_loading(&self) -> bool {
        self.tickets.is_loading() || self.item_tickets.is_loading()
    }

    fn reset(&mut self) {
        self.selected = SelectedItem::default();
        self.combination = serde_json::Value::Null;
        self.derived = DerivedOptions::default();
        self.selected_options = OptionSet::new();
    }

    pub fn begin_load(&mut self) -> Ticket {
        self.tickets.begin()
    }

    /// Apply product details.
    ///
    /// On failure the state is cleared and the not-found route for `current`
    /// is returned.
    pub fn apply_load(
        &mut self,
        ticket: Ticket,
        result: Result<ProductDetails, FetchError>,
        current: &RouteLocation,
    ) -> Option<ResolvedRoute> {
        if !self.tickets.finish(ticket) {
            return None;
        }
        match result {
            Ok(details) => {
                if !details.related_product_items.is_empty() {
                    self.derived = derive_options(&details.related_product_items);
                }
                self.selected_options =
                    derive_selected_options(&details.selected_product_item.attributes);
                self.selected = details.selected_product_item;
                self.combination = details.available_attributes_combination;
                tracing::debug!(
                    variants = self.derived.variant_values.len(),
                    attributes = self.derived.options.len(),
                    "product loaded"
                );
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, path = %current.path, "product not found");
                self.reset();
                Some(ResolvedRoute::not_found(current.clone()))
            }
        }
    }

    pub async fn load(
        &mut self,
        client: &FetchClient,
        endpoint: &str,
        current: &RouteLocation,
    ) -> Option<ResolvedRoute> {
        let ticket = self.begin_load();
        let result = client.get(endpoint).fetch_json().await;
        self.apply_load(ticket, result, current)
    }

    pub fn begin_load_item(&mut self) -> Ticket {
        self.item_tickets.begin()
    }

    /// Apply a single variant refresh; sibling options are kept.
    pub fn apply_load_item(
        &mut self,
        ticket: Ticket,
        result: Result<ProductItemDetails, FetchError>,
        current: &RouteLocation,
    ) -> Option<ResolvedRoute> {
        if !self.item_tickets.finish(ticket) {
            return None;
        }
        match result {
            Ok(details) => {
                let selected = details.selected_product_item;
                if !selected.attributes.is_empty() {
                    self.selected_options = derive_selected_options(&selected.attributes);
                }
                self.selected = selected;
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, path = %current.path, "product item not found");
                self.selected = SelectedItem::default();
                Some(ResolvedRoute::not_found(current.clone()))
            }
        }
    }

    pub async fn load_item(
        &mut self,
        client: &FetchClient,
        endpoint: &str,
        current: &RouteLocation,
    ) -> Option<ResolvedRoute> {
        let ticket = self.begin_load_item();
        let result = client.get(endpoint).fetch_json().await;
        self.apply_load_item(ticket, result, current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use serde_json::json;
    use storefront_data::{Method, Response, ScriptedTransport};

    use crate::catalog::options::OptionEntry;
    use crate::routing::NOT_FOUND_PARAM;

    const DETAILS: &str = "/api/v1/product/details/ring/";

    fn details_body() -> serde_json::Value {
        json!({
            "selected_product_item": {
                "sku": "RING-RED",
                "attributes": {"color": ["red"]}
            },
            "related_product_items": [
                {"slug": "ring-red", "attributes": {"color": [
                    {"parent_attribute": "warm", "child_attribute": "red", "thumbnail": null}
                ]}},
                {"slug": "ring-multi", "attributes": {"color": [
                    {"parent_attribute": "warm", "child_attribute": "red", "thumbnail": null},
                    {"parent_attribute": "cool", "child_attribute": "blue", "thumbnail": null}
                ]}}
            ],
            "available_attributes_combination": {"color": ["red", "blue"]}
        })
    }

    #[tokio::test]
    async fn test_load_derives_options() {
        let client = FetchClient::new(
            ScriptedTransport::new().on_json(Method::Get, DETAILS, &details_body()),
        );
        let mut store = ProductStore::new();
        let current = RouteLocation::new("/product/ring/ring-red");

        assert!(store.load(&client, DETAILS, &current).await.is_none());
        assert_eq!(store.options()["color"].len(), 2);
        assert!(store.derived().is_multi_valued("color"));
        assert_eq!(store.selected_options()["color"].len(), 1);
        assert_eq!(store.selected_item().field("sku"), Some(&json!("RING-RED")));
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_load_without_siblings_keeps_options() {
        let client = FetchClient::new(
            ScriptedTransport::new()
                .on_json(Method::Get, DETAILS, &details_body())
                .on_json(
                    Method::Get,
                    DETAILS,
                    &json!({
                        "selected_product_item": {"sku": "RING-BLUE", "attributes": {"color": ["blue"]}},
                        "related_product_items": []
                    }),
                ),
        );
        let mut store = ProductStore::new();
        let current = RouteLocation::new("/product/ring/ring-blue");

        store.load(&client, DETAILS, &current).await;
        assert!(store.load(&client, DETAILS, &current).await.is_none());

        assert_eq!(store.options()["color"].len(), 2);
        assert!(store.derived().is_multi_valued("color"));
        assert_eq!(store.selected_options()["color"], vec![OptionEntry::new("blue")]);
        assert_eq!(store.selected_item().field("sku"), Some(&json!("RING-BLUE")));
    }

    #[tokio::test]
    async fn test_failure_redirects_to_not_found() {
        let client = FetchClient::new(
            ScriptedTransport::new()
                .on_json(Method::Get, DETAILS, &details_body())
                .on(Method::Get, DETAILS, Response::new(404, HashMap::new(), Vec::new())),
        );
        let mut store = ProductStore::new();
        let current = RouteLocation::new("/product/ring/missing")
            .with_query("page", "2")
            .with_hash("reviews");

        store.load(&client, DETAILS, &current).await;
        let redirect = store.load(&client, DETAILS, &current).await.unwrap();

        assert!(redirect.is_not_found());
        assert_eq!(redirect.param(NOT_FOUND_PARAM), Some("product/ring/missing"));
        assert_eq!(redirect.location, current);
        assert!(store.options().is_empty());
        assert!(store.selected_item().is_empty());
    }

    #[tokio::test]
    async fn test_load_item_keeps_sibling_options() {
        let item_endpoint = "/api/v1/product/details/ring/ring-multi/";
        let client = FetchClient::new(
            ScriptedTransport::new()
                .on_json(Method::Get, DETAILS, &details_body())
                .on_json(
                    Method::Get,
                    item_endpoint,
                    &json!({"selected_product_item": {
                        "sku": "RING-MULTI",
                        "attributes": {"color": ["red", "blue"]}
                    }}),
                ),
        );
        let mut store = ProductStore::new();
        let current = RouteLocation::new("/product/ring/ring-multi");

        store.load(&client, DETAILS, &current).await;
        assert!(store.load_item(&client, item_endpoint, &current).await.is_none());
        assert_eq!(store.selected_options()["color"].len(), 2);
        assert_eq!(store.options()["color"].len(), 2);
        assert_eq!(store.selected_item().field("sku"), Some(&json!("RING-MULTI")));
    }
}
