//! Backend API endpoints.

use serde::{Deserialize, Serialize};

use crate::routing::serialize::{build_endpoint, replace_whitespace};
use crate::routing::{keys, RouteQuery};

/// Route query keys and the API query names they are sent as.
const LISTING_QUERY: &[(&str, &str)] = &[
    (keys::PAGE, "page"),
    (keys::ATTR, "attr"),
    (keys::MIN_PRICE, "min_price"),
    (keys::MAX_PRICE, "max_price"),
    (keys::SELECT_BY, "select_by"),
];

/// Base paths of the JSON API, relative to the API base URL.
///
/// Every field can be overridden from configuration; missing ones keep the
/// `/api/v1/` defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub home: String,
    pub categories: String,
    pub category_details: String,
    pub category_products: String,
    pub category_attributes: String,
    pub search: String,
    pub product_details: String,
    pub cart_check: String,
    pub shipping_countries: String,
    pub shipping_methods: String,
    pub shipping_cost: String,
    pub payment_methods: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            home: "/api/v1/home/".into(),
            categories: "/api/v1/store/categories/".into(),
            category_details: "/api/v1/store/category/details/".into(),
            category_products: "/api/v1/store/products/category/".into(),
            category_attributes: "/api/v1/store/attributes/category/".into(),
            search: "/api/v1/store/search/".into(),
            product_details: "/api/v1/product/details/".into(),
            cart_check: "/api/v1/cart/check/".into(),
            shipping_countries: "/api/v1/shipping/countries/".into(),
            shipping_methods: "/api/v1/shipping/methods/".into(),
            shipping_cost: "/api/v1/shipping/cost/".into(),
            payment_methods: "/api/v1/payment/methods/".into(),
        }
    }
}

fn listing_query(query: &RouteQuery) -> Vec<(&'static str, Option<&str>)> {
    LISTING_QUERY
        .iter()
        .map(|(route_key, api_key)| (*api_key, query.get(*route_key).map(String::as_str)))
        .collect()
}

impl Endpoints {
    pub fn category_details(&self, slug: &str) -> String {
        build_endpoint(&self.category_details, &[slug], &[])
    }

    /// Products of a category, filtered by the listing keys of `query`.
    ///
    /// ```
    /// use storefront_core::endpoints::Endpoints;
    /// use storefront_core::routing::RouteLocation;
    ///
    /// let location = RouteLocation::parse("/store/category/rings?page=2&minPrice=10");
    /// assert_eq!(
    ///     Endpoints::default().category_products("rings", &location.query),
    ///     "/api/v1/store/products/category/rings/?page=2&min_price=10"
    /// );
    /// ```
    pub fn category_products(&self, slug: &str, query: &RouteQuery) -> String {
        build_endpoint(&self.category_products, &[slug], &listing_query(query))
    }

    pub fn category_attributes(&self, slug: &str) -> String {
        build_endpoint(&self.category_attributes, &[slug], &[])
    }

    /// Search results for `text`. Tabs and line breaks are sent as spaces.
    pub fn search(&self, text: &str, query: &RouteQuery) -> String {
        let text = replace_whitespace(text.trim(), " ");
        build_endpoint(&self.search, &[&text], &listing_query(query))
    }

    /// Product page data, optionally for a given variant or attribute selection.
    pub fn product_details(&self, slug: &str, item: Option<&str>, attr: Option<&str>) -> String {
        build_endpoint(
            &self.product_details,
            &[slug],
            &[("item_s", item), ("attr", attr)],
        )
    }

    /// A single variant of a product, without sibling data.
    pub fn product_item(&self, slug: &str, item: &str) -> String {
        build_endpoint(
            &self.product_details,
            &[slug],
            &[("item_s", Some(item)), ("only_item", Some("true"))],
        )
    }
}
