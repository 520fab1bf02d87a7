//! Listing filter panel state.

use serde::{Deserialize, Serialize};
use storefront_data::{FetchClient, FetchError};

use crate::routing::serialize::{clean_query, merge_query};
use crate::routing::{keys, RouteQuery, SelectBy};
use crate::ticket::{Ticket, Tickets};

/// Route query keys owned by the filter panel.
const FILTER_QUERY_KEYS: &[&str] =
    &[keys::ATTR, keys::MIN_PRICE, keys::MAX_PRICE, keys::SELECT_BY];

/// A filterable attribute of a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterAttribute {
    pub title: String,
    #[serde(default)]
    pub input_class: String,
    #[serde(default)]
    pub display_order: i64,
    #[serde(default)]
    pub options: Vec<String>,
}

/// Price bounds as typed by the customer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceFilter {
    pub min: Option<String>,
    pub max: Option<String>,
}

/// State of the filter side panel.
#[derive(Debug, Clone, Default)]
pub struct FilterStore {
    collapsed: bool,
    attributes: Vec<FilterAttribute>,
    checked_options: Vec<String>,
    price: PriceFilter,
    select_by: Option<SelectBy>,
    tickets: Tickets,
}

impl FilterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn toggle_collapsed(&mut self) {
        self.collapsed = !self.collapsed;
    }

    /// Attributes sorted by display order.
    pub fn attributes(&self) -> &[FilterAttribute] {
        &self.attributes
    }

    pub fn checked_options(&self) -> &[String] {
        &self.checked_options
    }

    /// Check `option`, or uncheck it if already checked.
    pub fn toggle_option(&mut self, option: &str) {
        if let Some(pos) = self.checked_options.iter().position(|o| o == option) {
            self.checked_options.remove(pos);
        } else {
            self.checked_options.push(option.to_string());
        }
    }

    pub fn price(&self) -> &PriceFilter {
        &self.price
    }

    pub fn set_min_price(&mut self, value: Option<&str>) {
        self.price.min = value.map(str::to_string);
    }

    pub fn set_max_price(&mut self, value: Option<&str>) {
        self.price.max = value.map(str::to_string);
    }

    pub fn select_by(&self) -> Option<SelectBy> {
        self.select_by
    }

    pub fn set_select_by(&mut self, select_by: Option<SelectBy>) {
        self.select_by = select_by;
    }

    pub fn is_loading(&self) -> bool {
        self.tickets.is_loading()
    }

    pub fn begin(&mut self) -> Ticket {
        self.tickets.begin()
    }

    /// Apply loaded attributes. Failure leaves no attributes.
    pub fn apply(&mut self, ticket: Ticket, result: Result<Vec<FilterAttribute>, FetchError>) -> bool {
        if !self.tickets.finish(ticket) {
            return false;
        }
        self.attributes = match result {
            Ok(mut attributes) => {
                attributes.sort_by_key(|a| a.display_order);
                attributes
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load filter attributes");
                Vec::new()
            }
        };
        true
    }

    pub async fn load(&mut self, client: &FetchClient, endpoint: &str) -> bool {
        let ticket = self.begin();
        let result = client.get(endpoint).fetch_json().await;
        self.apply(ticket, result)
    }

    /// Take checked options, price bounds and sort order from a route query.
    pub fn sync_from_query(&mut self, query: &RouteQuery) {
        let query = clean_query(FILTER_QUERY_KEYS, query);
        self.checked_options = query
            .get(keys::ATTR)
            .map(|attr| {
                attr.split(',')
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        self.price.min = query.get(keys::MIN_PRICE).cloned();
        self.price.max = query.get(keys::MAX_PRICE).cloned();
        self.select_by = query.get(keys::SELECT_BY).and_then(|s| s.parse().ok());
    }

    /// Write the filter into `query`, going back to the first page.
    pub fn to_query(&self, query: &RouteQuery) -> RouteQuery {
        let attr = self.checked_options.join(",");
        merge_query(
            query,
            [
                (keys::PAGE, Some("1")),
                (keys::ATTR, Some(attr.as_str())),
                (keys::MIN_PRICE, self.price.min.as_deref()),
                (keys::MAX_PRICE, self.price.max.as_deref()),
                (keys::SELECT_BY, self.select_by.map(|s| s.as_str())),
            ],
            &[""],
        )
    }
}
