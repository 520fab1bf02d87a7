//! Storefront state for a single-page shop.
//!
//! This crate holds the state the storefront derives from its API and its URL:
//!
//! - **Cart / Checkout**: cart lines, totals, server reconciliation, shipping and payment details
//! - **Catalog**: product option lists derived from sibling variants
//! - **Routing**: route table and query guards that repair bad query strings
//! - **Listing**: paginated results with a sliding page window, filter panel state
//! - **Price**: display normalization of amounts
//!
//! Aggregators own their state and talk to the backend through a
//! [`storefront_data::FetchClient`]; snapshots are kept in a
//! [`storefront_cache::Cache`].
//!
//! # Example
//!
//! ```rust
//! use storefront_cache::Cache;
//! use storefront_core::prelude::*;
//!
//! let mut checkout = Checkout::new(Cache::in_memory());
//! checkout
//!     .add_item(LineItem::new("RING-1", "gold-ring", Money::new(4999)).with_limit_per_order(3))
//!     .unwrap();
//! checkout.update_item_quantity("RING-1", 2).unwrap();
//!
//! assert_eq!(checkout.cart_total_quantity_price_amount().display_with("$"), "$99.98");
//!
//! let router = Router::storefront().unwrap();
//! let route = router.resolve_url("/store/category/rings?page=abc").unwrap();
//! assert_eq!(route.location.to_url(), "/store/category/rings?page=1");
//! ```

pub mod error;
pub mod ids;
pub mod money;
pub mod price;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod endpoints;
pub mod filter;
pub mod listing;
pub mod pagination;
pub mod routing;
pub mod storage;
pub mod ticket;

pub use error::CommerceError;
pub use ids::*;
pub use money::Money;
pub use price::{fix_price, FixedPrice};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::Money;
    pub use crate::price::{fix_price, FixedPrice};

    // Cart and checkout
    pub use crate::cart::{Cart, LineItem};
    pub use crate::checkout::{
        Checkout, CheckoutTotals, PaymentDetails, PaymentField, ShippingDetails, ShippingField,
    };

    // Catalog and listings
    pub use crate::catalog::{derive_options, DerivedOptions, OptionEntry, ProductStore, VariantRecord};
    pub use crate::endpoints::Endpoints;
    pub use crate::filter::FilterStore;
    pub use crate::listing::{Listing, Page};
    pub use crate::pagination::{pages_range, PaginationState};

    // Routing
    pub use crate::routing::{ResolvedRoute, RouteLocation, Router, RoutingError, SelectBy};

    pub use crate::storage::StorageKeys;
}
